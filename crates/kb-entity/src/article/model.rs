//! Article entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use kb_core::types::{ArticleId, CategoryId};

/// A knowledge-base article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Article {
    /// Unique article identifier.
    pub id: ArticleId,
    /// Owning category.
    pub category_id: CategoryId,
    /// Title.
    pub title: String,
    /// Short summary shown in listings.
    pub summary: String,
    /// Lead content shown before the paragraphs.
    pub content: String,
    /// Free-form tags.
    pub tags: Vec<String>,
    /// When the article was created.
    pub created_at: DateTime<Utc>,
    /// When the article was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Article {
    /// Case-insensitive match used by search: title, summary, content, or any tag.
    pub fn matches_query(&self, query: &str) -> bool {
        let needle = query.to_lowercase();
        self.title.to_lowercase().contains(&needle)
            || self.summary.to_lowercase().contains(&needle)
            || self.content.to_lowercase().contains(&needle)
            || self
                .tags
                .iter()
                .any(|tag| tag.to_lowercase().contains(&needle))
    }
}

/// Listing projection of an article joined with its category name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ArticleSummary {
    /// Article ID.
    pub id: ArticleId,
    /// Title.
    pub title: String,
    /// Summary.
    pub summary: String,
    /// Category ID.
    pub category_id: CategoryId,
    /// Category display name.
    pub category_name: String,
    /// When the article was created.
    pub created_at: DateTime<Utc>,
}

/// Filter for article listings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArticleFilter {
    /// Restrict to one category.
    pub category_id: Option<CategoryId>,
    /// Case-insensitive text query.
    pub query: Option<String>,
}

/// Data required to create an article.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateArticle {
    /// Owning category.
    pub category_id: CategoryId,
    /// Title.
    pub title: String,
    /// Summary.
    #[serde(default)]
    pub summary: String,
    /// Lead content.
    #[serde(default)]
    pub content: String,
    /// Tags.
    #[serde(default)]
    pub tags: Vec<String>,
}
