//! Paragraph entity model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use kb_core::types::{ArticleId, ParagraphId};

/// An ordered section of an article. Paragraphs can be shared on their own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Paragraph {
    /// Unique paragraph identifier.
    pub id: ParagraphId,
    /// Owning article.
    pub article_id: ArticleId,
    /// Optional heading.
    pub title: Option<String>,
    /// Body (HTML as authored).
    pub content: String,
    /// Sort position within the article (ascending).
    pub position: i32,
}

/// Data required to append a paragraph to an article.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateParagraph {
    /// Owning article.
    pub article_id: ArticleId,
    /// Optional heading.
    pub title: Option<String>,
    /// Body.
    pub content: String,
    /// Explicit position; appended after the last paragraph when absent.
    pub position: Option<i32>,
}
