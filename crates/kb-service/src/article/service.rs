//! Read paths of the knowledge base plus the administrative content inserts.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use kb_core::error::AppError;
use kb_core::result::AppResult;
use kb_core::types::{ArticleId, CategoryId, PageRequest, PageResponse};
use kb_database::ArticleStore;
use kb_entity::article::{
    Article, ArticleFilter, ArticleSummary, Category, CreateArticle, CreateCategory,
    CreateParagraph, Paragraph,
};

/// Number of articles shown on the home page.
const LATEST_ARTICLES: u64 = 5;
/// Maximum category name length, in characters.
const MAX_CATEGORY_NAME: usize = 100;
/// Maximum article title length, in characters.
const MAX_ARTICLE_TITLE: usize = 200;

/// Landing page: every category and the newest articles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HomePage {
    /// All categories by name.
    pub categories: Vec<Category>,
    /// The newest articles.
    pub latest_articles: Vec<ArticleSummary>,
}

/// An article with its category and ordered paragraphs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleDetail {
    /// The article.
    pub article: Article,
    /// Its category.
    pub category: Category,
    /// Paragraphs by position.
    pub paragraphs: Vec<Paragraph>,
}

/// A category with a page of its articles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryDetail {
    /// The category.
    pub category: Category,
    /// Its articles, newest first.
    pub articles: PageResponse<ArticleSummary>,
}

/// Browses and seeds knowledge-base content.
#[derive(Debug, Clone)]
pub struct ArticleService {
    store: Arc<dyn ArticleStore>,
}

impl ArticleService {
    /// Create a new article service.
    pub fn new(store: Arc<dyn ArticleStore>) -> Self {
        Self { store }
    }

    /// Categories and the latest articles.
    pub async fn home(&self) -> AppResult<HomePage> {
        let categories = self.store.list_categories().await?;
        let latest = self
            .store
            .list_articles(
                &ArticleFilter::default(),
                &PageRequest::new(1, LATEST_ARTICLES),
            )
            .await?;
        Ok(HomePage {
            categories,
            latest_articles: latest.items,
        })
    }

    /// All articles, newest first.
    pub async fn list_articles(&self, page: &PageRequest) -> AppResult<PageResponse<ArticleSummary>> {
        self.store
            .list_articles(&ArticleFilter::default(), page)
            .await
    }

    /// One article with its category and paragraphs.
    pub async fn get_article(&self, id: ArticleId) -> AppResult<ArticleDetail> {
        let article = self
            .store
            .find_article(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Article {id} not found")))?;
        let category = self
            .store
            .find_category(article.category_id)
            .await?
            .ok_or_else(|| {
                AppError::internal(format!("Article {id} references a missing category"))
            })?;
        let paragraphs = self.store.list_paragraphs(id).await?;

        Ok(ArticleDetail {
            article,
            category,
            paragraphs,
        })
    }

    /// All categories by name.
    pub async fn list_categories(&self) -> AppResult<Vec<Category>> {
        self.store.list_categories().await
    }

    /// One category with a page of its articles.
    pub async fn get_category(&self, id: CategoryId, page: &PageRequest) -> AppResult<CategoryDetail> {
        let category = self
            .store
            .find_category(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Category {id} not found")))?;
        let filter = ArticleFilter {
            category_id: Some(id),
            query: None,
        };
        let articles = self.store.list_articles(&filter, page).await?;
        Ok(CategoryDetail { category, articles })
    }

    /// Case-insensitive search over title, summary, content, and tags.
    ///
    /// A blank query yields an empty page rather than every article.
    pub async fn search(&self, query: &str, page: &PageRequest) -> AppResult<PageResponse<ArticleSummary>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(PageResponse::new(Vec::new(), page.page, page.page_size, 0));
        }
        let filter = ArticleFilter {
            category_id: None,
            query: Some(query.to_string()),
        };
        self.store.list_articles(&filter, page).await
    }

    /// Insert a category.
    pub async fn create_category(&self, data: CreateCategory) -> AppResult<Category> {
        let data = CreateCategory {
            name: required_text("Category name", &data.name, MAX_CATEGORY_NAME)?,
            description: data.description,
        };
        let category = self.store.create_category(&data).await?;
        info!(category_id = %category.id, name = %category.name, "Category created");
        Ok(category)
    }

    /// Insert an article into an existing category.
    pub async fn create_article(&self, data: CreateArticle) -> AppResult<Article> {
        let title = required_text("Article title", &data.title, MAX_ARTICLE_TITLE)?;
        if self.store.find_category(data.category_id).await?.is_none() {
            return Err(AppError::not_found(format!(
                "Category {} not found",
                data.category_id
            )));
        }

        let tags = data
            .tags
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();
        let article = self
            .store
            .create_article(&CreateArticle { title, tags, ..data })
            .await?;
        info!(article_id = %article.id, category_id = %article.category_id, "Article created");
        Ok(article)
    }

    /// Append (or place) a paragraph in an existing article.
    pub async fn add_paragraph(&self, data: CreateParagraph) -> AppResult<Paragraph> {
        if data.content.trim().is_empty() {
            return Err(AppError::validation("Paragraph content must not be empty"));
        }
        if data.position.is_some_and(|p| p < 0) {
            return Err(AppError::validation("Paragraph position must not be negative"));
        }
        if self.store.find_article(data.article_id).await?.is_none() {
            return Err(AppError::not_found(format!(
                "Article {} not found",
                data.article_id
            )));
        }

        let paragraph = self.store.create_paragraph(&data).await?;
        info!(
            paragraph_id = %paragraph.id,
            article_id = %paragraph.article_id,
            position = paragraph.position,
            "Paragraph added"
        );
        Ok(paragraph)
    }
}

fn required_text(field: &str, value: &str, max_chars: usize) -> AppResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    if value.chars().count() > max_chars {
        return Err(AppError::validation(format!(
            "{field} must be at most {max_chars} characters"
        )));
    }
    Ok(value.to_string())
}
