//! Article, category, and paragraph repository.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;

use kb_core::error::{AppError, ErrorKind};
use kb_core::result::AppResult;
use kb_core::types::{ArticleId, CategoryId, PageRequest, PageResponse, ParagraphId};
use kb_entity::article::{
    Article, ArticleFilter, ArticleSummary, Category, CreateArticle, CreateCategory,
    CreateParagraph, Paragraph,
};

use crate::traits::ArticleStore;

const SUMMARY_COLUMNS: &str = "a.id, a.title, a.summary, a.category_id, \
     c.name AS category_name, a.created_at";

const SUMMARY_WHERE: &str = "($1::uuid IS NULL OR a.category_id = $1) \
     AND ($2::text IS NULL OR a.title ILIKE $2 OR a.summary ILIKE $2 OR a.content ILIKE $2 \
     OR EXISTS (SELECT 1 FROM unnest(a.tags) AS tag WHERE tag ILIKE $2))";

/// PostgreSQL-backed [`ArticleStore`].
#[derive(Debug, Clone)]
pub struct ArticleRepository {
    pool: PgPool,
}

impl ArticleRepository {
    /// Create a new article repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Escape `LIKE` metacharacters and wrap the text for a substring match.
pub(crate) fn contains_pattern(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len() + 2);
    escaped.push('%');
    for ch in query.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

#[async_trait]
impl ArticleStore for ArticleRepository {
    async fn list_categories(&self) -> AppResult<Vec<Category>> {
        sqlx::query_as::<_, Category>("SELECT * FROM categories ORDER BY name, id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list categories", e))
    }

    async fn find_category(&self, id: CategoryId) -> AppResult<Option<Category>> {
        sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find category", e))
    }

    async fn create_category(&self, data: &CreateCategory) -> AppResult<Category> {
        sqlx::query_as::<_, Category>(
            "INSERT INTO categories (id, name, description) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(CategoryId::new())
        .bind(&data.name)
        .bind(&data.description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create category", e))
    }

    async fn list_articles(
        &self,
        filter: &ArticleFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<ArticleSummary>> {
        let pattern = filter.query.as_deref().map(contains_pattern);

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM articles a JOIN categories c ON c.id = a.category_id \
             WHERE {SUMMARY_WHERE}"
        ))
        .bind(filter.category_id)
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count articles", e))?;

        let items = sqlx::query_as::<_, ArticleSummary>(&format!(
            "SELECT {SUMMARY_COLUMNS} FROM articles a JOIN categories c ON c.id = a.category_id \
             WHERE {SUMMARY_WHERE} ORDER BY a.created_at DESC, a.id DESC LIMIT $3 OFFSET $4"
        ))
        .bind(filter.category_id)
        .bind(&pattern)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list articles", e))?;

        Ok(PageResponse::new(
            items,
            page.page,
            page.page_size,
            total as u64,
        ))
    }

    async fn find_article(&self, id: ArticleId) -> AppResult<Option<Article>> {
        sqlx::query_as::<_, Article>("SELECT * FROM articles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find article", e))
    }

    async fn create_article(&self, data: &CreateArticle) -> AppResult<Article> {
        let now = Utc::now();
        sqlx::query_as::<_, Article>(
            "INSERT INTO articles (id, category_id, title, summary, content, tags, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $7) RETURNING *",
        )
        .bind(ArticleId::new())
        .bind(data.category_id)
        .bind(&data.title)
        .bind(&data.summary)
        .bind(&data.content)
        .bind(&data.tags)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if e.as_database_error()
                .is_some_and(|db| db.is_foreign_key_violation())
            {
                AppError::with_source(ErrorKind::NotFound, "Category not found", e)
            } else {
                AppError::with_source(ErrorKind::Database, "Failed to create article", e)
            }
        })
    }

    async fn list_paragraphs(&self, article_id: ArticleId) -> AppResult<Vec<Paragraph>> {
        sqlx::query_as::<_, Paragraph>(
            "SELECT * FROM paragraphs WHERE article_id = $1 ORDER BY position, id",
        )
        .bind(article_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list paragraphs", e))
    }

    async fn find_paragraph(&self, id: ParagraphId) -> AppResult<Option<Paragraph>> {
        sqlx::query_as::<_, Paragraph>("SELECT * FROM paragraphs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find paragraph", e))
    }

    async fn create_paragraph(&self, data: &CreateParagraph) -> AppResult<Paragraph> {
        sqlx::query_as::<_, Paragraph>(
            "INSERT INTO paragraphs (id, article_id, title, content, position) \
             VALUES ($1, $2, $3, $4, COALESCE($5, \
                 (SELECT COALESCE(MAX(position), -1) + 1 FROM paragraphs WHERE article_id = $2))) \
             RETURNING *",
        )
        .bind(ParagraphId::new())
        .bind(data.article_id)
        .bind(&data.title)
        .bind(&data.content)
        .bind(data.position)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if e.as_database_error()
                .is_some_and(|db| db.is_foreign_key_violation())
            {
                AppError::with_source(ErrorKind::NotFound, "Article not found", e)
            } else {
                AppError::with_source(ErrorKind::Database, "Failed to create paragraph", e)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("rust"), "%rust%");
        assert_eq!(contains_pattern("100%_done"), "%100\\%\\_done%");
        assert_eq!(contains_pattern("a\\b"), "%a\\\\b%");
    }
}
