use std::cmp::Reverse;

use async_trait::async_trait;
use chrono::Utc;

use kb_core::error::AppError;
use kb_core::result::AppResult;
use kb_core::types::{ArticleId, CategoryId, PageRequest, PageResponse, ParagraphId};
use kb_entity::article::{
    Article, ArticleFilter, ArticleSummary, Category, CreateArticle, CreateCategory,
    CreateParagraph, Paragraph,
};

use super::MemoryStore;
use crate::traits::ArticleStore;

#[async_trait]
impl ArticleStore for MemoryStore {
    async fn list_categories(&self) -> AppResult<Vec<Category>> {
        let state = self.state.read().await;
        let mut categories = state.categories.clone();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn find_category(&self, id: CategoryId) -> AppResult<Option<Category>> {
        let state = self.state.read().await;
        Ok(state.categories.iter().find(|c| c.id == id).cloned())
    }

    async fn create_category(&self, data: &CreateCategory) -> AppResult<Category> {
        let category = Category {
            id: CategoryId::new(),
            name: data.name.clone(),
            description: data.description.clone(),
        };
        self.state.write().await.categories.push(category.clone());
        Ok(category)
    }

    async fn list_articles(
        &self,
        filter: &ArticleFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<ArticleSummary>> {
        let state = self.state.read().await;
        let mut matching: Vec<ArticleSummary> = state
            .articles
            .iter()
            .rev()
            .filter(|a| filter.category_id.is_none_or(|id| a.category_id == id))
            .filter(|a| filter.query.as_deref().is_none_or(|q| a.matches_query(q)))
            .map(|a| ArticleSummary {
                id: a.id,
                title: a.title.clone(),
                summary: a.summary.clone(),
                category_id: a.category_id,
                category_name: state
                    .categories
                    .iter()
                    .find(|c| c.id == a.category_id)
                    .map(|c| c.name.clone())
                    .unwrap_or_default(),
                created_at: a.created_at,
            })
            .collect();
        matching.sort_by_key(|a| Reverse(a.created_at));
        Ok(PageResponse::from_all(matching, page))
    }

    async fn find_article(&self, id: ArticleId) -> AppResult<Option<Article>> {
        let state = self.state.read().await;
        Ok(state.articles.iter().find(|a| a.id == id).cloned())
    }

    async fn create_article(&self, data: &CreateArticle) -> AppResult<Article> {
        let mut state = self.state.write().await;
        if !state.categories.iter().any(|c| c.id == data.category_id) {
            return Err(AppError::not_found("Category not found"));
        }
        let now = Utc::now();
        let article = Article {
            id: ArticleId::new(),
            category_id: data.category_id,
            title: data.title.clone(),
            summary: data.summary.clone(),
            content: data.content.clone(),
            tags: data.tags.clone(),
            created_at: now,
            updated_at: now,
        };
        state.articles.push(article.clone());
        Ok(article)
    }

    async fn list_paragraphs(&self, article_id: ArticleId) -> AppResult<Vec<Paragraph>> {
        let state = self.state.read().await;
        let mut paragraphs: Vec<Paragraph> = state
            .paragraphs
            .iter()
            .filter(|p| p.article_id == article_id)
            .cloned()
            .collect();
        paragraphs.sort_by_key(|p| p.position);
        Ok(paragraphs)
    }

    async fn find_paragraph(&self, id: ParagraphId) -> AppResult<Option<Paragraph>> {
        let state = self.state.read().await;
        Ok(state.paragraphs.iter().find(|p| p.id == id).cloned())
    }

    async fn create_paragraph(&self, data: &CreateParagraph) -> AppResult<Paragraph> {
        let mut state = self.state.write().await;
        if !state.articles.iter().any(|a| a.id == data.article_id) {
            return Err(AppError::not_found("Article not found"));
        }
        let position = data.position.unwrap_or_else(|| {
            state
                .paragraphs
                .iter()
                .filter(|p| p.article_id == data.article_id)
                .map(|p| p.position + 1)
                .max()
                .unwrap_or(0)
        });
        let paragraph = Paragraph {
            id: ParagraphId::new(),
            article_id: data.article_id,
            title: data.title.clone(),
            content: data.content.clone(),
            position,
        };
        state.paragraphs.push(paragraph.clone());
        Ok(paragraph)
    }
}
