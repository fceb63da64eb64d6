//! Store traits implemented by the PostgreSQL repositories and the
//! in-memory store.
//!
//! Operations that must be atomic (evict-then-insert, view recording) are
//! single trait methods so each backend can hold one lock or transaction
//! across the whole sequence.

use std::fmt::Debug;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use kb_core::result::AppResult;
use kb_core::types::{
    ArticleId, CategoryId, CommentId, PageRequest, PageResponse, ParagraphId, ShareLinkId,
    UserId,
};
use kb_entity::article::{
    Article, ArticleFilter, ArticleSummary, Category, CreateArticle, CreateCategory,
    CreateParagraph, Paragraph,
};
use kb_entity::engagement::{
    ArticleComment, ArticleRating, CommentFilter, LikeSummary, NewComment, ParagraphLike,
    RatingSummary,
};
use kb_entity::share::{
    NewShareLink, ShareLink, ShareLinkFilter, ShareLinkInsert, ShareLinkView, ShareSettings,
    ShareTarget, UpdateShareSettings, ViewerInfo,
};

/// Categories, articles, and paragraphs.
#[async_trait]
pub trait ArticleStore: Send + Sync + Debug + 'static {
    /// All categories ordered by name.
    async fn list_categories(&self) -> AppResult<Vec<Category>>;

    /// Find a category by ID.
    async fn find_category(&self, id: CategoryId) -> AppResult<Option<Category>>;

    /// Insert a category.
    async fn create_category(&self, data: &CreateCategory) -> AppResult<Category>;

    /// Article summaries matching `filter`, newest first.
    async fn list_articles(
        &self,
        filter: &ArticleFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<ArticleSummary>>;

    /// Find an article by ID.
    async fn find_article(&self, id: ArticleId) -> AppResult<Option<Article>>;

    /// Insert an article. Fails with `NotFound` when the category is unknown.
    async fn create_article(&self, data: &CreateArticle) -> AppResult<Article>;

    /// Paragraphs of an article ordered by position.
    async fn list_paragraphs(&self, article_id: ArticleId) -> AppResult<Vec<Paragraph>>;

    /// Find a paragraph by ID.
    async fn find_paragraph(&self, id: ParagraphId) -> AppResult<Option<Paragraph>>;

    /// Insert a paragraph, appending it when no position is given.
    async fn create_paragraph(&self, data: &CreateParagraph) -> AppResult<Paragraph>;
}

/// Share links and their view log.
#[async_trait]
pub trait ShareLinkStore: Send + Sync + Debug + 'static {
    /// Atomically make room for and insert a new link.
    ///
    /// Counts the links of the same target that are valid at `now`. When
    /// that count is at least `max_valid`, the oldest (by `created_at`,
    /// then `id`) are deactivated until `max_valid - 1` remain. The new
    /// link is then inserted active with zero views.
    ///
    /// A duplicate token fails with `ErrorKind::TokenCollision` and leaves
    /// every existing link untouched.
    async fn insert_with_cap(
        &self,
        link: NewShareLink,
        max_valid: u32,
        now: DateTime<Utc>,
    ) -> AppResult<ShareLinkInsert>;

    /// Find a link by token, whatever its state.
    async fn find_by_token(&self, token: &str) -> AppResult<Option<ShareLink>>;

    /// Find a link by ID.
    async fn find_by_id(&self, id: ShareLinkId) -> AppResult<Option<ShareLink>>;

    /// Links matching `filter`, newest first.
    async fn list(
        &self,
        filter: &ShareLinkFilter,
        page: &PageRequest,
        now: DateTime<Utc>,
    ) -> AppResult<PageResponse<ShareLink>>;

    /// Number of links of `target` valid at `now`.
    async fn count_valid(&self, target: &ShareTarget, now: DateTime<Utc>) -> AppResult<u64>;

    /// Atomically bump the view counter, stamp `last_accessed_at`, and
    /// append a view record. Returns `None`, recording nothing, when the
    /// link no longer exists or is not valid at `now`.
    async fn record_view(
        &self,
        link_id: ShareLinkId,
        viewer: ViewerInfo,
        now: DateTime<Utc>,
    ) -> AppResult<Option<ShareLink>>;

    /// View records of a link, newest first.
    async fn list_views(
        &self,
        link_id: ShareLinkId,
        page: &PageRequest,
    ) -> AppResult<PageResponse<ShareLinkView>>;

    /// Deactivate the given links. Returns how many were active before.
    async fn deactivate_many(&self, ids: &[ShareLinkId]) -> AppResult<u64>;

    /// Hard-delete links with `expires_at < now` along with their views.
    async fn delete_expired(&self, now: DateTime<Utc>) -> AppResult<u64>;
}

/// The share-settings singleton. Settings are never deleted.
#[async_trait]
pub trait ShareSettingsStore: Send + Sync + Debug + 'static {
    /// Return the settings row, creating it with defaults if absent.
    async fn get_or_create(&self, now: DateTime<Utc>) -> AppResult<ShareSettings>;

    /// `updated_at` of the stored row, or `None` before it exists.
    async fn last_updated(&self) -> AppResult<Option<DateTime<Utc>>>;

    /// Apply a partial update and return the stored result.
    async fn update(
        &self,
        update: &UpdateShareSettings,
        now: DateTime<Utc>,
    ) -> AppResult<ShareSettings>;
}

/// Ratings, comments, and paragraph likes.
#[async_trait]
pub trait EngagementStore: Send + Sync + Debug + 'static {
    /// Insert or replace the user's rating of an article.
    async fn upsert_rating(
        &self,
        article_id: ArticleId,
        user_id: UserId,
        rating: i16,
        now: DateTime<Utc>,
    ) -> AppResult<ArticleRating>;

    /// Count and mean of an article's ratings, plus `viewer`'s own.
    async fn rating_summary(
        &self,
        article_id: ArticleId,
        viewer: Option<UserId>,
    ) -> AppResult<RatingSummary>;

    /// Store a comment, unapproved.
    async fn insert_comment(&self, comment: NewComment, now: DateTime<Utc>)
    -> AppResult<ArticleComment>;

    /// Find a comment by ID.
    async fn find_comment(&self, id: CommentId) -> AppResult<Option<ArticleComment>>;

    /// Comments matching `filter`, oldest first.
    async fn list_comments(
        &self,
        filter: &CommentFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<ArticleComment>>;

    /// Set `is_approved` on the given comments. Returns how many changed.
    async fn set_comment_approval(
        &self,
        ids: &[CommentId],
        approved: bool,
        now: DateTime<Utc>,
    ) -> AppResult<u64>;

    /// Insert or replace the user's vote on a paragraph.
    async fn upsert_like(
        &self,
        paragraph_id: ParagraphId,
        user_id: UserId,
        is_like: bool,
        now: DateTime<Utc>,
    ) -> AppResult<ParagraphLike>;

    /// Remove the user's vote. Returns whether one existed.
    async fn remove_like(&self, paragraph_id: ParagraphId, user_id: UserId) -> AppResult<bool>;

    /// Like and dislike counts of a paragraph, plus `viewer`'s own vote.
    async fn like_summary(
        &self,
        paragraph_id: ParagraphId,
        viewer: Option<UserId>,
    ) -> AppResult<LikeSummary>;
}
