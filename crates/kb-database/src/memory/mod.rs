//! Process-local store backed by a single `RwLock`.
//!
//! Every trait method takes the lock once, so multi-step operations such
//! as evict-then-insert are atomic with respect to each other. Records are
//! kept in insertion order, which breaks `created_at` ties.

mod article;
mod engagement;
mod share;

use std::sync::Arc;

use tokio::sync::RwLock;

use kb_entity::article::{Article, Category, Paragraph};
use kb_entity::engagement::{ArticleComment, ArticleRating, ParagraphLike};
use kb_entity::share::{ShareLink, ShareLinkView, ShareSettings};

#[derive(Debug, Default)]
struct MemoryState {
    categories: Vec<Category>,
    articles: Vec<Article>,
    paragraphs: Vec<Paragraph>,
    links: Vec<ShareLink>,
    views: Vec<ShareLinkView>,
    settings: Option<ShareSettings>,
    ratings: Vec<ArticleRating>,
    comments: Vec<ArticleComment>,
    likes: Vec<ParagraphLike>,
}

/// In-memory implementation of every store trait. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}
