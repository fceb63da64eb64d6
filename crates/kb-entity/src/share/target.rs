//! What a share link points at.

use std::fmt;

use serde::{Deserialize, Serialize};

use kb_core::types::{ArticleId, ParagraphId};

/// The content a share link grants access to.
///
/// Equality doubles as the eviction bucket: an article-scoped link and a
/// paragraph-scoped link of the same article never count against each
/// other, and neither do links for two different paragraphs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum ShareTarget {
    /// A whole article.
    Article {
        /// The shared article.
        article_id: ArticleId,
    },
    /// A single paragraph, rendered within its article.
    Paragraph {
        /// The article owning the paragraph.
        article_id: ArticleId,
        /// The shared paragraph.
        paragraph_id: ParagraphId,
    },
}

impl ShareTarget {
    /// Target for a whole article.
    pub fn article(article_id: ArticleId) -> Self {
        Self::Article { article_id }
    }

    /// Target for one paragraph of an article.
    pub fn paragraph(article_id: ArticleId, paragraph_id: ParagraphId) -> Self {
        Self::Paragraph {
            article_id,
            paragraph_id,
        }
    }

    /// Rebuild a target from its storage columns.
    pub fn from_parts(article_id: ArticleId, paragraph_id: Option<ParagraphId>) -> Self {
        match paragraph_id {
            Some(paragraph_id) => Self::paragraph(article_id, paragraph_id),
            None => Self::article(article_id),
        }
    }

    /// The article this target belongs to.
    pub fn article_id(&self) -> ArticleId {
        match self {
            Self::Article { article_id } | Self::Paragraph { article_id, .. } => *article_id,
        }
    }

    /// The paragraph, for paragraph-scoped targets.
    pub fn paragraph_id(&self) -> Option<ParagraphId> {
        match self {
            Self::Article { .. } => None,
            Self::Paragraph { paragraph_id, .. } => Some(*paragraph_id),
        }
    }

    /// Stable string naming the eviction bucket, used as a lock key.
    pub fn bucket_key(&self) -> String {
        match self {
            Self::Article { article_id } => format!("share:article:{article_id}"),
            Self::Paragraph {
                article_id,
                paragraph_id,
            } => format!("share:paragraph:{article_id}:{paragraph_id}"),
        }
    }
}

impl fmt::Display for ShareTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Article { article_id } => write!(f, "article {article_id}"),
            Self::Paragraph {
                article_id,
                paragraph_id,
            } => write!(f, "paragraph {paragraph_id} of article {article_id}"),
        }
    }
}
