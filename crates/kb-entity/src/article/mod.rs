//! Knowledge-base content: categories, articles, and their paragraphs.

pub mod category;
pub mod model;
pub mod paragraph;

pub use category::{Category, CreateCategory};
pub use model::{Article, ArticleFilter, ArticleSummary, CreateArticle};
pub use paragraph::{CreateParagraph, Paragraph};
