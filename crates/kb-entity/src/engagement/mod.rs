//! Reader engagement: article ratings, moderated comments, and paragraph
//! likes. Every record belongs to a signed-in user.

pub mod comment;
pub mod like;
pub mod rating;

pub use comment::{ArticleComment, CommentFilter, NewComment};
pub use like::{LikeSummary, ParagraphLike};
pub use rating::{ArticleRating, RatingSummary, MAX_RATING, MIN_RATING};
