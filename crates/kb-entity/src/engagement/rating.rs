//! Article rating entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use kb_core::types::{ArticleId, RatingId, UserId};

/// Lowest accepted rating.
pub const MIN_RATING: i16 = 1;
/// Highest accepted rating.
pub const MAX_RATING: i16 = 5;

/// One user's rating of one article. A user holds at most one per article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ArticleRating {
    /// Unique rating identifier.
    pub id: RatingId,
    /// Rated article.
    pub article_id: ArticleId,
    /// Rating user.
    pub user_id: UserId,
    /// Stars, `MIN_RATING..=MAX_RATING`.
    pub rating: i16,
    /// When the user first rated the article.
    pub created_at: DateTime<Utc>,
    /// When the rating last changed.
    pub updated_at: DateTime<Utc>,
}

/// Aggregate rating of an article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingSummary {
    /// The article.
    pub article_id: ArticleId,
    /// Number of ratings.
    pub count: u64,
    /// Mean rating, `None` when nobody has rated.
    pub average: Option<f64>,
    /// The caller's own rating, when signed in and rated.
    pub own_rating: Option<i16>,
}

impl RatingSummary {
    /// Summarize a set of ratings.
    pub fn from_ratings(article_id: ArticleId, ratings: &[i16], own_rating: Option<i16>) -> Self {
        let count = ratings.len() as u64;
        let average = (count > 0)
            .then(|| ratings.iter().map(|&r| f64::from(r)).sum::<f64>() / count as f64);
        Self {
            article_id,
            count,
            average,
            own_rating,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_average() {
        let id = ArticleId::new();
        let summary = RatingSummary::from_ratings(id, &[5, 4, 3], Some(4));
        assert_eq!(summary.count, 3);
        assert_eq!(summary.average, Some(4.0));
        assert_eq!(summary.own_rating, Some(4));

        let empty = RatingSummary::from_ratings(id, &[], None);
        assert_eq!(empty.count, 0);
        assert!(empty.average.is_none());
    }
}
