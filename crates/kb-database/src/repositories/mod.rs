//! PostgreSQL implementations of the store traits.

pub mod article;
pub mod engagement;
pub mod share;
pub mod share_settings;

pub use article::ArticleRepository;
pub use engagement::EngagementRepository;
pub use share::ShareLinkRepository;
pub use share_settings::ShareSettingsRepository;
