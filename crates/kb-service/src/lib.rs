//! # kb-service
//!
//! Business logic for the knowledge base. Services receive their stores,
//! cache, and collaborators as `Arc`s at construction time and are shared
//! across request tasks.

pub mod article;
pub mod context;
pub mod engagement;
pub mod share;

pub use article::ArticleService;
pub use context::RequestContext;
pub use engagement::EngagementService;
pub use share::{
    AccessResolver, CreatedShareLink, SecureTokenGenerator, ShareLinkService, ShareResolution,
    ShareSettingsService, SharedContent, TokenGenerator, ViewRecorder,
};
