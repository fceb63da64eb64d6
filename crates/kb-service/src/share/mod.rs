//! Secure share links: issuance, capacity eviction, resolution, and view
//! tracking.

pub mod access;
pub mod service;
pub mod settings;
pub mod token;
pub mod views;

#[cfg(test)]
mod tests;

pub use access::{AccessResolver, ShareResolution, SharedContent};
pub use service::{CreatedShareLink, ShareLinkService};
pub use settings::ShareSettingsService;
pub use token::{SecureTokenGenerator, TokenGenerator};
pub use views::ViewRecorder;
