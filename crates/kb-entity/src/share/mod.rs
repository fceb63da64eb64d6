//! Secure share-link domain entities.

pub mod link;
pub mod settings;
pub mod target;
pub mod view;

pub use link::{LinkState, NewShareLink, ShareLink, ShareLinkFilter, ShareLinkInsert};
pub use settings::{ShareSettings, UpdateShareSettings};
pub use target::ShareTarget;
pub use view::{ShareLinkView, ViewerInfo};
