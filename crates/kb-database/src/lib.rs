//! # kb-database
//!
//! Store traits for every persisted entity, their PostgreSQL
//! implementations, and process-local in-memory implementations used by
//! tests and `database.backend = "memory"` development runs.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod stores;
pub mod traits;

pub use connection::DatabasePool;
pub use memory::MemoryStore;
pub use stores::Stores;
pub use traits::{ArticleStore, EngagementStore, ShareLinkStore, ShareSettingsStore};
