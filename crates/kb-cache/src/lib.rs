//! # kb-cache
//!
//! Cache providers for the knowledge base. The in-process provider is
//! backed by [moka](https://crates.io/crates/moka) with per-entry TTLs;
//! [`CacheManager`] dispatches to whichever provider configuration selects.

pub mod keys;
pub mod memory;
pub mod provider;

pub use provider::CacheManager;
