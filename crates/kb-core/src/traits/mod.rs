//! Core traits defined in `kb-core` and implemented by other crates.

pub mod cache;

pub use cache::CacheProvider;
