//! Built-in job handler implementations.

pub mod share_cleanup;

pub use share_cleanup::{SHARE_CLEANUP, ShareCleanupHandler};
