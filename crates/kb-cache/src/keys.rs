//! Cache key builders.
//!
//! Every key the application writes is built here.

/// Prefix applied to all cache keys.
const PREFIX: &str = "kb";

/// The share-settings singleton.
pub fn share_settings() -> String {
    format!("{PREFIX}:share:settings")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_namespaced() {
        assert_eq!(share_settings(), "kb:share:settings");
    }
}
