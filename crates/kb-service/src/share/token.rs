//! Share token generation.

use std::fmt::Debug;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

/// Number of random bytes behind each token (256 bits).
pub const TOKEN_BYTES: usize = 32;

/// Source of share tokens.
pub trait TokenGenerator: Send + Sync + Debug + 'static {
    /// Produce a new URL-safe token.
    fn generate(&self) -> String;
}

/// Tokens from the thread-local CSPRNG, URL-safe base64 without padding.
#[derive(Debug, Clone, Copy, Default)]
pub struct SecureTokenGenerator;

impl TokenGenerator for SecureTokenGenerator {
    fn generate(&self) -> String {
        let bytes: [u8; TOKEN_BYTES] = rand::random();
        URL_SAFE_NO_PAD.encode(bytes)
    }
}
