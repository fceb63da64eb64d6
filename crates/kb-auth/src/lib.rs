//! # kb-auth
//!
//! Recognizes the caller from an HS256 bearer token. Accounts, passwords,
//! and login flows belong to the external identity provider; this crate
//! only verifies and (for operators and tests) mints tokens.

pub mod jwt;

pub use jwt::{Claims, JwtDecoder, JwtEncoder};
