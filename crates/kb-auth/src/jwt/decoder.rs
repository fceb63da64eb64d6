//! Token verification.

use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use tracing::debug;

use kb_core::config::AuthConfig;
use kb_core::error::AppError;
use kb_entity::user::AuthenticatedUser;

use super::claims::Claims;

/// Verifies HS256 access tokens.
#[derive(Clone)]
pub struct JwtDecoder {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtDecoder")
            .field("validation", &self.validation)
            .finish()
    }
}

impl JwtDecoder {
    /// Create a decoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 5;

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        }
    }

    /// Verify signature and expiry and return the claims.
    pub fn decode(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                debug!(error = %e, "Rejected bearer token");
                match e.kind() {
                    JwtErrorKind::ExpiredSignature => AppError::authentication("Token has expired"),
                    JwtErrorKind::InvalidSignature => {
                        AppError::authentication("Invalid token signature")
                    }
                    _ => AppError::authentication("Invalid token"),
                }
            })
    }

    /// Verify a token and return the caller it identifies.
    pub fn authenticate(&self, token: &str) -> Result<AuthenticatedUser, AppError> {
        self.decode(token).map(Claims::into_user)
    }
}

#[cfg(test)]
mod tests {
    use kb_core::error::ErrorKind;
    use kb_core::types::UserId;
    use kb_entity::user::UserRole;

    use super::*;
    use crate::jwt::JwtEncoder;

    fn config(secret: &str) -> AuthConfig {
        AuthConfig {
            jwt_secret: secret.to_string(),
            ..Default::default()
        }
    }

    fn user() -> AuthenticatedUser {
        AuthenticatedUser {
            user_id: UserId::new(),
            username: "alice".to_string(),
            role: UserRole::Admin,
        }
    }

    #[test]
    fn test_issued_token_authenticates() {
        let user = user();
        let issued = JwtEncoder::new(&config("secret")).issue(&user).unwrap();
        let decoded = JwtDecoder::new(&config("secret"))
            .authenticate(&issued.token)
            .unwrap();
        assert_eq!(decoded, user);
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let issued = JwtEncoder::new(&config("one")).issue(&user()).unwrap();
        let err = JwtDecoder::new(&config("two"))
            .authenticate(&issued.token)
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authentication);
    }

    #[test]
    fn test_garbage_is_rejected() {
        let err = JwtDecoder::new(&config("secret"))
            .authenticate("not-a-jwt")
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authentication);
    }
}
