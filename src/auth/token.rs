use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use tracing::{debug, instrument};

use super::types::{Identity, IdentityClaims};
use crate::shared::AppError;

/// Signing and validation of identity tokens (HS256)
#[derive(Clone)]
pub struct TokenConfig {
    secret: String,
    pub expiration_days: i64,
}

impl TokenConfig {
    pub fn new(secret: impl Into<String>, expiration_days: i64) -> Self {
        Self {
            secret: secret.into(),
            expiration_days,
        }
    }

    /// Creates a signed token for the given user
    #[instrument(skip(self, username))]
    pub fn create_token(&self, user_id: &str, username: &str) -> Result<String, AppError> {
        let now = Utc::now();
        let exp = Duration::try_days(self.expiration_days)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or_else(|| {
                AppError::JwtError(format!(
                    "token lifetime of {} days is out of range",
                    self.expiration_days
                ))
            })?
            .timestamp() as usize;

        debug!(
            expiration_days = self.expiration_days,
            exp_timestamp = exp,
            "Creating JWT token with expiration"
        );

        let claims = IdentityClaims {
            user_id: user_id.to_string(),
            username: username.to_string(),
            exp,
            iat: now.timestamp() as usize,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_ref()),
        )
        .map_err(|e| {
            debug!(error = %e, "Failed to encode JWT token");
            AppError::JwtError(e.to_string())
        })
    }

    /// Validates a token and returns the identity it carries
    #[instrument(skip(self, token))]
    pub fn validate_token(&self, token: &str) -> Result<Identity, AppError> {
        decode::<IdentityClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_ref()),
            &Validation::default(),
        )
        .map(|data| {
            debug!(
                user_id = %data.claims.user_id,
                username = %data.claims.username,
                exp = data.claims.exp,
                "JWT token decoded successfully"
            );
            Identity::from(data.claims)
        })
        .map_err(|e| {
            debug!(error = %e, "Failed to decode JWT token");
            AppError::Unauthorized(format!("Invalid token: {}", e))
        })
    }
}
