//! Supabase JWT validation
//!
//! The dashboard signs users in with Supabase; the API only verifies the
//! access tokens Supabase issues and never mints its own.

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Audience Supabase puts on tokens of signed-in users
pub const SUPABASE_AUDIENCE: &str = "authenticated";

/// JWT claims structure for Supabase-issued tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupabaseClaims {
    /// Subject (user ID as string, parsed to UUID by `user_id`)
    pub sub: String,
    pub email: Option<String>,
    /// Role (authenticated, anon, etc.)
    pub role: Option<String>,
    pub aud: Option<String>,
    pub iat: Option<i64>,
    pub exp: i64,
}

impl SupabaseClaims {
    pub fn user_id(&self) -> Result<Uuid, JwtError> {
        Uuid::parse_str(&self.sub).map_err(|_| JwtError::Invalid)
    }
}

/// JWT manager for token operations
#[derive(Clone)]
pub struct JwtManager {
    decoding_key: DecodingKey,
}

impl JwtManager {
    pub fn new(supabase_secret: &str) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(supabase_secret.as_bytes()),
        }
    }

    /// Validate a Supabase-issued JWT token
    /// Explicit algorithm and audience validation
    pub fn validate_supabase_token(&self, token: &str) -> Result<SupabaseClaims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 60; // 60 second clock skew tolerance
        validation.set_audience(&[SUPABASE_AUDIENCE]);

        match decode::<SupabaseClaims>(token, &self.decoding_key, &validation) {
            Ok(data) => Ok(data.claims),
            Err(e) => match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => Err(JwtError::Expired),
                jsonwebtoken::errors::ErrorKind::InvalidToken => Err(JwtError::Invalid),
                jsonwebtoken::errors::ErrorKind::InvalidAlgorithm => Err(JwtError::Invalid),
                jsonwebtoken::errors::ErrorKind::InvalidSignature => Err(JwtError::Invalid),
                jsonwebtoken::errors::ErrorKind::InvalidAudience => {
                    tracing::warn!("Supabase JWT audience validation failed - rejecting token");
                    Err(JwtError::Invalid)
                }
                _ => Err(JwtError::Validation(e.to_string())),
            },
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("Token has expired")]
    Expired,
    #[error("Invalid token")]
    Invalid,
    #[error("Token validation failed: {0}")]
    Validation(String),
}
