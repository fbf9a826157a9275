//! Bearer-token authentication for dashboard routes

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use super::jwt::{JwtError, JwtManager};
use crate::error::ApiError;

/// Signed-in dashboard user, inserted as a request extension
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
}

fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer ").or_else(|| h.strip_prefix("bearer ")))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Reject requests without a valid Supabase access token
pub async fn require_auth(
    State(jwt): State<JwtManager>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(&request).ok_or(ApiError::Unauthorized)?;

    let claims = jwt.validate_supabase_token(token).map_err(|e| {
        match &e {
            JwtError::Expired => tracing::debug!("Rejected expired access token"),
            other => tracing::warn!(error = %other, "Rejected access token"),
        }
        ApiError::InvalidToken
    })?;
    let user_id = claims.user_id().map_err(|_| ApiError::InvalidToken)?;

    request.extensions_mut().insert(AuthUser { user_id });

    Ok(next.run(request).await)
}
