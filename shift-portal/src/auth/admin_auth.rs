//! Admin API key authentication
//!
//! Admin routes expect `Authorization: Bearer <ADMIN_API_KEY>`. The key is
//! compared by SHA-256 digest against the one stored in [`AppState`].

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use sha2::{Digest, Sha256};
use shared::error::AppError;

use crate::state::AppState;

fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

pub async fn admin_auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, Response> {
    let key = bearer_token(&request)
        .ok_or_else(|| AppError::not_authenticated().into_response())?;

    let digest: [u8; 32] = Sha256::digest(key.as_bytes()).into();
    if digest != state.admin_key_digest {
        tracing::warn!(path = %request.uri().path(), "Rejected admin key");
        return Err(AppError::not_authenticated().into_response());
    }

    Ok(next.run(request).await)
}
