//! HTTP routes
//!
//! - `/api/shift-token/*`: public, token in the body, rate limited per IP
//! - `/api/admin/*`: bearer `ADMIN_API_KEY`
//! - `/health`

pub mod admin;
pub mod health;
pub mod shift_token;

use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::extract::rejection::JsonRejection;
use axum::routing::{get, post};
use axum::{Json, Router, middleware};
use shared::error::{AppError, ErrorCode};
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{admin_auth_middleware, token_rate_limit};
use crate::state::AppState;

/// Request body limit
const BODY_LIMIT: usize = 64 * 1024;

/// Handler result: enveloped JSON or an `AppError`
type ApiResult<T> = Result<Json<shared::error::ApiResponse<T>>, AppError>;

/// Map a JSON body rejection into the error envelope
fn parse_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::with_message(ErrorCode::InvalidRequest, rejection.body_text()))
}

pub fn create_router(state: AppState) -> Router {
    let public = Router::new()
        .route("/api/shift-token/context", post(shift_token::context))
        .route("/api/shift-token/submit", post(shift_token::submit))
        .layer(middleware::from_fn_with_state(state.clone(), token_rate_limit));

    let admin = Router::new()
        .route("/api/admin/tokens", post(admin::issue_token))
        .route("/api/admin/tokens/batch", post(admin::issue_week_tokens))
        .route("/api/admin/tokens/revoke", post(admin::revoke_token))
        .route("/api/admin/employees/{id}/tokens", get(admin::list_tokens))
        .layer(middleware::from_fn_with_state(state.clone(), admin_auth_middleware));

    Router::new()
        .route("/health", get(health::health_check))
        .merge(public)
        .merge(admin)
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(TimeoutLayer::with_status_code(
            http::StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
