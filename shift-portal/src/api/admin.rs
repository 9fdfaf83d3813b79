//! Admin API handlers
//!
//! POST /api/admin/tokens                — issue (or reuse) one employee's token
//! POST /api/admin/tokens/batch          — issue tokens for a whole business week
//! POST /api/admin/tokens/revoke         — revoke a token
//! GET  /api/admin/employees/{id}/tokens — list an employee's tokens

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use shared::error::{ApiResponse, AppError, ErrorCode};
use shared::models::{ShiftToken, TokenContext, TokenStatus};
use shared::util::now_millis;

use super::{ApiResult, parse_body};
use crate::service::{self, IssuedToken, SkippedEmployee};
use crate::state::{AppState, PortalSettings};

// ── Request types ──

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueRequest {
    pub employee_id: i64,
    pub week_start_date: NaiveDate,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchRequest {
    pub business_id: i64,
    pub week_start_date: NaiveDate,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevokeRequest {
    pub token_id: i64,
}

// ── Response types ──

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminTokenData {
    pub id: i64,
    pub token: String,
    pub link: String,
    pub employee_id: i64,
    pub business_id: i64,
    pub week_start_date: NaiveDate,
    pub week_end_date: NaiveDate,
    pub expires_at: i64,
    pub context_type: TokenContext,
    pub status: TokenStatus,
    pub uses_count: i32,
    pub max_submissions: i32,
    pub created_at: i64,
    pub revoked_at: Option<i64>,
}

impl AdminTokenData {
    fn new(token: ShiftToken, settings: &PortalSettings, now: i64) -> Self {
        Self {
            link: settings.link_for(&token.token),
            status: token.status(now),
            id: token.id,
            employee_id: token.employee_id,
            business_id: token.business_id,
            week_start_date: token.week_start_date,
            week_end_date: token.week_end_date,
            expires_at: token.expires_at,
            context_type: token.context_type,
            uses_count: token.uses_count,
            max_submissions: token.max_submissions,
            created_at: token.created_at,
            revoked_at: token.revoked_at,
            token: token.token,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedTokenData {
    #[serde(flatten)]
    pub token: AdminTokenData,
    pub reused: bool,
}

impl IssuedTokenData {
    fn new(issued: IssuedToken, settings: &PortalSettings, now: i64) -> Self {
        Self {
            token: AdminTokenData::new(issued.token, settings, now),
            reused: issued.reused,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedData {
    pub employee_id: i64,
    pub name: String,
    pub reason: ErrorCode,
}

impl From<SkippedEmployee> for SkippedData {
    fn from(s: SkippedEmployee) -> Self {
        Self {
            employee_id: s.employee_id,
            name: s.name,
            reason: s.reason,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchData {
    pub week_start_date: NaiveDate,
    pub week_end_date: NaiveDate,
    pub issued: Vec<IssuedTokenData>,
    pub skipped: Vec<SkippedData>,
}

#[derive(Debug, Serialize)]
pub struct RevokeData {
    pub success: bool,
    /// `false` when the token was already revoked
    pub revoked: bool,
}

// ── Handlers ──

pub async fn issue_token(
    State(state): State<AppState>,
    payload: Result<Json<IssueRequest>, JsonRejection>,
) -> ApiResult<IssuedTokenData> {
    let req = parse_body(payload)?;
    let now = now_millis();
    let issued = service::issue_token(
        state.store.as_ref(),
        &state.settings,
        req.employee_id,
        req.week_start_date,
        now,
    )
    .await
    .map_err(AppError::from)?;

    Ok(Json(ApiResponse::success(IssuedTokenData::new(
        issued,
        &state.settings,
        now,
    ))))
}

pub async fn issue_week_tokens(
    State(state): State<AppState>,
    payload: Result<Json<BatchRequest>, JsonRejection>,
) -> ApiResult<BatchData> {
    let req = parse_body(payload)?;
    let now = now_millis();
    let batch = service::issue_week_tokens(
        state.store.as_ref(),
        &state.settings,
        req.business_id,
        req.week_start_date,
        now,
    )
    .await
    .map_err(AppError::from)?;

    Ok(Json(ApiResponse::success(BatchData {
        week_start_date: batch.week.start,
        week_end_date: batch.week.end,
        issued: batch
            .issued
            .into_iter()
            .map(|t| IssuedTokenData::new(t, &state.settings, now))
            .collect(),
        skipped: batch.skipped.into_iter().map(SkippedData::from).collect(),
    })))
}

pub async fn revoke_token(
    State(state): State<AppState>,
    payload: Result<Json<RevokeRequest>, JsonRejection>,
) -> ApiResult<RevokeData> {
    let req = parse_body(payload)?;
    let revoked = service::revoke_token(state.store.as_ref(), req.token_id, now_millis())
        .await
        .map_err(AppError::from)?;

    Ok(Json(ApiResponse::success(RevokeData {
        success: true,
        revoked,
    })))
}

pub async fn list_tokens(
    State(state): State<AppState>,
    Path(employee_id): Path<i64>,
) -> ApiResult<Vec<AdminTokenData>> {
    let now = now_millis();
    let tokens = service::list_tokens(state.store.as_ref(), employee_id)
        .await
        .map_err(AppError::from)?;

    Ok(Json(ApiResponse::success(
        tokens
            .into_iter()
            .map(|t| AdminTokenData::new(t, &state.settings, now))
            .collect(),
    )))
}
