//! Token holder API
//!
//! POST /api/shift-token/context — token → token data, page context, shifts
//! POST /api/shift-token/submit  — record weekly choices

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use shared::error::{ApiResponse, AppError};
use shared::models::{
    EmployeeBranchAssignment, ShiftChoice, ShiftSubmission, ShiftToken, TokenContext, TokenStatus,
    Week,
};
use shared::util::now_millis;

use super::{ApiResult, parse_body};
use crate::service::{self, OfferedShift, SubmissionInput, TokenView};
use crate::state::AppState;

// ── Request types ──

#[derive(Debug, Deserialize)]
pub struct ContextRequest {
    pub token: String,
}

/// A choice is either a bare slot id or `{ "slotId": .. }`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ChoiceRequest {
    Id(i64),
    Slot {
        #[serde(rename = "slotId")]
        slot_id: i64,
    },
}

impl ChoiceRequest {
    fn slot_id(&self) -> i64 {
        match self {
            Self::Id(id) | Self::Slot { slot_id: id } => *id,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    pub token: String,
    #[serde(default)]
    pub choices: Vec<ChoiceRequest>,
    pub preference_level: Option<i16>,
    pub notes: Option<String>,
}

// ── Response types ──

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenData {
    pub id: i64,
    pub employee_id: i64,
    pub business_id: i64,
    pub week_start_date: NaiveDate,
    pub week_end_date: NaiveDate,
    pub expires_at: i64,
    pub context_type: TokenContext,
    pub status: TokenStatus,
    pub uses_count: i32,
    pub max_submissions: i32,
}

impl TokenData {
    fn from_token(token: &ShiftToken, now: i64) -> Self {
        Self {
            id: token.id,
            employee_id: token.employee_id,
            business_id: token.business_id,
            week_start_date: token.week_start_date,
            week_end_date: token.week_end_date,
            expires_at: token.expires_at,
            context_type: token.context_type,
            status: token.status(now),
            uses_count: token.uses_count,
            max_submissions: token.max_submissions,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchData {
    pub branch_id: i64,
    pub branch_name: String,
    pub role_name: String,
    pub shift_types: Vec<String>,
    pub available_days: Vec<i16>,
}

impl From<EmployeeBranchAssignment> for BranchData {
    fn from(a: EmployeeBranchAssignment) -> Self {
        Self {
            branch_id: a.branch_id,
            branch_name: a.branch_name,
            role_name: a.role_name,
            shift_types: a.shift_types,
            available_days: a.available_days,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceData {
    pub slot_id: i64,
    pub branch_id: i64,
    pub day_of_week: i16,
    pub shift_type: String,
}

impl From<ShiftChoice> for ChoiceData {
    fn from(c: ShiftChoice) -> Self {
        Self {
            slot_id: c.slot_id,
            branch_id: c.branch_id,
            day_of_week: c.day_of_week,
            shift_type: c.shift_type,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionData {
    pub choices: Vec<ChoiceData>,
    pub preference_level: i16,
    pub notes: Option<String>,
    pub submitted_at: i64,
    pub updated_at: i64,
}

impl From<ShiftSubmission> for SubmissionData {
    fn from(s: ShiftSubmission) -> Self {
        Self {
            choices: s.choices.into_iter().map(ChoiceData::from).collect(),
            preference_level: s.preference_level,
            notes: s.notes,
            submitted_at: s.submitted_at,
            updated_at: s.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextData {
    pub employee_name: String,
    pub week_start_date: NaiveDate,
    pub week_end_date: NaiveDate,
    pub mode: TokenContext,
    pub quota: i32,
    pub remaining_submissions: i32,
    pub can_submit: bool,
    pub submission: Option<SubmissionData>,
    pub branches: Vec<BranchData>,
}

/// One shift row; open slots and published shifts share this shape
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftData {
    pub id: i64,
    pub branch_id: i64,
    pub date: Option<NaiveDate>,
    pub day_of_week: Option<i16>,
    pub shift_type: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_name: Option<String>,
}

impl ShiftData {
    fn from_offered(shift: OfferedShift, week: &Week) -> Self {
        match shift {
            OfferedShift::Open(slot) => Self {
                id: slot.id,
                branch_id: slot.branch_id,
                date: week.date_of(slot.day_of_week),
                day_of_week: Some(slot.day_of_week),
                shift_type: slot.shift_type,
                start_time: slot.start_time,
                end_time: slot.end_time,
                role_name: None,
            },
            OfferedShift::Assigned(shift) => Self {
                id: shift.id,
                branch_id: shift.branch_id,
                date: Some(shift.shift_date),
                day_of_week: week.day_of(shift.shift_date),
                shift_type: shift.shift_type,
                start_time: shift.start_time,
                end_time: shift.end_time,
                role_name: shift.role_name,
            },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextResponse {
    pub token_data: TokenData,
    pub context: ContextData,
    pub shifts: Vec<ShiftData>,
}

impl ContextResponse {
    fn from_view(view: TokenView, now: i64) -> Self {
        let week = view.week;
        Self {
            token_data: TokenData::from_token(&view.token, now),
            context: ContextData {
                employee_name: view.employee_name,
                week_start_date: week.start,
                week_end_date: week.end,
                mode: view.mode,
                quota: view.quota,
                remaining_submissions: view.remaining_submissions,
                can_submit: view.can_submit,
                submission: view.submission.map(SubmissionData::from),
                branches: view.assignments.into_iter().map(BranchData::from).collect(),
            },
            shifts: view
                .shifts
                .into_iter()
                .map(|s| ShiftData::from_offered(s, &week))
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub success: bool,
    pub choices_count: usize,
    pub remaining_submissions: i32,
}

// ── Handlers ──

pub async fn context(
    State(state): State<AppState>,
    payload: Result<Json<ContextRequest>, JsonRejection>,
) -> ApiResult<ContextResponse> {
    let req = parse_body(payload)?;
    let now = now_millis();
    let view = service::fetch_context(state.store.as_ref(), &state.settings, &req.token, now)
        .await
        .map_err(AppError::from)?;
    Ok(Json(ApiResponse::success(ContextResponse::from_view(view, now))))
}

pub async fn submit(
    State(state): State<AppState>,
    payload: Result<Json<SubmitRequest>, JsonRejection>,
) -> ApiResult<SubmitResponse> {
    let req = parse_body(payload)?;
    let input = SubmissionInput {
        choices: req.choices.iter().map(ChoiceRequest::slot_id).collect(),
        preference_level: req.preference_level,
        notes: req.notes,
    };

    let receipt = service::submit_choices(
        state.store.as_ref(),
        &state.settings,
        &req.token,
        input,
        now_millis(),
    )
    .await
    .map_err(AppError::from)?;

    Ok(Json(ApiResponse::success(SubmitResponse {
        success: true,
        choices_count: receipt.choices_count,
        remaining_submissions: receipt.remaining_submissions,
    })))
}
