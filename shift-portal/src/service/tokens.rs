//! Token issuer
//!
//! Issues, reuses, resolves and revokes shift tokens.

use chrono::NaiveDate;
use shared::error::{AppError, ErrorCode};
use shared::models::{Employee, ShiftToken, TokenContext, TokenStatus, Week};
use shared::util::snowflake_id;

use crate::db::ShiftStore;
use crate::error::ServiceResult;
use crate::state::PortalSettings;

/// Hex length of a token secret (32 random bytes)
pub const TOKEN_LEN: usize = 64;

/// Token returned to the admin, with its shareable link
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: ShiftToken,
    pub link: String,
    /// `true` when an existing live token was returned
    pub reused: bool,
}

#[derive(Debug, Clone)]
pub struct SkippedEmployee {
    pub employee_id: i64,
    pub name: String,
    pub reason: ErrorCode,
}

/// Outcome of issuing tokens for a whole business week
#[derive(Debug, Clone)]
pub struct BatchIssue {
    pub week: Week,
    pub issued: Vec<IssuedToken>,
    pub skipped: Vec<SkippedEmployee>,
}

fn generate_token() -> String {
    hex::encode(rand::random::<[u8; 32]>())
}

/// Return the live token for the employee/week, creating one if needed.
pub async fn issue_token(
    store: &dyn ShiftStore,
    settings: &PortalSettings,
    employee_id: i64,
    week_start: NaiveDate,
    now: i64,
) -> ServiceResult<IssuedToken> {
    let week = Week::starting(week_start)?;
    let employee = active_employee(store, employee_id).await?;
    issue_for(store, settings, &employee, week, now).await
}

/// Load an employee who may still hold and use tokens.
pub(crate) async fn active_employee(
    store: &dyn ShiftStore,
    employee_id: i64,
) -> ServiceResult<Employee> {
    let employee = store
        .find_employee(employee_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::EmployeeNotFound))?;
    if !employee.is_active {
        return Err(AppError::new(ErrorCode::EmployeeInactive)
            .with_detail("employee_id", employee_id)
            .into());
    }
    Ok(employee)
}

async fn issue_for(
    store: &dyn ShiftStore,
    settings: &PortalSettings,
    employee: &Employee,
    week: Week,
    now: i64,
) -> ServiceResult<IssuedToken> {
    let expired = store
        .deactivate_expired_tokens(employee.id, week.start, now)
        .await?;
    if expired > 0 {
        tracing::debug!(employee_id = employee.id, expired, "Deactivated expired tokens");
    }

    if let Some(existing) = store.find_live_token(employee.id, week.start, now).await? {
        return Ok(IssuedToken {
            link: settings.link_for(&existing.token),
            token: existing,
            reused: true,
        });
    }

    let published = store.is_week_published(employee.business_id, week).await?;
    let candidate = ShiftToken {
        id: snowflake_id(),
        token: generate_token(),
        employee_id: employee.id,
        business_id: employee.business_id,
        week_start_date: week.start,
        week_end_date: week.end,
        expires_at: week.end_millis() + settings.expiry_buffer_ms,
        is_active: true,
        context_type: TokenContext::from_published(published),
        uses_count: 0,
        max_submissions: settings.max_submissions,
        version: 0,
        created_at: now,
        revoked_at: None,
    };

    let stored = store.insert_token(&candidate).await?;
    let reused = stored.id != candidate.id;
    if reused {
        tracing::debug!(
            employee_id = employee.id,
            token_id = stored.id,
            "Concurrent issue, returning existing token"
        );
    } else {
        tracing::info!(
            employee_id = employee.id,
            token_id = stored.id,
            week_start = %week.start,
            context = ?stored.context_type,
            "Shift token issued"
        );
    }

    Ok(IssuedToken {
        link: settings.link_for(&stored.token),
        token: stored,
        reused,
    })
}

/// Issue tokens for every active employee of a business that has a branch assignment.
pub async fn issue_week_tokens(
    store: &dyn ShiftStore,
    settings: &PortalSettings,
    business_id: i64,
    week_start: NaiveDate,
    now: i64,
) -> ServiceResult<BatchIssue> {
    let week = Week::starting(week_start)?;
    let employees = store.list_employees(business_id).await?;

    let mut issued = Vec::new();
    let mut skipped = Vec::new();
    for employee in employees.iter().filter(|e| e.is_active) {
        if store.list_active_assignments(employee.id).await?.is_empty() {
            skipped.push(SkippedEmployee {
                employee_id: employee.id,
                name: employee.name.clone(),
                reason: ErrorCode::NoBranchAssignment,
            });
            continue;
        }
        issued.push(issue_for(store, settings, employee, week, now).await?);
    }

    tracing::info!(
        business_id,
        week_start = %week.start,
        issued = issued.len(),
        skipped = skipped.len(),
        "Weekly tokens issued"
    );

    Ok(BatchIssue {
        week,
        issued,
        skipped,
    })
}

/// Look up a token the holder may still read (live or exhausted).
///
/// Unknown, malformed, revoked and expired tokens all map to the same
/// `ShiftTokenInvalid` error.
pub async fn resolve_token(
    store: &dyn ShiftStore,
    raw: &str,
    now: i64,
) -> ServiceResult<ShiftToken> {
    let raw = raw.trim();
    if raw.len() != TOKEN_LEN || !raw.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(AppError::token_invalid().into());
    }

    let token = store
        .find_token(raw)
        .await?
        .ok_or_else(AppError::token_invalid)?;

    match token.status(now) {
        TokenStatus::Live | TokenStatus::Exhausted => Ok(token),
        TokenStatus::Revoked | TokenStatus::Expired => {
            tracing::debug!(token_id = token.id, status = ?token.status(now), "Rejected token");
            Err(AppError::token_invalid().into())
        }
    }
}

/// Revoke a token. Returns `false` if it was already revoked.
pub async fn revoke_token(store: &dyn ShiftStore, token_id: i64, now: i64) -> ServiceResult<bool> {
    if store.find_token_by_id(token_id).await?.is_none() {
        return Err(AppError::not_found("Token").into());
    }
    let revoked = store.revoke_token(token_id, now).await?;
    if revoked {
        tracing::info!(token_id, "Shift token revoked");
    }
    Ok(revoked)
}

pub async fn list_tokens(
    store: &dyn ShiftStore,
    employee_id: i64,
) -> ServiceResult<Vec<ShiftToken>> {
    if store.find_employee(employee_id).await?.is_none() {
        return Err(AppError::new(ErrorCode::EmployeeNotFound).into());
    }
    Ok(store.list_tokens(employee_id).await?)
}
