//! Submission recorder
//!
//! Validates a token holder's weekly choices and stores them. All checks
//! run before the single write; the write itself is a token
//! compare-and-swap plus submission upsert in one store transaction.

use std::collections::HashSet;

use shared::error::{AppError, ErrorCode};
use shared::models::{
    MAX_NOTES_LEN, MAX_PREFERENCE_LEVEL, NewSubmission, ShiftChoice, ShiftSubmission, TokenStatus,
};

use super::availability::filter_open_slots;
use super::tokens::{active_employee, resolve_token};
use crate::db::{RecordOutcome, ShiftStore};
use crate::error::ServiceResult;
use crate::state::PortalSettings;

/// Choices as sent by the token holder
#[derive(Debug, Clone, Default)]
pub struct SubmissionInput {
    /// Chosen slot ids
    pub choices: Vec<i64>,
    pub preference_level: Option<i16>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SubmissionReceipt {
    pub choices_count: usize,
    pub remaining_submissions: i32,
    pub submission: ShiftSubmission,
}

fn validate_preference(level: Option<i16>) -> Result<i16, AppError> {
    let level = level.unwrap_or(1);
    if !(1..=MAX_PREFERENCE_LEVEL).contains(&level) {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            format!("preference_level must be between 1 and {MAX_PREFERENCE_LEVEL}"),
        )
        .with_detail("preference_level", level));
    }
    Ok(level)
}

fn normalize_notes(notes: Option<String>) -> Result<Option<String>, AppError> {
    let Some(notes) = notes else {
        return Ok(None);
    };
    let trimmed = notes.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if trimmed.chars().count() > MAX_NOTES_LEN {
        return Err(AppError::validation(format!(
            "notes must be at most {MAX_NOTES_LEN} characters"
        )));
    }
    Ok(Some(trimmed.to_string()))
}

/// Record the holder's choices for the token's week.
pub async fn submit_choices(
    store: &dyn ShiftStore,
    settings: &PortalSettings,
    raw_token: &str,
    input: SubmissionInput,
    now: i64,
) -> ServiceResult<SubmissionReceipt> {
    let token = resolve_token(store, raw_token, now).await?;
    if token.status(now) == TokenStatus::Exhausted {
        return Err(AppError::new(ErrorCode::ShiftAlreadySubmitted)
            .with_detail("max_submissions", token.max_submissions)
            .into());
    }

    let week = token.week();
    if store.is_week_published(token.business_id, week).await? {
        return Err(AppError::schedule_published().into());
    }

    if input.choices.is_empty() {
        return Err(AppError::required("choices").into());
    }
    let preference_level = validate_preference(input.preference_level)?;
    let notes = normalize_notes(input.notes)?;

    let employee = active_employee(store, token.employee_id).await?;
    let quota = employee.quota_or(settings.default_quota);
    if input.choices.len() > usize::try_from(quota).unwrap_or(0) {
        tracing::debug!(
            token_id = token.id,
            submitted = input.choices.len(),
            quota,
            "Submission over quota"
        );
        return Err(AppError::quota_exceeded(input.choices.len(), quota).into());
    }

    let assignments = store.list_active_assignments(token.employee_id).await?;
    if assignments.is_empty() {
        return Err(AppError::no_branch_assignment(token.employee_id).into());
    }

    let offered = filter_open_slots(
        store.list_open_slots(token.business_id, week.start).await?,
        &assignments,
    );

    let mut seen = HashSet::with_capacity(input.choices.len());
    let mut choices = Vec::with_capacity(input.choices.len());
    for slot_id in input.choices {
        if !seen.insert(slot_id) {
            return Err(AppError::validation("Each shift may only be chosen once")
                .with_detail("slot_id", slot_id)
                .into());
        }
        let slot = offered
            .iter()
            .find(|s| s.id == slot_id)
            .ok_or_else(|| AppError::new(ErrorCode::ShiftSlotUnavailable).with_detail("slot_id", slot_id))?;
        choices.push(ShiftChoice {
            slot_id,
            branch_id: slot.branch_id,
            day_of_week: slot.day_of_week,
            shift_type: slot.shift_type.clone(),
        });
    }

    let new_submission = NewSubmission {
        employee_id: token.employee_id,
        business_id: token.business_id,
        week_start_date: week.start,
        choices,
        preference_level,
        notes,
    };

    match store.record_submission(&token, new_submission, now).await? {
        RecordOutcome::Recorded { submission, token } => {
            tracing::info!(
                token_id = token.id,
                employee_id = submission.employee_id,
                week_start = %submission.week_start_date,
                choices = submission.choices.len(),
                version = submission.version,
                "Shift choices recorded"
            );
            Ok(SubmissionReceipt {
                choices_count: submission.choices.len(),
                remaining_submissions: token.remaining_submissions(),
                submission,
            })
        }
        RecordOutcome::StaleToken => {
            tracing::warn!(token_id = token.id, "Concurrent submission on token");
            Err(AppError::new(ErrorCode::SubmissionConflict).into())
        }
        RecordOutcome::WeekPublished => {
            tracing::info!(token_id = token.id, "Week published before submission was written");
            Err(AppError::schedule_published().into())
        }
    }
}
