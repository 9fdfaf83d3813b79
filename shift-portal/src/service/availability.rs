//! Availability filter
//!
//! Decides which shifts a token holder sees: the open slots their branch
//! assignments allow, or their published shifts once the week is scheduled.

use shared::error::AppError;
use shared::models::{
    AvailableShiftSlot, EmployeeBranchAssignment, ScheduledShift, ShiftSubmission, ShiftToken,
    TokenContext, TokenStatus, Week,
};

use super::tokens::{active_employee, resolve_token};
use crate::db::ShiftStore;
use crate::error::ServiceResult;
use crate::state::PortalSettings;

/// A shift shown to the token holder
#[derive(Debug, Clone, PartialEq)]
pub enum OfferedShift {
    Open(AvailableShiftSlot),
    Assigned(ScheduledShift),
}

#[derive(Debug, Clone)]
pub struct Availability {
    pub mode: TokenContext,
    pub shifts: Vec<OfferedShift>,
    pub assignments: Vec<EmployeeBranchAssignment>,
}

/// Everything the employee page needs for one token
#[derive(Debug, Clone)]
pub struct TokenView {
    pub token: ShiftToken,
    pub employee_name: String,
    pub week: Week,
    pub mode: TokenContext,
    pub quota: i32,
    pub remaining_submissions: i32,
    /// Open week and the token still accepts a submission
    pub can_submit: bool,
    pub submission: Option<ShiftSubmission>,
    pub assignments: Vec<EmployeeBranchAssignment>,
    pub shifts: Vec<OfferedShift>,
}

/// Keep the slots some single assignment allows (same branch, shift type
/// and day), ordered by day, start time, branch.
pub fn filter_open_slots(
    slots: Vec<AvailableShiftSlot>,
    assignments: &[EmployeeBranchAssignment],
) -> Vec<AvailableShiftSlot> {
    let mut offered: Vec<AvailableShiftSlot> = slots
        .into_iter()
        .filter(|slot| {
            assignments
                .iter()
                .any(|a| a.allows(slot.branch_id, &slot.shift_type, slot.day_of_week))
        })
        .collect();
    offered.sort_by_key(|s| (s.day_of_week, s.start_time, s.branch_id));
    offered
}

/// Shifts for the token's week.
///
/// Published weeks return the employee's scheduled shifts and need no
/// assignment. Open weeks require at least one active assignment.
pub async fn compute_availability(
    store: &dyn ShiftStore,
    token: &ShiftToken,
) -> ServiceResult<Availability> {
    let week = token.week();
    let assignments = store.list_active_assignments(token.employee_id).await?;

    if store.is_week_published(token.business_id, week).await? {
        let scheduled = store
            .list_scheduled_shifts(token.business_id, token.employee_id, week)
            .await?;
        return Ok(Availability {
            mode: TokenContext::Assigned,
            shifts: scheduled.into_iter().map(OfferedShift::Assigned).collect(),
            assignments,
        });
    }

    if assignments.is_empty() {
        return Err(AppError::no_branch_assignment(token.employee_id).into());
    }

    let slots = store.list_open_slots(token.business_id, week.start).await?;
    let offered = filter_open_slots(slots, &assignments);
    tracing::debug!(
        token_id = token.id,
        assignments = assignments.len(),
        offered = offered.len(),
        "Filtered open slots"
    );

    Ok(Availability {
        mode: TokenContext::Open,
        shifts: offered.into_iter().map(OfferedShift::Open).collect(),
        assignments,
    })
}

/// Resolve a token and load its page context.
pub async fn fetch_context(
    store: &dyn ShiftStore,
    settings: &PortalSettings,
    raw_token: &str,
    now: i64,
) -> ServiceResult<TokenView> {
    let token = resolve_token(store, raw_token, now).await?;
    let employee = active_employee(store, token.employee_id).await?;

    let availability = compute_availability(store, &token).await?;
    let submission = store
        .find_submission(token.employee_id, token.week_start_date)
        .await?;

    let can_submit =
        availability.mode == TokenContext::Open && token.status(now) == TokenStatus::Live;

    Ok(TokenView {
        employee_name: employee.name.clone(),
        week: token.week(),
        mode: availability.mode,
        quota: employee.quota_or(settings.default_quota),
        remaining_submissions: token.remaining_submissions(),
        can_submit,
        submission,
        assignments: availability.assignments,
        shifts: availability.shifts,
        token,
    })
}
