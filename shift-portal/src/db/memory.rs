//! In-memory store
//!
//! Each operation runs under one mutex, so the token CAS and the submission
//! upsert are applied together or not at all, same as the Postgres
//! transaction.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use shared::models::{
    AvailableShiftSlot, Employee, EmployeeBranchAssignment, NewSubmission, ScheduledShift,
    ShiftSubmission, ShiftToken, Week,
};
use shared::util::snowflake_id;
use tokio::sync::Mutex;

use super::{RecordOutcome, ShiftStore};
use crate::BoxError;

#[derive(Default)]
struct Inner {
    employees: HashMap<i64, Employee>,
    assignments: Vec<EmployeeBranchAssignment>,
    slots: Vec<AvailableShiftSlot>,
    scheduled: Vec<ScheduledShift>,
    tokens: Vec<ShiftToken>,
    submissions: HashMap<(i64, NaiveDate), ShiftSubmission>,
}

#[derive(Default)]
pub struct MemoryShiftStore {
    inner: Mutex<Inner>,
}

impl MemoryShiftStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Seeding (admin-owned data) ──

    pub async fn add_employee(&self, employee: Employee) {
        self.inner.lock().await.employees.insert(employee.id, employee);
    }

    pub async fn add_assignment(&self, assignment: EmployeeBranchAssignment) {
        self.inner.lock().await.assignments.push(assignment);
    }

    pub async fn add_slot(&self, slot: AvailableShiftSlot) {
        self.inner.lock().await.slots.push(slot);
    }

    pub async fn add_scheduled_shift(&self, shift: ScheduledShift) {
        self.inner.lock().await.scheduled.push(shift);
    }

    /// Replace a stored token wholesale (used to age tokens in tests)
    pub async fn put_token(&self, token: ShiftToken) {
        let mut inner = self.inner.lock().await;
        inner.tokens.retain(|t| t.id != token.id);
        inner.tokens.push(token);
    }

    /// Number of stored submissions
    pub async fn submission_count(&self) -> usize {
        self.inner.lock().await.submissions.len()
    }
}

#[async_trait]
impl ShiftStore for MemoryShiftStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> bool {
        true
    }

    async fn find_employee(&self, employee_id: i64) -> Result<Option<Employee>, BoxError> {
        Ok(self.inner.lock().await.employees.get(&employee_id).cloned())
    }

    async fn list_employees(&self, business_id: i64) -> Result<Vec<Employee>, BoxError> {
        let inner = self.inner.lock().await;
        let mut employees: Vec<Employee> = inner
            .employees
            .values()
            .filter(|e| e.business_id == business_id)
            .cloned()
            .collect();
        employees.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(employees)
    }

    async fn list_active_assignments(
        &self,
        employee_id: i64,
    ) -> Result<Vec<EmployeeBranchAssignment>, BoxError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .assignments
            .iter()
            .filter(|a| a.employee_id == employee_id && a.is_active)
            .cloned()
            .collect())
    }

    async fn list_open_slots(
        &self,
        business_id: i64,
        week_start: NaiveDate,
    ) -> Result<Vec<AvailableShiftSlot>, BoxError> {
        let inner = self.inner.lock().await;
        let mut slots: Vec<AvailableShiftSlot> = inner
            .slots
            .iter()
            .filter(|s| s.business_id == business_id && s.week_start_date == week_start)
            .cloned()
            .collect();
        slots.sort_by_key(|s| (s.day_of_week, s.start_time, s.branch_id));
        Ok(slots)
    }

    async fn list_scheduled_shifts(
        &self,
        business_id: i64,
        employee_id: i64,
        week: Week,
    ) -> Result<Vec<ScheduledShift>, BoxError> {
        let inner = self.inner.lock().await;
        let mut shifts: Vec<ScheduledShift> = inner
            .scheduled
            .iter()
            .filter(|s| {
                s.business_id == business_id
                    && s.employee_id == employee_id
                    && s.shift_date >= week.start
                    && s.shift_date <= week.end
            })
            .cloned()
            .collect();
        shifts.sort_by_key(|s| (s.shift_date, s.start_time));
        Ok(shifts)
    }

    async fn is_week_published(&self, business_id: i64, week: Week) -> Result<bool, BoxError> {
        let inner = self.inner.lock().await;
        Ok(inner.scheduled.iter().any(|s| {
            s.business_id == business_id && s.shift_date >= week.start && s.shift_date <= week.end
        }))
    }

    async fn find_token(&self, token: &str) -> Result<Option<ShiftToken>, BoxError> {
        let inner = self.inner.lock().await;
        Ok(inner.tokens.iter().find(|t| t.token == token).cloned())
    }

    async fn find_token_by_id(&self, token_id: i64) -> Result<Option<ShiftToken>, BoxError> {
        let inner = self.inner.lock().await;
        Ok(inner.tokens.iter().find(|t| t.id == token_id).cloned())
    }

    async fn list_tokens(&self, employee_id: i64) -> Result<Vec<ShiftToken>, BoxError> {
        let inner = self.inner.lock().await;
        let mut tokens: Vec<ShiftToken> = inner
            .tokens
            .iter()
            .filter(|t| t.employee_id == employee_id)
            .cloned()
            .collect();
        tokens.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(tokens)
    }

    async fn find_live_token(
        &self,
        employee_id: i64,
        week_start: NaiveDate,
        now: i64,
    ) -> Result<Option<ShiftToken>, BoxError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .tokens
            .iter()
            .find(|t| {
                t.employee_id == employee_id
                    && t.week_start_date == week_start
                    && t.is_active
                    && t.expires_at > now
            })
            .cloned())
    }

    async fn deactivate_expired_tokens(
        &self,
        employee_id: i64,
        week_start: NaiveDate,
        now: i64,
    ) -> Result<u64, BoxError> {
        let mut inner = self.inner.lock().await;
        let mut touched = 0;
        for t in inner.tokens.iter_mut().filter(|t| {
            t.employee_id == employee_id
                && t.week_start_date == week_start
                && t.is_active
                && t.expires_at <= now
        }) {
            t.is_active = false;
            t.version += 1;
            touched += 1;
        }
        Ok(touched)
    }

    async fn insert_token(&self, token: &ShiftToken) -> Result<ShiftToken, BoxError> {
        let mut inner = self.inner.lock().await;
        if let Some(existing) = inner.tokens.iter().find(|t| {
            t.employee_id == token.employee_id
                && t.week_start_date == token.week_start_date
                && t.is_active
        }) {
            return Ok(existing.clone());
        }
        if inner.tokens.iter().any(|t| t.token == token.token) {
            return Err("duplicate token value".into());
        }
        inner.tokens.push(token.clone());
        Ok(token.clone())
    }

    async fn revoke_token(&self, token_id: i64, now: i64) -> Result<bool, BoxError> {
        let mut inner = self.inner.lock().await;
        match inner
            .tokens
            .iter_mut()
            .find(|t| t.id == token_id && t.revoked_at.is_none())
        {
            Some(t) => {
                t.is_active = false;
                t.revoked_at = Some(now);
                t.version += 1;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn find_submission(
        &self,
        employee_id: i64,
        week_start: NaiveDate,
    ) -> Result<Option<ShiftSubmission>, BoxError> {
        let inner = self.inner.lock().await;
        Ok(inner.submissions.get(&(employee_id, week_start)).cloned())
    }

    async fn record_submission(
        &self,
        token: &ShiftToken,
        submission: NewSubmission,
        now: i64,
    ) -> Result<RecordOutcome, BoxError> {
        let mut inner = self.inner.lock().await;

        let published = inner.scheduled.iter().any(|s| {
            s.business_id == token.business_id
                && s.shift_date >= token.week_start_date
                && s.shift_date <= token.week_end_date
        });
        if published {
            return Ok(RecordOutcome::WeekPublished);
        }

        let Some(stored_token) = inner.tokens.iter_mut().find(|t| {
            t.id == token.id
                && t.version == token.version
                && t.is_active
                && t.revoked_at.is_none()
                && t.expires_at > now
        }) else {
            return Ok(RecordOutcome::StaleToken);
        };

        stored_token.uses_count += 1;
        stored_token.is_active = stored_token.uses_count < stored_token.max_submissions;
        stored_token.version += 1;
        let updated_token = stored_token.clone();

        let key = (submission.employee_id, submission.week_start_date);
        let stored = match inner.submissions.get(&key) {
            Some(previous) => ShiftSubmission {
                choices: submission.choices,
                preference_level: submission.preference_level,
                notes: submission.notes,
                version: previous.version + 1,
                updated_at: now,
                ..previous.clone()
            },
            None => ShiftSubmission {
                id: snowflake_id(),
                employee_id: submission.employee_id,
                business_id: submission.business_id,
                week_start_date: submission.week_start_date,
                choices: submission.choices,
                preference_level: submission.preference_level,
                notes: submission.notes,
                version: 0,
                submitted_at: now,
                updated_at: now,
            },
        };
        inner.submissions.insert(key, stored.clone());

        Ok(RecordOutcome::Recorded {
            submission: stored,
            token: updated_token,
        })
    }
}
