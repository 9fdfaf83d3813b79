//! Storage access layer
//!
//! Services talk to storage only through [`ShiftStore`]. `postgres` is the
//! production back-end; `memory` backs tests and local development.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::NaiveDate;
use shared::models::{
    AvailableShiftSlot, Employee, EmployeeBranchAssignment, NewSubmission, ScheduledShift,
    ShiftSubmission, ShiftToken, Week,
};

use crate::BoxError;

pub use memory::MemoryShiftStore;
pub use postgres::PgShiftStore;

/// Result of the token compare-and-swap + submission upsert
#[derive(Debug, Clone, PartialEq)]
pub enum RecordOutcome {
    /// Both writes committed
    Recorded {
        submission: ShiftSubmission,
        token: ShiftToken,
    },
    /// Token changed (or was deactivated) since it was read; nothing written
    StaleToken,
    /// A shift was scheduled in the token's week; nothing written
    WeekPublished,
}

#[async_trait]
pub trait ShiftStore: Send + Sync {
    /// Back-end name for health output
    fn backend(&self) -> &'static str;

    async fn ping(&self) -> bool;

    // ── Admin-owned data (read-only) ──

    async fn find_employee(&self, employee_id: i64) -> Result<Option<Employee>, BoxError>;

    async fn list_employees(&self, business_id: i64) -> Result<Vec<Employee>, BoxError>;

    async fn list_active_assignments(
        &self,
        employee_id: i64,
    ) -> Result<Vec<EmployeeBranchAssignment>, BoxError>;

    async fn list_open_slots(
        &self,
        business_id: i64,
        week_start: NaiveDate,
    ) -> Result<Vec<AvailableShiftSlot>, BoxError>;

    /// Employee's published shifts within the week, ordered by date then start time
    async fn list_scheduled_shifts(
        &self,
        business_id: i64,
        employee_id: i64,
        week: Week,
    ) -> Result<Vec<ScheduledShift>, BoxError>;

    /// A week is published once any scheduled shift exists for the business in it
    async fn is_week_published(&self, business_id: i64, week: Week) -> Result<bool, BoxError>;

    // ── Tokens ──

    async fn find_token(&self, token: &str) -> Result<Option<ShiftToken>, BoxError>;

    async fn find_token_by_id(&self, token_id: i64) -> Result<Option<ShiftToken>, BoxError>;

    /// All tokens of an employee, newest first
    async fn list_tokens(&self, employee_id: i64) -> Result<Vec<ShiftToken>, BoxError>;

    /// Active, unexpired token for the employee/week
    async fn find_live_token(
        &self,
        employee_id: i64,
        week_start: NaiveDate,
        now: i64,
    ) -> Result<Option<ShiftToken>, BoxError>;

    /// Deactivate expired tokens still flagged active for the employee/week.
    /// Returns the number of tokens touched.
    async fn deactivate_expired_tokens(
        &self,
        employee_id: i64,
        week_start: NaiveDate,
        now: i64,
    ) -> Result<u64, BoxError>;

    /// Insert unless another active token exists for the employee/week; in
    /// that case the existing token is returned instead.
    async fn insert_token(&self, token: &ShiftToken) -> Result<ShiftToken, BoxError>;

    /// Returns `false` if the token was already revoked
    async fn revoke_token(&self, token_id: i64, now: i64) -> Result<bool, BoxError>;

    // ── Submissions ──

    async fn find_submission(
        &self,
        employee_id: i64,
        week_start: NaiveDate,
    ) -> Result<Option<ShiftSubmission>, BoxError>;

    /// In one transaction: bump token usage if its `version` still matches
    /// and the week is still unpublished, then upsert the submission keyed
    /// by (employee_id, week_start_date).
    async fn record_submission(
        &self,
        token: &ShiftToken,
        submission: NewSubmission,
        now: i64,
    ) -> Result<RecordOutcome, BoxError>;
}
