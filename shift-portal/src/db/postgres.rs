//! PostgreSQL store

use async_trait::async_trait;
use chrono::NaiveDate;
use shared::models::{
    AvailableShiftSlot, Employee, EmployeeBranchAssignment, NewSubmission, ScheduledShift,
    ShiftSubmission, ShiftToken, Week,
};
use shared::util::snowflake_id;
use sqlx::PgPool;

use super::{RecordOutcome, ShiftStore};
use crate::BoxError;

const TOKEN_COLUMNS: &str = "id, token, employee_id, business_id, week_start_date, week_end_date,
    expires_at, is_active, context_type, uses_count, max_submissions, version, created_at, revoked_at";

const SUBMISSION_COLUMNS: &str = "id, employee_id, business_id, week_start_date, choices,
    preference_level, notes, version, submitted_at, updated_at";

#[derive(Clone)]
pub struct PgShiftStore {
    pool: PgPool,
}

impl PgShiftStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ShiftStore for PgShiftStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> bool {
        self.pool.acquire().await.is_ok()
    }

    async fn find_employee(&self, employee_id: i64) -> Result<Option<Employee>, BoxError> {
        let employee = sqlx::query_as::<_, Employee>(
            "SELECT id, business_id, name, is_active, shift_quota FROM employees WHERE id = $1",
        )
        .bind(employee_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(employee)
    }

    async fn list_employees(&self, business_id: i64) -> Result<Vec<Employee>, BoxError> {
        let employees = sqlx::query_as::<_, Employee>(
            "SELECT id, business_id, name, is_active, shift_quota
                FROM employees
                WHERE business_id = $1
                ORDER BY name, id",
        )
        .bind(business_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(employees)
    }

    async fn list_active_assignments(
        &self,
        employee_id: i64,
    ) -> Result<Vec<EmployeeBranchAssignment>, BoxError> {
        let assignments = sqlx::query_as::<_, EmployeeBranchAssignment>(
            "SELECT id, employee_id, branch_id, branch_name, role_name,
                shift_types, available_days, is_active
                FROM employee_branch_assignments
                WHERE employee_id = $1 AND is_active
                ORDER BY branch_name, id",
        )
        .bind(employee_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(assignments)
    }

    async fn list_open_slots(
        &self,
        business_id: i64,
        week_start: NaiveDate,
    ) -> Result<Vec<AvailableShiftSlot>, BoxError> {
        let slots = sqlx::query_as::<_, AvailableShiftSlot>(
            "SELECT id, business_id, branch_id, week_start_date, week_end_date,
                day_of_week, shift_type, start_time, end_time
                FROM available_shift_slots
                WHERE business_id = $1 AND week_start_date = $2
                ORDER BY day_of_week, start_time, branch_id",
        )
        .bind(business_id)
        .bind(week_start)
        .fetch_all(&self.pool)
        .await?;
        Ok(slots)
    }

    async fn list_scheduled_shifts(
        &self,
        business_id: i64,
        employee_id: i64,
        week: Week,
    ) -> Result<Vec<ScheduledShift>, BoxError> {
        let shifts = sqlx::query_as::<_, ScheduledShift>(
            "SELECT id, business_id, employee_id, branch_id, shift_date,
                shift_type, start_time, end_time, role_name
                FROM scheduled_shifts
                WHERE business_id = $1 AND employee_id = $2
                  AND shift_date BETWEEN $3 AND $4
                ORDER BY shift_date, start_time",
        )
        .bind(business_id)
        .bind(employee_id)
        .bind(week.start)
        .bind(week.end)
        .fetch_all(&self.pool)
        .await?;
        Ok(shifts)
    }

    async fn is_week_published(&self, business_id: i64, week: Week) -> Result<bool, BoxError> {
        let (published,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (
                SELECT 1 FROM scheduled_shifts
                WHERE business_id = $1 AND shift_date BETWEEN $2 AND $3
            )",
        )
        .bind(business_id)
        .bind(week.start)
        .bind(week.end)
        .fetch_one(&self.pool)
        .await?;
        Ok(published)
    }

    async fn find_token(&self, token: &str) -> Result<Option<ShiftToken>, BoxError> {
        let row = sqlx::query_as::<_, ShiftToken>(&format!(
            "SELECT {TOKEN_COLUMNS} FROM shift_tokens WHERE token = $1"
        ))
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn find_token_by_id(&self, token_id: i64) -> Result<Option<ShiftToken>, BoxError> {
        let row = sqlx::query_as::<_, ShiftToken>(&format!(
            "SELECT {TOKEN_COLUMNS} FROM shift_tokens WHERE id = $1"
        ))
        .bind(token_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list_tokens(&self, employee_id: i64) -> Result<Vec<ShiftToken>, BoxError> {
        let rows = sqlx::query_as::<_, ShiftToken>(&format!(
            "SELECT {TOKEN_COLUMNS} FROM shift_tokens
                WHERE employee_id = $1
                ORDER BY created_at DESC, id DESC"
        ))
        .bind(employee_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn find_live_token(
        &self,
        employee_id: i64,
        week_start: NaiveDate,
        now: i64,
    ) -> Result<Option<ShiftToken>, BoxError> {
        let row = sqlx::query_as::<_, ShiftToken>(&format!(
            "SELECT {TOKEN_COLUMNS} FROM shift_tokens
                WHERE employee_id = $1 AND week_start_date = $2
                  AND is_active AND expires_at > $3
                LIMIT 1"
        ))
        .bind(employee_id)
        .bind(week_start)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn deactivate_expired_tokens(
        &self,
        employee_id: i64,
        week_start: NaiveDate,
        now: i64,
    ) -> Result<u64, BoxError> {
        let result = sqlx::query(
            "UPDATE shift_tokens SET is_active = FALSE, version = version + 1
                WHERE employee_id = $1 AND week_start_date = $2
                  AND is_active AND expires_at <= $3",
        )
        .bind(employee_id)
        .bind(week_start)
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn insert_token(&self, token: &ShiftToken) -> Result<ShiftToken, BoxError> {
        let inserted = sqlx::query_as::<_, ShiftToken>(&format!(
            "INSERT INTO shift_tokens ({TOKEN_COLUMNS})
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
                ON CONFLICT (employee_id, week_start_date) WHERE is_active DO NOTHING
                RETURNING {TOKEN_COLUMNS}"
        ))
        .bind(token.id)
        .bind(&token.token)
        .bind(token.employee_id)
        .bind(token.business_id)
        .bind(token.week_start_date)
        .bind(token.week_end_date)
        .bind(token.expires_at)
        .bind(token.is_active)
        .bind(token.context_type)
        .bind(token.uses_count)
        .bind(token.max_submissions)
        .bind(token.version)
        .bind(token.created_at)
        .bind(token.revoked_at)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = inserted {
            return Ok(row);
        }

        // Lost the race: another request inserted the active token first
        let winner = sqlx::query_as::<_, ShiftToken>(&format!(
            "SELECT {TOKEN_COLUMNS} FROM shift_tokens
                WHERE employee_id = $1 AND week_start_date = $2 AND is_active
                LIMIT 1"
        ))
        .bind(token.employee_id)
        .bind(token.week_start_date)
        .fetch_optional(&self.pool)
        .await?;

        winner.ok_or_else(|| "active token vanished after insert conflict".into())
    }

    async fn revoke_token(&self, token_id: i64, now: i64) -> Result<bool, BoxError> {
        let result = sqlx::query(
            "UPDATE shift_tokens
                SET is_active = FALSE, revoked_at = $2, version = version + 1
                WHERE id = $1 AND revoked_at IS NULL",
        )
        .bind(token_id)
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_submission(
        &self,
        employee_id: i64,
        week_start: NaiveDate,
    ) -> Result<Option<ShiftSubmission>, BoxError> {
        let row = sqlx::query_as::<_, ShiftSubmission>(&format!(
            "SELECT {SUBMISSION_COLUMNS} FROM shift_submissions
                WHERE employee_id = $1 AND week_start_date = $2"
        ))
        .bind(employee_id)
        .bind(week_start)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn record_submission(
        &self,
        token: &ShiftToken,
        submission: NewSubmission,
        now: i64,
    ) -> Result<RecordOutcome, BoxError> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query_as::<_, ShiftToken>(&format!(
            "UPDATE shift_tokens
                SET uses_count = uses_count + 1,
                    is_active = (uses_count + 1) < max_submissions,
                    version = version + 1
                WHERE id = $1 AND version = $2
                  AND is_active AND revoked_at IS NULL AND expires_at > $3
                  AND NOT EXISTS (
                      SELECT 1 FROM scheduled_shifts
                      WHERE business_id = $4 AND shift_date BETWEEN $5 AND $6
                  )
                RETURNING {TOKEN_COLUMNS}"
        ))
        .bind(token.id)
        .bind(token.version)
        .bind(now)
        .bind(token.business_id)
        .bind(token.week_start_date)
        .bind(token.week_end_date)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(updated) = updated else {
            let (published,): (bool,) = sqlx::query_as(
                "SELECT EXISTS (
                    SELECT 1 FROM scheduled_shifts
                    WHERE business_id = $1 AND shift_date BETWEEN $2 AND $3
                )",
            )
            .bind(token.business_id)
            .bind(token.week_start_date)
            .bind(token.week_end_date)
            .fetch_one(&mut *tx)
            .await?;
            tx.rollback().await?;
            return Ok(if published {
                RecordOutcome::WeekPublished
            } else {
                RecordOutcome::StaleToken
            });
        };

        let stored = sqlx::query_as::<_, ShiftSubmission>(&format!(
            "INSERT INTO shift_submissions ({SUBMISSION_COLUMNS})
                VALUES ($1, $2, $3, $4, $5, $6, $7, 0, $8, $8)
                ON CONFLICT (employee_id, week_start_date)
                DO UPDATE SET choices = EXCLUDED.choices,
                              preference_level = EXCLUDED.preference_level,
                              notes = EXCLUDED.notes,
                              version = shift_submissions.version + 1,
                              updated_at = EXCLUDED.updated_at
                RETURNING {SUBMISSION_COLUMNS}"
        ))
        .bind(snowflake_id())
        .bind(submission.employee_id)
        .bind(submission.business_id)
        .bind(submission.week_start_date)
        .bind(sqlx::types::Json(&submission.choices))
        .bind(submission.preference_level)
        .bind(&submission.notes)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(RecordOutcome::Recorded {
            submission: stored,
            token: updated,
        })
    }
}
