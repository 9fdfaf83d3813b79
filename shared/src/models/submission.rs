//! Shift Submission Model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Highest (least eager) preference level
pub const MAX_PREFERENCE_LEVEL: i16 = 3;
/// Max length of submission notes (chars)
pub const MAX_NOTES_LEN: usize = 1000;

/// One chosen shift, referencing an available slot
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShiftChoice {
    pub slot_id: i64,
    pub branch_id: i64,
    pub day_of_week: i16,
    pub shift_type: String,
}

/// The employee's choices for one week (at most one per employee/week)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ShiftSubmission {
    pub id: i64,
    pub employee_id: i64,
    pub business_id: i64,
    pub week_start_date: NaiveDate,
    #[cfg_attr(feature = "db", sqlx(json))]
    pub choices: Vec<ShiftChoice>,
    /// 1 = preferred, 2 = available, 3 = only if needed
    pub preference_level: i16,
    pub notes: Option<String>,
    pub version: i64,
    pub submitted_at: i64,
    pub updated_at: i64,
}

/// Validated submission ready to be written
#[derive(Debug, Clone, PartialEq)]
pub struct NewSubmission {
    pub employee_id: i64,
    pub business_id: i64,
    pub week_start_date: NaiveDate,
    pub choices: Vec<ShiftChoice>,
    pub preference_level: i16,
    pub notes: Option<String>,
}
