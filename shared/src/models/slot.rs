//! Shift slots: open slots declared by admins and published assignments

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// An open, unassigned shift declared for a branch/day/type in a week
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct AvailableShiftSlot {
    pub id: i64,
    pub business_id: i64,
    pub branch_id: i64,
    pub week_start_date: NaiveDate,
    pub week_end_date: NaiveDate,
    /// 0 = Sunday .. 6 = Saturday
    pub day_of_week: i16,
    pub shift_type: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

/// A concrete shift in a published schedule
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ScheduledShift {
    pub id: i64,
    pub business_id: i64,
    pub employee_id: i64,
    pub branch_id: i64,
    pub shift_date: NaiveDate,
    pub shift_type: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub role_name: Option<String>,
}
