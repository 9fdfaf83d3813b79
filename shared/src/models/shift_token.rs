//! Shift Token Model
//!
//! A shift token is an opaque link secret scoped to one employee and one
//! week. After creation only `is_active`, `uses_count`, `version` and
//! `revoked_at` change.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::week::Week;

/// What the token holder sees: open slots to pick from, or the published assignment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(type_name = "text", rename_all = "lowercase"))]
pub enum TokenContext {
    #[default]
    Open,
    Assigned,
}

impl TokenContext {
    pub fn from_published(published: bool) -> Self {
        if published { Self::Assigned } else { Self::Open }
    }
}

/// Derived token state at a point in time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenStatus {
    Live,
    /// Submission allowance used up; still readable
    Exhausted,
    Revoked,
    Expired,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ShiftToken {
    pub id: i64,
    pub token: String,
    pub employee_id: i64,
    pub business_id: i64,
    pub week_start_date: NaiveDate,
    pub week_end_date: NaiveDate,
    /// Epoch millis
    pub expires_at: i64,
    pub is_active: bool,
    pub context_type: TokenContext,
    pub uses_count: i32,
    /// Total submissions this token accepts
    pub max_submissions: i32,
    /// Bumped on every usage change (compare-and-swap key)
    pub version: i64,
    pub created_at: i64,
    pub revoked_at: Option<i64>,
}

impl ShiftToken {
    /// Expiry wins over every other field.
    pub fn status(&self, now: i64) -> TokenStatus {
        if now >= self.expires_at {
            TokenStatus::Expired
        } else if self.revoked_at.is_some() {
            TokenStatus::Revoked
        } else if self.uses_count >= self.max_submissions {
            TokenStatus::Exhausted
        } else if !self.is_active {
            TokenStatus::Revoked
        } else {
            TokenStatus::Live
        }
    }

    pub fn week(&self) -> Week {
        Week {
            start: self.week_start_date,
            end: self.week_end_date,
        }
    }

    pub fn remaining_submissions(&self) -> i32 {
        (self.max_submissions - self.uses_count).max(0)
    }
}
