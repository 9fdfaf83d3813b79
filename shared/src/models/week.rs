//! Scheduling week (Sunday..Saturday)

use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, ErrorCode};

/// Days in a scheduling week. `day_of_week` values are `0..DAYS_PER_WEEK`.
pub const DAYS_PER_WEEK: i16 = 7;

/// A calendar week starting on Sunday.
///
/// `day_of_week` numbering used across slots and assignments: 0 = Sunday,
/// 6 = Saturday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Week {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Week {
    /// Build the week starting on `start`. Rejects dates that are not a Sunday.
    pub fn starting(start: NaiveDate) -> Result<Self, AppError> {
        if start.weekday() != Weekday::Sun {
            return Err(AppError::new(ErrorCode::InvalidWeek)
                .with_detail("week_start_date", start.to_string()));
        }
        Ok(Self {
            start,
            end: start + Duration::days(i64::from(DAYS_PER_WEEK - 1)),
        })
    }

    /// The week containing `date`.
    pub fn containing(date: NaiveDate) -> Self {
        let offset = date.weekday().num_days_from_sunday();
        let start = date - Duration::days(i64::from(offset));
        Self {
            start,
            end: start + Duration::days(i64::from(DAYS_PER_WEEK - 1)),
        }
    }

    /// Calendar date of a `day_of_week` inside this week.
    pub fn date_of(&self, day_of_week: i16) -> Option<NaiveDate> {
        (0..DAYS_PER_WEEK)
            .contains(&day_of_week)
            .then(|| self.start + Duration::days(i64::from(day_of_week)))
    }

    /// `day_of_week` of a date, if it falls inside this week.
    pub fn day_of(&self, date: NaiveDate) -> Option<i16> {
        if date < self.start || date > self.end {
            return None;
        }
        Some((date - self.start).num_days() as i16)
    }

    /// Last millisecond of the week (Saturday 23:59:59.999 UTC).
    pub fn end_millis(&self) -> i64 {
        let last = NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN);
        self.end.and_time(last).and_utc().timestamp_millis()
    }

    /// The week after this one.
    pub fn next(&self) -> Self {
        Self {
            start: self.start + Duration::days(i64::from(DAYS_PER_WEEK)),
            end: self.end + Duration::days(i64::from(DAYS_PER_WEEK)),
        }
    }
}
