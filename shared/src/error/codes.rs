//! Unified error codes for the shift portal
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 4xxx: Shift token / scheduling errors
//! - 8xxx: Employee errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values so the browser client can
/// switch on them without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Invalid request
    InvalidRequest = 5,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Auth ====================
    /// Caller is not authenticated
    NotAuthenticated = 1001,

    // ==================== 4xxx: Shift token / scheduling ====================
    /// Token is unknown, revoked or past its expiry
    ShiftTokenInvalid = 4001,
    /// Employee has no active branch assignment
    NoBranchAssignment = 4101,
    /// More shift choices than the employee's quota
    ShiftQuotaExceeded = 4102,
    /// Token already used up for this week
    ShiftAlreadySubmitted = 4103,
    /// Schedule for the week is already published
    SchedulePublished = 4104,
    /// A chosen shift is not among the shifts offered to the employee
    ShiftSlotUnavailable = 4105,
    /// Another submission changed the token first
    SubmissionConflict = 4106,
    /// Week start is not a valid week boundary
    InvalidWeek = 4201,

    // ==================== 8xxx: Employee ====================
    /// Employee not found
    EmployeeNotFound = 8001,
    /// Employee is deactivated
    EmployeeInactive = 8006,

    // ==================== 9xxx: System ====================
    InternalError = 9001,
    TooManyRequests = 9405,
}

impl ErrorCode {
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Auth
            ErrorCode::NotAuthenticated => "Authentication required",

            // Shift token / scheduling
            ErrorCode::ShiftTokenInvalid => "Link is invalid or has expired",
            ErrorCode::NoBranchAssignment => "Employee is not assigned to any branch",
            ErrorCode::ShiftQuotaExceeded => "Too many shifts selected",
            ErrorCode::ShiftAlreadySubmitted => "Shifts were already submitted for this week",
            ErrorCode::SchedulePublished => "Schedule for this week is already published",
            ErrorCode::ShiftSlotUnavailable => "Selected shift is not available",
            ErrorCode::SubmissionConflict => "Submission was changed by another request",
            ErrorCode::InvalidWeek => "Week must start on a Sunday",

            // Employee
            ErrorCode::EmployeeNotFound => "Employee not found",
            ErrorCode::EmployeeInactive => "Employee is inactive",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::TooManyRequests => "Too many requests",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            5 => Ok(ErrorCode::InvalidRequest),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),

            // Shift token / scheduling
            4001 => Ok(ErrorCode::ShiftTokenInvalid),
            4101 => Ok(ErrorCode::NoBranchAssignment),
            4102 => Ok(ErrorCode::ShiftQuotaExceeded),
            4103 => Ok(ErrorCode::ShiftAlreadySubmitted),
            4104 => Ok(ErrorCode::SchedulePublished),
            4105 => Ok(ErrorCode::ShiftSlotUnavailable),
            4106 => Ok(ErrorCode::SubmissionConflict),
            4201 => Ok(ErrorCode::InvalidWeek),

            // Employee
            8001 => Ok(ErrorCode::EmployeeNotFound),
            8006 => Ok(ErrorCode::EmployeeInactive),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9405 => Ok(ErrorCode::TooManyRequests),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
