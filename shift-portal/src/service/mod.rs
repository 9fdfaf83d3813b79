//! Business logic
//!
//! Handlers stay thin; every rule about tokens, availability and
//! submissions lives here and talks to storage through [`crate::db::ShiftStore`].

pub mod availability;
pub mod submission;
pub mod tokens;

#[cfg(test)]
pub(crate) mod test_support;

pub use availability::{Availability, OfferedShift, TokenView, fetch_context, filter_open_slots};
pub use submission::{SubmissionInput, SubmissionReceipt, submit_choices};
pub use tokens::{
    BatchIssue, IssuedToken, SkippedEmployee, issue_token, issue_week_tokens, list_tokens,
    resolve_token, revoke_token,
};
