//! Data models
//!
//! Shared between the shift portal service and its clients (via API).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` snowflake ids.

pub mod employee;
pub mod shift_token;
pub mod slot;
pub mod submission;
pub mod week;

// Re-exports
pub use employee::*;
pub use shift_token::*;
pub use slot::*;
pub use submission::*;
pub use week::*;
