//! Request guards for the admin and public token routes

pub mod admin_auth;
pub mod rate_limit;

pub use admin_auth::admin_auth_middleware;
pub use rate_limit::{RateLimiter, token_rate_limit};
