//! Shift portal
//!
//! Issues single-week shift tokens, shows token holders the shifts they
//! may pick, and records their weekly choices.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod service;
pub mod state;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;
