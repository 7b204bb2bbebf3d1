//! Shared types, errors, and configuration for Folio.
//!
//! This crate provides common types used across all other crates:
//! - Typed cell and parameter values (no floating point)
//! - The display formatting contract for dates and decimals
//! - The issue severity scale
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use types::{ParamType, Severity, Value};
