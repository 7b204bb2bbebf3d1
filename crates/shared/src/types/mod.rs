//! Common types used across the application.

pub mod format;
pub mod severity;
pub mod value;

pub use format::{format_date, format_date_time, format_decimal, format_time, format_value};
pub use severity::Severity;
pub use value::{ParamType, Value};
