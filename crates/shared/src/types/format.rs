//! Display formatting rules for rendered reports.
//!
//! These rules are a contract shared by parameter substitution and row
//! expansion: dates render as `dd/mm/yyyy`, decimals with two places and
//! comma thousands grouping, nulls as the empty string.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::{Decimal, RoundingStrategy};

use super::value::Value;

/// Date pattern used in rendered output.
pub const DATE_FORMAT: &str = "%d/%m/%Y";

/// Time pattern used in rendered output.
pub const TIME_FORMAT: &str = "%H:%M:%S";

/// Formats a date as `dd/mm/yyyy`.
#[must_use]
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Formats a time as `HH:MM:SS`.
#[must_use]
pub fn format_time(time: NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

/// Formats a timestamp as `dd/mm/yyyy HH:MM:SS`.
#[must_use]
pub fn format_date_time(value: NaiveDateTime) -> String {
    format!("{} {}", format_date(value.date()), format_time(value.time()))
}

/// Formats a decimal with two places (half away from zero) and grouping.
///
/// `1234.5` becomes `1,234.50`, `-0.004` becomes `0.00`.
#[must_use]
pub fn format_decimal(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let digits = format!("{:.2}", rounded.abs());
    let (integer, fraction) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3 + 4);
    if rounded.is_sign_negative() && !rounded.is_zero() {
        grouped.push('-');
    }
    for (i, ch) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped.push('.');
    grouped.push_str(fraction);
    grouped
}

/// Formats any value according to the report display rules.
#[must_use]
pub fn format_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Date(d) => format_date(*d),
        Value::DateTime(dt) => format_date(dt.date()),
        Value::Decimal(d) => format_decimal(*d),
        other => other.to_string(),
    }
}
