//! Conversion of loosely typed caller input into typed parameters.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use folio_shared::{ParamType, Value};
use rust_decimal::Decimal;
use serde_json::Value as Json;

use super::error::ParameterError;
use super::map::{Parameter, ParameterMap};

const DATE_TIME_PATTERNS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];
const DATE_PATTERNS: [&str; 2] = ["%Y-%m-%d", "%d/%m/%Y"];

/// Normalizes a flat `(name, value, type)` list into a parameter map.
///
/// # Errors
///
/// Fails on a length that is not a multiple of 3, blank or non-string
/// names, case-insensitive duplicates, and unconvertible types or values.
pub fn normalize_triples(raw: &[Json]) -> Result<ParameterMap, ParameterError> {
    if raw.len() % 3 != 0 {
        return Err(ParameterError::MalformedTriples { len: raw.len() });
    }

    let mut map = ParameterMap::new();
    for (position, triple) in raw.chunks_exact(3).enumerate() {
        let name = match &triple[0] {
            Json::String(s) if !s.trim().is_empty() => s.trim().to_string(),
            _ => return Err(ParameterError::EmptyName { position }),
        };
        let param_type = parse_type_tag(&name, &triple[2])?;
        let value = coerce_value(&name, &triple[1], param_type)?;
        map.insert(Parameter::new(name, value, param_type))?;
    }
    Ok(map)
}

/// Resolves a type tag.
///
/// Names of [`ParamType`] variants are used as-is; numbers and numeric
/// strings go through the numeric code table.
///
/// # Errors
///
/// Returns [`ParameterError::TypeMismatch`] for anything else.
pub fn parse_type_tag(name: &str, tag: &Json) -> Result<ParamType, ParameterError> {
    let code = match tag {
        Json::String(s) => {
            if let Ok(t) = ParamType::from_str(s) {
                return Ok(t);
            }
            s.trim().parse::<i64>().ok()
        }
        Json::Number(n) => n.as_i64(),
        _ => None,
    };

    code.and_then(ParamType::from_code)
        .ok_or_else(|| ParameterError::type_mismatch(name, format!("unknown type tag {tag}")))
}

/// Coerces a raw value to the declared type.
///
/// JSON null always becomes [`Value::Null`]; so does blank text for
/// non-text types.
///
/// # Errors
///
/// Returns [`ParameterError::TypeMismatch`] if the value cannot represent
/// the declared type.
pub fn coerce_value(name: &str, raw: &Json, param_type: ParamType) -> Result<Value, ParameterError> {
    if raw.is_null() {
        return Ok(Value::Null);
    }
    if param_type != ParamType::String && raw.as_str().is_some_and(|s| s.trim().is_empty()) {
        return Ok(Value::Null);
    }

    let mismatch = || ParameterError::type_mismatch(name, format!("{raw} is not a valid {param_type}"));

    match param_type {
        ParamType::String => match raw {
            Json::String(s) => Ok(Value::Text(s.clone())),
            Json::Number(n) => Ok(Value::Text(n.to_string())),
            Json::Bool(b) => Ok(Value::Text(b.to_string())),
            _ => Err(mismatch()),
        },
        ParamType::Int32 => integer_of(raw)
            .and_then(|v| i32::try_from(v).ok())
            .map(Value::Int32)
            .ok_or_else(mismatch),
        ParamType::Int64 => integer_of(raw).map(Value::Int64).ok_or_else(mismatch),
        ParamType::Decimal => decimal_of(raw).map(Value::Decimal).ok_or_else(mismatch),
        ParamType::Boolean => boolean_of(raw).map(Value::Bool).ok_or_else(mismatch),
        ParamType::DateTime => raw.as_str().and_then(date_of).ok_or_else(mismatch),
    }
}

fn integer_of(raw: &Json) -> Option<i64> {
    match raw {
        Json::Number(n) => n.as_i64(),
        Json::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn decimal_of(raw: &Json) -> Option<Decimal> {
    let text = match raw {
        Json::Number(n) => n.to_string(),
        Json::String(s) => s.trim().to_string(),
        _ => return None,
    };
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

fn boolean_of(raw: &Json) -> Option<bool> {
    match raw {
        Json::Bool(b) => Some(*b),
        Json::Number(n) => match n.as_i64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        Json::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" => Some(true),
            "false" | "0" | "no" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn date_of(text: &str) -> Option<Value> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(Value::DateTime(dt.naive_local()));
    }
    DATE_TIME_PATTERNS
        .iter()
        .find_map(|p| NaiveDateTime::parse_from_str(text, p).ok())
        .map(Value::DateTime)
        .or_else(|| {
            DATE_PATTERNS
                .iter()
                .find_map(|p| NaiveDate::parse_from_str(text, p).ok())
                .map(Value::Date)
        })
}
