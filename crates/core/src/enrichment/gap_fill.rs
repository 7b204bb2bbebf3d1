//! Default values for declared parameters the caller did not supply.

use folio_shared::{ParamType, Value};
use rust_decimal::Decimal;

use crate::aggregation::DeclaredParameter;
use crate::params::Parameter;

/// Broad class of a declared SQL type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclaredKind {
    /// Character data.
    Text,
    /// Integer of the given width.
    Integer(ParamType),
    /// Exact or approximate numeric.
    Decimal,
    /// Boolean or bit.
    Boolean,
    /// Date, time or timestamp.
    Temporal,
    /// Anything else.
    Unknown,
}

/// Classifies a SQL type name such as `varchar(50)` or `timestamp with time zone`.
#[must_use]
pub fn classify(type_name: &str) -> DeclaredKind {
    let lowered = type_name.trim().to_lowercase();
    let base = lowered
        .split('(')
        .next()
        .unwrap_or_default()
        .trim()
        .trim_start_matches('_');

    match base {
        "text" | "varchar" | "character varying" | "char" | "character" | "bpchar" | "nchar"
        | "nvarchar" | "ntext" | "citext" | "name" | "string" => DeclaredKind::Text,
        "smallint" | "int2" | "tinyint" | "int" | "int4" | "integer" | "serial" | "int32" => {
            DeclaredKind::Integer(ParamType::Int32)
        }
        "bigint" | "int8" | "bigserial" | "int64" => DeclaredKind::Integer(ParamType::Int64),
        "decimal" | "numeric" | "money" | "smallmoney" | "real" | "float" | "float4"
        | "float8" | "double precision" => DeclaredKind::Decimal,
        "bool" | "boolean" | "bit" => DeclaredKind::Boolean,
        "date" | "datetime" | "datetime2" | "smalldatetime" | "datetimeoffset" | "timestamptz"
        | "timetz" => DeclaredKind::Temporal,
        other if other.starts_with("timestamp") || other.starts_with("time ") || other == "time" => {
            DeclaredKind::Temporal
        }
        _ => DeclaredKind::Unknown,
    }
}

/// Synthesizes the default parameter for a declaration.
///
/// Text defaults to `""`; numbers and booleans to zero or `false` unless the
/// declaration is nullable; temporal and unknown types to null.
#[must_use]
pub fn default_for(declared: &DeclaredParameter) -> (Parameter, DeclaredKind) {
    let kind = classify(&declared.type_name);
    let (value, param_type) = match kind {
        DeclaredKind::Text => (Value::Text(String::new()), ParamType::String),
        DeclaredKind::Integer(ty) if declared.nullable => (Value::Null, ty),
        DeclaredKind::Integer(ParamType::Int64) => (Value::Int64(0), ParamType::Int64),
        DeclaredKind::Integer(ty) => (Value::Int32(0), ty),
        DeclaredKind::Decimal if declared.nullable => (Value::Null, ParamType::Decimal),
        DeclaredKind::Decimal => (Value::Decimal(Decimal::ZERO), ParamType::Decimal),
        DeclaredKind::Boolean if declared.nullable => (Value::Null, ParamType::Boolean),
        DeclaredKind::Boolean => (Value::Bool(false), ParamType::Boolean),
        DeclaredKind::Temporal => (Value::Null, ParamType::DateTime),
        DeclaredKind::Unknown => (Value::Null, ParamType::String),
    };

    let trimmed = declared.name.trim();
    let name = trimmed.strip_prefix('@').unwrap_or(trimmed);
    (Parameter::new(name, value, param_type), kind)
}
