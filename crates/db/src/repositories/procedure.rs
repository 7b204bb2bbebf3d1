//! Data source over PostgreSQL set-returning functions.
//!
//! Each named source is a function in the database. Its declared input
//! parameters are read from `information_schema`, the call binds every
//! declared parameter found in the caller's map by name, and the returned
//! rows are decoded column by column into [`Value`]s.

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use folio_core::aggregation::{DataSource, DataSourceError, DeclaredParameter, ResultSet};
use folio_core::params::ParameterMap;
use folio_shared::Value;
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use sqlx::postgres::{PgPool, PgRow};
use sqlx::{Column, Row, TypeInfo};

const ROUTINE_SQL: &str = r"
SELECT r.specific_name,
       p.parameter_name,
       p.udt_schema,
       p.udt_name,
       p.parameter_default
FROM information_schema.routines r
LEFT JOIN information_schema.parameters p
       ON p.specific_schema = r.specific_schema
      AND p.specific_name = r.specific_name
      AND p.parameter_mode IN ('IN', 'INOUT')
WHERE r.routine_schema = COALESCE($1, current_schema())
  AND lower(r.routine_name) = lower($2)
ORDER BY r.specific_name, p.ordinal_position
";

/// One declared input of a routine.
#[derive(Debug, Clone, PartialEq, Eq)]
struct RoutineParameter {
    name: String,
    udt_schema: String,
    udt_name: String,
    default: Option<String>,
}

/// Runs report data sources as database functions.
#[derive(Debug, Clone)]
pub struct ProcedureDataSource {
    pool: PgPool,
    timeout: Duration,
}

impl ProcedureDataSource {
    /// Creates a data source over a sqlx pool.
    #[must_use]
    pub const fn new(pool: PgPool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }

    /// Creates a data source sharing the pool of a `SeaORM` connection.
    #[must_use]
    pub fn from_connection(db: &DatabaseConnection, timeout_secs: u64) -> Self {
        Self::new(
            db.get_postgres_connection_pool().clone(),
            Duration::from_secs(timeout_secs),
        )
    }

    async fn bounded<T, F>(&self, source: &str, work: F) -> Result<T, DataSourceError>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        match tokio::time::timeout(self.timeout, work).await {
            Ok(result) => result.map_err(|e| DataSourceError::Execution(format!("{source}: {e}"))),
            Err(_) => Err(DataSourceError::Timeout {
                secs: self.timeout.as_secs(),
            }),
        }
    }

    /// Reads the routine's declared inputs. The first overload wins.
    async fn routine(&self, source: &str) -> Result<Vec<RoutineParameter>, DataSourceError> {
        let (schema, name) = split_qualified(source)?;
        let rows = self
            .bounded(
                source,
                sqlx::query(ROUTINE_SQL)
                    .bind(schema)
                    .bind(name)
                    .fetch_all(&self.pool),
            )
            .await?;

        let Some(first) = rows.first() else {
            return Err(DataSourceError::NotFound(source.to_string()));
        };
        let specific: String = first.try_get(0).map_err(|e| conversion("specific_name", &e))?;

        let mut parameters = Vec::new();
        for row in &rows {
            let current: String = row.try_get(0).map_err(|e| conversion("specific_name", &e))?;
            if current != specific {
                break;
            }
            let Some(name) = row
                .try_get::<Option<String>, _>(1)
                .map_err(|e| conversion("parameter_name", &e))?
            else {
                continue;
            };
            parameters.push(RoutineParameter {
                name,
                udt_schema: row.try_get(2).map_err(|e| conversion("udt_schema", &e))?,
                udt_name: row.try_get(3).map_err(|e| conversion("udt_name", &e))?,
                default: row
                    .try_get(4)
                    .map_err(|e| conversion("parameter_default", &e))?,
            });
        }
        Ok(parameters)
    }
}

impl DataSource for ProcedureDataSource {
    async fn execute(
        &self,
        source: &str,
        params: &ParameterMap,
    ) -> Result<Vec<ResultSet>, DataSourceError> {
        let declared = self.routine(source).await?;
        let bound: Vec<(&RoutineParameter, Option<String>)> = declared
            .iter()
            .filter_map(|p| params.value(&p.name).map(|v| (p, bind_text(v))))
            .collect();

        let sql = call_sql(source, bound.iter().map(|(p, _)| *p));
        let mut query = sqlx::query(&sql);
        for (_, value) in &bound {
            query = query.bind(value.clone());
        }

        let rows = self.bounded(source, query.fetch_all(&self.pool)).await?;
        let result = decode_rows(&rows)?;
        tracing::debug!(
            source,
            bound = bound.len(),
            rows = result.rows.len(),
            "Data source executed"
        );
        Ok(vec![result])
    }

    async fn declared_parameters(
        &self,
        source: &str,
    ) -> Result<Vec<DeclaredParameter>, DataSourceError> {
        Ok(self
            .routine(source)
            .await?
            .into_iter()
            .map(|p| DeclaredParameter {
                default: p.default,
                ..DeclaredParameter::new(p.name, p.udt_name, false)
            })
            .collect())
    }
}

/// Splits `schema.name`; an unqualified name resolves in the current schema.
fn split_qualified(source: &str) -> Result<(Option<&str>, &str), DataSourceError> {
    let source = source.trim();
    let (schema, name) = match source.split_once('.') {
        Some((schema, name)) => (Some(schema), name),
        None => (None, source),
    };
    if schema.is_some_and(|s| !is_identifier(s)) || !is_identifier(name) {
        return Err(DataSourceError::InvalidName(source.to_string()));
    }
    Ok((schema, name))
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Builds `SELECT * FROM source("p" => $1::"schema"."type", ...)`.
///
/// The source must already be validated by [`split_qualified`].
fn call_sql<'a>(source: &str, parameters: impl Iterator<Item = &'a RoutineParameter>) -> String {
    let args: Vec<String> = parameters
        .enumerate()
        .map(|(i, p)| {
            format!(
                "{} => ${}::{}.{}",
                quote_ident(&p.name),
                i + 1,
                quote_ident(&p.udt_schema),
                quote_ident(&p.udt_name)
            )
        })
        .collect();
    format!("SELECT * FROM {}({})", source.trim(), args.join(", "))
}

/// Every value is bound as text and cast server-side to the declared type.
fn bind_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

fn decode_rows(rows: &[PgRow]) -> Result<ResultSet, DataSourceError> {
    let Some(first) = rows.first() else {
        return Ok(ResultSet::new(Vec::new(), Vec::new()));
    };
    let columns: Vec<String> = first.columns().iter().map(|c| c.name().to_string()).collect();

    let mut decoded = Vec::with_capacity(rows.len());
    for row in rows {
        let mut values = Vec::with_capacity(columns.len());
        for column in row.columns() {
            values.push(decode_value(row, column.ordinal(), column.type_info().name())?);
        }
        decoded.push(values);
    }
    Ok(ResultSet::new(columns, decoded))
}

fn decode_value(row: &PgRow, index: usize, type_name: &str) -> Result<Value, DataSourceError> {
    fn get<'r, T>(row: &'r PgRow, index: usize) -> Result<Option<T>, sqlx::Error>
    where
        T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
    {
        row.try_get::<Option<T>, _>(index)
    }

    let column = || row.columns()[index].name().to_string();
    let fail = |e: sqlx::Error| DataSourceError::Conversion {
        column: column(),
        reason: e.to_string(),
    };

    let value = match type_name {
        "INT2" => get::<i16>(row, index).map_err(fail)?.map(|v| Value::Int32(i32::from(v))),
        "INT4" => get::<i32>(row, index).map_err(fail)?.map(Value::Int32),
        "INT8" => get::<i64>(row, index).map_err(fail)?.map(Value::Int64),
        "NUMERIC" => get::<Decimal>(row, index).map_err(fail)?.map(Value::Decimal),
        "FLOAT4" => get::<f32>(row, index)
            .map_err(fail)?
            .map(|v| float_to_decimal(Decimal::try_from(v), &column))
            .transpose()?,
        "FLOAT8" => get::<f64>(row, index)
            .map_err(fail)?
            .map(|v| float_to_decimal(Decimal::try_from(v), &column))
            .transpose()?,
        "BOOL" => get::<bool>(row, index).map_err(fail)?.map(Value::Bool),
        "DATE" => get::<NaiveDate>(row, index).map_err(fail)?.map(Value::Date),
        "TIMESTAMP" => get::<NaiveDateTime>(row, index)
            .map_err(fail)?
            .map(Value::DateTime),
        "TIMESTAMPTZ" => get::<DateTime<Utc>>(row, index)
            .map_err(fail)?
            .map(|v| Value::DateTime(v.naive_utc())),
        "UUID" => get::<uuid::Uuid>(row, index)
            .map_err(fail)?
            .map(|v| Value::Text(v.to_string())),
        "JSON" | "JSONB" => get::<serde_json::Value>(row, index)
            .map_err(fail)?
            .map(|v| Value::Text(v.to_string())),
        _ => get::<String>(row, index).map_err(fail)?.map(Value::Text),
    };
    Ok(value.unwrap_or(Value::Null))
}

fn float_to_decimal(
    converted: Result<Decimal, rust_decimal::Error>,
    column: &dyn Fn() -> String,
) -> Result<Value, DataSourceError> {
    converted
        .map(Value::Decimal)
        .map_err(|e| DataSourceError::Conversion {
            column: column(),
            reason: e.to_string(),
        })
}

fn conversion(column: &str, error: &sqlx::Error) -> DataSourceError {
    DataSourceError::Conversion {
        column: column.to_string(),
        reason: error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    use super::*;

    fn param(name: &str, udt: &str) -> RoutineParameter {
        RoutineParameter {
            name: name.into(),
            udt_schema: "pg_catalog".into(),
            udt_name: udt.into(),
            default: None,
        }
    }

    #[rstest]
    #[case("rpt_arrears", Ok((None, "rpt_arrears")))]
    #[case(" reports.rpt_arrears ", Ok((Some("reports"), "rpt_arrears")))]
    #[case("_internal", Ok((None, "_internal")))]
    #[case("rpt-arrears", Err(()))]
    #[case("1rpt", Err(()))]
    #[case("reports.", Err(()))]
    #[case("rpt; DROP TABLE x", Err(()))]
    #[case("", Err(()))]
    fn test_source_names_are_identifiers(
        #[case] source: &str,
        #[case] expected: Result<(Option<&str>, &str), ()>,
    ) {
        assert_eq!(split_qualified(source).map_err(|_| ()), expected);
    }

    #[test]
    fn test_call_binds_by_name_with_casts() {
        let params = [param("p_month", "int4"), param("p_from", "date")];
        assert_eq!(
            call_sql("reports.rpt_arrears", params.iter()),
            r#"SELECT * FROM reports.rpt_arrears("p_month" => $1::"pg_catalog"."int4", "p_from" => $2::"pg_catalog"."date")"#
        );
    }

    #[test]
    fn test_call_without_parameters() {
        assert_eq!(call_sql("rpt_all", std::iter::empty()), "SELECT * FROM rpt_all()");
    }

    #[test]
    fn test_quoted_identifiers_escape_quotes() {
        assert_eq!(quote_ident(r#"we"ird"#), r#""we""ird""#);
    }

    #[rstest]
    #[case(Value::Null, None)]
    #[case(Value::Text("Riverside".into()), Some("Riverside"))]
    #[case(Value::Int32(7), Some("7"))]
    #[case(Value::Decimal(dec!(1234.50)), Some("1234.50"))]
    #[case(Value::Bool(true), Some("true"))]
    #[case(Value::Date(NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()), Some("2026-03-01"))]
    fn test_values_bind_as_text(#[case] value: Value, #[case] expected: Option<&str>) {
        assert_eq!(bind_text(&value).as_deref(), expected);
    }
}
