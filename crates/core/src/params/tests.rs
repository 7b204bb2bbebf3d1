//! Tests for parameter normalization and request building.

use chrono::NaiveDate;
use folio_shared::{ParamType, Value};
use rstest::rstest;
use rust_decimal_macros::dec;
use serde_json::{Value as Json, json};

use super::*;

#[test]
fn test_normalize_triples_builds_typed_map() {
    let raw = vec![
        json!("Month"),
        json!(3),
        json!("Int32"),
        json!("ChargeTypes"),
        json!("10,20"),
        json!("String"),
        json!("Amount"),
        json!("1234.5"),
        json!(3),
    ];

    let map = normalize_triples(&raw).unwrap();

    assert_eq!(map.len(), 3);
    assert_eq!(map.value("month"), Some(&Value::Int32(3)));
    assert_eq!(map.value("CHARGETYPES"), Some(&Value::Text("10,20".into())));
    let amount = map.get("amount").unwrap();
    assert_eq!(amount.value, Value::Decimal(dec!(1234.5)));
    assert_eq!(amount.param_type, ParamType::Decimal);
    assert_eq!(amount.name, "Amount");
}

#[test]
fn test_normalize_triples_rejects_partial_triple() {
    let raw = vec![json!("Month"), json!(3)];
    assert_eq!(
        normalize_triples(&raw),
        Err(ParameterError::MalformedTriples { len: 2 })
    );
}

#[rstest]
#[case(json!(""))]
#[case(json!("   "))]
#[case(json!(null))]
#[case(json!(7))]
fn test_normalize_triples_rejects_empty_names(#[case] name: Json) {
    let raw = vec![
        json!("Year"),
        json!(2026),
        json!("Int32"),
        name,
        json!("x"),
        json!("String"),
    ];
    assert_eq!(
        normalize_triples(&raw),
        Err(ParameterError::EmptyName { position: 1 })
    );
}

#[test]
fn test_duplicate_names_are_a_hard_error() {
    let raw = vec![
        json!("Month"),
        json!(3),
        json!("Int32"),
        json!("@MONTH"),
        json!(4),
        json!("Int32"),
    ];
    assert_eq!(
        normalize_triples(&raw),
        Err(ParameterError::DuplicateName("@MONTH".into()))
    );
}

#[rstest]
#[case(json!("Int32"), ParamType::Int32)]
#[case(json!("boolean"), ParamType::Boolean)]
#[case(json!(5), ParamType::DateTime)]
#[case(json!("3"), ParamType::Decimal)]
#[case(json!(0), ParamType::String)]
fn test_parse_type_tag_accepts_names_and_codes(#[case] tag: Json, #[case] expected: ParamType) {
    assert_eq!(parse_type_tag("p", &tag).unwrap(), expected);
}

#[rstest]
#[case(json!("Float"))]
#[case(json!(99))]
#[case(json!(1.5))]
#[case(json!(true))]
fn test_parse_type_tag_rejects_unknown(#[case] tag: Json) {
    assert!(matches!(
        parse_type_tag("p", &tag),
        Err(ParameterError::TypeMismatch { .. })
    ));
}

#[rstest]
#[case(json!("12"), ParamType::Int32, Value::Int32(12))]
#[case(json!(5_000_000_000_i64), ParamType::Int64, Value::Int64(5_000_000_000))]
#[case(json!(0.1), ParamType::Decimal, Value::Decimal(dec!(0.1)))]
#[case(json!("yes"), ParamType::Boolean, Value::Bool(true))]
#[case(json!(0), ParamType::Boolean, Value::Bool(false))]
#[case(json!(42), ParamType::String, Value::Text("42".into()))]
#[case(json!(""), ParamType::Int32, Value::Null)]
#[case(json!(null), ParamType::String, Value::Null)]
#[case(
    json!("2026-02-01"),
    ParamType::DateTime,
    Value::Date(NaiveDate::from_ymd_opt(2026, 2, 1).unwrap())
)]
#[case(
    json!("01/02/2026"),
    ParamType::DateTime,
    Value::Date(NaiveDate::from_ymd_opt(2026, 2, 1).unwrap())
)]
#[case(
    json!("2026-02-01T10:30:00"),
    ParamType::DateTime,
    Value::DateTime(NaiveDate::from_ymd_opt(2026, 2, 1).unwrap().and_hms_opt(10, 30, 0).unwrap())
)]
fn test_coerce_value(#[case] raw: Json, #[case] ty: ParamType, #[case] expected: Value) {
    assert_eq!(coerce_value("p", &raw, ty).unwrap(), expected);
}

#[rstest]
#[case(json!("abc"), ParamType::Int32)]
#[case(json!(3_000_000_000_i64), ParamType::Int32)]
#[case(json!("maybe"), ParamType::Boolean)]
#[case(json!("31/31/2026"), ParamType::DateTime)]
#[case(json!([1, 2]), ParamType::String)]
fn test_coerce_value_rejects_mismatches(#[case] raw: Json, #[case] ty: ParamType) {
    assert!(matches!(
        coerce_value("p", &raw, ty),
        Err(ParameterError::TypeMismatch { .. })
    ));
}

#[test]
fn test_normalize_key_ignores_case_and_at_prefix() {
    assert_eq!(normalize_key("@Month"), "month");
    assert_eq!(normalize_key("  MONTH "), "month");
    assert_eq!(normalize_key("@"), "");
}

#[test]
fn test_insert_if_absent_never_overwrites() {
    let mut map = ParameterMap::new();
    map.insert(Parameter::text("Title", "Original")).unwrap();

    assert!(!map.insert_if_absent(Parameter::text("title", "Replacement")));
    assert_eq!(map.value("TITLE"), Some(&Value::Text("Original".into())));
    assert!(map.insert_if_absent(Parameter::text("Other", "x")));
    assert_eq!(map.len(), 2);
}

#[test]
fn test_builder_validates_parameters() {
    let request = ReportRequest::builder("monthly-collections")
        .job_number(17)
        .format(OutputFormat::Spreadsheet)
        .param("Month", 4, ParamType::Int32)
        .param("Settlement", "12", ParamType::String)
        .build()
        .unwrap();

    assert_eq!(request.report_name, "monthly-collections");
    assert_eq!(request.job_number, Some(17));
    assert_eq!(request.format, OutputFormat::Spreadsheet);
    let SuppliedParameters::Map(params) = &request.parameters else {
        panic!("builder must produce a validated map");
    };
    assert_eq!(params.value("month"), Some(&Value::Int32(4)));

    let duplicate = ReportRequest::builder("r")
        .param("Month", 4, ParamType::Int32)
        .param("month", 5, ParamType::Int32)
        .build();
    assert_eq!(
        duplicate,
        Err(ParameterError::DuplicateName("month".into()))
    );

    let blank = ReportRequest::builder("r")
        .param(" ", 4, ParamType::Int32)
        .build();
    assert_eq!(blank, Err(ParameterError::EmptyName { position: 0 }));

    assert_eq!(
        ReportRequest::builder("  ").build(),
        Err(ParameterError::EmptyReportName)
    );
}

#[test]
fn test_from_triples_defers_normalization() {
    let request = ReportRequest::from_triples(
        "arrears",
        OutputFormat::Pdf,
        None,
        vec![json!("Year"), json!(2026)],
    );

    assert_eq!(request.report_name, "arrears");
    assert_eq!(
        request.parameters,
        SuppliedParameters::Triples(vec![json!("Year"), json!(2026)])
    );
}

#[test]
fn test_output_format_parsing() {
    assert_eq!("PDF".parse::<OutputFormat>().unwrap(), OutputFormat::Pdf);
    assert_eq!(
        "excel".parse::<OutputFormat>().unwrap(),
        OutputFormat::Spreadsheet
    );
    assert!("docx".parse::<OutputFormat>().is_err());
}
