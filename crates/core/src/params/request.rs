//! Validated report requests.

use std::fmt;
use std::str::FromStr;

use folio_shared::{ParamType, Value};
use serde::{Deserialize, Serialize};

use super::error::ParameterError;
use super::map::{Parameter, ParameterMap};

/// Output document kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// HTML rendered through a template, then converted to PDF.
    Pdf,
    /// Tables written directly as a spreadsheet (CSV).
    Spreadsheet,
}

impl OutputFormat {
    /// MIME type of the produced payload.
    #[must_use]
    pub const fn content_type(self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Spreadsheet => "text/csv; charset=utf-8",
        }
    }

    /// File extension of the produced payload.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Spreadsheet => "csv",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pdf => write!(f, "pdf"),
            Self::Spreadsheet => write!(f, "spreadsheet"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pdf" => Ok(Self::Pdf),
            "spreadsheet" | "excel" | "xlsx" | "csv" => Ok(Self::Spreadsheet),
            _ => Err(format!("Unknown output format: {s}")),
        }
    }
}

/// Caller parameters as they reached the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuppliedParameters {
    /// Validated by [`ReportRequestBuilder::build`].
    Map(ParameterMap),
    /// Flat `(name, value, type)` list, normalized when the report runs.
    Triples(Vec<serde_json::Value>),
}

/// A request to assemble one report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRequest {
    /// Name of the report definition.
    pub report_name: String,
    /// Caller's job number, used for issue de-duplication.
    pub job_number: Option<i64>,
    /// Requested output.
    pub format: OutputFormat,
    /// Caller-supplied parameters.
    pub parameters: SuppliedParameters,
}

impl ReportRequest {
    /// Starts building a PDF request for the named report.
    #[must_use]
    pub fn builder(report_name: impl Into<String>) -> ReportRequestBuilder {
        ReportRequestBuilder {
            report_name: report_name.into(),
            job_number: None,
            format: OutputFormat::Pdf,
            parameters: Vec::new(),
        }
    }

    /// Wraps the flat `(name, value, type)` list without validating it.
    ///
    /// Normalization errors surface when the pipeline runs the request, so
    /// they are reported like every other fatal failure.
    #[must_use]
    pub fn from_triples(
        report_name: impl Into<String>,
        format: OutputFormat,
        job_number: Option<i64>,
        raw: Vec<serde_json::Value>,
    ) -> Self {
        Self {
            report_name: report_name.into(),
            job_number,
            format,
            parameters: SuppliedParameters::Triples(raw),
        }
    }
}

/// Builder for [`ReportRequest`]. Validation happens in [`build`](Self::build).
#[derive(Debug, Clone)]
pub struct ReportRequestBuilder {
    report_name: String,
    job_number: Option<i64>,
    format: OutputFormat,
    parameters: Vec<Parameter>,
}

impl ReportRequestBuilder {
    /// Sets the caller's job number.
    #[must_use]
    pub const fn job_number(mut self, job_number: i64) -> Self {
        self.job_number = Some(job_number);
        self
    }

    /// Sets the output format.
    #[must_use]
    pub const fn format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Adds a parameter.
    #[must_use]
    pub fn param(
        mut self,
        name: impl Into<String>,
        value: impl Into<Value>,
        param_type: ParamType,
    ) -> Self {
        self.parameters.push(Parameter::new(name, value, param_type));
        self
    }

    /// Validates and builds the request.
    ///
    /// # Errors
    ///
    /// Returns a [`ParameterError`] for a blank report name or blank and
    /// duplicate parameter names.
    pub fn build(self) -> Result<ReportRequest, ParameterError> {
        if self.report_name.trim().is_empty() {
            return Err(ParameterError::EmptyReportName);
        }

        let mut parameters = ParameterMap::new();
        for (position, parameter) in self.parameters.into_iter().enumerate() {
            if parameter.name.trim().is_empty() {
                return Err(ParameterError::EmptyName { position });
            }
            parameters.insert(parameter)?;
        }

        Ok(ReportRequest {
            report_name: self.report_name,
            job_number: self.job_number,
            format: self.format,
            parameters: SuppliedParameters::Map(parameters),
        })
    }
}
