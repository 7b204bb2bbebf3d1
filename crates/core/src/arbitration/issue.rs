//! Reported issues.

use chrono::{DateTime, Utc};
use folio_shared::Severity;
use serde::Serialize;

/// A condition reported to the arbitration collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    /// Stable machine-readable code.
    pub code: &'static str,
    /// Severity on the ordered scale.
    pub severity: Severity,
    /// Human-readable description.
    pub message: String,
    /// Rendered cause chain, if the issue wraps an error.
    pub cause: Option<String>,
    /// Report being assembled.
    pub report_name: Option<String>,
    /// Caller's job number.
    pub job_number: Option<i64>,
    /// Component that raised the issue.
    pub module: &'static str,
    /// Operation that raised the issue.
    pub method: &'static str,
    /// When the issue was raised.
    pub occurred_at: DateTime<Utc>,
}

impl Issue {
    /// Creates an issue without origin or context.
    #[must_use]
    pub fn new(code: &'static str, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            code,
            severity,
            message: message.into(),
            cause: None,
            report_name: None,
            job_number: None,
            module: "",
            method: "",
            occurred_at: Utc::now(),
        }
    }

    /// Creates a warning.
    #[must_use]
    pub fn warning(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(code, Severity::Warning, message)
    }

    /// Sets the component and operation that raised the issue.
    #[must_use]
    pub const fn at(mut self, module: &'static str, method: &'static str) -> Self {
        self.module = module;
        self.method = method;
        self
    }

    /// Attaches an error and its source chain as the cause.
    #[must_use]
    pub fn caused_by(mut self, error: &(dyn std::error::Error + 'static)) -> Self {
        let mut chain = error.to_string();
        let mut source = error.source();
        while let Some(inner) = source {
            chain.push_str(": ");
            chain.push_str(&inner.to_string());
            source = inner.source();
        }
        self.cause = Some(chain);
        self
    }

    /// Key used to persist each distinct issue once.
    #[must_use]
    pub fn dedup_key(&self) -> DedupKey {
        (
            self.report_name.clone(),
            self.job_number,
            self.code,
            self.module,
            self.method,
        )
    }
}

/// `(report, job, code, module, method)`.
pub type DedupKey = (Option<String>, Option<i64>, &'static str, &'static str, &'static str);
