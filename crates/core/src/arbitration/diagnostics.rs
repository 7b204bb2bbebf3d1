//! Per-execution issue handle.

use folio_shared::Severity;

use super::arbiter::Arbitration;
use super::issue::Issue;

/// Context-stamping front for an [`Arbitration`] collaborator.
///
/// One instance lives for one report execution. Issues of Warning severity
/// or above are kept for the report outcome.
pub struct Diagnostics<'a> {
    arbiter: &'a dyn Arbitration,
    report_name: Option<String>,
    job_number: Option<i64>,
    issues: Vec<Issue>,
}

impl<'a> Diagnostics<'a> {
    /// Creates a handle for one report execution.
    #[must_use]
    pub fn new(
        arbiter: &'a dyn Arbitration,
        report_name: impl Into<String>,
        job_number: Option<i64>,
    ) -> Self {
        Self {
            arbiter,
            report_name: Some(report_name.into()),
            job_number,
            issues: Vec::new(),
        }
    }

    /// Creates a handle without report context.
    #[must_use]
    pub fn detached(arbiter: &'a dyn Arbitration) -> Self {
        Self {
            arbiter,
            report_name: None,
            job_number: None,
            issues: Vec::new(),
        }
    }

    /// Stamps context on the issue and forwards it to the arbiter.
    ///
    /// Returns `false` if the report must stop.
    pub fn report(&mut self, mut issue: Issue) -> bool {
        if issue.report_name.is_none() {
            issue.report_name.clone_from(&self.report_name);
        }
        if issue.job_number.is_none() {
            issue.job_number = self.job_number;
        }

        let can_continue = self.arbiter.report(&issue);
        if issue.severity >= Severity::Warning {
            self.issues.push(issue);
        }
        can_continue
    }

    /// Reports a Warning raised by `module::method`, with an optional cause.
    pub fn warn(
        &mut self,
        code: &'static str,
        (module, method): (&'static str, &'static str),
        message: impl Into<String>,
        cause: Option<&(dyn std::error::Error + 'static)>,
    ) -> bool {
        let mut issue = Issue::warning(code, message).at(module, method);
        if let Some(cause) = cause {
            issue = issue.caused_by(cause);
        }
        self.report(issue)
    }

    /// Issues accumulated so far.
    #[must_use]
    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    /// Consumes the handle, returning the accumulated issues.
    #[must_use]
    pub fn into_issues(self) -> Vec<Issue> {
        self.issues
    }
}
