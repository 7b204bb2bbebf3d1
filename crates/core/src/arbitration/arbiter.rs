//! Threshold-based error arbiter.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use folio_shared::Severity;
use folio_shared::config::ArbitrationConfig;

use super::issue::{DedupKey, Issue};

/// Decides whether a reported issue lets the current report continue.
///
/// Implementations are shared across concurrent report executions.
pub trait Arbitration: Send + Sync {
    /// Records an issue. Returns `false` if the report must stop.
    fn report(&self, issue: &Issue) -> bool;
}

/// Durable destination for persisted issues (database, file).
///
/// Called with the arbiter's lock held; implementations must not block.
pub trait IssueSink: Send + Sync {
    /// Hands an issue over for persistence.
    fn persist(&self, issue: &Issue);
}

#[derive(Debug, Default)]
struct ArbiterState {
    total: u64,
    last: [Option<Issue>; 4],
    seen: HashSet<DedupKey>,
}

/// Point-in-time copy of the arbiter's counters.
#[derive(Debug, Clone, Default)]
pub struct ArbiterSnapshot {
    /// Number of issues ever reported.
    pub total: u64,
    /// Number of distinct de-duplication keys persisted.
    pub persisted: usize,
    /// Most recent issue per severity, lowest severity first.
    pub last: [Option<Issue>; 4],
}

impl ArbiterSnapshot {
    /// Most recent issue of the given severity.
    #[must_use]
    pub fn last_of(&self, severity: Severity) -> Option<&Issue> {
        self.last[severity.index()].as_ref()
    }
}

/// Default [`Arbitration`] implementation.
///
/// Counter, per-severity last issue and de-duplication set are updated under
/// a single lock.
pub struct ErrorArbiter {
    config: ArbitrationConfig,
    state: Mutex<ArbiterState>,
    sink: Option<Arc<dyn IssueSink>>,
}

impl ErrorArbiter {
    /// Creates an arbiter that only logs.
    #[must_use]
    pub fn new(config: ArbitrationConfig) -> Self {
        Self {
            config,
            state: Mutex::new(ArbiterState::default()),
            sink: None,
        }
    }

    /// Creates an arbiter that also hands persisted issues to `sink`.
    #[must_use]
    pub fn with_sink(config: ArbitrationConfig, sink: Arc<dyn IssueSink>) -> Self {
        Self {
            sink: Some(sink),
            ..Self::new(config)
        }
    }

    /// Thresholds in effect.
    #[must_use]
    pub const fn config(&self) -> ArbitrationConfig {
        self.config
    }

    /// Copies the current counters.
    #[must_use]
    pub fn snapshot(&self) -> ArbiterSnapshot {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        ArbiterSnapshot {
            total: state.total,
            persisted: state.seen.len(),
            last: state.last.clone(),
        }
    }

    fn emit(issue: &Issue) {
        let report = issue.report_name.as_deref().unwrap_or("-");
        match issue.severity {
            Severity::Information => tracing::info!(
                code = issue.code,
                report,
                job = issue.job_number,
                module = issue.module,
                method = issue.method,
                "{}",
                issue.message
            ),
            Severity::Warning => tracing::warn!(
                code = issue.code,
                report,
                job = issue.job_number,
                module = issue.module,
                method = issue.method,
                cause = issue.cause.as_deref(),
                "{}",
                issue.message
            ),
            Severity::Error | Severity::Critical => tracing::error!(
                code = issue.code,
                severity = %issue.severity,
                report,
                job = issue.job_number,
                module = issue.module,
                method = issue.method,
                cause = issue.cause.as_deref(),
                "{}",
                issue.message
            ),
        }
    }
}

impl Arbitration for ErrorArbiter {
    fn report(&self, issue: &Issue) -> bool {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.total += 1;
        state.last[issue.severity.index()] = Some(issue.clone());

        if issue.severity >= self.config.log_threshold && state.seen.insert(issue.dedup_key()) {
            Self::emit(issue);
            if let Some(sink) = &self.sink {
                sink.persist(issue);
            }
        }

        issue.severity < self.config.break_threshold
    }
}

impl std::fmt::Debug for ErrorArbiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorArbiter")
            .field("config", &self.config)
            .field("has_sink", &self.sink.is_some())
            .finish_non_exhaustive()
    }
}
