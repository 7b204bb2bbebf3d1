//! Issue log persistence.

use folio_core::arbitration::{Issue, IssueSink};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::entities::report_issues;

/// Hands issues to a background writer.
///
/// [`IssueSink::persist`] is called while the arbiter holds its lock, so it
/// only enqueues. The writer task inserts rows until every sink clone is
/// dropped.
#[derive(Debug, Clone)]
pub struct DbIssueSink {
    sender: mpsc::UnboundedSender<Issue>,
}

impl DbIssueSink {
    /// Creates a sink and spawns its writer on the current runtime.
    #[must_use]
    pub fn spawn(db: DatabaseConnection) -> (Self, JoinHandle<()>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let writer = tokio::spawn(write_issues(IssueRepository::new(db), receiver));
        (Self { sender }, writer)
    }
}

impl IssueSink for DbIssueSink {
    fn persist(&self, issue: &Issue) {
        if self.sender.send(issue.clone()).is_err() {
            tracing::warn!(code = issue.code, "Issue writer stopped, issue not persisted");
        }
    }
}

async fn write_issues(repo: IssueRepository, mut receiver: mpsc::UnboundedReceiver<Issue>) {
    while let Some(issue) = receiver.recv().await {
        if let Err(e) = repo.insert(&issue).await {
            tracing::error!(code = issue.code, error = %e, "Failed to persist issue");
        }
    }
    tracing::debug!("Issue writer finished");
}

/// Reads and writes the issue log.
#[derive(Debug, Clone)]
pub struct IssueRepository {
    db: DatabaseConnection,
}

impl IssueRepository {
    /// Creates a new issue repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Inserts one issue.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn insert(&self, issue: &Issue) -> Result<report_issues::Model, DbErr> {
        report_issues::ActiveModel {
            id: Set(Uuid::now_v7()),
            code: Set(issue.code.to_string()),
            severity: Set(issue.severity.as_str().to_string()),
            message: Set(issue.message.clone()),
            cause: Set(issue.cause.clone()),
            report_name: Set(issue.report_name.clone()),
            job_number: Set(issue.job_number),
            module: Set(issue.module.to_string()),
            method: Set(issue.method.to_string()),
            occurred_at: Set(issue.occurred_at.into()),
        }
        .insert(&self.db)
        .await
    }

    /// Lists the most recent issues of a job, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn recent_for_job(
        &self,
        job_number: i64,
        limit: u64,
    ) -> Result<Vec<report_issues::Model>, DbErr> {
        report_issues::Entity::find()
            .filter(report_issues::Column::JobNumber.eq(job_number))
            .order_by_desc(report_issues::Column::OccurredAt)
            .limit(limit)
            .all(&self.db)
            .await
    }
}
