//! Persisted arbitration issues.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(ISSUES_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared("DROP TABLE IF EXISTS report_issues CASCADE;")
            .await?;
        Ok(())
    }
}

const ISSUES_SQL: &str = r"
CREATE TABLE report_issues (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    code VARCHAR(64) NOT NULL,
    severity VARCHAR(16) NOT NULL,
    message TEXT NOT NULL,
    cause TEXT,
    report_name VARCHAR(128),
    job_number BIGINT,
    module VARCHAR(64) NOT NULL,
    method VARCHAR(64) NOT NULL,
    occurred_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_issue_severity CHECK (severity IN ('information', 'warning', 'error', 'critical'))
);

CREATE INDEX idx_report_issues_report ON report_issues (lower(report_name), occurred_at DESC);
CREATE INDEX idx_report_issues_job ON report_issues (job_number) WHERE job_number IS NOT NULL;
";
