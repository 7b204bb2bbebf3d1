//! Report catalog and lookup tables.
//!
//! Creates report definitions, templates, column mappings and the lookup
//! tables used to derive display parameters.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(CATALOG_SQL).await?;
        db.execute_unprepared(LOOKUP_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(
            r"
DROP TABLE IF EXISTS organization_profile CASCADE;
DROP TABLE IF EXISTS settlements CASCADE;
DROP TABLE IF EXISTS charge_types CASCADE;
DROP TABLE IF EXISTS lookup_months CASCADE;
DROP TABLE IF EXISTS column_mappings CASCADE;
DROP TABLE IF EXISTS report_templates CASCADE;
DROP TABLE IF EXISTS report_definitions CASCADE;
",
        )
        .await?;
        Ok(())
    }
}

const CATALOG_SQL: &str = r"
CREATE TABLE report_definitions (
    id SERIAL PRIMARY KEY,
    name VARCHAR(128) NOT NULL,
    title VARCHAR(256) NOT NULL DEFAULT '',
    stored_proc_name TEXT NOT NULL,
    merge_mode VARCHAR(16) NOT NULL DEFAULT 'union',
    dataset VARCHAR(128) NOT NULL DEFAULT 'data',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_report_name_not_blank CHECK (btrim(name) <> ''),
    CONSTRAINT chk_sources_not_blank CHECK (btrim(stored_proc_name, ' ;') <> ''),
    CONSTRAINT chk_merge_mode CHECK (merge_mode IN ('union', 'per_source'))
);

CREATE UNIQUE INDEX uq_report_definitions_name ON report_definitions (lower(name));

CREATE TABLE report_templates (
    report_key VARCHAR(128) PRIMARY KEY,
    body TEXT NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_report_key_lower CHECK (report_key = lower(report_key))
);

CREATE TABLE column_mappings (
    id SERIAL PRIMARY KEY,
    sources_key TEXT NOT NULL,
    table_name VARCHAR(128),
    column_name VARCHAR(128) NOT NULL,
    label VARCHAR(256) NOT NULL,
    CONSTRAINT chk_sources_key_lower CHECK (sources_key = lower(sources_key))
);

CREATE UNIQUE INDEX uq_column_mappings_entry
    ON column_mappings (sources_key, lower(coalesce(table_name, '')), lower(column_name));
";

const LOOKUP_SQL: &str = r"
CREATE TABLE lookup_months (
    month SMALLINT PRIMARY KEY,
    name VARCHAR(32) NOT NULL,
    period_name VARCHAR(32) NOT NULL,
    CONSTRAINT chk_month_range CHECK (month BETWEEN 1 AND 12)
);

CREATE TABLE charge_types (
    code VARCHAR(32) PRIMARY KEY,
    name VARCHAR(128) NOT NULL
);

CREATE TABLE settlements (
    code VARCHAR(32) PRIMARY KEY,
    name VARCHAR(128) NOT NULL
);

CREATE TABLE organization_profile (
    id SMALLINT PRIMARY KEY DEFAULT 1,
    name VARCHAR(256) NOT NULL,
    CONSTRAINT chk_single_profile CHECK (id = 1)
);
";
