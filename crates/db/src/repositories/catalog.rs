//! Report catalog repository: definitions, templates and column mappings.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use folio_core::aggregation::SourceDescriptor;
use folio_core::pipeline::{
    ColumnMappingStore, MergeMode, ReportDefinition, ReportDefinitionStore, StoreError,
    TemplateStore,
};
use folio_core::template::ColumnMapping;
use moka::future::Cache;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder};

use crate::entities::{column_mappings, report_definitions, report_templates};

/// Default cache capacity (entries per cache).
const DEFAULT_CACHE_CAPACITY: u64 = 500;

/// Reads report definitions, templates and column mappings.
///
/// Templates and mappings change rarely and are read on every PDF render,
/// so both are cached with a time-to-live. Definitions are always read
/// fresh.
#[derive(Clone)]
pub struct ReportRepository {
    db: DatabaseConnection,
    templates: Cache<String, Arc<String>>,
    mappings: Cache<String, Arc<ColumnMapping>>,
}

impl ReportRepository {
    /// Creates a repository whose caches expire after `ttl_secs`.
    #[must_use]
    pub fn new(db: DatabaseConnection, ttl_secs: u64) -> Self {
        let ttl = Duration::from_secs(ttl_secs);
        Self {
            db,
            templates: Cache::builder()
                .max_capacity(DEFAULT_CACHE_CAPACITY)
                .time_to_live(ttl)
                .build(),
            mappings: Cache::builder()
                .max_capacity(DEFAULT_CACHE_CAPACITY)
                .time_to_live(ttl)
                .build(),
        }
    }

    /// Drops every cached template and mapping.
    pub fn invalidate_all(&self) {
        self.templates.invalidate_all();
        self.mappings.invalidate_all();
    }

    async fn template(&self, report_name: &str) -> Result<Option<Arc<String>>, StoreError> {
        let key = report_name.trim().to_lowercase();
        if let Some(cached) = self.templates.get(&key).await {
            return Ok(Some(cached));
        }

        let Some(row) = report_templates::Entity::find_by_id(key.clone())
            .one(&self.db)
            .await
            .map_err(unavailable)?
        else {
            return Ok(None);
        };

        let body = Arc::new(row.body);
        self.templates.insert(key, Arc::clone(&body)).await;
        Ok(Some(body))
    }
}

impl std::fmt::Debug for ReportRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportRepository")
            .field("cached_templates", &self.templates.entry_count())
            .field("cached_mappings", &self.mappings.entry_count())
            .finish_non_exhaustive()
    }
}

impl ReportDefinitionStore for ReportRepository {
    async fn definition(&self, report_name: &str) -> Result<Option<ReportDefinition>, StoreError> {
        let row = report_definitions::Entity::find()
            .filter(
                Expr::expr(Func::lower(Expr::col(report_definitions::Column::Name)))
                    .eq(report_name.trim().to_lowercase()),
            )
            .one(&self.db)
            .await
            .map_err(unavailable)?;

        row.map(to_definition).transpose()
    }
}

impl TemplateStore for ReportRepository {
    async fn exists(&self, report_name: &str) -> Result<bool, StoreError> {
        Ok(self.template(report_name).await?.is_some())
    }

    async fn get(&self, report_name: &str) -> Result<String, StoreError> {
        self.template(report_name)
            .await?
            .map(|body| body.as_str().to_owned())
            .ok_or_else(|| StoreError::Unavailable(format!("No template stored for {report_name}")))
    }
}

impl ColumnMappingStore for ReportRepository {
    async fn mappings(&self, sources_joined: &str) -> Result<ColumnMapping, StoreError> {
        let key = sources_joined.trim().to_lowercase();
        if let Some(cached) = self.mappings.get(&key).await {
            return Ok(cached.as_ref().clone());
        }

        let rows = column_mappings::Entity::find()
            .filter(column_mappings::Column::SourcesKey.eq(key.as_str()))
            .order_by_asc(column_mappings::Column::Id)
            .all(&self.db)
            .await
            .map_err(unavailable)?;

        let mapping = build_mapping(rows);
        tracing::debug!(sources = %key, entries = mapping.len(), "Column mapping loaded");
        self.mappings.insert(key, Arc::new(mapping.clone())).await;
        Ok(mapping)
    }
}

fn to_definition(row: report_definitions::Model) -> Result<ReportDefinition, StoreError> {
    let invalid = |reason: String| StoreError::InvalidDefinition {
        name: row.name.clone(),
        reason,
    };
    let sources = SourceDescriptor::parse(&row.stored_proc_name).map_err(|e| invalid(e.to_string()))?;
    let merge_mode = MergeMode::from_str(&row.merge_mode).map_err(invalid)?;

    Ok(ReportDefinition {
        name: row.name,
        title: row.title,
        sources,
        merge_mode,
        dataset: row.dataset,
    })
}

fn build_mapping(rows: Vec<column_mappings::Model>) -> ColumnMapping {
    let mut mapping = ColumnMapping::new();
    for row in rows {
        match row.table_name.as_deref().map(str::trim) {
            Some(table) if !table.is_empty() => {
                mapping.insert_scoped(table, &row.column_name, row.label);
            }
            _ => mapping.insert(&row.column_name, row.label),
        }
    }
    mapping
}

fn unavailable(error: DbErr) -> StoreError {
    tracing::warn!(error = %error, "Report catalog query failed");
    StoreError::Unavailable(error.to_string())
}
