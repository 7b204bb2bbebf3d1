//! Sequential multi-source aggregation.

use super::error::AggregationError;
use super::source::DataSource;
use super::table::{NamedTables, ResultSet, Table};
use crate::params::ParameterMap;

/// Invokes data sources in order and merges their results.
///
/// Sources run strictly one after another: later sources may widen the
/// schema, so merge order is observable.
pub struct TabularAggregator<'a, D: DataSource> {
    data_source: &'a D,
}

impl<'a, D: DataSource> TabularAggregator<'a, D> {
    /// Creates an aggregator over a data-source collaborator.
    #[must_use]
    pub const fn new(data_source: &'a D) -> Self {
        Self { data_source }
    }

    /// Unions every result set of every source into one table.
    ///
    /// # Errors
    ///
    /// Returns [`AggregationError::NoSources`] for an empty list and
    /// [`AggregationError::SourceFailed`] naming the first failing source.
    pub async fn aggregate_union(
        &self,
        sources: &[String],
        params: &ParameterMap,
    ) -> Result<Table, AggregationError> {
        if sources.is_empty() {
            return Err(AggregationError::NoSources);
        }

        let mut table = Table::new();
        for source in sources {
            for result in self.fetch(source, params).await? {
                table.merge(result);
            }
        }
        Ok(table)
    }

    /// Builds one table per source, keyed by source name.
    ///
    /// A source listed twice is invoked twice and both results are merged
    /// into the same table.
    ///
    /// # Errors
    ///
    /// Same as [`aggregate_union`](Self::aggregate_union).
    pub async fn aggregate_per_source(
        &self,
        sources: &[String],
        params: &ParameterMap,
    ) -> Result<NamedTables, AggregationError> {
        if sources.is_empty() {
            return Err(AggregationError::NoSources);
        }

        let mut tables = NamedTables::new();
        for source in sources {
            let results = self.fetch(source, params).await?;
            let table = tables.entry(source);
            for result in results {
                table.merge(result);
            }
        }
        Ok(tables)
    }

    async fn fetch(
        &self,
        source: &str,
        params: &ParameterMap,
    ) -> Result<Vec<ResultSet>, AggregationError> {
        let results = self
            .data_source
            .execute(source, params)
            .await
            .map_err(|cause| {
                tracing::warn!(source, error = %cause, "Data source failed");
                AggregationError::SourceFailed {
                    source_name: source.to_string(),
                    cause,
                }
            })?;

        tracing::debug!(
            source,
            result_sets = results.len(),
            rows = results.iter().map(|r| r.rows.len()).sum::<usize>(),
            "Data source returned"
        );
        Ok(results)
    }
}
