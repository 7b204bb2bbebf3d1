//! Multi-source tabular aggregation with schema union.
//!
//! Each data source is invoked exactly once, in list order. Result sets are
//! merged into a [`Table`] whose schema is the first-seen-ordered union of
//! every column ever merged; cells a source never supplied hold
//! [`Cell::Absent`].

mod aggregator;
mod error;
mod source;
mod table;


pub use aggregator::TabularAggregator;
pub use error::{AggregationError, DataSourceError};
pub use source::{DataSource, DeclaredParameter, SourceDescriptor};
pub use table::{Cell, NamedTables, ResultSet, Schema, Table};
