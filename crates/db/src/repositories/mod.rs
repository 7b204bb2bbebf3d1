//! Repository abstractions for data access.
//!
//! Repositories implement the pipeline's collaborator traits over
//! PostgreSQL, hiding the `SeaORM` and sqlx details from the rest of the
//! application.

pub mod catalog;
pub mod issues;
pub mod lookup;
pub mod procedure;

pub use catalog::ReportRepository;
pub use issues::{DbIssueSink, IssueRepository};
pub use lookup::LookupRepository;
pub use procedure::ProcedureDataSource;
