//! Core report assembly logic for Folio.
//!
//! This crate contains the report assembly pipeline with ZERO web or database
//! dependencies. Collaborators (data sources, lookups, stores, output
//! backends) are traits implemented by the adapter crates.
//!
//! # Modules
//!
//! - `params` - Parameter maps, coercion and validated report requests
//! - `arbitration` - Severity-based error arbitration and diagnostics
//! - `aggregation` - Multi-source tabular aggregation with schema union
//! - `enrichment` - Gap-filling and derived display parameters
//! - `template` - HTML placeholder substitution engine
//! - `pipeline` - Orchestration of a single report execution

pub mod aggregation;
pub mod arbitration;
pub mod enrichment;
pub mod params;
pub mod pipeline;
pub mod template;

#[cfg(test)]
pub(crate) mod test_support;
