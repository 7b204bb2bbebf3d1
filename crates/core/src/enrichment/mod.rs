//! Parameter enrichment.
//!
//! Turns caller parameters into the full parameter map a report needs:
//!
//! 1. Normalize the flat `(name, value, type)` list (structural errors are fatal)
//! 2. Gap-fill declared parameters of the primary data source (best effort)
//! 3. Derive display names for month, charge type, settlement and
//!    organization through a [`LookupService`] (each failure is a warning)

mod engine;
mod error;
mod gap_fill;
mod lookup;


pub use engine::EnrichmentEngine;
pub use error::{DerivationError, EnrichmentError, LookupError};
pub use gap_fill::{DeclaredKind, classify};
pub use lookup::LookupService;
