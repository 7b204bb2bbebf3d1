//! Report parameters.
//!
//! Parameters arrive either through the [`ReportRequest`] builder or as the
//! legacy flat list of `(name, value, type)` triples. Both paths end in a
//! validated, case-insensitive [`ParameterMap`].

mod coerce;
mod error;
mod map;
mod request;

#[cfg(test)]
mod tests;

pub use coerce::{coerce_value, normalize_triples, parse_type_tag};
pub use error::ParameterError;
pub use map::{Parameter, ParameterMap, normalize_key};
pub use request::{OutputFormat, ReportRequest, ReportRequestBuilder, SuppliedParameters};
