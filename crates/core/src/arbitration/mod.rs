//! Error arbitration.
//!
//! Every component reports non-fatal and fatal conditions through an
//! explicitly injected [`Arbitration`] implementation. The arbiter decides
//! whether an issue is persisted, de-duplicates repeats, and tells the caller
//! whether the report may continue.
//!
//! [`Diagnostics`] is the per-execution handle threaded through component
//! calls: it stamps report context on issues and accumulates the ones that
//! end up in the report outcome.

mod arbiter;
pub mod codes;
mod diagnostics;
mod issue;


pub use arbiter::{ArbiterSnapshot, Arbitration, ErrorArbiter, IssueSink};
pub use diagnostics::Diagnostics;
pub use issue::Issue;
