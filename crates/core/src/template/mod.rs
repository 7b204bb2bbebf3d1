//! HTML template substitution.
//!
//! A pure function from template text, title, parameters and named tables
//! to HTML. No I/O happens here; the column mapping and execution time are
//! fixed when the [`TemplateEngine`] is built.
//!
//! Every substituted value is HTML-escaped, braces included, so text inserted
//! by one phase is never matched as a placeholder by a later one.

mod conditional;
mod engine;
mod error;
mod mapping;
mod rows;


pub use conditional::{Condition, SUMMARY_FLAG_FIELD};
pub use engine::{RenderLabels, TemplateEngine};
pub use error::TemplateError;
pub use mapping::ColumnMapping;
pub use rows::{MISSING_DATA_CLASS, NO_DATA_CLASS};

fn escape(text: &str) -> String {
    handlebars::html_escape(text)
        .replace('{', "&#123;")
        .replace('}', "&#125;")
}
