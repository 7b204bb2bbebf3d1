//! Row-block expansion.
//!
//! A row block is a `<tr>` element carrying `data-table-row="dataset"`. It is
//! repeated once per dataset row with `{{Column}}` placeholders substituted.

use std::fmt::Write as _;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::error::TemplateError;
use super::escape;
use crate::aggregation::{Cell, NamedTables, Table};

static ROW_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<tr\b[^>]*>|</tr\s*>").expect("row tag pattern"));

static ROW_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\s+data-table-row\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("row marker pattern")
});

static CELL_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<t[dh]\b").expect("cell tag pattern"));

static COLUMN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{\s*([\p{L}_][\w .\-]*?)\s*\}\}").expect("column placeholder pattern")
});

/// CSS class of the row standing in for a dataset that was never produced.
pub const MISSING_DATA_CLASS: &str = "folio-missing-data";

/// CSS class of the row standing in for an empty dataset.
pub const NO_DATA_CLASS: &str = "folio-no-data";

/// A located row block.
struct RowBlock {
    start: usize,
    end: usize,
    dataset: String,
}

/// Fallback texts of placeholder rows.
pub struct FallbackText<'t> {
    pub no_data: &'t str,
    pub missing_data: &'t str,
}

/// Expands every row block of `text`.
pub fn expand(
    text: &str,
    tables: &NamedTables,
    fallback: &FallbackText<'_>,
) -> Result<String, TemplateError> {
    let blocks = locate(text)?;
    if blocks.is_empty() {
        return Ok(text.to_string());
    }

    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    for block in blocks {
        out.push_str(&text[cursor..block.start]);
        let fragment = unmark(&text[block.start..block.end]);
        match tables.get(&block.dataset) {
            None => placeholder_row(&mut out, MISSING_DATA_CLASS, &fragment, fallback.missing_data),
            Some(table) if table.is_empty() => {
                placeholder_row(&mut out, NO_DATA_CLASS, &fragment, fallback.no_data);
            }
            Some(table) => repeat(&mut out, &fragment, table),
        }
        cursor = block.end;
    }
    out.push_str(&text[cursor..]);
    Ok(out)
}

/// Finds row blocks, tracking `<tr>` depth so inner rows stay in the block.
fn locate(text: &str) -> Result<Vec<RowBlock>, TemplateError> {
    let mut blocks = Vec::new();
    let mut open: Option<(usize, String)> = None;
    let mut depth = 0usize;

    for tag in ROW_TAG.find_iter(text) {
        let closing = tag.as_str().starts_with("</");
        let marker = if closing { None } else { dataset_of(tag.as_str()) };

        let Some((start, outer)) = &open else {
            match marker {
                Some(dataset) if dataset.is_empty() => {
                    return Err(TemplateError::MissingDatasetName {
                        offset: tag.start(),
                    });
                }
                Some(dataset) => {
                    open = Some((tag.start(), dataset));
                    depth = 1;
                }
                None => {}
            }
            continue;
        };

        if let Some(inner) = marker {
            return Err(TemplateError::NestedRowBlock {
                outer: outer.clone(),
                inner,
            });
        }
        if !closing {
            depth += 1;
            continue;
        }
        depth -= 1;
        if depth == 0 {
            blocks.push(RowBlock {
                start: *start,
                end: tag.end(),
                dataset: outer.clone(),
            });
            open = None;
        }
    }

    match open {
        Some((_, dataset)) => Err(TemplateError::UnterminatedRowBlock(dataset)),
        None => Ok(blocks),
    }
}

fn dataset_of(tag: &str) -> Option<String> {
    ROW_MARKER.captures(tag).map(|caps| {
        caps.get(1)
            .or_else(|| caps.get(2))
            .map_or("", |m| m.as_str())
            .trim()
            .to_string()
    })
}

/// Removes the row marker from the fragment's opening tag.
fn unmark(fragment: &str) -> String {
    ROW_MARKER.replace(fragment, "").into_owned()
}

fn placeholder_row(out: &mut String, class: &str, fragment: &str, text: &str) {
    let span = CELL_TAG.find_iter(fragment).count().max(1);
    let _ = write!(
        out,
        r#"<tr class="{class}"><td colspan="{span}">{}</td></tr>"#,
        escape(text)
    );
}

fn repeat(out: &mut String, fragment: &str, table: &Table) {
    for row in 0..table.len() {
        let expanded = COLUMN.replace_all(fragment, |caps: &Captures<'_>| {
            match table.cell(row, &caps[1]) {
                Some(Cell::Present(value)) => escape(&folio_shared::types::format_value(value)),
                Some(Cell::Absent) => String::new(),
                None => caps[0].to_string(),
            }
        });
        out.push_str(&expanded);
    }
}
