//! Column display labels.

use std::collections::HashMap;

/// Read-only snapshot of column labels.
///
/// Scoped entries are keyed by `(table, column)`, table-agnostic entries by
/// column alone. Keys compare case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMapping {
    columns: HashMap<String, String>,
    scoped: HashMap<(String, String), String>,
}

impl ColumnMapping {
    /// Creates an empty mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a table-agnostic label.
    pub fn insert(&mut self, column: &str, label: impl Into<String>) {
        self.columns.insert(column.to_lowercase(), label.into());
    }

    /// Adds a label scoped to one table.
    pub fn insert_scoped(&mut self, table: &str, column: &str, label: impl Into<String>) {
        self.scoped
            .insert((table.to_lowercase(), column.to_lowercase()), label.into());
    }

    /// Table-agnostic label of a column.
    #[must_use]
    pub fn label(&self, column: &str) -> Option<&str> {
        self.columns.get(&column.to_lowercase()).map(String::as_str)
    }

    /// Label of a column within a table.
    #[must_use]
    pub fn scoped_label(&self, table: &str, column: &str) -> Option<&str> {
        self.scoped
            .get(&(table.to_lowercase(), column.to_lowercase()))
            .map(String::as_str)
    }

    /// Number of entries of both kinds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len() + self.scoped.len()
    }

    /// Returns true if there are no labels at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() && self.scoped.is_empty()
    }

    /// Resolves the display label of a header reference.
    ///
    /// Tries the table-agnostic label, then every `table_column` split at an
    /// underscore from left to right as a scoped label, then falls back to
    /// the reference itself.
    #[must_use]
    pub fn resolve<'r>(&'r self, reference: &'r str) -> &'r str {
        if let Some(label) = self.label(reference) {
            return label;
        }
        reference
            .match_indices('_')
            .find_map(|(pos, _)| self.scoped_label(&reference[..pos], &reference[pos + 1..]))
            .unwrap_or(reference)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping() -> ColumnMapping {
        let mut mapping = ColumnMapping::new();
        mapping.insert("Balance", "Outstanding balance");
        mapping.insert_scoped("arrears", "amount", "Arrears amount");
        mapping.insert_scoped("rpt_fees", "due_date", "Fee due");
        mapping
    }

    #[test]
    fn test_table_agnostic_label_wins() {
        assert_eq!(mapping().resolve("balance"), "Outstanding balance");
    }

    #[test]
    fn test_scoped_label_by_underscore_split() {
        let mapping = mapping();
        assert_eq!(mapping.resolve("Arrears_Amount"), "Arrears amount");
        assert_eq!(mapping.resolve("rpt_fees_due_date"), "Fee due");
    }

    #[test]
    fn test_falls_back_to_reference() {
        let mapping = mapping();
        assert_eq!(mapping.resolve("penalty_rate"), "penalty_rate");
        assert_eq!(mapping.resolve("Status"), "Status");
    }
}
