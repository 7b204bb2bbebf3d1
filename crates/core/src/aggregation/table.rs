//! Tabular data: result sets, union-merged tables and named table sets.

use std::collections::{HashMap, HashSet};

use folio_shared::Value;
use serde::{Deserialize, Serialize};

/// One tabular result returned by a data source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultSet {
    /// Column names in result order.
    pub columns: Vec<String>,
    /// Rows, one value per column.
    pub rows: Vec<Vec<Value>>,
}

impl ResultSet {
    /// Creates a result set.
    #[must_use]
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self { columns, rows }
    }

    /// Creates a result set from string-like column names.
    #[must_use]
    pub fn with_columns<S: AsRef<str>>(columns: &[S], rows: Vec<Vec<Value>>) -> Self {
        Self::new(
            columns.iter().map(|c| c.as_ref().to_string()).collect(),
            rows,
        )
    }
}

/// A table cell.
///
/// `Absent` marks a column the row's source never supplied, as opposed to a
/// supplied null or empty value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cell {
    /// Column not supplied by this row's source.
    #[default]
    Absent,
    /// Supplied value, possibly null.
    Present(Value),
}

impl Cell {
    /// Returns the value if present.
    #[must_use]
    pub const fn value(&self) -> Option<&Value> {
        match self {
            Self::Absent => None,
            Self::Present(v) => Some(v),
        }
    }

    /// Returns true for the absent marker.
    #[must_use]
    pub const fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

/// Ordered column list with case-insensitive membership.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    columns: Vec<String>,
    index: HashMap<String, usize>,
}

impl Schema {
    /// Creates an empty schema.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Column names in first-seen order, first spelling kept.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns true if the schema has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Position of a column, compared case-insensitively.
    #[must_use]
    pub fn position(&self, column: &str) -> Option<usize> {
        self.index.get(&column.to_lowercase()).copied()
    }

    /// Returns true if the column is part of the schema.
    #[must_use]
    pub fn contains(&self, column: &str) -> bool {
        self.position(column).is_some()
    }

    /// Appends a column unless already present. Returns its position.
    pub fn push(&mut self, column: &str) -> usize {
        let key = column.to_lowercase();
        if let Some(&pos) = self.index.get(&key) {
            return pos;
        }
        let pos = self.columns.len();
        self.columns.push(column.to_string());
        self.index.insert(key, pos);
        pos
    }
}

/// A union-merged table. Every row holds one cell per schema column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    schema: Schema,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Creates an empty table with an empty schema.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a table from a single result set.
    #[must_use]
    pub fn from_result(result: ResultSet) -> Self {
        let mut table = Self::new();
        table.merge(result);
        table
    }

    /// Table schema.
    #[must_use]
    pub const fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Rows in merge order.
    #[must_use]
    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell at `row` for the named column, compared case-insensitively.
    #[must_use]
    pub fn cell(&self, row: usize, column: &str) -> Option<&Cell> {
        let pos = self.schema.position(column)?;
        self.rows.get(row).and_then(|r| r.get(pos))
    }

    /// Merges a result set into the table.
    ///
    /// New columns are appended to the schema and back-filled with
    /// [`Cell::Absent`] in existing rows. Incoming rows get `Absent` for
    /// schema columns the result set lacks. A row shorter than the result's
    /// column list is padded with `Absent`; extra values are ignored.
    ///
    /// A name repeated within one result set is kept as a separate column
    /// with a numeric suffix (`Amount`, `amount` → `Amount`, `amount_2`).
    pub fn merge(&mut self, result: ResultSet) {
        let positions: Vec<usize> = distinct_columns(&result.columns)
            .iter()
            .map(|c| self.schema.push(c))
            .collect();

        let width = self.schema.len();
        for row in &mut self.rows {
            row.resize(width, Cell::Absent);
        }

        self.rows.reserve(result.rows.len());
        for values in result.rows {
            let mut row = vec![Cell::Absent; width];
            for (&pos, value) in positions.iter().zip(values) {
                row[pos] = Cell::Present(value);
            }
            self.rows.push(row);
        }
    }
}

/// Renames repeats of a column name (compared case-insensitively) to the
/// first free `name_N`, N starting at 2.
fn distinct_columns(columns: &[String]) -> Vec<String> {
    let taken: HashSet<String> = columns.iter().map(|c| c.to_lowercase()).collect();
    let mut used = HashSet::with_capacity(columns.len());

    columns
        .iter()
        .map(|column| {
            if used.insert(column.to_lowercase()) {
                return column.clone();
            }
            let renamed = (2..)
                .map(|n| format!("{column}_{n}"))
                .find(|candidate| {
                    let key = candidate.to_lowercase();
                    !taken.contains(&key) && !used.contains(&key)
                })
                .unwrap_or_else(|| column.clone());
            used.insert(renamed.to_lowercase());
            tracing::warn!(column = %column, renamed = %renamed, "Repeated column renamed");
            renamed
        })
        .collect()
}

/// Named tables, looked up case-insensitively, iterated in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamedTables {
    entries: Vec<(String, Table)>,
}

impl NamedTables {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a set holding a single table.
    #[must_use]
    pub fn single(name: impl Into<String>, table: Table) -> Self {
        let mut tables = Self::new();
        tables.insert(name, table);
        tables
    }

    /// Looks a table up by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Table> {
        self.entries
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, t)| t)
    }

    /// Returns a mutable table, creating it empty if missing.
    pub fn entry(&mut self, name: &str) -> &mut Table {
        let pos = match self
            .entries
            .iter()
            .position(|(n, _)| n.eq_ignore_ascii_case(name))
        {
            Some(pos) => pos,
            None => {
                self.entries.push((name.to_string(), Table::new()));
                self.entries.len() - 1
            }
        };
        &mut self.entries[pos].1
    }

    /// Inserts or replaces a table.
    pub fn insert(&mut self, name: impl Into<String>, table: Table) {
        let name = name.into();
        *self.entry(&name) = table;
    }

    /// Number of tables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no tables.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates `(name, table)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Table)> {
        self.entries.iter().map(|(n, t)| (n.as_str(), t))
    }
}
