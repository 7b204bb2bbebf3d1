//! Spreadsheet output as CSV.

use bytes::Bytes;
use csv::WriterBuilder;
use folio_core::aggregation::{Cell, NamedTables};
use folio_core::pipeline::OutputError;

/// Writes named tables into one CSV document.
///
/// Layout: a title row, then for each table a row with its name, its header
/// row and its data rows. Absent cells are written empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpreadsheetWriter;

impl SpreadsheetWriter {
    /// Writes the document.
    ///
    /// # Errors
    ///
    /// Returns [`OutputError::Encoding`] if the CSV writer fails.
    pub fn write(tables: &NamedTables, title: &str) -> Result<Bytes, OutputError> {
        let mut writer = WriterBuilder::new().flexible(true).from_writer(Vec::new());

        writer.write_record([title]).map_err(encoding)?;
        for (name, table) in tables.iter() {
            writer.write_record([name]).map_err(encoding)?;
            writer
                .write_record(table.schema().columns())
                .map_err(encoding)?;
            for row in table.rows() {
                writer
                    .write_record(row.iter().map(cell_text))
                    .map_err(encoding)?;
            }
        }

        let data = writer
            .into_inner()
            .map_err(|e| OutputError::Encoding(e.to_string()))?;
        Ok(Bytes::from(data))
    }
}

fn cell_text(cell: &Cell) -> String {
    cell.value().map(ToString::to_string).unwrap_or_default()
}

fn encoding(error: csv::Error) -> OutputError {
    OutputError::Encoding(error.to_string())
}

#[cfg(test)]
mod tests {
    use folio_core::aggregation::{ResultSet, Table};
    use folio_shared::Value;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn test_layout_with_union_backfill() {
        let mut table = Table::new();
        table.merge(ResultSet::with_columns(
            &["account", "amount"],
            vec![vec![Value::Text("A-1".into()), Value::Decimal(dec!(12.50))]],
        ));
        table.merge(ResultSet::with_columns(
            &["account", "note"],
            vec![vec![Value::Text("A, 2".into()), Value::Null]],
        ));

        let bytes = SpreadsheetWriter::write(&NamedTables::single("arrears", table), "Arrears").unwrap();

        assert_eq!(
            String::from_utf8(bytes.to_vec()).unwrap(),
            "Arrears\narrears\naccount,amount,note\nA-1,12.50,\n\"A, 2\",,\n"
        );
    }

    #[test]
    fn test_each_table_gets_its_own_section() {
        let mut tables = NamedTables::new();
        tables.insert(
            "first",
            Table::from_result(ResultSet::with_columns(&["a"], vec![vec![Value::Int32(1)]])),
        );
        tables.insert("second", Table::new());

        let bytes = SpreadsheetWriter::write(&tables, "Two").unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[..4], ["Two", "first", "a", "1"]);
        assert_eq!(lines[4], "second");
    }
}
