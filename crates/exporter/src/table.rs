use crate::error::ExportError;
use analytics::DatedColumn;
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// A date-indexed table with one column per instrument.
///
/// Rows cover the union of every column's dates. A cell is empty when its
/// instrument has no observation on that date or the value is undefined.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WideTable {
    columns: Vec<String>,
    rows: BTreeMap<NaiveDate, Vec<Option<f64>>>,
}

impl WideTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_columns<C: DatedColumn>(columns: &[&C]) -> Self {
        let mut table = Self::new();
        for column in columns {
            table.push_column(*column);
        }
        table
    }

    pub fn push_column<C: DatedColumn + ?Sized>(&mut self, column: &C) {
        let idx = self.columns.len();
        self.columns.push(column.column_name().to_string());

        for row in self.rows.values_mut() {
            row.push(None);
        }

        let width = self.columns.len();
        for (date, value) in column.column() {
            let row = self.rows.entry(date).or_insert_with(|| vec![None; width]);
            row[idx] = value;
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn get(&self, date: NaiveDate, column: &str) -> Option<f64> {
        let idx = self.columns.iter().position(|c| c == column)?;
        self.rows.get(&date).and_then(|row| row[idx])
    }

    /// Writes `Date,<column>...` followed by one row per date, values to 4 decimals.
    pub fn to_csv(&self) -> Result<String, ExportError> {
        let mut wtr = csv::Writer::from_writer(Vec::new());

        let mut header = Vec::with_capacity(self.columns.len() + 1);
        header.push("Date");
        header.extend(self.columns.iter().map(String::as_str));
        wtr.write_record(&header)?;

        for (date, values) in &self.rows {
            let mut record = Vec::with_capacity(values.len() + 1);
            record.push(date.format("%Y-%m-%d").to_string());
            record.extend(
                values
                    .iter()
                    .map(|v| v.map(|v| format!("{:.4}", v)).unwrap_or_default()),
            );
            wtr.write_record(&record)?;
        }

        let bytes = wtr
            .into_inner()
            .map_err(|e| ExportError::IntoInner(e.to_string()))?;
        Ok(String::from_utf8(bytes)?)
    }
}
