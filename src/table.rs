// 📄 Spreadsheet Table - named columns, string cells
// Orders, purchases and stock sheets exported as CSV

use crate::aliases::fold_diacritics;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    #[error("column not found: {0}")]
    MissingColumn(String),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Table { headers, rows }
    }

    pub fn from_path(csv_path: &Path) -> Result<Self> {
        let file = std::fs::File::open(csv_path)
            .with_context(|| format!("Failed to open CSV file: {:?}", csv_path))?;
        let table = Self::from_reader(file)?;

        tracing::info!(rows = table.len(), path = ?csv_path, "loaded table");
        Ok(table)
    }

    /// Rows may be shorter or longer than the header (hand-edited sheets)
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

        let headers = rdr
            .headers()
            .context("Failed to read CSV header")?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for result in rdr.records() {
            let record = result.context("Failed to read CSV record")?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        Ok(Table { headers, rows })
    }

    /// Header lookup ignoring case and accents ("distancia" finds "Distância")
    pub fn column(&self, name: &str) -> Result<usize, TableError> {
        let key = |s: &str| fold_diacritics(&s.trim().to_lowercase());
        let wanted = key(name);
        self.headers
            .iter()
            .position(|h| key(h.as_str()) == wanted)
            .ok_or_else(|| TableError::MissingColumn(name.to_string()))
    }

    /// Missing cells read as ""
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn column_values(&self, name: &str) -> Result<Vec<&str>, TableError> {
        let col = self.column(name)?;
        Ok((0..self.rows.len()).map(|row| self.cell(row, col)).collect())
    }

    /// Rows whose date cell falls within `[from, to]`. Unparseable dates are skipped.
    pub fn rows_between(&self, date_column: &str, from: NaiveDate, to: NaiveDate) -> Result<Table, TableError> {
        let col = self.column(date_column)?;
        let rows = self
            .rows
            .iter()
            .enumerate()
            .filter(|(i, _)| {
                parse_date(self.cell(*i, col))
                    .map(|d| d >= from && d <= to)
                    .unwrap_or(false)
            })
            .map(|(_, row)| row.clone())
            .collect();

        Ok(Table {
            headers: self.headers.clone(),
            rows,
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Parse "19/10/2026", "19/10/26" or "2026-10-19"
pub fn parse_date(cell: &str) -> Option<NaiveDate> {
    let cell = cell.trim();
    // Sheets often carry a time after the date
    let date_part = cell.split_whitespace().next()?;

    if date_part.contains('-') {
        return NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok();
    }

    let year_len = date_part.rsplit('/').next().map(str::len).unwrap_or(0);
    let format = if year_len == 2 { "%d/%m/%y" } else { "%d/%m/%Y" };
    NaiveDate::parse_from_str(date_part, format).ok()
}
