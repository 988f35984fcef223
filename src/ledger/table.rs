//! In-memory view of the ledger sheet and the column width rule.

use chrono::{Duration, NaiveDate};

use crate::models::{ExpenseRecord, LEDGER_COLUMNS};

/// Extra characters added to the widest value of every column.
pub const COLUMN_PADDING: usize = 2;

/// A single spreadsheet cell as read back from disk.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    /// Date or date-time stored as a spreadsheet serial number.
    DateTime(f64),
    /// Spreadsheet error value such as `#DIV/0!`.
    Error(String),
}

impl Cell {
    /// Text form of the cell, or `None` when the value has no text form.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Cell::Empty => Some(String::new()),
            Cell::Text(s) => Some(s.clone()),
            Cell::Int(i) => Some(i.to_string()),
            Cell::Float(f) if !f.is_finite() => None,
            // Whole numbers come back from the writer as floats.
            Cell::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => Some((*f as i64).to_string()),
            Cell::Float(f) => Some(f.to_string()),
            Cell::Bool(b) => Some(if *b { "TRUE" } else { "FALSE" }.to_string()),
            Cell::DateTime(serial) => serial_to_text(*serial),
            Cell::Error(_) => None,
        }
    }
}

/// Serial day 0 of the 1900 date system.
fn serial_epoch() -> Option<chrono::NaiveDateTime> {
    NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)
}

fn serial_to_text(serial: f64) -> Option<String> {
    if !serial.is_finite() {
        return None;
    }
    let millis = (serial * 86_400_000.0).round() as i64;
    let value = serial_epoch()?.checked_add_signed(Duration::try_milliseconds(millis)?)?;
    let format = if serial.fract() == 0.0 {
        "%d/%m/%Y"
    } else {
        "%d/%m/%Y %H:%M:%S"
    };
    Some(value.format(format).to_string())
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Table with the ledger header and no data rows.
    pub fn empty() -> Self {
        Self {
            header: LEDGER_COLUMNS.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push_record(&mut self, record: &ExpenseRecord) {
        self.rows.push(record_to_row(record));
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of columns spanned by the header or the widest row.
    pub fn column_count(&self) -> usize {
        self.rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.header.len()))
            .max()
            .unwrap_or(0)
    }
}

pub fn record_to_row(record: &ExpenseRecord) -> Vec<Cell> {
    vec![
        Cell::Text(record.driver.clone()),
        Cell::Text(record.date.clone()),
        Cell::Int(record.amount as i64),
        Cell::Text(record.description.clone()),
        Cell::Text(record.receipt_link.clone()),
    ]
}

/// Display width of every column: the longest text among the header and the
/// cells of that column, plus [`COLUMN_PADDING`].
///
/// Cells without a text form are skipped.
pub fn compute_column_widths(table: &Table) -> Vec<f64> {
    (0..table.column_count())
        .map(|col| {
            let header_len = table.header.get(col).map_or(0, |h| h.chars().count());
            let cells_len = table
                .rows
                .iter()
                .filter_map(|row| row.get(col))
                .filter_map(|cell| match cell.as_text() {
                    Some(text) => Some(text.chars().count()),
                    None => {
                        log::warn!("Skipping cell without text form in column {}", col);
                        None
                    }
                })
                .max()
                .unwrap_or(0);
            (header_len.max(cells_len) + COLUMN_PADDING) as f64
        })
        .collect()
}
