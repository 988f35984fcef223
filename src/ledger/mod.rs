//! Spreadsheet ledger of submitted expenses.
//!
//! The ledger is a single `.xlsx` sheet that is read whole, extended by one row,
//! and written back on every append. `calamine` reads it, `rust_xlsxwriter`
//! writes it.

mod table;

pub use table::{compute_column_widths, record_to_row, Cell, Table, COLUMN_PADDING};

use std::path::{Path, PathBuf};

use calamine::{open_workbook, Data, Reader, Xlsx};
use rust_xlsxwriter::{Format, Workbook};
use thiserror::Error;

use crate::models::{ExpenseRecord, LEDGER_COLUMNS};

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("failed to read ledger: {0}")]
    Read(#[from] calamine::XlsxError),
    #[error("failed to write ledger: {0}")]
    Write(#[from] rust_xlsxwriter::XlsxError),
    #[error("ledger has no worksheet")]
    MissingSheet,
    #[error("ledger header does not match the expected columns: {0:?}")]
    SchemaMismatch(Vec<String>),
}

/// Append-only spreadsheet store.
#[derive(Debug, Clone)]
pub struct LedgerStore {
    path: PathBuf,
}

impl LedgerStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the ledger with its header row if the file is missing.
    ///
    /// Returns `true` when a new file was written.
    pub fn ensure_exists(&self) -> Result<bool, LedgerError> {
        if self.path.exists() {
            return Ok(false);
        }
        write_table(&self.path, &Table::empty(), None)?;
        log::info!("Created ledger at {}", self.path.display());
        Ok(true)
    }

    /// Read the whole sheet into memory.
    pub fn read_table(&self) -> Result<Table, LedgerError> {
        read_table(&self.path)
    }

    /// Add `record` as the last row, rewrite the file and re-size its columns.
    pub fn append(&self, record: &ExpenseRecord) -> Result<(), LedgerError> {
        let mut table = self.read_table()?;
        if table.header.iter().map(String::as_str).ne(LEDGER_COLUMNS.iter().copied()) {
            return Err(LedgerError::SchemaMismatch(table.header));
        }
        table.push_record(record);
        write_table(&self.path, &table, None)?;
        log::info!(
            "Appended ledger row {} for {} ({})",
            table.len(),
            record.driver,
            record.date
        );

        autosize_columns(&self.path)?;
        Ok(())
    }
}

/// Re-apply display widths to every column of the sheet at `path`.
///
/// Cell values are written back unchanged; only column metadata differs.
pub fn autosize_columns(path: &Path) -> Result<Vec<f64>, LedgerError> {
    let table = read_table(path)?;
    let widths = compute_column_widths(&table);
    log::debug!("Column widths for {}: {:?}", path.display(), widths);
    write_table(path, &table, Some(&widths))?;
    Ok(widths)
}

fn read_table(path: &Path) -> Result<Table, LedgerError> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(LedgerError::MissingSheet)??;

    let mut rows = range.rows();
    let header = match rows.next() {
        Some(cells) => cells
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>(),
        None => return Ok(Table::empty()),
    };
    let rows = rows
        .map(|cells| cells.iter().map(to_cell).collect())
        .collect();

    Ok(Table { header, rows })
}

fn to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Int(i) => Cell::Int(*i),
        Data::Float(f) => Cell::Float(*f),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(dt) => Cell::DateTime(dt.as_f64()),
        Data::Error(e) => Cell::Error(e.to_string()),
        other => Cell::Text(other.to_string()),
    }
}

const DATE_NUM_FORMAT: &str = "dd/mm/yyyy";
const DATETIME_NUM_FORMAT: &str = "dd/mm/yyyy hh:mm:ss";

fn write_table(path: &Path, table: &Table, widths: Option<&[f64]>) -> Result<(), LedgerError> {
    let date_format = Format::new().set_num_format(DATE_NUM_FORMAT);
    let datetime_format = Format::new().set_num_format(DATETIME_NUM_FORMAT);
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    for (col, name) in table.header.iter().enumerate() {
        worksheet.write_string(0, col as u16, name)?;
    }

    for (idx, row) in table.rows.iter().enumerate() {
        let r = (idx + 1) as u32;
        for (col, cell) in row.iter().enumerate() {
            let c = col as u16;
            match cell {
                Cell::Empty => {}
                Cell::Text(s) => {
                    worksheet.write_string(r, c, s)?;
                }
                Cell::Int(i) => {
                    worksheet.write_number(r, c, *i as f64)?;
                }
                Cell::Float(f) => {
                    worksheet.write_number(r, c, *f)?;
                }
                Cell::Bool(b) => {
                    worksheet.write_boolean(r, c, *b)?;
                }
                Cell::DateTime(serial) => {
                    let format = if serial.fract() == 0.0 {
                        &date_format
                    } else {
                        &datetime_format
                    };
                    worksheet.write_number_with_format(r, c, *serial, format)?;
                }
                // The writer has no literal error cells; keep the error text.
                Cell::Error(e) => {
                    worksheet.write_string(r, c, e)?;
                }
            }
        }
    }

    if let Some(widths) = widths {
        for (col, width) in widths.iter().enumerate() {
            worksheet.set_column_width(col as u16, *width)?;
        }
    }

    workbook.save(path)?;
    Ok(())
}
