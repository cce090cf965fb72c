use std::path::Path;

use rust_xlsxwriter::{Workbook, XlsxError};

use super::error::DataError;
use super::model::{CellRef, Table};

/// Default download name of the filtered export.
pub const EXPORT_FILE_NAME: &str = "bank_filtered.xlsx";
/// Mime type announced with the export.
pub const EXPORT_MIME: &str = "application/vnd.ms-excel";
pub const SHEET_NAME: &str = "Sheet1";

/// Encode `table` as an xlsx workbook held in memory.
///
/// One sheet, header row of column names, no index column. Numeric columns are
/// written as numbers. A zero-row table produces a header-only sheet.
pub fn to_xlsx(table: &Table) -> Result<Vec<u8>, DataError> {
    let mut workbook = build_workbook(table).map_err(export_error)?;
    workbook.save_to_buffer().map_err(export_error)
}

/// Encode `table` and write it to `path`.
pub fn write_xlsx(table: &Table, path: &Path) -> Result<(), DataError> {
    let bytes = to_xlsx(table)?;
    std::fs::write(path, bytes)
        .map_err(|e| DataError::Export(format!("writing {}: {e}", path.display())))?;
    log::info!("Exported {} rows to {}", table.len(), path.display());
    Ok(())
}

fn build_workbook(table: &Table) -> Result<Workbook, XlsxError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    for (c, column) in table.columns().iter().enumerate() {
        let col = u16::try_from(c).map_err(|_| XlsxError::RowColumnLimitError)?;
        sheet.write_string(0, col, &column.name)?;

        for row in table.index() {
            let r = u32::try_from(row + 1).map_err(|_| XlsxError::RowColumnLimitError)?;
            match column.cell(row) {
                CellRef::Number(v) => sheet.write_number(r, col, v)?,
                CellRef::Text(s) => sheet.write_string(r, col, s)?,
            };
        }
    }
    Ok(workbook)
}

fn export_error(e: XlsxError) -> DataError {
    DataError::Export(e.to_string())
}
