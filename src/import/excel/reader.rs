//! Read an import sheet from disk
//!
//! Supports `.xlsx`/`.xls` via calamine and `.csv` via the csv crate.
//! The whole sheet is read into memory up front so parse failures surface
//! before any remote call is made.

use std::path::Path;

use calamine::{open_workbook, Data, Range, Reader, Xls, Xlsx};
use csv::ReaderBuilder;
use indexmap::IndexMap;

use super::value::CellValue;
use crate::import::ImportError;

/// An import sheet: the header row as a column→ordinal mapping plus all
/// data rows in sheet order
#[derive(Debug, Clone, Default)]
pub struct SheetData {
    /// Header text → zero-based column ordinal, in sheet order
    pub columns: IndexMap<String, usize>,
    /// Data rows; cells are addressed by column ordinal
    pub rows: Vec<Vec<CellValue>>,
}

impl SheetData {
    /// Ordinal of a named column
    pub fn column(&self, name: &str) -> Option<usize> {
        self.columns.get(name).copied()
    }
}

/// Read the first worksheet (or the CSV) at `path`, dispatching on the
/// file extension
pub fn read_sheet(path: &Path) -> Result<SheetData, ImportError> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match extension.as_str() {
        "xlsx" | "xlsm" => {
            let mut workbook: Xlsx<_> = open_workbook(path)
                .map_err(|e: calamine::XlsxError| ImportError::Spreadsheet(e.to_string()))?;
            let sheet_name = first_sheet_name(workbook.sheet_names().to_vec())?;
            let range = workbook
                .worksheet_range(&sheet_name)
                .map_err(|e| ImportError::Spreadsheet(e.to_string()))?;
            range_to_sheet(&range)
        }
        "xls" => {
            let mut workbook: Xls<_> = open_workbook(path)
                .map_err(|e: calamine::XlsError| ImportError::Spreadsheet(e.to_string()))?;
            let sheet_name = first_sheet_name(workbook.sheet_names().to_vec())?;
            let range = workbook
                .worksheet_range(&sheet_name)
                .map_err(|e| ImportError::Spreadsheet(e.to_string()))?;
            range_to_sheet(&range)
        }
        "csv" => read_csv(path),
        other => Err(ImportError::UnsupportedFormat(other.to_string())),
    }
}

fn first_sheet_name(names: Vec<String>) -> Result<String, ImportError> {
    names
        .into_iter()
        .next()
        .ok_or_else(|| ImportError::Spreadsheet("workbook has no worksheets".to_string()))
}

fn range_to_sheet(range: &Range<Data>) -> Result<SheetData, ImportError> {
    let mut rows = range.rows();
    let header_row = rows
        .next()
        .ok_or_else(|| ImportError::Spreadsheet("worksheet has no header row".to_string()))?;

    let columns: IndexMap<String, usize> = header_row
        .iter()
        .enumerate()
        .map(|(ordinal, cell)| (cell.to_string().trim().to_string(), ordinal))
        .filter(|(name, _)| !name.is_empty())
        .collect();

    let mut data_rows = Vec::new();
    for row in rows {
        let cells: Vec<CellValue> = row.iter().map(convert_cell).collect();
        if cells.iter().all(CellValue::is_empty) {
            continue;
        }
        data_rows.push(cells);
    }

    Ok(SheetData {
        columns,
        rows: data_rows,
    })
}

fn convert_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Null,
        Data::String(s) => CellValue::from_text(s),
        Data::Int(i) => CellValue::Int(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => CellValue::from_text(&dt.to_string()),
        Data::DateTimeIso(s) => CellValue::from_text(s),
        Data::DurationIso(s) => CellValue::from_text(s),
        Data::Error(_) => CellValue::Null,
    }
}

fn read_csv(path: &Path) -> Result<SheetData, ImportError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let columns: IndexMap<String, usize> = reader
        .headers()?
        .iter()
        .enumerate()
        .map(|(ordinal, name)| (name.trim().to_string(), ordinal))
        .filter(|(name, _)| !name.is_empty())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let cells: Vec<CellValue> = record.iter().map(CellValue::from_text).collect();
        if cells.iter().all(CellValue::is_empty) {
            continue;
        }
        rows.push(cells);
    }

    Ok(SheetData { columns, rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn missing_file_is_file_not_found() {
        let result = read_sheet(Path::new("does_not_exist.xlsx"));
        assert!(matches!(result, Err(ImportError::FileNotFound(_))));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let file = Builder::new().suffix(".pdf").tempfile().unwrap();
        let result = read_sheet(file.path());
        assert!(matches!(result, Err(ImportError::UnsupportedFormat(ext)) if ext == "pdf"));
    }

    #[test]
    fn csv_yields_headers_and_typed_access() {
        let mut file = Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "PlacementGuid,X,IsSubSymbol").unwrap();
        writeln!(file, "6f9619ff-8b86-d011-b42d-00c04fc964ff,12.5,False").unwrap();
        writeln!(file, ",,").unwrap();

        let sheet = read_sheet(file.path()).unwrap();
        assert_eq!(sheet.column("PlacementGuid"), Some(0));
        assert_eq!(sheet.column("X"), Some(1));
        // the all-empty row is skipped
        assert_eq!(sheet.rows.len(), 1);
        assert_eq!(sheet.rows[0][1].as_f32(), Some(12.5));
        assert_eq!(sheet.rows[0][2].as_bool(), Some(false));
    }
}
