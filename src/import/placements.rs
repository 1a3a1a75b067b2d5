//! Typed extraction of import rows
//!
//! Every row is converted eagerly, before any grouping or remote call, so
//! a malformed sheet fails the run without side effects.

use uuid::Uuid;

use super::attributes::{assemble_row, AttributeImport};
use super::excel::{CellValue, SheetData};
use super::schema::KeySchema;
use super::ImportError;

/// Placement kind tag used by the element-list export for plain symbol
/// references
pub const SYMBOL_REFERENCE_TYPE: &str = "SymbolReference";

/// Fixed columns every element-list export carries
mod columns {
    pub const PLACEMENT_GUID: &str = "PlacementGuid";
    pub const PLACEMENT_TYPE: &str = "Placement type";
    pub const FULL_IDENTIFYING_VALUE: &str = "Full identifying value";
    pub const X: &str = "X";
    pub const Y: &str = "Y";
    pub const Z: &str = "Z";
    pub const ROTATION_Z: &str = "Rotation Z";
    pub const SYMBOL_PATH: &str = "Symbol path";
    pub const MACRO_PATH: &str = "Macro path";
    pub const MACRO_REFERENCE_GUID: &str = "Macro reference guid";
    pub const IS_SUB_SYMBOL: &str = "IsSubSymbol";
    pub const IS_CONNECTION_SYMBOL: &str = "IsConnectionSymbol";

    pub const REQUIRED: &[&str] = &[
        PLACEMENT_GUID,
        PLACEMENT_TYPE,
        FULL_IDENTIFYING_VALUE,
        X,
        Y,
        Z,
        ROTATION_Z,
        SYMBOL_PATH,
        MACRO_PATH,
        MACRO_REFERENCE_GUID,
        IS_SUB_SYMBOL,
        IS_CONNECTION_SYMBOL,
    ];
}

/// One spreadsheet row after typed extraction, immutable from here on
#[derive(Debug, Clone)]
pub struct ImportPlacement {
    pub placement_guid: Uuid,
    pub placement_type: String,
    pub full_identifying_value: String,
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub rotation_z: f32,
    pub symbol_path: String,
    pub macro_path: String,
    /// Rows sharing this id belong to one macro instance
    pub macro_reference_guid: Option<Uuid>,
    pub is_sub_symbol: bool,
    pub is_connection_symbol: bool,
    pub attributes: AttributeImport,
}

impl std::fmt::Display for ImportPlacement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} - {} - {} - {} - {}",
            self.placement_guid,
            self.full_identifying_value,
            self.placement_type,
            self.macro_path,
            self.symbol_path
        )
    }
}

/// Convert every data row of the sheet into an [`ImportPlacement`]
pub fn extract_placements(
    sheet: &SheetData,
    schema: &KeySchema,
    data_language: &str,
) -> Result<Vec<ImportPlacement>, ImportError> {
    for &column in columns::REQUIRED {
        if sheet.column(column).is_none() {
            return Err(ImportError::MissingColumn(column.to_string()));
        }
    }

    sheet
        .rows
        .iter()
        .enumerate()
        .map(|(index, cells)| {
            // 1-based sheet row, header is row 1
            let row = RowReader {
                sheet,
                cells,
                sheet_row: index + 2,
            };
            Ok(ImportPlacement {
                placement_guid: row.guid(columns::PLACEMENT_GUID)?,
                placement_type: row.text(columns::PLACEMENT_TYPE),
                full_identifying_value: row.text(columns::FULL_IDENTIFYING_VALUE),
                x: row.float(columns::X)?,
                y: row.float(columns::Y)?,
                z: row.float(columns::Z)?,
                rotation_z: row.float(columns::ROTATION_Z)?,
                symbol_path: row.text(columns::SYMBOL_PATH),
                macro_path: row.text(columns::MACRO_PATH),
                macro_reference_guid: row.optional_guid(columns::MACRO_REFERENCE_GUID)?,
                is_sub_symbol: row.boolean(columns::IS_SUB_SYMBOL)?,
                is_connection_symbol: row.boolean(columns::IS_CONNECTION_SYMBOL)?,
                attributes: assemble_row(cells, schema, data_language, index + 2)?,
            })
        })
        .collect()
}

/// Cell access with row/column context on conversion failures
struct RowReader<'a> {
    sheet: &'a SheetData,
    cells: &'a [CellValue],
    sheet_row: usize,
}

impl RowReader<'_> {
    fn cell(&self, column: &str) -> &CellValue {
        // required columns are validated up front; short rows read as empty
        self.sheet
            .column(column)
            .and_then(|ordinal| self.cells.get(ordinal))
            .unwrap_or(&CellValue::Null)
    }

    fn malformed(&self, column: &str, message: String) -> ImportError {
        ImportError::MalformedCell {
            row: self.sheet_row,
            column: column.to_string(),
            message,
        }
    }

    fn text(&self, column: &str) -> String {
        self.cell(column).to_text()
    }

    fn float(&self, column: &str) -> Result<f32, ImportError> {
        let cell = self.cell(column);
        cell.as_f32()
            .ok_or_else(|| self.malformed(column, format!("expected a number, got '{}'", cell)))
    }

    fn boolean(&self, column: &str) -> Result<bool, ImportError> {
        let cell = self.cell(column);
        cell.as_bool()
            .ok_or_else(|| self.malformed(column, format!("expected a boolean, got '{}'", cell)))
    }

    fn guid(&self, column: &str) -> Result<Uuid, ImportError> {
        let cell = self.cell(column);
        cell.as_guid()
            .ok_or_else(|| self.malformed(column, format!("expected a GUID, got '{}'", cell)))
    }

    fn optional_guid(&self, column: &str) -> Result<Option<Uuid>, ImportError> {
        let cell = self.cell(column);
        if cell.is_empty() {
            return Ok(None);
        }
        self.guid(column).map(Some)
    }
}
