//! Loosely typed cell values as they come out of a sheet export

use uuid::Uuid;

/// One cell of an import sheet.
///
/// Excel cells keep their native type; CSV cells arrive as text and are
/// converted on access, which matches how the export writes them.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Empty cell (also used for blank strings)
    Null,
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl CellValue {
    /// Build from raw text, mapping blank to [`CellValue::Null`]
    pub fn from_text(text: &str) -> Self {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            CellValue::Null
        } else {
            CellValue::String(trimmed.to_string())
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// The cell rendered as attribute text; empty string for an empty cell
    pub fn to_text(&self) -> String {
        match self {
            CellValue::Null => String::new(),
            CellValue::String(s) => s.clone(),
            CellValue::Int(i) => i.to_string(),
            CellValue::Float(f) => f.to_string(),
            CellValue::Bool(b) => b.to_string(),
        }
    }

    /// Strict boolean conversion: a native boolean cell or the literal
    /// texts `true`/`false`
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            CellValue::Bool(b) => Some(*b),
            CellValue::String(s) => match s.trim().to_lowercase().as_str() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match self {
            CellValue::Int(i) => Some(*i as f32),
            CellValue::Float(f) => Some(*f as f32),
            CellValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_guid(&self) -> Option<Uuid> {
        match self {
            CellValue::String(s) => Uuid::parse_str(s.trim()).ok(),
            _ => None,
        }
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellValue::Null => write!(f, "(empty)"),
            other => write!(f, "{}", other.to_text()),
        }
    }
}
