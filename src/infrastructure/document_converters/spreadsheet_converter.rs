use calamine::{Data, Reader};
use std::io::Cursor;
use std::path::Path;

use crate::application::ports::spreadsheet_converter::{
    SpreadsheetConversionError, SpreadsheetConverter,
};

/// Reads xlsx/xls (and anything else calamine can sniff) and renders the
/// first sheet as text. Later sheets are ignored.
#[derive(Debug, Default, Clone)]
pub struct CalamineSpreadsheetConverter;

impl CalamineSpreadsheetConverter {
    pub fn new() -> Self {
        Self
    }

    pub fn convert_bytes(&self, data: Vec<u8>) -> Result<String, SpreadsheetConversionError> {
        let mut workbook = calamine::open_workbook_auto_from_rs(Cursor::new(data))
            .map_err(|e| SpreadsheetConversionError::ConversionFailure(e.to_string()))?;

        let range = workbook
            .worksheet_range_at(0)
            .ok_or(SpreadsheetConversionError::NoSheetsFound)?
            .map_err(|e| SpreadsheetConversionError::ConversionFailure(e.to_string()))?;

        // Rows span the full range width; a row ends at its last filled cell.
        let rows: Vec<Vec<String>> = range
            .rows()
            .map(|row| {
                let filled = row
                    .iter()
                    .rposition(|cell| !matches!(cell, Data::Empty))
                    .map_or(0, |last| last + 1);
                row[..filled].iter().map(cell_to_string).collect()
            })
            .collect();

        Ok(rows_to_text(&rows))
    }
}

impl SpreadsheetConverter for CalamineSpreadsheetConverter {
    fn convert_to_text(&self, path: &Path) -> Result<String, SpreadsheetConversionError> {
        let data = std::fs::read(path)
            .map_err(|e| SpreadsheetConversionError::ConversionFailure(e.to_string()))?;
        self.convert_bytes(data)
    }
}

pub fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt.to_string(),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Cells joined by tabs, rows by newlines. No rows gives an empty string.
pub fn rows_to_text<R: AsRef<[String]>>(rows: &[R]) -> String {
    rows.iter()
        .map(|row| row.as_ref().join("\t"))
        .collect::<Vec<_>>()
        .join("\n")
}
