pub mod spreadsheet_converter;

pub use spreadsheet_converter::CalamineSpreadsheetConverter;
