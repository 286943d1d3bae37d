pub const XLSX_MIME_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const XLS_MIME_TYPE: &str = "application/vnd.ms-excel";
pub const PDF_MIME_TYPE: &str = "application/pdf";
pub const PLAIN_TEXT_MIME_TYPE: &str = "text/plain";
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// Coarse classification of an upload, decided from its declared MIME type only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Spreadsheet,
    Pdf,
    Image,
    Other,
}

impl DocumentKind {
    pub fn from_mime_type(mime_type: &str) -> Self {
        match mime_type {
            XLSX_MIME_TYPE | XLS_MIME_TYPE => DocumentKind::Spreadsheet,
            PDF_MIME_TYPE => DocumentKind::Pdf,
            m if m.starts_with("image/") => DocumentKind::Image,
            _ => DocumentKind::Other,
        }
    }

    pub fn needs_conversion(&self) -> bool {
        matches!(self, DocumentKind::Spreadsheet)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Spreadsheet => "spreadsheet",
            DocumentKind::Pdf => "pdf",
            DocumentKind::Image => "image",
            DocumentKind::Other => "other",
        }
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spreadsheet_detection() {
        assert_eq!(
            DocumentKind::from_mime_type(XLSX_MIME_TYPE),
            DocumentKind::Spreadsheet
        );
        assert_eq!(
            DocumentKind::from_mime_type(XLS_MIME_TYPE),
            DocumentKind::Spreadsheet
        );
        assert!(DocumentKind::from_mime_type(XLS_MIME_TYPE).needs_conversion());
    }

    #[test]
    fn test_pass_through_kinds() {
        assert_eq!(DocumentKind::from_mime_type("application/pdf"), DocumentKind::Pdf);
        assert_eq!(DocumentKind::from_mime_type("image/png"), DocumentKind::Image);
        assert_eq!(DocumentKind::from_mime_type("text/csv"), DocumentKind::Other);

        assert!(!DocumentKind::Pdf.needs_conversion());
        assert!(!DocumentKind::Image.needs_conversion());
        assert!(!DocumentKind::Other.needs_conversion());
    }

    #[test]
    fn test_detection_is_exact_match() {
        assert_eq!(
            DocumentKind::from_mime_type("application/vnd.ms-excel.sheet.macroEnabled.12"),
            DocumentKind::Other
        );
    }
}
