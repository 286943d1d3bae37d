use crate::application::ports::generative_model::ContentPart;

/// Field names, in the order the model is asked to produce them.
pub const EXTRACTION_FIELDS: [(&str, &str); 12] = [
    ("SerialNumber", "string"),
    ("CustomerName", "string"),
    ("PhoneNumber", "string"),
    ("ProductName", "string"),
    ("Quantity", "number"),
    ("Tax", "number"),
    ("TotalAmount", "number"),
    ("Date", "string"),
    ("AmountPayable", "number"),
    ("UnitPrice", "number"),
    ("Email", "string"),
    ("CompanyName", "string"),
];

pub fn extraction_instruction() -> String {
    let fields = EXTRACTION_FIELDS
        .iter()
        .map(|(name, kind)| format!("          \"{}\": \"{}\"", name, kind))
        .collect::<Vec<_>>()
        .join(",\n");

    format!(
        "Please summarize this document as a JSON object with the following fields and send it as an array:\n        {{\n{}\n        }}",
        fields
    )
}

/// File reference first, instruction second.
pub fn build_request_parts(mime_type: &str, file_uri: &str) -> Vec<ContentPart> {
    vec![
        ContentPart::FileData {
            mime_type: mime_type.to_string(),
            file_uri: file_uri.to_string(),
        },
        ContentPart::Text(extraction_instruction()),
    ]
}
