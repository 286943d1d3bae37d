use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Number, Value};

/// Invoice-like record extracted by the model.
///
/// Every field is optional on the way in: the model is instructed to fill all
/// of them but is not trusted to. Absent fields are left out of the response.
/// Numeric fields accept JSON numbers or numeric strings; anything else is a
/// schema violation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ExtractionResult {
    #[serde(default, deserialize_with = "text_field", skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    #[serde(default, deserialize_with = "text_field", skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(default, deserialize_with = "text_field", skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, deserialize_with = "text_field", skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    #[serde(default, deserialize_with = "number_field", skip_serializing_if = "Option::is_none")]
    pub quantity: Option<Number>,
    #[serde(default, deserialize_with = "number_field", skip_serializing_if = "Option::is_none")]
    pub tax: Option<Number>,
    #[serde(default, deserialize_with = "number_field", skip_serializing_if = "Option::is_none")]
    pub total_amount: Option<Number>,
    #[serde(default, deserialize_with = "text_field", skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "number_field", skip_serializing_if = "Option::is_none")]
    pub amount_payable: Option<Number>,
    #[serde(default, deserialize_with = "number_field", skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<Number>,
    #[serde(default, deserialize_with = "text_field", skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "text_field", skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
}

/// The model is asked for an array but sometimes answers with a bare object.
/// Both shapes are kept as returned.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ExtractionOutput {
    Single(ExtractionResult),
    Many(Vec<ExtractionResult>),
}

impl ExtractionOutput {
    pub fn from_value(value: Value) -> Result<Self, String> {
        match value {
            Value::Object(_) => serde_json::from_value::<ExtractionResult>(value)
                .map(ExtractionOutput::Single)
                .map_err(|e| format!("Invalid extraction result: {}", e)),
            Value::Array(items) => items
                .into_iter()
                .enumerate()
                .map(|(index, item)| {
                    if !item.is_object() {
                        return Err(format!(
                            "Invalid extraction result at index {}: expected an object",
                            index
                        ));
                    }
                    serde_json::from_value::<ExtractionResult>(item).map_err(|e| {
                        format!("Invalid extraction result at index {}: {}", index, e)
                    })
                })
                .collect::<Result<Vec<_>, _>>()
                .map(ExtractionOutput::Many),
            other => Err(format!(
                "Expected a JSON object or array of objects, found {}",
                value_kind(&other)
            )),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ExtractionOutput::Single(_) => 1,
            ExtractionOutput::Many(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn text_field<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(D::Error::custom(format!(
            "expected a string, found {}",
            value_kind(&other)
        ))),
    }
}

fn number_field<'de, D>(deserializer: D) -> Result<Option<Number>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => Ok(Some(n)),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            trimmed
                .parse::<Number>()
                .map(Some)
                .map_err(|_| D::Error::custom(format!("expected a number, found \"{}\"", s)))
        }
        Some(other) => Err(D::Error::custom(format!(
            "expected a number, found {}",
            value_kind(&other)
        ))),
    }
}
