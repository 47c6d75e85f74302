//! field definitions and option normalization

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;

/// input types a field can render as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldType {
    Text,
    Email,
    Number,
    Tel,
    Url,
    Password,
    Textarea,
    Select,
    Radio,
    Checkbox,
    Date,
    Time,
    DatetimeLocal,
    File,
    Range,
    Color,
}

impl FieldType {
    pub const ALL: [FieldType; 16] = [
        FieldType::Text,
        FieldType::Email,
        FieldType::Number,
        FieldType::Tel,
        FieldType::Url,
        FieldType::Password,
        FieldType::Textarea,
        FieldType::Select,
        FieldType::Radio,
        FieldType::Checkbox,
        FieldType::Date,
        FieldType::Time,
        FieldType::DatetimeLocal,
        FieldType::File,
        FieldType::Range,
        FieldType::Color,
    ];

    /// wire name, e.g. "datetime-local"
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Email => "email",
            FieldType::Number => "number",
            FieldType::Tel => "tel",
            FieldType::Url => "url",
            FieldType::Password => "password",
            FieldType::Textarea => "textarea",
            FieldType::Select => "select",
            FieldType::Radio => "radio",
            FieldType::Checkbox => "checkbox",
            FieldType::Date => "date",
            FieldType::Time => "time",
            FieldType::DatetimeLocal => "datetime-local",
            FieldType::File => "file",
            FieldType::Range => "range",
            FieldType::Color => "color",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.as_str() == s)
    }

    /// whether the type carries a list of options
    pub fn has_options(&self) -> bool {
        matches!(
            self,
            FieldType::Select | FieldType::Radio | FieldType::Checkbox
        )
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// one input of a form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub id: String,
    #[serde(default)]
    pub label: String,
    pub field_type: FieldType,
    /// requiredness before any rule applies
    #[serde(default)]
    pub is_required: bool,
    #[serde(default, deserialize_with = "deserialize_options")]
    pub options: Vec<String>,
    #[serde(default)]
    pub display_order: u32,
}

impl Field {
    pub fn new(id: impl Into<String>, label: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            field_type,
            is_required: false,
            options: Vec::new(),
            display_order: 0,
        }
    }

    pub fn required(mut self, required: bool) -> Self {
        self.is_required = required;
        self
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }
}

/// normalize stored options into a list of strings
///
/// options are stored either as a JSON array or as a string holding an
/// encoded array. anything unreadable becomes an empty list.
pub fn normalize_options(raw: &JsonValue) -> Vec<String> {
    match raw {
        JsonValue::Array(items) => items.iter().filter_map(option_text).collect(),
        JsonValue::String(encoded) => match serde_json::from_str::<JsonValue>(encoded) {
            Ok(JsonValue::Array(items)) => items.iter().filter_map(option_text).collect(),
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

fn option_text(item: &JsonValue) -> Option<String> {
    match item {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn deserialize_options<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<JsonValue>::deserialize(deserializer)?;
    Ok(raw.as_ref().map(normalize_options).unwrap_or_default())
}
