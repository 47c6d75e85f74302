//! a complete form and its evaluation entry points

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::field::{Field, FieldType};
use super::values::{FormValue, FormValues};
use super::FormError;
use crate::conditions::{deserialize_conditions, resolve_field_state, Condition, FieldState};

/// fields plus their rules, as stored
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormDefinition {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub fields: Vec<Field>,
    /// order is significant: later firing rules override earlier ones
    #[serde(default, deserialize_with = "deserialize_conditions")]
    pub conditions: Vec<Condition>,
}

/// a field together with its resolved state
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedField {
    pub id: String,
    pub label: String,
    pub field_type: FieldType,
    #[serde(flatten)]
    pub state: FieldState,
}

/// a visible, required field left empty at submission
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissingField {
    pub id: String,
    pub label: String,
}

/// outcome of submission-time validation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmissionReport {
    /// ids that were checked: visible and required after rules
    pub checked: Vec<String>,
    pub missing: Vec<MissingField>,
}

impl SubmissionReport {
    pub fn is_valid(&self) -> bool {
        self.missing.is_empty()
    }
}

impl FormDefinition {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn field(&self, id: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.id == id)
    }

    /// fields sorted by display order; ties keep stored order
    pub fn ordered_fields(&self) -> Vec<&Field> {
        let mut fields: Vec<&Field> = self.fields.iter().collect();
        fields.sort_by_key(|f| f.display_order);
        fields
    }

    /// resolve a single field; unknown ids resolve to the defaults
    pub fn resolve(&self, field_id: &str, values: &FormValues) -> FieldState {
        let base_required = self.field(field_id).is_some_and(|f| f.is_required);
        resolve_field_state(field_id, &self.conditions, values, base_required)
    }

    /// resolve every field, in display order
    ///
    /// all fields are recomputed on each call: one value can drive many
    /// targets, and hidden fields still act as sources.
    pub fn resolve_all(&self, values: &FormValues) -> Vec<ResolvedField> {
        self.ordered_fields()
            .into_iter()
            .map(|f| ResolvedField {
                id: f.id.clone(),
                label: f.label.clone(),
                field_type: f.field_type,
                state: resolve_field_state(&f.id, &self.conditions, values, f.is_required),
            })
            .collect()
    }

    /// ids that submission must check: visible and required after rules
    pub fn required_fields(&self, values: &FormValues) -> Vec<String> {
        self.resolve_all(values)
            .into_iter()
            .filter(|r| r.state.must_validate())
            .map(|r| r.id)
            .collect()
    }

    /// check a submission; hidden fields never block
    pub fn validate_submission(&self, values: &FormValues) -> SubmissionReport {
        let resolved = self.resolve_all(values);

        let mut checked = Vec::new();
        let mut missing = Vec::new();

        for r in resolved.into_iter().filter(|r| r.state.must_validate()) {
            if values.get(&r.id).map_or(true, FormValue::is_empty) {
                missing.push(MissingField {
                    id: r.id.clone(),
                    label: r.label.clone(),
                });
            }
            checked.push(r.id);
        }

        SubmissionReport { checked, missing }
    }
}

/// load a form definition from a JSON or JSON5 file
pub fn load_form(path: &Path) -> Result<FormDefinition, FormError> {
    read_json5(path)
}

/// load runtime values from a JSON or JSON5 file
pub fn load_values(path: &Path) -> Result<FormValues, FormError> {
    read_json5(path)
}

fn read_json5<T: DeserializeOwned>(path: &Path) -> Result<T, FormError> {
    let content = fs::read_to_string(path).map_err(|source| FormError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    json5::from_str(&content).map_err(|e| FormError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// write a form definition as pretty JSON
pub fn save_form(path: &Path, form: &FormDefinition) -> Result<(), FormError> {
    let content = serde_json::to_string_pretty(form)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| FormError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    fs::write(path, content + "\n").map_err(|source| FormError::Write {
        path: path.to_path_buf(),
        source,
    })
}
