//! rule list decoding and rule validation
//!
//! decoding is lenient about individual rules (damaged or non-object entries
//! degrade to non-firing) but rejects a list that is not a list. validation
//! is strict and runs only where rules are entered, never during evaluation.

use serde::{Deserialize, Deserializer};
use serde_json::Value as JsonValue;
use strsim::levenshtein;
use thiserror::Error;
use tracing::debug;

use super::types::{Action, Condition, Operator};
use crate::form::field::Field;

/// max edit distance for "did you mean" suggestions
const SUGGESTION_DISTANCE: usize = 2;

/// error type for decoding rule lists
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
    pub path: String,
}

impl ParseError {
    pub fn new(message: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: path.into(),
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

impl std::error::Error for ParseError {}

/// rule rejected at the point of entry
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuleError {
    #[error("a source field must be selected")]
    MissingSource,
    #[error("a target field must be selected")]
    MissingTarget,
    #[error("field '{0}' cannot be both source and target of a rule")]
    SelfReference(String),
    #[error("unknown field '{id}'")]
    UnknownField { id: String, suggestions: Vec<String> },
    #[error("unknown operator '{0}'")]
    UnknownOperator(String),
    #[error("unknown action '{0}': use show, hide, require, or optional")]
    UnknownAction(String),
    #[error("operator '{0}' needs a comparison value")]
    MissingOperand(String),
    #[error("no rule with id '{0}'")]
    NotFound(String),
}

impl RuleError {
    pub fn suggestions(&self) -> &[String] {
        match self {
            RuleError::UnknownField { suggestions, .. } => suggestions,
            _ => &[],
        }
    }
}

/// decode a rule list, preserving declaration order
///
/// accepts a JSON array, a string holding an encoded array, or null.
pub fn parse_conditions(json: &JsonValue) -> Result<Vec<Condition>, ParseError> {
    match json {
        JsonValue::Null => Ok(Vec::new()),
        JsonValue::Array(items) => parse_items(items),
        JsonValue::String(encoded) => match serde_json::from_str::<JsonValue>(encoded) {
            Ok(JsonValue::Array(items)) => parse_items(&items),
            Ok(JsonValue::Null) => Ok(Vec::new()),
            Ok(_) => Err(ParseError::new(
                "encoded conditions must be an array",
                "conditions",
            )),
            Err(e) => Err(ParseError::new(
                format!("invalid encoded conditions: {}", e),
                "conditions",
            )),
        },
        _ => Err(ParseError::new("conditions must be an array", "conditions")),
    }
}

fn parse_items(items: &[JsonValue]) -> Result<Vec<Condition>, ParseError> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            if !item.is_object() {
                debug!("conditions[{}] is not an object, keeping it inert", i);
                return Ok(inert_condition());
            }
            Condition::deserialize(item)
                .map_err(|e| ParseError::new(e.to_string(), format!("conditions[{}]", i)))
        })
        .collect()
}

// a rule with no endpoints, operator or action never fires
fn inert_condition() -> Condition {
    Condition::new(
        "",
        "",
        Operator::Unknown(String::new()),
        "",
        "",
        Action::Unknown(String::new()),
    )
}

/// serde adapter so every load path decodes rules the same way
pub fn deserialize_conditions<'de, D>(deserializer: D) -> Result<Vec<Condition>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<JsonValue>::deserialize(deserializer)?;
    match raw {
        None => Ok(Vec::new()),
        Some(json) => parse_conditions(&json).map_err(serde::de::Error::custom),
    }
}

/// validate a rule against the form's fields before accepting it
pub fn validate_rule(condition: &Condition, fields: &[Field]) -> Result<(), RuleError> {
    if condition.source_field.is_empty() {
        return Err(RuleError::MissingSource);
    }
    if condition.target_field.is_empty() {
        return Err(RuleError::MissingTarget);
    }
    if condition.source_field == condition.target_field {
        return Err(RuleError::SelfReference(condition.source_field.clone()));
    }

    for id in [&condition.source_field, &condition.target_field] {
        if !fields.iter().any(|f| &f.id == id) {
            return Err(RuleError::UnknownField {
                id: id.clone(),
                suggestions: suggest_fields(id, fields),
            });
        }
    }

    if !condition.operator.is_known() {
        return Err(RuleError::UnknownOperator(condition.operator.to_string()));
    }
    if !condition.action.is_known() {
        return Err(RuleError::UnknownAction(condition.action.to_string()));
    }
    if condition.operator.takes_operand() && condition.value.is_empty() {
        return Err(RuleError::MissingOperand(condition.operator.to_string()));
    }

    Ok(())
}

/// field ids close to `query` by id or label, nearest first
pub fn suggest_fields(query: &str, fields: &[Field]) -> Vec<String> {
    let query_lower = query.to_lowercase();

    let mut scored: Vec<(usize, &str)> = fields
        .iter()
        .filter_map(|f| {
            let by_id = levenshtein(&query_lower, &f.id.to_lowercase());
            let by_label = levenshtein(&query_lower, &f.label.to_lowercase());
            let distance = by_id.min(by_label);
            (distance <= SUGGESTION_DISTANCE).then_some((distance, f.id.as_str()))
        })
        .collect();

    scored.sort();
    scored.into_iter().map(|(_, id)| id.to_string()).collect()
}
