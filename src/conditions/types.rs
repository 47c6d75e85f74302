//! core types for the rule system

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;

/// comparison operators supported in rules
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "JsonValue", into = "String")]
pub enum Operator {
    Equals,
    NotEquals,
    Contains,
    NotContains,
    StartsWith,
    EndsWith,
    IsEmpty,
    IsNotEmpty,
    GreaterThan,
    LessThan,
    GreaterEqual,
    LessEqual,
    /// anything else found in a saved form; never fires
    Unknown(String),
}

impl Operator {
    pub const KNOWN: [Operator; 12] = [
        Operator::Equals,
        Operator::NotEquals,
        Operator::Contains,
        Operator::NotContains,
        Operator::StartsWith,
        Operator::EndsWith,
        Operator::IsEmpty,
        Operator::IsNotEmpty,
        Operator::GreaterThan,
        Operator::LessThan,
        Operator::GreaterEqual,
        Operator::LessEqual,
    ];

    /// parse operator from its wire name
    pub fn parse(s: &str) -> Self {
        match s {
            "equals" => Operator::Equals,
            "not_equals" => Operator::NotEquals,
            "contains" => Operator::Contains,
            "not_contains" => Operator::NotContains,
            "starts_with" => Operator::StartsWith,
            "ends_with" => Operator::EndsWith,
            "is_empty" => Operator::IsEmpty,
            "is_not_empty" => Operator::IsNotEmpty,
            "greater_than" => Operator::GreaterThan,
            "less_than" => Operator::LessThan,
            "greater_equal" => Operator::GreaterEqual,
            "less_equal" => Operator::LessEqual,
            other => Operator::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Operator::Equals => "equals",
            Operator::NotEquals => "not_equals",
            Operator::Contains => "contains",
            Operator::NotContains => "not_contains",
            Operator::StartsWith => "starts_with",
            Operator::EndsWith => "ends_with",
            Operator::IsEmpty => "is_empty",
            Operator::IsNotEmpty => "is_not_empty",
            Operator::GreaterThan => "greater_than",
            Operator::LessThan => "less_than",
            Operator::GreaterEqual => "greater_equal",
            Operator::LessEqual => "less_equal",
            Operator::Unknown(s) => s,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Operator::Unknown(_))
    }

    /// whether the rule's comparison value is read at all
    pub fn takes_operand(&self) -> bool {
        !matches!(self, Operator::IsEmpty | Operator::IsNotEmpty)
    }
}

impl From<String> for Operator {
    fn from(s: String) -> Self {
        Operator::parse(&s)
    }
}

// saved forms may hold null, numbers or objects here
impl From<JsonValue> for Operator {
    fn from(raw: JsonValue) -> Self {
        match raw {
            JsonValue::String(s) => Operator::parse(&s),
            JsonValue::Null => Operator::Unknown(String::new()),
            other => Operator::Unknown(other.to_string()),
        }
    }
}

impl From<Operator> for String {
    fn from(op: Operator) -> Self {
        op.as_str().to_string()
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// which half of a field's state an action writes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionClass {
    Visibility,
    Requiredness,
}

/// effect applied to the target field when a rule fires
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "JsonValue", into = "String")]
pub enum Action {
    Show,
    Hide,
    Require,
    Optional,
    /// anything else found in a saved form; has no effect
    Unknown(String),
}

impl Action {
    pub const KNOWN: [Action; 4] = [Action::Show, Action::Hide, Action::Require, Action::Optional];

    pub fn parse(s: &str) -> Self {
        match s {
            "show" => Action::Show,
            "hide" => Action::Hide,
            "require" => Action::Require,
            "optional" => Action::Optional,
            other => Action::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Action::Show => "show",
            Action::Hide => "hide",
            Action::Require => "require",
            Action::Optional => "optional",
            Action::Unknown(s) => s,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Action::Unknown(_))
    }

    pub fn class(&self) -> Option<ActionClass> {
        match self {
            Action::Show | Action::Hide => Some(ActionClass::Visibility),
            Action::Require | Action::Optional => Some(ActionClass::Requiredness),
            Action::Unknown(_) => None,
        }
    }
}

impl From<String> for Action {
    fn from(s: String) -> Self {
        Action::parse(&s)
    }
}

impl From<JsonValue> for Action {
    fn from(raw: JsonValue) -> Self {
        match raw {
            JsonValue::String(s) => Action::parse(&s),
            JsonValue::Null => Action::Unknown(String::new()),
            other => Action::Unknown(other.to_string()),
        }
    }
}

impl From<Action> for String {
    fn from(action: Action) -> Self {
        action.as_str().to_string()
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// one conditional-logic rule of a form
///
/// every member defaults so that a damaged rule still loads; it simply
/// never matches anything.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(default, deserialize_with = "deserialize_scalar")]
    pub id: String,
    #[serde(default, deserialize_with = "deserialize_scalar")]
    pub source_field: String,
    #[serde(default = "default_operator")]
    pub operator: Operator,
    #[serde(default, deserialize_with = "deserialize_scalar")]
    pub value: String,
    #[serde(default, deserialize_with = "deserialize_scalar")]
    pub target_field: String,
    #[serde(default = "default_action")]
    pub action: Action,
}

fn default_operator() -> Operator {
    Operator::Unknown(String::new())
}

fn default_action() -> Action {
    Action::Unknown(String::new())
}

// older saves may hold numbers or nulls where strings belong
fn deserialize_scalar<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<JsonValue>::deserialize(deserializer)? {
        Some(JsonValue::String(s)) => s,
        Some(JsonValue::Number(n)) => n.to_string(),
        Some(JsonValue::Bool(b)) => b.to_string(),
        _ => String::new(),
    })
}

impl Condition {
    pub fn new(
        id: impl Into<String>,
        source_field: impl Into<String>,
        operator: Operator,
        value: impl Into<String>,
        target_field: impl Into<String>,
        action: Action,
    ) -> Self {
        Self {
            id: id.into(),
            source_field: source_field.into(),
            operator,
            value: value.into(),
            target_field: target_field.into(),
            action,
        }
    }

    /// whether the rule references the field as source or target
    pub fn references(&self, field_id: &str) -> bool {
        self.source_field == field_id || self.target_field == field_id
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.operator.takes_operand() {
            write!(
                f,
                "when {} {} \"{}\" then {} {}",
                self.source_field, self.operator, self.value, self.action, self.target_field
            )
        } else {
            write!(
                f,
                "when {} {} then {} {}",
                self.source_field, self.operator, self.action, self.target_field
            )
        }
    }
}

/// resolved state of one field after all rules applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldState {
    pub is_visible: bool,
    pub is_required: bool,
}

impl FieldState {
    /// state before any rule fires
    pub fn initial(base_required: bool) -> Self {
        Self {
            is_visible: true,
            is_required: base_required,
        }
    }

    /// whether submission must check this field
    pub fn must_validate(&self) -> bool {
        self.is_visible && self.is_required
    }
}
