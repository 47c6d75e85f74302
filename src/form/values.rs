//! runtime field values
//!
//! values arrive as JSON from the viewer: strings for text-like inputs,
//! booleans for standalone checkboxes, arrays of strings for checkbox groups.
//! an absent key behaves like an empty value everywhere.

use std::collections::HashMap;
use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::FormError;

/// current values keyed by field id
pub type FormValues = HashMap<String, FormValue>;

/// a single field's runtime value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FormValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<String>),
}

lazy_static! {
    // longest numeric prefix, the way a browser's parseFloat reads it
    static ref FLOAT_PREFIX: Regex =
        Regex::new(r"^[+-]?(Infinity|(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?)").unwrap();
}

impl FormValue {
    pub fn text(s: impl Into<String>) -> Self {
        FormValue::Text(s.into())
    }

    pub fn list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FormValue::List(items.into_iter().map(Into::into).collect())
    }

    /// string payload, only for text values
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FormValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// falsy scalar, empty string or empty list
    pub fn is_empty(&self) -> bool {
        match self {
            FormValue::Null => true,
            FormValue::Bool(b) => !b,
            FormValue::Number(n) => *n == 0.0 || n.is_nan(),
            FormValue::Text(s) => s.is_empty(),
            FormValue::List(l) => l.is_empty(),
        }
    }

    /// numeric reading of the value; NaN when nothing numeric can be read
    pub fn to_number(&self) -> f64 {
        match self {
            FormValue::Number(n) => *n,
            FormValue::Text(s) => parse_float(s),
            FormValue::List(l) => parse_float(&l.join(",")),
            FormValue::Null | FormValue::Bool(_) => f64::NAN,
        }
    }

    /// parse a `key=value` (text) or `key:=json` (typed) assignment
    pub fn parse_assignment(input: &str) -> Result<(String, FormValue), FormError> {
        if let Some((key, raw)) = input.split_once(":=") {
            if key.is_empty() {
                return Err(FormError::InvalidAssignment(input.to_string()));
            }
            let value: FormValue = serde_json::from_str(raw)
                .map_err(|_| FormError::InvalidAssignment(input.to_string()))?;
            return Ok((key.to_string(), value));
        }

        match input.split_once('=') {
            Some((key, value)) if !key.is_empty() => {
                Ok((key.to_string(), FormValue::Text(value.to_string())))
            }
            _ => Err(FormError::InvalidAssignment(input.to_string())),
        }
    }
}

impl fmt::Display for FormValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormValue::Null => write!(f, "null"),
            FormValue::Bool(b) => write!(f, "{}", b),
            FormValue::Number(n) => write!(f, "{}", n),
            FormValue::Text(s) => write!(f, "\"{}\"", s),
            FormValue::List(l) => write!(f, "[{}]", l.join(", ")),
        }
    }
}

/// parse the leading number of a string; NaN when there is none
pub fn parse_float(s: &str) -> f64 {
    let trimmed = s.trim_start();
    let Some(m) = FLOAT_PREFIX.find(trimmed) else {
        return f64::NAN;
    };

    let literal = m.as_str();
    match literal.trim_start_matches(['+', '-']) {
        "Infinity" if literal.starts_with('-') => f64::NEG_INFINITY,
        "Infinity" => f64::INFINITY,
        _ => literal.parse().unwrap_or(f64::NAN),
    }
}
