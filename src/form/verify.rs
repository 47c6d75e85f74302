//! static checks over a stored form definition
//!
//! evaluation tolerates all of these; verify exists so a designer can find
//! rules that will silently never fire.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use super::definition::FormDefinition;
use crate::conditions::{suggest_fields, RuleError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// one problem found in a form definition
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Issue {
    pub severity: Severity,
    pub path: String,
    pub message: String,
}

impl Issue {
    fn error(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            path: path.into(),
            message: message.into(),
        }
    }

    fn warning(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.severity, self.path, self.message)
    }
}

/// check a form definition and return every issue found
pub fn verify_form(form: &FormDefinition) -> Vec<Issue> {
    let mut issues = Vec::new();

    // validate fields
    let mut field_ids = HashSet::new();
    for (i, field) in form.fields.iter().enumerate() {
        let prefix = format!("fields[{}]", i);

        if field.id.is_empty() {
            issues.push(Issue::error(&prefix, "field has no id"));
        } else if !field_ids.insert(field.id.as_str()) {
            issues.push(Issue::error(
                &prefix,
                format!("duplicate field id '{}'", field.id),
            ));
        }

        if field.field_type.has_options() && field.options.is_empty() {
            issues.push(Issue::warning(
                &prefix,
                format!("{} field '{}' has no options", field.field_type, field.id),
            ));
        } else if !field.field_type.has_options() && !field.options.is_empty() {
            issues.push(Issue::warning(
                &prefix,
                format!(
                    "options on {} field '{}' are ignored",
                    field.field_type, field.id
                ),
            ));
        }
    }

    // validate conditions
    let mut rule_ids = HashSet::new();
    for (i, rule) in form.conditions.iter().enumerate() {
        let prefix = format!("conditions[{}]", i);

        if !rule.id.is_empty() && !rule_ids.insert(rule.id.as_str()) {
            issues.push(Issue::warning(
                &prefix,
                format!("duplicate rule id '{}'", rule.id),
            ));
        }

        if rule.source_field.is_empty() {
            issues.push(Issue::error(&prefix, RuleError::MissingSource.to_string()));
        }
        if rule.target_field.is_empty() {
            issues.push(Issue::error(&prefix, RuleError::MissingTarget.to_string()));
        }
        if !rule.source_field.is_empty() && rule.source_field == rule.target_field {
            issues.push(Issue::error(
                &prefix,
                RuleError::SelfReference(rule.source_field.clone()).to_string(),
            ));
        }

        for (role, id) in [("source", &rule.source_field), ("target", &rule.target_field)] {
            if id.is_empty() || field_ids.contains(id.as_str()) {
                continue;
            }
            let suggestions = suggest_fields(id, &form.fields);
            let hint = match suggestions.first() {
                Some(s) => format!(" (did you mean '{}'?)", s),
                None => String::new(),
            };
            issues.push(Issue::warning(
                &prefix,
                format!("{} field '{}' does not exist{}", role, id, hint),
            ));
        }

        if !rule.operator.is_known() {
            issues.push(Issue::error(
                &prefix,
                RuleError::UnknownOperator(rule.operator.to_string()).to_string(),
            ));
        } else if rule.operator.takes_operand() && rule.value.is_empty() {
            issues.push(Issue::warning(
                &prefix,
                RuleError::MissingOperand(rule.operator.to_string()).to_string(),
            ));
        }

        if !rule.action.is_known() {
            issues.push(Issue::error(
                &prefix,
                RuleError::UnknownAction(rule.action.to_string()).to_string(),
            ));
        }
    }

    issues
}

/// whether the issues should fail verification
pub fn has_failures(issues: &[Issue], strict: bool) -> bool {
    issues
        .iter()
        .any(|i| i.severity == Severity::Error || strict)
}
