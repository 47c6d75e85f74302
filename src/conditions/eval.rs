//! rule evaluator
//!
//! resolves a field's visibility and requiredness from the form's rules and
//! the current values. evaluation is total: malformed rules never fire.

use tracing::debug;

use super::types::{Action, Condition, FieldState, Operator};
use crate::form::values::{parse_float, FormValue, FormValues};

/// evaluate one operator against a source value
///
/// `source` is `None` when the field has no value yet.
pub fn evaluate_predicate(operator: &Operator, source: Option<&FormValue>, operand: &str) -> bool {
    let text = source.and_then(FormValue::as_str);

    match operator {
        Operator::Equals => text == Some(operand),
        Operator::NotEquals => text != Some(operand),
        Operator::Contains => text.is_some_and(|s| s.contains(operand)),
        Operator::NotContains => text.is_some_and(|s| !s.contains(operand)),
        Operator::StartsWith => text.is_some_and(|s| s.starts_with(operand)),
        Operator::EndsWith => text.is_some_and(|s| s.ends_with(operand)),
        Operator::IsEmpty => is_empty(source),
        Operator::IsNotEmpty => !is_empty(source),
        Operator::GreaterThan => compare_numbers(source, operand, |a, b| a > b),
        Operator::LessThan => compare_numbers(source, operand, |a, b| a < b),
        Operator::GreaterEqual => compare_numbers(source, operand, |a, b| a >= b),
        Operator::LessEqual => compare_numbers(source, operand, |a, b| a <= b),
        Operator::Unknown(name) => {
            debug!(operator = %name, "unknown operator, rule does not fire");
            false
        }
    }
}

/// evaluate a rule's predicate against the current values
pub fn evaluate(condition: &Condition, values: &FormValues) -> bool {
    evaluate_predicate(
        &condition.operator,
        values.get(&condition.source_field),
        &condition.value,
    )
}

/// resolve one field's state
///
/// rules targeting the field are applied in declaration order; a firing
/// rule overwrites whatever an earlier rule of the same class left behind.
pub fn resolve_field_state(
    field_id: &str,
    conditions: &[Condition],
    values: &FormValues,
    base_required: bool,
) -> FieldState {
    let mut state = FieldState::initial(base_required);

    for condition in conditions.iter().filter(|c| c.target_field == field_id) {
        if !evaluate(condition, values) {
            continue;
        }

        match &condition.action {
            Action::Show => state.is_visible = true,
            Action::Hide => state.is_visible = false,
            Action::Require => state.is_required = true,
            Action::Optional => state.is_required = false,
            Action::Unknown(name) => {
                debug!(rule = %condition.id, action = %name, "unknown action ignored");
            }
        }
    }

    state
}

fn is_empty(value: Option<&FormValue>) -> bool {
    value.map_or(true, FormValue::is_empty)
}

fn compare_numbers(source: Option<&FormValue>, operand: &str, cmp: fn(f64, f64) -> bool) -> bool {
    let actual = source.map_or(f64::NAN, FormValue::to_number);
    let expected = parse_float(operand);

    // NaN on either side compares false under IEEE rules
    cmp(actual, expected)
}
