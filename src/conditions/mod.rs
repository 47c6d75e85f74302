//! conditional logic for form fields
//!
//! a form carries an ordered list of rules. each rule inspects one source
//! field's value and, when its predicate holds, shows, hides, requires or
//! relaxes one target field:
//! - operators: equals, not_equals, contains, not_contains, starts_with,
//!   ends_with, is_empty, is_not_empty, greater_than, less_than,
//!   greater_equal, less_equal
//! - actions: show, hide, require, optional
//! - rules apply in declaration order; the last firing rule of each kind wins
//!
//! the builder preview and the live viewer both resolve through this module.

mod eval;
mod parser;
mod types;

pub use eval::{evaluate, evaluate_predicate, resolve_field_state};
pub use parser::{
    deserialize_conditions, parse_conditions, suggest_fields, validate_rule, ParseError, RuleError,
};
pub use types::{Action, ActionClass, Condition, FieldState, Operator};
