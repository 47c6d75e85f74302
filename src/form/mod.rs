//! form definitions: fields, values, rules, and the operations over them

pub mod builder;
pub mod definition;
pub mod field;
pub mod values;
pub mod verify;

pub use builder::{FormBuilder, SessionContext};
pub use definition::{
    load_form, load_values, save_form, FormDefinition, MissingField, ResolvedField,
    SubmissionReport,
};
pub use field::{normalize_options, Field, FieldType};
pub use values::{FormValue, FormValues};
pub use verify::{has_failures, verify_form, Issue, Severity};

use std::path::PathBuf;

use thiserror::Error;

use crate::conditions::RuleError;

#[derive(Debug, Error)]
pub enum FormError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },
    #[error("failed to serialize form: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("invalid assignment '{0}': use key=text or key:=json")]
    InvalidAssignment(String),
    #[error("unknown field '{id}'")]
    UnknownField { id: String, suggestions: Vec<String> },
    #[error("position {index} out of range (form has {len} fields)")]
    OutOfRange { index: usize, len: usize },
    #[error(transparent)]
    Rule(#[from] RuleError),
}

impl FormError {
    pub fn suggestions(&self) -> &[String] {
        match self {
            FormError::UnknownField { suggestions, .. } => suggestions,
            FormError::Rule(e) => e.suggestions(),
            _ => &[],
        }
    }
}
