mod commands;
pub mod exit_codes;
mod output;

pub use commands::{Cli, Commands, ConfigCommands, FieldCommands, RuleCommands, ValueArgs};

use thiserror::Error;

use crate::conditions::RuleError;
use crate::form::FormError;
use output::{JsonRpcError, OutputMode};

/// a failure that carries its own exit code
#[derive(Debug, Error)]
#[error("{message}")]
pub struct CliError {
    pub code: i32,
    pub message: String,
    pub details: Vec<String>,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: Vec::new(),
        }
    }

    pub fn with_details(mut self, details: Vec<String>) -> Self {
        self.details = details;
        self
    }
}

/// run a parsed command line and return the process exit code
pub fn run(cli: Cli) -> i32 {
    let mode = OutputMode::from_flags(cli.json, cli.no_json, cli.quiet, false);

    match commands::execute(cli) {
        Ok(()) => exit_codes::SUCCESS,
        Err(e) => report_error(&e, mode),
    }
}

fn report_error(err: &anyhow::Error, mode: OutputMode) -> i32 {
    let code = exit_code_for(err);
    let (suggestions, details) = error_data(err);

    if mode.is_json() {
        let error = JsonRpcError::new(code, format!("{:#}", err)).with_data(suggestions, details);
        output::print_json_error(&error);
    } else {
        eprintln!("Error: {:#}", err);
        if let Some(first) = suggestions.first() {
            eprintln!("  did you mean '{}'?", first);
        }
    }

    code
}

/// map an error chain to the exit code scripts see
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    if let Some(e) = err.downcast_ref::<CliError>() {
        return e.code;
    }
    if let Some(e) = err.downcast_ref::<FormError>() {
        return match e {
            FormError::Rule(_) => exit_codes::RULE_REJECTED,
            FormError::InvalidAssignment(_) | FormError::OutOfRange { .. } => {
                exit_codes::INVALID_ARGS
            }
            _ => exit_codes::FORM_ERROR,
        };
    }
    if err.downcast_ref::<RuleError>().is_some() {
        return exit_codes::RULE_REJECTED;
    }
    exit_codes::ERROR
}

fn error_data(err: &anyhow::Error) -> (Vec<String>, Vec<String>) {
    if let Some(e) = err.downcast_ref::<CliError>() {
        return (Vec::new(), e.details.clone());
    }
    if let Some(e) = err.downcast_ref::<FormError>() {
        return (e.suggestions().to_vec(), Vec::new());
    }
    if let Some(e) = err.downcast_ref::<RuleError>() {
        return (e.suggestions().to_vec(), Vec::new());
    }
    (Vec::new(), Vec::new())
}
