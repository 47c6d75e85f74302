//! output formatting utilities for scriptable CLI output
//!
//! uses JSON-RPC 2.0 format for machine-readable output:
//! - success: {"jsonrpc": "2.0", "result": {...}, "id": null}
//! - error: {"jsonrpc": "2.0", "error": {"code": N, "message": "...", "data": {...}}, "id": null}
//!
//! also provides format string templating for flexible scripting support

use serde::Serialize;
use std::io::IsTerminal;

use crate::conditions::Condition;
use crate::form::{Field, Issue, MissingField, ResolvedField};

/// JSON-RPC version constant
const JSONRPC_VERSION: &str = "2.0";

/// output mode determines how results are formatted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// human-readable text output
    Text,
    /// machine-readable JSON-RPC 2.0 output
    Json,
    /// no output on success (errors still go to stderr)
    Quiet,
    /// custom format string with {field} placeholders
    Format,
}

impl OutputMode {
    /// determine output mode from CLI flags and environment
    ///
    /// priority: quiet > format > json > no_json > auto-detect
    pub fn from_flags(json: bool, no_json: bool, quiet: bool, format: bool) -> Self {
        if quiet {
            return Self::Quiet;
        }
        if format {
            return Self::Format;
        }
        if json {
            return Self::Json;
        }
        if no_json {
            return Self::Text;
        }
        // auto-detect: JSON when stdout is not a TTY (piped)
        if !std::io::stdout().is_terminal() {
            Self::Json
        } else {
            Self::Text
        }
    }

    pub fn is_json(&self) -> bool {
        matches!(self, Self::Json)
    }

    pub fn is_quiet(&self) -> bool {
        matches!(self, Self::Quiet)
    }
}

/// JSON-RPC 2.0 success response
#[derive(Serialize)]
pub struct JsonRpcResponse<T: Serialize> {
    pub jsonrpc: &'static str,
    pub result: T,
    /// null for CLI responses (no request id)
    pub id: Option<String>,
}

impl<T: Serialize> JsonRpcResponse<T> {
    pub fn new(result: T) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            result,
            id: None,
        }
    }
}

/// JSON-RPC 2.0 error response
#[derive(Serialize)]
pub struct JsonRpcError {
    pub jsonrpc: &'static str,
    pub error: RpcError,
    pub id: Option<String>,
}

/// JSON-RPC 2.0 error object
#[derive(Serialize)]
pub struct RpcError {
    /// error code (formlogic exit code, offset by -32000 for app-specific errors)
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ErrorData>,
}

/// additional error data
#[derive(Serialize)]
pub struct ErrorData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl JsonRpcError {
    /// create error with standard JSON-RPC error code range
    /// formlogic uses -32000 to -32099 for application errors (range reserved by JSON-RPC)
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            error: RpcError {
                code: to_jsonrpc_code(code),
                message: message.into(),
                data: None,
            },
            id: None,
        }
    }

    /// attach suggestions and details; empty lists are left out
    pub fn with_data(mut self, suggestions: Vec<String>, details: Vec<String>) -> Self {
        if suggestions.is_empty() && details.is_empty() {
            return self;
        }
        self.error.data = Some(ErrorData {
            suggestions: Some(suggestions).filter(|s| !s.is_empty()),
            details: Some(details).filter(|d| !d.is_empty()),
        });
        self
    }
}

/// convert formlogic exit code to JSON-RPC error code
/// JSON-RPC reserves -32000 to -32099 for server/application errors
fn to_jsonrpc_code(code: i32) -> i32 {
    -32000 - code
}

/// convert JSON-RPC error code back to formlogic exit code
#[cfg(test)]
fn from_jsonrpc_code(rpc_code: i32) -> i32 {
    -(rpc_code + 32000)
}

// ============================================================================
// Result data structures for different commands
// ============================================================================

/// result data for resolve
#[derive(Serialize)]
pub struct ResolveData {
    pub form: String,
    pub fields: Vec<ResolvedField>,
}

/// result data for a passing check
#[derive(Serialize)]
pub struct CheckData {
    pub valid: bool,
    pub checked: Vec<String>,
    pub missing: Vec<MissingField>,
}

/// result data for verify
#[derive(Serialize)]
pub struct VerifyData {
    pub path: String,
    pub valid: bool,
    pub issues: Vec<Issue>,
}

/// result data for rule add/update/remove
#[derive(Serialize)]
pub struct RuleData {
    pub action: &'static str,
    pub rule: Condition,
}

#[derive(Serialize)]
pub struct RuleListData {
    pub rules: Vec<Condition>,
}

/// result data for field add/update/remove/move
#[derive(Serialize)]
pub struct FieldData {
    pub action: &'static str,
    pub field: Field,
}

#[derive(Serialize)]
pub struct FieldListData {
    pub fields: Vec<Field>,
}

// ============================================================================
// Output functions
// ============================================================================

/// format a string template with {field} placeholders
///
/// # example
/// ```ignore
/// let result = format_template("{id}: {isVisible}", &resolved);
/// assert_eq!(result, "email: true");
/// ```
pub fn format_template<T: Serialize>(template: &str, data: &T) -> String {
    let map = match serde_json::to_value(data) {
        Ok(serde_json::Value::Object(map)) => map,
        _ => return template.to_string(),
    };

    // single pass so substituted text is never expanded again
    let mut result = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        result.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let found = after
            .find('}')
            .and_then(|close| map.get(&after[..close]).map(|val| (val, close)));
        match found {
            Some((val, close)) => {
                result.push_str(&placeholder_text(val));
                rest = &after[close + 1..];
            }
            None => {
                result.push('{');
                rest = after;
            }
        }
    }
    result.push_str(rest);

    result
}

fn placeholder_text(val: &serde_json::Value) -> String {
    match val {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Array(arr) => {
            // join array elements with comma
            arr.iter()
                .map(|v| match v {
                    serde_json::Value::String(s) => s.clone(),
                    _ => v.to_string(),
                })
                .collect::<Vec<_>>()
                .join(", ")
        }
        serde_json::Value::Object(_) => val.to_string(),
    }
}

/// print JSON-RPC success response to stdout
pub fn print_json<T: Serialize>(data: &T, pretty: bool) {
    let response = JsonRpcResponse::new(data);
    let json = if pretty {
        serde_json::to_string_pretty(&response)
    } else {
        serde_json::to_string(&response)
    };
    if let Ok(json) = json {
        println!("{}", json);
    }
}

/// print JSON-RPC error to stdout
pub fn print_json_error(error: &JsonRpcError) {
    if let Ok(json) = serde_json::to_string(error) {
        println!("{}", json);
    }
}
