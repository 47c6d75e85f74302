//! exit codes for formlogic commands
//!
//! these follow Unix conventions where 0 = success and non-zero = error
//! specific codes help scripts distinguish between failure types

/// command completed successfully
pub const SUCCESS: i32 = 0;

/// general or unknown error
pub const ERROR: i32 = 1;

/// invalid command-line arguments (clap uses 2 as well)
pub const INVALID_ARGS: i32 = 2;

/// configuration file error
pub const CONFIG_ERROR: i32 = 3;

/// form or values file missing, unreadable, or failing verification
pub const FORM_ERROR: i32 = 4;

/// rule rejected by validation at the point of entry
pub const RULE_REJECTED: i32 = 5;

/// required visible fields left empty at submission
pub const VALIDATION_FAILED: i32 = 6;
