// library crate for formlogic
// the binary and the integration tests both go through these modules

pub mod cli;
pub mod conditions;
pub mod config;
pub mod form;
pub mod logging;
