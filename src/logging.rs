//! tracing subscriber setup
//!
//! logs go to stderr so stdout stays clean for JSON output.
//! FORMLOGIC_LOG takes any EnvFilter directive and wins over everything else.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_ENV_VAR: &str = "FORMLOGIC_LOG";

/// filter directive for a `-v` count and the configured level
pub fn filter_directive(verbosity: u8, configured: &str) -> String {
    match verbosity {
        0 => configured.to_string(),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

/// install the global subscriber; repeated calls are ignored
pub fn init(verbosity: u8, configured: &str) {
    let filter = std::env::var(LOG_ENV_VAR)
        .ok()
        .and_then(|directive| EnvFilter::try_new(directive).ok())
        .unwrap_or_else(|| {
            EnvFilter::try_new(filter_directive(verbosity, configured))
                .unwrap_or_else(|_| EnvFilter::new("warn"))
        });

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init();
}
