//! Logging setup
//!
//! Every component logs through `tracing` with an uppercase `event` field,
//! e.g. `event = "UPLOAD_MATERIALIZED"`. The binary installs a compact
//! console subscriber filtered by `GRAPHQL_HANDLER_LOG`, which follows
//! `RUST_LOG` syntax and defaults to `info`.

use tracing_subscriber::{filter::LevelFilter, prelude::*, EnvFilter};

/// Environment variable holding the log filter directives
pub const LOG_ENV_VAR: &str = "GRAPHQL_HANDLER_LOG";

/// Install the global subscriber.
///
/// Returns false if one was already installed; logging still works
/// through the existing subscriber.
pub fn init_logging() -> bool {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .with_env_var(LOG_ENV_VAR)
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().compact())
        .try_init()
        .is_ok()
}
