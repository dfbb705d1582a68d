//! Log output for the CLI.
//!
//! The crate logs through the `log` facade. A `tracing-subscriber` formatter
//! picks those records up through its `log` bridge and writes them to
//! stderr. Records from this crate are shown down to the requested level;
//! dependencies (the HTTP client, mostly) only at warning and above.
//! `RUST_LOG`, when set, replaces these defaults.

use log::LevelFilter;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};

const CRATE_TARGET: &str = env!("CARGO_CRATE_NAME");

/// Filter directives for `level`: this crate at `level`, the rest at `warn`.
#[must_use]
pub fn directives(level: LevelFilter) -> String {
    let level = level.as_str().to_ascii_lowercase();
    format!("warn,{CRATE_TARGET}={level}")
}

/// Install the stderr subscriber with `level` as this crate's maximum level.
///
/// # Errors
///
/// Returns an error if a global subscriber or logger is already installed.
pub fn init(level: LevelFilter) -> Result<(), TryInitError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives(level)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .finish()
        .try_init()
}
