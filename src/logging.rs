//! Tracing subscriber setup.
//!
//! Installs a single global `fmt` subscriber. `RUST_LOG`, when set, takes
//! precedence over the level passed on the command line.

use std::sync::OnceLock;

use tracing_subscriber::{EnvFilter, Registry, fmt, prelude::*};

static INSTALLED: OnceLock<()> = OnceLock::new();

/// Errors that may occur while initializing logging.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    /// The fallback level string was not a valid filter directive.
    #[error("Invalid log level '{level}': {source}")]
    InvalidLevel {
        level: String,
        source: tracing_subscriber::filter::ParseError,
    },
    /// Another subscriber was already installed globally.
    #[error("Failed to install global tracing subscriber: {0}")]
    SetGlobal(tracing::subscriber::SetGlobalDefaultError),
}

/// Initialize tracing to stderr. Subsequent calls are no-ops.
pub fn init(level: &str) -> Result<(), LoggingError> {
    if INSTALLED.get().is_some() {
        return Ok(());
    }

    let env_filter = build_env_filter(level)?;
    let subscriber = Registry::default()
        .with(env_filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr));
    tracing::subscriber::set_global_default(subscriber).map_err(LoggingError::SetGlobal)?;
    let _ = INSTALLED.set(());

    tracing::debug!(level, "logging initialized");
    Ok(())
}

fn build_env_filter(level: &str) -> Result<EnvFilter, LoggingError> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(level).map_err(|source| LoggingError::InvalidLevel {
            level: level.to_string(),
            source,
        }),
    }
}
