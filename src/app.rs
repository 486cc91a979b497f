//! Application startup and utilities.
//!
//! This module contains exit codes, tracing setup, and error hints
//! that support the main entry point.

use tracing::Level;
use tracing_subscriber::EnvFilter;
use yt_watch::config::{ConfigError, field};

/// Application exit codes.
pub mod exit_code {
    use std::process::ExitCode;

    /// Success (exit code 0).
    pub const SUCCESS: ExitCode = ExitCode::SUCCESS;

    /// Configuration error (exit code 1) - invalid options, unreadable config file, etc.
    pub const CONFIG_ERROR: ExitCode = ExitCode::FAILURE;

    /// Runtime error (exit code 2) - failed run, unhealthy agent, etc.
    ///
    /// Note: This is a function rather than a constant because `ExitCode::from()` is not `const fn`.
    pub fn runtime_error() -> ExitCode {
        ExitCode::from(2)
    }
}

/// Prints helpful hints for common configuration errors.
pub fn print_config_hint(error: &ConfigError) {
    if needs_template_hint(error) {
        eprintln!("\nRun 'yt-watch init' to generate a configuration template.");
    }
}

/// Returns true if the error suggests the user has no usable config yet.
fn needs_template_hint(error: &ConfigError) -> bool {
    match error {
        ConfigError::Invalid(errors) => {
            errors.has(field::API_KEY)
                || errors.has(field::CHANNEL_ID)
                || errors.has(field::PLAYLIST_ID)
        }
        ConfigError::FileRead { .. } => true,
        _ => false,
    }
}

/// Sets up the tracing subscriber for logging.
///
/// Logs go to stderr; stdout carries emitted events.
pub fn setup_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
