//! Error types for configuration parsing and validation.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::youtube::Mode;

/// Error type for configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("Failed to read config file '{}': {source}", path.display())]
    FileRead {
        /// Path to the config file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse the TOML configuration.
    #[error("Failed to parse TOML config: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Failed to write configuration file (for init command).
    #[error("Failed to write config file '{}': {source}", path.display())]
    FileWrite {
        /// Path to the config file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// One or more agent options failed validation.
    #[error("Invalid configuration: {0}")]
    Invalid(FieldErrors),

    /// A field the mode needs resolved to an empty value.
    #[error("Missing required field {field} for {mode}")]
    MissingForMode {
        /// Name of the empty field
        field: &'static str,
        /// Mode that needs it
        mode: Mode,
    },

    /// A request URL could not be built.
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl {
        /// The offending URL
        url: String,
        /// Reason for invalidity
        reason: String,
    },

    /// An option template failed to render against an inbound event.
    #[error("Failed to render {field}: {reason}")]
    Template {
        /// Name of the templated field
        field: &'static str,
        /// Renderer error message
        reason: String,
    },

    /// Invalid duration value.
    #[error("Invalid duration for {field}: {reason}")]
    InvalidDuration {
        /// Name of the field
        field: &'static str,
        /// Reason for invalidity
        reason: String,
    },
}

/// A validation failure tied to one option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Name of the offending field
    pub field: &'static str,
    /// What is wrong with it
    pub message: String,
}

impl FieldError {
    /// Creates a field error.
    #[must_use]
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Every field error found in one validation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    /// Records an error.
    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldError::new(field, message));
    }

    /// Returns true if no error was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of errors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if some error concerns `field`.
    #[must_use]
    pub fn has(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }

    /// Iterates over the recorded errors.
    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

/// Well-known option names.
pub mod field {
    /// Agent identity.
    pub const NAME: &str = "name";
    /// Polling mode.
    pub const MODE: &str = "mode";
    /// YouTube Data API key.
    pub const API_KEY: &str = "api_key";
    /// Channel id.
    pub const CHANNEL_ID: &str = "channel_id";
    /// Playlist id.
    pub const PLAYLIST_ID: &str = "playlist_id";
    /// Maximum number of results.
    pub const LIMIT: &str = "limit";
    /// Days without events before the agent is unhealthy.
    pub const STALE_AFTER_DAYS: &str = "stale_after_days";
    /// Scheduling interval.
    pub const INTERVAL: &str = "interval";
    /// HTTP timeout.
    pub const TIMEOUT: &str = "timeout";
}
