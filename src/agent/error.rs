//! Error taxonomy of one agent run.

use thiserror::Error;

use crate::config::{ConfigError, ResolveError};
use crate::memory::MemoryError;
use crate::transport::HttpError;
use crate::youtube::{FetchError, ParseModeError};

/// Why a run produced no snapshot update.
///
/// None of these are retried by the agent; the next scheduled or inbound
/// trigger is the retry.
#[derive(Debug, Error)]
pub enum AgentError {
    /// Options are missing or could not be rendered. Raised before any
    /// network call.
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// The mode resolved to an unrecognized value at dispatch time.
    #[error("Error: {0}")]
    InvalidMode(#[from] ParseModeError),

    /// The API could not be reached.
    #[error("Request failed: {0}")]
    Transport(#[from] HttpError),

    /// The API answered with a body that is not the expected document.
    #[error("Unexpected response: {0}")]
    Fetch(#[from] FetchError),

    /// The new snapshot could not be remembered.
    #[error("Failed to remember snapshot: {0}")]
    Memory(#[from] MemoryError),
}

impl From<ResolveError> for AgentError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::Config(e) => Self::Configuration(e),
            ResolveError::InvalidMode(e) => Self::InvalidMode(e),
        }
    }
}

impl AgentError {
    /// Short label for logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration",
            Self::InvalidMode(_) => "invalid_mode",
            Self::Transport(_) => "transport",
            Self::Fetch(_) => "fetch",
            Self::Memory(_) => "memory",
        }
    }

    /// Returns true if the failure counts against the agent's health.
    ///
    /// Only failures to fetch, decode or remember a payload do. An invalid
    /// mode or missing option is logged and the run produces no action.
    #[must_use]
    pub const fn affects_health(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Fetch(_) | Self::Memory(_))
    }
}
