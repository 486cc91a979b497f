//! Agent options and their validation.
//!
//! [`AgentOptions`] is the raw, merged option set. [`AgentOptions::validate`]
//! checks it in one pass and either returns every field error or a typed
//! [`AgentConfig`]. String options may be Handlebars templates; those are
//! rendered per run by [`AgentConfig::resolve`].

use std::fmt;

use serde_json::{Map, Value};
use thiserror::Error;

use crate::youtube::{Mode, ParseModeError};

use super::defaults;
use super::error::{ConfigError, FieldErrors, field};
use super::interpolate::{Interpolator, check_template, is_template};

/// Raw agent options before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentOptions {
    /// Agent identity; scopes memory and stamps events.
    pub name: String,
    /// `check_channel`, `check_playlist`, `check_videos`, or a template.
    pub mode: String,
    /// YouTube Data API key.
    pub api_key: String,
    /// Channel to watch (`check_channel`, `check_videos`).
    pub channel_id: String,
    /// Playlist to watch (`check_playlist`).
    pub playlist_id: String,
    /// Maximum number of results per request.
    pub limit: u32,
    /// Log raw response bodies and diff details.
    pub debug: bool,
    /// Days without events before the agent is unhealthy.
    pub stale_after_days: u32,
}

impl Default for AgentOptions {
    fn default() -> Self {
        Self {
            name: defaults::NAME.to_string(),
            mode: defaults::MODE.to_string(),
            api_key: String::new(),
            channel_id: String::new(),
            playlist_id: String::new(),
            limit: defaults::LIMIT,
            debug: false,
            stale_after_days: defaults::STALE_AFTER_DAYS,
        }
    }
}

/// The configured mode: fixed, or rendered per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModeSetting {
    /// A known mode.
    Fixed(Mode),
    /// A template resolved against each inbound event.
    Template(String),
}

/// Validated agent configuration.
#[derive(Clone, PartialEq, Eq)]
pub struct AgentConfig {
    /// Agent identity.
    pub name: String,
    /// Polling mode.
    pub mode: ModeSetting,
    /// API key (possibly a template).
    pub api_key: String,
    /// Channel id (possibly a template).
    pub channel_id: String,
    /// Playlist id (possibly a template).
    pub playlist_id: String,
    /// Maximum number of results per request; always positive.
    pub limit: u32,
    /// Verbose per-agent logging.
    pub debug: bool,
    /// Staleness window for the health predicate; always positive.
    pub stale_after_days: u32,
}

/// Options rendered for one run, ready for the request builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOptions {
    /// Polling mode.
    pub mode: Mode,
    /// API key.
    pub api_key: String,
    /// Channel id.
    pub channel_id: String,
    /// Playlist id.
    pub playlist_id: String,
    /// Maximum number of results.
    pub limit: u32,
}

/// Failure to turn an [`AgentConfig`] into [`ResolvedOptions`].
#[derive(Debug, Error)]
pub enum ResolveError {
    /// A template failed to render.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The mode rendered to an unknown value.
    #[error(transparent)]
    InvalidMode(#[from] ParseModeError),
}

impl AgentOptions {
    /// Validates the options, collecting every field error.
    ///
    /// Mode-dependent requirements are checked only when the mode is not
    /// a template; templated modes are checked again when each request
    /// is built.
    ///
    /// # Errors
    ///
    /// Returns all [`FieldErrors`] found.
    pub fn validate(&self) -> Result<AgentConfig, FieldErrors> {
        let mut errors = FieldErrors::default();

        let name = self.name.trim();
        if name.is_empty() {
            errors.push(field::NAME, "name is a required field");
        } else if name.contains(['/', '\\']) || name == "." || name == ".." {
            errors.push(field::NAME, "name must not contain path separators");
        }

        let mode = if is_template(&self.mode) {
            Some(ModeSetting::Template(self.mode.clone()))
        } else {
            match self.mode.parse::<Mode>() {
                Ok(mode) => Some(ModeSetting::Fixed(mode)),
                Err(e) => {
                    errors.push(field::MODE, e.to_string());
                    None
                }
            }
        };

        if is_blank(&self.api_key) {
            errors.push(field::API_KEY, "api_key is a required field");
        }

        if let Some(ModeSetting::Fixed(mode)) = &mode {
            if mode.needs_playlist_id() && is_blank(&self.playlist_id) {
                errors.push(field::PLAYLIST_ID, "playlist_id is a required field");
            }
            if mode.needs_channel_id() && is_blank(&self.channel_id) {
                errors.push(field::CHANNEL_ID, "channel_id is a required field");
            }
        }

        if self.limit == 0 {
            errors.push(field::LIMIT, "limit must be a positive integer");
        }

        if self.stale_after_days == 0 {
            errors.push(
                field::STALE_AFTER_DAYS,
                "provide stale_after_days to indicate how many days can pass \
                 before this agent is considered to be not working",
            );
        }

        for (option, text) in [
            (field::MODE, &self.mode),
            (field::API_KEY, &self.api_key),
            (field::CHANNEL_ID, &self.channel_id),
            (field::PLAYLIST_ID, &self.playlist_id),
        ] {
            if let Err(reason) = check_template(text) {
                errors.push(option, format!("invalid template: {reason}"));
            }
        }

        match mode {
            Some(mode) if errors.is_empty() => Ok(AgentConfig {
                name: name.to_string(),
                mode,
                api_key: self.api_key.clone(),
                channel_id: self.channel_id.clone(),
                playlist_id: self.playlist_id.clone(),
                limit: self.limit,
                debug: self.debug,
                stale_after_days: self.stale_after_days,
            }),
            _ => Err(errors),
        }
    }
}

impl AgentConfig {
    /// Renders the options for one run.
    ///
    /// Templates see the inbound event as their context; without an event
    /// they render against an empty object.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::Config`] if a template fails to render and
    /// [`ResolveError::InvalidMode`] if the mode renders to an unknown value.
    pub fn resolve(&self, event: Option<&Value>) -> Result<ResolvedOptions, ResolveError> {
        let empty = Value::Object(Map::new());
        let interpolator = Interpolator::new(event.unwrap_or(&empty));

        let mode = match &self.mode {
            ModeSetting::Fixed(mode) => *mode,
            ModeSetting::Template(template) => {
                interpolator.render(field::MODE, template)?.parse::<Mode>()?
            }
        };

        Ok(ResolvedOptions {
            mode,
            api_key: interpolator.render(field::API_KEY, &self.api_key)?,
            channel_id: interpolator.render(field::CHANNEL_ID, &self.channel_id)?,
            playlist_id: interpolator.render(field::PLAYLIST_ID, &self.playlist_id)?,
            limit: self.limit,
        })
    }

    /// Returns the mode if it is not a template.
    #[must_use]
    pub const fn fixed_mode(&self) -> Option<Mode> {
        match &self.mode {
            ModeSetting::Fixed(mode) => Some(*mode),
            ModeSetting::Template(_) => None,
        }
    }
}

impl fmt::Display for ModeSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(mode) => write!(f, "{mode}"),
            Self::Template(template) => write!(f, "template({template})"),
        }
    }
}

// The API key never appears in logs.
impl fmt::Debug for AgentConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentConfig")
            .field("name", &self.name)
            .field("mode", &self.mode)
            .field("api_key", &"<redacted>")
            .field("channel_id", &self.channel_id)
            .field("playlist_id", &self.playlist_id)
            .field("limit", &self.limit)
            .field("debug", &self.debug)
            .field("stale_after_days", &self.stale_after_days)
            .finish()
    }
}

impl fmt::Display for AgentConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "agent: {}, mode: {}, channel_id: {}, playlist_id: {}, limit: {}, \
             debug: {}, stale_after: {}d",
            self.name,
            self.mode,
            or_none(&self.channel_id),
            or_none(&self.playlist_id),
            self.limit,
            self.debug,
            self.stale_after_days,
        )
    }
}

fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

fn or_none(s: &str) -> &str {
    if is_blank(s) { "none" } else { s }
}
