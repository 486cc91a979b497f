//! TOML configuration file parsing.
//!
//! Defines the structure of the configuration file with serde.

use std::path::Path;

use serde::Deserialize;

use super::ConfigError;

/// Root configuration structure from TOML file.
///
/// All fields are optional to allow partial configuration
/// that can be merged with CLI arguments.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    /// Agent options
    #[serde(default)]
    pub agent: AgentSection,

    /// Scheduling
    #[serde(default)]
    pub schedule: ScheduleSection,

    /// Agent memory persistence
    #[serde(default)]
    pub memory: MemorySection,

    /// Event output
    #[serde(default)]
    pub events: EventsSection,

    /// HTTP client
    #[serde(default)]
    pub http: HttpSection,
}

/// Agent options section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AgentSection {
    /// Agent name
    pub name: Option<String>,

    /// "`check_channel`", "`check_playlist`", "`check_videos`", or a template
    pub mode: Option<String>,

    /// YouTube Data API key
    pub api_key: Option<String>,

    /// Channel id
    pub channel_id: Option<String>,

    /// Playlist id
    pub playlist_id: Option<String>,

    /// Maximum number of results per request
    pub limit: Option<u32>,

    /// Log response bodies and diff details
    #[serde(default)]
    pub debug: bool,

    /// Days without events before the agent is unhealthy
    pub stale_after_days: Option<u32>,
}

/// Scheduling section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScheduleSection {
    /// Polling interval in seconds
    pub interval_secs: Option<u64>,
}

/// Memory section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MemorySection {
    /// Path to the memory file
    pub file: Option<String>,
}

/// Events section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EventsSection {
    /// Append events to this file instead of stdout
    pub file: Option<String>,
}

/// HTTP section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HttpSection {
    /// Request timeout in seconds
    pub timeout_secs: Option<u64>,
}

impl TomlConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::from)
    }
}

/// Generates a default configuration file with comments.
#[must_use]
pub fn default_config_template() -> String {
    r#"# yt-watch configuration file

[agent]
# Agent name; scopes the memory file and stamps events
name = "youtube-agent"

# What to poll: "check_channel", "check_playlist", or "check_videos"
# May also be a Handlebars template rendered against inbound events,
# e.g. "{{mode}}" when driven by `yt-watch receive`
mode = "check_channel"

# YouTube Data API key (required; may also come from YT_WATCH_API_KEY)
# api_key = "your-api-key"

# Channel id (required for check_channel and check_videos)
# channel_id = "UC..."

# Playlist id (required for check_playlist)
# playlist_id = "PL..."

# Maximum number of results per request (default: 10)
limit = 10

# Log response bodies and diff details
# debug = false

# Days without events before the agent is considered not working (default: 2)
stale_after_days = 2

[schedule]
# Polling interval in seconds (default: 3600)
interval_secs = 3600

[memory]
# Memory file (default: <data dir>/yt-watch/<name>.json)
# file = "~/.local/share/yt-watch/youtube-agent.json"

[events]
# Append events to this file (default: stdout)
# file = "events.jsonl"

[http]
# Request timeout in seconds (default: 30)
timeout_secs = 30
"#
    .to_string()
}
