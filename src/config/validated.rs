//! Validated configuration after merging CLI and TOML sources.
//!
//! This module contains the final, validated configuration that is used
//! by the application. All validation is performed during construction.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::youtube::Mode;

use super::cli::Cli;
use super::defaults;
use super::error::{ConfigError, field};
use super::options::{AgentConfig, AgentOptions};
use super::toml::TomlConfig;

/// Fully validated configuration ready for use by the application.
///
/// # Construction
///
/// Use [`ValidatedConfig::from_raw`] to create from CLI args and optional TOML config.
#[derive(Debug)]
pub struct ValidatedConfig {
    /// Agent options
    pub agent: AgentConfig,

    /// Polling interval for `watch`
    pub interval: Duration,

    /// Path to the agent memory file
    pub memory_file: PathBuf,

    /// Event output file; `None` writes to stdout
    pub events_file: Option<PathBuf>,

    /// HTTP request timeout
    pub http_timeout: Duration,

    /// Dry-run mode (report events without emitting or remembering them)
    pub dry_run: bool,

    /// Verbose logging enabled
    pub verbose: bool,
}

impl fmt::Display for ValidatedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let events = self
            .events_file
            .as_ref()
            .map_or_else(|| "stdout".to_string(), |p| p.display().to_string());

        write!(
            f,
            "Config {{ {}, interval: {}s, memory_file: {}, events: {}, timeout: {}s, dry_run: {} }}",
            self.agent,
            self.interval.as_secs(),
            self.memory_file.display(),
            events,
            self.http_timeout.as_secs(),
            self.dry_run,
        )
    }
}

impl ValidatedConfig {
    /// Creates a validated configuration from CLI arguments and optional TOML config.
    ///
    /// CLI arguments take precedence over TOML config values, which take
    /// precedence over built-in defaults. `--debug` uses OR semantics.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] with every agent option error, or
    /// [`ConfigError::InvalidDuration`] if the interval or timeout is zero.
    pub fn from_raw(cli: &Cli, toml: Option<&TomlConfig>) -> Result<Self, ConfigError> {
        let options = Self::merge_agent_options(cli, toml);
        let agent = options.validate().map_err(ConfigError::Invalid)?;

        let interval = Self::resolve_duration(
            field::INTERVAL,
            cli.interval
                .or_else(|| toml.and_then(|t| t.schedule.interval_secs)),
            defaults::INTERVAL_SECS,
        )?;

        let http_timeout = Self::resolve_duration(
            field::TIMEOUT,
            cli.timeout.or_else(|| toml.and_then(|t| t.http.timeout_secs)),
            defaults::HTTP_TIMEOUT_SECS,
        )?;

        let memory_file = cli
            .memory_file
            .clone()
            .or_else(|| toml.and_then(|t| t.memory.file.as_deref().map(expand_tilde)))
            .unwrap_or_else(|| defaults::memory_file(&agent.name));

        let events_file = cli
            .events_file
            .clone()
            .or_else(|| toml.and_then(|t| t.events.file.as_deref().map(expand_tilde)));

        Ok(Self {
            agent,
            interval,
            memory_file,
            events_file,
            http_timeout,
            dry_run: cli.dry_run,
            verbose: cli.verbose,
        })
    }

    /// Loads and merges configuration from CLI and optional config file.
    ///
    /// If `cli.config` is set, loads the TOML file from that path.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The config file cannot be read or parsed
    /// - The merged configuration is invalid
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let toml = if let Some(ref path) = cli.config {
            Some(TomlConfig::load(path)?)
        } else {
            None
        };

        Self::from_raw(cli, toml.as_ref())
    }

    fn merge_agent_options(cli: &Cli, toml: Option<&TomlConfig>) -> AgentOptions {
        let section = toml.map(|t| &t.agent);
        let text = |cli_value: Option<&String>, toml_value: Option<&Option<String>>| {
            cli_value
                .cloned()
                .or_else(|| toml_value.and_then(Clone::clone))
        };
        let base = AgentOptions::default();

        AgentOptions {
            name: text(cli.name.as_ref(), section.map(|s| &s.name)).unwrap_or(base.name),
            mode: cli
                .mode
                .map(|m| Mode::from(m).as_str().to_string())
                .or_else(|| section.and_then(|s| s.mode.clone()))
                .unwrap_or(base.mode),
            api_key: text(cli.api_key.as_ref(), section.map(|s| &s.api_key)).unwrap_or_default(),
            channel_id: text(cli.channel_id.as_ref(), section.map(|s| &s.channel_id))
                .unwrap_or_default(),
            playlist_id: text(cli.playlist_id.as_ref(), section.map(|s| &s.playlist_id))
                .unwrap_or_default(),
            limit: cli
                .limit
                .or_else(|| section.and_then(|s| s.limit))
                .unwrap_or(base.limit),
            debug: cli.debug || section.is_some_and(|s| s.debug),
            stale_after_days: cli
                .stale_after_days
                .or_else(|| section.and_then(|s| s.stale_after_days))
                .unwrap_or(base.stale_after_days),
        }
    }

    fn resolve_duration(
        name: &'static str,
        seconds: Option<u64>,
        default_secs: u64,
    ) -> Result<Duration, ConfigError> {
        let seconds = seconds.unwrap_or(default_secs);

        if seconds == 0 {
            return Err(ConfigError::InvalidDuration {
                field: name,
                reason: "must be greater than 0".to_string(),
            });
        }

        Ok(Duration::from_secs(seconds))
    }
}

/// Writes the default configuration template to a file.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_default_config(path: &Path) -> Result<(), ConfigError> {
    let template = super::toml::default_config_template();
    std::fs::write(path, template).map_err(|e| ConfigError::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Expands a leading `~/` to the home directory.
fn expand_tilde(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}
