//! Configuration layer for yt-watch.
//!
//! This module provides:
//! - CLI argument parsing ([`Cli`], [`Command`])
//! - TOML configuration file parsing ([`TomlConfig`])
//! - Agent option validation ([`AgentOptions`], [`AgentConfig`])
//! - Per-run option rendering ([`AgentConfig::resolve`])
//! - Validated configuration ([`ValidatedConfig`])
//! - Configuration file generation ([`write_default_config`])
//! - Default values ([`defaults`])
//!
//! # Priority
//!
//! Configuration values are resolved with the following priority (highest to lowest):
//!
//! 1. **Explicit CLI arguments** - Values explicitly passed via command line
//! 2. **TOML config file** - Values from the configuration file
//! 3. **Built-in defaults** - Hardcoded default values
//!
//! `--debug` uses OR semantics: set in either source, it is on.
//!
//! # Templates
//!
//! `mode`, `api_key`, `channel_id` and `playlist_id` may contain Handlebars
//! expressions. They are syntax-checked at load time and rendered against
//! each inbound event (or an empty object for scheduled runs).

mod cli;
pub mod defaults;
mod error;
mod interpolate;
mod options;
mod toml;
mod validated;


pub use cli::{Cli, Command, ModeArg};
pub use error::{ConfigError, FieldError, FieldErrors, field};
pub use interpolate::Interpolator;
pub use options::{AgentConfig, AgentOptions, ModeSetting, ResolveError, ResolvedOptions};
pub use toml::{TomlConfig, default_config_template};
pub use validated::{ValidatedConfig, write_default_config};
