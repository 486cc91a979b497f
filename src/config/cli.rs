//! CLI argument parsing using clap.
//!
//! Agent options, host options and the subcommand selecting what to run.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::youtube::Mode;

/// yt-watch: YouTube change watcher
///
/// Polls a YouTube channel, playlist, or channel uploads and emits one
/// JSON event per new item.
#[derive(Debug, Parser)]
#[command(name = "yt-watch")]
#[command(version, about, long_about = None)]
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// Subcommand to run (default: watch)
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Path to configuration file
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// Agent name; scopes the memory file and stamps events
    #[arg(long, global = true)]
    pub name: Option<String>,

    /// What to poll
    #[arg(long, value_enum, global = true)]
    pub mode: Option<ModeArg>,

    /// YouTube Data API key
    #[arg(long = "api-key", global = true, env = "YT_WATCH_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Channel id (`check_channel`, `check_videos`)
    #[arg(long = "channel-id", global = true)]
    pub channel_id: Option<String>,

    /// Playlist id (`check_playlist`)
    #[arg(long = "playlist-id", global = true)]
    pub playlist_id: Option<String>,

    /// Maximum number of results per request
    #[arg(long, global = true)]
    pub limit: Option<u32>,

    /// Log response bodies and diff details
    #[arg(long, global = true)]
    pub debug: bool,

    /// Days without events before the agent is considered not working
    #[arg(long = "stale-after-days", global = true)]
    pub stale_after_days: Option<u32>,

    /// Polling interval in seconds
    #[arg(long, global = true)]
    pub interval: Option<u64>,

    /// Path to the agent memory file
    #[arg(long = "memory-file", global = true)]
    pub memory_file: Option<PathBuf>,

    /// Append events to this file instead of stdout
    #[arg(long = "events-file", global = true)]
    pub events_file: Option<PathBuf>,

    /// HTTP timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Report what would be emitted without emitting or remembering it
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Enable verbose logging
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

/// Subcommands for yt-watch
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Generate a default configuration file
    Init {
        /// Output path for the configuration file
        #[arg(long, short, default_value = "yt-watch.toml")]
        output: PathBuf,
    },
    /// Run one poll and exit
    Check,
    /// Poll on the configured interval until interrupted
    Watch,
    /// Run one poll per JSON event read from stdin
    Receive,
    /// Exit 0 if the agent is working, 2 otherwise
    Health,
}

/// Mode argument for CLI parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// Channel metadata
    #[value(name = "check_channel")]
    Channel,
    /// Playlist items
    #[value(name = "check_playlist")]
    Playlist,
    /// Latest channel uploads
    #[value(name = "check_videos")]
    Videos,
}

impl From<ModeArg> for Mode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Channel => Self::CheckChannel,
            ModeArg::Playlist => Self::CheckPlaylist,
            ModeArg::Videos => Self::CheckVideos,
        }
    }
}

impl Cli {
    /// Parses CLI arguments from the command line.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Parses CLI arguments from an iterator (useful for testing).
    pub fn parse_from_iter<I, T>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::parse_from(iter)
    }

    /// Returns the command to run, defaulting to [`Command::Watch`].
    #[must_use]
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Watch)
    }
}
