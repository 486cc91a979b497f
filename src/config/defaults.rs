//! Default values for configuration options.

use std::path::PathBuf;

/// Default agent identity.
pub const NAME: &str = "youtube-agent";

/// Default polling mode.
pub const MODE: &str = "check_channel";

/// Default maximum number of results per request.
pub const LIMIT: u32 = 10;

/// Default number of days without events before the agent is unhealthy.
pub const STALE_AFTER_DAYS: u32 = 2;

/// Default scheduling interval in seconds (hourly).
pub const INTERVAL_SECS: u64 = 3600;

/// Default HTTP timeout in seconds.
pub const HTTP_TIMEOUT_SECS: u64 = 30;

/// Default memory file for the agent named `name`.
///
/// Lives under the platform data directory, falling back to the
/// working directory when none is known.
#[must_use]
pub fn memory_file(name: &str) -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("yt-watch")
        .join(format!("{name}.json"))
}
