//! Polling modes and their comparison policies.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What the agent polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Channel metadata (snippet, content details, statistics).
    CheckChannel,
    /// Items of a single playlist.
    CheckPlaylist,
    /// Most recent search results for a channel, newest first.
    CheckVideos,
}

/// How a fresh payload is compared against the remembered one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// The payload is a single unit; any difference emits it whole.
    WholePayload,
    /// Each `items` element is new unless an identical element was seen.
    ItemStructural,
    /// Each `items` element is new unless an element with an equal
    /// value under the named field was seen.
    ItemField(&'static str),
}

/// Error returned when a string names no known mode.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("type has an invalid value ({value}): should be 'check_channel', 'check_playlist', 'check_videos'")]
pub struct ParseModeError {
    /// The rejected value.
    pub value: String,
}

impl Mode {
    /// All modes, in declaration order.
    pub const ALL: [Self; 3] = [Self::CheckChannel, Self::CheckPlaylist, Self::CheckVideos];

    /// Returns the configuration spelling of the mode.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CheckChannel => "check_channel",
            Self::CheckPlaylist => "check_playlist",
            Self::CheckVideos => "check_videos",
        }
    }

    /// Returns the comparison policy applied by the snapshot differ.
    #[must_use]
    pub const fn comparison(self) -> Comparison {
        match self {
            Self::CheckChannel => Comparison::WholePayload,
            Self::CheckPlaylist => Comparison::ItemStructural,
            Self::CheckVideos => Comparison::ItemField("id"),
        }
    }

    /// Returns true if responses for this mode carry an `items` list
    /// that is diffed element by element.
    #[must_use]
    pub const fn is_list(self) -> bool {
        !matches!(self.comparison(), Comparison::WholePayload)
    }

    /// Returns true if the mode needs a channel id.
    #[must_use]
    pub const fn needs_channel_id(self) -> bool {
        matches!(self, Self::CheckChannel | Self::CheckVideos)
    }

    /// Returns true if the mode needs a playlist id.
    #[must_use]
    pub const fn needs_playlist_id(self) -> bool {
        matches!(self, Self::CheckPlaylist)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == s.trim())
            .ok_or_else(|| ParseModeError {
                value: s.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_spelling_back() {
        for mode in Mode::ALL {
            assert_eq!(mode.as_str().parse::<Mode>(), Ok(mode));
        }
    }

    #[test]
    fn parse_trims_whitespace() {
        assert_eq!(" check_videos\n".parse::<Mode>(), Ok(Mode::CheckVideos));
    }

    #[test]
    fn parse_rejects_unknown_value() {
        let err = "check_everything".parse::<Mode>().unwrap_err();

        assert_eq!(err.value, "check_everything");
        assert!(err.to_string().contains("check_everything"));
    }

    #[test]
    fn parse_is_case_sensitive() {
        assert!("CHECK_CHANNEL".parse::<Mode>().is_err());
    }

    #[test]
    fn comparison_policy_per_mode() {
        assert_eq!(Mode::CheckChannel.comparison(), Comparison::WholePayload);
        assert_eq!(Mode::CheckPlaylist.comparison(), Comparison::ItemStructural);
        assert_eq!(Mode::CheckVideos.comparison(), Comparison::ItemField("id"));
    }

    #[test]
    fn only_channel_mode_is_not_a_list() {
        assert!(!Mode::CheckChannel.is_list());
        assert!(Mode::CheckPlaylist.is_list());
        assert!(Mode::CheckVideos.is_list());
    }

    #[test]
    fn required_ids_per_mode() {
        assert!(Mode::CheckChannel.needs_channel_id());
        assert!(Mode::CheckVideos.needs_channel_id());
        assert!(!Mode::CheckPlaylist.needs_channel_id());
        assert!(Mode::CheckPlaylist.needs_playlist_id());
        assert!(!Mode::CheckChannel.needs_playlist_id());
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&Mode::CheckPlaylist).unwrap();
        assert_eq!(json, "\"check_playlist\"");

        let mode: Mode = serde_json::from_str("\"check_videos\"").unwrap();
        assert_eq!(mode, Mode::CheckVideos);
    }
}
