//! Health bookkeeping for the agent.
//!
//! An agent is healthy when it emitted an event recently enough and has
//! not failed since. Both timestamps live in agent memory under
//! [`crate::memory::STATUS_KEY`].

use std::time::{Duration, SystemTime};

use serde::{Deserialize, Serialize};

use crate::memory::LoadResult;
use crate::time::to_unix_secs;

/// Errors logged shortly before the last event still count as recent.
pub const ERROR_GRACE: Duration = Duration::from_secs(120);

/// Seconds in one day.
const DAY_SECS: u64 = 24 * 60 * 60;

/// Last-event and last-error timestamps, in Unix seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentStatus {
    /// When the agent last emitted at least one event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_event_at: Option<u64>,

    /// When a run last failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error_at: Option<u64>,
}

impl AgentStatus {
    /// Reads the status from a memory lookup.
    ///
    /// Anything that does not parse as a status reads as "never".
    #[must_use]
    pub fn from_memory(result: LoadResult) -> Self {
        result
            .into_value()
            .and_then(|value| serde_json::from_value(value).ok())
            .unwrap_or_default()
    }

    /// Returns true if an event was emitted strictly after `now - window`.
    #[must_use]
    pub fn event_created_within(&self, window: Duration, now: SystemTime) -> bool {
        let Some(last_event) = self.last_event_at else {
            return false;
        };
        let cutoff = now.checked_sub(window).map_or(0, to_unix_secs);
        last_event > cutoff
    }

    /// Returns true if a failure was recorded after (or just before) the
    /// last event.
    #[must_use]
    pub fn has_recent_errors(&self) -> bool {
        match (self.last_event_at, self.last_error_at) {
            (Some(event), Some(error)) => error > event.saturating_sub(ERROR_GRACE.as_secs()),
            _ => false,
        }
    }

    /// Health predicate: a recent event and no failure since.
    #[must_use]
    pub fn is_healthy(&self, stale_after_days: u32, now: SystemTime) -> bool {
        self.event_created_within(days(stale_after_days), now) && !self.has_recent_errors()
    }
}

/// Converts whole days to a duration.
#[must_use]
pub const fn days(n: u32) -> Duration {
    Duration::from_secs(n as u64 * DAY_SECS)
}
