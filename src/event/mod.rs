//! Events emitted by the agent.
//!
//! This module provides:
//! - The emitted record ([`Event`])
//! - The sink abstraction events are handed to ([`EventSink`])
//! - A JSON Lines sink for files and stdout ([`JsonLinesSink`])
//! - A sink that keeps events in memory ([`CollectingSink`])

mod collect;
mod jsonl;

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;

pub use collect::CollectingSink;
pub use jsonl::JsonLinesSink;

use std::io;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// One emitted item.
///
/// The payload is a verbatim copy of an API response fragment: the whole
/// channel response in `check_channel`, one list item otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Identity of the emitting agent.
    pub agent: String,
    /// Unix seconds at which the event was created.
    pub created_at: u64,
    /// The emitted fragment.
    pub payload: Value,
}

impl Event {
    /// Creates a new event.
    #[must_use]
    pub fn new(agent: impl Into<String>, created_at: u64, payload: Value) -> Self {
        Self {
            agent: agent.into(),
            created_at,
            payload,
        }
    }
}

/// Errors raised while handing an event to a sink.
#[derive(Debug, Error)]
pub enum SinkError {
    /// Failed to write the event.
    #[error("Failed to write event: {0}")]
    Write(#[source] io::Error),

    /// Failed to serialize the event.
    #[error("Failed to serialize event: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// Append-only destination for events.
///
/// Events from one run are emitted one at a time, in order.
pub trait EventSink: Send + Sync {
    /// Appends one event.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError`] if the event cannot be delivered.
    fn emit(&self, event: &Event)
    -> impl std::future::Future<Output = Result<(), SinkError>> + Send;
}
