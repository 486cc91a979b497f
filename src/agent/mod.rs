//! The YouTube change-detecting agent.
//!
//! One run builds the request for the configured mode, fetches it, diffs
//! the payload against the remembered snapshot, emits an [`Event`] per new
//! fragment, and remembers the payload for the next run. Runs are
//! triggered by a scheduler ([`YoutubeAgent::check`]) or by inbound events
//! ([`YoutubeAgent::receive`]), which also serve as template context for
//! the options.
//!
//! # Example
//!
//! ```no_run
//! use yt_watch::agent::YoutubeAgent;
//! use yt_watch::config::AgentOptions;
//! use yt_watch::event::JsonLinesSink;
//! use yt_watch::memory::FileMemoryStore;
//! use yt_watch::transport::ReqwestClient;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let options = AgentOptions {
//!     api_key: "my-key".to_string(),
//!     channel_id: "UC_x5XG1OV2P6uZZ5FSM9Ttw".to_string(),
//!     ..AgentOptions::default()
//! };
//! let config = options.validate()?;
//!
//! let agent = YoutubeAgent::new(
//!     config,
//!     ReqwestClient::default(),
//!     FileMemoryStore::new("agent.json"),
//!     JsonLinesSink::stdout(),
//! );
//! let report = agent.check().await?;
//! println!("{} new event(s)", report.events.len());
//! # Ok(())
//! # }
//! ```

mod error;

#[cfg(test)]
#[path = "agent_tests.rs"]
mod tests;

pub use error::AgentError;

use http::StatusCode;
use serde_json::Value;

use crate::config::AgentConfig;
use crate::event::{Event, EventSink};
use crate::health::AgentStatus;
use crate::memory::{MemoryStore, SNAPSHOT_KEY, STATUS_KEY};
use crate::snapshot::{Prior, diff, explain};
use crate::time::{Clock, SystemClock};
use crate::transport::HttpClient;
use crate::youtube::{Mode, build_request, decode_payload};

/// Outcome of one successful run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    /// Mode the run dispatched on.
    pub mode: Mode,
    /// HTTP status of the API response.
    pub status: StatusCode,
    /// Events emitted (or, in dry-run mode, that would have been).
    pub events: Vec<Event>,
    /// Events the sink accepted. Always zero in dry-run mode.
    pub delivered: usize,
    /// Whether emission and memory writes were skipped.
    pub dry_run: bool,
}

/// Change-detecting poller over the YouTube Data API.
///
/// Collaborators are injected: the HTTP client, the agent's memory, the
/// event sink, and a clock for timestamps. Runs on one agent must be
/// serialized; the agent does not lock its memory.
pub struct YoutubeAgent<H, M, E, C = SystemClock> {
    config: AgentConfig,
    client: H,
    memory: M,
    sink: E,
    clock: C,
    dry_run: bool,
}

impl<H, M, E> YoutubeAgent<H, M, E, SystemClock>
where
    H: HttpClient,
    M: MemoryStore,
    E: EventSink,
{
    /// Creates an agent using the system clock.
    #[must_use]
    pub const fn new(config: AgentConfig, client: H, memory: M, sink: E) -> Self {
        Self {
            config,
            client,
            memory,
            sink,
            clock: SystemClock,
            dry_run: false,
        }
    }
}

impl<H, M, E, C> YoutubeAgent<H, M, E, C>
where
    H: HttpClient,
    M: MemoryStore,
    E: EventSink,
    C: Clock,
{
    /// Replaces the clock used for event and status timestamps.
    #[must_use]
    pub fn with_clock<C2: Clock>(self, clock: C2) -> YoutubeAgent<H, M, E, C2> {
        YoutubeAgent {
            config: self.config,
            client: self.client,
            memory: self.memory,
            sink: self.sink,
            clock,
            dry_run: self.dry_run,
        }
    }

    /// Enables or disables dry-run mode.
    ///
    /// A dry run fetches and diffs normally but emits nothing and writes
    /// nothing to memory.
    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Returns the agent configuration.
    pub const fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Returns the HTTP client.
    pub const fn client(&self) -> &H {
        &self.client
    }

    /// Returns the clock.
    pub const fn clock(&self) -> &C {
        &self.clock
    }

    /// Returns the agent memory.
    pub const fn memory(&self) -> &M {
        &self.memory
    }

    /// Returns the event sink.
    pub const fn sink(&self) -> &E {
        &self.sink
    }

    /// Runs one scheduled cycle.
    ///
    /// Templated options render against an empty context.
    ///
    /// # Errors
    ///
    /// Returns the [`AgentError`] that stopped the run. The snapshot is
    /// left untouched and no event is emitted.
    pub async fn check(&self) -> Result<RunReport, AgentError> {
        self.trigger(None).await
    }

    /// Runs one cycle per inbound event, in order.
    ///
    /// Each event is the template context for its own cycle. A failed
    /// cycle does not stop the ones after it.
    pub async fn receive(&self, events: &[Value]) -> Vec<Result<RunReport, AgentError>> {
        let mut results = Vec::with_capacity(events.len());
        for event in events {
            results.push(self.trigger(Some(event)).await);
        }
        results
    }

    /// Reads the persisted health status.
    pub async fn status(&self) -> AgentStatus {
        AgentStatus::from_memory(self.memory.read(STATUS_KEY).await)
    }

    /// Returns true if an event was delivered within the staleness window
    /// and no fetch failed since.
    pub async fn is_healthy(&self) -> bool {
        self.status()
            .await
            .is_healthy(self.config.stale_after_days, self.clock.now())
    }

    /// Runs one cycle, logging and recording failures.
    async fn trigger(&self, event: Option<&Value>) -> Result<RunReport, AgentError> {
        let result = self.run_cycle(event).await;

        match &result {
            Ok(report) if report.delivered > 0 => {
                self.record_status(|status, now| status.last_event_at = Some(now))
                    .await;
            }
            Ok(_) => {}
            Err(e) => {
                tracing::error!(agent = %self.config.name, kind = e.kind(), "{e}");
                if !self.dry_run && e.affects_health() {
                    self.record_status(|status, now| status.last_error_at = Some(now))
                        .await;
                }
            }
        }

        result
    }

    async fn run_cycle(&self, event: Option<&Value>) -> Result<RunReport, AgentError> {
        let options = self.config.resolve(event)?;
        let mode = options.mode;
        let request = build_request(&options)?;

        tracing::debug!(agent = %self.config.name, %mode, "GET {}", request.redacted_url());
        let response = self.client.request(request).await?;

        if self.config.debug {
            tracing::info!(agent = %self.config.name, "request status: {}", response.status);
            tracing::info!(agent = %self.config.name, "body: {}", response.body_lossy());
        } else {
            tracing::debug!(agent = %self.config.name, "request status: {}", response.status);
        }

        let payload = decode_payload(mode, &response.body)?;
        let prior = Prior::from_memory(self.memory.read(SNAPSHOT_KEY).await);
        let outcome = diff(mode, &prior, payload);

        if self.config.debug {
            for line in explain(&prior, &outcome) {
                tracing::info!(agent = %self.config.name, %mode, "{line}");
            }
        }

        let created_at = self.clock.unix_secs();
        let events: Vec<Event> = outcome
            .emit
            .into_iter()
            .map(|payload| Event::new(self.config.name.clone(), created_at, payload))
            .collect();

        let mut delivered = 0;
        if self.dry_run {
            tracing::info!(
                agent = %self.config.name,
                "Dry run: {} event(s) would be emitted",
                events.len()
            );
        } else {
            for event in &events {
                match self.sink.emit(event).await {
                    Ok(()) => delivered += 1,
                    Err(e) => {
                        tracing::error!(agent = %self.config.name, "Failed to emit event: {e}");
                    }
                }
            }
            self.memory.write(SNAPSHOT_KEY, outcome.remember).await?;

            if events.is_empty() {
                tracing::debug!(agent = %self.config.name, %mode, "No changes");
            } else {
                tracing::info!(
                    agent = %self.config.name,
                    %mode,
                    "Emitted {delivered} of {} event(s)",
                    events.len()
                );
            }
        }

        Ok(RunReport {
            mode,
            status: response.status,
            events,
            delivered,
            dry_run: self.dry_run,
        })
    }

    /// Applies `update` to the stored status. Failures are logged only.
    async fn record_status<F>(&self, update: F)
    where
        F: FnOnce(&mut AgentStatus, u64),
    {
        let mut status = self.status().await;
        update(&mut status, self.clock.unix_secs());

        let value = match serde_json::to_value(status) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Failed to serialize agent status: {e}");
                return;
            }
        };
        if let Err(e) = self.memory.write(STATUS_KEY, value).await {
            tracing::warn!(agent = %self.config.name, "Failed to record agent status: {e}");
        }
    }
}
