//! Application execution logic.
//!
//! This module plays the host: it wires the agent to real collaborators
//! and drives it once, on a schedule, from inbound events, or for a
//! health probe.

use std::io;
use std::time::Duration;

use serde_json::Value;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::signal;
use tokio::time::MissedTickBehavior;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::LinesStream;

use yt_watch::agent::{AgentError, RunReport, YoutubeAgent};
use yt_watch::config::{Command, ValidatedConfig};
use yt_watch::event::{EventSink, JsonLinesSink};
use yt_watch::health::AgentStatus;
use yt_watch::memory::{FileMemoryStore, MemoryStore};
use yt_watch::time::Clock;
use yt_watch::transport::{HttpClient, HttpError, ReqwestClient};

/// Type alias for the agent wired to production collaborators.
type AppAgent = YoutubeAgent<ReqwestClient, FileMemoryStore, JsonLinesSink>;

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;

/// Error type for runtime execution failures.
#[derive(Debug, Error)]
pub enum RunError {
    /// Failed to create the HTTP client.
    #[error("Failed to create HTTP client: {0}")]
    HttpClient(#[source] HttpError),

    /// A single run failed.
    #[error("Run failed: {0}")]
    Cycle(#[source] AgentError),

    /// Some inbound events could not be processed.
    #[error("{failed} of {total} inbound event(s) failed")]
    Receive {
        /// Events that were skipped or whose run failed
        failed: usize,
        /// Non-blank input lines
        total: usize,
    },

    /// Failed to read inbound events.
    #[error("Failed to read inbound events: {0}")]
    Stdin(#[source] io::Error),

    /// The health probe found the agent not working.
    #[error("Agent is not working")]
    Unhealthy,
}

/// Executes `command` with the given configuration.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be created, a one-shot run
/// fails, inbound events fail, or the health probe fails.
///
/// # Coverage Note
///
/// This function is excluded from coverage because it requires real
/// network access and signal handling.
#[cfg(not(tarpaulin_include))]
pub async fn execute(command: Command, config: ValidatedConfig) -> Result<(), RunError> {
    let agent = create_agent(&config)?;

    if config.dry_run {
        tracing::info!("Dry-run mode enabled - events will be reported but not emitted");
    }

    match command {
        Command::Check => run_check(&agent).await,
        Command::Watch => run_watch(&agent, config.interval).await,
        Command::Receive => {
            let stdin = BufReader::new(tokio::io::stdin());
            receive_lines(&agent, stdin).await
        }
        Command::Health => report_health(&agent).await,
        // Handled before configuration is loaded.
        Command::Init { .. } => Ok(()),
    }
}

/// Wires the agent to the HTTP client, memory file, and event output.
fn create_agent(config: &ValidatedConfig) -> Result<AppAgent, RunError> {
    let client = ReqwestClient::with_timeout(config.http_timeout).map_err(RunError::HttpClient)?;
    let memory = FileMemoryStore::new(&config.memory_file);
    tracing::debug!("Agent memory: {}", memory.path().display());

    Ok(YoutubeAgent::new(config.agent.clone(), client, memory, create_sink(config))
        .with_dry_run(config.dry_run))
}

/// Creates the event sink: the configured file, or stdout.
fn create_sink(config: &ValidatedConfig) -> JsonLinesSink {
    config
        .events_file
        .as_ref()
        .map_or_else(JsonLinesSink::stdout, JsonLinesSink::file)
}

/// Runs one cycle; in dry-run mode prints the would-be events.
async fn run_check<H, M, E, C>(agent: &YoutubeAgent<H, M, E, C>) -> Result<(), RunError>
where
    H: HttpClient,
    M: MemoryStore,
    E: EventSink,
    C: Clock,
{
    let report = agent.check().await.map_err(RunError::Cycle)?;
    print_dry_run(&report);
    Ok(())
}

/// Runs a cycle immediately and then every `interval` until shutdown.
///
/// Failed cycles are already logged by the agent; the next tick is the
/// retry.
///
/// Excluded from coverage - requires signal handling.
#[cfg(not(tarpaulin_include))]
async fn run_watch(agent: &AppAgent, interval: Duration) -> Result<(), RunError> {
    tracing::info!("Watching every {}s", interval.as_secs());

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            biased;

            () = &mut shutdown => {
                tracing::info!("Shutdown signal received, stopping...");
                return Ok(());
            }

            _ = ticker.tick() => {
                if let Ok(report) = agent.check().await {
                    print_dry_run(&report);
                }
            }
        }
    }
}

/// Runs one cycle per JSON document read from `reader`, one per line.
///
/// Blank lines are ignored. Lines that are not JSON are logged and counted
/// as failures.
async fn receive_lines<H, M, E, C, R>(
    agent: &YoutubeAgent<H, M, E, C>,
    reader: R,
) -> Result<(), RunError>
where
    H: HttpClient,
    M: MemoryStore,
    E: EventSink,
    C: Clock,
    R: AsyncBufRead + Unpin,
{
    let mut lines = LinesStream::new(reader.lines());
    let mut total = 0;
    let mut failed = 0;

    while let Some(line) = lines.next().await {
        let line = line.map_err(RunError::Stdin)?;
        if line.trim().is_empty() {
            continue;
        }
        total += 1;

        let Some(event) = parse_inbound(&line) else {
            failed += 1;
            continue;
        };

        for result in agent.receive(std::slice::from_ref(&event)).await {
            match result {
                Ok(report) => print_dry_run(&report),
                Err(_) => failed += 1,
            }
        }
    }

    tracing::debug!("Processed {total} inbound event(s), {failed} failed");

    if failed == 0 {
        Ok(())
    } else {
        Err(RunError::Receive { failed, total })
    }
}

/// Parses one inbound event line.
fn parse_inbound(line: &str) -> Option<Value> {
    match serde_json::from_str(line) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!("Skipping inbound event that is not JSON: {e}");
            None
        }
    }
}

/// Prints the health status; fails if the agent is not working.
async fn report_health<H, M, E, C>(agent: &YoutubeAgent<H, M, E, C>) -> Result<(), RunError>
where
    H: HttpClient,
    M: MemoryStore,
    E: EventSink,
    C: Clock,
{
    let healthy = agent.is_healthy().await;
    println!("{}", describe_health(&agent.status().await, healthy));

    if healthy {
        Ok(())
    } else {
        Err(RunError::Unhealthy)
    }
}

/// One-line health summary.
fn describe_health(status: &AgentStatus, healthy: bool) -> String {
    let stamp = |secs: Option<u64>| secs.map_or_else(|| "never".to_string(), |s| s.to_string());

    format!(
        "working: {}, last_event_at: {}, last_error_at: {}",
        if healthy { "yes" } else { "no" },
        stamp(status.last_event_at),
        stamp(status.last_error_at),
    )
}

/// Prints the events a dry run would have emitted, one JSON object per line.
fn print_dry_run(report: &RunReport) {
    if !report.dry_run {
        return;
    }
    for event in &report.events {
        match serde_json::to_string(event) {
            Ok(line) => println!("{line}"),
            Err(e) => tracing::warn!("Failed to print event: {e}"),
        }
    }
}

/// Returns a future that completes when a shutdown signal is received.
///
/// Excluded from coverage - requires OS signal handling.
#[cfg(not(tarpaulin_include))]
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::warn!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
