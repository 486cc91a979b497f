//! Tests for the agent pipeline.

use std::collections::VecDeque;
use std::io;
use std::sync::Mutex;
use std::time::Duration;

use http::StatusCode;
use serde_json::{Value, json};

use super::{AgentError, YoutubeAgent};
use crate::config::{AgentConfig, AgentOptions, ConfigError};
use crate::event::{CollectingSink, Event, EventSink, SinkError};
use crate::health::AgentStatus;
use crate::memory::{InMemoryStore, LoadResult, MemoryError, MemoryStore, SNAPSHOT_KEY, STATUS_KEY};
use crate::time::mock::MockClock;
use crate::transport::{HttpClient, HttpError, HttpRequest, HttpResponse};
use crate::youtube::{FetchError, Mode};

const NOW: u64 = 1_700_000_000;

/// HTTP client replaying a queue of canned results.
#[derive(Default)]
struct ScriptedClient {
    responses: Mutex<VecDeque<Result<HttpResponse, HttpError>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedClient {
    fn new() -> Self {
        Self::default()
    }

    fn respond(self, body: &Value) -> Self {
        self.push(Ok(HttpResponse::ok(body.to_string())))
    }

    fn respond_with(self, status: StatusCode, body: &str) -> Self {
        let response = HttpResponse::new(status, http::HeaderMap::new(), body.as_bytes().to_vec());
        self.push(Ok(response))
    }

    fn fail(self, error: HttpError) -> Self {
        self.push(Err(error))
    }

    fn push(self, result: Result<HttpResponse, HttpError>) -> Self {
        self.responses.lock().unwrap().push_back(result);
        self
    }

    fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl HttpClient for ScriptedClient {
    async fn request(&self, req: HttpRequest) -> Result<HttpResponse, HttpError> {
        self.requests.lock().unwrap().push(req);
        let next = self.responses.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Err(HttpError::Connection("no scripted response".into())))
    }
}

/// Memory that reads normally but refuses every write.
#[derive(Default)]
struct ReadOnlyMemory(InMemoryStore);

impl MemoryStore for ReadOnlyMemory {
    async fn read(&self, key: &str) -> LoadResult {
        self.0.read(key).await
    }

    async fn write(&self, _key: &str, _value: Value) -> Result<(), MemoryError> {
        Err(MemoryError::Write(io::Error::other("disk full")))
    }
}

/// Sink that rejects every event.
struct RefusingSink;

impl EventSink for RefusingSink {
    async fn emit(&self, _event: &Event) -> Result<(), SinkError> {
        Err(SinkError::Write(io::Error::other("broken pipe")))
    }
}

type TestAgent<M = InMemoryStore> = YoutubeAgent<ScriptedClient, M, CollectingSink, MockClock>;

fn options(mode: &str) -> AgentOptions {
    AgentOptions {
        name: "test-agent".to_string(),
        mode: mode.to_string(),
        api_key: "secret-key".to_string(),
        channel_id: "UC1".to_string(),
        playlist_id: "PL1".to_string(),
        ..AgentOptions::default()
    }
}

fn config(mode: Mode) -> AgentConfig {
    options(mode.as_str()).validate().unwrap()
}

fn agent_with<M: MemoryStore>(config: AgentConfig, client: ScriptedClient, memory: M) -> TestAgent<M> {
    YoutubeAgent::new(config, client, memory, CollectingSink::new()).with_clock(MockClock::new(NOW))
}

fn agent(mode: Mode, client: ScriptedClient) -> TestAgent {
    agent_with(config(mode), client, InMemoryStore::new())
}

fn agent_with_prior(mode: Mode, client: ScriptedClient, prior: Value) -> TestAgent {
    agent_with(config(mode), client, InMemoryStore::with_entry(SNAPSHOT_KEY, prior))
}

fn payloads(agent: &TestAgent) -> Vec<Value> {
    agent.sink().events().into_iter().map(|e| e.payload).collect()
}

fn snapshot(agent: &TestAgent) -> Option<Value> {
    agent.memory().get(SNAPSHOT_KEY)
}

async fn status(agent: &TestAgent) -> AgentStatus {
    agent.status().await
}

fn list(items: &[Value]) -> Value {
    json!({"kind": "youtube#listResponse", "items": items})
}

mod check_channel {
    use super::*;

    #[tokio::test]
    async fn first_run_emits_whole_payload_then_nothing() {
        let payload = json!({"items": [{"id": "UC1", "statistics": {"viewCount": "10"}}]});
        let client = ScriptedClient::new().respond(&payload).respond(&payload);
        let agent = agent(Mode::CheckChannel, client);

        let first = agent.check().await.unwrap();
        let second = agent.check().await.unwrap();

        assert_eq!(first.events.len(), 1);
        assert_eq!(first.delivered, 1);
        assert!(second.events.is_empty());
        assert_eq!(payloads(&agent), vec![payload.clone()]);
        assert_eq!(snapshot(&agent), Some(payload));
    }

    #[tokio::test]
    async fn each_distinct_payload_emits_once() {
        let p1 = json!({"a": 1});
        let p2 = json!({"a": 2});
        let client = ScriptedClient::new().respond(&p1).respond(&p2);
        let agent = agent(Mode::CheckChannel, client);

        agent.check().await.unwrap();
        agent.check().await.unwrap();

        assert_eq!(payloads(&agent), vec![p1, p2]);
    }

    #[tokio::test]
    async fn unchanged_payload_keeps_snapshot() {
        let client = ScriptedClient::new().respond(&json!({"a": 1}));
        let agent = agent_with_prior(Mode::CheckChannel, client, json!({"a": 1}));

        let report = agent.check().await.unwrap();

        assert!(report.events.is_empty());
        assert_eq!(snapshot(&agent), Some(json!({"a": 1})));
    }

    #[tokio::test]
    async fn changed_payload_is_emitted_and_remembered() {
        let client = ScriptedClient::new().respond(&json!({"a": 2}));
        let agent = agent_with_prior(Mode::CheckChannel, client, json!({"a": 1}));

        let report = agent.check().await.unwrap();

        assert_eq!(report.events.len(), 1);
        assert_eq!(report.events[0].payload, json!({"a": 2}));
        assert_eq!(snapshot(&agent), Some(json!({"a": 2})));
    }

    #[tokio::test]
    async fn events_carry_agent_name_and_time() {
        let client = ScriptedClient::new().respond(&json!({"a": 1}));
        let agent = agent(Mode::CheckChannel, client);

        agent.check().await.unwrap();

        let event = &agent.sink().events()[0];
        assert_eq!(event.agent, "test-agent");
        assert_eq!(event.created_at, NOW);
    }

    #[tokio::test]
    async fn error_body_without_items_is_still_a_payload() {
        let client = ScriptedClient::new()
            .respond_with(StatusCode::FORBIDDEN, r#"{"error": {"code": 403}}"#);
        let agent = agent(Mode::CheckChannel, client);

        let report = agent.check().await.unwrap();

        assert_eq!(report.status, StatusCode::FORBIDDEN);
        assert_eq!(report.events.len(), 1);
    }
}

mod check_playlist {
    use super::*;

    #[tokio::test]
    async fn first_run_emits_every_item_in_order() {
        let items = [json!({"n": 1}), json!({"n": 2}), json!({"n": 3})];
        let client = ScriptedClient::new().respond(&list(&items));
        let agent = agent(Mode::CheckPlaylist, client);

        let report = agent.check().await.unwrap();

        assert_eq!(report.events.len(), 3);
        assert_eq!(payloads(&agent), items.to_vec());
        assert_eq!(snapshot(&agent).unwrap()["items"], json!(items));
    }

    #[tokio::test]
    async fn only_new_items_are_emitted() {
        let old = [json!({"n": 1}), json!({"n": 2})];
        let new = [json!({"n": 0}), json!({"n": 1}), json!({"n": 2}), json!({"n": 3})];
        let client = ScriptedClient::new().respond(&list(&new));
        let agent = agent_with_prior(Mode::CheckPlaylist, client, list(&old));

        agent.check().await.unwrap();

        assert_eq!(payloads(&agent), vec![json!({"n": 0}), json!({"n": 3})]);
        assert_eq!(snapshot(&agent), Some(list(&new)));
    }

    #[tokio::test]
    async fn identical_payload_emits_nothing() {
        let items = [json!({"n": 1})];
        let client = ScriptedClient::new().respond(&list(&items));
        let agent = agent_with_prior(Mode::CheckPlaylist, client, list(&items));

        let report = agent.check().await.unwrap();

        assert!(report.events.is_empty());
    }

    #[tokio::test]
    async fn blank_prior_emits_nothing_but_is_overwritten() {
        let items = [json!({"n": 1})];
        let client = ScriptedClient::new().respond(&list(&items));
        let agent = agent_with_prior(Mode::CheckPlaylist, client, json!(""));

        let report = agent.check().await.unwrap();

        assert!(report.events.is_empty());
        assert_eq!(snapshot(&agent), Some(list(&items)));
    }

    #[tokio::test]
    async fn sends_playlist_request() {
        let client = ScriptedClient::new().respond(&list(&[]));
        let agent = agent(Mode::CheckPlaylist, client);

        agent.check().await.unwrap();

        let requests = agent.client().requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url.path(), "/youtube/v3/playlistItems");
        assert_eq!(requests[0].query_param("playlistId").as_deref(), Some("PL1"));
        assert_eq!(requests[0].query_param("maxResults").as_deref(), Some("10"));
    }
}

mod check_videos {
    use super::*;

    #[tokio::test]
    async fn same_id_with_new_fields_is_already_seen() {
        let prior = list(&[json!({"id": "x1", "t": "old"})]);
        let current = list(&[json!({"id": "x1", "t": "new"}), json!({"id": "x2", "t": "new"})]);
        let client = ScriptedClient::new().respond(&current);
        let agent = agent_with_prior(Mode::CheckVideos, client, prior);

        let report = agent.check().await.unwrap();

        assert_eq!(report.events.len(), 1);
        assert_eq!(payloads(&agent), vec![json!({"id": "x2", "t": "new"})]);
        assert_eq!(snapshot(&agent), Some(current));
    }

    #[tokio::test]
    async fn identity_and_structural_policies_diverge() {
        let prior = list(&[json!({"id": {"videoId": "v1"}, "etag": "a"})]);
        let current = list(&[json!({"id": {"videoId": "v1"}, "etag": "b"})]);

        let videos = agent_with_prior(
            Mode::CheckVideos,
            ScriptedClient::new().respond(&current),
            prior.clone(),
        );
        let playlist = agent_with_prior(
            Mode::CheckPlaylist,
            ScriptedClient::new().respond(&current),
            prior,
        );

        assert!(videos.check().await.unwrap().events.is_empty());
        assert_eq!(playlist.check().await.unwrap().events.len(), 1);
    }

    #[tokio::test]
    async fn sends_search_request_with_json_accept() {
        let client = ScriptedClient::new().respond(&list(&[]));
        let agent = agent(Mode::CheckVideos, client);

        agent.check().await.unwrap();

        let request = &agent.client().requests()[0];
        assert_eq!(request.method, http::Method::GET);
        assert_eq!(request.url.path(), "/youtube/v3/search");
        assert_eq!(request.query_param("channelId").as_deref(), Some("UC1"));
        assert_eq!(request.query_param("order").as_deref(), Some("date"));
        assert_eq!(
            request.headers.get(http::header::ACCEPT).unwrap(),
            "application/json"
        );
    }
}

mod failures {
    use super::*;

    #[tokio::test]
    async fn transport_error_leaves_snapshot_untouched() {
        let client = ScriptedClient::new().fail(HttpError::Timeout);
        let agent = agent_with_prior(Mode::CheckChannel, client, json!({"a": 1}));

        let err = agent.check().await.unwrap_err();

        assert!(matches!(err, AgentError::Transport(HttpError::Timeout)));
        assert!(agent.sink().is_empty());
        assert_eq!(snapshot(&agent), Some(json!({"a": 1})));
        assert_eq!(status(&agent).await.last_error_at, Some(NOW));
    }

    #[tokio::test]
    async fn undecodable_body_is_fetch_error() {
        let client = ScriptedClient::new().respond_with(StatusCode::OK, "<html>oops</html>");
        let agent = agent_with_prior(Mode::CheckVideos, client, list(&[]));

        let err = agent.check().await.unwrap_err();

        assert!(matches!(err, AgentError::Fetch(FetchError::Decode(_))));
        assert!(agent.sink().is_empty());
        assert_eq!(snapshot(&agent), Some(list(&[])));
    }

    #[tokio::test]
    async fn list_mode_without_items_is_fetch_error() {
        let client = ScriptedClient::new()
            .respond_with(StatusCode::BAD_REQUEST, r#"{"error": {"code": 400}}"#);
        let agent = agent(Mode::CheckPlaylist, client);

        let err = agent.check().await.unwrap_err();

        assert!(matches!(
            err,
            AgentError::Fetch(FetchError::MissingItems {
                mode: Mode::CheckPlaylist
            })
        ));
        assert_eq!(snapshot(&agent), None);
    }

    #[tokio::test]
    async fn empty_rendered_id_fails_before_request() {
        let opts = AgentOptions {
            channel_id: "{{channel}}".to_string(),
            ..options("check_channel")
        };
        let agent = agent_with(
            opts.validate().unwrap(),
            ScriptedClient::new(),
            InMemoryStore::new(),
        );

        let err = agent.check().await.unwrap_err();

        assert!(matches!(
            err,
            AgentError::Configuration(ConfigError::MissingForMode {
                field: "channel_id",
                ..
            })
        ));
        assert!(agent.client().requests().is_empty());
        assert_eq!(status(&agent).await.last_error_at, None);
    }

    #[tokio::test]
    async fn memory_write_failure_is_reported() {
        let client = ScriptedClient::new().respond(&json!({"a": 1}));
        let agent = agent_with(config(Mode::CheckChannel), client, ReadOnlyMemory::default());

        let err = agent.check().await.unwrap_err();

        assert!(matches!(err, AgentError::Memory(_)));
        assert_eq!(err.kind(), "memory");
    }

    #[tokio::test]
    async fn refused_events_are_not_delivered() {
        let client = ScriptedClient::new().respond(&json!({"a": 1}));
        let agent = YoutubeAgent::new(
            config(Mode::CheckChannel),
            client,
            InMemoryStore::new(),
            RefusingSink,
        )
        .with_clock(MockClock::new(NOW));

        let report = agent.check().await.unwrap();

        assert_eq!(report.events.len(), 1);
        assert_eq!(report.delivered, 0);
        assert_eq!(agent.memory().get(SNAPSHOT_KEY), Some(json!({"a": 1})));
        assert_eq!(agent.status().await.last_event_at, None);
        assert!(!agent.is_healthy().await);
    }

    #[tokio::test]
    async fn invalid_mode_takes_no_action() {
        let agent = agent_with(
            options("{{mode}}").validate().unwrap(),
            ScriptedClient::new(),
            InMemoryStore::new(),
        );

        let results = agent.receive(&[json!({"mode": "check_likes"})]).await;

        assert_eq!(results.len(), 1);
        let err = results[0].as_ref().unwrap_err();
        assert!(matches!(err, AgentError::InvalidMode(_)));
        assert!(err.to_string().contains("type has an invalid value (check_likes)"));
        assert!(agent.client().requests().is_empty());
        assert!(agent.sink().is_empty());
        assert_eq!(snapshot(&agent), None);
    }
}

mod dry_run {
    use super::*;

    #[tokio::test]
    async fn reports_events_without_emitting_or_remembering() {
        let items = [json!({"id": "v1"}), json!({"id": "v2"})];
        let client = ScriptedClient::new().respond(&list(&items));
        let agent = agent(Mode::CheckVideos, client).with_dry_run(true);

        let report = agent.check().await.unwrap();

        assert!(report.dry_run);
        assert_eq!(report.events.len(), 2);
        assert_eq!(report.delivered, 0);
        assert!(agent.sink().is_empty());
        assert_eq!(snapshot(&agent), None);
        assert_eq!(agent.memory().get(STATUS_KEY), None);
    }

    #[tokio::test]
    async fn failures_are_not_recorded() {
        let client = ScriptedClient::new().fail(HttpError::Timeout);
        let agent = agent(Mode::CheckChannel, client).with_dry_run(true);

        assert!(agent.check().await.is_err());
        assert_eq!(agent.memory().get(STATUS_KEY), None);
    }
}

mod receive {
    use super::*;

    #[tokio::test]
    async fn one_cycle_per_event_with_interpolated_options() {
        let opts = AgentOptions {
            channel_id: "{{channel}}".to_string(),
            ..options("check_videos")
        };
        let client = ScriptedClient::new()
            .respond(&list(&[json!({"id": "a"})]))
            .respond(&list(&[json!({"id": "b"})]));
        let agent = agent_with(opts.validate().unwrap(), client, InMemoryStore::new());

        let results = agent
            .receive(&[json!({"channel": "UC-A"}), json!({"channel": "UC-B"})])
            .await;

        assert!(results.iter().all(Result::is_ok));
        let channels: Vec<_> = agent
            .client()
            .requests()
            .iter()
            .map(|r| r.query_param("channelId"))
            .collect();
        assert_eq!(
            channels,
            vec![Some("UC-A".to_string()), Some("UC-B".to_string())]
        );
        assert_eq!(agent.sink().len(), 2);
    }

    #[tokio::test]
    async fn failed_cycle_does_not_stop_the_rest() {
        let client = ScriptedClient::new()
            .fail(HttpError::Timeout)
            .respond(&json!({"a": 1}));
        let agent = agent(Mode::CheckChannel, client);

        let results = agent.receive(&[json!({}), json!({})]).await;

        assert!(results[0].is_err());
        assert!(results[1].is_ok());
        assert_eq!(agent.sink().len(), 1);
    }

    #[tokio::test]
    async fn templated_mode_dispatches_per_event() {
        let client = ScriptedClient::new()
            .respond(&json!({"a": 1}))
            .respond(&list(&[]));
        let agent = agent_with(
            options("{{mode}}").validate().unwrap(),
            client,
            InMemoryStore::new(),
        );

        let results = agent
            .receive(&[json!({"mode": "check_channel"}), json!({"mode": "check_playlist"})])
            .await;

        let modes: Vec<_> = results.into_iter().map(|r| r.unwrap().mode).collect();
        assert_eq!(modes, vec![Mode::CheckChannel, Mode::CheckPlaylist]);
    }
}

mod health {
    use super::*;

    #[tokio::test]
    async fn new_agent_is_not_working() {
        let agent = agent(Mode::CheckChannel, ScriptedClient::new());
        assert!(!agent.is_healthy().await);
    }

    #[tokio::test]
    async fn healthy_right_after_emitting_run() {
        let client = ScriptedClient::new().respond(&json!({"a": 1}));
        let agent = agent(Mode::CheckChannel, client);

        agent.check().await.unwrap();

        assert_eq!(status(&agent).await.last_event_at, Some(NOW));
        assert!(agent.is_healthy().await);
    }

    #[tokio::test]
    async fn stale_after_window_passes() {
        let client = ScriptedClient::new().respond(&json!({"a": 1}));
        let agent = agent(Mode::CheckChannel, client);

        agent.check().await.unwrap();
        agent.clock().advance(Duration::from_secs(3 * 24 * 60 * 60));

        assert!(!agent.is_healthy().await);
    }

    #[tokio::test]
    async fn run_without_events_does_not_refresh() {
        let client = ScriptedClient::new()
            .respond(&json!({"a": 1}))
            .respond(&json!({"a": 1}));
        let agent = agent(Mode::CheckChannel, client);

        agent.check().await.unwrap();
        agent.clock().advance(Duration::from_secs(600));
        agent.check().await.unwrap();

        assert_eq!(status(&agent).await.last_event_at, Some(NOW));
    }

    #[tokio::test]
    async fn later_failure_makes_agent_unhealthy() {
        let client = ScriptedClient::new()
            .respond(&json!({"a": 1}))
            .fail(HttpError::Timeout);
        let agent = agent(Mode::CheckChannel, client);

        agent.check().await.unwrap();
        agent.clock().advance(Duration::from_secs(60));
        agent.check().await.unwrap_err();

        assert!(!agent.is_healthy().await);
    }

    #[tokio::test]
    async fn invalid_mode_keeps_agent_healthy() {
        let client = ScriptedClient::new().respond(&json!({"a": 1}));
        let agent = agent_with(
            options("{{mode}}").validate().unwrap(),
            client,
            InMemoryStore::new(),
        );

        agent.receive(&[json!({"mode": "check_channel"})]).await;
        agent.clock().advance(Duration::from_secs(3600));
        let results = agent.receive(&[json!({"mode": "check_likes"})]).await;

        assert!(matches!(results[0], Err(AgentError::InvalidMode(_))));
        assert_eq!(status(&agent).await.last_error_at, None);
        assert!(agent.is_healthy().await);
    }

    #[tokio::test]
    async fn missing_option_keeps_agent_healthy() {
        let opts = AgentOptions {
            channel_id: "{{channel}}".to_string(),
            ..options("check_channel")
        };
        let client = ScriptedClient::new().respond(&json!({"a": 1}));
        let agent = agent_with(opts.validate().unwrap(), client, InMemoryStore::new());

        agent.receive(&[json!({"channel": "UC1"})]).await;
        agent.check().await.unwrap_err();

        assert!(agent.is_healthy().await);
    }

    #[tokio::test]
    async fn old_failure_is_forgiven_by_later_event() {
        let client = ScriptedClient::new()
            .fail(HttpError::Timeout)
            .respond(&json!({"a": 1}));
        let agent = agent(Mode::CheckChannel, client);

        agent.check().await.unwrap_err();
        agent.clock().advance(Duration::from_secs(3600));
        agent.check().await.unwrap();

        assert!(agent.is_healthy().await);
    }
}
