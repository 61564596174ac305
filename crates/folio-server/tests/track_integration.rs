use std::sync::{Arc, Mutex as StdMutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use folio_core::config::{Config, LlmConfig};
use folio_core::event::AnalyticsEvent;
use folio_core::site::SiteContent;
use folio_core::visitor::ClientIdPolicy;
use folio_server::app::build_app;
use folio_server::sink::EventSink;
use folio_server::state::AppState;

fn test_config(client_id_policy: ClientIdPolicy) -> Config {
    Config {
        port: 0,
        cors_origins: vec![],
        site_config_path: None,
        llm: LlmConfig::default(),
        client_id_policy,
    }
}

/// Sink that keeps every event for inspection.
#[derive(Default)]
struct CaptureSink {
    events: StdMutex<Vec<AnalyticsEvent>>,
}

impl CaptureSink {
    fn events(&self) -> Vec<AnalyticsEvent> {
        self.events.lock().expect("lock events").clone()
    }
}

#[async_trait]
impl EventSink for CaptureSink {
    async fn record(&self, event: &AnalyticsEvent) -> anyhow::Result<()> {
        self.events.lock().expect("lock events").push(event.clone());
        Ok(())
    }
}

struct FailingSink;

#[async_trait]
impl EventSink for FailingSink {
    async fn record(&self, _event: &AnalyticsEvent) -> anyhow::Result<()> {
        anyhow::bail!("log pipe closed")
    }
}

fn setup_with_policy(policy: ClientIdPolicy) -> (Arc<CaptureSink>, axum::Router) {
    let site = SiteContent::builtin().expect("builtin site content");
    let mut state = AppState::new(test_config(policy), site).expect("app state");
    let sink = Arc::new(CaptureSink::default());
    state.sink = Arc::clone(&sink) as Arc<dyn EventSink>;
    (sink, build_app(Arc::new(state)))
}

fn setup() -> (Arc<CaptureSink>, axum::Router) {
    setup_with_policy(ClientIdPolicy::Raw)
}

fn track_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("x-forwarded-for", "1.2.3.4")
        .header("user-agent", "Mozilla/5.0 Chrome/120")
        .header("referer", "https://www.linkedin.com/feed/")
        .body(Body::empty())
        .expect("build request")
}

async fn json_body(response: axum::http::Response<Body>) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("parse JSON")
}

// ============================================================
// BDD: event and label flow from the query into the event
// ============================================================
#[tokio::test]
async fn test_track_reads_event_and_label() {
    let (sink, app) = setup();

    let response = app
        .oneshot(track_request(
            "GET",
            "/api/track?event=cta_click&event_label=github",
        ))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({ "success": true }));

    let events = sink.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event_type, "cta_click");
    assert_eq!(events[0].event_label.as_deref(), Some("github"));
    assert_eq!(events[0].client_identifier, "1.2.3.4");
    assert_eq!(events[0].user_agent.as_deref(), Some("Mozilla/5.0 Chrome/120"));
    assert_eq!(
        events[0].referrer.as_deref(),
        Some("https://www.linkedin.com/feed/")
    );
}

// ============================================================
// BDD: POST is handled exactly like GET
// ============================================================
#[tokio::test]
async fn test_track_post_matches_get() {
    let (sink, app) = setup();

    let response = app
        .oneshot(track_request(
            "POST",
            "/api/track?event=project_click&event_label=rag-pipeline&path=%2F",
        ))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::OK);

    let events = sink.events();
    assert_eq!(events[0].event_type, "project_click");
    assert_eq!(events[0].event_label.as_deref(), Some("rag-pipeline"));
    assert_eq!(events[0].path, "/");
}

// ============================================================
// BDD: no event parameter means a page view on the request path
// ============================================================
#[tokio::test]
async fn test_track_defaults_to_page_view() {
    let (sink, app) = setup();

    let response = app
        .oneshot(track_request("GET", "/api/track"))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::OK);

    let events = sink.events();
    assert_eq!(events[0].event_type, "page_view");
    assert_eq!(events[0].event_label, None);
    assert_eq!(events[0].path, "/api/track");
}

// ============================================================
// BDD: a bare marker becomes the attribution source
// ============================================================
#[tokio::test]
async fn test_track_bare_marker_sets_source() {
    let (sink, app) = setup();

    app.oneshot(track_request("GET", "/api/track?linkedin"))
        .await
        .expect("request");

    assert_eq!(
        sink.events()[0].attribution.source.as_deref(),
        Some("linkedin")
    );
}

// ============================================================
// BDD: explicit utm_source wins over a bare marker
// ============================================================
#[tokio::test]
async fn test_track_explicit_source_beats_marker() {
    let (sink, app) = setup();

    app.oneshot(track_request(
        "GET",
        "/api/track?utm_source=direct&linkedin&utm_medium=social",
    ))
    .await
    .expect("request");

    let event = &sink.events()[0];
    assert_eq!(event.attribution.source.as_deref(), Some("direct"));
    assert_eq!(event.attribution.medium.as_deref(), Some("social"));
}

// ============================================================
// BDD: missing X-Forwarded-For records the "unknown" sentinel
// ============================================================
#[tokio::test]
async fn test_track_without_forwarded_for_is_unknown() {
    let (sink, app) = setup_with_policy(ClientIdPolicy::Hashed);

    let request = Request::builder()
        .method("GET")
        .uri("/api/track?event=page_view")
        .body(Body::empty())
        .expect("build request");
    let response = app.oneshot(request).await.expect("request");
    assert_eq!(response.status(), StatusCode::OK);

    let event = &sink.events()[0];
    assert_eq!(event.client_identifier, "unknown");
    assert_eq!(event.user_agent, None);
    assert_eq!(event.referrer, None);
}

// ============================================================
// BDD: the hashed policy never records the raw address
// ============================================================
#[tokio::test]
async fn test_track_hashed_policy_hides_address() {
    let (sink, app) = setup_with_policy(ClientIdPolicy::Hashed);

    app.oneshot(track_request("GET", "/api/track"))
        .await
        .expect("request");

    let id = sink.events()[0].client_identifier.clone();
    assert_ne!(id, "1.2.3.4");
    assert_eq!(id.len(), 16);
    assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
}

// ============================================================
// BDD: an unparseable request URL yields 500, not a crash
// ============================================================
#[tokio::test]
async fn test_track_malformed_url_returns_500() {
    let (sink, app) = setup();

    let request = Request::builder()
        .method("GET")
        .uri("/api/track?event=page_view")
        .header("host", "[::1")
        .body(Body::empty())
        .expect("build request");
    let response = app.oneshot(request).await.expect("request");
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        json_body(response).await,
        json!({ "error": "Internal Server Error" })
    );
    assert!(sink.events().is_empty());
}

// ============================================================
// BDD: a failing sink surfaces as 500 with the same body
// ============================================================
#[tokio::test]
async fn test_track_sink_failure_returns_500() {
    let site = SiteContent::builtin().expect("builtin site content");
    let mut state = AppState::new(test_config(ClientIdPolicy::Raw), site).expect("app state");
    state.sink = Arc::new(FailingSink);
    let app = build_app(Arc::new(state));

    let response = app
        .oneshot(track_request("GET", "/api/track"))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(response).await["error"], "Internal Server Error");
}
