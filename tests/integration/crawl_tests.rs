//! Integration tests for the crawl engine
//!
//! These tests use wiremock to create mock HTTP servers and drive the
//! engine end-to-end against an in-memory store.

use driftnet::config::{Config, NonHtmlPolicy};
use driftnet::crawler::Engine;
use driftnet::state::LinkStatus;
use driftnet::storage::{SqliteStorage, Storage};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration with a short fetch timeout
fn create_test_config() -> Config {
    let mut config = Config::default();
    config.crawler.request_timeout_ms = 2000;
    config.user_agent.crawler_name = "TestBot".to_string();
    config.user_agent.crawler_version = "1.0.0".to_string();
    config
}

struct Harness {
    store: Arc<Mutex<SqliteStorage>>,
    engine: Engine<SqliteStorage>,
    cancel: CancellationToken,
    seed: String,
}

impl Harness {
    fn new(config: &Config, seed: &str) -> Self {
        let store = Arc::new(Mutex::new(SqliteStorage::new_in_memory().unwrap()));
        let cancel = CancellationToken::new();
        let mut engine = Engine::new(Arc::clone(&store), config, cancel.clone()).unwrap();
        let seed = engine.seed(seed).unwrap();
        Self {
            store,
            engine,
            cancel,
            seed,
        }
    }

    fn status(&self, url: &str) -> Option<LinkStatus> {
        self.store
            .lock()
            .unwrap()
            .find_link(url)
            .unwrap()
            .map(|link| link.status)
    }
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body, "text/html; charset=utf-8")
}

#[tokio::test]
async fn test_single_iteration_records_origins_and_tags() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(format!(
            r#"<html><head>
                <title>Home</title>
                <meta name="description" content="Rust systems programming">
            </head><body>
                <h1>Fast Networking</h1>
                <a href="http://b.example/x">b</a>
                <a href="{}/y">y</a>
            </body></html>"#,
            base_url
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut harness = Harness::new(&create_test_config(), &base_url);
    assert_eq!(harness.seed, base_url);

    // Stop after exactly one iteration
    harness.cancel.cancel();
    let summary = harness.engine.run().await.unwrap();

    assert_eq!(summary.iterations, 1);
    assert_eq!(summary.done, 1);
    assert_eq!(summary.links_discovered, 1);
    assert!(summary.stopped);

    assert_eq!(harness.status(&base_url), Some(LinkStatus::Done));
    assert_eq!(harness.status("http://b.example"), Some(LinkStatus::Pending));
    assert_eq!(harness.status(&format!("{}/y", base_url)), None);
    assert_eq!(harness.status("http://b.example/x"), None);

    let store = harness.store.lock().unwrap();
    assert_eq!(store.count_links().unwrap(), 2);
    for tag in ["rust", "systems", "programming", "fast", "networking"] {
        let record = store
            .find_tag(tag)
            .unwrap()
            .unwrap_or_else(|| panic!("tag {} should exist", tag));
        assert!(record.urls.contains(&base_url));
    }
    assert!(store.find_tag("and").unwrap().is_none());
    assert!(store.find_tag("the").unwrap().is_none());
}

#[tokio::test]
async fn test_not_found_is_unavailable_and_never_refilled() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut harness = Harness::new(&create_test_config(), &mock_server.uri());
    let summary = harness.engine.run().await.unwrap();

    assert_eq!(summary.iterations, 1);
    assert_eq!(summary.unavailable, 1);
    assert!(!summary.stopped);
    assert_eq!(harness.status(&harness.seed), Some(LinkStatus::Unavailable));
    assert!(harness
        .store
        .lock()
        .unwrap()
        .find_pending_links()
        .unwrap()
        .is_empty());

    // A second run finds nothing to do
    let summary = harness.engine.run().await.unwrap();
    assert_eq!(summary.iterations, 0);
}

#[tokio::test]
async fn test_non_html_left_pending() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(vec![0x89, b'P', b'N', b'G'], "image/png"),
        )
        .mount(&mock_server)
        .await;

    let mut harness = Harness::new(&create_test_config(), &mock_server.uri());
    harness.cancel.cancel();
    let summary = harness.engine.run().await.unwrap();

    assert_eq!(summary.iterations, 1);
    assert_eq!(summary.deferred, 1);

    let store = harness.store.lock().unwrap();
    let link = store.find_link(&harness.seed).unwrap().unwrap();
    assert_eq!(link.status, LinkStatus::Pending);
    assert_eq!(link.attempts, 0);
    assert_eq!(store.count_tags().unwrap(), 0);

    let pending: Vec<String> = store
        .find_pending_links()
        .unwrap()
        .into_iter()
        .map(|link| link.url)
        .collect();
    assert_eq!(pending, vec![harness.seed.clone()]);
}

#[tokio::test]
async fn test_non_html_skip_policy() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(b"%PDF-1.4".to_vec(), "application/pdf"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut config = create_test_config();
    config.crawler.non_html = NonHtmlPolicy::Skip;

    let mut harness = Harness::new(&config, &mock_server.uri());
    let summary = harness.engine.run().await.unwrap();

    assert_eq!(summary.iterations, 1);
    assert_eq!(summary.skipped, 1);
    assert!(!summary.stopped);
    assert_eq!(harness.status(&harness.seed), Some(LinkStatus::Skipped));
}

#[tokio::test]
async fn test_timeout_leaves_link_pending() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(html("<html></html>".to_string()).set_delay(Duration::from_secs(3)))
        .mount(&mock_server)
        .await;

    let mut config = create_test_config();
    config.crawler.request_timeout_ms = 100;

    let mut harness = Harness::new(&config, &mock_server.uri());
    harness.cancel.cancel();
    let summary = harness.engine.run().await.unwrap();

    assert_eq!(summary.retried, 1);
    let link = harness
        .store
        .lock()
        .unwrap()
        .find_link(&harness.seed)
        .unwrap()
        .unwrap();
    assert_eq!(link.status, LinkStatus::Pending);
    assert_eq!(link.attempts, 1);
    assert!(link.retry_after.is_none());
}

#[tokio::test]
async fn test_max_attempts_escalates_to_unavailable() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(html("<html></html>".to_string()).set_delay(Duration::from_secs(3)))
        .mount(&mock_server)
        .await;

    let mut config = create_test_config();
    config.crawler.request_timeout_ms = 100;
    config.crawler.max_attempts = Some(2);

    let mut harness = Harness::new(&config, &mock_server.uri());
    let summary = harness.engine.run().await.unwrap();

    assert_eq!(summary.iterations, 2);
    assert_eq!(summary.retried, 1);
    assert_eq!(summary.unavailable, 1);

    let link = harness
        .store
        .lock()
        .unwrap()
        .find_link(&harness.seed)
        .unwrap()
        .unwrap();
    assert_eq!(link.status, LinkStatus::Unavailable);
    assert_eq!(link.attempts, 2);
}

#[tokio::test]
async fn test_backoff_hides_failed_link() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(html("<html></html>".to_string()).set_delay(Duration::from_secs(3)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut config = create_test_config();
    config.crawler.request_timeout_ms = 100;
    config.crawler.retry_backoff_ms = 3_600_000;

    let mut harness = Harness::new(&config, &mock_server.uri());
    let summary = harness.engine.run().await.unwrap();

    // The link is not due again, so the backlog runs dry
    assert_eq!(summary.iterations, 1);
    assert!(!summary.stopped);

    let link = harness
        .store
        .lock()
        .unwrap()
        .find_link(&harness.seed)
        .unwrap()
        .unwrap();
    assert_eq!(link.status, LinkStatus::Pending);
    assert!(link.retry_after.is_some());
}

#[tokio::test]
async fn test_discovered_origins_are_crawled_next() {
    let first = MockServer::start().await;
    let second = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(html(format!(
            r#"<a href="{}/about">second</a><a href="{}/img.png">self</a>"#,
            second.uri(),
            first.uri()
        )))
        .expect(1)
        .mount(&first)
        .await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            "<html><head><title>Second Site</title></head></html>".to_string(),
        ))
        .expect(1)
        .mount(&second)
        .await;

    let mut harness = Harness::new(&create_test_config(), &first.uri());
    let summary = harness.engine.run().await.unwrap();

    assert_eq!(summary.iterations, 2);
    assert_eq!(summary.done, 2);
    assert_eq!(harness.status(&first.uri()), Some(LinkStatus::Done));
    assert_eq!(harness.status(&second.uri()), Some(LinkStatus::Done));

    let tag = harness.store.lock().unwrap().find_tag("second").unwrap().unwrap();
    assert!(tag.urls.contains(&second.uri()));
}
