//! Integration tests for the monitoring pipeline
//!
//! These tests use wiremock to serve a small page collection and drive
//! discovery, ranking, classification, monitoring and reporting end-to-end.

use pagewatch::config::{Config, OutputConfig, RankConfig, ServerConfig};
use pagewatch::crawler::{HttpPageSource, Monitor, MonitorState};
use pagewatch::output::{GraphReport, MarkdownReport, SqliteSnapshotRenderer};
use pagewatch::state::{GraphStore, PriorityTier};
use pagewatch::storage::{RunStatus, SqliteStorage, Storage};
use pagewatch::{classify, compute_ranks, PagewatchError};
use std::collections::HashSet;
use std::path::Path;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Renders a page the way the collection server does
fn page_html(id: &str, version: &str, history: &[(&str, &str)], links: &[&str]) -> String {
    let mut html = String::from("<html><body>\n");
    html.push_str(&format!("<div class=\"page-id\">Page ID: {}</div>\n", id));
    html.push_str(&format!(
        "<span class=\"node-id\">Node: <b>{}</b></span>\n",
        version
    ));

    html.push_str("<details><summary>History</summary><div>\n");
    for (version, timestamp) in history {
        html.push_str(&format!("<div>• {} ({})</div>\n", version, timestamp));
    }
    html.push_str("</div></details>\n");

    html.push_str("<table class=\"files-table\">\n");
    for link in links {
        html.push_str(&format!(
            "<tr><td><a class=\"file-link\" href=\"/{}\">{}</a></td></tr>\n",
            link, link
        ));
    }
    html.push_str("</table>\n</body></html>\n");
    html
}

fn html_response(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body, "text/html; charset=utf-8")
}

async fn mount_page(server: &MockServer, url_path: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(url_path))
        .respond_with(html_response(body))
        .mount(server)
        .await;
}

/// Serves a -> [b, c], b -> [a], c -> [] with `a` as the start page
async fn mount_collection(server: &MockServer, b_version: &str, b_history: &[(&str, &str)]) {
    mount_page(
        server,
        "/",
        "<html><body><div class=\"page-id\">Start page: a</div></body></html>".to_string(),
    )
    .await;
    mount_page(
        server,
        "/a",
        page_html("a", "a1", &[("a1", "2024-01-01 09:00:00")], &["b", "c"]),
    )
    .await;
    mount_page(server, "/b", page_html("b", b_version, b_history, &["a"])).await;
    mount_page(
        server,
        "/c",
        page_html("c", "c1", &[("c1", "2024-01-01 09:00:00")], &[]),
    )
    .await;
}

fn create_test_config(base_url: &str, dir: &Path) -> Config {
    Config {
        server: ServerConfig {
            base_url: base_url.to_string(),
            request_timeout_secs: 2,
        },
        output: OutputConfig {
            database_path: dir.join("pagewatch.db").display().to_string(),
            summary_path: dir.join("dashboard.md").display().to_string(),
            graph_path: dir.join("graph.dot").display().to_string(),
        },
        ..Config::default()
    }
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-5,
        "expected {} to be within 1e-5 of {}",
        actual,
        expected
    );
}

#[test]
fn test_golden_ranks_through_public_api() {
    let mut graph = GraphStore::new();
    graph.set_links("a", vec!["b".to_string(), "c".to_string()]);
    graph.set_links("b", vec!["a".to_string()]);
    graph.set_links("c", vec![]);

    let outcome = compute_ranks(&graph, &RankConfig::default());

    assert!(outcome.converged);
    assert_close(outcome.ranks["a"], 0.393621);
    assert_close(outcome.ranks["b"], 0.303194);
    assert_close(outcome.ranks["c"], 0.303194);

    let visited: HashSet<String> = graph.page_ids().cloned().collect();
    let tiers = classify(&visited, &outcome.ranks);
    assert_eq!(tiers.pages(PriorityTier::High), ["a".to_string()]);
    assert_eq!(tiers.len(), 3);
}

#[tokio::test]
async fn test_full_pipeline_against_mock_server() {
    let server = MockServer::start().await;
    mount_collection(&server, "b1", &[("b1", "2024-01-01 09:00:00")]).await;

    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(&server.uri(), dir.path());
    let db_path = Path::new(&config.output.database_path).to_path_buf();

    let mut storage = SqliteStorage::new(&db_path).unwrap();
    let run_id = storage.create_run("test-hash").unwrap();

    let source = HttpPageSource::new(&config.server).unwrap();
    let mut monitor = Monitor::new(source, &config);
    monitor.add_renderer(Box::new(
        MarkdownReport::new(&config.output.summary_path).with_run_id(run_id),
    ));
    monitor.add_renderer(Box::new(
        SqliteSnapshotRenderer::open(&db_path, run_id).unwrap(),
    ));
    monitor.add_renderer(Box::new(GraphReport::new(&config.output.graph_path)));

    monitor.start(&CancellationToken::new()).await.unwrap();
    assert_eq!(monitor.state(), MonitorState::Running);

    // Discovery
    let graph = monitor.crawler().graph();
    assert_eq!(graph.len(), 3);
    assert_eq!(graph.links("a").unwrap(), ["b".to_string(), "c".to_string()]);
    assert_eq!(graph.links("c").unwrap().len(), 0);

    // Ranks and tiers
    assert_close(monitor.ranks()["a"], 0.393621);
    assert_eq!(monitor.tiers().tier_of("a"), Some(PriorityTier::High));
    assert_eq!(monitor.tiers().len(), 3);

    // Initial reports
    let dashboard = std::fs::read_to_string(&config.output.summary_path).unwrap();
    assert!(dashboard.contains("- **Total Pages**: 3"));
    assert!(dashboard.contains("Most important page: **a**"));
    assert_eq!(storage.count_pages(run_id).unwrap(), 3);
    let dot = std::fs::read_to_string(&config.output.graph_path).unwrap();
    assert!(dot.contains("\"a\" -> \"b\";"));
    assert!(dot.contains("\"b\" -> \"a\";"));

    // Page b publishes a new version
    server.reset().await;
    mount_collection(
        &server,
        "b2",
        &[("b1", "2024-01-01 09:00:00"), ("b2", "2024-01-01 09:30:00")],
    )
    .await;

    let report = monitor.tick().await;
    assert_eq!(
        report.swept_tiers(),
        vec![PriorityTier::High, PriorityTier::Medium, PriorityTier::Low]
    );
    let checked: usize = report.sweeps.iter().map(|s| s.pages_checked).sum();
    assert_eq!(checked, 3);
    let updates: usize = report.sweeps.iter().map(|s| s.updates_found).sum();
    assert_eq!(updates, 1);
    assert_eq!(monitor.crawler().versions().current_version("b"), Some("b2"));

    monitor.shutdown();
    assert_eq!(monitor.state(), MonitorState::Stopped);
    storage.finish_run(run_id, RunStatus::Completed).unwrap();

    // Final reports
    let pages = storage.load_snapshot(run_id).unwrap();
    let b = pages.iter().find(|p| p.page_id == "b").unwrap();
    assert_eq!(b.current_version.as_deref(), Some("b2"));
    assert_eq!(b.history.len(), 2);
    assert_eq!(b.changes_observed, 1);

    let run = storage.get_run(run_id).unwrap();
    assert_eq!(run.status, RunStatus::Completed);
    assert!(run.last_snapshot_at.is_some());

    let dashboard = std::fs::read_to_string(&config.output.summary_path).unwrap();
    assert!(dashboard.contains("- **Changes Observed This Run**: 1"));
}

#[tokio::test]
async fn test_missing_start_page_is_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(&server.uri(), dir.path());
    let source = HttpPageSource::new(&config.server).unwrap();
    let mut monitor = Monitor::new(source, &config);

    let err = monitor.start(&CancellationToken::new()).await.unwrap_err();

    assert!(matches!(err, PagewatchError::NoStartPage { .. }));
    assert!(err.is_fatal_startup());
    assert_eq!(monitor.state(), MonitorState::Stopped);
    assert!(!Path::new(&config.output.summary_path).exists());
}

#[tokio::test]
async fn test_unreachable_start_page_yields_empty_graph() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        "<html><body><div class=\"page-id\">Start page: gone</div></body></html>".to_string(),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(&server.uri(), dir.path());
    let source = HttpPageSource::new(&config.server).unwrap();
    let mut monitor = Monitor::new(source, &config);

    let err = monitor.start(&CancellationToken::new()).await.unwrap_err();

    assert!(matches!(err, PagewatchError::EmptyGraph { ref start } if start == "gone"));
    assert!(err.is_fatal_startup());
    assert_eq!(monitor.state(), MonitorState::Stopped);
}
