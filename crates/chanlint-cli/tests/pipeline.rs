//! Pipeline tests with remote repositories served by wiremock.

use std::path::Path;
use std::time::Duration;

use chanlint_cli::pipeline;
use chanlint_core::{LinkCheckConfig, RunConfig};
use chanlint_remote::LinkStatus;
use chanlint_report::Verdict;
use serde_json::json;
use tokio::sync::watch;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn write_channel(dir: &Path, repositories: &[String]) -> std::path::PathBuf {
    let entries: Vec<String> = repositories.iter().map(|r| format!("\t\t\"{r}\"")).collect();
    let text = format!(
        "{{\n\t\"schema_version\": \"3.0.0\",\n\t\"repositories\": [\n{}\n\t]\n}}\n",
        entries.join(",\n")
    );
    let path = dir.join("channel.json");
    std::fs::write(&path, text).unwrap();
    path
}

fn config(channel: std::path::PathBuf, timeout: Duration) -> RunConfig {
    RunConfig {
        channel: Some(channel),
        repository: None,
        links: LinkCheckConfig {
            enabled: true,
            concurrency: 3,
            timeout,
            ..LinkCheckConfig::default()
        },
    }
}

async fn run(config: &RunConfig) -> chanlint_report::Report {
    let (_tx, rx) = watch::channel(false);
    pipeline::run(config, rx).await.unwrap()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn three_repositories_one_timing_out_fails_the_run() {
    let server = MockServer::start().await;
    for route in ["/a.json", "/b.json"] {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"schema_version": "3.0.0", "packages": []})),
            )
            .mount(&server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path("/c.json"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let urls: Vec<String> = ["/a.json", "/b.json", "/c.json"]
        .iter()
        .map(|r| format!("{}{r}", server.uri()))
        .collect();
    let channel = write_channel(dir.path(), &urls);

    let report = run(&config(channel, Duration::from_millis(300))).await;

    assert_eq!(report.links.len(), 3);
    let reachable = report.links.iter().filter(|l| l.reachable()).count();
    let unreachable = report
        .links
        .iter()
        .filter(|l| l.status == LinkStatus::Unreachable)
        .count();
    assert_eq!((reachable, unreachable), (2, 1));
    assert_eq!(report.verdict, Verdict::Fail);
    assert_eq!(report.exit_code, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn reachable_remote_repositories_are_validated() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repo.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "schema_version": "3.0.0",
            "packages": [{
                "name": "Remote",
                "details": "https://github.com/owner/Remote",
                "releases": [{"tags": true}]
            }]
        })))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let url = format!("{}/repo.json", server.uri());
    let channel = write_channel(dir.path(), std::slice::from_ref(&url));

    let report = run(&config(channel, Duration::from_secs(5))).await;

    assert!(report.links[0].reachable());
    let remote = report
        .documents
        .iter()
        .find(|d| d.document == url)
        .expect("remote document has issues");
    assert_eq!(remote.issues.len(), 1);
    assert_eq!(remote.issues[0].location.as_str(), "/packages/0/releases/0");
    assert_eq!(report.verdict, Verdict::Fail);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn legacy_remote_repository_is_skipped_and_noted() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/old.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"schema_version": "1.2", "packages": []})))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let channel = write_channel(dir.path(), &[format!("{}/old.json", server.uri())]);
    let report = run(&config(channel, Duration::from_secs(5))).await;

    assert_eq!(report.links[0].status, LinkStatus::Skipped);
    assert!(report
        .skipped
        .iter()
        .any(|note| note.to_string() == "1 repositories with schema version 1.2 not checked"));
}
