//! Endpoint parameter validation against an in-process server.

use std::net::SocketAddr;
use std::sync::Arc;

use mockito::Server;
use tokio::net::TcpListener;

use feedgen::ci::client::AppVeyorClient;
use feedgen::ci::collector::{ArtifactCollector, CiCaches};
use feedgen::feed::aggregator::FeedAggregator;
use feedgen::memo::FailurePolicy;
use feedgen::registry::probe::RegistryProbe;
use feedgen::registry::types::RegistrySource;
use feedgen::server::AppState;
use feedgen::server::routes::router;

/// Serve the API on an ephemeral port; upstream URLs point at `upstream`.
async fn spawn_app(upstream: &str, sources: Vec<RegistrySource>) -> SocketAddr {
    let client = Arc::new(AppVeyorClient::new(upstream, "t0ken"));
    let caches = Arc::new(CiCaches::new(FailurePolicy::Pin));
    let collector = Arc::new(ArtifactCollector::new(client, caches));

    let state = AppState {
        aggregator: Arc::new(FeedAggregator::new(
            collector,
            &format!("{upstream}/feed.json"),
            "https://cdn.example",
            "azure-functions-cli",
        )),
        probe: Arc::new(RegistryProbe::new(sources, vec!["Foo".to_string()])),
    };

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router(state)).await.unwrap();
    });
    addr
}

#[tokio::test]
async fn feed_without_build_parameter_is_a_client_error() {
    let upstream = Server::new_async().await;
    let addr = spawn_app(&upstream.url(), vec![]).await;

    let response = reqwest::get(format!("http://{addr}/api/feed")).await.unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(
        body["error"].as_str().unwrap().contains("build"),
        "unexpected error body: {body}"
    );
}

#[tokio::test]
async fn feed_with_duplicate_build_parameter_is_a_client_error() {
    let upstream = Server::new_async().await;
    let addr = spawn_app(&upstream.url(), vec![]).await;

    let response = reqwest::get(format!("http://{addr}/api/feed?build=1&build=2"))
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn packages_with_malformed_prerelease_flag_is_a_client_error() {
    let upstream = Server::new_async().await;
    let addr = spawn_app(&upstream.url(), vec![]).await;

    let response = reqwest::get(format!("http://{addr}/api/packages?preRelease=banana"))
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn packages_returns_one_report_per_registry() {
    let mut registry = Server::new_async().await;
    let registry_url = registry.url();

    registry
        .mock("GET", "/v3/index.json")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(format!(
            r#"{{"resources": [{{"@id": "{registry_url}/query", "@type": "SearchQueryService"}}]}}"#
        ))
        .create_async()
        .await;
    registry
        .mock("GET", "/query")
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"data": [{"versions": [{"version": "1.0.0"}]}]}"#)
        .create_async()
        .await;

    let upstream = Server::new_async().await;
    let sources = vec![RegistrySource {
        name: "test-feed".to_string(),
        index_url: format!("{registry_url}/v3/index.json"),
        gallery_template: None,
    }];
    let addr = spawn_app(&upstream.url(), sources).await;

    let response = reqwest::get(format!("http://{addr}/api/packages"))
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body[0]["registry"], "test-feed");
    assert_eq!(body[0]["packages"][0]["version"], "1.0.0");
}

#[tokio::test]
async fn upstream_failure_surfaces_as_a_server_error_with_a_message() {
    let mut upstream = Server::new_async().await;
    upstream
        .mock("GET", "/api/projects")
        .with_status(500)
        .with_body("boom")
        .create_async()
        .await;
    upstream
        .mock("GET", "/feed.json")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"releases": {}}"#)
        .create_async()
        .await;

    let addr = spawn_app(&upstream.url(), vec![]).await;

    let response = reqwest::get(format!("http://{addr}/api/feed?build=2.2.27"))
        .await
        .unwrap();

    assert_eq!(
        response.status(),
        reqwest::StatusCode::INTERNAL_SERVER_ERROR
    );
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["error"].as_str().is_some());
}
