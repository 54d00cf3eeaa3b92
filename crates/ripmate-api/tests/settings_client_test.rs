// Integration tests for `ApiClient` using wiremock.

use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ripmate_api::{ApiClient, Error, Settings};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, ApiClient) {
    let server = MockServer::start().await;
    let client = ApiClient::from_reqwest(&server.uri(), reqwest::Client::new()).unwrap();
    (server, client)
}

fn sample_settings() -> Settings {
    Settings {
        download_path: "/downloads".into(),
        max_threads: 4,
        auto_start: true,
        v_login: true,
        v_username: "ripper".into(),
        v_password: "hunter2".into(),
        v_thanks: false,
        desktop_clipboard: true,
    }
}

// ── Happy-path tests ────────────────────────────────────────────────

#[tokio::test]
async fn test_get_settings() {
    let (server, client) = setup().await;

    let body = json!({
        "downloadPath": "/d",
        "maxThreads": 4,
        "autoStart": true,
        "vLogin": false,
        "vUsername": "",
        "vPassword": "",
        "vThanks": false,
        "desktopClipboard": true
    });

    Mock::given(method("GET"))
        .and(path("/settings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let settings = client.get_settings().await.unwrap();

    assert_eq!(settings.download_path, "/d");
    assert_eq!(settings.max_threads, 4);
    assert!(settings.auto_start);
    assert!(!settings.v_login);
    assert!(settings.desktop_clipboard);
}

#[tokio::test]
async fn test_post_settings_echoes_normalized_record() {
    let (server, client) = setup().await;

    let sent = sample_settings();

    // Server normalizes: trailing slash stripped from the download path.
    let response_body = json!({
        "downloadPath": "/downloads",
        "maxThreads": 4,
        "autoStart": true,
        "vLogin": true,
        "vUsername": "ripper",
        "vPassword": "hunter2",
        "vThanks": false,
        "desktopClipboard": true
    });

    Mock::given(method("POST"))
        .and(path("/settings"))
        .and(body_json(&sent))
        .respond_with(ResponseTemplate::new(200).set_body_json(&response_body))
        .mount(&server)
        .await;

    let saved = client.post_settings(&sent).await.unwrap();

    assert_eq!(saved, sent);
}

#[tokio::test]
async fn test_post_links() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/post"))
        .and(body_json(json!({ "links": "https://example.com/gallery" })))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    client
        .post_links("https://example.com/gallery")
        .await
        .unwrap();
}

// ── Error tests ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_error_400_with_message_body() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/settings"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "message": "Invalid thread count" })),
        )
        .mount(&server)
        .await;

    let err = client.post_settings(&sample_settings()).await.unwrap_err();

    // The toast shows the server message verbatim, no decoration.
    assert_eq!(err.user_message(), "Invalid thread count");

    match err {
        Error::Api { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "Invalid thread count");
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_error_500_without_body_falls_back() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/settings"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let result = client.get_settings().await;

    match result {
        Err(Error::Api {
            status,
            ref message,
        }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "HTTP 500");
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_transport_error_on_unreachable_server() {
    // Dropping a wiremock server does not reliably close its port (pooled
    // servers keep listening; shutdown is async). Bind and synchronously
    // drop a plain listener to get a port that refuses connections.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let uri = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let client = ApiClient::from_reqwest(&uri, reqwest::Client::new()).unwrap();
    let result = client.get_settings().await;

    match result {
        Err(e @ Error::Transport(_)) => assert!(e.is_transient()),
        other => panic!("expected Transport error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_success_body() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/settings"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let result = client.get_settings().await;

    match result {
        Err(Error::Deserialization { ref body, .. }) => assert_eq!(body, "not json"),
        other => panic!("expected Deserialization error, got: {other:?}"),
    }
}
