//! Integration tests using mock HTTP server
//!
//! Tests the full end-to-end flow: client configuration → real HTTP exchange
//! → stored result → response helpers.
//!
//! The client is blocking, so every exchange runs inside `spawn_blocking`
//! while the mock server keeps serving on the runtime.

use reqkit::http::ReqwestTransport;
use reqkit::{
    oneshot, Client, ClientConfig, FailureKind, FilePart, Method, RequestBody, SaveOutcome,
};
use serde_json::json;
use wiremock::matchers::{body_json, body_string, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn blocking<T, F>(f: F) -> T
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    tokio::task::spawn_blocking(f).await.unwrap()
}

// ============================================================================
// Auth and content negotiation
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn test_bearer_get_json() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/users"))
        .and(header("Authorization", "Bearer test-token"))
        .and(header("Accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "users": [
                {"id": 1, "name": "Alice"},
                {"id": 2, "name": "Bob"}
            ]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let url = format!("{}/api/users", mock_server.uri());
    let (status, data, tls) = blocking(move || {
        let mut client = Client::new();
        client.bearer(false, "json", "json", "test-token");
        let status = client.get(&url).status_code;
        (status, client.response().as_map(), client.tls_verified())
    })
    .await;

    assert_eq!(status, 200);
    assert_eq!(data["users"][1]["name"], "Bob");
    assert!(!tls);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_api_key_and_custom_headers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/items/7"))
        .and(header("X-API-Key", "k-123"))
        .and(header("X-Tenant", "acme"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let url = format!("{}/api/items/7", mock_server.uri());
    let result = blocking(move || {
        let mut client = Client::new();
        client
            .key(false, "json", "json", "k-123")
            .custom_headers([("X-Tenant", "acme")]);
        client.delete(&url).clone()
    })
    .await;

    assert_eq!(result.status_code, 204);
    assert!(result.is_success());
}

// ============================================================================
// Body encoding
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn test_post_json_body_with_length() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/items"))
        .and(header("Content-Type", "application/json"))
        .and(header("Content-Length", "17"))
        .and(body_json(json!({"name": "widget"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 42})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let url = format!("{}/api/items", mock_server.uri());
    let (result, id) = blocking(move || {
        let mut client = Client::new();
        client.bearer(true, "json", "json", "t");
        let result = client.post(&url, json!({"name": "widget"})).clone();
        let id = client.response().as_object().map(|o| o["id"].clone());
        (result, id)
    })
    .await;

    assert_eq!(result.status_code, 201);
    assert_eq!(result.content_length, Some(17));
    assert_eq!(id, Some(json!(42)));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_put_url_encoded_form() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/api/items/1"))
        .and(header("Content-Type", "application/x-www-form-urlencoded"))
        .and(body_string("name=widget&qty=2&tags%5B0%5D=a&tags%5B1%5D=b"))
        .respond_with(ResponseTemplate::new(200).set_body_string("updated"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let url = format!("{}/api/items/1", mock_server.uri());
    let (status, text) = blocking(move || {
        let mut client = Client::new();
        client.key(false, "url", "text", "k");
        let status = client
            .put(&url, json!({"name": "widget", "qty": 2, "tags": ["a", "b"]}))
            .status_code;
        (status, client.response().text())
    })
    .await;

    assert_eq!(status, 200);
    assert_eq!(text.as_deref(), Some("updated"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_post_xml_passthrough() {
    let mock_server = MockServer::start().await;
    let xml = r#"<?xml version="1.0"?><order id="1"/>"#;

    Mock::given(method("POST"))
        .and(path("/api/orders"))
        .and(header("Content-Type", "application/xml"))
        .and(body_string(xml))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&mock_server)
        .await;

    let url = format!("{}/api/orders", mock_server.uri());
    let status = blocking(move || {
        let mut client = Client::new();
        client.negotiate(false, "xml", "xml");
        client.post(&url, xml).status_code
    })
    .await;

    assert_eq!(status, 202);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_multipart_upload() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/upload"))
        .and(header("Authorization", "Bearer up"))
        .and(body_string_contains("filename=\"notes.txt\""))
        .and(body_string_contains("hello file"))
        .and(body_string_contains("name=\"title\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let url = format!("{}/api/upload", mock_server.uri());
    let (result, headers) = blocking(move || {
        let mut client = Client::new();
        client.bearer(false, "json", "json", "up");
        let body = RequestBody::fields()
            .field("title", "Notes")
            .file("doc", FilePart::new("notes.txt", "hello file").with_mime("text/plain"));
        let result = client.post(&url, body).clone();
        (result, client.headers().as_slice().to_vec())
    })
    .await;

    assert_eq!(result.status_code, 200);
    assert_eq!(result.content_length, None);
    assert!(!headers.iter().any(|h| h.starts_with("Content-Type")));
}

// ============================================================================
// Results
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn test_non_success_status_is_passed_through() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not here"))
        .mount(&mock_server)
        .await;

    let url = format!("{}/api/missing", mock_server.uri());
    let (result, wrapped) = blocking(move || {
        let mut client = Client::new();
        let result = client.get(&url).clone();
        (result, client.response().as_json_text())
    })
    .await;

    assert_eq!(result.status_code, 404);
    assert_eq!(result.failure, None);
    assert_eq!(result.transport_error, None);
    assert_eq!(wrapped, r#"{"data":"not here"}"#);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_redirects_are_followed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("Location", format!("{}/new", mock_server.uri())),
        )
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/new"))
        .respond_with(ResponseTemplate::new(200).set_body_string("moved"))
        .mount(&mock_server)
        .await;

    let url = format!("{}/old", mock_server.uri());
    let result = blocking(move || Client::new().get(&url).clone()).await;

    assert_eq!(result.status_code, 200);
    assert_eq!(result.body.as_deref(), Some(&b"moved"[..]));
}

/// Mount `/r0` .. `/r{hops-1}`, each redirecting to the next, ending at `/end`.
async fn mount_redirect_chain(server: &MockServer, hops: usize) {
    for i in 0..hops {
        let next = if i + 1 == hops {
            format!("{}/end", server.uri())
        } else {
            format!("{}/r{}", server.uri(), i + 1)
        };
        Mock::given(method("GET"))
            .and(path(format!("/r{i}")))
            .respond_with(ResponseTemplate::new(302).insert_header("Location", next))
            .mount(server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path("/end"))
        .respond_with(ResponseTemplate::new(200).set_body_string("arrived"))
        .mount(server)
        .await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_five_redirect_hops_are_followed() {
    let mock_server = MockServer::start().await;
    mount_redirect_chain(&mock_server, 5).await;

    let url = format!("{}/r0", mock_server.uri());
    let result = blocking(move || Client::new().get(&url).clone()).await;

    assert_eq!(result.status_code, 200);
    assert_eq!(result.failure, None);
    assert_eq!(result.body.as_deref(), Some(&b"arrived"[..]));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_sixth_redirect_hop_is_a_transport_failure() {
    let mock_server = MockServer::start().await;
    mount_redirect_chain(&mock_server, 6).await;

    let url = format!("{}/r0", mock_server.uri());
    let result = blocking(move || Client::new().get(&url).clone()).await;

    assert_eq!(result.status_code, 500);
    assert_eq!(result.failure, Some(FailureKind::Transport));
    assert!(result.body.is_none());
    assert!(result
        .transport_error
        .as_deref()
        .is_some_and(|e| e.contains("too many redirects")));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_custom_user_agent_is_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/whoami"))
        .and(header("User-Agent", "inventory-sync/2.1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let url = format!("{}/whoami", mock_server.uri());
    let status = blocking(move || {
        let transport = ReqwestTransport::new().with_user_agent("inventory-sync/2.1");
        Client::with_transport(transport).get(&url).status_code
    })
    .await;

    assert_eq!(status, 200);
}

#[test]
fn test_unreachable_host_folds_to_500() {
    let mut client = Client::new();
    let result = client.get("http://127.0.0.1:1/").clone();

    assert_eq!(result.status_code, 500);
    assert_eq!(result.failure, Some(FailureKind::Transport));
    assert!(result.body.is_none());
    assert!(result.transport_error.is_some());
    assert_eq!(client.request_count(), 1);
}

#[test]
fn test_invalid_url_never_sends() {
    let mut client = Client::new();
    let result = client.get("not a url").clone();

    assert_eq!(result.status_code, 500);
    assert_eq!(result.failure, Some(FailureKind::Validation));
    assert!(result
        .transport_error
        .as_deref()
        .is_some_and(|e| e.contains("not a url")));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_save_response_to_file() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/report"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"total":3}"#))
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("report.json");
    let url = format!("{}/api/report", mock_server.uri());

    let target = file.clone();
    let outcome = blocking(move || {
        let mut client = Client::new();
        client.get(&url);
        client.response().save_file(&target)
    })
    .await;

    assert!(matches!(outcome, SaveOutcome::Saved { .. }));
    assert_eq!(std::fs::read_to_string(&file).unwrap(), "{\n  \"total\": 3\n}");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_debug_snapshot_after_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let url = format!("{}/ping", mock_server.uri());
    let snapshot = blocking(move || {
        let mut client = Client::new();
        client.bearer(false, "json", "json", "super-secret");
        client.get(&url);
        client.get(&url);
        client.debug_snapshot()
    })
    .await;

    assert_eq!(snapshot.status_code, Some(200));
    assert_eq!(snapshot.request_count, 2);
    assert_eq!(snapshot.headers[0], "Authorization: [REDACTED]");
    assert!(!snapshot.to_string().contains("super-secret"));
}

// ============================================================================
// Configuration and one-shot requests
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn test_client_from_config() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(header("Authorization", "Bearer from-config"))
        .and(header("Accept", "text/plain"))
        .and(header("X-Trace-Id", "abc"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let yaml = r#"
auth:
  scheme: bearer
  token: from-config
content_type: json
accept: text
headers:
  X-Trace-Id: abc
"#;
    let url = mock_server.uri();
    let status = blocking(move || {
        let mut client = ClientConfig::from_yaml_str(yaml).unwrap().build().unwrap();
        client.get(&url).status_code
    })
    .await;

    assert_eq!(status, 200);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_oneshot_send() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/hook"))
        .and(header("X-Signature", "sig"))
        .and(body_json(json!({"event": "ping"})))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let url = format!("{}/hook", mock_server.uri());
    let result = blocking(move || {
        let headers = vec![
            "Content-Type: application/json".to_string(),
            "X-Signature: sig".to_string(),
        ];
        oneshot::send(
            &ReqwestTransport::new(),
            Method::POST,
            &url,
            &headers,
            false,
            json!({"event": "ping"}),
        )
    })
    .await;

    assert_eq!(result.status_code, 200);
    assert_eq!(result.body.as_deref(), Some(&b"ok"[..]));
}
