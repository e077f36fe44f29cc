use std::io;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::Request;
use compscan_core::{RetryPolicy, TtlCache};
use compscan_places::{DetailResolver, LocationResolver, PlaceFinder, PlacesClient};
use compscan_scraper::{HostThrottle, PageFetcher, PageScraper, RegexPriceExtractor, ScrapeError};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;

/// Serves the same HTML for every URL.
struct StaticFetcher(&'static str);

#[async_trait]
impl PageFetcher for StaticFetcher {
    async fn fetch_html(&self, _url: &str) -> Result<String, ScrapeError> {
        Ok(self.0.to_owned())
    }
}

fn scanner_for(base_url: &str) -> Scanner {
    let client = Arc::new(
        PlacesClient::with_base_url("test-key", 2, base_url)
            .expect("client")
            .with_retry_policy(RetryPolicy::none()),
    );
    let cache = Arc::new(TtlCache::new());
    let scraper = PageScraper::new(
        Arc::new(StaticFetcher("<p>10x10 units from $99.00</p>")),
        Arc::new(RegexPriceExtractor),
        Arc::new(HostThrottle::new(Duration::ZERO)),
        Arc::clone(&cache),
        RetryPolicy::none(),
    );
    Scanner::new(
        LocationResolver::new(Arc::clone(&client)),
        PlaceFinder::new(Arc::clone(&client), Arc::clone(&cache), "self storage"),
        DetailResolver::new(client, cache),
        scraper,
    )
}

fn app_for(base_url: &str) -> Router {
    let state = AppState {
        scanner: Arc::new(scanner_for(base_url)),
    };
    build_app(state, build_cors("*").expect("cors"))
}

/// An app whose provider is unreachable; fine for requests that never scan.
fn offline_app() -> Router {
    app_for("http://127.0.0.1:9")
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_owned()))
        .expect("request")
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.expect("response");
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

/// Collects formatted log output written while the returned guard is alive.
#[derive(Clone, Default)]
struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().expect("log buffer").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl LogCapture {
    fn install(&self) -> tracing::subscriber::DefaultGuard {
        let writer = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::WARN)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().expect("log buffer")).into_owned()
    }
}

// ---------------------------------------------------------------------------
// ApiError / CORS
// ---------------------------------------------------------------------------

#[test]
fn api_error_codes_map_to_statuses() {
    let cases = [
        ("validation_error", StatusCode::BAD_REQUEST),
        ("bad_request", StatusCode::BAD_REQUEST),
        ("insufficient_data", StatusCode::BAD_REQUEST),
        ("upstream_error", StatusCode::BAD_GATEWAY),
        ("internal_error", StatusCode::INTERNAL_SERVER_ERROR),
    ];
    for (code, expected) in cases {
        let response = ApiError::new("req-1", code, "message").into_response();
        assert_eq!(response.status(), expected, "code {code}");
    }
}

#[test]
fn build_cors_accepts_wildcard_and_exact_origin() {
    assert!(build_cors("*").is_ok());
    assert!(build_cors("https://app.example.com").is_ok());
}

#[test]
fn build_cors_rejects_invalid_origin() {
    assert!(build_cors("https://bad\norigin").is_err());
}

// ---------------------------------------------------------------------------
// liveness
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_returns_ok_with_request_id() {
    let response = offline_app()
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key(REQUEST_ID_HEADER));
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let json: Value = serde_json::from_slice(&body).expect("json");
    assert_eq!(json, json!({ "status": "ok" }));
}

#[tokio::test]
async fn root_returns_plain_text() {
    let response = offline_app()
        .oneshot(Request::builder().uri("/").body(Body::empty()).expect("request"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    assert!(!body.is_empty());
}

// ---------------------------------------------------------------------------
// POST /scan validation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn scan_without_address_is_validation_error() {
    let (status, json) = send(
        offline_app(),
        post_json("/scan", r#"{"facilityName":"My Storage"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "validation_error");
    assert!(json["meta"]["request_id"].is_string());
}

#[tokio::test]
async fn scan_with_blank_address_is_validation_error() {
    let (status, json) = send(
        offline_app(),
        post_json("/scan", r#"{"facilityName":"My Storage","address":"   "}"#),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "validation_error");
}

#[tokio::test]
async fn scan_with_non_positive_radius_is_validation_error() {
    let (status, json) = send(
        offline_app(),
        post_json("/scan", r#"{"address":"1 Main St","radius":-5}"#),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "validation_error");
}

#[tokio::test]
async fn scan_with_malformed_json_is_bad_request() {
    let (status, json) = send(offline_app(), post_json("/scan", "{not json")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "bad_request");
}

// ---------------------------------------------------------------------------
// POST /scan against a mocked provider
// ---------------------------------------------------------------------------

async fn mount_geocode(server: &MockServer, body: Value) {
    Mock::given(method("GET"))
        .and(path("/maps/api/geocode/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn scan_returns_competitors() {
    let server = MockServer::start().await;
    mount_geocode(
        &server,
        json!({
            "status": "OK",
            "results": [{ "geometry": { "location": { "lat": 39.74, "lng": -104.99 } } }]
        }),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/maps/api/place/nearbysearch/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "OK",
            "results": [{
                "place_id": "place-a",
                "name": "Acme Self Storage",
                "vicinity": "100 Main St",
                "geometry": { "location": { "lat": 39.75, "lng": -104.99 } }
            }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/maps/api/place/details/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "OK",
            "result": { "website": "https://acme-storage.example.com/" }
        })))
        .mount(&server)
        .await;

    let (status, json) = send(
        app_for(&server.uri()),
        post_json(
            "/scan",
            r#"{"facilityName":"My Storage","address":"1600 Main St, Denver"}"#,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let competitors = json["competitors"].as_array().expect("competitors array");
    assert_eq!(competitors.len(), 1);
    assert_eq!(competitors[0]["placeId"], "place-a");
    assert_eq!(competitors[0]["price"], 99.0);
    assert_eq!(competitors[0]["unit"], "10x10");
    assert_eq!(competitors[0]["source"], "website_scrape");
}

#[tokio::test]
async fn scan_with_unresolvable_address_is_bad_request() {
    let server = MockServer::start().await;
    mount_geocode(&server, json!({ "status": "ZERO_RESULTS", "results": [] })).await;

    let (status, json) = send(
        app_for(&server.uri()),
        post_json("/scan", r#"{"address":"nowhere at all"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "bad_request");
    assert!(json["error"]["message"]
        .as_str()
        .is_some_and(|m| m.contains("nowhere at all")));
}

#[tokio::test]
async fn scan_with_provider_failure_is_upstream_error() {
    let server = MockServer::start().await;
    mount_geocode(
        &server,
        json!({ "status": "REQUEST_DENIED", "error_message": "invalid key" }),
    )
    .await;

    let (status, json) = send(
        app_for(&server.uri()),
        post_json("/scan", r#"{"address":"1600 Main St, Denver"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["error"]["code"], "upstream_error");
}

// ---------------------------------------------------------------------------
// POST /suggest
// ---------------------------------------------------------------------------

#[tokio::test]
async fn suggest_returns_recommendation() {
    let body = json!({
        "facilityName": "My Storage",
        "competitors": [
            { "name": "A", "price": 100 },
            { "name": "B", "price": 120 },
            { "name": "C", "price": 110 }
        ]
    });

    let (status, json) = send(offline_app(), post_json("/suggest", &body.to_string())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["recommendedPrice"], 103.4);
    assert_eq!(json["confidence"], 0.6);
    assert!(json["rationale"].is_string());
}

#[tokio::test]
async fn suggest_ignores_null_and_non_numeric_prices() {
    let body = json!({
        "competitors": [
            { "name": "A", "price": null },
            { "name": "B", "price": "call" },
            { "name": "C", "price": 50 }
        ]
    });

    let (status, json) = send(offline_app(), post_json("/suggest", &body.to_string())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["recommendedPrice"], 47.0);
}

#[tokio::test]
async fn suggest_without_usable_prices_is_insufficient_data() {
    let body = json!({
        "facilityName": "My Storage",
        "competitors": [{ "name": "A", "price": null }]
    });

    let (status, json) = send(offline_app(), post_json("/suggest", &body.to_string())).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "insufficient_data");
}

// ---------------------------------------------------------------------------
// rejected requests are logged
// ---------------------------------------------------------------------------

#[tokio::test]
async fn rejected_scan_request_is_logged_with_request_id() {
    let logs = LogCapture::default();
    let _guard = logs.install();

    let (status, json) = send(
        offline_app(),
        post_json("/scan", r#"{"facilityName":"My Storage"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let request_id = json["meta"]["request_id"].as_str().expect("request id");
    let output = logs.contents();
    assert!(output.contains("WARN"), "got: {output}");
    assert!(output.contains("without address"), "got: {output}");
    assert!(output.contains(request_id), "got: {output}");
}

#[tokio::test]
async fn insufficient_data_suggestion_is_logged() {
    let logs = LogCapture::default();
    let _guard = logs.install();

    let body = json!({ "competitors": [{ "name": "A", "price": "call" }] });
    let (status, _) = send(offline_app(), post_json("/suggest", &body.to_string())).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let output = logs.contents();
    assert!(output.contains("cannot suggest a price"), "got: {output}");
}

#[tokio::test]
async fn malformed_suggest_body_is_logged() {
    let logs = LogCapture::default();
    let _guard = logs.install();

    let (status, _) = send(offline_app(), post_json("/suggest", "[1, 2")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(logs.contents().contains("rejected malformed suggest request"));
}
