//! Router-level behaviour: health, fallback, limits, CORS and a real TCP serve loop.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    routing::post,
    Router,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio_util::sync::CancellationToken;
use tower::util::ServiceExt;

use api_ingress::{ApiIngress, ApiIngressConfig};

async fn accept_body(body: String) -> String {
    format!("{} bytes", body.len())
}

fn app(config: ApiIngressConfig) -> Router {
    let routes = Router::new().route("/upload", post(accept_body));
    ApiIngress::new(config).build_router(routes)
}

#[tokio::test]
async fn health_reports_healthy() {
    let response = app(ApiIngressConfig::default())
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "healthy");
    assert!(json["timestamp"].is_string());
}

#[tokio::test]
async fn unknown_route_is_a_problem_document() {
    let response = app(ApiIngressConfig::default())
        .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/problem+json"
    );
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["code"], "ROUTE_NOT_FOUND");
    assert_eq!(json["instance"], "/nope");
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let router = app(ApiIngressConfig {
        body_limit_bytes: 8,
        ..Default::default()
    });

    let response = router
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/upload")
                .header(header::CONTENT_TYPE, "text/plain")
                .body(Body::from("this is far more than eight bytes"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn cors_headers_follow_config() {
    let preflight = || {
        Request::builder()
            .method(Method::OPTIONS)
            .uri("/upload")
            .header(header::ORIGIN, "http://localhost:3000")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap()
    };

    let enabled = app(ApiIngressConfig::default())
        .oneshot(preflight())
        .await
        .unwrap();
    assert!(enabled
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));

    let disabled = app(ApiIngressConfig {
        cors_enabled: false,
        ..Default::default()
    })
    .oneshot(preflight())
    .await
    .unwrap();
    assert!(!disabled
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
}

#[tokio::test]
async fn serves_over_tcp_and_shuts_down() {
    let ingress = Arc::new(ApiIngress::new(ApiIngressConfig {
        bind_addr: "127.0.0.1:0".into(),
        ..Default::default()
    }));
    ingress.build_router(Router::new());

    let cancel = CancellationToken::new();
    let (tx, rx) = tokio::sync::oneshot::channel();
    let server = tokio::spawn(ingress.clone().serve(cancel.clone(), Some(tx)));
    let addr = rx.await.expect("server should report its address");

    let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"GET /health HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        .await
        .unwrap();
    let mut raw = String::new();
    stream.read_to_string(&mut raw).await.unwrap();
    assert!(raw.starts_with("HTTP/1.1 200"), "unexpected response: {raw}");
    assert!(raw.contains("healthy"));

    cancel.cancel();
    server.await.unwrap().unwrap();
}
