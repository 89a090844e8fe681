//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, HeaderValue, Method, StatusCode, Uri},
    response::IntoResponse,
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use mesh_proxy::config::ProxySettings;
use mesh_proxy::lifecycle::{start, RunningProxy};
use mesh_proxy::observability::metrics::NoopSink;

#[derive(Clone)]
struct Backend {
    name: &'static str,
    delay: Duration,
}

async fn echo(
    State(backend): State<Backend>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Json<Value> {
    if !backend.delay.is_zero() {
        tokio::time::sleep(backend.delay).await;
    }

    let test_headers: Vec<&str> = headers
        .get_all("x-test")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect();

    Json(json!({
        "backend": backend.name,
        "method": method.as_str(),
        "path": uri.path(),
        "query": uri.query(),
        "body": String::from_utf8_lossy(&body),
        "x_test": test_headers,
        "request_id": headers.get("x-request-id").and_then(|v| v.to_str().ok()),
    }))
}

/// Start a mock backend that echoes the request as JSON, tagged with `name`.
pub async fn start_backend(name: &'static str) -> SocketAddr {
    start_slow_backend(name, Duration::ZERO).await
}

/// Like `start_backend`, but sleeps `delay` before answering.
pub async fn start_slow_backend(name: &'static str, delay: Duration) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = Router::new().fallback(echo).with_state(Backend { name, delay });

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

/// Start a backend that always answers 418 with two `x-custom` values and a
/// fixed JSON body.
pub async fn start_teapot_backend() -> SocketAddr {
    async fn teapot() -> impl IntoResponse {
        let mut headers = HeaderMap::new();
        headers.append("x-custom", HeaderValue::from_static("one"));
        headers.append("x-custom", HeaderValue::from_static("two"));
        (StatusCode::IM_A_TEAPOT, headers, Json(json!({ "k": 1, "tags": ["a", "b"] })))
    }

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = Router::new().fallback(teapot);

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

/// An address nothing listens on.
pub async fn unused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// Render a bootstrap document with ephemeral listener and admin ports.
pub fn bootstrap_yaml(backends: &[SocketAddr], policy: &str, prefixes: &[&str]) -> String {
    let routes: String = prefixes
        .iter()
        .map(|p| {
            format!(
                "                        - match: {{ prefix: \"{}\" }}\n                          route: {{ cluster: test_cluster }}\n",
                p
            )
        })
        .collect();

    let endpoints: String = backends
        .iter()
        .map(|a| {
            format!(
                "              - endpoint:\n                  address:\n                    socket_address: {{ address: {}, port_value: {} }}\n",
                a.ip(),
                a.port()
            )
        })
        .collect();

    format!(
        r#"admin:
  address:
    socket_address: {{ address: 127.0.0.1, port_value: 0 }}
static_resources:
  listeners:
    - name: listener_test
      address:
        socket_address: {{ address: 127.0.0.1, port_value: 0 }}
      filter_chains:
        - filters:
            - name: envoy.filters.network.http_connection_manager
              typed_config:
                stat_prefix: ingress_http
                route_config:
                  name: local_route
                  virtual_hosts:
                    - name: test_service
                      domains: ["*"]
                      routes:
{routes}  clusters:
    - name: test_cluster
      connect_timeout: 0.25s
      lb_policy: {policy}
      load_assignment:
        cluster_name: test_cluster
        endpoints:
          - lb_endpoints:
{endpoints}"#
    )
}

/// Write `contents` to a fresh temp file.
pub fn write_config(contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("mesh-proxy-it-{}.yaml", uuid::Uuid::new_v4()));
    std::fs::write(&path, contents).unwrap();
    path
}

/// Start a proxy over the bootstrap at `path`.
pub async fn start_proxy(path: PathBuf, watch: bool) -> RunningProxy {
    start_proxy_with(ProxySettings {
        config_path: path,
        request_timeout: Duration::from_secs(10),
        watch_config: watch,
        ..ProxySettings::default()
    })
    .await
}

/// Start a proxy with explicit settings.
pub async fn start_proxy_with(settings: ProxySettings) -> RunningProxy {
    start(settings, Arc::new(NoopSink)).await.unwrap()
}

/// HTTP client that ignores any proxy environment variables.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

/// GET `path` on the proxy and return (status, JSON body or Null).
pub async fn get(proxy: &RunningProxy, path: &str) -> (u16, Value) {
    let res = client()
        .get(format!("http://{}{}", proxy.proxy_addr, path))
        .send()
        .await
        .unwrap();
    let status = res.status().as_u16();
    let body = res.json().await.unwrap_or(Value::Null);
    (status, body)
}

/// Which backend answered a load-balanced request.
pub async fn lb_backend(proxy: &RunningProxy) -> String {
    let (status, body) = get(proxy, "/?endpoint=lb").await;
    assert_eq!(status, 200);
    body["backend"].as_str().unwrap().to_string()
}
