//! Outbound request execution.
//!
//! # Responsibilities
//! - Rebuild the inbound request against the resolved backend URI
//! - Copy method, body and every header (multi-value order preserved)
//! - Relay the backend's status, headers and body unchanged
//!
//! # Design Decisions
//! - One attempt per request; no retry, no fallback backend
//! - `Host` is not copied: the client derives it from the target URI
//! - The response body is read fully before it is relayed, so a body read
//!   failure can still be reported as a 500
//! - Cancellation is by drop: when the inbound request is abandoned or times
//!   out, the forwarding future is dropped and the outbound call with it

use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, Response, Uri};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};

use crate::error::ProxyError;

/// Shared outbound HTTP client.
pub type HttpClient = Client<HttpConnector, Body>;

/// Forwards requests to backends.
#[derive(Debug, Clone)]
pub struct Forwarder {
    client: HttpClient,
    max_response_bytes: usize,
}

impl Forwarder {
    /// Create a forwarder whose connector uses `connect_timeout`.
    pub fn new(connect_timeout: Option<Duration>, max_response_bytes: usize) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(connect_timeout);

        let client = Client::builder(TokioExecutor::new()).build(connector);
        Self {
            client,
            max_response_bytes,
        }
    }

    /// Send `request` to `target` and return the backend's response.
    pub async fn forward(&self, request: Request<Body>, target: Uri) -> Result<Response<Body>, ProxyError> {
        let (parts, body) = request.into_parts();

        let mut builder = Request::builder().method(parts.method).uri(target);
        if let Some(headers) = builder.headers_mut() {
            for (name, value) in parts.headers.iter() {
                if name == header::HOST {
                    continue;
                }
                headers.append(name.clone(), value.clone());
            }
        }
        let outbound = builder
            .body(body)
            .map_err(|e| ProxyError::BadRequest(format!("invalid outbound request: {}", e)))?;

        let response = self.client.request(outbound).await?;

        let (parts, body) = response.into_parts();
        let bytes = axum::body::to_bytes(Body::new(body), self.max_response_bytes)
            .await
            .map_err(ProxyError::ResponseRead)?;

        Ok(Response::from_parts(parts, Body::from(bytes)))
    }
}
