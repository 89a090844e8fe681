//! Per-request error taxonomy and its HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Errors that terminate a single proxied request.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// Malformed request input, e.g. a non-integer `endpoint` value.
    #[error("{0}")]
    BadRequest(String),

    /// No route matched, the cluster is empty, or an index is out of range.
    #[error("{0}")]
    RouteNotFound(String),

    /// Connection or transport failure talking to the backend.
    #[error("upstream request failed: {0}")]
    Upstream(#[from] hyper_util::client::legacy::Error),

    /// The backend answered but its body could not be read.
    #[error("failed to read upstream response: {0}")]
    ResponseRead(#[source] axum::Error),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ProxyError::RouteNotFound(_) => StatusCode::NOT_FOUND,
            ProxyError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ProxyError::ResponseRead(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}
