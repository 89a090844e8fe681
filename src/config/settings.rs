//! Process-level settings that live outside the bootstrap document.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Runtime knobs supplied on the command line.
#[derive(Debug, Clone)]
pub struct ProxySettings {
    /// Path of the bootstrap document.
    pub config_path: PathBuf,

    /// Deadline for a whole proxied request; the outbound call is dropped
    /// when it expires.
    pub request_timeout: Duration,

    /// Largest backend response body that will be buffered and relayed.
    pub max_response_bytes: usize,

    /// Bearer token required by the admin surface, if set.
    pub admin_api_key: Option<String>,

    /// Prometheus exporter bind address; no exporter when unset.
    pub metrics_address: Option<SocketAddr>,

    /// Reload on bootstrap file changes.
    pub watch_config: bool,
}

impl Default for ProxySettings {
    fn default() -> Self {
        Self {
            config_path: PathBuf::from("config/static.yaml"),
            request_timeout: Duration::from_secs(30),
            max_response_bytes: 64 * 1024 * 1024, // 64MB
            admin_api_key: None,
            metrics_address: None,
            watch_config: true,
        }
    }
}
