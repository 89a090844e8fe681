//! mesh-proxy
//!
//! ```text
//!     Client Request
//!     ───────────────▶ http server ──▶ routing (vhost, prefix, endpoint=N | lb)
//!                                             │
//!                                             ▼
//!                                       load_balancer
//!                                             │
//!     Client Response                         ▼
//!     ◀─────────────── forwarder ◀──────── backend
//!
//!     config file ──▶ watcher / admin reload / SIGHUP ──▶ swap (topology, balancer)
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use mesh_proxy::config::ProxySettings;
use mesh_proxy::lifecycle;
use mesh_proxy::observability::logging::init_logging;

#[derive(Parser, Debug)]
#[command(name = "mesh-proxy", version, about = "Config-driven HTTP reverse proxy")]
struct Args {
    /// Path of the YAML bootstrap document
    #[arg(short, long, default_value = "config/static.yaml")]
    config: PathBuf,

    /// Deadline for a whole proxied request, in seconds
    #[arg(long, default_value_t = 30)]
    request_timeout_secs: u64,

    /// Largest backend response body relayed, in bytes
    #[arg(long, default_value_t = 64 * 1024 * 1024)]
    max_response_bytes: usize,

    /// Bearer token required by the admin API
    #[arg(long, env = "MESH_PROXY_ADMIN_KEY")]
    admin_key: Option<String>,

    /// Address for the Prometheus scrape endpoint
    #[arg(long)]
    metrics_address: Option<SocketAddr>,

    /// Disable reloading on bootstrap file changes
    #[arg(long)]
    no_watch: bool,
}

impl From<Args> for ProxySettings {
    fn from(args: Args) -> Self {
        Self {
            config_path: args.config,
            request_timeout: Duration::from_secs(args.request_timeout_secs),
            max_response_bytes: args.max_response_bytes,
            admin_api_key: args.admin_key,
            metrics_address: args.metrics_address,
            watch_config: !args.no_watch,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let settings = ProxySettings::from(Args::parse());
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = ?settings.config_path,
        request_timeout_secs = settings.request_timeout.as_secs(),
        "mesh-proxy starting"
    );

    if let Err(e) = lifecycle::run(settings).await {
        tracing::error!(error = %e, "Startup failed");
        return Err(e.into());
    }
    Ok(())
}
