//! Startup orchestration.
//!
//! # Responsibilities
//! - Load and validate the bootstrap document
//! - Build the router, reloader and HTTP server in dependency order
//! - Bind the proxy and admin listeners
//! - Start background tasks (file watcher, SIGHUP reload)

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use notify::RecommendedWatcher;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::admin::{serve_admin, AdminState};
use crate::config::topology::HostPort;
use crate::config::watcher::{run_reload_loop, ConfigWatcher};
use crate::config::{load_config, ConfigError, ProxySettings, Reloader};
use crate::http::HttpServer;
use crate::lifecycle::{signals, Shutdown};
use crate::observability::metrics::{init_metrics, MetricsSink, PrometheusSink};
use crate::routing::Router;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to load configuration from {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: ConfigError,
    },

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to watch configuration: {0}")]
    Watch(#[from] notify::Error),
}

/// A started proxy: listeners bound, tasks running.
pub struct RunningProxy {
    pub proxy_addr: SocketAddr,
    pub admin_addr: Option<SocketAddr>,
    pub router: Arc<Router>,
    pub reloader: Arc<Reloader>,
    shutdown: Shutdown,
    tasks: Vec<JoinHandle<()>>,
    _watcher: Option<RecommendedWatcher>,
}

impl RunningProxy {
    /// Handle that stops every task of this proxy when triggered.
    pub fn shutdown_handle(&self) -> Shutdown {
        self.shutdown.clone()
    }

    /// Wait until every task has exited.
    pub async fn wait(self) {
        for task in self.tasks {
            if let Err(e) = task.await {
                tracing::error!(error = %e, "Proxy task panicked");
            }
        }
    }
}

async fn bind(address: &HostPort) -> Result<TcpListener, StartupError> {
    TcpListener::bind((address.host.as_str(), address.port))
        .await
        .map_err(|source| StartupError::Bind {
            address: address.to_string(),
            source,
        })
}

/// Load the bootstrap document, bind listeners and spawn all tasks.
pub async fn start(settings: ProxySettings, metrics: Arc<dyn MetricsSink>) -> Result<RunningProxy, StartupError> {
    let loaded = load_config(&settings.config_path).map_err(|source| StartupError::Config {
        path: settings.config_path.clone(),
        source,
    })?;

    let listener_address = loaded.topology.listener.address.clone();
    let admin_address = loaded.topology.admin.clone();
    metrics.set_backend_count(loaded.backends.len());

    let router = Arc::new(Router::new(loaded));
    let reloader = Arc::new(Reloader::new(
        settings.config_path.clone(),
        router.clone(),
        metrics.clone(),
    ));

    {
        let active = router.current();
        tracing::info!(
            listener = %active.topology.listener.name,
            policy = %active.balancer.policy(),
            backends = active.backends.len(),
            generation = active.generation,
            "Configuration loaded"
        );
    }

    let proxy_listener = bind(&listener_address).await?;
    let proxy_addr = proxy_listener.local_addr().map_err(|source| StartupError::Bind {
        address: listener_address.to_string(),
        source,
    })?;

    let admin_listener = match &admin_address {
        Some(address) => Some(bind(address).await?),
        None => {
            tracing::info!("No admin address configured, admin API disabled");
            None
        }
    };
    let admin_addr = admin_listener.as_ref().and_then(|l| l.local_addr().ok());

    let (watcher, changes) = if settings.watch_config {
        let (watcher, changes) = ConfigWatcher::new(&settings.config_path);
        (Some(watcher.run()?), Some(changes))
    } else {
        (None, None)
    };

    let shutdown = Shutdown::new();
    let mut tasks = Vec::new();

    let server = HttpServer::new(router.clone(), &settings, metrics);
    let server_shutdown = shutdown.subscribe();
    tasks.push(tokio::spawn(async move {
        if let Err(e) = server.run(proxy_listener, server_shutdown).await {
            tracing::error!(error = %e, "HTTP server failed");
        }
    }));

    if let Some(listener) = admin_listener {
        let state = AdminState {
            router: router.clone(),
            reloader: reloader.clone(),
            api_key: settings.admin_api_key.as_deref().map(Arc::from),
        };
        let admin_shutdown = shutdown.subscribe();
        tasks.push(tokio::spawn(async move {
            if let Err(e) = serve_admin(listener, state, admin_shutdown).await {
                tracing::error!(error = %e, "Admin API failed");
            }
        }));
    }

    if let Some(changes) = changes {
        tasks.push(tokio::spawn(run_reload_loop(
            reloader.clone(),
            changes,
            shutdown.subscribe(),
        )));
    }

    tasks.push(tokio::spawn(signals::reload_on_hangup(
        reloader.clone(),
        shutdown.subscribe(),
    )));

    Ok(RunningProxy {
        proxy_addr,
        admin_addr,
        router,
        reloader,
        shutdown,
        tasks,
        _watcher: watcher,
    })
}

/// Run the proxy until Ctrl-C or SIGTERM.
pub async fn run(settings: ProxySettings) -> Result<(), StartupError> {
    if let Some(addr) = settings.metrics_address {
        init_metrics(addr);
    }

    let proxy = start(settings, Arc::new(PrometheusSink)).await?;
    tokio::spawn(signals::shutdown_on_signal(proxy.shutdown_handle()));

    proxy.wait().await;
    tracing::info!("Shutdown complete");
    Ok(())
}
