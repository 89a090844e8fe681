//! The single reload path shared by the file watcher and the admin trigger.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use crate::config::loader::{load_config, ConfigError};
use crate::observability::metrics::MetricsSink;
use crate::routing::Router;

/// Reloads the bootstrap document and swaps it into the router.
pub struct Reloader {
    path: PathBuf,
    router: Arc<Router>,
    metrics: Arc<dyn MetricsSink>,
    /// Serializes reloads so generations are installed in order.
    in_progress: Mutex<()>,
}

impl Reloader {
    pub fn new(path: impl Into<PathBuf>, router: Arc<Router>, metrics: Arc<dyn MetricsSink>) -> Self {
        Self {
            path: path.into(),
            router,
            metrics,
            in_progress: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the document and, on success, install it as the active state.
    ///
    /// On failure the active state is left untouched.
    pub fn reload(&self) -> Result<u64, ConfigError> {
        let _guard = self.in_progress.lock().unwrap_or_else(PoisonError::into_inner);

        match load_config(&self.path) {
            Ok(loaded) => {
                let backend_count = loaded.backends.len();
                let generation = self.router.install(loaded);

                self.metrics.record_reload(true);
                self.metrics.set_backend_count(backend_count);
                tracing::info!(
                    path = ?self.path,
                    generation,
                    backends = backend_count,
                    "Configuration reloaded"
                );
                Ok(generation)
            }
            Err(e) => {
                self.metrics.record_reload(false);
                tracing::error!(
                    path = ?self.path,
                    error = %e,
                    "Failed to reload config. Keeping current configuration."
                );
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::fixtures::SAMPLE;
    use crate::config::loader::load_config_str;
    use crate::observability::metrics::NoopSink;
    use axum::body::Body;
    use axum::http::Request;

    fn temp_config(contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("mesh-proxy-{}.yaml", uuid::Uuid::new_v4()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn lb_backend(router: &Router) -> String {
        let req = Request::builder().uri("/").body(Body::empty()).unwrap();
        router.resolve(&req).unwrap().backend
    }

    #[test]
    fn test_reload_swaps_backends() {
        let path = temp_config(SAMPLE);
        let router = Arc::new(Router::new(load_config_str(SAMPLE).unwrap()));
        let reloader = Reloader::new(&path, router.clone(), Arc::new(NoopSink));

        std::fs::write(&path, SAMPLE.replace("address: h1", "address: h3").replace("address: h2", "address: h4")).unwrap();
        assert_eq!(reloader.reload().unwrap(), 2);

        for _ in 0..4 {
            let backend = lb_backend(&router);
            assert!(backend == "http://h3:80/" || backend == "http://h4:80/", "{}", backend);
        }
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_failed_reload_keeps_state() {
        let path = temp_config(SAMPLE);
        let router = Arc::new(Router::new(load_config_str(SAMPLE).unwrap()));
        let reloader = Reloader::new(&path, router.clone(), Arc::new(NoopSink));

        std::fs::write(&path, "static_resources: [this is not: valid").unwrap();
        assert!(matches!(reloader.reload(), Err(ConfigError::Parse(_))));
        assert_eq!(router.current().generation, 1);
        assert_eq!(lb_backend(&router), "http://h1:80/");

        let _ = std::fs::remove_file(&path);
        assert!(matches!(reloader.reload(), Err(ConfigError::Io(_))));
        assert_eq!(router.current().generation, 1);
    }
}
