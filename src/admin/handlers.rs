use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::admin::AdminState;
use crate::load_balancer::{BackendStat, LbPolicy};

#[derive(Debug, Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub generation: u64,
    pub listener: String,
    pub cluster: Option<String>,
    pub policy: LbPolicy,
    pub backends: usize,
    pub config_path: String,
}

#[derive(Debug, Serialize)]
pub struct ReloadOutcome {
    pub generation: u64,
}

#[derive(Debug, Serialize)]
pub struct ReloadFailure {
    pub error: String,
    /// Generation that remains active.
    pub generation: u64,
}

pub async fn get_status(State(state): State<AdminState>) -> Json<SystemStatus> {
    let active = state.router.current();
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        generation: active.generation,
        listener: active.topology.listener.address.to_string(),
        cluster: active.topology.active_cluster().map(|c| c.name.clone()),
        policy: active.balancer.policy(),
        backends: active.backends.len(),
        config_path: state.reloader.path().display().to_string(),
    })
}

pub async fn get_backends(State(state): State<AdminState>) -> Json<Vec<BackendStat>> {
    Json(state.router.current().balancer.snapshot())
}

pub async fn post_reload(State(state): State<AdminState>) -> Response {
    let reloader = state.reloader.clone();
    match tokio::task::spawn_blocking(move || reloader.reload()).await {
        Ok(Ok(generation)) => (StatusCode::OK, Json(ReloadOutcome { generation })).into_response(),
        Ok(Err(e)) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ReloadFailure {
                error: e.to_string(),
                generation: state.router.current().generation,
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Reload task failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::admin::{setup_admin_router, AdminState};
    use crate::config::fixtures::SAMPLE;
    use crate::config::{load_config_str, Reloader};
    use crate::observability::metrics::NoopSink;
    use crate::routing::Router;

    fn admin_state(path: PathBuf, api_key: Option<&str>) -> AdminState {
        let router = Arc::new(Router::new(load_config_str(SAMPLE).unwrap()));
        let reloader = Arc::new(Reloader::new(path, router.clone(), Arc::new(NoopSink)));
        AdminState {
            router,
            reloader,
            api_key: api_key.map(Arc::from),
        }
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_status_reports_active_state() {
        let app = setup_admin_router(admin_state(PathBuf::from("unused.yaml"), None));
        let response = app
            .oneshot(Request::get("/admin/status").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["generation"], 1);
        assert_eq!(json["policy"], "LEAST_CONNECTIONS");
        assert_eq!(json["backends"], 2);
        assert_eq!(json["cluster"], "service_cluster");
    }

    #[tokio::test]
    async fn test_backends_snapshot() {
        let app = setup_admin_router(admin_state(PathBuf::from("unused.yaml"), None));
        let response = app
            .oneshot(Request::get("/admin/backends").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let json = body_json(response).await;
        let list = json.as_array().unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0]["url"], "http://h1:80/");
        assert_eq!(list[0]["selections"], 0);
    }

    #[tokio::test]
    async fn test_auth_required_when_key_set() {
        let app = setup_admin_router(admin_state(PathBuf::from("unused.yaml"), Some("s3cret")));

        let response = app
            .clone()
            .oneshot(Request::get("/admin/status").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app
            .clone()
            .oneshot(
                Request::get("/admin/status")
                    .header("authorization", "Bearer wrong")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app
            .oneshot(
                Request::get("/admin/status")
                    .header("authorization", "Bearer s3cret")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_reload_failure_is_unprocessable() {
        let missing = std::env::temp_dir().join(format!("mesh-proxy-missing-{}.yaml", uuid::Uuid::new_v4()));
        let app = setup_admin_router(admin_state(missing, None));

        let response = app
            .oneshot(Request::post("/admin/reload").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let json = body_json(response).await;
        assert_eq!(json["generation"], 1);
        assert!(json["error"].as_str().unwrap().starts_with("IO error"));
    }

    #[tokio::test]
    async fn test_reload_installs_new_generation() {
        let path = std::env::temp_dir().join(format!("mesh-proxy-{}.yaml", uuid::Uuid::new_v4()));
        std::fs::write(&path, SAMPLE.replace("address: h2", "address: h9")).unwrap();
        let state = admin_state(path.clone(), None);
        let router = state.router.clone();

        let response = setup_admin_router(state)
            .oneshot(Request::post("/admin/reload").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["generation"], 2);
        assert!(router.current().backends.contains("http://h9:80/"));

        let _ = std::fs::remove_file(path);
    }
}
