//! Route lookup and backend resolution.
//!
//! # Responsibilities
//! - Hold the active (topology, load balancer) pair
//! - Resolve each request to a backend URL, either by explicit endpoint index
//!   or by asking the load balancer
//! - Let the reload path replace the pair atomically
//!
//! # Design Decisions
//! - The pair lives in one `ArcSwap<RoutingState>`: a reader does a single
//!   atomic load and never sees a topology from one generation with a
//!   balancer from another
//! - A resolved request keeps its target even if a reload lands mid-flight
//! - Explicit NotFound / BadRequest rather than panics or silent defaults

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwap;
use axum::http::{header, Request, Uri};

use crate::config::loader::LoadedConfig;
use crate::config::topology::{RouteTable, Topology, VirtualHost};
use crate::error::ProxyError;
use crate::load_balancer::{self, backend::BackendSet, LoadBalancer};
use crate::routing::matcher::{DomainMatcher, PathPrefixMatcher};

/// Query parameter selecting an explicit endpoint.
pub const ENDPOINT_PARAM: &str = "endpoint";

/// Sentinel value of `endpoint` requesting load-balanced selection.
pub const LOAD_BALANCED: &str = "lb";

/// One generation of routing state.
#[derive(Debug)]
pub struct RoutingState {
    pub topology: Arc<Topology>,
    pub backends: BackendSet,
    pub balancer: Arc<dyn LoadBalancer>,
    pub generation: u64,
}

/// How a backend was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Explicit(usize),
    Balanced,
}

/// A request resolved to a concrete backend.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// Full outbound URI (backend base + path + query).
    pub target: Uri,
    /// Backend base URL, used for logs and metrics.
    pub backend: String,
    pub selection: Selection,
    pub generation: u64,
}

/// Holds the active routing state and resolves requests against it.
#[derive(Debug)]
pub struct Router {
    active: ArcSwap<RoutingState>,
    generations: AtomicU64,
}

impl Router {
    /// Build a router from an initial configuration (generation 1).
    pub fn new(loaded: LoadedConfig) -> Self {
        let state = Self::build_state(loaded, 1);
        Self {
            active: ArcSwap::from_pointee(state),
            generations: AtomicU64::new(1),
        }
    }

    /// Replace the active pair with one built from `loaded`.
    /// Returns the new generation number.
    pub fn install(&self, loaded: LoadedConfig) -> u64 {
        let generation = self.generations.fetch_add(1, Ordering::SeqCst) + 1;
        let state = Self::build_state(loaded, generation);
        self.active.store(Arc::new(state));
        generation
    }

    fn build_state(loaded: LoadedConfig, generation: u64) -> RoutingState {
        let policy = loaded
            .topology
            .active_cluster()
            .map(|c| c.lb_policy)
            .unwrap_or_default();
        let balancer = load_balancer::build(policy, &loaded.backends);

        tracing::debug!(
            generation,
            policy = %policy,
            backends = loaded.backends.len(),
            "Routing state built"
        );

        RoutingState {
            topology: Arc::new(loaded.topology),
            backends: loaded.backends,
            balancer,
            generation,
        }
    }

    /// The currently active routing state.
    pub fn current(&self) -> Arc<RoutingState> {
        self.active.load_full()
    }

    /// Resolve a request to a backend URL.
    pub fn resolve<B>(&self, req: &Request<B>) -> Result<Resolution, ProxyError> {
        let state = self.current();
        let uri = req.uri();

        match endpoint_param(uri) {
            Some(value) if value != LOAD_BALANCED => {
                let index: usize = value.parse().map_err(|_| {
                    ProxyError::BadRequest(format!("invalid endpoint index: '{}'", value))
                })?;
                resolve_explicit(&state, req, index)
            }
            _ => resolve_balanced(&state, uri),
        }
    }
}

fn endpoint_param(uri: &Uri) -> Option<String> {
    let query = uri.query()?;
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == ENDPOINT_PARAM)
        .map(|(_, value)| value.into_owned())
}

fn request_host<B>(req: &Request<B>) -> Option<&str> {
    req.headers()
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .or_else(|| req.uri().host())
}

/// First virtual host whose domains match `host`, else the first one declared.
pub fn select_virtual_host<'a>(table: &'a RouteTable, host: Option<&str>) -> Option<&'a VirtualHost> {
    host.and_then(|host| {
        table
            .virtual_hosts
            .iter()
            .find(|vh| vh.domains.iter().any(|d| DomainMatcher::new(d.as_str()).matches(host)))
    })
    .or_else(|| table.virtual_hosts.first())
}

fn resolve_explicit<B>(
    state: &RoutingState,
    req: &Request<B>,
    index: usize,
) -> Result<Resolution, ProxyError> {
    let path = req.uri().path();
    let virtual_host = select_virtual_host(&state.topology.listener.route_table, request_host(req))
        .ok_or_else(|| ProxyError::RouteNotFound("no virtual host configured".to_string()))?;

    let (route, suffix) = virtual_host
        .routes
        .iter()
        .find_map(|route| {
            PathPrefixMatcher::new(&route.path_prefix)
                .strip(path)
                .map(|suffix| (route, suffix))
        })
        .ok_or_else(|| ProxyError::RouteNotFound(format!("no route matches '{}'", path)))?;

    let cluster = state.topology.cluster(&route.target_cluster).ok_or_else(|| {
        ProxyError::RouteNotFound(format!("cluster '{}' not found", route.target_cluster))
    })?;

    let endpoint = cluster.endpoints.get(index).ok_or_else(|| {
        ProxyError::RouteNotFound(format!(
            "endpoint index {} out of range for cluster '{}' ({} endpoints)",
            index,
            cluster.name,
            cluster.endpoints.len()
        ))
    })?;

    let backend = endpoint.base_url();
    let target = compose_target(&backend, suffix, req.uri().query())?;

    tracing::debug!(
        path = %path,
        prefix = %route.path_prefix,
        cluster = %cluster.name,
        index,
        target = %target,
        "Resolved explicit endpoint"
    );

    Ok(Resolution {
        target,
        backend,
        selection: Selection::Explicit(index),
        generation: state.generation,
    })
}

fn resolve_balanced(state: &RoutingState, uri: &Uri) -> Result<Resolution, ProxyError> {
    let backend = state
        .balancer
        .select_next()
        .ok_or_else(|| ProxyError::RouteNotFound("no backends available".to_string()))?;
    let target = compose_target(&backend, uri.path(), uri.query())?;

    Ok(Resolution {
        target,
        backend,
        selection: Selection::Balanced,
        generation: state.generation,
    })
}

/// Join a base URL (ending in `/`), a path remainder and an optional query.
fn compose_target(base: &str, path: &str, query: Option<&str>) -> Result<Uri, ProxyError> {
    let mut target = format!("{}{}", base, path.strip_prefix('/').unwrap_or(path));
    if let Some(query) = query {
        target.push('?');
        target.push_str(query);
    }
    target
        .parse()
        .map_err(|_| ProxyError::BadRequest(format!("invalid request target: {}", target)))
}
