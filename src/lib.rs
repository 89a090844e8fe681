//! Config-driven HTTP reverse proxy.
//!
//! Reads an envoy-style YAML bootstrap, resolves each request to a backend
//! either by explicit `endpoint=N` index or through a round-robin /
//! least-connections balancer, and hot-swaps its routing state when the
//! bootstrap changes.

// Core subsystems
pub mod config;
pub mod error;
pub mod http;
pub mod routing;

// Traffic management
pub mod load_balancer;

// Cross-cutting concerns
pub mod admin;
pub mod lifecycle;
pub mod observability;

pub use config::{ProxySettings, Topology};
pub use error::ProxyError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::Router;
