//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! bootstrap file (YAML)
//!     → loader.rs (parse & deserialize into schema.rs types)
//!     → validation.rs (semantic checks)
//!     → topology.rs (immutable Topology + BackendSet)
//!     → shared via Arc with the router
//!
//! On reload signal (watcher.rs or admin trigger):
//!     reload.rs → loader.rs loads new document
//!     → new load balancer built from the new BackendSet
//!     → atomic swap of the router's active pair
//! ```
//!
//! # Design Decisions
//! - Topology is immutable once loaded; changes require full reload
//! - A failed reload keeps the previous topology
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod reload;
pub mod schema;
pub mod settings;
pub mod topology;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, load_config_str, ConfigError, LoadedConfig};
pub use reload::Reloader;
pub use settings::ProxySettings;
pub use topology::{Cluster, Endpoint, HostPort, Listener, Route, RouteTable, Topology, VirtualHost};

#[cfg(test)]
pub(crate) mod fixtures {
    pub const SAMPLE: &str = r#"
admin:
  address:
    socket_address: { address: 127.0.0.1, port_value: 9901 }
static_resources:
  listeners:
    - name: listener_0
      address:
        socket_address: { address: 0.0.0.0, port_value: 8000 }
      filter_chains:
        - filters:
            - name: envoy.filters.network.http_connection_manager
              typed_config:
                "@type": type.googleapis.com/envoy.extensions.filters.network.http_connection_manager.v3.HttpConnectionManager
                stat_prefix: ingress_http
                codec_type: AUTO
                route_config:
                  name: local_route
                  virtual_hosts:
                    - name: local_service
                      domains: ["*"]
                      routes:
                        - match: { prefix: "/service1" }
                          route: { cluster: service_cluster }
                        - match: { prefix: "/" }
                          route: { cluster: service_cluster }
  clusters:
    - name: service_cluster
      connect_timeout: 0.25s
      type: STRICT_DNS
      lb_policy: LEAST_CONNECTIONS
      load_assignment:
        cluster_name: service_cluster
        endpoints:
          - lb_endpoints:
              - endpoint:
                  address:
                    socket_address: { address: h1, port_value: 80 }
              - endpoint:
                  address:
                    socket_address: { address: h2, port_value: 80 }
"#;
}
