//! In-memory topology built from a validated bootstrap document.
//!
//! Listener → route table → virtual hosts → routes, plus the clusters the
//! routes point at. A topology is never mutated after construction; a reload
//! builds a new one.

use std::fmt;
use std::net::Ipv6Addr;
use std::time::Duration;

use crate::config::schema::{Bootstrap, SocketAddress};
use crate::config::validation::parse_duration;
use crate::load_balancer::LbPolicy;

/// Immutable snapshot of the parsed bootstrap document.
#[derive(Debug, Clone, PartialEq)]
pub struct Topology {
    /// Admin surface address, if configured.
    pub admin: Option<HostPort>,
    /// The single active listener (`listeners[0]`).
    pub listener: Listener,
    /// All declared clusters, in declaration order.
    pub clusters: Vec<Cluster>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Listener {
    pub name: String,
    pub address: HostPort,
    pub route_table: RouteTable,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RouteTable {
    pub virtual_hosts: Vec<VirtualHost>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VirtualHost {
    pub name: String,
    pub domains: Vec<String>,
    /// Ordered; the first matching prefix wins.
    pub routes: Vec<Route>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub path_prefix: String,
    pub target_cluster: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    pub name: String,
    pub lb_policy: LbPolicy,
    pub connect_timeout: Option<Duration>,
    /// Flattened across localities, in declaration order.
    pub endpoints: Vec<Endpoint>,
}

/// A single backend's host and port.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

/// A bind address taken from the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostPort {
    pub host: String,
    pub port: u16,
}

impl fmt::Display for HostPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

impl From<&SocketAddress> for HostPort {
    fn from(socket: &SocketAddress) -> Self {
        Self {
            host: socket.address.clone(),
            port: socket.port_value,
        }
    }
}

impl Endpoint {
    /// Base URL of this endpoint, always ending in `/`.
    ///
    /// IPv6 literals are bracketed.
    pub fn base_url(&self) -> String {
        if self.host.parse::<Ipv6Addr>().is_ok() {
            format!("http://[{}]:{}/", self.host, self.port)
        } else {
            format!("http://{}:{}/", self.host, self.port)
        }
    }
}

impl Topology {
    /// Build a topology from a bootstrap document.
    ///
    /// Expects a document that already passed `validate_config`; missing
    /// nesting yields `None` rather than a panic.
    pub fn from_bootstrap(doc: &Bootstrap) -> Option<Self> {
        let listener_spec = doc.static_resources.listeners.first()?;
        let filter = listener_spec.filter_chains.first()?.filters.first()?;

        let virtual_hosts = filter
            .typed_config
            .route_config
            .virtual_hosts
            .iter()
            .map(|vh| VirtualHost {
                name: vh.name.clone(),
                domains: vh.domains.clone(),
                routes: vh
                    .routes
                    .iter()
                    .map(|r| Route {
                        path_prefix: r.match_.prefix.clone(),
                        target_cluster: r.route.cluster.clone(),
                    })
                    .collect(),
            })
            .collect();

        let clusters = doc
            .static_resources
            .clusters
            .iter()
            .map(|c| Cluster {
                name: c.name.clone(),
                lb_policy: LbPolicy::from_config(c.lb_policy.as_deref()),
                connect_timeout: c.connect_timeout.as_deref().and_then(parse_duration),
                endpoints: c
                    .load_assignment
                    .endpoints
                    .iter()
                    .flat_map(|locality| locality.lb_endpoints.iter())
                    .map(|lb| Endpoint {
                        host: lb.endpoint.address.socket_address.address.clone(),
                        port: lb.endpoint.address.socket_address.port_value,
                    })
                    .collect(),
            })
            .collect();

        Some(Self {
            admin: doc.admin.as_ref().map(|a| HostPort::from(&a.address.socket_address)),
            listener: Listener {
                name: listener_spec.name.clone(),
                address: HostPort::from(&listener_spec.address.socket_address),
                route_table: RouteTable { virtual_hosts },
            },
            clusters,
        })
    }

    /// The cluster that feeds the load balancer (`clusters[0]`).
    pub fn active_cluster(&self) -> Option<&Cluster> {
        self.clusters.first()
    }

    /// Look up a cluster by name.
    pub fn cluster(&self, name: &str) -> Option<&Cluster> {
        self.clusters.iter().find(|c| c.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_brackets_ipv6() {
        let v6 = Endpoint { host: "::1".into(), port: 8080 };
        assert_eq!(v6.base_url(), "http://[::1]:8080/");

        let v4 = Endpoint { host: "10.0.0.2".into(), port: 80 };
        assert_eq!(v4.base_url(), "http://10.0.0.2:80/");

        let named = Endpoint { host: "backend.local".into(), port: 80 };
        assert_eq!(named.base_url(), "http://backend.local:80/");
    }
}
