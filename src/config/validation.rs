//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check referential integrity (routes reference existing clusters)
//! - Validate value ranges (ports non-zero, durations parsable)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: Bootstrap → Result<(), Vec<ValidationError>>
//! - Runs before a document is turned into a topology

use std::time::Duration;

use thiserror::Error;

use crate::config::schema::{Bootstrap, SocketAddress};

/// A single semantic problem in the bootstrap document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("static_resources.listeners is empty")]
    NoListeners,
    #[error("listener '{0}' has no filter chain with a filter")]
    NoFilter(String),
    #[error("route config has no virtual hosts")]
    NoVirtualHosts,
    #[error("static_resources.clusters is empty")]
    NoClusters,
    #[error("duplicate cluster name '{0}'")]
    DuplicateCluster(String),
    #[error("route '{prefix}' in virtual host '{virtual_host}' targets unknown cluster '{cluster}'")]
    UnknownCluster {
        virtual_host: String,
        prefix: String,
        cluster: String,
    },
    #[error("{field}: empty host")]
    EmptyHost { field: String },
    #[error("{field}: port must be non-zero")]
    ZeroPort { field: String },
    #[error("cluster '{cluster}': invalid connect_timeout '{value}'")]
    InvalidTimeout { cluster: String, value: String },
}

/// Validate a parsed bootstrap document.
pub fn validate_config(config: &Bootstrap) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let resources = &config.static_resources;

    if let Some(admin) = &config.admin {
        check_bind(&admin.address.socket_address, "admin.address", &mut errors);
    }

    match resources.listeners.first() {
        None => errors.push(ValidationError::NoListeners),
        Some(listener) => {
            check_bind(
                &listener.address.socket_address,
                &format!("listener '{}'", listener.name),
                &mut errors,
            );

            let filter = listener
                .filter_chains
                .first()
                .and_then(|chain| chain.filters.first());

            match filter {
                None => errors.push(ValidationError::NoFilter(listener.name.clone())),
                Some(filter) => {
                    let virtual_hosts = &filter.typed_config.route_config.virtual_hosts;
                    if virtual_hosts.is_empty() {
                        errors.push(ValidationError::NoVirtualHosts);
                    }
                    for vh in virtual_hosts {
                        for route in &vh.routes {
                            let known = resources
                                .clusters
                                .iter()
                                .any(|c| c.name == route.route.cluster);
                            if !known {
                                errors.push(ValidationError::UnknownCluster {
                                    virtual_host: vh.name.clone(),
                                    prefix: route.match_.prefix.clone(),
                                    cluster: route.route.cluster.clone(),
                                });
                            }
                        }
                    }
                }
            }
        }
    }

    if resources.clusters.is_empty() {
        errors.push(ValidationError::NoClusters);
    }

    for (i, cluster) in resources.clusters.iter().enumerate() {
        if resources.clusters[..i].iter().any(|c| c.name == cluster.name) {
            errors.push(ValidationError::DuplicateCluster(cluster.name.clone()));
        }

        if let Some(value) = &cluster.connect_timeout {
            if parse_duration(value).is_none() {
                errors.push(ValidationError::InvalidTimeout {
                    cluster: cluster.name.clone(),
                    value: value.clone(),
                });
            }
        }

        let endpoints = cluster
            .load_assignment
            .endpoints
            .iter()
            .flat_map(|locality| locality.lb_endpoints.iter());
        for (n, lb_endpoint) in endpoints.enumerate() {
            check_socket(
                &lb_endpoint.endpoint.address.socket_address,
                &format!("cluster '{}' endpoint {}", cluster.name, n),
                &mut errors,
            );
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Bind addresses may use port 0 (ephemeral).
fn check_bind(socket: &SocketAddress, field: &str, errors: &mut Vec<ValidationError>) {
    if socket.address.trim().is_empty() {
        errors.push(ValidationError::EmptyHost { field: field.to_string() });
    }
}

fn check_socket(socket: &SocketAddress, field: &str, errors: &mut Vec<ValidationError>) {
    check_bind(socket, field, errors);
    if socket.port_value == 0 {
        errors.push(ValidationError::ZeroPort { field: field.to_string() });
    }
}

/// Parse a bootstrap duration: `"5s"`, `"0.25s"`, `"250ms"`.
pub fn parse_duration(value: &str) -> Option<Duration> {
    let value = value.trim();
    let (number, scale) = if let Some(ms) = value.strip_suffix("ms") {
        (ms, 1e-3)
    } else if let Some(s) = value.strip_suffix('s') {
        (s, 1.0)
    } else {
        return None;
    };

    let secs: f64 = number.trim().parse().ok()?;
    if !secs.is_finite() || secs < 0.0 {
        return None;
    }
    Duration::try_from_secs_f64(secs * scale).ok()
}
