//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::Bootstrap;
use crate::config::topology::Topology;
use crate::config::validation::{validate_config, ValidationError};
use crate::load_balancer::backend::BackendSet;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// A successfully loaded configuration: the topology and the backend set of
/// the active cluster.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub topology: Topology,
    pub backends: BackendSet,
}

/// Load and validate a bootstrap document from a YAML file.
pub fn load_config(path: &Path) -> Result<LoadedConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    load_config_str(&content)
}

/// Load and validate a bootstrap document from YAML text.
pub fn load_config_str(content: &str) -> Result<LoadedConfig, ConfigError> {
    let doc: Bootstrap = serde_yaml::from_str(content)?;
    validate_config(&doc).map_err(ConfigError::Validation)?;

    let topology = Topology::from_bootstrap(&doc)
        .ok_or_else(|| ConfigError::Validation(vec![ValidationError::NoListeners]))?;
    let backends = topology
        .active_cluster()
        .map(BackendSet::from_cluster)
        .unwrap_or_default();

    Ok(LoadedConfig { topology, backends })
}
