//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! Bootstrap loaded → clusters[0] → backend.rs (BackendSet, declaration order)
//!     → build() picks the algorithm from the cluster's lb_policy:
//!         - round_robin.rs (rotate through backends)
//!         - least_conn.rs (pick backend with the fewest recorded selections)
//!     → select_next() returns a backend base URL
//! ```
//!
//! # Design Decisions
//! - Each balancer owns its selection state behind one mutex; selection and
//!   state update happen under the same lock
//! - Reload builds a fresh balancer; state never migrates across reloads
//! - Unknown policies fall back to round robin

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

pub mod backend;
pub mod least_conn;
pub mod round_robin;

use self::backend::BackendSet;
use self::least_conn::LeastConnections;
use self::round_robin::RoundRobin;

/// Backend selection policy declared on a cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LbPolicy {
    #[default]
    RoundRobin,
    LeastConnections,
}

impl LbPolicy {
    /// Map the document's `lb_policy` value; anything unrecognized is round robin.
    pub fn from_config(value: Option<&str>) -> Self {
        match value {
            Some("LEAST_CONNECTIONS") => LbPolicy::LeastConnections,
            Some("ROUND_ROBIN") | None => LbPolicy::RoundRobin,
            Some(other) => {
                tracing::warn!(lb_policy = %other, "Unrecognized lb_policy, using ROUND_ROBIN");
                LbPolicy::RoundRobin
            }
        }
    }
}

impl fmt::Display for LbPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LbPolicy::RoundRobin => f.write_str("ROUND_ROBIN"),
            LbPolicy::LeastConnections => f.write_str("LEAST_CONNECTIONS"),
        }
    }
}

/// Per-backend view exposed to the admin surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackendStat {
    pub url: String,
    pub selections: u64,
}

/// A backend selection algorithm over one backend set.
pub trait LoadBalancer: Send + Sync + fmt::Debug {
    /// Pick the next backend base URL, or `None` if the set is empty.
    fn select_next(&self) -> Option<String>;

    /// Merge a new backend set into this instance.
    ///
    /// Survivors keep their order and state, removed backends are dropped,
    /// new backends are appended.
    fn report_update(&self, backends: &BackendSet);

    /// The policy this balancer implements.
    fn policy(&self) -> LbPolicy;

    /// Current backends with their recorded selection counts.
    fn snapshot(&self) -> Vec<BackendStat>;
}

/// Build a fresh balancer for `policy` over `backends`.
pub fn build(policy: LbPolicy, backends: &BackendSet) -> Arc<dyn LoadBalancer> {
    match policy {
        LbPolicy::RoundRobin => Arc::new(RoundRobin::new(backends)),
        LbPolicy::LeastConnections => Arc::new(LeastConnections::new(backends)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_parsing() {
        assert_eq!(LbPolicy::from_config(Some("ROUND_ROBIN")), LbPolicy::RoundRobin);
        assert_eq!(LbPolicy::from_config(Some("LEAST_CONNECTIONS")), LbPolicy::LeastConnections);
        assert_eq!(LbPolicy::from_config(Some("MAGLEV")), LbPolicy::RoundRobin);
        assert_eq!(LbPolicy::from_config(None), LbPolicy::RoundRobin);
    }

    #[test]
    fn test_build_selects_algorithm() {
        let set = BackendSet::from_urls(["http://a:1/", "http://b:1/"]);
        assert_eq!(build(LbPolicy::RoundRobin, &set).policy(), LbPolicy::RoundRobin);
        assert_eq!(
            build(LbPolicy::LeastConnections, &set).policy(),
            LbPolicy::LeastConnections
        );
    }
}
