//! Backend set abstraction.
//!
//! # Responsibilities
//! - Hold the ordered backend base URLs of one cluster
//! - Preserve declaration order (round-robin fairness, explicit indexing)
//! - Compute the merged order used by `report_update`

use crate::config::topology::Cluster;

/// Ordered backend base URLs (`http://host:port/`) derived from one cluster.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackendSet {
    urls: Vec<String>,
}

impl BackendSet {
    /// Derive the set from a cluster's endpoints, in declaration order.
    pub fn from_cluster(cluster: &Cluster) -> Self {
        Self {
            urls: cluster.endpoints.iter().map(|e| e.base_url()).collect(),
        }
    }

    /// Build a set from already formatted URLs.
    pub fn from_urls<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            urls: urls.into_iter().map(Into::into).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.urls.get(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.urls.iter().map(String::as_str)
    }

    pub fn urls(&self) -> Vec<String> {
        self.urls.clone()
    }

    pub fn contains(&self, url: &str) -> bool {
        self.urls.iter().any(|u| u == url)
    }
}

/// Order after merging `next` into `current`: survivors first in their
/// current order, then backends new to `current` in `next`'s order.
pub fn merge_order(current: &[String], next: &BackendSet) -> Vec<String> {
    let mut merged: Vec<String> = current
        .iter()
        .filter(|url| next.contains(url))
        .cloned()
        .collect();

    for url in next.iter() {
        if !current.iter().any(|c| c == url) {
            merged.push(url.to_string());
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::topology::Endpoint;
    use crate::load_balancer::LbPolicy;

    #[test]
    fn test_from_cluster_keeps_order() {
        let cluster = Cluster {
            name: "c".into(),
            lb_policy: LbPolicy::RoundRobin,
            connect_timeout: None,
            endpoints: vec![
                Endpoint { host: "h2".into(), port: 81 },
                Endpoint { host: "h1".into(), port: 80 },
            ],
        };
        let set = BackendSet::from_cluster(&cluster);
        assert_eq!(set.get(0), Some("http://h2:81/"));
        assert_eq!(set.get(1), Some("http://h1:80/"));
        assert_eq!(set.get(2), None);
    }

    #[test]
    fn test_merge_order() {
        let current = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let next = BackendSet::from_urls(["d", "c", "a"]);
        assert_eq!(merge_order(&current, &next), vec!["a", "c", "d"]);
    }
}
