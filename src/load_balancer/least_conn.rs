//! Least Connections load balancing strategy.
//!
//! Counts are cumulative selections: they are incremented on every pick and
//! never decremented when a request finishes. Under steady traffic every
//! backend converges to the same count and the order approaches round robin.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use crate::load_balancer::backend::{merge_order, BackendSet};
use crate::load_balancer::{BackendStat, LbPolicy, LoadBalancer};

/// Least connections selector.
/// Selects the backend with the minimum recorded selection count.
#[derive(Debug)]
pub struct LeastConnections {
    state: Mutex<State>,
}

#[derive(Debug)]
struct State {
    backends: Vec<String>,
    counts: HashMap<String, u64>,
}

impl LeastConnections {
    pub fn new(backends: &BackendSet) -> Self {
        let counts = backends.iter().map(|url| (url.to_string(), 0)).collect();
        Self {
            state: Mutex::new(State {
                backends: backends.urls(),
                counts,
            }),
        }
    }
}

impl LoadBalancer for LeastConnections {
    fn select_next(&self) -> Option<String> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let first = state.backends.first()?;

        // Strict less-than: ties go to the earliest backend in declared order
        let mut chosen = first;
        let mut min = state.counts.get(first).copied().unwrap_or(0);
        for url in &state.backends {
            let count = state.counts.get(url).copied().unwrap_or(0);
            if count < min {
                chosen = url;
                min = count;
            }
        }

        let chosen = chosen.clone();
        *state.counts.entry(chosen.clone()).or_insert(0) += 1;
        Some(chosen)
    }

    fn report_update(&self, backends: &BackendSet) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);

        let merged = merge_order(&state.backends, backends);
        state.counts.retain(|url, _| merged.contains(url));
        for url in &merged {
            state.counts.entry(url.clone()).or_insert(0);
        }
        state.backends = merged;
    }

    fn policy(&self) -> LbPolicy {
        LbPolicy::LeastConnections
    }

    fn snapshot(&self) -> Vec<BackendStat> {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state
            .backends
            .iter()
            .map(|url| BackendStat {
                url: url.clone(),
                selections: state.counts.get(url).copied().unwrap_or(0),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_least_conn_first_match_on_ties() {
        let lb = LeastConnections::new(&BackendSet::from_urls(["A", "B"]));

        // A=0,B=0 → A; A=1,B=0 → B; A=1,B=1 → A (earliest minimum)
        let picks: Vec<_> = (0..5).filter_map(|_| lb.select_next()).collect();
        assert_eq!(picks, vec!["A", "B", "A", "B", "A"]);
    }

    #[test]
    fn test_least_conn_prefers_new_backend() {
        let lb = LeastConnections::new(&BackendSet::from_urls(["A", "B"]));
        for _ in 0..4 {
            lb.select_next();
        }

        // C joins at zero and keeps winning until it catches up with A and B
        lb.report_update(&BackendSet::from_urls(["A", "B", "C"]));
        assert_eq!(lb.select_next().as_deref(), Some("C"));
        assert_eq!(lb.select_next().as_deref(), Some("C"));
        assert_eq!(lb.select_next().as_deref(), Some("A"));

        let snapshot = lb.snapshot();
        assert_eq!(snapshot.len(), 3);
        assert_eq!(snapshot[2], BackendStat { url: "C".into(), selections: 2 });
    }

    #[test]
    fn test_report_update_drops_removed() {
        let lb = LeastConnections::new(&BackendSet::from_urls(["A", "B"]));
        lb.select_next();
        lb.report_update(&BackendSet::from_urls(["B"]));

        assert_eq!(lb.snapshot(), vec![BackendStat { url: "B".into(), selections: 0 }]);
        assert_eq!(lb.select_next().as_deref(), Some("B"));
    }

    #[test]
    fn test_empty_set() {
        let lb = LeastConnections::new(&BackendSet::default());
        assert_eq!(lb.select_next(), None);
    }
}
