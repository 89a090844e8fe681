//! Round-robin load balancing strategy.

use std::sync::{Mutex, PoisonError};

use crate::load_balancer::backend::{merge_order, BackendSet};
use crate::load_balancer::{BackendStat, LbPolicy, LoadBalancer};

/// Round-robin selector.
/// Stores a cursor into the backend list and advances it on every selection.
#[derive(Debug)]
pub struct RoundRobin {
    state: Mutex<State>,
}

#[derive(Debug)]
struct State {
    backends: Vec<String>,
    selections: Vec<u64>,
    cursor: usize,
}

impl RoundRobin {
    pub fn new(backends: &BackendSet) -> Self {
        Self {
            state: Mutex::new(State {
                backends: backends.urls(),
                selections: vec![0; backends.len()],
                cursor: 0,
            }),
        }
    }
}

impl LoadBalancer for RoundRobin {
    fn select_next(&self) -> Option<String> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.backends.is_empty() {
            return None;
        }

        let index = state.cursor;
        state.cursor = (index + 1) % state.backends.len();
        state.selections[index] += 1;
        Some(state.backends[index].clone())
    }

    fn report_update(&self, backends: &BackendSet) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);

        let merged = merge_order(&state.backends, backends);
        let selections = merged
            .iter()
            .map(|url| {
                state
                    .backends
                    .iter()
                    .position(|b| b == url)
                    .map_or(0, |i| state.selections[i])
            })
            .collect();

        state.backends = merged;
        state.selections = selections;
        if state.cursor >= state.backends.len() {
            state.cursor = 0;
        }
    }

    fn policy(&self) -> LbPolicy {
        LbPolicy::RoundRobin
    }

    fn snapshot(&self) -> Vec<BackendStat> {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state
            .backends
            .iter()
            .zip(&state.selections)
            .map(|(url, &selections)| BackendStat {
                url: url.clone(),
                selections,
            })
            .collect()
    }
}
