//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (host, path, query)
//!     → router.rs (load active state, pick virtual host)
//!     → matcher.rs (domain and path-prefix conditions)
//!     → Return: Resolution (backend + target URI) or ProxyError
//!
//! Reload:
//!     LoadedConfig
//!     → build (topology, balancer) pair
//!     → swap in as one value
//! ```
//!
//! # Design Decisions
//! - Routes are immutable within a generation
//! - No regex in hot path (prefix matching only)
//! - First match wins, in document order

pub mod matcher;
pub mod router;

pub use router::{Resolution, Router, RoutingState, Selection};
