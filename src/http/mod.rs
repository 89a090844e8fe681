//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID)
//!     → [routing layer resolves backend]
//!     → forwarder.rs (outbound call, buffered response)
//!     → Send to client
//! ```

pub mod forwarder;
pub mod health;
pub mod request;
pub mod server;

pub use forwarder::Forwarder;
pub use request::X_REQUEST_ID;
pub use server::{AppState, HttpServer};
