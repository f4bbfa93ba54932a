//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (assign or propagate x-request-id)
//!     → admin handlers (query → engine on the blocking pool)
//!     → text listing or error status
//! ```

pub mod request;
pub mod server;

pub use request::{RequestUuid, X_REQUEST_ID};
pub use server::AdminServer;
