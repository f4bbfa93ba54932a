//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Engine and HTTP layer produce:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (operation counters, group gauges)
//!
//! Consumers:
//!     → stdout (fmt subscriber, filtered by RUST_LOG or config)
//!     → Prometheus scrape endpoint
//! ```
//!
//! # Design Decisions
//! - Structured fields (upstream, server, action) on every decision point
//! - Request ID flows from the HTTP layer into trace spans
//! - Metrics are no-ops until an exporter is installed

pub mod logging;
pub mod metrics;
