//! Dynamic upstream API.
//!
//! # Data Flow
//! ```text
//! Query pairs
//!     → operation.rs (QueryParams → Operation, fixed evaluation order)
//!     → registry lookup (group name → UpstreamGroup)
//!     → group.lock()
//!         → mutator.rs (add / remove / update_param)
//!       guard dropped: snapshot published, lock released
//!     → listing.rs (render snapshot, compact or verbose)
//!     → response text
//! ```
//!
//! # Design Decisions
//! - One request performs exactly one operation
//! - Decode and lookup failures happen before any lock is taken
//! - Pure listings never take the lock
//! - The listing reflects the latest published snapshot, which may include
//!   a mutation made by a concurrent request after ours

pub mod listing;
pub mod mutator;
pub mod operation;
pub mod orchestrator;

pub use operation::{Action, Operation, ParamUpdate, QueryParams};
pub use orchestrator::DynamicUpstream;
