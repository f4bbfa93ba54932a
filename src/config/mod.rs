//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → DynamicConfig (validated, immutable)
//!     → upstream registry built once at startup
//! ```
//!
//! # Design Decisions
//! - Config only seeds the groups; runtime changes go through the dynamic API
//! - No hot reload: reloading would discard runtime peer changes
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    AdminConfig, DynamicConfig, ListenerConfig, ObservabilityConfig, ServerConfig,
    TimeoutConfig, UpstreamConfig,
};
