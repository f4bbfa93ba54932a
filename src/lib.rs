//! Dynamic upstream management library

pub mod admin;
pub mod config;
pub mod dynamic;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod upstream;

pub use config::schema::DynamicConfig;
pub use dynamic::DynamicUpstream;
pub use error::{ErrorKind, UpstreamError};
pub use http::AdminServer;
pub use lifecycle::Shutdown;
