//! Server address resolution.
//!
//! # Responsibilities
//! - Turn `host:port` text into a socket address
//! - Apply the default port when none is given
//!
//! # Design Decisions
//! - Resolution is synchronous; callers on an async runtime use a blocking task
//! - The first resolved address wins
//! - Unix domain sockets are not supported

use std::borrow::Cow;
use std::net::{IpAddr, SocketAddr, ToSocketAddrs};

use thiserror::Error;

/// Port assumed when the server text carries none.
pub const DEFAULT_PORT: u16 = 80;

/// Errors produced while resolving a server address.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("empty server address")]
    Empty,

    #[error("unix domain sockets are not supported: {0}")]
    Unsupported(String),

    #[error("invalid server address \"{server}\": {source}")]
    Lookup {
        server: String,
        #[source]
        source: std::io::Error,
    },

    #[error("host not found: {0}")]
    NoAddress(String),
}

/// Maps server text to the address the traffic path connects to.
pub trait Resolver: Send + Sync + std::fmt::Debug {
    fn resolve(&self, server: &str) -> Result<SocketAddr, ResolveError>;
}

/// Resolver backed by the operating system (`getaddrinfo`).
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemResolver;

impl Resolver for SystemResolver {
    fn resolve(&self, server: &str) -> Result<SocketAddr, ResolveError> {
        let server = server.trim();
        if server.is_empty() {
            return Err(ResolveError::Empty);
        }
        if server.starts_with("unix:") {
            return Err(ResolveError::Unsupported(server.to_string()));
        }

        let target = with_default_port(server);
        let mut addrs = target
            .to_socket_addrs()
            .map_err(|source| ResolveError::Lookup {
                server: server.to_string(),
                source,
            })?;

        addrs
            .next()
            .ok_or_else(|| ResolveError::NoAddress(server.to_string()))
    }
}

fn with_default_port(server: &str) -> Cow<'_, str> {
    if server.parse::<SocketAddr>().is_ok() {
        return Cow::Borrowed(server);
    }
    match server.parse::<IpAddr>() {
        Ok(ip) => return Cow::Owned(SocketAddr::new(ip, DEFAULT_PORT).to_string()),
        Err(_) if server.starts_with('[') && server.ends_with(']') => {
            return Cow::Owned(format!("{server}:{DEFAULT_PORT}"));
        }
        Err(_) => {}
    }
    match server.rsplit_once(':') {
        Some((_, port)) if !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()) => {
            Cow::Borrowed(server)
        }
        _ => Cow::Owned(format!("{server}:{DEFAULT_PORT}")),
    }
}
