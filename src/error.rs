//! Errors surfaced by the dynamic upstream API.

use thiserror::Error;

use crate::upstream::resolver::ResolveError;
use crate::upstream::zone::ZoneExhausted;

/// Coarse classification used by the transport to pick a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed numeric parameter; nothing was touched.
    InvalidNumber,
    /// Unknown or empty upstream name; no lock was taken.
    GroupNotFound,
    /// The mutation was refused; the chain is unchanged.
    OperationFailed,
    /// The group's zone has no room for a new peer.
    AllocationFailed,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::InvalidNumber => "invalid_number",
            ErrorKind::GroupNotFound => "group_not_found",
            ErrorKind::OperationFailed => "operation_failed",
            ErrorKind::AllocationFailed => "allocation_failed",
        }
    }
}

/// Errors that can occur while serving one dynamic upstream request.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("invalid number \"{value}\" for parameter \"{param}\"")]
    InvalidNumber { param: &'static str, value: String },

    #[error("upstream \"{0}\" not found")]
    GroupNotFound(String),

    #[error("server parameter is required")]
    MissingServer,

    #[error("server \"{server}\" not found in upstream \"{upstream}\"")]
    ServerNotFound { upstream: String, server: String },

    #[error("refusing to remove the last peer of upstream \"{0}\"")]
    LastPeer(String),

    #[error("failed to resolve server: {0}")]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Allocation(#[from] ZoneExhausted),
}

impl UpstreamError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            UpstreamError::InvalidNumber { .. } => ErrorKind::InvalidNumber,
            UpstreamError::GroupNotFound(_) => ErrorKind::GroupNotFound,
            UpstreamError::MissingServer
            | UpstreamError::ServerNotFound { .. }
            | UpstreamError::LastPeer(_)
            | UpstreamError::Resolve(_) => ErrorKind::OperationFailed,
            UpstreamError::Allocation(_) => ErrorKind::AllocationFailed,
        }
    }
}

/// Result type for dynamic upstream operations.
pub type UpstreamResult<T> = Result<T, UpstreamError>;
