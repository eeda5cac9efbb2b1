//! Error types for connection dispatch.

use thiserror::Error;

/// Result type alias for dispatch operations.
pub type Result<T> = std::result::Result<T, DispatchError>;

/// Errors surfaced while turning a logical server id into a live connection.
///
/// Ring lookups themselves never fail; absence inside the ring is an
/// expected state. These errors cover the dispatch boundary only.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("server {server_id} not found")]
    ServerNotFound { server_id: usize },

    #[error("server {server_id} not found in {total} servers")]
    ServerOutOfRange { server_id: usize, total: usize },

    #[error("{name}: server {server_id} is missing")]
    ServerMissing { name: String, server_id: usize },

    #[error("{name}: fail to dial {addr}: {source}")]
    Dial {
        name: String,
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// Failure inside caller logic, passed through unchanged.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
