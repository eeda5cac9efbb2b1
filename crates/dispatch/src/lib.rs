//! Connection dispatch for the cluster topology.
//!
//! Resolves a logical server id to a physical node through the ring, opens a
//! transient connection to the node's admin address, and hands both to
//! caller logic. Nothing here retries; timeout and retry policy belong to
//! the caller. This is the only crate in the workspace that performs
//! network I/O.

pub mod connection;
pub mod error;

pub use connection::{ClusterNode, PrimaryShards, SharedRing};
pub use error::{DispatchError, Result};
