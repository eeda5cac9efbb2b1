//! Cluster topology for a sharded, replicated key-value store.
//!
//! This crate tracks which physical servers hold which logical partitions
//! and computes a reproducible partition-to-server mapping while the cluster
//! is forming, degraded, or mid-resize:
//! - Node identity, endpoints, and per-server shard bookkeeping
//! - Jump-hash bucket assignment
//! - The slot registry with resize-transition state
//! - Composable access strategies for replica selection
//!
//! Everything here is pure in-memory computation. Connection handling lives
//! in the `dispatch` crate.

pub mod access;
pub mod jump;
pub mod node;
pub mod ring;

pub use access::AccessStrategy;
pub use jump::jump_hash;
pub use node::{Node, NodeId, ShardState, ShardStatus, StoreResource};
pub use ring::ClusterRing;
