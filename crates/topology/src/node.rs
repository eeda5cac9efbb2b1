//! Node abstractions for the cluster ring.
//!
//! A [`Node`] represents one physical store server: its slot id in the ring,
//! its network endpoints, and the set of shard replicas it currently hosts.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Slot id of a node within a ring.
///
/// Newtype over `u32`, assigned externally. The id doubles as the node's
/// index into the ring's registry and is never reused for a different
/// physical server while that server occupies the slot.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Registry index corresponding to this id.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Network identity and metadata of one store server.
///
/// `address` carries data-plane traffic; `admin_address` is the separate
/// control-plane endpoint used for RPC operations.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreResource {
    pub network: String,
    pub address: String,
    pub admin_address: String,
    #[serde(default)]
    pub tags: HashMap<String, String>,
}

/// Lifecycle state of a shard replica on a server.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShardState {
    /// Receiving a copy of the shard from a peer.
    Bootstrap,
    /// Serving reads and writes.
    Ready,
    /// Scheduled for removal once its data has migrated elsewhere.
    Deleting,
}

/// Status record for one shard replica hosted on a server.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardStatus {
    pub keyspace: String,
    pub server_id: NodeId,
    pub shard_id: u32,
    pub state: ShardState,
}

impl ShardStatus {
    pub fn new(
        keyspace: impl Into<String>,
        server_id: NodeId,
        shard_id: u32,
        state: ShardState,
    ) -> Self {
        Self {
            keyspace: keyspace.into(),
            server_id,
            shard_id,
            state,
        }
    }

    /// Stable identifier of this shard on its server, used as the key in the
    /// node's shard map.
    pub fn identifier_on_this_server(&self) -> String {
        format!("{}:{}:{}", self.keyspace, self.server_id, self.shard_id)
    }
}

/// One physical store server and the shard replicas it hosts.
///
/// Identity and endpoints are fixed at construction; the shard map is mutated
/// by the storage layer as shards are assigned or migrated. The node carries
/// no locking of its own, owners must serialize concurrent mutation.
#[derive(Clone, Debug)]
pub struct Node {
    id: NodeId,
    store: StoreResource,
    shards: HashMap<String, ShardStatus>,
}

impl Node {
    pub fn new(id: NodeId, store: StoreResource) -> Self {
        Self {
            id,
            store,
            shards: HashMap::new(),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn network(&self) -> &str {
        &self.store.network
    }

    /// Client-facing data-plane address. A node with an empty address holds
    /// its slot without occupying it.
    pub fn address(&self) -> &str {
        &self.store.address
    }

    /// Control-plane endpoint, distinct from data-plane traffic.
    pub fn admin_address(&self) -> &str {
        &self.store.admin_address
    }

    pub fn store_resource(&self) -> &StoreResource {
        &self.store
    }

    /// Records `status` under its own identifier and returns the previous
    /// status for that identifier, letting callers detect changes.
    pub fn set_shard_status(&mut self, status: ShardStatus) -> Option<ShardStatus> {
        self.shards.insert(status.identifier_on_this_server(), status)
    }

    /// Drops the status stored under `status`'s identifier, if any.
    pub fn remove_shard_status(&mut self, status: &ShardStatus) {
        self.shards.remove(&status.identifier_on_this_server());
    }

    /// Snapshot of all shard statuses, in unspecified order.
    pub fn shard_statuses(&self) -> Vec<&ShardStatus> {
        self.shards.values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(shard_id: u32, state: ShardState) -> ShardStatus {
        ShardStatus::new("main", NodeId(1), shard_id, state)
    }

    #[test]
    fn set_shard_status_reports_prior_value() {
        let mut node = Node::new(NodeId(1), StoreResource::default());

        assert!(node.set_shard_status(status(0, ShardState::Bootstrap)).is_none());

        let prior = node.set_shard_status(status(0, ShardState::Ready)).unwrap();
        assert_eq!(prior.state, ShardState::Bootstrap);
        assert_eq!(node.shard_statuses().len(), 1);
        assert_eq!(node.shard_statuses()[0].state, ShardState::Ready);
    }

    #[test]
    fn remove_shard_status_is_a_noop_when_absent() {
        let mut node = Node::new(NodeId(1), StoreResource::default());

        node.remove_shard_status(&status(3, ShardState::Ready));
        assert!(node.shard_statuses().is_empty());

        node.set_shard_status(status(3, ShardState::Ready));
        node.remove_shard_status(&status(3, ShardState::Ready));
        assert!(node.shard_statuses().is_empty());
    }

    #[test]
    fn identifier_scopes_by_keyspace_and_shard() {
        let a = ShardStatus::new("main", NodeId(1), 0, ShardState::Ready);
        let b = ShardStatus::new("logs", NodeId(1), 0, ShardState::Ready);
        let c = ShardStatus::new("main", NodeId(1), 1, ShardState::Ready);

        assert_ne!(a.identifier_on_this_server(), b.identifier_on_this_server());
        assert_ne!(a.identifier_on_this_server(), c.identifier_on_this_server());
    }
}
