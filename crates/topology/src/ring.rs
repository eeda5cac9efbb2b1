//! Cluster ring: the node-slot registry and partition addressing.
//!
//! The ring owns a sparse, index-addressed registry of nodes, computes the
//! target bucket for a key hash via jump hashing, and tracks resize
//! transitions through `expected_size` and `next_size`. All operations are
//! total, in-memory, and synchronous. The ring carries no locking; it is
//! meant to be owned by a coordinator that serializes mutation, or wrapped
//! in one mutex per ring instance.

use std::fmt;

use crate::access::{self, AccessStrategy};
use crate::jump::jump_hash;
use crate::node::{Node, NodeId};

/// Slot registry and sizing state for one keyspace in one data center.
///
/// Two rings never share node slots; the keyspace and data-center tag scope
/// the registry.
#[derive(Debug, Clone)]
pub struct ClusterRing {
    keyspace: String,
    data_center: String,
    nodes: Vec<Option<Node>>,
    expected_size: usize,
    next_size: usize,
    replication_factor: usize,
}

impl ClusterRing {
    pub fn new(
        keyspace: impl Into<String>,
        data_center: impl Into<String>,
        expected_size: usize,
        replication_factor: usize,
    ) -> Self {
        Self {
            keyspace: keyspace.into(),
            data_center: data_center.into(),
            nodes: Vec::with_capacity(16),
            expected_size,
            next_size: 0,
            replication_factor,
        }
    }

    pub fn keyspace(&self) -> &str {
        &self.keyspace
    }

    pub fn data_center(&self) -> &str {
        &self.data_center
    }

    /// Places `node` at its own id, growing the registry to exactly `id + 1`
    /// when needed. Growth preserves existing entries and never shrinks; any
    /// prior occupant of the slot is overwritten.
    pub fn add(&mut self, node: Node) {
        let index = node.id().index();
        if self.nodes.len() < index + 1 {
            self.nodes.resize_with(index + 1, || None);
        }
        self.nodes[index] = Some(node);
    }

    /// Clears the slot for `id` and returns the previous occupant. Returns
    /// `None` when the id is out of bounds or the slot is already empty.
    /// The registry keeps its length.
    pub fn remove(&mut self, id: NodeId) -> Option<Node> {
        self.nodes.get_mut(id.index()).and_then(|slot| slot.take())
    }

    /// Target bucket for `key_hash` under the ring's expected size,
    /// regardless of how many slots are currently occupied.
    ///
    /// Callers must not invoke this while the expected size is zero.
    pub fn find_bucket(&self, key_hash: u64) -> usize {
        jump_hash(key_hash, self.expected_size)
    }

    /// Target bucket for `key_hash` under an explicit `size`. Comparing this
    /// against [`find_bucket`](Self::find_bucket) identifies the keys that
    /// must migrate during a resize.
    pub fn find_bucket_given_size(&self, key_hash: u64, size: usize) -> usize {
        jump_hash(key_hash, size)
    }

    pub fn expected_size(&self) -> usize {
        self.expected_size
    }

    pub fn next_size(&self) -> usize {
        self.next_size
    }

    pub fn replication_factor(&self) -> usize {
        self.replication_factor
    }

    /// Sets the target partition count. Zero is silently ignored, preserving
    /// the last valid value.
    pub fn set_expected_size(&mut self, expected_size: usize) {
        if expected_size > 0 {
            self.expected_size = expected_size;
        }
    }

    /// Sets the in-flight resize target. Zero is the valid "no resize in
    /// progress" sentinel, so there is no guard.
    pub fn set_next_size(&mut self, next_size: usize) {
        self.next_size = next_size;
    }

    /// Sets the number of physical copies per partition. Zero is silently
    /// ignored, preserving the last valid value.
    pub fn set_replication_factor(&mut self, replication_factor: usize) {
        if replication_factor > 0 {
            self.replication_factor = replication_factor;
        }
    }

    /// Length of the registry, including empty slots.
    pub fn slot_count(&self) -> usize {
        self.nodes.len()
    }

    /// Extent of assigned slots: the highest occupied slot index plus one,
    /// or 0 when nothing is occupied. Holes below the highest occupied slot
    /// do not reduce the size; a single occupied high slot extends it.
    pub fn current_size(&self) -> usize {
        for i in (1..=self.nodes.len()).rev() {
            if self.occupied(i - 1) {
                return i;
            }
        }
        0
    }

    /// Resolves a logical slot index to a node, applying each strategy in
    /// sequence over `(index, replica)` seeded with replica 0 and the slot
    /// count as context. Returns `None` when the final index is out of range
    /// or the slot is empty; absence is an expected outcome during cluster
    /// formation, not an error.
    pub fn get_node(
        &self,
        index: usize,
        strategies: &[AccessStrategy],
    ) -> Option<(&Node, usize)> {
        let (index, replica) = access::apply_all(strategies, index, self.nodes.len());
        self.nodes.get(index)?.as_ref().map(|node| (node, replica))
    }

    /// Computes rebalance candidates over `[0, max(slot_count, current_size))`:
    /// missing slots are unoccupied indices below the current size (servers
    /// that should exist but have not joined or have failed); free slots are
    /// occupied indices at or above the current size (servers eligible for
    /// reclamation once their data is migrated).
    pub fn missing_and_free_node_ids(&self) -> (Vec<usize>, Vec<usize>) {
        let current = self.current_size();
        let max = self.nodes.len().max(current);
        let mut missing = Vec::new();
        let mut free = Vec::new();
        for i in 0..max {
            if self.occupied(i) {
                if i >= current {
                    free.push(i);
                }
            } else if i < current {
                missing.push(i);
            }
        }
        (missing, free)
    }

    /// A slot is occupied iff it holds a node with a non-empty client
    /// address. A present but addressless node holds the slot without
    /// occupying it.
    fn occupied(&self, index: usize) -> bool {
        matches!(self.nodes.get(index), Some(Some(node)) if !node.address().is_empty())
    }
}

/// Human-diagnostic rendering, not meant for machine parsing: occupied slots
/// by id, held-but-unoccupied slots as `_`, followed by a size annotation
/// (`size N` stable, `size N->M` current vs expected, `size N=>M` during an
/// active resize) and the missing/free slot lists when non-empty.
impl fmt::Display for ClusterRing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        let node_count = self.current_size();
        let max = self.nodes.len().max(self.expected_size);
        for i in 0..max {
            match self.nodes.get(i).and_then(|slot| slot.as_ref()) {
                Some(node) if !node.address().is_empty() => {
                    if i != 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", node.id())?;
                }
                _ => {
                    if i < self.expected_size || i < node_count {
                        if i != 0 {
                            write!(f, " ")?;
                        }
                        write!(f, "_")?;
                    }
                }
            }
        }
        write!(f, "]")?;

        if self.next_size == 0 {
            if node_count != self.expected_size && self.expected_size != 0 {
                write!(f, " size {}->{} ", node_count, self.expected_size)?;
            } else {
                write!(f, " size {} ", node_count)?;
            }
        } else {
            write!(f, " size {}=>{} ", node_count, self.next_size)?;
        }

        let (missing, free) = self.missing_and_free_node_ids();
        if !missing.is_empty() || !free.is_empty() {
            write!(f, "(")?;
            if !missing.is_empty() {
                write!(f, "{} missing ", missing.len())?;
                write_id_list(f, &missing)?;
            }
            if !free.is_empty() {
                if !missing.is_empty() {
                    write!(f, ", ")?;
                }
                write!(f, "{} free ", free.len())?;
                write_id_list(f, &free)?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}

fn write_id_list(f: &mut fmt::Formatter<'_>, ids: &[usize]) -> fmt::Result {
    write!(f, "[")?;
    for (i, id) in ids.iter().enumerate() {
        if i != 0 {
            write!(f, " ")?;
        }
        write!(f, "{id}")?;
    }
    write!(f, "]")
}
