//! Dial a server's admin endpoint and run caller logic over the connection.

use std::future::Future;
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::net::TcpStream;
use tracing::error;

use topology::{ClusterRing, Node, ShardStatus, StoreResource};

use crate::error::{DispatchError, Result};

/// A ring shared between a coordinator and dispatch paths.
///
/// The ring carries no locking of its own; this wrapper is the one lock per
/// ring instance that callers are expected to provide. Guards are released
/// before any connection is opened, so a slow dial never blocks membership
/// changes.
#[derive(Clone)]
pub struct SharedRing {
    inner: Arc<RwLock<ClusterRing>>,
}

impl SharedRing {
    pub fn new(ring: ClusterRing) -> Self {
        Self {
            inner: Arc::new(RwLock::new(ring)),
        }
    }

    pub fn read(&self) -> RwLockReadGuard<'_, ClusterRing> {
        self.inner.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, ClusterRing> {
        self.inner.write()
    }

    /// Resolves `server_id`, dials the node's admin address and invokes `f`
    /// with the node and the open connection. The connection is transient
    /// and dropped when `f` returns.
    pub async fn with_connection<T, F, Fut>(&self, name: &str, server_id: usize, f: F) -> Result<T>
    where
        F: FnOnce(Node, TcpStream) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let node = {
            let ring = self.read();
            match ring.get_node(server_id, &[]) {
                Some((node, _)) => node.clone(),
                None => {
                    error!("cluster misses server {}: {}", server_id, &*ring);
                    return Err(DispatchError::ServerNotFound { server_id });
                }
            }
        };

        let conn = dial(name, node.admin_address()).await?;
        f(node, conn).await
    }
}

/// A resolved primary as seen by dispatch: the server's resource descriptor
/// plus the shard it serves.
#[derive(Clone, Debug)]
pub struct ClusterNode {
    pub store: StoreResource,
    pub shard: ShardStatus,
}

/// The primary replica of each logical partition, indexed by server id.
/// Entries are `None` for partitions whose primary has not joined yet.
#[derive(Clone, Debug, Default)]
pub struct PrimaryShards(pub Vec<Option<ClusterNode>>);

impl PrimaryShards {
    /// Dials the primary for `server_id` and invokes `f` with the node and
    /// the open connection.
    pub async fn with_connection<T, F, Fut>(&self, name: &str, server_id: usize, f: F) -> Result<T>
    where
        F: FnOnce(ClusterNode, TcpStream) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let node = match self.0.get(server_id) {
            None => {
                return Err(DispatchError::ServerOutOfRange {
                    server_id,
                    total: self.0.len(),
                })
            }
            Some(None) => {
                return Err(DispatchError::ServerMissing {
                    name: name.to_string(),
                    server_id,
                })
            }
            Some(Some(node)) => node.clone(),
        };

        let conn = dial(name, &node.store.admin_address).await?;
        f(node, conn).await
    }
}

async fn dial(name: &str, addr: &str) -> Result<TcpStream> {
    TcpStream::connect(addr)
        .await
        .map_err(|source| DispatchError::Dial {
            name: name.to_string(),
            addr: addr.to_string(),
            source,
        })
}
