//! Tests for connection dispatch against loopback listeners.

use dispatch::{ClusterNode, DispatchError, PrimaryShards, SharedRing};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use topology::{ClusterRing, Node, NodeId, ShardState, ShardStatus, StoreResource};

fn store(admin_address: &str) -> StoreResource {
    StoreResource {
        network: "tcp".to_string(),
        address: "10.0.0.1:8201".to_string(),
        admin_address: admin_address.to_string(),
        tags: Default::default(),
    }
}

async fn banner_listener() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    tokio::spawn(async move {
        let (mut conn, _) = listener.accept().await.unwrap();
        conn.write_all(b"ok").await.unwrap();
    });
    addr
}

#[tokio::test]
async fn with_connection_reaches_the_admin_endpoint() {
    let addr = banner_listener().await;

    let mut ring = ClusterRing::new("main", "dc1", 1, 1);
    ring.add(Node::new(NodeId(0), store(&addr)));
    let shared = SharedRing::new(ring);

    let (id, banner) = shared
        .with_connection("banner", 0, |node, mut conn| async move {
            let mut buf = [0u8; 2];
            conn.read_exact(&mut buf).await.map_err(anyhow::Error::from)?;
            Ok((node.id(), buf))
        })
        .await
        .unwrap();

    assert_eq!(id, NodeId(0));
    assert_eq!(&banner, b"ok");
}

#[tokio::test]
async fn with_connection_reports_an_unknown_server() {
    let shared = SharedRing::new(ClusterRing::new("main", "dc1", 4, 1));

    let err = shared
        .with_connection("banner", 2, |_node, _conn| async move { Ok(()) })
        .await
        .unwrap_err();

    assert!(matches!(err, DispatchError::ServerNotFound { server_id: 2 }));
}

#[tokio::test]
async fn with_connection_surfaces_dial_failures() {
    let mut ring = ClusterRing::new("main", "dc1", 1, 1);
    // reserved port on loopback, nothing listens here
    ring.add(Node::new(NodeId(0), store("127.0.0.1:1")));
    let shared = SharedRing::new(ring);

    let err = shared
        .with_connection("banner", 0, |_node, _conn| async move { Ok(()) })
        .await
        .unwrap_err();

    assert!(matches!(err, DispatchError::Dial { .. }));
}

#[tokio::test]
async fn primary_shards_dial_their_entry() {
    let addr = banner_listener().await;

    let shards = PrimaryShards(vec![Some(ClusterNode {
        store: store(&addr),
        shard: ShardStatus::new("main", NodeId(0), 0, ShardState::Ready),
    })]);

    let shard_id = shards
        .with_connection("banner", 0, |node, mut conn| async move {
            let mut buf = [0u8; 2];
            conn.read_exact(&mut buf).await.map_err(anyhow::Error::from)?;
            Ok(node.shard.shard_id)
        })
        .await
        .unwrap();

    assert_eq!(shard_id, 0);
}

#[tokio::test]
async fn primary_shards_check_bounds_and_holes() {
    let shards = PrimaryShards(vec![None]);

    let err = shards
        .with_connection("drop", 0, |_node, _conn| async move { Ok(()) })
        .await
        .unwrap_err();
    assert!(matches!(err, DispatchError::ServerMissing { server_id: 0, .. }));

    let err = shards
        .with_connection("drop", 5, |_node, _conn| async move { Ok(()) })
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DispatchError::ServerOutOfRange { server_id: 5, total: 1 }
    ));
}
