//! Subcommands for ring inspection and resize planning.

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::Subcommand;
use serde::Deserialize;
use tracing::info;
use xxhash_rust::xxh3::xxh3_64;

use dispatch::SharedRing;
use topology::{jump_hash, ClusterRing, Node, NodeId, StoreResource};

/// One server entry in a topology file.
#[derive(Debug, Deserialize)]
pub struct NodeSpec {
    pub id: u32,
    #[serde(default = "default_network")]
    pub network: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub admin_address: String,
    #[serde(default)]
    pub tags: HashMap<String, String>,
}

fn default_network() -> String {
    "tcp".to_string()
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Hash a key and report the bucket it belongs to.
    Locate {
        key: String,
        /// Ring size to locate against.
        #[arg(long)]
        size: usize,
        /// Also report the bucket under this resize target.
        #[arg(long)]
        next_size: Option<usize>,
    },
    /// Load a topology file and render the ring state.
    Show {
        /// JSON file with one entry per server.
        #[arg(long)]
        file: PathBuf,
        #[arg(long)]
        expected_size: usize,
        #[arg(long, default_value_t = 0)]
        next_size: usize,
        #[arg(long, default_value_t = 2)]
        replication_factor: usize,
        #[arg(long, default_value = "main")]
        keyspace: String,
        #[arg(long, default_value = "dc1")]
        data_center: String,
    },
    /// Estimate how much of the keyspace moves when resizing.
    Plan {
        #[arg(long)]
        from: usize,
        #[arg(long)]
        to: usize,
        #[arg(long, default_value_t = 100_000)]
        samples: u64,
    },
    /// Dial a server's admin address to confirm it is reachable.
    Ping {
        #[arg(long)]
        file: PathBuf,
        #[arg(long)]
        expected_size: usize,
        server_id: usize,
    },
}

impl Command {
    pub fn execute(self) -> anyhow::Result<()> {
        match self {
            Command::Locate { key, size, next_size } => locate(&key, size, next_size),
            Command::Show {
                file,
                expected_size,
                next_size,
                replication_factor,
                keyspace,
                data_center,
            } => show(
                &file,
                &keyspace,
                &data_center,
                expected_size,
                next_size,
                replication_factor,
            ),
            Command::Plan { from, to, samples } => plan(from, to, samples),
            Command::Ping {
                file,
                expected_size,
                server_id,
            } => ping(&file, expected_size, server_id),
        }
    }
}

fn locate(key: &str, size: usize, next_size: Option<usize>) -> anyhow::Result<()> {
    if size == 0 {
        bail!("ring size must be positive");
    }
    let hash = xxh3_64(key.as_bytes());
    let bucket = jump_hash(hash, size);
    println!("key {key:?} hash {hash:#018x} bucket {bucket} of {size}");

    if let Some(next) = next_size {
        if next == 0 {
            bail!("next size must be positive");
        }
        let target = jump_hash(hash, next);
        if target == bucket {
            println!("stays in bucket {bucket} at size {next}");
        } else {
            println!("moves to bucket {target} at size {next}");
        }
    }
    Ok(())
}

fn show(
    file: &Path,
    keyspace: &str,
    data_center: &str,
    expected_size: usize,
    next_size: usize,
    replication_factor: usize,
) -> anyhow::Result<()> {
    let ring = load_ring(
        file,
        keyspace,
        data_center,
        expected_size,
        next_size,
        replication_factor,
    )?;
    println!("{ring}");

    let (missing, free) = ring.missing_and_free_node_ids();
    info!(
        keyspace = ring.keyspace(),
        data_center = ring.data_center(),
        current = ring.current_size(),
        expected = ring.expected_size(),
        replication = ring.replication_factor(),
        missing = missing.len(),
        free = free.len(),
        "ring loaded"
    );
    Ok(())
}

fn plan(from: usize, to: usize, samples: u64) -> anyhow::Result<()> {
    if from == 0 || to == 0 {
        bail!("ring sizes must be positive");
    }

    let mut moved = 0u64;
    let mut inflow: BTreeMap<usize, u64> = BTreeMap::new();
    for i in 0..samples {
        let hash = xxh3_64(&i.to_le_bytes());
        let old = jump_hash(hash, from);
        let new = jump_hash(hash, to);
        if old != new {
            moved += 1;
            *inflow.entry(new).or_default() += 1;
        }
    }

    let fraction = moved as f64 / samples as f64;
    println!(
        "{moved} of {samples} sampled keys move when resizing {from} -> {to} ({:.2}%)",
        fraction * 100.0
    );
    for (bucket, count) in inflow {
        println!("  bucket {bucket}: +{count}");
    }
    Ok(())
}

fn ping(file: &Path, expected_size: usize, server_id: usize) -> anyhow::Result<()> {
    let ring = load_ring(file, "main", "dc1", expected_size, 0, 1)?;
    let shared = SharedRing::new(ring);

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        shared
            .with_connection("ping", server_id, |node, _conn| async move {
                info!(
                    server = %node.id(),
                    addr = node.admin_address(),
                    "admin endpoint reachable"
                );
                Ok(())
            })
            .await
    })?;
    Ok(())
}

fn load_ring(
    file: &Path,
    keyspace: &str,
    data_center: &str,
    expected_size: usize,
    next_size: usize,
    replication_factor: usize,
) -> anyhow::Result<ClusterRing> {
    let raw = fs::read_to_string(file).with_context(|| format!("read {}", file.display()))?;
    let specs: Vec<NodeSpec> =
        serde_json::from_str(&raw).with_context(|| format!("parse {}", file.display()))?;

    let mut ring = ClusterRing::new(keyspace, data_center, expected_size, replication_factor);
    ring.set_next_size(next_size);
    for spec in specs {
        let store = StoreResource {
            network: spec.network,
            address: spec.address,
            admin_address: spec.admin_address,
            tags: spec.tags,
        };
        ring.add(Node::new(NodeId(spec.id), store));
    }
    Ok(ring)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_spec_fills_defaults() {
        let spec: NodeSpec =
            serde_json::from_str(r#"{"id": 3, "address": "10.0.0.3:8201"}"#).unwrap();
        assert_eq!(spec.id, 3);
        assert_eq!(spec.network, "tcp");
        assert!(spec.admin_address.is_empty());
        assert!(spec.tags.is_empty());
    }
}
