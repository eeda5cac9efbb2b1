//! Operator CLI for the cluster topology workspace.
//!
//! Provides commands for:
//! - Locating a key's bucket under a given ring size
//! - Rendering ring state from a topology file
//! - Estimating the keyspace movement of a resize
//! - Checking that a server's admin endpoint is reachable

pub mod commands;
pub mod config;

pub use commands::Command;
pub use config::CliConfig;
