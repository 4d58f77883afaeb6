//! Minimal node runtime context.
//!
//! A [`Node`] binds an iroh endpoint to a repository's blob store. During
//! bootstrap the node runs in offline mode: relaying is disabled, no discovery
//! is configured, and the endpoint binds to loopback, so the only work it can
//! perform is local store writes.

mod blobs_store;
mod node;

pub use blobs_store::{BlobsStore, BlobsStoreError};
pub use node::{Node, NodeBuilder, NodeError};
