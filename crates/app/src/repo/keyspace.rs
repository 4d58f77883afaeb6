//! Initial keyspace publication.
//!
//! The last stage of bootstrap: open the freshly initialized repository,
//! attach the derived identity to its config, and publish the genesis
//! keyspace record through an offline node context. No peers are contacted;
//! the record lands in the local blob store, pinned under the node's tag,
//! ready to be announced when the node first goes online.

use std::path::Path;

use common::crypto::SecretKey;
use common::identity::Identity;
use common::keyspace::{KeyspaceError, KeyspaceRecord};
use common::node::{BlobsStore, BlobsStoreError, Node, NodeBuilder, NodeError};

use super::fsrepo::{FsRepoError, Repo};

#[derive(Debug, thiserror::Error)]
pub enum KeyspaceInitError {
    #[error(transparent)]
    Repo(#[from] FsRepoError),
    #[error("blobs store error: {0}")]
    BlobsStore(#[from] BlobsStoreError),
    #[error("node construction failed: {0}")]
    Node(#[from] NodeError),
    #[error("keyspace record error: {0}")]
    Record(#[from] KeyspaceError),
}

/// Publish the genesis keyspace record for `identity_key`.
///
/// The node context is torn down on every exit path, and the repository
/// handle is released on the way out.
pub async fn initialize_keyspace(
    repo_root: &Path,
    identity_key: &SecretKey,
) -> Result<(), KeyspaceInitError> {
    eprintln!("CHECKPOINT: opening repo");
    let repo = Repo::open(repo_root)?;

    // re-derive the public identity and attach it to the persisted config
    let mut config = repo.read_config()?;
    config.identity = Some(Identity::from_key(identity_key));
    repo.write_config(&config)?;

    eprintln!("CHECKPOINT: opening blobs store");
    let blobs = BlobsStore::fs(&repo.blobs_path()).await?;
    eprintln!("CHECKPOINT: blobs store open, building node");
    let node = NodeBuilder::new()
        .secret_key(identity_key.clone())
        .blobs_store(blobs)
        .offline()
        .build()
        .await?;

    eprintln!("CHECKPOINT: node built, publishing");
    let result = publish_genesis_record(&node, identity_key).await;
    eprintln!("CHECKPOINT: published, shutting down node");
    node.shutdown().await;
    eprintln!("CHECKPOINT: node shut down");
    repo.close()?;
    result
}

async fn publish_genesis_record(
    node: &Node,
    identity_key: &SecretKey,
) -> Result<(), KeyspaceInitError> {
    let record = KeyspaceRecord::genesis(identity_key)?;
    let bytes = record.encode()?;
    let hash = node.blobs().put(bytes).await?;
    node.blobs().pin(&keyspace_tag(node), hash).await?;
    tracing::info!(peer_id = %node.node_id(), %hash, "published genesis keyspace record");
    Ok(())
}

/// Tag name pinning a node's keyspace root.
fn keyspace_tag(node: &Node) -> String {
    format!("keyspace/{}", node.node_id())
}
