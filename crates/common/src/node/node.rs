use std::net::{Ipv4Addr, SocketAddr};

use anyhow::anyhow;
use iroh::{Endpoint, NodeId, RelayMode};

use crate::crypto::SecretKey;

use super::{BlobsStore, BlobsStoreError};

/// Builder for a node runtime context.
#[derive(Default)]
pub struct NodeBuilder {
    /// the socket addr to expose the node on
    ///  if not set, an ephemeral port will be used
    socket_address: Option<SocketAddr>,
    /// the identity of the node, as a SecretKey
    secret_key: Option<SecretKey>,
    /// pre-loaded blobs store
    blobs_store: Option<BlobsStore>,
    /// offline mode: loopback bind, relaying disabled, no discovery
    offline: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum NodeError {
    #[error("node error: {0}")]
    Default(#[from] anyhow::Error),
    #[error("key error: {0}")]
    Key(#[from] crate::crypto::KeyError),
    #[error("blobs store error: {0}")]
    BlobsStore(#[from] BlobsStoreError),
}

impl NodeBuilder {
    pub fn new() -> Self {
        NodeBuilder {
            socket_address: None,
            secret_key: None,
            blobs_store: None,
            offline: false,
        }
    }

    pub fn socket_address(mut self, socket_addr: SocketAddr) -> Self {
        self.socket_address = Some(socket_addr);
        self
    }

    pub fn secret_key(mut self, secret_key: SecretKey) -> Self {
        self.secret_key = Some(secret_key);
        self
    }

    pub fn blobs_store(mut self, blobs: BlobsStore) -> Self {
        self.blobs_store = Some(blobs);
        self
    }

    /// Run the node without contacting any peers. Only local store
    /// operations are possible.
    pub fn offline(mut self) -> Self {
        self.offline = true;
        self
    }

    pub async fn build(self) -> Result<Node, NodeError> {
        // offline nodes bind to loopback; otherwise expose on all interfaces
        let socket_addr = self.socket_address.unwrap_or_else(|| {
            let ip = if self.offline {
                Ipv4Addr::LOCALHOST
            } else {
                Ipv4Addr::UNSPECIFIED
            };
            SocketAddr::new(ip.into(), 0)
        });
        let addr = match socket_addr {
            SocketAddr::V4(v4) => v4,
            SocketAddr::V6(_) => {
                return Err(anyhow!("ipv6 bind addresses are not supported").into())
            }
        };

        // generate a new secret key if not set
        let secret_key = match self.secret_key {
            Some(key) => key,
            None => SecretKey::generate()?,
        };

        // get the blobs store, if not set use in memory
        let blobs_store = match self.blobs_store {
            Some(blobs) => blobs,
            None => BlobsStore::memory().await?,
        };

        let mut builder = Endpoint::builder()
            .secret_key(secret_key.0.clone())
            .bind_addr_v4(addr);
        if self.offline {
            builder = builder.relay_mode(RelayMode::Disabled);
        }
        let endpoint = builder
            .bind()
            .await
            .map_err(|e| NodeError::Default(anyhow!(e)))?;

        Ok(Node {
            secret_key,
            endpoint,
            blobs_store,
        })
    }
}

/// A node bound to a repository's blob store.
#[derive(Debug)]
pub struct Node {
    secret_key: SecretKey,
    endpoint: Endpoint,
    blobs_store: BlobsStore,
}

impl Node {
    pub fn node_id(&self) -> NodeId {
        self.endpoint.node_id()
    }

    pub fn secret_key(&self) -> &SecretKey {
        &self.secret_key
    }

    pub fn blobs(&self) -> &BlobsStore {
        &self.blobs_store
    }

    /// Close the endpoint and release the store.
    ///
    /// Must run on every exit path: nothing spawned under the node may
    /// outlive the call that built it.
    pub async fn shutdown(self) {
        self.endpoint.close().await;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn test_offline_node_uses_supplied_key() {
        let key = SecretKey::generate().unwrap();
        let expected = key.public();
        let node = NodeBuilder::new()
            .secret_key(key)
            .offline()
            .build()
            .await
            .unwrap();
        assert_eq!(node.node_id(), iroh::NodeId::from(expected));
        node.shutdown().await;
    }

    #[tokio::test]
    async fn test_offline_node_can_write_blobs() {
        let node = NodeBuilder::new().offline().build().await.unwrap();
        let hash = node.blobs().put(b"local write".to_vec()).await.unwrap();
        assert!(node.blobs().stat(&hash).await.unwrap());
        node.shutdown().await;
    }
}
