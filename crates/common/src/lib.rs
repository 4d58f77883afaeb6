/**
 * Cryptographic types and operations.
 *  - Public and Private key implementations
 *  - Deterministic key derivation from seed material
 */
pub mod crypto;
/**
 * Public identity descriptors, and the derivation
 *  path from a mnemonic phrase to a keypair.
 */
pub mod identity;
/**
 * Signed keyspace records: the binding from an
 *  identity to the root of its publishable namespace.
 */
pub mod keyspace;
/**
 * Mnemonic phrase generation and seed derivation.
 *  Entropy and encoding are injected so derivation
 *  stays deterministic under test.
 */
pub mod mnemonic;
/**
 * Minimal node runtime context.
 *  An iroh endpoint plus a light wrapper around the
 *  iroh-blobs store, with an offline-only mode used
 *  during bootstrap.
 */
pub mod node;
/**
 * Helper for reporting build version information.
 */
pub mod version;

pub mod prelude {
    pub use crate::crypto::{PublicKey, SecretKey};
    pub use crate::identity::{derive_identity, Identity};
    pub use crate::keyspace::KeyspaceRecord;
    pub use crate::node::{BlobsStore, Node, NodeBuilder};
}
