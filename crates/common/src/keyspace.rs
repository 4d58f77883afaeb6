//! Signed keyspace records.
//!
//! A keyspace record binds an identity to the root of its publishable
//! namespace. Records are dag-cbor encoded and signed by the author key, so a
//! resolver can verify provenance without trusting the store they came from.
//! The first record a node ever publishes is the genesis record: sequence zero
//! with an empty value, rooting an otherwise empty namespace.

use serde::{Deserialize, Serialize};

use crate::crypto::{PublicKey, SecretKey};

/// Errors that can occur while building or checking keyspace records
#[derive(Debug, thiserror::Error)]
pub enum KeyspaceError {
    #[error("record encoding failed: {0}")]
    Encode(#[from] serde_ipld_dagcbor::EncodeError<std::collections::TryReserveError>),
    #[error("record decoding failed: {0}")]
    Decode(#[from] serde_ipld_dagcbor::DecodeError<std::convert::Infallible>),
    #[error("bad signature on keyspace record")]
    BadSignature,
}

/// The signed half of a keyspace record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyspacePayload {
    /// Public key of the record author
    pub author: PublicKey,
    /// Hash of the published namespace root; empty for the genesis record
    pub value: Vec<u8>,
    /// Monotonic record sequence number
    pub sequence: u64,
}

/// A keyspace record: payload plus the author's signature over its encoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyspaceRecord {
    pub payload: KeyspacePayload,
    /// Ed25519 signature over the dag-cbor encoding of the payload
    pub signature: Vec<u8>,
}

impl KeyspaceRecord {
    /// Build the initial, self-referential record rooting a fresh namespace.
    pub fn genesis(key: &SecretKey) -> Result<Self, KeyspaceError> {
        let payload = KeyspacePayload {
            author: key.public(),
            value: Vec::new(),
            sequence: 0,
        };
        let bytes = serde_ipld_dagcbor::to_vec(&payload)?;
        let signature = key.sign(&bytes);
        Ok(Self {
            payload,
            signature: signature.to_bytes().to_vec(),
        })
    }

    /// Encode the full record as dag-cbor.
    pub fn encode(&self) -> Result<Vec<u8>, KeyspaceError> {
        Ok(serde_ipld_dagcbor::to_vec(self)?)
    }

    /// Decode a record from its dag-cbor encoding.
    pub fn decode(bytes: &[u8]) -> Result<Self, KeyspaceError> {
        Ok(serde_ipld_dagcbor::from_slice(bytes)?)
    }

    /// Check the signature against the embedded author key.
    pub fn verify(&self) -> Result<(), KeyspaceError> {
        let bytes = serde_ipld_dagcbor::to_vec(&self.payload)?;
        let sig_bytes: [u8; 64] = self
            .signature
            .as_slice()
            .try_into()
            .map_err(|_| KeyspaceError::BadSignature)?;
        let signature = ed25519_dalek::Signature::from_bytes(&sig_bytes);
        self.payload
            .author
            .verify(&bytes, &signature)
            .map_err(|_| KeyspaceError::BadSignature)
    }
}
