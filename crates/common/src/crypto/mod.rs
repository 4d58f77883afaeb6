//! Cryptographic primitives for souk
//!
//! This module provides the cryptographic foundation for a souk node's identity:
//!
//! - **Identity & Authentication**: Ed25519 keypairs for peer identity
//! - **Deterministic Derivation**: seed material (from a mnemonic phrase) maps to
//!   the same keypair on every invocation, which is the recovery mechanism
//!
//! # Security Model
//!
//! Each node has an Ed25519 keypair (`SecretKey`/`PublicKey`) that serves as its
//! identity in the network. The secret key is persisted once, in the repository's
//! identity record, and is never written to logs or the config document.

mod keys;

pub use ed25519_dalek::Signature;
pub use keys::{KeyError, PublicKey, SecretKey, MIN_KEY_STRENGTH_BITS};
