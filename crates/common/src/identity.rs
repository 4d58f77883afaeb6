//! Public identity descriptors.
//!
//! An [`Identity`] is the serializable, public half of a node's keypair. It is
//! what gets embedded under the `Identity` section of the repository config;
//! the secret key itself is persisted separately and never leaves the
//! repository's identity record.

use serde::{Deserialize, Serialize};

use crate::crypto::{KeyError, SecretKey};
use crate::mnemonic::{self, MnemonicError};

/// Public descriptor of a node identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Node identifier: the Ed25519 public key in iroh's display encoding
    #[serde(rename = "PeerID")]
    pub peer_id: String,
    /// Hex-encoded public key
    #[serde(rename = "PubKey")]
    pub pub_key: String,
}

impl Identity {
    /// Build the public descriptor for a secret key.
    pub fn from_key(key: &SecretKey) -> Self {
        let public = key.public();
        Identity {
            peer_id: public.to_string(),
            pub_key: public.to_hex(),
        }
    }
}

/// Errors that can occur while deriving an identity from a mnemonic
#[derive(Debug, thiserror::Error)]
pub enum KeyDerivationError {
    #[error("mnemonic error: {0}")]
    Mnemonic(#[from] MnemonicError),
    #[error("key generation failed: {0}")]
    Key(#[from] KeyError),
}

/// Derive a node identity from a mnemonic phrase.
///
/// Deterministic: identical `(mnemonic, key_strength_bits)` inputs always yield
/// an identical keypair and descriptor. This is the recovery path for a user
/// who recorded their phrase. No partial identity is returned on error.
pub fn derive_identity(
    mnemonic: &str,
    key_strength_bits: usize,
) -> Result<(SecretKey, Identity), KeyDerivationError> {
    let seed = mnemonic::seed_from_mnemonic(mnemonic)?;
    let key = SecretKey::from_seed(&seed, key_strength_bits)?;
    let identity = Identity::from_key(&key);
    Ok((key, identity))
}

#[cfg(test)]
mod test {
    use super::*;

    const PHRASE: &str =
        "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    #[test]
    fn test_derivation_is_deterministic() {
        let (key_a, id_a) = derive_identity(PHRASE, 2048).unwrap();
        let (key_b, id_b) = derive_identity(PHRASE, 2048).unwrap();
        assert_eq!(key_a.to_bytes(), key_b.to_bytes());
        assert_eq!(id_a, id_b);
    }

    #[test]
    fn test_distinct_phrases_yield_distinct_identities() {
        let other =
            "legal winner thank year wave sausage worth useful legal winner thank yellow";
        let (key_a, id_a) = derive_identity(PHRASE, 2048).unwrap();
        let (key_b, id_b) = derive_identity(other, 2048).unwrap();
        assert_ne!(key_a.to_bytes(), key_b.to_bytes());
        assert_ne!(id_a, id_b);
    }

    #[test]
    fn test_descriptor_matches_key() {
        let (key, identity) = derive_identity(PHRASE, 2048).unwrap();
        assert_eq!(identity.pub_key, key.public().to_hex());
        assert_eq!(identity.peer_id, key.public().to_string());
    }

    #[test]
    fn test_weak_strength_is_rejected() {
        assert!(derive_identity(PHRASE, 256).is_err());
    }

    #[test]
    fn test_invalid_phrase_is_rejected() {
        assert!(derive_identity("not a phrase", 2048).is_err());
    }
}
