//! Mnemonic phrases and seed derivation.
//!
//! A node identity is recoverable from a human-readable mnemonic phrase: the
//! phrase maps to a seed, and the seed maps to a keypair, both deterministically.
//! Entropy generation and phrase encoding are injected as functions so the
//! derivation path stays testable without real randomness.

use bip39::Mnemonic;

/// Default entropy size for freshly generated mnemonics, in bits (12 words).
pub const DEFAULT_ENTROPY_BITS: usize = 128;

/// Fixed, public passphrase used to namespace seed derivation.
///
/// Not a secret: it exists so souk seeds never collide with other BIP-39
/// derived key material for the same phrase.
pub const SEED_PASSPHRASE: &str = "Secret Passphrase";

/// Size of a derived seed in bytes.
pub const SEED_SIZE: usize = 64;

/// Errors that can occur while generating or decoding mnemonic phrases
#[derive(Debug, thiserror::Error)]
pub enum MnemonicError {
    #[error("entropy generation failed: {0}")]
    Entropy(String),
    #[error("mnemonic encoding failed: {0}")]
    Encode(#[from] bip39::Error),
}

/// Draw `bits` of entropy from the system RNG.
pub fn system_entropy(bits: usize) -> Result<Vec<u8>, MnemonicError> {
    let mut buf = vec![0u8; bits / 8];
    getrandom::getrandom(&mut buf).map_err(|e| MnemonicError::Entropy(e.to_string()))?;
    Ok(buf)
}

/// Encode raw entropy as a BIP-39 phrase.
pub fn encode_mnemonic(entropy: &[u8]) -> Result<String, MnemonicError> {
    Ok(Mnemonic::from_entropy(entropy)?.to_string())
}

/// Generate a fresh mnemonic phrase.
///
/// The entropy source and phrase encoder are passed in by the caller;
/// production code uses [`system_entropy`] and [`encode_mnemonic`].
pub fn create_mnemonic<E, M>(new_entropy: E, new_mnemonic: M) -> Result<String, MnemonicError>
where
    E: Fn(usize) -> Result<Vec<u8>, MnemonicError>,
    M: Fn(&[u8]) -> Result<String, MnemonicError>,
{
    let entropy = new_entropy(DEFAULT_ENTROPY_BITS)?;
    new_mnemonic(&entropy)
}

/// Derive the seed for a mnemonic phrase.
///
/// Pure function: the same phrase always yields the same seed.
pub fn seed_from_mnemonic(phrase: &str) -> Result<[u8; SEED_SIZE], MnemonicError> {
    let mnemonic = Mnemonic::parse_normalized(phrase)?;
    Ok(mnemonic.to_seed(SEED_PASSPHRASE))
}
