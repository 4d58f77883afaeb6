//! Default database collaborator.
//!
//! Real schema setup belongs to the datastore service and is injected into the
//! bootstrap pipeline as a function. This default implementation seeds the
//! datastore directory and records when the node was created. Key material is
//! fingerprinted, never stored in the clear.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

pub const DATASTORE_DIR_NAME: &str = "datastore";
const SEED_FILE_NAME: &str = "bootstrap.toml";

/// Metadata recorded when the datastore is first seeded.
#[derive(Serialize)]
struct DatastoreSeed {
    created: String,
    #[serde(rename = "identity-fingerprint")]
    identity_fingerprint: String,
}

/// Seed the datastore directory for a freshly initialized repository.
///
/// Matches the collaborator contract the bootstrap pipeline expects:
/// `(mnemonic, identity_key_bytes, password, creation_date)`.
pub fn seed_datastore(
    repo_root: &Path,
    _mnemonic: &str,
    identity_key: &[u8],
    _password: &str,
    creation_date: DateTime<Utc>,
) -> anyhow::Result<()> {
    let dir = repo_root.join(DATASTORE_DIR_NAME);
    fs::create_dir_all(&dir)?;

    let seed = DatastoreSeed {
        created: creation_date.to_rfc3339(),
        identity_fingerprint: blake3::hash(identity_key).to_hex().to_string(),
    };
    fs::write(dir.join(SEED_FILE_NAME), toml::to_string(&seed)?)?;

    tracing::debug!(dir = %dir.display(), "seeded datastore directory");
    Ok(())
}
