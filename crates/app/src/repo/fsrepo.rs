//! Filesystem repository lifecycle.
//!
//! The repository root holds the config document, the identity record, and the
//! blob store. Initialization is the single irreversible step of bootstrap:
//! once the config document exists, [`init`] refuses to run again, because
//! laying the repository down a second time would discard the identity key
//! already stored there. Recovering from a partially configured repository
//! means removing it, not re-running init.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use common::crypto::{KeyError, SecretKey};
use common::node::{BlobsStore, BlobsStoreError};

use crate::database::DATASTORE_DIR_NAME;

use super::config::{Config, ConfigError};

pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const VERSION_FILE_NAME: &str = "version";
pub const IDENTITY_FILE_NAME: &str = "identity.pem";
pub const BLOBS_DIR_NAME: &str = "blobs";

/// Current on-disk repository layout version.
pub const REPO_VERSION: u32 = 1;

#[derive(Debug, thiserror::Error)]
pub enum FsRepoError {
    #[error(
        "souk repository already exists. Reinitializing would overwrite your keys. \
         Pass --force to overwrite."
    )]
    AlreadyInitialized,
    #[error("repository at {0} is not initialized")]
    NotInitialized(PathBuf),
    #[error("repository i/o error: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("blobs store error: {0}")]
    BlobsStore(#[from] BlobsStoreError),
    #[error("identity key error: {0}")]
    Key(#[from] KeyError),
}

/// Whether a repository has already been laid down at `repo_root`.
pub fn is_initialized(repo_root: &Path) -> bool {
    repo_root.join(CONFIG_FILE_NAME).exists()
}

/// Lay down a fresh repository at `repo_root` using `config`.
///
/// The existence check runs before anything is written. The config document is
/// written last, so [`is_initialized`] only reports true once the layout is
/// complete.
pub async fn init(repo_root: &Path, config: &Config) -> Result<(), FsRepoError> {
    if is_initialized(repo_root) {
        return Err(FsRepoError::AlreadyInitialized);
    }

    fs::write(
        repo_root.join(VERSION_FILE_NAME),
        format!("{}\n", REPO_VERSION),
    )?;

    let blobs_path = repo_root.join(BLOBS_DIR_NAME);
    fs::create_dir_all(&blobs_path)?;
    // load once so the store lays down its own files
    let _store = BlobsStore::fs(&blobs_path).await?;

    config.persist(&repo_root.join(CONFIG_FILE_NAME))?;
    Ok(())
}

/// Remove repository-owned files so the root can be reinitialized.
///
/// Destroys the identity key. Scaffolded content directories are left alone.
pub fn remove(repo_root: &Path) -> Result<(), FsRepoError> {
    for name in [CONFIG_FILE_NAME, VERSION_FILE_NAME, IDENTITY_FILE_NAME] {
        let path = repo_root.join(name);
        if path.exists() {
            fs::remove_file(path)?;
        }
    }
    for dir in [BLOBS_DIR_NAME, DATASTORE_DIR_NAME] {
        let path = repo_root.join(dir);
        if path.exists() {
            fs::remove_dir_all(path)?;
        }
    }
    Ok(())
}

/// Open handle on an initialized repository.
///
/// Scoped resource: acquired, used, and given back with [`Repo::close`] before
/// the owning function returns.
#[derive(Debug)]
pub struct Repo {
    root: PathBuf,
}

impl Repo {
    pub fn open(repo_root: &Path) -> Result<Self, FsRepoError> {
        if !is_initialized(repo_root) {
            return Err(FsRepoError::NotInitialized(repo_root.to_path_buf()));
        }
        Ok(Self {
            root: repo_root.to_path_buf(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join(CONFIG_FILE_NAME)
    }

    pub fn blobs_path(&self) -> PathBuf {
        self.root.join(BLOBS_DIR_NAME)
    }

    pub fn read_config(&self) -> Result<Config, FsRepoError> {
        Ok(Config::load(&self.config_path())?)
    }

    pub fn write_config(&self, config: &Config) -> Result<(), FsRepoError> {
        Ok(config.persist(&self.config_path())?)
    }

    /// Persist the identity key as the repository's identity record.
    pub fn write_identity_key(&self, key: &SecretKey) -> Result<(), FsRepoError> {
        fs::write(self.root.join(IDENTITY_FILE_NAME), key.to_pem())?;
        Ok(())
    }

    /// Load the identity key back from the repository.
    pub fn load_identity_key(&self) -> Result<SecretKey, FsRepoError> {
        let pem = fs::read_to_string(self.root.join(IDENTITY_FILE_NAME))?;
        Ok(SecretKey::from_pem(&pem)?)
    }

    /// Release the handle.
    pub fn close(self) -> Result<(), FsRepoError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_init_lays_down_repository() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!is_initialized(dir.path()));

        init(dir.path(), &Config::default()).await.unwrap();

        assert!(is_initialized(dir.path()));
        assert!(dir.path().join(VERSION_FILE_NAME).exists());
        assert!(dir.path().join(BLOBS_DIR_NAME).is_dir());
    }

    #[tokio::test]
    async fn test_init_refuses_to_run_twice() {
        let dir = tempfile::tempdir().unwrap();
        init(dir.path(), &Config::default()).await.unwrap();

        let result = init(dir.path(), &Config::default()).await;
        assert!(matches!(result, Err(FsRepoError::AlreadyInitialized)));
    }

    #[tokio::test]
    async fn test_identity_key_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        init(dir.path(), &Config::default()).await.unwrap();

        let repo = Repo::open(dir.path()).unwrap();
        let key = SecretKey::generate().unwrap();
        repo.write_identity_key(&key).unwrap();
        let loaded = repo.load_identity_key().unwrap();
        assert_eq!(key.to_bytes(), loaded.to_bytes());
        repo.close().unwrap();
    }

    #[test]
    fn test_open_requires_initialized_repo() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Repo::open(dir.path()),
            Err(FsRepoError::NotInitialized(_))
        ));
    }

    #[tokio::test]
    async fn test_remove_clears_repository_files() {
        let dir = tempfile::tempdir().unwrap();
        init(dir.path(), &Config::default()).await.unwrap();
        let repo = Repo::open(dir.path()).unwrap();
        repo.write_identity_key(&SecretKey::generate().unwrap())
            .unwrap();
        repo.close().unwrap();

        remove(dir.path()).unwrap();
        assert!(!is_initialized(dir.path()));
        assert!(!dir.path().join(IDENTITY_FILE_NAME).exists());
        assert!(!dir.path().join(BLOBS_DIR_NAME).exists());
    }
}
