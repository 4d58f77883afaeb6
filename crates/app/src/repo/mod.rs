//! One-time node bootstrap.
//!
//! Bootstrap is a strictly sequential pipeline over independently failable
//! resources: the filesystem, key derivation, the repository format, and the
//! keyspace. Every stage is a hard gate; a failure aborts the whole sequence
//! and nothing already completed is rolled back. The one safety-critical
//! guard is the repository existence check, which runs before any key is
//! derived and before the repository writes anything: re-running init over an
//! existing repository would silently overwrite its keys.

pub mod config;
pub mod dirs;
pub mod fsrepo;
pub mod keyspace;

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use common::identity::{derive_identity, KeyDerivationError};
use common::mnemonic::{self, MnemonicError};

use self::config::{Config, ConfigError};
use self::dirs::WritabilityError;
use self::fsrepo::FsRepoError;
use self::keyspace::KeyspaceInitError;

/// Stages of the bootstrap pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Scaffolding,
    CheckingWritable,
    DerivingIdentity,
    InitializingRepo,
    ExtendingConfig,
    InitializingDatabase,
    InitializingKeyspace,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Scaffolding => "scaffolding directories",
            Stage::CheckingWritable => "checking writability",
            Stage::DerivingIdentity => "deriving identity",
            Stage::InitializingRepo => "initializing repository",
            Stage::ExtendingConfig => "extending config",
            Stage::InitializingDatabase => "initializing database",
            Stage::InitializingKeyspace => "initializing keyspace",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("failed to scaffold repository directories: {0}")]
    Scaffold(#[from] std::io::Error),
    #[error(transparent)]
    Writability(#[from] WritabilityError),
    #[error(transparent)]
    Mnemonic(#[from] MnemonicError),
    #[error(transparent)]
    KeyDerivation(#[from] KeyDerivationError),
    #[error(transparent)]
    Repo(#[from] FsRepoError),
    #[error("failed to extend config: {0}")]
    ConfigExtend(#[from] ConfigError),
    #[error("database initialization failed: {0}")]
    DatabaseInit(#[source] anyhow::Error),
    #[error(transparent)]
    Keyspace(#[from] KeyspaceInitError),
}

impl InitError {
    /// The pipeline stage at which this failure occurred.
    pub fn stage(&self) -> Stage {
        match self {
            InitError::Scaffold(_) => Stage::Scaffolding,
            InitError::Writability(_) => Stage::CheckingWritable,
            InitError::Mnemonic(_) | InitError::KeyDerivation(_) => Stage::DerivingIdentity,
            InitError::Repo(_) => Stage::InitializingRepo,
            InitError::ConfigExtend(_) => Stage::ExtendingConfig,
            InitError::DatabaseInit(_) => Stage::InitializingDatabase,
            InitError::Keyspace(_) => Stage::InitializingKeyspace,
        }
    }
}

/// Caller-supplied parameters for a bootstrap run.
#[derive(Debug, Clone)]
pub struct InitOptions {
    /// Mnemonic phrase to recover from; a fresh one is generated when absent
    pub mnemonic: Option<String>,
    /// Password protecting the node database
    pub password: String,
    /// Requested identity key strength, in bits
    pub key_strength_bits: usize,
    /// Timestamp recorded as the node's creation date
    pub creation_date: DateTime<Utc>,
}

/// What a successful bootstrap produced.
#[derive(Debug, Clone)]
pub struct InitReport {
    pub repo_root: PathBuf,
    pub peer_id: String,
    /// Set when no mnemonic was supplied; the caller must show it to the
    /// user, it is not persisted anywhere in the clear
    pub generated_mnemonic: Option<String>,
}

/// Run the full bootstrap pipeline at `repo_root`.
///
/// `db_init` is the database collaborator, called once between config
/// extension and keyspace initialization with
/// `(mnemonic, identity_key_bytes, password, creation_date)`.
pub async fn do_init<F>(
    repo_root: &Path,
    opts: InitOptions,
    db_init: F,
) -> Result<InitReport, InitError>
where
    F: FnOnce(&str, &[u8], &str, DateTime<Utc>) -> anyhow::Result<()>,
{
    dirs::scaffold_directories(repo_root)?;
    dirs::check_writable(repo_root)?;

    // the one safety-critical guard: never derive or write anything over an
    // existing repository
    if fsrepo::is_initialized(repo_root) {
        return Err(FsRepoError::AlreadyInitialized.into());
    }

    let (mnemonic_phrase, generated) = match opts.mnemonic {
        Some(phrase) if !phrase.is_empty() => (phrase, false),
        _ => (
            mnemonic::create_mnemonic(mnemonic::system_entropy, mnemonic::encode_mnemonic)?,
            true,
        ),
    };

    tracing::info!("generating Ed25519 keypair");
    let (identity_key, identity) = derive_identity(&mnemonic_phrase, opts.key_strength_bits)?;

    let config = Config {
        identity: Some(identity.clone()),
        ..Default::default()
    };

    tracing::info!(
        root = %repo_root.display(),
        peer_id = %identity.peer_id,
        "initializing souk node"
    );
    fsrepo::init(repo_root, &config).await?;

    {
        let repo = fsrepo::Repo::open(repo_root)?;
        repo.write_identity_key(&identity_key)?;
        config::add_config_extensions(&repo)?;
        repo.close()?;
    }

    db_init(
        &mnemonic_phrase,
        &identity_key.to_bytes(),
        &opts.password,
        opts.creation_date,
    )
    .map_err(InitError::DatabaseInit)?;

    keyspace::initialize_keyspace(repo_root, &identity_key).await?;

    Ok(InitReport {
        repo_root: repo_root.to_path_buf(),
        peer_id: identity.peer_id,
        generated_mnemonic: generated.then_some(mnemonic_phrase),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    fn test_opts(mnemonic: Option<&str>) -> InitOptions {
        InitOptions {
            mnemonic: mnemonic.map(str::to_string),
            password: "pw".to_string(),
            key_strength_bits: 2048,
            creation_date: Utc::now(),
        }
    }

    fn noop_db_init(
        _mnemonic: &str,
        _key: &[u8],
        _password: &str,
        _created: DateTime<Utc>,
    ) -> anyhow::Result<()> {
        Ok(())
    }

    #[tokio::test]
    async fn test_bootstrap_on_empty_root() {
        let dir = tempfile::tempdir().unwrap();
        let db_called = Arc::new(AtomicBool::new(false));
        let flag = db_called.clone();

        let report = do_init(dir.path(), test_opts(None), move |mnemonic, key, pw, _| {
            assert_eq!(mnemonic.split_whitespace().count(), 12);
            assert_eq!(key.len(), 32);
            assert_eq!(pw, "pw");
            flag.store(true, Ordering::SeqCst);
            Ok(())
        })
        .await
        .unwrap();

        assert!(db_called.load(Ordering::SeqCst));
        assert!(report.generated_mnemonic.is_some());

        // resulting config carries identity plus every extension section
        let text = std::fs::read_to_string(dir.path().join(fsrepo::CONFIG_FILE_NAME)).unwrap();
        let doc: toml::Table = text.parse().unwrap();
        assert_eq!(
            doc["Identity"]["PeerID"].as_str(),
            Some(report.peer_id.as_str())
        );
        assert_eq!(doc["Wallet"]["Type"].as_str(), Some("spvwallet"));
        assert_eq!(doc["Resolver"].as_str(), Some(config::RESOLVER_URL));
        assert_eq!(doc["JSON-API"]["Enabled"].as_bool(), Some(true));
        let gateways: Vec<&str> = doc["Crosspost-gateways"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        assert_eq!(gateways, config::CROSSPOST_GATEWAYS);

        // identity record persisted alongside
        assert!(dir.path().join(fsrepo::IDENTITY_FILE_NAME).exists());
    }

    #[tokio::test]
    async fn test_bootstrap_is_deterministic_for_a_phrase() {
        let phrase = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

        let dir_a = tempfile::tempdir().unwrap();
        let report_a = do_init(dir_a.path(), test_opts(Some(phrase)), noop_db_init)
            .await
            .unwrap();
        assert!(report_a.generated_mnemonic.is_none());

        let dir_b = tempfile::tempdir().unwrap();
        let report_b = do_init(dir_b.path(), test_opts(Some(phrase)), noop_db_init)
            .await
            .unwrap();

        assert_eq!(report_a.peer_id, report_b.peer_id);
    }

    #[tokio::test]
    async fn test_second_bootstrap_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        do_init(dir.path(), test_opts(None), noop_db_init)
            .await
            .unwrap();

        let err = do_init(dir.path(), test_opts(None), noop_db_init)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            InitError::Repo(FsRepoError::AlreadyInitialized)
        ));
        assert_eq!(err.stage(), Stage::InitializingRepo);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_readonly_root_fails_before_key_derivation() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        // scaffold first so the pipeline reaches the writability probe, then seal
        dirs::scaffold_directories(dir.path()).unwrap();
        std::fs::set_permissions(dir.path(), std::fs::Permissions::from_mode(0o555)).unwrap();

        let db_called = Arc::new(AtomicBool::new(false));
        let flag = db_called.clone();
        let err = do_init(dir.path(), test_opts(None), move |_, _, _, _| {
            flag.store(true, Ordering::SeqCst);
            Ok(())
        })
        .await
        .unwrap_err();

        std::fs::set_permissions(dir.path(), std::fs::Permissions::from_mode(0o755)).unwrap();

        assert_eq!(err.stage(), Stage::CheckingWritable);
        assert!(!db_called.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_database_failure_aborts_before_keyspace() {
        let dir = tempfile::tempdir().unwrap();
        let err = do_init(dir.path(), test_opts(None), |_, _, _, _| {
            Err(anyhow::anyhow!("disk full"))
        })
        .await
        .unwrap_err();

        assert_eq!(err.stage(), Stage::InitializingDatabase);
        // earlier stages are not rolled back: the repo stays initialized,
        // so a retry is refused and recovery is manual
        assert!(fsrepo::is_initialized(dir.path()));
        let config = Config::load(&dir.path().join(fsrepo::CONFIG_FILE_NAME)).unwrap();
        assert!(config.identity.is_some());
    }
}
