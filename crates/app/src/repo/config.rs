//! Repository configuration document.
//!
//! The config is a TOML document with named top-level sections. The repository
//! format owns `Identity`, `Addresses`, and `Datastore`; everything else is
//! added after init through [`extend_config_file`], which only ever fills in
//! missing sections. Existing sections are never overwritten, so a user's
//! edits survive re-runs of the extension pass.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use common::identity::Identity;

use super::fsrepo::Repo;

/// Naming resolver consulted for human-readable handles.
pub const RESOLVER_URL: &str = "https://resolver.onename.com/";

/// Gateways listings are crossposted to for web visibility.
pub const CROSSPOST_GATEWAYS: &[&str] =
    &["https://gateway.ob1.io/", "https://gateway.duosear.ch/"];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config i/o error: {0}")]
    Io(#[from] io::Error),
    #[error("config serialization error: {0}")]
    Ser(#[from] toml::ser::Error),
    #[error("config parse error: {0}")]
    De(#[from] toml::de::Error),
}

/// Repository-format defaults plus the node identity.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(rename = "Identity", skip_serializing_if = "Option::is_none")]
    pub identity: Option<Identity>,
    #[serde(rename = "Addresses", default)]
    pub addresses: AddressesConfig,
    #[serde(rename = "Datastore", default)]
    pub datastore: DatastoreConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddressesConfig {
    /// Listen port for the peer endpoint; ephemeral when unset
    #[serde(rename = "PeerPort", skip_serializing_if = "Option::is_none")]
    pub peer_port: Option<u16>,
    /// Gateway listen address
    #[serde(rename = "Gateway")]
    pub gateway: String,
}

impl Default for AddressesConfig {
    fn default() -> Self {
        Self {
            peer_port: None,
            gateway: "127.0.0.1:4102".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatastoreConfig {
    /// Blob store directory, relative to the repository root
    #[serde(rename = "BlobsPath")]
    pub blobs_path: String,
}

impl Default for DatastoreConfig {
    fn default() -> Self {
        Self {
            blobs_path: "blobs".to_string(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Ok(toml::from_str(&fs::read_to_string(path)?)?)
    }

    pub fn persist(&self, path: &Path) -> Result<(), ConfigError> {
        write_atomic(path, &toml::to_string_pretty(self)?)?;
        Ok(())
    }
}

/// Replace `path` with `contents` via a sibling temp file and rename.
///
/// A write failure partway through leaves the original document intact
/// instead of truncating it.
fn write_atomic(path: &Path, contents: &str) -> io::Result<()> {
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, contents)?;
    fs::rename(&tmp, path)
}

/// Wallet defaults for a fresh node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletConfig {
    #[serde(rename = "Type")]
    pub wallet_type: String,
    #[serde(rename = "MaxFee")]
    pub max_fee: u64,
    #[serde(rename = "FeeAPI")]
    pub fee_api: String,
    #[serde(rename = "HighFeeDefault")]
    pub high_fee_default: u64,
    #[serde(rename = "MediumFeeDefault")]
    pub medium_fee_default: u64,
    #[serde(rename = "LowFeeDefault")]
    pub low_fee_default: u64,
    #[serde(rename = "TrustedPeer")]
    pub trusted_peer: String,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            wallet_type: "spvwallet".to_string(),
            max_fee: 2000,
            fee_api: "https://bitcoinfees.21.co/api/v1/fees/recommended".to_string(),
            high_fee_default: 160,
            medium_fee_default: 140,
            low_fee_default: 120,
            trusted_peer: String::new(),
        }
    }
}

/// JSON-API settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(rename = "Enabled")]
    pub enabled: bool,
    #[serde(rename = "AllowedIPs")]
    pub allowed_ips: Vec<String>,
    #[serde(rename = "HTTPHeaders", skip_serializing_if = "Option::is_none")]
    pub http_headers: Option<BTreeMap<String, String>>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            allowed_ips: Vec::new(),
            http_headers: None,
        }
    }
}

/// Anonymizing-network settings; empty until the user opts in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TorConfig {
    #[serde(rename = "SocksPort", skip_serializing_if = "Option::is_none")]
    pub socks_port: Option<u16>,
    #[serde(rename = "Password", skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

/// Add `section` to the repository config document if absent.
///
/// Merge-if-absent: a section that already exists is left byte-for-byte
/// untouched and the call succeeds without writing. Each call reads and
/// persists the document independently, so a failure in one section never
/// corrupts sections committed before it.
pub fn extend_config_file<T: Serialize>(
    repo: &Repo,
    section: &str,
    value: T,
) -> Result<(), ConfigError> {
    let path = repo.config_path();
    let text = fs::read_to_string(&path)?;
    let mut doc: toml::Table = text.parse()?;
    if doc.contains_key(section) {
        return Ok(());
    }
    let value = toml::Value::try_from(value)?;
    doc.insert(section.to_string(), value);
    write_atomic(&path, &toml::to_string_pretty(&doc)?)?;
    Ok(())
}

/// Apply the fixed list of souk config sections to a fresh repository.
///
/// Sections are independent: a failure partway through leaves earlier sections
/// committed and later ones absent.
pub fn add_config_extensions(repo: &Repo) -> Result<(), ConfigError> {
    extend_config_file(repo, "Wallet", WalletConfig::default())?;
    extend_config_file(repo, "Resolver", RESOLVER_URL)?;
    extend_config_file(
        repo,
        "Crosspost-gateways",
        CROSSPOST_GATEWAYS
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<String>>(),
    )?;
    extend_config_file(repo, "Dropbox-api-token", "")?;
    extend_config_file(repo, "JSON-API", ApiConfig::default())?;
    extend_config_file(repo, "Tor-config", TorConfig::default())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repo::fsrepo;

    fn write_minimal_repo(root: &Path) -> Repo {
        Config::default()
            .persist(&root.join(fsrepo::CONFIG_FILE_NAME))
            .unwrap();
        Repo::open(root).unwrap()
    }

    #[test]
    fn test_extend_adds_missing_section() {
        let dir = tempfile::tempdir().unwrap();
        let repo = write_minimal_repo(dir.path());

        extend_config_file(&repo, "Resolver", RESOLVER_URL).unwrap();

        let doc: toml::Table = fs::read_to_string(repo.config_path())
            .unwrap()
            .parse()
            .unwrap();
        assert_eq!(doc["Resolver"].as_str(), Some(RESOLVER_URL));
    }

    #[test]
    fn test_extend_never_overwrites_existing_section() {
        let dir = tempfile::tempdir().unwrap();
        let repo = write_minimal_repo(dir.path());

        extend_config_file(&repo, "Resolver", "https://example.com/").unwrap();
        let before = fs::read_to_string(repo.config_path()).unwrap();

        // second call with a different value is a no-op
        extend_config_file(&repo, "Resolver", RESOLVER_URL).unwrap();
        let after = fs::read_to_string(repo.config_path()).unwrap();

        assert_eq!(before, after);
    }

    #[test]
    fn test_extensions_populate_expected_sections() {
        let dir = tempfile::tempdir().unwrap();
        let repo = write_minimal_repo(dir.path());

        add_config_extensions(&repo).unwrap();

        let doc: toml::Table = fs::read_to_string(repo.config_path())
            .unwrap()
            .parse()
            .unwrap();
        assert_eq!(doc["Wallet"]["Type"].as_str(), Some("spvwallet"));
        assert_eq!(doc["Resolver"].as_str(), Some(RESOLVER_URL));
        let gateways: Vec<&str> = doc["Crosspost-gateways"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        assert_eq!(gateways, CROSSPOST_GATEWAYS);
        assert_eq!(doc["Dropbox-api-token"].as_str(), Some(""));
        assert_eq!(doc["JSON-API"]["Enabled"].as_bool(), Some(true));
        assert!(doc["Tor-config"].as_table().unwrap().is_empty());
    }

    #[test]
    fn test_extensions_are_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let repo = write_minimal_repo(dir.path());

        add_config_extensions(&repo).unwrap();
        let before = fs::read_to_string(repo.config_path()).unwrap();
        add_config_extensions(&repo).unwrap();
        let after = fs::read_to_string(repo.config_path()).unwrap();

        assert_eq!(before, after);
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_section_leaves_earlier_sections_committed() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let repo = write_minimal_repo(dir.path());

        extend_config_file(&repo, "Wallet", WalletConfig::default()).unwrap();
        extend_config_file(&repo, "Resolver", RESOLVER_URL).unwrap();

        // seal the directory so the replacement document cannot be staged;
        // the next section must fail cleanly
        fs::set_permissions(dir.path(), fs::Permissions::from_mode(0o555)).unwrap();
        let result = extend_config_file(&repo, "Dropbox-api-token", "");
        assert!(result.is_err());
        fs::set_permissions(dir.path(), fs::Permissions::from_mode(0o755)).unwrap();

        let doc: toml::Table = fs::read_to_string(repo.config_path())
            .unwrap()
            .parse()
            .unwrap();
        assert!(doc.contains_key("Wallet"));
        assert!(doc.contains_key("Resolver"));
        assert!(!doc.contains_key("Dropbox-api-token"));
    }

    #[test]
    fn test_extend_replaces_document_without_leaving_staging_file() {
        let dir = tempfile::tempdir().unwrap();
        let repo = write_minimal_repo(dir.path());

        extend_config_file(&repo, "Resolver", RESOLVER_URL).unwrap();

        assert!(!repo.config_path().with_extension("tmp").exists());
        let doc: toml::Table = fs::read_to_string(repo.config_path())
            .unwrap()
            .parse()
            .unwrap();
        assert!(doc.contains_key("Resolver"));
    }

    #[test]
    fn test_config_round_trips_identity() {
        let dir = tempfile::tempdir().unwrap();
        let key = common::crypto::SecretKey::generate().unwrap();
        let identity = Identity::from_key(&key);

        let config = Config {
            identity: Some(identity.clone()),
            ..Default::default()
        };
        let path = dir.path().join(fsrepo::CONFIG_FILE_NAME);
        config.persist(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.identity, Some(identity));
        assert_eq!(loaded.datastore.blobs_path, "blobs");
    }
}
