use std::path::PathBuf;

use chrono::Utc;
use clap::Args;

use crate::database;
use crate::repo::{self, fsrepo, InitError, InitOptions};

#[derive(Args, Debug, Clone)]
pub struct Init {
    /// Recover an existing identity from a mnemonic phrase instead of
    /// generating a fresh one
    #[arg(long)]
    pub mnemonic: Option<String>,

    /// Password protecting the node database
    #[arg(long, default_value = "")]
    pub password: String,

    /// Requested identity key strength, in bits
    #[arg(long, default_value_t = 4096)]
    pub key_strength: usize,

    /// Remove an existing repository before initializing. Destroys the
    /// keys stored there.
    #[arg(short = 'f', long)]
    pub force: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum InitOpError {
    #[error(transparent)]
    Context(#[from] crate::cli::op::OpContextError),
    #[error(transparent)]
    Init(#[from] InitError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Init {
    type Error = InitOpError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let repo_root = ctx.repo_root()?;

        if self.force && fsrepo::is_initialized(&repo_root) {
            tracing::warn!(
                root = %repo_root.display(),
                "removing existing repository before reinitializing"
            );
            fsrepo::remove(&repo_root).map_err(InitError::from)?;
        }

        let opts = InitOptions {
            mnemonic: self.mnemonic.clone(),
            password: self.password.clone(),
            key_strength_bits: self.key_strength,
            creation_date: Utc::now(),
        };

        let db_root: PathBuf = repo_root.clone();
        let report = repo::do_init(&repo_root, opts, move |mnemonic, key, password, created| {
            database::seed_datastore(&db_root, mnemonic, key, password, created)
        })
        .await?;

        let mut output = format!(
            "Initialized souk node at: {}\n\
             - PeerID: {}\n\
             - Config: {}\n\
             - Identity key: {}\n\
             - Blobs: {}",
            report.repo_root.display(),
            report.peer_id,
            report.repo_root.join(fsrepo::CONFIG_FILE_NAME).display(),
            report.repo_root.join(fsrepo::IDENTITY_FILE_NAME).display(),
            report.repo_root.join(fsrepo::BLOBS_DIR_NAME).display(),
        );
        if let Some(mnemonic) = report.generated_mnemonic {
            output.push_str(&format!(
                "\n\nYour mnemonic phrase:\n  {}\n\
                 Write it down. It is the only way to recover this identity.",
                mnemonic
            ));
        }

        Ok(output)
    }
}
