pub use clap::Parser;

use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "souk")]
#[command(about = "souk marketplace node")]
pub struct Args {
    /// Path to the souk repository root (defaults to ~/.souk)
    #[arg(long, global = true)]
    pub repo_root: Option<PathBuf>,

    #[command(subcommand)]
    pub command: crate::Command,
}
