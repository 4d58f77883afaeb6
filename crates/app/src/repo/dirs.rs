//! Repository directory scaffolding and writability probing.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Fixed set of directories every repository expects, relative to the root.
///
/// Ordered so parents come before children, though `create_dir_all` would
/// create missing parents anyway.
const SCAFFOLD_DIRS: &[&str] = &[
    "root",
    "root/listings",
    "root/ratings",
    "root/images",
    "root/images/tiny",
    "root/images/small",
    "root/images/medium",
    "root/images/large",
    "root/images/original",
    "root/feed",
    "root/channel",
    "root/files",
    "outbox",
    "logs",
];

/// Create the fixed directory tree under `repo_root`.
///
/// Idempotent: directories that already exist are left alone. Stops at the
/// first directory that cannot be created; nothing already created is rolled
/// back.
pub fn scaffold_directories(repo_root: &Path) -> io::Result<()> {
    for dir in SCAFFOLD_DIRS {
        fs::create_dir_all(repo_root.join(dir))?;
    }
    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum WritabilityError {
    #[error("{0} is not writeable by the current user")]
    NotWritable(PathBuf),
    #[error("unexpected error while checking writeability of {path}: {source}")]
    Unexpected {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}

/// Probe `dir` for writability without touching existing content.
///
/// Runs before any key material is derived so a write failure can never strand
/// a freshly generated identity.
pub fn check_writable(dir: &Path) -> Result<(), WritabilityError> {
    match fs::metadata(dir) {
        Ok(_) => {
            // Directory exists, make sure we can write to it
            let probe = dir.join("test");
            match fs::File::create(&probe) {
                Ok(file) => {
                    drop(file);
                    fs::remove_file(&probe)?;
                    Ok(())
                }
                Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
                    Err(WritabilityError::NotWritable(dir.to_path_buf()))
                }
                Err(e) => Err(WritabilityError::Unexpected {
                    path: dir.to_path_buf(),
                    source: e,
                }),
            }
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            // Directory does not exist, check that we can create it
            create_dir_restricted(dir).map_err(WritabilityError::Io)
        }
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
            Err(WritabilityError::NotWritable(dir.to_path_buf()))
        }
        Err(e) => Err(WritabilityError::Io(e)),
    }
}

#[cfg(unix)]
fn create_dir_restricted(dir: &Path) -> io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    fs::DirBuilder::new().mode(0o775).create(dir)
}

#[cfg(not(unix))]
fn create_dir_restricted(dir: &Path) -> io::Result<()> {
    fs::create_dir(dir)
}
