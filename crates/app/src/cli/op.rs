use std::error::Error;
use std::path::PathBuf;

/// Name of the default repository directory under the user's home.
const DEFAULT_REPO_DIR: &str = ".souk";

#[derive(Debug, thiserror::Error)]
pub enum OpContextError {
    #[error("no home directory found")]
    NoHomeDirectory,
}

/// Resolve the repository root.
///
/// Priority: explicit `--repo-root` flag > `~/.souk`.
pub fn resolve_repo_root(explicit: Option<PathBuf>) -> Result<PathBuf, OpContextError> {
    if let Some(path) = explicit {
        return Ok(path);
    }
    let home = dirs::home_dir().ok_or(OpContextError::NoHomeDirectory)?;
    Ok(home.join(DEFAULT_REPO_DIR))
}

#[derive(Clone)]
pub struct OpContext {
    /// Optional custom repository root (defaults to ~/.souk)
    pub repo_root: Option<PathBuf>,
}

impl OpContext {
    pub fn new(repo_root: Option<PathBuf>) -> Self {
        Self { repo_root }
    }

    /// Repository root for this invocation.
    pub fn repo_root(&self) -> Result<PathBuf, OpContextError> {
        resolve_repo_root(self.repo_root.clone())
    }
}

#[async_trait::async_trait]
pub trait Op: Send + Sync {
    type Error: Error + Send + Sync + 'static;
    type Output;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error>;
}

#[macro_export]
macro_rules! command_enum {
    ($(($variant:ident, $type:ty)),* $(,)?) => {
        #[derive(Subcommand, Debug, Clone)]
        pub enum Command {
            $($variant($type),)*
        }

        #[derive(Debug)]
        pub enum OpOutput {
            $($variant(<$type as $crate::cli::op::Op>::Output),)*
        }

        #[derive(Debug, thiserror::Error)]
        pub enum OpError {
            $(
                #[error(transparent)]
                $variant(<$type as $crate::cli::op::Op>::Error),
            )*
        }

        #[async_trait::async_trait]
        impl $crate::cli::op::Op for Command {
            type Output = OpOutput;
            type Error = OpError;

            async fn execute(&self, ctx: &$crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
                match self {
                    $(
                        Command::$variant(op) => {
                            op.execute(ctx).await
                                .map(OpOutput::$variant)
                                .map_err(OpError::$variant)
                        },
                    )*
                }
            }
        }

        impl std::fmt::Display for OpOutput {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(
                        OpOutput::$variant(output) => write!(f, "{}", output),
                    )*
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_repo_root_explicit_wins() {
        let explicit = PathBuf::from("/var/lib/souk");
        let result = resolve_repo_root(Some(explicit.clone())).unwrap();
        assert_eq!(result, explicit);
    }

    #[test]
    fn test_resolve_repo_root_defaults_under_home() {
        let result = resolve_repo_root(None).unwrap();
        assert!(result.ends_with(DEFAULT_REPO_DIR));
    }
}
