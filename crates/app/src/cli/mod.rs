pub mod args;
pub mod op;
pub mod ops;

pub use ops::{Init, Version};

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Install the global tracing subscriber for CLI runs.
///
/// Respects `RUST_LOG`; defaults to INFO.
pub fn register_tracing() {
    let env_filter = EnvFilter::builder()
        .with_default_directive(tracing::level_filters::LevelFilter::INFO.into())
        .from_env_lossy();

    let stdout_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_filter(env_filter);

    tracing_subscriber::registry().with(stdout_layer).init();
}
