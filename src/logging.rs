//! Log output for the `photo_clusters` binary.
//!
//! The library itself only emits `tracing` events and never installs a subscriber.
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Installs a stderr subscriber.
///
/// The level comes from the `PHOTO_CLUSTERS_LOG` environment variable
/// (for example `PHOTO_CLUSTERS_LOG=debug`), defaulting to `info`.
pub fn init() -> Result<(), TryInitError> {
    let env_filter =
        EnvFilter::try_from_env("PHOTO_CLUSTERS_LOG").unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init()
}
