//! Log subscriber setup.

use tracing_subscriber::EnvFilter;

use crate::config::EngineConfig;

/// Installs a formatting subscriber for the whole process.
///
/// `RUST_LOG` overrides the configured filter. Returns `false` if a global
/// subscriber was already installed, in which case nothing changes.
pub fn init(config: &EngineConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(config.log_target)
        .compact()
        .try_init()
        .is_ok()
}
