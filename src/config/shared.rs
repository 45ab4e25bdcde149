//! Process-wide configuration snapshot.

use std::sync::{Arc, LazyLock};

use arc_swap::ArcSwap;

use crate::config::schema::WatchdogConfig;
use crate::config::validation::{validate_config, ValidationError};

static CURRENT: LazyLock<ArcSwap<WatchdogConfig>> =
    LazyLock::new(|| ArcSwap::from_pointee(WatchdogConfig::default()));

/// Snapshot of the active configuration.
pub fn current() -> Arc<WatchdogConfig> {
    CURRENT.load_full()
}

/// Validate and atomically replace the active configuration.
///
/// Threads already waiting keep the values they read; the next idle wait of
/// the watchdog and every adapter created afterwards observe the new ones.
pub fn install(config: WatchdogConfig) -> Result<(), Vec<ValidationError>> {
    validate_config(&config)?;
    tracing::info!(
        idle_timeout_ms = config.watchdog.idle_timeout_ms,
        write_chunk_bytes = config.io.write_chunk_bytes,
        "Watchdog configuration installed"
    );
    CURRENT.store(Arc::new(config));
    Ok(())
}
