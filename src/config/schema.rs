//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML files, and
//! every field has a default so an empty file is a valid configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::timeout::TimeoutPolicy;

/// Root configuration for timeout enforcement.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct WatchdogConfig {
    /// Watchdog thread settings.
    pub watchdog: WatchdogSettings,

    /// Stream adapter settings.
    pub io: IoConfig,

    /// Default per-operation timeouts for collaborators.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Watchdog thread configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct WatchdogSettings {
    /// How long the watchdog waits with an empty schedule before exiting.
    pub idle_timeout_ms: u64,

    /// Name given to the watchdog thread.
    pub thread_name: String,
}

impl WatchdogSettings {
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_millis(self.idle_timeout_ms)
    }
}

impl Default for WatchdogSettings {
    fn default() -> Self {
        Self {
            idle_timeout_ms: 60_000,
            thread_name: "io-watchdog".to_string(),
        }
    }
}

/// Stream adapter configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct IoConfig {
    /// Largest number of bytes a single guarded write may carry.
    pub write_chunk_bytes: usize,
}

impl Default for IoConfig {
    fn default() -> Self {
        Self {
            write_chunk_bytes: 64 * 1024,
        }
    }
}

/// Default timeouts, in milliseconds. Zero disables a timeout.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Per-read timeout.
    pub read_timeout_ms: u64,

    /// Per-write timeout (applies to each chunk, flush and close).
    pub write_timeout_ms: u64,

    /// Optional deadline, relative to the moment a policy is built.
    pub deadline_ms: Option<u64>,
}

impl TimeoutConfig {
    /// Policy for the input side of a session.
    pub fn read_policy(&self) -> TimeoutPolicy {
        self.policy(self.read_timeout_ms)
    }

    /// Policy for the output side of a session.
    pub fn write_policy(&self) -> TimeoutPolicy {
        self.policy(self.write_timeout_ms)
    }

    fn policy(&self, timeout_ms: u64) -> TimeoutPolicy {
        let mut policy = TimeoutPolicy::new().with_timeout(Duration::from_millis(timeout_ms));
        if let Some(ms) = self.deadline_ms {
            // Zero is rejected by validation; an unvalidated zero leaves the deadline unset.
            if let Err(e) = policy.set_deadline_after(Duration::from_millis(ms)) {
                tracing::warn!(deadline_ms = ms, error = %e, "Ignoring configured deadline");
            }
        }
        policy
    }
}

/// Observability configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Record metrics through the `metrics` facade.
    pub metrics_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn empty_document_uses_defaults() {
        let config: WatchdogConfig = toml::from_str("").unwrap();
        assert_eq!(config, WatchdogConfig::default());
        assert_eq!(config.watchdog.idle_timeout(), Duration::from_secs(60));
        assert_eq!(config.io.write_chunk_bytes, 65_536);
    }

    #[test]
    fn partial_document_keeps_other_defaults() {
        let config: WatchdogConfig = toml::from_str(
            r#"
            [timeouts]
            read_timeout_ms = 250
            deadline_ms = 5000
            "#,
        )
        .unwrap();
        assert_eq!(config.timeouts.read_timeout_ms, 250);
        assert_eq!(config.timeouts.write_timeout_ms, 0);
        assert_eq!(config.watchdog.thread_name, "io-watchdog");
    }

    #[test]
    fn policies_follow_timeouts() {
        let timeouts = TimeoutConfig {
            read_timeout_ms: 100,
            write_timeout_ms: 0,
            deadline_ms: Some(1_000),
        };
        let before = Instant::now();
        let read = timeouts.read_policy();
        assert_eq!(read.timeout(), Some(Duration::from_millis(100)));
        assert!(read.deadline().is_some_and(|d| d >= before + Duration::from_millis(1_000)));

        let write = timeouts.write_policy();
        assert_eq!(write.timeout(), None);
        assert!(write.has_deadline());

        assert!(TimeoutConfig::default().read_policy().is_disabled());
    }
}
