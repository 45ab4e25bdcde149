//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (idle timeout > 0, chunk ceiling bounded)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: WatchdogConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;

use crate::config::schema::WatchdogConfig;

/// Smallest accepted write chunk ceiling.
pub const MIN_WRITE_CHUNK_BYTES: usize = 1024;
/// Largest accepted write chunk ceiling.
pub const MAX_WRITE_CHUNK_BYTES: usize = 16 * 1024 * 1024;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("watchdog.idle_timeout_ms must be greater than zero")]
    ZeroIdleTimeout,

    #[error("watchdog.thread_name must be non-empty and contain no NUL bytes")]
    InvalidThreadName,

    #[error("io.write_chunk_bytes must be between {min} and {max}, got {actual}")]
    ChunkSizeOutOfRange { min: usize, max: usize, actual: usize },

    #[error("timeouts.deadline_ms must be greater than zero when set")]
    ZeroDeadline,
}

/// Check a configuration, collecting every problem found.
pub fn validate_config(config: &WatchdogConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.watchdog.idle_timeout_ms == 0 {
        errors.push(ValidationError::ZeroIdleTimeout);
    }
    let name = &config.watchdog.thread_name;
    if name.trim().is_empty() || name.contains('\0') {
        errors.push(ValidationError::InvalidThreadName);
    }

    let chunk = config.io.write_chunk_bytes;
    if !(MIN_WRITE_CHUNK_BYTES..=MAX_WRITE_CHUNK_BYTES).contains(&chunk) {
        errors.push(ValidationError::ChunkSizeOutOfRange {
            min: MIN_WRITE_CHUNK_BYTES,
            max: MAX_WRITE_CHUNK_BYTES,
            actual: chunk,
        });
    }

    if config.timeouts.deadline_ms == Some(0) {
        errors.push(ValidationError::ZeroDeadline);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(validate_config(&WatchdogConfig::default()).is_ok());
    }

    #[test]
    fn reports_every_problem() {
        let mut config = WatchdogConfig::default();
        config.watchdog.idle_timeout_ms = 0;
        config.io.write_chunk_bytes = 10;
        config.timeouts.deadline_ms = Some(0);

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.contains(&ValidationError::ZeroIdleTimeout));
        assert!(errors.contains(&ValidationError::ZeroDeadline));
        assert!(matches!(
            errors[1],
            ValidationError::ChunkSizeOutOfRange { actual: 10, .. }
        ));
    }
}
