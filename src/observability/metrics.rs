//! Metrics collection.
//!
//! # Metrics
//! - `io_watchdog_starts_total` (counter): watchdog thread starts
//! - `io_watchdog_fired_total` (counter): timeout hooks invoked
//! - `io_watchdog_timeouts_total` (counter): timeout errors raised, by operation
//! - `io_watchdog_pending` (gauge): scheduled operations
//!
//! # Design Decisions
//! - Recorded through the `metrics` facade; the embedding application
//!   installs the recorder and exporter
//! - Skipped entirely when `observability.metrics_enabled` is false

use crate::config;

fn enabled() -> bool {
    config::current().observability.metrics_enabled
}

pub fn record_watchdog_started() {
    if enabled() {
        metrics::counter!("io_watchdog_starts_total").increment(1);
    }
}

pub fn record_hook_fired() {
    if enabled() {
        metrics::counter!("io_watchdog_fired_total").increment(1);
    }
}

/// Record a timeout error raised to the caller of `operation` (read, write, flush, close).
pub fn record_timed_out(operation: &'static str) {
    if enabled() {
        metrics::counter!("io_watchdog_timeouts_total", "operation" => operation).increment(1);
    }
}

pub fn record_pending(count: usize) {
    if enabled() {
        metrics::gauge!("io_watchdog_pending").set(count as f64);
    }
}
