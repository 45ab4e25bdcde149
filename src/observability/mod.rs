//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! watchdog / adapters produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, gauges via the metrics facade)
//! ```

pub mod logging;
pub mod metrics;
