//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → shared.rs (atomic swap of Arc<WatchdogConfig>)
//!     → watchdog reads idle threshold, adapters read chunk ceiling
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → shared.rs validates and swaps
//! ```
//!
//! # Design Decisions
//! - All fields have defaults; the crate works with no configuration at all
//! - Validation separates syntactic (serde) from semantic checks
//! - An invalid reload keeps the current configuration

pub mod loader;
pub mod schema;
pub mod shared;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, ConfigError};
pub use schema::{IoConfig, ObservabilityConfig, TimeoutConfig, WatchdogConfig, WatchdogSettings};
pub use shared::{current, install};
pub use validation::ValidationError;
pub use watcher::ConfigWatcher;
