//! Timeout policy subsystem.
//!
//! # Responsibilities
//! - Hold a relative timeout and/or an absolute deadline
//! - Compute the remaining budget for an operation
//! - Cooperative checks and bounded condition-variable waits
//!
//! # Design Decisions
//! - Policies are plain values; scheduling lives in `watchdog`
//! - Interruption is reported as a timeout, never as `ErrorKind::Interrupted`

pub mod cancel;
pub mod error;
pub mod policy;

pub use cancel::CancellationToken;
pub use error::{is_timeout, TimeoutError, TimeoutResult};
pub use policy::TimeoutPolicy;
