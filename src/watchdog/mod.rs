//! Timeout enforcement subsystem.
//!
//! # Data Flow
//! ```text
//! Guarded call:
//!     → node.rs enter() (compute expiry, insert into schedule)
//!     → schedule.rs (ordered insert; start or wake the watchdog)
//!     → blocking call runs outside the lock
//!     → node.rs exit() (remove; report fired/expired as timed out)
//!
//! Watchdog thread (worker.rs):
//!     wait for earliest expiry → unlink → run hook outside the lock
//!     nothing scheduled for the idle threshold → exit
//! ```
//!
//! # Design Decisions
//! - One watchdog for the whole process, started lazily, gone when idle
//! - The hook is what unblocks a stuck call; without one, expiry is only
//!   detected at exit
//! - Internal failures never reach producer threads

pub mod hook;
pub mod node;
pub(crate) mod schedule;
pub(crate) mod worker;

pub use hook::{NoopHook, ShutdownOnTimeout, TimeoutHook};
pub use node::{EnforcementNode, NodeId};
pub use worker::starts;

use std::time::Instant;

/// Whether a watchdog thread is currently alive.
pub fn is_running() -> bool {
    schedule::global().watchdog_running()
}

/// Number of operations currently scheduled.
pub fn pending() -> usize {
    schedule::global().len()
}

/// Expiries of scheduled operations, earliest first.
pub fn pending_expiries() -> Vec<Instant> {
    schedule::global().expiries()
}
