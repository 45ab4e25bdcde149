//! Timeout and deadline enforcement for blocking I/O.
//!
//! Blocking reads, writes, flushes and closes have no native cancellation.
//! This crate bounds them from the outside: each call is bracketed by
//! [`EnforcementNode::enter`] and [`EnforcementNode::exit`], a single
//! background watchdog fires a hook when a bracket outlives its budget, and
//! the hook (closing the socket, for instance) is what unblocks the call.
//!
//! ```no_run
//! use std::io::Write;
//! use std::net::TcpStream;
//! use std::time::Duration;
//! use io_watchdog::{stream, TimeoutPolicy};
//!
//! # fn main() -> std::io::Result<()> {
//! let socket = TcpStream::connect("127.0.0.1:7000")?;
//! let policy = TimeoutPolicy::new().with_timeout(Duration::from_secs(5));
//! let (_reader, mut writer) = stream::socket::split(&socket, policy.clone(), policy)?;
//! writer.write_all(b"ping")?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod observability;
pub mod stream;
pub mod timeout;
pub mod watchdog;

pub use config::WatchdogConfig;
pub use stream::{TimeoutReader, TimeoutWriter};
pub use timeout::{is_timeout, CancellationToken, TimeoutError, TimeoutPolicy, TimeoutResult};
pub use watchdog::{EnforcementNode, NodeId, ShutdownOnTimeout, TimeoutHook};
