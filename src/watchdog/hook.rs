//! Timeout hooks invoked by the watchdog.

use std::net::{Shutdown, TcpStream};

/// Action taken when a scheduled operation expires.
///
/// Runs on the watchdog thread, outside the schedule lock. Implementations
/// should make the blocked operation return, typically by closing or
/// shutting down the resource it is blocked on. The default does nothing,
/// in which case the timeout is only detected when the operation exits.
pub trait TimeoutHook: Send + Sync {
    fn on_timed_out(&self) {}
}

impl<F> TimeoutHook for F
where
    F: Fn() + Send + Sync,
{
    fn on_timed_out(&self) {
        self()
    }
}

/// Hook that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHook;

impl TimeoutHook for NoopHook {}

/// Hook that shuts down a TCP stream, unblocking reads and writes on every
/// handle to the same socket.
#[derive(Debug)]
pub struct ShutdownOnTimeout {
    stream: TcpStream,
}

impl ShutdownOnTimeout {
    /// Create a hook for `stream`. Use a `try_clone` of the stream being guarded.
    pub fn new(stream: TcpStream) -> Self {
        Self { stream }
    }
}

impl TimeoutHook for ShutdownOnTimeout {
    fn on_timed_out(&self) {
        if let Err(e) = self.stream.shutdown(Shutdown::Both) {
            tracing::warn!(error = %e, "Failed to shut down timed-out socket");
        }
    }
}
