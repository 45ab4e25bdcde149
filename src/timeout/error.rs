//! Timeout error definitions.

use std::io;
use thiserror::Error;

/// Errors produced by timeout policies, enforcement nodes and stream adapters.
#[derive(Debug, Error)]
pub enum TimeoutError {
    /// Policy setter received a value it cannot represent.
    #[error("invalid timeout configuration: {0}")]
    InvalidConfig(&'static str),

    /// `enter()` was called while the node was still scheduled (unbalanced enter/exit).
    #[error("enter() called while the operation is already scheduled")]
    Reentrant,

    /// The operation outlived its timeout or deadline.
    #[error("timeout")]
    TimedOut {
        /// Failure reported by the underlying operation, if it failed.
        #[source]
        source: Option<io::Error>,
    },

    /// A cooperative check found the deadline already passed.
    #[error("deadline reached")]
    DeadlineReached,

    /// A cancellation token was observed during a cooperative check or wait.
    #[error("interrupted")]
    Interrupted,

    /// The watchdog thread could not be started.
    #[error("failed to start watchdog thread: {0}")]
    WatchdogSpawn(#[source] io::Error),
}

/// Result type for timeout operations.
pub type TimeoutResult<T> = Result<T, TimeoutError>;

impl TimeoutError {
    /// Timeout error without an underlying cause.
    pub fn timed_out() -> Self {
        TimeoutError::TimedOut { source: None }
    }

    /// Timeout error chaining the failure the guarded operation reported.
    pub fn caused_by(cause: io::Error) -> Self {
        TimeoutError::TimedOut {
            source: Some(cause),
        }
    }

    /// True for every variant that signals an exceeded time budget.
    ///
    /// Interruption counts: a cancelled wait is reported the same way as a
    /// wait that ran out of time.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            TimeoutError::TimedOut { .. } | TimeoutError::DeadlineReached | TimeoutError::Interrupted
        )
    }
}

impl From<TimeoutError> for io::Error {
    fn from(err: TimeoutError) -> Self {
        // ErrorKind::Interrupted is retried by std's read/write loops, so it is never used here.
        let kind = match &err {
            TimeoutError::InvalidConfig(_) | TimeoutError::Reentrant => io::ErrorKind::InvalidInput,
            TimeoutError::WatchdogSpawn(_) => io::ErrorKind::Other,
            _ => io::ErrorKind::TimedOut,
        };
        io::Error::new(kind, err)
    }
}

/// Returns true if `err` carries a timeout produced by this crate.
///
/// Plain `ErrorKind::TimedOut` errors raised by the OS are not matched; use
/// [`io::Error::kind`] for those.
pub fn is_timeout(err: &io::Error) -> bool {
    err.get_ref()
        .and_then(|inner| inner.downcast_ref::<TimeoutError>())
        .is_some_and(TimeoutError::is_timeout)
}
