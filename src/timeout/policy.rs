//! Timeout and deadline policy value type.
//!
//! A policy carries up to two constraints:
//! - a relative timeout, applied afresh to every enter/exit bracket
//! - an absolute deadline on the monotonic clock
//!
//! A policy with neither is disabled and never times anything out.

use std::sync::{Condvar, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crate::timeout::cancel::CancellationToken;
use crate::timeout::error::{TimeoutError, TimeoutResult};

/// Per-operation time budget.
#[derive(Debug, Clone, Default)]
pub struct TimeoutPolicy {
    /// Relative budget; `None` means no timeout.
    timeout: Option<Duration>,
    /// Absolute monotonic deadline.
    deadline: Option<Instant>,
    /// Cooperative cancellation observed by checks and waits.
    cancellation: Option<CancellationToken>,
    /// Set for [`TimeoutPolicy::NONE`]: setters become no-ops.
    frozen: bool,
}

impl TimeoutPolicy {
    /// Sentinel policy whose setters are no-ops and which never times out.
    pub const NONE: TimeoutPolicy = TimeoutPolicy {
        timeout: None,
        deadline: None,
        cancellation: None,
        frozen: true,
    };

    /// Create a disabled, configurable policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`set_timeout`](Self::set_timeout).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.set_timeout(timeout);
        self
    }

    /// Builder form of [`set_deadline_after`](Self::set_deadline_after).
    pub fn with_deadline_after(mut self, duration: Duration) -> TimeoutResult<Self> {
        self.set_deadline_after(duration)?;
        Ok(self)
    }

    /// Builder form of [`set_deadline_at`](Self::set_deadline_at).
    pub fn with_deadline_at(mut self, deadline: Instant) -> Self {
        self.set_deadline_at(deadline);
        self
    }

    /// Builder form of [`set_cancellation`](Self::set_cancellation).
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.set_cancellation(token);
        self
    }

    /// Relative timeout, if any.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Absolute deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn has_deadline(&self) -> bool {
        self.deadline.is_some()
    }

    /// Attached cancellation token, if any.
    pub fn cancellation(&self) -> Option<&CancellationToken> {
        self.cancellation.as_ref()
    }

    /// True when neither a timeout nor a deadline is set.
    pub fn is_disabled(&self) -> bool {
        self.timeout.is_none() && self.deadline.is_none()
    }

    /// Wait at most `timeout` per operation. Zero disables the timeout.
    pub fn set_timeout(&mut self, timeout: Duration) -> &mut Self {
        if !self.frozen {
            self.timeout = (!timeout.is_zero()).then_some(timeout);
        }
        self
    }

    /// Set a deadline `duration` from now. The duration must be positive.
    pub fn set_deadline_after(&mut self, duration: Duration) -> TimeoutResult<&mut Self> {
        if self.frozen {
            return Ok(self);
        }
        if duration.is_zero() {
            return Err(TimeoutError::InvalidConfig("deadline duration must be positive"));
        }
        let deadline = Instant::now()
            .checked_add(duration)
            .ok_or(TimeoutError::InvalidConfig("deadline is too far in the future"))?;
        Ok(self.set_deadline_at(deadline))
    }

    /// Set an absolute deadline. A deadline in the past is allowed and is
    /// reported as reached by the next check.
    pub fn set_deadline_at(&mut self, deadline: Instant) -> &mut Self {
        if !self.frozen {
            self.deadline = Some(deadline);
        }
        self
    }

    pub fn clear_timeout(&mut self) -> &mut Self {
        if !self.frozen {
            self.timeout = None;
        }
        self
    }

    pub fn clear_deadline(&mut self) -> &mut Self {
        if !self.frozen {
            self.deadline = None;
        }
        self
    }

    pub fn set_cancellation(&mut self, token: CancellationToken) -> &mut Self {
        if !self.frozen {
            self.cancellation = Some(token);
        }
        self
    }

    /// Instant at which an operation starting at `now` expires: the earlier
    /// of `now + timeout` and the deadline. `None` if the policy is disabled.
    pub fn expires_at(&self, now: Instant) -> Option<Instant> {
        // A timeout too large to represent never binds.
        let by_timeout = self.timeout.and_then(|t| now.checked_add(t));
        match (by_timeout, self.deadline) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Time left for an operation starting at `now`, zero if already expired.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.expires_at(now)
            .map(|at| at.saturating_duration_since(now))
    }

    /// Fails if cancellation was requested or the deadline has passed.
    ///
    /// Only the deadline is consulted: the relative timeout applies per
    /// operation and has no meaning outside an enter/exit bracket.
    pub fn ensure_not_reached(&self) -> TimeoutResult<()> {
        self.check_cancelled()?;
        match self.deadline {
            Some(deadline) if deadline <= Instant::now() => Err(TimeoutError::DeadlineReached),
            _ => Ok(()),
        }
    }

    /// Block on `condvar` until notified or until the remaining time runs out.
    ///
    /// With a disabled policy this waits indefinitely. Returns the reacquired
    /// guard on notification; fails with a timeout if no notification arrived
    /// in time, or with [`TimeoutError::Interrupted`] if the cancellation token
    /// was set before or during the wait. Spurious wakeups are returned as
    /// notifications, so callers re-check their condition in a loop.
    pub fn wait_until_notified<'a, T>(
        &self,
        guard: MutexGuard<'a, T>,
        condvar: &Condvar,
    ) -> TimeoutResult<MutexGuard<'a, T>> {
        self.check_cancelled()?;

        let start = Instant::now();
        let Some(wait) = self.remaining(start) else {
            let guard = condvar.wait(guard).unwrap_or_else(PoisonError::into_inner);
            self.check_cancelled()?;
            return Ok(guard);
        };
        if wait.is_zero() {
            return Err(TimeoutError::timed_out());
        }

        let (guard, _) = condvar
            .wait_timeout(guard, wait)
            .unwrap_or_else(PoisonError::into_inner);
        self.check_cancelled()?;
        if start.elapsed() >= wait {
            return Err(TimeoutError::timed_out());
        }
        Ok(guard)
    }

    /// Combine two policies: the smaller non-zero timeout and the earlier
    /// deadline win. The cancellation token of `self` is kept, falling back
    /// to `other`'s.
    pub fn intersect(&self, other: &TimeoutPolicy) -> TimeoutPolicy {
        let timeout = match (self.timeout, other.timeout) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        let deadline = match (self.deadline, other.deadline) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        TimeoutPolicy {
            timeout,
            deadline,
            cancellation: self.cancellation.clone().or_else(|| other.cancellation.clone()),
            frozen: false,
        }
    }

    fn check_cancelled(&self) -> TimeoutResult<()> {
        match &self.cancellation {
            Some(token) if token.is_cancelled() => Err(TimeoutError::Interrupted),
            _ => Ok(()),
        }
    }
}
