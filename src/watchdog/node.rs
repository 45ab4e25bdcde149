//! Enforcement nodes: one per guarded operation stream.
//!
//! # State Transitions
//! ```text
//! Idle → Scheduled:  enter() with a timeout or deadline configured
//! Scheduled → Idle:  exit() before expiry (reports "not timed out")
//! Scheduled → Fired: watchdog pops the expired entry and runs the hook
//! Fired → Idle:      exit() (reports "timed out")
//! ```
//!
//! A node is usually created once per session and reused across many
//! enter/exit brackets.

use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::timeout::{TimeoutError, TimeoutPolicy, TimeoutResult};
use crate::watchdog::hook::{NoopHook, TimeoutHook};
use crate::watchdog::schedule;

/// Global counter for node IDs.
static NODE_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for an enforcement node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u64);

impl NodeId {
    /// Generate a new unique node ID.
    pub fn new() -> Self {
        Self(NODE_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "node-{}", self.0)
    }
}

/// A guarded operation stream participating in the process-wide schedule.
///
/// `enter()` and `exit()` bracket each blocking call. Brackets must not
/// overlap on one node: use one node per direction of a duplex stream.
pub struct EnforcementNode {
    id: NodeId,
    policy: TimeoutPolicy,
    hook: Arc<dyn TimeoutHook>,
}

impl EnforcementNode {
    /// Create a node whose expiry is only detected at `exit()`.
    pub fn new(policy: TimeoutPolicy) -> Self {
        Self::with_hook(policy, NoopHook)
    }

    /// Create a node that runs `hook` on the watchdog thread when it expires.
    pub fn with_hook(policy: TimeoutPolicy, hook: impl TimeoutHook + 'static) -> Self {
        Self {
            id: NodeId::new(),
            policy,
            hook: Arc::new(hook),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn policy(&self) -> &TimeoutPolicy {
        &self.policy
    }

    /// Mutable policy. Changes apply from the next `enter()`.
    pub fn policy_mut(&mut self) -> &mut TimeoutPolicy {
        &mut self.policy
    }

    /// Whether the node is currently in the schedule.
    pub fn is_scheduled(&self) -> bool {
        schedule::global().is_scheduled(self.id)
    }

    /// Start a bracket. A no-op when the policy is disabled.
    ///
    /// Fails with [`TimeoutError::Reentrant`] if the previous bracket was not
    /// exited.
    pub fn enter(&self) -> TimeoutResult<()> {
        let Some(expire_at) = self.policy.expires_at(Instant::now()) else {
            return Ok(());
        };
        schedule::global().insert(self.id, expire_at, Arc::clone(&self.hook))
    }

    /// End a bracket, returning true if the operation timed out.
    ///
    /// An operation that finished after its expiry counts as timed out even
    /// if it succeeded.
    pub fn exit(&self) -> bool {
        schedule::global().remove(self.id)
    }

    /// End a bracket, failing if the operation timed out.
    pub fn exit_checked(&self) -> TimeoutResult<()> {
        if self.exit() {
            Err(TimeoutError::timed_out())
        } else {
            Ok(())
        }
    }

    /// End a bracket whose operation failed with `cause`.
    ///
    /// Returns a timeout error chaining `cause` if the node expired, `cause`
    /// unchanged otherwise.
    pub fn exit_with(&self, cause: io::Error) -> io::Error {
        if self.exit() {
            TimeoutError::caused_by(cause).into()
        } else {
            cause
        }
    }

    /// Drop a pending expiry without firing it.
    pub fn cancel(&self) {
        schedule::global().cancel(self.id);
    }

    /// Run `op` inside an enter/exit bracket.
    pub fn with_timeout<T>(&self, op: impl FnOnce() -> io::Result<T>) -> io::Result<T> {
        self.enter()?;
        match op() {
            Ok(value) => {
                self.exit_checked()?;
                Ok(value)
            }
            Err(cause) => Err(self.exit_with(cause)),
        }
    }
}

impl std::fmt::Debug for EnforcementNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnforcementNode")
            .field("id", &self.id)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl Drop for EnforcementNode {
    fn drop(&mut self) {
        self.cancel();
    }
}
