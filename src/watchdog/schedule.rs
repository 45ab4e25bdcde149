//! Process-wide schedule of pending operations.
//!
//! # Responsibilities
//! - Keep scheduled nodes ordered by ascending expiry
//! - Track nodes the watchdog already fired until their owner exits
//! - Start the watchdog on demand and wake it when the earliest expiry changes
//!
//! # Design Decisions
//! - One mutex guards every structure here, plus one condvar the watchdog waits on
//! - Ordered map keyed by (expiry, node id): earliest-first pop, removal by key
//! - Only the watchdog pops expired entries; producers insert and remove their own

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Condvar, LazyLock, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crate::observability::metrics;
use crate::timeout::{TimeoutError, TimeoutResult};
use crate::watchdog::hook::TimeoutHook;
use crate::watchdog::node::NodeId;
use crate::watchdog::worker;

static SCHEDULE: LazyLock<Schedule> = LazyLock::new(Schedule::new);

/// The shared schedule.
pub(crate) fn global() -> &'static Schedule {
    &SCHEDULE
}

/// Outcome of one watchdog wait.
pub(crate) enum Next {
    /// An entry expired and was unlinked; its hook must run.
    Fire(NodeId, Arc<dyn TimeoutHook>),
    /// Woken early or spuriously; look again.
    Retry,
    /// Nothing was scheduled for the whole idle threshold; the watchdog must exit.
    Idle,
}

pub(crate) struct Schedule {
    state: Mutex<ScheduleState>,
    condvar: Condvar,
}

#[derive(Default)]
struct ScheduleState {
    /// Scheduled nodes in expiry order.
    queue: BTreeMap<(Instant, NodeId), Arc<dyn TimeoutHook>>,
    /// Expiry of each scheduled node, to find its queue key.
    scheduled: HashMap<NodeId, Instant>,
    /// Nodes fired by the watchdog whose owner has not exited yet.
    fired: HashSet<NodeId>,
    /// Whether a watchdog thread is alive.
    watchdog_running: bool,
}

impl Schedule {
    fn new() -> Self {
        Self {
            state: Mutex::new(ScheduleState::default()),
            condvar: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ScheduleState> {
        // Hooks run outside the lock, so poisoning can only come from a bug here; the
        // state is still consistent between statements.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Schedule `id` to expire at `expire_at`.
    pub(crate) fn insert(
        &'static self,
        id: NodeId,
        expire_at: Instant,
        hook: Arc<dyn TimeoutHook>,
    ) -> TimeoutResult<()> {
        let mut state = self.lock();
        if state.scheduled.contains_key(&id) || state.fired.contains(&id) {
            return Err(TimeoutError::Reentrant);
        }

        if !state.watchdog_running {
            worker::spawn(self)?;
            state.watchdog_running = true;
        }

        let earliest = state
            .queue
            .first_key_value()
            .map_or(true, |(&(first, _), _)| expire_at <= first);
        state.queue.insert((expire_at, id), hook);
        state.scheduled.insert(id, expire_at);
        metrics::record_pending(state.queue.len());

        if earliest {
            self.condvar.notify_all();
        }
        Ok(())
    }

    /// Unschedule `id`, reporting whether it timed out.
    ///
    /// True if the watchdog already fired it, or if it is still scheduled but
    /// its expiry has passed (the watchdog simply has not run yet).
    pub(crate) fn remove(&self, id: NodeId) -> bool {
        let mut state = self.lock();
        if let Some(expire_at) = state.scheduled.remove(&id) {
            self.unlink(&mut state, expire_at, id);
            return expire_at <= Instant::now();
        }
        state.fired.remove(&id)
    }

    /// Forget `id` without reporting anything.
    pub(crate) fn cancel(&self, id: NodeId) {
        let mut state = self.lock();
        if let Some(expire_at) = state.scheduled.remove(&id) {
            self.unlink(&mut state, expire_at, id);
        }
        state.fired.remove(&id);
    }

    /// Remove a queue entry; wakes the watchdog if it was waiting on it.
    fn unlink(&self, state: &mut ScheduleState, expire_at: Instant, id: NodeId) {
        let was_head = state
            .queue
            .first_key_value()
            .is_some_and(|(&key, _)| key == (expire_at, id));
        state.queue.remove(&(expire_at, id));
        metrics::record_pending(state.queue.len());
        if was_head {
            self.condvar.notify_all();
        }
    }

    pub(crate) fn is_scheduled(&self, id: NodeId) -> bool {
        self.lock().scheduled.contains_key(&id)
    }

    /// Wait for the earliest entry to expire and unlink it.
    ///
    /// Called only by the watchdog thread.
    pub(crate) fn next_expired(&self, idle_timeout: Duration) -> Next {
        let mut state = self.lock();

        let first = state.queue.first_key_value().map(|(&key, _)| key);
        let Some((expire_at, id)) = first else {
            let started = Instant::now();
            let (mut state, _) = self
                .condvar
                .wait_timeout(state, idle_timeout)
                .unwrap_or_else(PoisonError::into_inner);
            if state.queue.is_empty() && started.elapsed() >= idle_timeout {
                // Cleared under the lock so the next insert starts a fresh watchdog.
                state.watchdog_running = false;
                return Next::Idle;
            }
            return Next::Retry;
        };

        let now = Instant::now();
        if expire_at > now {
            let _ = self
                .condvar
                .wait_timeout(state, expire_at - now)
                .unwrap_or_else(PoisonError::into_inner);
            return Next::Retry;
        }

        let Some(hook) = state.queue.remove(&(expire_at, id)) else {
            return Next::Retry;
        };
        state.scheduled.remove(&id);
        state.fired.insert(id);
        metrics::record_pending(state.queue.len());
        Next::Fire(id, hook)
    }

    pub(crate) fn watchdog_running(&self) -> bool {
        self.lock().watchdog_running
    }

    pub(crate) fn len(&self) -> usize {
        self.lock().queue.len()
    }

    /// Expiries in schedule order.
    pub(crate) fn expiries(&self) -> Vec<Instant> {
        self.lock().queue.keys().map(|&(at, _)| at).collect()
    }
}
