//! The watchdog thread.
//!
//! Started by the first `enter()` that finds no watchdog alive, it waits for
//! the earliest expiry, unlinks it and runs its hook outside the lock. It
//! exits after the configured idle threshold passes with nothing scheduled.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;

use crate::config;
use crate::observability::metrics;
use crate::timeout::{TimeoutError, TimeoutResult};
use crate::watchdog::hook::TimeoutHook;
use crate::watchdog::node::NodeId;
use crate::watchdog::schedule::{Next, Schedule};

/// Number of watchdog threads started since process start.
static STARTS: AtomicU64 = AtomicU64::new(0);

/// Start a watchdog thread. The caller holds the schedule lock.
pub(crate) fn spawn(schedule: &'static Schedule) -> TimeoutResult<()> {
    let name = config::current().watchdog.thread_name.clone();
    thread::Builder::new()
        .name(name)
        .spawn(move || run(schedule))
        .map_err(TimeoutError::WatchdogSpawn)?;

    let starts = STARTS.fetch_add(1, Ordering::Relaxed) + 1;
    metrics::record_watchdog_started();
    tracing::debug!(starts, "Watchdog started");
    Ok(())
}

fn run(schedule: &'static Schedule) {
    loop {
        let idle_timeout = config::current().watchdog.idle_timeout();
        match schedule.next_expired(idle_timeout) {
            Next::Fire(id, hook) => fire(id, hook),
            Next::Retry => continue,
            Next::Idle => break,
        }
    }
    tracing::debug!("Watchdog idle, exiting");
}

fn fire(id: NodeId, hook: Arc<dyn TimeoutHook>) {
    tracing::debug!(node = %id, "Operation expired, firing timeout hook");
    metrics::record_hook_fired();

    // A panicking hook must not take enforcement down for every other node.
    if panic::catch_unwind(AssertUnwindSafe(|| hook.on_timed_out())).is_err() {
        tracing::error!(node = %id, "Timeout hook panicked");
    }
}

/// Number of watchdog threads started so far.
pub fn starts() -> u64 {
    STARTS.load(Ordering::Relaxed)
}
