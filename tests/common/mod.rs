//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::io::{self, Read, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

/// A blocking delay that a timeout hook can cut short.
#[derive(Default)]
pub struct Gate {
    aborted: Mutex<bool>,
    condvar: Condvar,
}

impl Gate {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make every current and future delay fail immediately.
    pub fn abort(&self) {
        *self.aborted.lock().unwrap() = true;
        self.condvar.notify_all();
    }

    /// Block for `delay`, failing with `BrokenPipe` if aborted first.
    pub fn delay(&self, delay: Duration) -> io::Result<()> {
        let deadline = Instant::now() + delay;
        let mut aborted = self.aborted.lock().unwrap();
        loop {
            if *aborted {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "aborted by timeout hook"));
            }
            let now = Instant::now();
            if now >= deadline {
                return Ok(());
            }
            aborted = self.condvar.wait_timeout(aborted, deadline - now).unwrap().0;
        }
    }
}

/// A sink that takes `per_write + per_kib * kib` for every write.
pub struct SlowSink {
    pub gate: Arc<Gate>,
    pub per_write: Duration,
    pub per_kib: Duration,
    pub accepted: Arc<AtomicUsize>,
}

impl SlowSink {
    pub fn new(gate: Arc<Gate>, per_write: Duration, per_kib: Duration) -> Self {
        Self {
            gate,
            per_write,
            per_kib,
            accepted: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl Write for SlowSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let kib = u32::try_from(buf.len() / 1024).unwrap_or(u32::MAX);
        self.gate.delay(self.per_write + self.per_kib * kib)?;
        self.accepted.fetch_add(buf.len(), Ordering::SeqCst);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.gate.delay(self.per_write)
    }
}

/// A source that waits `per_read` before producing each byte.
pub struct SlowSource {
    pub gate: Arc<Gate>,
    pub per_read: Duration,
}

impl Read for SlowSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.gate.delay(self.per_read)?;
        if buf.is_empty() {
            return Ok(0);
        }
        buf[0] = b'.';
        Ok(1)
    }
}

/// Ordered log of fired hooks, with the time each one ran.
#[derive(Clone, Default)]
pub struct FiredLog(Arc<Mutex<Vec<(&'static str, Instant)>>>);

impl FiredLog {
    /// A hook that appends `label` when fired.
    pub fn hook(&self, label: &'static str) -> impl Fn() + Send + Sync + 'static {
        let log = Arc::clone(&self.0);
        move || log.lock().unwrap().push((label, Instant::now()))
    }

    pub fn entries(&self) -> Vec<&'static str> {
        self.0.lock().unwrap().iter().map(|&(label, _)| label).collect()
    }

    /// When `label` first fired.
    pub fn fired_at(&self, label: &str) -> Option<Instant> {
        self.0
            .lock()
            .unwrap()
            .iter()
            .find(|&&(fired, _)| fired == label)
            .map(|&(_, at)| at)
    }

    /// Poll until `count` hooks have fired or `limit` passes.
    pub fn wait_for(&self, count: usize, limit: Duration) -> bool {
        let start = Instant::now();
        while start.elapsed() < limit {
            if self.0.lock().unwrap().len() >= count {
                return true;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        false
    }
}
