//! Stream adapter behaviour against slow, abortable sinks and sources.

use std::error::Error as _;
use std::io::{self, Read, Write};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::{Duration, Instant};

use io_watchdog::{is_timeout, EnforcementNode, TimeoutError, TimeoutPolicy};

mod common;
use common::{Gate, SlowSink, SlowSource};

fn node_aborting(gate: &Arc<Gate>, timeout: Duration) -> EnforcementNode {
    let gate = Arc::clone(gate);
    EnforcementNode::with_hook(TimeoutPolicy::new().with_timeout(timeout), move || gate.abort())
}

#[test]
fn slow_write_times_out_near_the_timeout() {
    let gate = Gate::new();
    let sink = SlowSink::new(Arc::clone(&gate), Duration::from_millis(500), Duration::ZERO);
    let mut writer = node_aborting(&gate, Duration::from_millis(50)).wrap_output(sink);

    let start = Instant::now();
    let err = writer.write_all(&[0u8; 1024]).unwrap_err();
    let elapsed = start.elapsed();

    assert!(is_timeout(&err), "expected timeout, got {err}");
    assert!(elapsed >= Duration::from_millis(45), "fired early: {elapsed:?}");
    assert!(elapsed < Duration::from_millis(200), "fired late: {elapsed:?}");

    // The sink's own failure is kept as the cause.
    let timeout = err
        .get_ref()
        .and_then(|e| e.downcast_ref::<TimeoutError>())
        .unwrap();
    let cause = timeout.source().unwrap();
    assert!(cause.to_string().contains("aborted"));
}

#[test]
fn large_write_is_bounded_by_chunking() {
    let gate = Gate::new();
    // 1ms per KiB: one 64 KiB chunk takes ~64ms, the whole payload ~4s.
    let sink = SlowSink::new(Arc::clone(&gate), Duration::ZERO, Duration::from_millis(1));
    let accepted = Arc::clone(&sink.accepted);
    let payload = vec![0u8; 4 * 1024 * 1024];

    let mut writer = node_aborting(&gate, Duration::from_millis(40))
        .wrap_output(sink)
        .with_chunk_size(64 * 1024);

    let start = Instant::now();
    let err = writer.write_all(&payload).unwrap_err();

    assert!(is_timeout(&err));
    assert!(start.elapsed() < Duration::from_secs(1), "took {:?}", start.elapsed());
    assert!(accepted.load(Ordering::SeqCst) < payload.len());
}

#[test]
fn fast_writes_complete_under_a_timeout() {
    let gate = Gate::new();
    let sink = SlowSink::new(Arc::clone(&gate), Duration::from_millis(1), Duration::ZERO);
    let accepted = Arc::clone(&sink.accepted);
    let mut writer = node_aborting(&gate, Duration::from_millis(500))
        .wrap_output(sink)
        .with_chunk_size(1024);

    writer.write_all(&[1u8; 10 * 1024]).unwrap();
    writer.flush().unwrap();
    writer.close().unwrap();
    assert_eq!(accepted.load(Ordering::SeqCst), 10 * 1024);
}

#[test]
fn slow_flush_times_out() {
    let gate = Gate::new();
    let sink = SlowSink::new(Arc::clone(&gate), Duration::from_millis(500), Duration::ZERO);
    let mut writer = node_aborting(&gate, Duration::from_millis(30)).wrap_output(sink);

    let err = writer.flush().unwrap_err();
    assert!(is_timeout(&err));
}

#[test]
fn slow_read_times_out() {
    let gate = Gate::new();
    let source = SlowSource {
        gate: Arc::clone(&gate),
        per_read: Duration::from_millis(500),
    };
    let mut reader = node_aborting(&gate, Duration::from_millis(50)).wrap_input(source);

    let start = Instant::now();
    let err = reader.read(&mut [0u8; 16]).unwrap_err();
    assert!(is_timeout(&err));
    assert!(start.elapsed() < Duration::from_millis(400));
    assert!(!reader.node().is_scheduled());
}

#[test]
fn reads_within_budget_succeed() {
    let gate = Gate::new();
    let source = SlowSource {
        gate: Arc::clone(&gate),
        per_read: Duration::from_millis(1),
    };
    let mut reader = node_aborting(&gate, Duration::from_millis(500)).wrap_input(source);

    let mut buf = [0u8; 8];
    reader.read_exact(&mut buf).unwrap();
    assert_eq!(&buf, b"........");
}

#[test]
fn disabled_policy_never_times_out() {
    let gate = Gate::new();
    let sink = SlowSink::new(Arc::clone(&gate), Duration::from_millis(30), Duration::ZERO);
    let mut writer = EnforcementNode::new(TimeoutPolicy::NONE).wrap_output(sink);

    writer.write_all(b"unbounded").unwrap();
    writer.flush().unwrap();
}

#[test]
fn cancelled_token_fails_cooperative_check() {
    let token = io_watchdog::CancellationToken::new();
    let policy = TimeoutPolicy::new()
        .with_deadline_after(Duration::from_secs(60))
        .unwrap()
        .with_cancellation(token.clone());
    assert!(policy.ensure_not_reached().is_ok());

    token.cancel();
    let err: io::Error = policy.ensure_not_reached().unwrap_err().into();
    assert!(is_timeout(&err));
    assert_eq!(err.kind(), io::ErrorKind::TimedOut);
}
