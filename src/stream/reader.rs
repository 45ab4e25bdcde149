//! Bounded input adapter.

use std::io::{self, IoSliceMut, Read};

use crate::stream::bracket;
use crate::watchdog::EnforcementNode;

/// Wraps a reader so every read and the final close run inside an
/// enter/exit bracket. Data that arrives after the expiry is reported as a
/// timeout.
#[derive(Debug)]
pub struct TimeoutReader<R> {
    inner: R,
    node: EnforcementNode,
}

impl<R: Read> TimeoutReader<R> {
    pub fn new(inner: R, node: EnforcementNode) -> Self {
        Self { inner, node }
    }

    pub fn node(&self) -> &EnforcementNode {
        &self.node
    }

    pub fn node_mut(&mut self) -> &mut EnforcementNode {
        &mut self.node
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    /// Unwrap without closing.
    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Release the underlying reader inside a bracket.
    pub fn close(self) -> io::Result<()> {
        let Self { inner, node } = self;
        bracket(&node, "close", move || {
            drop(inner);
            Ok(())
        })
    }
}

impl<R: Read> Read for TimeoutReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let inner = &mut self.inner;
        bracket(&self.node, "read", || inner.read(buf))
    }

    fn read_vectored(&mut self, bufs: &mut [IoSliceMut<'_>]) -> io::Result<usize> {
        let inner = &mut self.inner;
        bracket(&self.node, "read", || inner.read_vectored(bufs))
    }
}
