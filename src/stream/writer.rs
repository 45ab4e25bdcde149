//! Bounded output adapter.

use std::io::{self, IoSlice, Write};

use crate::config;
use crate::stream::bracket;
use crate::watchdog::EnforcementNode;

/// Wraps a writer so every write, flush and close runs inside an
/// enter/exit bracket.
///
/// Writes larger than the chunk ceiling are split so that no single
/// underlying call can carry more than one chunk; the timeout applies to each
/// chunk separately.
#[derive(Debug)]
pub struct TimeoutWriter<W> {
    inner: W,
    node: EnforcementNode,
    chunk_size: usize,
}

impl<W: Write> TimeoutWriter<W> {
    /// Wrap `inner`, using the configured chunk ceiling.
    pub fn new(inner: W, node: EnforcementNode) -> Self {
        let chunk_size = config::current().io.write_chunk_bytes.max(1);
        Self {
            inner,
            node,
            chunk_size,
        }
    }

    /// Override the chunk ceiling for this writer.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn node(&self) -> &EnforcementNode {
        &self.node
    }

    pub fn node_mut(&mut self) -> &mut EnforcementNode {
        &mut self.node
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn get_mut(&mut self) -> &mut W {
        &mut self.inner
    }

    /// Unwrap without flushing or closing.
    pub fn into_inner(self) -> W {
        self.inner
    }

    /// Flush and release the underlying writer inside one bracket.
    pub fn close(self) -> io::Result<()> {
        let Self {
            mut inner, node, ..
        } = self;
        bracket(&node, "close", move || {
            inner.flush()?;
            drop(inner);
            Ok(())
        })
    }
}

impl<W: Write> Write for TimeoutWriter<W> {
    /// Writes at most one chunk.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let chunk = &buf[..buf.len().min(self.chunk_size)];
        let inner = &mut self.inner;
        bracket(&self.node, "write", || inner.write(chunk))
    }

    /// Writes whole buffers up to the chunk ceiling, so chunks end on buffer
    /// boundaries. A leading buffer larger than the ceiling is truncated.
    fn write_vectored(&mut self, bufs: &[IoSlice<'_>]) -> io::Result<usize> {
        let Some(first) = bufs.iter().find(|b| !b.is_empty()) else {
            return Ok(0);
        };
        if first.len() >= self.chunk_size {
            return self.write(first);
        }

        let mut total = 0;
        let mut count = 0;
        for buf in bufs {
            if total + buf.len() > self.chunk_size {
                break;
            }
            total += buf.len();
            count += 1;
        }

        let inner = &mut self.inner;
        bracket(&self.node, "write", || inner.write_vectored(&bufs[..count]))
    }

    fn write_all(&mut self, mut buf: &[u8]) -> io::Result<()> {
        while !buf.is_empty() {
            let (chunk, rest) = buf.split_at(buf.len().min(self.chunk_size));
            let inner = &mut self.inner;
            bracket(&self.node, "write", || inner.write_all(chunk))?;
            buf = rest;
        }
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        let inner = &mut self.inner;
        bracket(&self.node, "flush", || inner.flush())
    }
}
