//! Stream adapters.
//!
//! # Responsibilities
//! - Bound every discrete read, write, flush and close call
//! - Split large writes into chunks so enforcement can interject between them
//! - Translate failures of expired calls into timeout errors
//!
//! # Translation Rules
//! ```text
//! call failed,    node expired     → timeout error chaining the failure
//! call failed,    node not expired → failure unchanged
//! call succeeded, node expired     → timeout error
//! call succeeded, node not expired → result
//! ```

pub mod reader;
pub mod socket;
pub mod writer;

pub use reader::TimeoutReader;
pub use writer::TimeoutWriter;

use std::io::{self, Read, Write};

use crate::observability::metrics;
use crate::timeout::is_timeout;
use crate::watchdog::EnforcementNode;

impl EnforcementNode {
    /// Bound every call on `inner` by this node.
    pub fn wrap_output<W: Write>(self, inner: W) -> TimeoutWriter<W> {
        TimeoutWriter::new(inner, self)
    }

    /// Bound every call on `inner` by this node.
    pub fn wrap_input<R: Read>(self, inner: R) -> TimeoutReader<R> {
        TimeoutReader::new(inner, self)
    }
}

/// Run one underlying call inside an enter/exit bracket on `node`.
pub(crate) fn bracket<T>(
    node: &EnforcementNode,
    operation: &'static str,
    call: impl FnOnce() -> io::Result<T>,
) -> io::Result<T> {
    node.with_timeout(call).inspect_err(|e| {
        if is_timeout(e) {
            tracing::debug!(node = %node.id(), operation, error = %e, "Guarded call timed out");
            metrics::record_timed_out(operation);
        }
    })
}
