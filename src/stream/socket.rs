//! TCP helpers: adapters whose timeout hook shuts the socket down.

use std::io;
use std::net::TcpStream;

use crate::stream::{TimeoutReader, TimeoutWriter};
use crate::timeout::TimeoutPolicy;
use crate::watchdog::{EnforcementNode, ShutdownOnTimeout};

/// Split a connected stream into a bounded reader and writer.
///
/// Each side has its own enforcement node, so a read and a write may be in
/// flight at the same time. When either side expires its hook shuts the
/// whole socket down, which makes the blocked call return.
pub fn split(
    stream: &TcpStream,
    read_policy: TimeoutPolicy,
    write_policy: TimeoutPolicy,
) -> io::Result<(TimeoutReader<TcpStream>, TimeoutWriter<TcpStream>)> {
    let read_node = EnforcementNode::with_hook(read_policy, ShutdownOnTimeout::new(stream.try_clone()?));
    let write_node = EnforcementNode::with_hook(write_policy, ShutdownOnTimeout::new(stream.try_clone()?));

    let reader = TimeoutReader::new(stream.try_clone()?, read_node);
    let writer = TimeoutWriter::new(stream.try_clone()?, write_node);
    Ok((reader, writer))
}
