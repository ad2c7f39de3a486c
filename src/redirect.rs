//! Scoped binding of a client connection as the command output destination.

use std::fs::File;
use std::io::{self, Write};
use std::net::TcpStream;
use std::os::fd::OwnedFd;
use std::process::Stdio;

/// Destination for command output.
///
/// A destination is writable by the service itself (for the invalid-command
/// reply) and convertible into a [`Stdio`] handle a child process can inherit
/// as its standard output.
pub trait CommandOutput: Write {
    /// Produce a [`Stdio`] handle for a child's standard output.
    fn child_stdout(&self) -> io::Result<Stdio>;
}

/// Binds one session's socket as the active command output destination for
/// the launch-and-wait window.
///
/// Entering the scope duplicates the socket handle; dropping the scope
/// releases the duplicate. The service's own standard output is never
/// substituted, so its diagnostics cannot end up on a client socket no matter
/// how the session ends.
pub struct RedirectionScope {
    conn: TcpStream,
}

impl RedirectionScope {
    /// Duplicate the session socket and make it the active destination.
    ///
    /// Failure here means the service can no longer keep its console separate
    /// from client connections; callers treat it as fatal.
    pub fn enter(stream: &TcpStream) -> io::Result<Self> {
        Ok(Self {
            conn: stream.try_clone()?,
        })
    }
}

impl Write for RedirectionScope {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.conn.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.conn.flush()
    }
}

impl CommandOutput for RedirectionScope {
    fn child_stdout(&self) -> io::Result<Stdio> {
        // Stdio has no From<TcpStream>; hand the duplicate over as a plain fd.
        self.conn
            .try_clone()
            .map(|conn| Stdio::from(OwnedFd::from(conn)))
    }
}

/// File-backed destination, handy for exercising launches without a socket.
impl CommandOutput for File {
    fn child_stdout(&self) -> io::Result<Stdio> {
        self.try_clone().map(Stdio::from)
    }
}
