//! Blocking accept loop, one connection served to completion at a time.

use crate::handler;
use anyhow::{Context, Result};
use log::{error, info};
use std::io;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};

/// The listening side of the service.
///
/// There is no worker pool and no per-connection thread: each accepted
/// connection is served through its terminal state before the next accept.
pub struct Server {
    listener: TcpListener,
}

impl Server {
    /// Bind and start listening. Setup failures are fatal to the service.
    pub fn bind(addr: SocketAddr) -> Result<Self> {
        let listener =
            TcpListener::bind(addr).with_context(|| format!("failed to bind {addr}"))?;
        Ok(Self { listener })
    }

    /// The bound address, useful when binding port 0.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.listener
            .local_addr()
            .context("listener has no local address")
    }

    /// Serve connections until `shutdown` is observed set.
    ///
    /// The flag is consulted only between accept iterations; a command that
    /// is already executing runs to completion. An interrupted accept loops
    /// back to the flag check, any other accept error is fatal.
    pub fn run(&self, shutdown: &AtomicBool) -> Result<()> {
        while !shutdown.load(Ordering::SeqCst) {
            match self.listener.accept() {
                Ok((stream, peer)) => self.serve(stream, peer)?,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e).context("accept failed"),
            }
        }
        info!("shutdown requested, no longer accepting connections");
        Ok(())
    }

    /// Accept and fully serve exactly one connection.
    pub fn serve_one(&self) -> Result<()> {
        let (stream, peer) = self.listener.accept().context("accept failed")?;
        self.serve(stream, peer)
    }

    fn serve(&self, stream: TcpStream, peer: SocketAddr) -> Result<()> {
        info!("serving connection from {peer}");
        match handler::handle_connection(stream) {
            Ok(()) => Ok(()),
            Err(e) if e.is_fatal() => Err(e).context("session failed, stopping service"),
            Err(e) => {
                error!("session from {peer} aborted: {e}");
                Ok(())
            }
        }
    }
}
