//! Per-connection session: read one command, execute it, close.

use crate::command::{ArgumentVector, MAX_COMMAND_BYTES};
use crate::launch::{self, LaunchError, Outcome};
use crate::redirect::RedirectionScope;
use crate::resolve::SearchPath;
use log::{debug, info, warn};
use std::io::{self, Read};
use std::net::TcpStream;
use thiserror::Error;

/// Ways a session can fail.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to read command: {0}")]
    Read(#[source] io::Error),

    /// The session socket could not be duplicated for output redirection.
    #[error("failed to redirect output: {0}")]
    Redirect(#[source] io::Error),

    #[error(transparent)]
    Launch(#[from] LaunchError),
}

impl SessionError {
    /// Whether the whole service must stop rather than accept the next
    /// connection. Only redirection-duplication failures qualify: without a
    /// working duplicate the service cannot guarantee its own console output
    /// stays off client sockets.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SessionError::Redirect(_) | SessionError::Launch(LaunchError::Duplicate(_))
        )
    }
}

/// Serve one connection from `AwaitingCommand` through `Done`.
///
/// Performs a single blocking read of up to [`MAX_COMMAND_BYTES`], runs the
/// command under a [`RedirectionScope`], waits for the child, and returns.
/// The scope's socket duplicate is released before the caller closes the
/// connection; there is never a second command on the same connection.
pub fn handle_connection(mut stream: TcpStream) -> Result<(), SessionError> {
    let mut buf = vec![0u8; MAX_COMMAND_BYTES];
    let n = stream.read(&mut buf).map_err(SessionError::Read)?;
    if n == 0 {
        debug!("peer closed without sending a command");
        return Ok(());
    }

    let raw = String::from_utf8_lossy(&buf[..n]);
    let mut scope = RedirectionScope::enter(&stream).map_err(SessionError::Redirect)?;

    let outcome = match ArgumentVector::parse(&raw) {
        Err(err) => {
            warn!("rejecting command: {err}");
            launch::reject(&mut scope)?
        }
        Ok(argv) => match argv.program() {
            None => {
                debug!("blank command, nothing to resolve");
                launch::reject(&mut scope)?
            }
            Some(program) => {
                let resolved = SearchPath::from_env().resolve(program);
                launch::run_command(&argv, resolved.as_deref(), &mut scope)?
            }
        },
    };

    match outcome {
        Outcome::Exited(code) => info!("command finished with exit code {code}"),
        Outcome::Rejected => info!("command did not resolve, peer was told"),
    }
    Ok(())
}
