//! Child process creation and supervision.

use crate::command::ArgumentVector;
use crate::redirect::CommandOutput;
use log::debug;
use std::io;
use std::os::unix::process::CommandExt;
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};
use thiserror::Error;

/// Conventional process exit code type; 0 indicates success.
pub type ExitCode = i32;

/// Reply sent to the peer when no executable matches the command.
pub const INVALID_COMMAND: &str = "Invalid command.\n";

/// Errors from one launch attempt.
///
/// Child creation failure is its own variant carrying the underlying
/// `io::Error`; it is never folded into an exit code or a pid.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("failed to spawn {program}: {source}")]
    Spawn { program: String, source: io::Error },

    #[error("failed to wait for {program}: {source}")]
    Wait { program: String, source: io::Error },

    /// The output destination could not be duplicated for the child. The
    /// caller can no longer tell where command output will land, which is
    /// fatal to the service.
    #[error("failed to duplicate output destination: {0}")]
    Duplicate(#[source] io::Error),

    /// Writing the invalid-command reply failed; the connection is gone.
    #[error("failed to write to output destination: {0}")]
    Output(#[from] io::Error),

    /// A launch was requested for an argument vector with no program name.
    #[error("no program name in argument vector")]
    EmptyArguments,
}

/// How one command attempt concluded.
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    /// A child ran to termination with this exit code.
    Exited(ExitCode),
    /// No executable matched; the invalid-command reply was written and no
    /// child ran.
    Rejected,
}

/// Write the invalid-command reply to the active output destination.
pub fn reject(output: &mut dyn CommandOutput) -> Result<Outcome, LaunchError> {
    output.write_all(INVALID_COMMAND.as_bytes())?;
    output.flush()?;
    Ok(Outcome::Rejected)
}

/// Launch the resolved program and block until it terminates.
///
/// `argv[0]` is passed to the child unchanged; the resolved path only locates
/// the program image. The child inherits a duplicate of `output` as its
/// standard output, reads nothing, and keeps the parent's stderr. When
/// `resolved` is `None` the invalid-command reply is written instead and no
/// child runs.
pub fn run_command(
    argv: &ArgumentVector,
    resolved: Option<&Path>,
    output: &mut dyn CommandOutput,
) -> Result<Outcome, LaunchError> {
    let Some(path) = resolved else {
        return reject(output);
    };
    let program = argv.program().ok_or(LaunchError::EmptyArguments)?;

    let mut child = Command::new(path)
        .arg0(program)
        .args(argv.options())
        .stdin(Stdio::null())
        .stdout(output.child_stdout().map_err(LaunchError::Duplicate)?)
        .stderr(Stdio::inherit())
        .spawn()
        .map_err(|source| LaunchError::Spawn {
            program: program.to_string(),
            source,
        })?;

    let pid = child.id();
    let status = child.wait().map_err(|source| LaunchError::Wait {
        program: program.to_string(),
        source,
    })?;
    debug!("child {pid} ({program}) terminated: {status}");

    Ok(Outcome::Exited(exit_code(status)))
}

fn exit_code(status: ExitStatus) -> ExitCode {
    use std::os::unix::process::ExitStatusExt;
    if let Some(code) = status.code() {
        code
    } else if let Some(signal) = ExitStatusExt::signal(&status) {
        128 + signal
    } else {
        -1
    }
}
