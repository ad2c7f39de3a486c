//! Tokenization of inbound command lines.

use thiserror::Error;

/// Upper bound on the number of bytes read from a connection for one command.
pub const MAX_COMMAND_BYTES: usize = 5000;

/// Upper bound on the number of arguments a single command may carry.
pub const MAX_ARGS: usize = 64;

/// Errors produced while turning a raw command line into arguments.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    /// The line split into more than [`MAX_ARGS`] tokens. Overflow is an
    /// explicit error rather than silent truncation, so a caller can report
    /// it instead of running a command the peer did not send.
    #[error("command has more than {max} arguments")]
    TooManyArguments { max: usize },
}

/// Ordered argument list parsed from one inbound command line.
///
/// The first element, when present, is the program name used for path
/// resolution; the remaining elements are passed to the child verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentVector {
    args: Vec<String>,
}

impl ArgumentVector {
    /// Split a raw command line into whitespace-separated, trimmed tokens.
    ///
    /// Empty and all-whitespace input parse to an empty vector; callers must
    /// treat the missing program name as an invalid command, not attempt
    /// resolution with it.
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let mut args = Vec::new();
        for token in line.split_whitespace() {
            if args.len() == MAX_ARGS {
                return Err(CommandError::TooManyArguments { max: MAX_ARGS });
            }
            args.push(token.to_string());
        }
        Ok(Self { args })
    }

    /// The program name, i.e. the first token.
    pub fn program(&self) -> Option<&str> {
        self.args.first().map(String::as_str)
    }

    /// The arguments following the program name.
    pub fn options(&self) -> &[String] {
        self.args.get(1..).unwrap_or(&[])
    }

    /// All tokens in order.
    pub fn as_slice(&self) -> &[String] {
        &self.args
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }
}
