//! A socket-activated, single-shot remote command launcher.
//!
//! The service accepts one TCP connection at a time, reads a single command
//! line from the peer, resolves the program against the `PATH` search list,
//! runs it with standard output bound to the connection, waits for it to
//! terminate, and closes the connection. One command per connection, no
//! authentication, no interactive back-and-forth.
//!
//! The building blocks are exposed as modules so they can be exercised on
//! their own: [`command`] tokenizes inbound lines, [`resolve`] walks the
//! search path, [`launch`] creates and supervises the child process, and
//! [`redirect`] scopes a connection as the active output destination.
//! [`Server`] ties them together behind a blocking accept loop.

pub mod command;
pub mod handler;
pub mod launch;
pub mod redirect;
pub mod resolve;
mod server;

/// Re-export of the blocking accept-loop service.
pub use server::Server;
