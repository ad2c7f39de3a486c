use anyhow::{Context, Result};
use argh::FromArgs;
use log::info;
use nix::sys::signal::{self, SaFlags, SigAction, SigHandler, SigSet, Signal};
use rexecd::Server;
use std::net::{IpAddr, SocketAddr};
use std::sync::atomic::{AtomicBool, Ordering};

/// Single-shot remote command launcher: serves one command per connection,
/// streaming the program's standard output back to the peer.
#[derive(FromArgs)]
struct Args {
    /// address to listen on
    #[argh(positional)]
    address: IpAddr,

    /// port to listen on
    #[argh(positional)]
    port: u16,
}

static SHUTDOWN: AtomicBool = AtomicBool::new(false);

extern "C" fn on_sigint(_signum: nix::libc::c_int) {
    SHUTDOWN.store(true, Ordering::SeqCst);
}

/// Install the SIGINT handler without SA_RESTART so a blocking accept is
/// interrupted and the accept loop gets to observe the flag.
fn install_sigint_handler() -> Result<()> {
    let action = SigAction::new(
        SigHandler::Handler(on_sigint),
        SaFlags::empty(),
        SigSet::empty(),
    );
    unsafe { signal::sigaction(Signal::SIGINT, &action) }
        .context("failed to install SIGINT handler")?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let args: Args = argh::from_env();

    install_sigint_handler()?;
    let server = Server::bind(SocketAddr::new(args.address, args.port))?;
    info!("listening on {}", server.local_addr()?);
    server.run(&SHUTDOWN)
}
