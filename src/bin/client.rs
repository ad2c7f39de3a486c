use anyhow::{Context, Result};
use argh::FromArgs;
use std::io::{self, Read, Write};
use std::net::{IpAddr, Shutdown, SocketAddr, TcpStream};

/// Companion client: send one command to a rexecd server and print whatever
/// the remote program writes back.
#[derive(FromArgs)]
struct Args {
    /// server address to connect to
    #[argh(positional)]
    address: IpAddr,

    /// server port
    #[argh(positional)]
    port: u16,

    /// command line to execute remotely (quote it to keep it one argument)
    #[argh(positional)]
    command: String,
}

fn main() -> Result<()> {
    env_logger::init();
    let args: Args = argh::from_env();

    let addr = SocketAddr::new(args.address, args.port);
    let mut conn =
        TcpStream::connect(addr).with_context(|| format!("failed to connect to {addr}"))?;

    conn.write_all(args.command.as_bytes())
        .context("failed to send command")?;
    conn.shutdown(Shutdown::Write)
        .context("failed to finish sending")?;

    // The reply is unframed; the server closing the connection is the only
    // end-of-response marker.
    let mut reply = Vec::new();
    conn.read_to_end(&mut reply).context("failed to read reply")?;
    io::stdout()
        .write_all(&reply)
        .context("failed to write reply")?;
    Ok(())
}
