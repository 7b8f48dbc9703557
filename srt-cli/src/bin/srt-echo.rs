//! SRT Echo - echo server
//!
//! Sends every message back to the caller that sent it. Callers can be
//! filtered by stream id; anyone else is rejected as unauthorized.

use anyhow::Context;
use clap::Parser;
use crossbeam::channel::{self, Receiver};
use srt::{ConnectionRequest, RejectReason, Socket, SrtError};
use srt_cli::{parse_option, socket_config};
use std::collections::HashSet;
use std::net::SocketAddr;
use std::thread;
use std::time::Duration;

const ACCEPT_POLL: Duration = Duration::from_secs(1);

#[derive(Parser, Debug)]
#[command(name = "srt-echo")]
#[command(about = "SRT echo server", long_about = None)]
struct Args {
    /// Listen port
    #[arg(short, long)]
    listen: u16,

    /// Bind address (default: all interfaces)
    #[arg(short, long, default_value = "")]
    bind: String,

    /// Accepted stream id, repeatable; all callers are accepted when none are given
    #[arg(short = 's', long = "stream-id")]
    stream_ids: Vec<String>,

    /// Socket option, repeatable (e.g. -o latency=200)
    #[arg(short = 'o', long = "option", value_parser = parse_option)]
    options: Vec<(String, String)>,

    /// Listen backlog
    #[arg(long, default_value = "16")]
    backlog: i32,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// Accept a request only if its stream id is allowed.
fn admit(allowed: &HashSet<String>, request: &ConnectionRequest<'_>) -> bool {
    if allowed.is_empty() || allowed.contains(request.stream_id()) {
        return true;
    }

    tracing::info!(
        "Rejecting {:?} with stream id '{}'",
        request.peer_addr(),
        request.stream_id()
    );
    if let Err(e) = request.set_reject_reason(RejectReason::Unauthorized) {
        tracing::warn!("Could not set reject reason: {}", e);
    }
    false
}

fn echo(conn: &Socket) -> srt::Result<u64> {
    let mut buffer = vec![0u8; conn.packet_size()];
    let mut echoed = 0u64;

    loop {
        let n = match conn.read(&mut buffer) {
            Ok(0) => return Ok(echoed),
            Ok(n) => n,
            Err(SrtError::EpollTimeout) => continue,
            Err(_) if conn.state().is_closed() => return Ok(echoed),
            Err(e) => return Err(e),
        };
        conn.write(&buffer[..n])?;
        echoed += n as u64;
    }
}

type Finished = (SocketAddr, srt::Result<u64>);

/// Log connections that have ended since the last call, without waiting.
fn report_finished(done_rx: &Receiver<Finished>) -> usize {
    let mut count = 0;
    for (peer, result) in done_rx.try_iter() {
        match result {
            Ok(bytes) => tracing::info!("{} disconnected after {} bytes", peer, bytes),
            Err(e) => tracing::warn!("{} failed: {}", peer, e),
        }
        count += 1;
    }
    count
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    srt_cli::init_logging(args.verbose);

    srt::startup()?;
    tracing::info!("SRT Echo starting (libsrt {})", srt::version());

    let mut config = socket_config(&Default::default(), &args.options);
    config.insert("mode", "listener");

    let mut listener = Socket::new(&args.bind, args.listen, config)?;
    let allowed: HashSet<String> = args.stream_ids.iter().cloned().collect();
    listener.set_listen_callback(move |request| admit(&allowed, request))?;
    listener.listen(args.backlog)?;
    tracing::info!("Echoing on {}", listener.local_addr()?);

    // Bounded accept waits, so finished connections get reported promptly.
    listener.set_poll_timeout(ACCEPT_POLL);

    let (done_tx, done_rx) = channel::unbounded::<Finished>();

    loop {
        report_finished(&done_rx);

        let (conn, peer) = match listener.accept() {
            Ok(accepted) => accepted,
            Err(SrtError::EpollTimeout) => continue,
            Err(e) => return Err(e).context("accepting"),
        };
        tracing::info!("Accepted {}", peer);

        let done_tx = done_tx.clone();
        thread::Builder::new()
            .name(format!("echo-{}", peer))
            .spawn(move || {
                let mut conn = conn;
                let result = echo(&conn);
                if let Err(e) = conn.close() {
                    tracing::warn!("Error closing connection from {}: {}", peer, e);
                }
                // The receiver only goes away when main exits.
                let _ = done_tx.send((peer, result));
            })
            .context("spawning connection thread")?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_finished_drains_without_blocking() {
        let (done_tx, done_rx) = channel::unbounded::<Finished>();
        assert_eq!(report_finished(&done_rx), 0);

        let peer: SocketAddr = "127.0.0.1:4000".parse().unwrap();
        done_tx.send((peer, Ok(1316))).unwrap();
        done_tx.send((peer, Err(SrtError::SocketClosed))).unwrap();

        assert_eq!(report_finished(&done_rx), 2);
        assert_eq!(report_finished(&done_rx), 0);
    }
}
