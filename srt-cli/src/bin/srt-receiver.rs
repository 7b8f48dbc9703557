//! SRT Receiver - stream receiver
//!
//! Listens for callers, one at a time, and writes what they send to stdout
//! or a file.

use anyhow::Context;
use clap::Parser;
use srt::{Socket, SrtError};
use srt_cli::{display_stats, parse_option, socket_config, summary_line, Config, ReceiverConfig};
use srt_io::Timer;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "srt-receiver")]
#[command(about = "SRT stream receiver", long_about = None)]
struct Args {
    /// TOML configuration file with a [receiver] section
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output file (use '-' for stdout)
    #[arg(short, long)]
    output: Option<String>,

    /// Listen port
    #[arg(short, long)]
    listen: Option<u16>,

    /// Bind address (default: all interfaces)
    #[arg(short, long)]
    bind: Option<String>,

    /// Socket option, repeatable (e.g. -o latency=200)
    #[arg(short = 'o', long = "option", value_parser = parse_option)]
    options: Vec<(String, String)>,

    /// Exit after the first caller disconnects
    #[arg(long)]
    once: bool,

    /// Statistics interval in seconds (0 disables)
    #[arg(long)]
    stats: Option<u64>,

    /// Write an example configuration to this path and exit
    #[arg(long, value_name = "PATH")]
    write_example_config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn receiver_config(&self) -> anyhow::Result<ReceiverConfig> {
        let file = match &self.config {
            Some(path) => Config::from_file(path)
                .with_context(|| format!("loading {}", path.display()))?
                .receiver,
            None => None,
        };

        let port = self
            .listen
            .or_else(|| file.as_ref().map(|f| f.port))
            .context("a listen port is required (--listen or [receiver].port)")?;

        Ok(ReceiverConfig {
            output: self
                .output
                .clone()
                .or_else(|| file.as_ref().map(|f| f.output.clone()))
                .unwrap_or_else(|| "-".to_string()),
            bind: self
                .bind
                .clone()
                .or_else(|| file.as_ref().map(|f| f.bind.clone()))
                .unwrap_or_default(),
            port,
            options: file.as_ref().map(|f| f.options.clone()).unwrap_or_default(),
            buffer_size: file
                .as_ref()
                .map(|f| f.buffer_size)
                .unwrap_or(srt::DEFAULT_PACKET_SIZE),
            stats_interval_secs: self
                .stats
                .or_else(|| file.as_ref().map(|f| f.stats_interval_secs))
                .unwrap_or(1),
        })
    }
}

fn open_output(output: &str) -> anyhow::Result<Box<dyn Write>> {
    if output == "-" {
        tracing::info!("Writing to stdout");
        Ok(Box::new(io::stdout()))
    } else {
        tracing::info!("Writing to file: {}", output);
        let file = File::create(output)
            .with_context(|| format!("Failed to create file '{}'", output))?;
        Ok(Box::new(BufWriter::new(file)))
    }
}

/// Copy one connection to `writer` until the caller goes away.
fn receive(conn: &Socket, config: &ReceiverConfig, writer: &mut dyn Write) -> anyhow::Result<u64> {
    let mut buffer = vec![0u8; config.buffer_size.max(conn.packet_size())];
    let mut stats_timer = (config.stats_interval_secs > 0).then(|| Timer::new(config.stats_interval()));
    let mut total_bytes = 0u64;

    loop {
        let n = match conn.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(SrtError::EpollTimeout) => continue,
            Err(e) if conn.state().is_closed() => {
                tracing::info!("Caller disconnected: {}", e);
                break;
            }
            Err(e) => return Err(e).context("receiving"),
        };

        writer.write_all(&buffer[..n])?;
        total_bytes += n as u64;

        if let Some(timer) = stats_timer.as_mut() {
            if timer.try_fire() {
                if let Ok(stats) = conn.stats(false) {
                    tracing::info!("{}", summary_line(&stats));
                }
            }
        }
    }

    writer.flush()?;
    if let Ok(stats) = conn.stats(false) {
        display_stats(&stats);
    }
    Ok(total_bytes)
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    srt_cli::init_logging(args.verbose);

    if let Some(path) = &args.write_example_config {
        Config::example_receiver()
            .to_file(path)
            .with_context(|| format!("writing {}", path.display()))?;
        tracing::info!("Wrote example configuration to {}", path.display());
        return Ok(());
    }

    let config = args.receiver_config()?;
    srt::startup()?;
    tracing::info!("SRT Receiver starting (libsrt {})", srt::version());

    let mut socket_config = socket_config(&config.options, &args.options);
    if !socket_config.contains("mode") {
        socket_config.insert("mode", "listener");
    }

    let mut listener = Socket::new(&config.bind, config.port, socket_config)?;
    listener.listen(1)?;
    tracing::info!("Listening on: {}", listener.local_addr()?);

    let mut writer = open_output(&config.output)?;

    loop {
        let (mut conn, peer) = match listener.accept() {
            Ok(accepted) => accepted,
            Err(SrtError::EpollTimeout) => continue,
            Err(e) => return Err(e).context("accepting"),
        };
        tracing::info!("Accepted caller from {}", peer);

        let received = receive(&conn, &config, &mut writer)?;
        tracing::info!("Received {} bytes from {}", received, peer);
        conn.close()?;

        if args.once {
            break;
        }
    }

    listener.close()?;
    srt::cleanup()?;
    Ok(())
}
