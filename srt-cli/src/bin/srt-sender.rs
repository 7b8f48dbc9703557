//! SRT Sender - stream sender
//!
//! Reads from stdin or a file and sends it over one SRT connection, as caller
//! or in rendezvous mode.

use anyhow::Context;
use clap::Parser;
use srt::Socket;
use srt_cli::{parse_option, socket_config, summary_line, Config, SenderConfig};
use srt_io::{RateLimiter, Timer};
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

#[derive(Parser, Debug)]
#[command(name = "srt-sender")]
#[command(about = "SRT stream sender", long_about = None)]
struct Args {
    /// TOML configuration file with a [sender] section
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Input source: file path or '-' for stdin
    #[arg(short, long)]
    input: Option<String>,

    /// Remote host
    #[arg(long)]
    host: Option<String>,

    /// Remote port
    #[arg(short, long)]
    port: Option<u16>,

    /// Socket option, repeatable (e.g. -o latency=200 -o streamid=cam1)
    #[arg(short = 'o', long = "option", value_parser = parse_option)]
    options: Vec<(String, String)>,

    /// Pacing limit in bits per second
    #[arg(long)]
    bitrate: Option<u64>,

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
    fn into_sender_config(self) -> anyhow::Result<(SenderConfig, Vec<(String, String)>)> {
        let file = match &self.config {
            Some(path) => Config::from_file(path)
                .with_context(|| format!("loading {}", path.display()))?
                .sender,
            None => None,
        };

        let host = self
            .host
            .or_else(|| file.as_ref().map(|f| f.host.clone()))
            .context("a remote host is required (--host or [sender].host)")?;
        let port = self
            .port
            .or_else(|| file.as_ref().map(|f| f.port))
            .context("a remote port is required (--port or [sender].port)")?;

        let config = SenderConfig {
            input: self
                .input
                .or_else(|| file.as_ref().map(|f| f.input.clone()))
                .unwrap_or_else(|| "-".to_string()),
            host,
            port,
            options: file.as_ref().map(|f| f.options.clone()).unwrap_or_default(),
            bitrate_bps: self.bitrate.or_else(|| file.as_ref().and_then(|f| f.bitrate_bps)),
            stats_interval_secs: self
                .stats
                .or_else(|| file.as_ref().map(|f| f.stats_interval_secs))
                .unwrap_or(1),
        };
        Ok((config, self.options))
    }
}

fn open_input(input: &str) -> anyhow::Result<Box<dyn Read>> {
    if input == "-" {
        tracing::info!("Reading from stdin");
        Ok(Box::new(io::stdin()))
    } else {
        tracing::info!("Reading from file {}", input);
        let file = File::open(input).with_context(|| format!("opening {}", input))?;
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Fill `buf` as far as the input allows, so each message is as large as allowed.
fn read_chunk(reader: &mut dyn Read, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    srt_cli::init_logging(args.verbose);

    if let Some(path) = &args.write_example_config {
        Config::example_sender()
            .to_file(path)
            .with_context(|| format!("writing {}", path.display()))?;
        tracing::info!("Wrote example configuration to {}", path.display());
        return Ok(());
    }

    let (config, overrides) = args.into_sender_config()?;
    srt::startup()?;
    tracing::info!("SRT Sender starting (libsrt {})", srt::version());

    let socket_config = socket_config(&config.options, &overrides);

    let mut socket = Socket::new(&config.host, config.port, socket_config)?;
    socket
        .connect()
        .with_context(|| format!("connecting to {}:{}", config.host, config.port))?;
    tracing::info!("Connected to {}", socket.peer_addr()?);

    let mut reader = open_input(&config.input)?;
    let chunk_size = socket.max_message_size()?;
    tracing::debug!("Sending messages of up to {} bytes", chunk_size);
    let mut limiter = config
        .bitrate_bps
        .map(|bps| RateLimiter::new(bps, (chunk_size * 10) as u64));
    let mut stats_timer = (config.stats_interval_secs > 0).then(|| Timer::new(config.stats_interval()));

    let mut buffer = vec![0u8; chunk_size];
    let mut total_bytes = 0u64;
    let mut packet_count = 0u64;
    let start_time = Instant::now();

    loop {
        let n = read_chunk(&mut reader, &mut buffer)?;
        if n == 0 {
            tracing::info!("End of input reached");
            break;
        }

        if let Some(limiter) = limiter.as_mut() {
            while !limiter.consume(n) {
                thread::sleep(limiter.time_to_available(n).max(Duration::from_micros(50)));
            }
        }

        socket.write(&buffer[..n]).context("sending")?;
        total_bytes += n as u64;
        packet_count += 1;

        if let Some(timer) = stats_timer.as_mut() {
            if timer.try_fire() {
                match socket.stats(false) {
                    Ok(stats) => tracing::info!("{}", summary_line(&stats)),
                    Err(e) => tracing::warn!("Could not read statistics: {}", e),
                }
            }
        }
    }

    let elapsed = start_time.elapsed().as_secs_f64().max(f64::EPSILON);
    tracing::info!(
        "Sent {} packets, {} bytes, {:.2} Mbps average",
        packet_count,
        total_bytes,
        (total_bytes as f64 * 8.0) / (elapsed * 1_000_000.0)
    );

    socket.close()?;
    srt::cleanup()?;
    Ok(())
}
