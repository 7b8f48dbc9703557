//! SRT CLI Library
//!
//! Shared functionality for SRT command-line tools.

pub mod config;
pub mod stats;

pub use config::{parse_option, socket_config, Config, ConfigError, ReceiverConfig, SenderConfig};
pub use stats::{display_compact_stats, display_stats, format_bandwidth, format_bytes, summary_line};

use tracing_subscriber::EnvFilter;

/// Log to stderr, filtered by `RUST_LOG` (default `info`, or `debug` when verbose).
///
/// Native library logs are routed through the same subscriber.
pub fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    srt::logging::forward_to_tracing();
    srt::logging::set_log_level(if verbose {
        srt::LogLevel::Debug
    } else {
        srt::LogLevel::Warning
    });
}
