//! Statistics display and formatting

use srt::Stats;
use std::io::{self, Write};
use std::time::Duration;

/// Format bytes in human-readable form
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Format bandwidth in human-readable form
pub fn format_bandwidth(bps: u64) -> String {
    const KBPS: u64 = 1000;
    const MBPS: u64 = KBPS * 1000;
    const GBPS: u64 = MBPS * 1000;

    if bps >= GBPS {
        format!("{:.2} Gbps", bps as f64 / GBPS as f64)
    } else if bps >= MBPS {
        format!("{:.2} Mbps", bps as f64 / MBPS as f64)
    } else if bps >= KBPS {
        format!("{:.2} Kbps", bps as f64 / KBPS as f64)
    } else {
        format!("{} bps", bps)
    }
}

/// Format RTT in human-readable form
pub fn format_rtt(rtt_us: u32) -> String {
    if rtt_us >= 1_000_000 {
        format!("{:.2}s", rtt_us as f64 / 1_000_000.0)
    } else if rtt_us >= 1_000 {
        format!("{:.2}ms", rtt_us as f64 / 1_000.0)
    } else {
        format!("{}µs", rtt_us)
    }
}

/// Format duration in human-readable form
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;

    if hours > 0 {
        format!("{}h {:02}m {:02}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {:02}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

/// One-line summary of a connection's counters
pub fn summary_line(stats: &Stats) -> String {
    let rtt = if stats.ms_rtt > 0.0 {
        format_rtt(stats.rtt_us())
    } else {
        "N/A".to_string()
    };
    let bandwidth = if stats.mbps_bandwidth > 0.0 {
        format_bandwidth(stats.bandwidth_bps())
    } else {
        "N/A".to_string()
    };

    format!(
        "[{:>8}] Sent: {} | Recv: {} | Loss: {}/{} | Retrans: {} | RTT: {} | BW: {}",
        format_duration(stats.uptime),
        format_bytes(stats.byte_sent_total),
        format_bytes(stats.byte_recv_total),
        stats.pkt_snd_loss_total,
        stats.pkt_rcv_loss_total,
        stats.pkt_retrans_total,
        rtt,
        bandwidth
    )
}

/// Display statistics as a table
pub fn display_stats(stats: &Stats) {
    println!("\n┌─────────────────────────────────────────────────────────────┐");
    println!("│ CONNECTION STATISTICS                                       │");
    println!("├─────────────────────────────────────────────────────────────┤");
    println!("│ Uptime:     {:<48}│", format_duration(stats.uptime));
    println!(
        "│ Packets:    {:<48}│",
        format!("{} sent / {} received", stats.pkt_sent_total, stats.pkt_recv_total)
    );
    println!(
        "│ Bytes:      {:<48}│",
        format!(
            "{} sent / {} received",
            format_bytes(stats.byte_sent_total),
            format_bytes(stats.byte_recv_total)
        )
    );
    println!(
        "│ Loss:       {:<48}│",
        format!("{} send / {} receive", stats.pkt_snd_loss_total, stats.pkt_rcv_loss_total)
    );
    println!(
        "│ Dropped:    {:<48}│",
        format!("{} send / {} receive", stats.pkt_snd_drop_total, stats.pkt_rcv_drop_total)
    );
    println!("│ RTT:        {:<48}│", format_rtt(stats.rtt_us()));
    println!("│ Bandwidth:  {:<48}│", format_bandwidth(stats.bandwidth_bps()));
    println!("└─────────────────────────────────────────────────────────────┘");
}

/// Display compact stats on one line (for continuous updates)
pub fn display_compact_stats(stats: &Stats) {
    eprint!("\r{}         ", summary_line(stats));
    let _ = io::stderr().flush();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(500), "500 B");
        assert_eq!(format_bytes(2048), "2.00 KB");
        assert_eq!(format_bytes(2 * 1024 * 1024), "2.00 MB");
    }

    #[test]
    fn test_format_bandwidth() {
        assert_eq!(format_bandwidth(500), "500 bps");
        assert_eq!(format_bandwidth(10_000), "10.00 Kbps");
        assert_eq!(format_bandwidth(10_000_000), "10.00 Mbps");
    }

    #[test]
    fn test_format_rtt() {
        assert_eq!(format_rtt(500), "500µs");
        assert_eq!(format_rtt(50_000), "50.00ms");
        assert_eq!(format_rtt(2_000_000), "2.00s");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_secs(30)), "30s");
        assert_eq!(format_duration(Duration::from_secs(90)), "1m 30s");
        assert_eq!(format_duration(Duration::from_secs(3661)), "1h 01m 01s");
    }

    #[test]
    fn test_summary_line() {
        let stats = Stats {
            uptime: Duration::from_secs(90),
            byte_sent_total: 2048,
            pkt_rcv_loss_total: 4,
            ms_rtt: 20.0,
            ..Default::default()
        };

        let line = summary_line(&stats);
        assert!(line.contains("1m 30s"));
        assert!(line.contains("Sent: 2.00 KB"));
        assert!(line.contains("Loss: 0/4"));
        assert!(line.contains("RTT: 20.00ms"));
        assert!(line.contains("BW: N/A"));
    }
}
