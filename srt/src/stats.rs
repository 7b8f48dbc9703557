//! Connection statistics snapshot

use srt_sys::SRT_TRACEBSTATS;
use std::time::Duration;

/// Copy of the native transfer, loss and RTT counters taken at call time.
///
/// `*_total` fields accumulate over the socket's lifetime; the others cover
/// the interval since the counters were last cleared.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stats {
    /// Time since the socket was created
    pub uptime: Duration,

    // Totals
    pub pkt_sent_total: i64,
    pub pkt_recv_total: i64,
    pub pkt_snd_loss_total: i32,
    pub pkt_rcv_loss_total: i32,
    pub pkt_retrans_total: i32,
    pub pkt_snd_drop_total: i32,
    pub pkt_rcv_drop_total: i32,
    pub pkt_rcv_undecrypt_total: i32,
    pub byte_sent_total: u64,
    pub byte_recv_total: u64,
    pub byte_rcv_loss_total: u64,
    pub byte_retrans_total: u64,
    pub byte_snd_drop_total: u64,
    pub byte_rcv_drop_total: u64,

    // Interval
    pub pkt_sent: i64,
    pub pkt_recv: i64,
    pub pkt_snd_loss: i32,
    pub pkt_rcv_loss: i32,
    pub pkt_retrans: i32,
    pub pkt_rcv_retrans: i32,
    pub pkt_snd_drop: i32,
    pub pkt_rcv_drop: i32,
    pub pkt_rcv_belated: i64,
    pub byte_sent: u64,
    pub byte_recv: u64,
    pub mbps_send_rate: f64,
    pub mbps_recv_rate: f64,

    // Instantaneous
    pub ms_rtt: f64,
    pub mbps_bandwidth: f64,
    pub mbps_max_bw: f64,
    pub pkt_flight_size: i32,
    pub pkt_flow_window: i32,
    pub pkt_congestion_window: i32,
    pub byte_mss: i32,
    pub byte_avail_snd_buf: i32,
    pub byte_avail_rcv_buf: i32,
    pub pkt_snd_buf: i32,
    pub byte_snd_buf: i32,
    pub ms_snd_buf: i32,
    pub ms_snd_tsbpd_delay: i32,
    pub pkt_rcv_buf: i32,
    pub byte_rcv_buf: i32,
    pub ms_rcv_buf: i32,
    pub ms_rcv_tsbpd_delay: i32,
}

impl Stats {
    /// Round-trip time in microseconds
    pub fn rtt_us(&self) -> u32 {
        (self.ms_rtt * 1000.0).max(0.0) as u32
    }

    /// Estimated link bandwidth in bits per second
    pub fn bandwidth_bps(&self) -> u64 {
        (self.mbps_bandwidth * 1_000_000.0).max(0.0) as u64
    }

    /// Share of sent packets that were retransmissions, over the lifetime
    pub fn retransmit_ratio(&self) -> f64 {
        if self.pkt_sent_total > 0 {
            self.pkt_retrans_total as f64 / self.pkt_sent_total as f64
        } else {
            0.0
        }
    }
}

impl From<&SRT_TRACEBSTATS> for Stats {
    fn from(s: &SRT_TRACEBSTATS) -> Self {
        Stats {
            uptime: Duration::from_millis(s.msTimeStamp.max(0) as u64),

            pkt_sent_total: s.pktSentTotal,
            pkt_recv_total: s.pktRecvTotal,
            pkt_snd_loss_total: s.pktSndLossTotal,
            pkt_rcv_loss_total: s.pktRcvLossTotal,
            pkt_retrans_total: s.pktRetransTotal,
            pkt_snd_drop_total: s.pktSndDropTotal,
            pkt_rcv_drop_total: s.pktRcvDropTotal,
            pkt_rcv_undecrypt_total: s.pktRcvUndecryptTotal,
            byte_sent_total: s.byteSentTotal,
            byte_recv_total: s.byteRecvTotal,
            byte_rcv_loss_total: s.byteRcvLossTotal,
            byte_retrans_total: s.byteRetransTotal,
            byte_snd_drop_total: s.byteSndDropTotal,
            byte_rcv_drop_total: s.byteRcvDropTotal,

            pkt_sent: s.pktSent,
            pkt_recv: s.pktRecv,
            pkt_snd_loss: s.pktSndLoss,
            pkt_rcv_loss: s.pktRcvLoss,
            pkt_retrans: s.pktRetrans,
            pkt_rcv_retrans: s.pktRcvRetrans,
            pkt_snd_drop: s.pktSndDrop,
            pkt_rcv_drop: s.pktRcvDrop,
            pkt_rcv_belated: s.pktRcvBelated,
            byte_sent: s.byteSent,
            byte_recv: s.byteRecv,
            mbps_send_rate: s.mbpsSendRate,
            mbps_recv_rate: s.mbpsRecvRate,

            ms_rtt: s.msRTT,
            mbps_bandwidth: s.mbpsBandwidth,
            mbps_max_bw: s.mbpsMaxBW,
            pkt_flight_size: s.pktFlightSize,
            pkt_flow_window: s.pktFlowWindow,
            pkt_congestion_window: s.pktCongestionWindow,
            byte_mss: s.byteMSS,
            byte_avail_snd_buf: s.byteAvailSndBuf,
            byte_avail_rcv_buf: s.byteAvailRcvBuf,
            pkt_snd_buf: s.pktSndBuf,
            byte_snd_buf: s.byteSndBuf,
            ms_snd_buf: s.msSndBuf,
            ms_snd_tsbpd_delay: s.msSndTsbPdDelay,
            pkt_rcv_buf: s.pktRcvBuf,
            byte_rcv_buf: s.byteRcvBuf,
            ms_rcv_buf: s.msRcvBuf,
            ms_rcv_tsbpd_delay: s.msRcvTsbPdDelay,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_native_counters() {
        let native = SRT_TRACEBSTATS {
            msTimeStamp: 2500,
            pktSentTotal: 200,
            pktRetransTotal: 10,
            byteRecvTotal: 1_316_000,
            msRTT: 12.5,
            mbpsBandwidth: 95.0,
            pktRcvLossTotal: 3,
            ..Default::default()
        };

        let stats = Stats::from(&native);
        assert_eq!(stats.uptime, Duration::from_millis(2500));
        assert_eq!(stats.byte_recv_total, 1_316_000);
        assert_eq!(stats.pkt_rcv_loss_total, 3);
        assert_eq!(stats.rtt_us(), 12_500);
        assert_eq!(stats.bandwidth_bps(), 95_000_000);
        assert!((stats.retransmit_ratio() - 0.05).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_stats() {
        let stats = Stats::default();
        assert_eq!(stats.retransmit_ratio(), 0.0);
        assert_eq!(stats.rtt_us(), 0);
    }
}
