//! Per-message control for `send_msg` / `recv_msg`

use srt_sys::SRT_MSGCTRL;
use std::ptr;

/// Where a message sits within a larger frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    Middle,
    Last,
    First,
    Solo,
}

impl Boundary {
    fn from_raw(raw: i32) -> Self {
        match raw & 0b11 {
            0b01 => Boundary::Last,
            0b10 => Boundary::First,
            0b11 => Boundary::Solo,
            _ => Boundary::Middle,
        }
    }

    fn as_raw(&self) -> i32 {
        match self {
            Boundary::Middle => 0b00,
            Boundary::Last => 0b01,
            Boundary::First => 0b10,
            Boundary::Solo => 0b11,
        }
    }
}

/// Message control block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MsgCtrl {
    /// TTL in milliseconds, -1 for none
    pub msg_ttl: i32,
    /// Whether a message may be delivered ahead of an earlier, partially lost one
    pub in_order: bool,
    pub boundary: Boundary,
    /// Source time in microseconds since epoch, 0 to use the library clock
    pub src_time: i64,
    /// Sequence number of the first packet of a received message
    pub pkt_seq: i32,
    /// Message number, filled in for both directions
    pub msg_no: i32,
}

impl Default for MsgCtrl {
    fn default() -> Self {
        MsgCtrl {
            msg_ttl: -1,
            in_order: false,
            boundary: Boundary::Middle,
            src_time: 0,
            pkt_seq: -1,
            msg_no: -1,
        }
    }
}

impl MsgCtrl {
    pub(crate) fn to_native(self) -> SRT_MSGCTRL {
        SRT_MSGCTRL {
            flags: 0,
            msgttl: self.msg_ttl,
            inorder: i32::from(self.in_order),
            boundary: self.boundary.as_raw(),
            srctime: self.src_time,
            pktseq: self.pkt_seq,
            msgno: self.msg_no,
            grpdata: ptr::null_mut(),
            grpdata_size: 0,
        }
    }
}

impl From<&SRT_MSGCTRL> for MsgCtrl {
    fn from(ctrl: &SRT_MSGCTRL) -> Self {
        MsgCtrl {
            msg_ttl: ctrl.msgttl,
            in_order: ctrl.inorder != 0,
            boundary: Boundary::from_raw(ctrl.boundary),
            src_time: ctrl.srctime,
            pkt_seq: ctrl.pktseq,
            msg_no: ctrl.msgno,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_native_defaults() {
        let native = MsgCtrl::default().to_native();
        assert_eq!(native.msgttl, -1);
        assert_eq!(native.inorder, 0);
        assert_eq!(native.boundary, 0);
        assert_eq!(native.srctime, 0);
        assert_eq!(native.msgno, -1);
        assert!(native.grpdata.is_null());
    }

    #[test]
    fn test_received_control_block() {
        let mut native = MsgCtrl::default().to_native();
        native.boundary = 0b11;
        native.msgno = 42;
        native.pktseq = 1000;
        native.srctime = 123_456;

        let ctrl = MsgCtrl::from(&native);
        assert_eq!(ctrl.boundary, Boundary::Solo);
        assert_eq!(ctrl.msg_no, 42);
        assert_eq!(ctrl.pkt_seq, 1000);
        assert_eq!(ctrl.src_time, 123_456);
    }
}
