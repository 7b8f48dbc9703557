//! Raw FFI declarations for the SRT native library (`libsrt`).
//!
//! Mirrors the subset of `srt/srt.h` and `srt/access_control.h` used by the
//! `srt` crate. Nothing here is safe to call without upholding the C API's
//! own contracts; see the `srt` crate for the safe wrapper.

#![allow(non_camel_case_types)]
#![allow(non_snake_case)]

use libc::sockaddr;
use std::os::raw::{c_char, c_int, c_void};

pub type SRTSOCKET = c_int;
pub type SRT_SOCKOPT = c_int;
pub type SRT_SOCKSTATUS = c_int;

pub const SRT_INVALID_SOCK: SRTSOCKET = -1;
pub const SRT_ERROR: c_int = -1;

// Socket status
pub const SRTS_INIT: SRT_SOCKSTATUS = 1;
pub const SRTS_OPENED: SRT_SOCKSTATUS = 2;
pub const SRTS_LISTENING: SRT_SOCKSTATUS = 3;
pub const SRTS_CONNECTING: SRT_SOCKSTATUS = 4;
pub const SRTS_CONNECTED: SRT_SOCKSTATUS = 5;
pub const SRTS_BROKEN: SRT_SOCKSTATUS = 6;
pub const SRTS_CLOSING: SRT_SOCKSTATUS = 7;
pub const SRTS_CLOSED: SRT_SOCKSTATUS = 8;
pub const SRTS_NONEXIST: SRT_SOCKSTATUS = 9;

// Socket options
pub const SRTO_MSS: SRT_SOCKOPT = 0;
pub const SRTO_SNDSYN: SRT_SOCKOPT = 1;
pub const SRTO_RCVSYN: SRT_SOCKOPT = 2;
pub const SRTO_ISN: SRT_SOCKOPT = 3;
pub const SRTO_FC: SRT_SOCKOPT = 4;
pub const SRTO_SNDBUF: SRT_SOCKOPT = 5;
pub const SRTO_RCVBUF: SRT_SOCKOPT = 6;
pub const SRTO_LINGER: SRT_SOCKOPT = 7;
pub const SRTO_UDP_SNDBUF: SRT_SOCKOPT = 8;
pub const SRTO_UDP_RCVBUF: SRT_SOCKOPT = 9;
pub const SRTO_RENDEZVOUS: SRT_SOCKOPT = 12;
pub const SRTO_SNDTIMEO: SRT_SOCKOPT = 13;
pub const SRTO_RCVTIMEO: SRT_SOCKOPT = 14;
pub const SRTO_REUSEADDR: SRT_SOCKOPT = 15;
pub const SRTO_MAXBW: SRT_SOCKOPT = 16;
pub const SRTO_STATE: SRT_SOCKOPT = 17;
pub const SRTO_EVENT: SRT_SOCKOPT = 18;
pub const SRTO_SNDDATA: SRT_SOCKOPT = 19;
pub const SRTO_RCVDATA: SRT_SOCKOPT = 20;
pub const SRTO_SENDER: SRT_SOCKOPT = 21;
pub const SRTO_TSBPDMODE: SRT_SOCKOPT = 22;
pub const SRTO_LATENCY: SRT_SOCKOPT = 23;
pub const SRTO_INPUTBW: SRT_SOCKOPT = 24;
pub const SRTO_OHEADBW: SRT_SOCKOPT = 25;
pub const SRTO_PASSPHRASE: SRT_SOCKOPT = 26;
pub const SRTO_PBKEYLEN: SRT_SOCKOPT = 27;
pub const SRTO_KMSTATE: SRT_SOCKOPT = 28;
pub const SRTO_IPTTL: SRT_SOCKOPT = 29;
pub const SRTO_IPTOS: SRT_SOCKOPT = 30;
pub const SRTO_TLPKTDROP: SRT_SOCKOPT = 31;
pub const SRTO_SNDDROPDELAY: SRT_SOCKOPT = 32;
pub const SRTO_NAKREPORT: SRT_SOCKOPT = 33;
pub const SRTO_VERSION: SRT_SOCKOPT = 34;
pub const SRTO_PEERVERSION: SRT_SOCKOPT = 35;
pub const SRTO_CONNTIMEO: SRT_SOCKOPT = 36;
pub const SRTO_DRIFTTRACER: SRT_SOCKOPT = 37;
pub const SRTO_MININPUTBW: SRT_SOCKOPT = 38;
pub const SRTO_SNDKMSTATE: SRT_SOCKOPT = 40;
pub const SRTO_RCVKMSTATE: SRT_SOCKOPT = 41;
pub const SRTO_LOSSMAXTTL: SRT_SOCKOPT = 42;
pub const SRTO_RCVLATENCY: SRT_SOCKOPT = 43;
pub const SRTO_PEERLATENCY: SRT_SOCKOPT = 44;
pub const SRTO_MINVERSION: SRT_SOCKOPT = 45;
pub const SRTO_STREAMID: SRT_SOCKOPT = 46;
pub const SRTO_CONGESTION: SRT_SOCKOPT = 47;
pub const SRTO_MESSAGEAPI: SRT_SOCKOPT = 48;
pub const SRTO_PAYLOADSIZE: SRT_SOCKOPT = 49;
pub const SRTO_TRANSTYPE: SRT_SOCKOPT = 50;
pub const SRTO_KMREFRESHRATE: SRT_SOCKOPT = 51;
pub const SRTO_KMPREANNOUNCE: SRT_SOCKOPT = 52;
pub const SRTO_ENFORCEDENCRYPTION: SRT_SOCKOPT = 53;
pub const SRTO_IPV6ONLY: SRT_SOCKOPT = 54;
pub const SRTO_PEERIDLETIMEO: SRT_SOCKOPT = 55;
pub const SRTO_BINDTODEVICE: SRT_SOCKOPT = 56;
pub const SRTO_PACKETFILTER: SRT_SOCKOPT = 60;
pub const SRTO_RETRANSMITALGO: SRT_SOCKOPT = 61;

// Transmission types
pub const SRTT_LIVE: c_int = 0;
pub const SRTT_FILE: c_int = 1;
pub const SRTT_INVALID: c_int = 2;

// Epoll event flags
pub const SRT_EPOLL_OPT_NONE: c_int = 0x0;
pub const SRT_EPOLL_IN: c_int = 0x1;
pub const SRT_EPOLL_OUT: c_int = 0x4;
pub const SRT_EPOLL_ERR: c_int = 0x8;
pub const SRT_EPOLL_UPDATE: c_int = 0x10;
pub const SRT_EPOLL_ET: c_int = 1 << 31;

#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct SRT_EPOLL_EVENT {
    pub fd: SRTSOCKET,
    pub events: c_int,
}

// Error codes (SRT_ERRNO)
pub const SRT_EUNKNOWN: c_int = -1;
pub const SRT_SUCCESS: c_int = 0;
pub const SRT_ECONNSETUP: c_int = 1000;
pub const SRT_ENOSERVER: c_int = 1001;
pub const SRT_ECONNREJ: c_int = 1002;
pub const SRT_ESOCKFAIL: c_int = 1003;
pub const SRT_ESECFAIL: c_int = 1004;
pub const SRT_ESCLOSED: c_int = 1005;
pub const SRT_ECONNFAIL: c_int = 2000;
pub const SRT_ECONNLOST: c_int = 2001;
pub const SRT_ENOCONN: c_int = 2002;
pub const SRT_ERESOURCE: c_int = 3000;
pub const SRT_ETHREAD: c_int = 3001;
pub const SRT_ENOBUF: c_int = 3002;
pub const SRT_ESYSOBJ: c_int = 3003;
pub const SRT_EFILE: c_int = 4000;
pub const SRT_EINVRDOFF: c_int = 4001;
pub const SRT_ERDPERM: c_int = 4002;
pub const SRT_EINVWROFF: c_int = 4003;
pub const SRT_EWRPERM: c_int = 4004;
pub const SRT_EINVOP: c_int = 5000;
pub const SRT_EBOUNDSOCK: c_int = 5001;
pub const SRT_ECONNSOCK: c_int = 5002;
pub const SRT_EINVPARAM: c_int = 5003;
pub const SRT_EINVSOCK: c_int = 5004;
pub const SRT_EUNBOUNDSOCK: c_int = 5005;
pub const SRT_ENOLISTEN: c_int = 5006;
pub const SRT_ERDVNOSERV: c_int = 5007;
pub const SRT_ERDVUNBOUND: c_int = 5008;
pub const SRT_EINVALMSGAPI: c_int = 5009;
pub const SRT_EINVALBUFFERAPI: c_int = 5010;
pub const SRT_EDUPLISTEN: c_int = 5011;
pub const SRT_ELARGEMSG: c_int = 5012;
pub const SRT_EINVPOLLID: c_int = 5013;
pub const SRT_EPOLLEMPTY: c_int = 5014;
pub const SRT_EBINDCONFLICT: c_int = 5015;
pub const SRT_EASYNCFAIL: c_int = 6000;
pub const SRT_EASYNCSND: c_int = 6001;
pub const SRT_EASYNCRCV: c_int = 6002;
pub const SRT_ETIMEOUT: c_int = 6003;
pub const SRT_ECONGEST: c_int = 6004;
pub const SRT_EPEERERR: c_int = 7000;

// Rejection reasons reported by the library itself (SRT_REJECT_REASON)
pub const SRT_REJ_UNKNOWN: c_int = 0;
pub const SRT_REJ_SYSTEM: c_int = 1;
pub const SRT_REJ_PEER: c_int = 2;
pub const SRT_REJ_RESOURCE: c_int = 3;
pub const SRT_REJ_ROGUE: c_int = 4;
pub const SRT_REJ_BACKLOG: c_int = 5;
pub const SRT_REJ_IPE: c_int = 6;
pub const SRT_REJ_CLOSE: c_int = 7;
pub const SRT_REJ_VERSION: c_int = 8;
pub const SRT_REJ_RDVCOOKIE: c_int = 9;
pub const SRT_REJ_BADSECRET: c_int = 10;
pub const SRT_REJ_UNSECURE: c_int = 11;
pub const SRT_REJ_MESSAGEAPI: c_int = 12;
pub const SRT_REJ_CONGESTION: c_int = 13;
pub const SRT_REJ_FILTER: c_int = 14;
pub const SRT_REJ_GROUP: c_int = 15;
pub const SRT_REJ_TIMEOUT: c_int = 16;

// Application rejection codes (access_control.h)
pub const SRT_REJC_PREDEFINED: c_int = 1000;
pub const SRT_REJC_USERDEFINED: c_int = 2000;

pub const SRT_REJX_FALLBACK: c_int = 1000;
pub const SRT_REJX_KEY_NOTSUP: c_int = 1001;
pub const SRT_REJX_FILEPATH: c_int = 1002;
pub const SRT_REJX_HOSTNOTFOUND: c_int = 1003;
pub const SRT_REJX_BAD_REQUEST: c_int = 1400;
pub const SRT_REJX_UNAUTHORIZED: c_int = 1401;
pub const SRT_REJX_OVERLOAD: c_int = 1402;
pub const SRT_REJX_FORBIDDEN: c_int = 1403;
pub const SRT_REJX_NOTFOUND: c_int = 1404;
pub const SRT_REJX_BAD_MODE: c_int = 1405;
pub const SRT_REJX_UNACCEPTABLE: c_int = 1406;
pub const SRT_REJX_CONFLICT: c_int = 1409;
pub const SRT_REJX_NOTSUP_MEDIA: c_int = 1415;
pub const SRT_REJX_LOCKED: c_int = 1423;
pub const SRT_REJX_FAILED_DEPEND: c_int = 1424;
pub const SRT_REJX_ISE: c_int = 1500;
pub const SRT_REJX_UNIMPLEMENTED: c_int = 1501;
pub const SRT_REJX_GW: c_int = 1502;
pub const SRT_REJX_DOWN: c_int = 1503;
pub const SRT_REJX_VERSION: c_int = 1505;
pub const SRT_REJX_NOROOM: c_int = 1507;

// Syslog-compatible log levels
pub const LOG_CRIT: c_int = 2;
pub const LOG_ERR: c_int = 3;
pub const LOG_WARNING: c_int = 4;
pub const LOG_NOTICE: c_int = 5;
pub const LOG_INFO: c_int = 6;
pub const LOG_DEBUG: c_int = 7;

// Log formatting flags
pub const SRT_LOGF_DISABLE_TIME: c_int = 1;
pub const SRT_LOGF_DISABLE_THREADNAME: c_int = 2;
pub const SRT_LOGF_DISABLE_SEVERITY: c_int = 4;
pub const SRT_LOGF_DISABLE_EOL: c_int = 8;

/// Per-message control block for `srt_sendmsg2`/`srt_recvmsg2`.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct SRT_MSGCTRL {
    /// Left for future
    pub flags: c_int,
    /// TTL for a message (millisec), default -1 (no TTL limitation)
    pub msgttl: c_int,
    /// Whether a message is allowed to supersede partially lost one. Unused in stream and live mode.
    pub inorder: c_int,
    /// 0:mid pkt, 1(01b):end of frame, 2(11b):complete frame, 3(10b): start of frame
    pub boundary: c_int,
    /// source time since epoch (usec), 0: use internal time (sender)
    pub srctime: i64,
    /// sequence number of the first packet in received message (unused for sending)
    pub pktseq: i32,
    /// message number (output value for both sending and receiving)
    pub msgno: i32,
    pub grpdata: *mut c_void,
    pub grpdata_size: usize,
}

/// Traffic statistics, layout of `libsrt` 1.5.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct SRT_TRACEBSTATS {
    // global measurements
    pub msTimeStamp: i64,
    pub pktSentTotal: i64,
    pub pktRecvTotal: i64,
    pub pktSndLossTotal: c_int,
    pub pktRcvLossTotal: c_int,
    pub pktRetransTotal: c_int,
    pub pktSentACKTotal: c_int,
    pub pktRecvACKTotal: c_int,
    pub pktSentNAKTotal: c_int,
    pub pktRecvNAKTotal: c_int,
    pub usSndDurationTotal: i64,
    pub pktSndDropTotal: c_int,
    pub pktRcvDropTotal: c_int,
    pub pktRcvUndecryptTotal: c_int,
    pub byteSentTotal: u64,
    pub byteRecvTotal: u64,
    pub byteRcvLossTotal: u64,
    pub byteRetransTotal: u64,
    pub byteSndDropTotal: u64,
    pub byteRcvDropTotal: u64,
    pub byteRcvUndecryptTotal: u64,

    // local measurements
    pub pktSent: i64,
    pub pktRecv: i64,
    pub pktSndLoss: c_int,
    pub pktRcvLoss: c_int,
    pub pktRetrans: c_int,
    pub pktRcvRetrans: c_int,
    pub pktSentACK: c_int,
    pub pktRecvACK: c_int,
    pub pktSentNAK: c_int,
    pub pktRecvNAK: c_int,
    pub mbpsSendRate: f64,
    pub mbpsRecvRate: f64,
    pub usSndDuration: i64,
    pub pktReorderDistance: c_int,
    pub pktRcvAvgBelatedTime: f64,
    pub pktRcvBelated: i64,
    pub pktSndDrop: c_int,
    pub pktRcvDrop: c_int,
    pub pktRcvUndecrypt: c_int,
    pub byteSent: u64,
    pub byteRecv: u64,
    pub byteRcvLoss: u64,
    pub byteRetrans: u64,
    pub byteSndDrop: u64,
    pub byteRcvDrop: u64,
    pub byteRcvUndecrypt: u64,

    // instant measurements
    pub usPktSndPeriod: f64,
    pub pktFlowWindow: c_int,
    pub pktCongestionWindow: c_int,
    pub pktFlightSize: c_int,
    pub msRTT: f64,
    pub mbpsBandwidth: f64,
    pub byteAvailSndBuf: c_int,
    pub byteAvailRcvBuf: c_int,
    pub mbpsMaxBW: f64,
    pub byteMSS: c_int,
    pub pktSndBuf: c_int,
    pub byteSndBuf: c_int,
    pub msSndBuf: c_int,
    pub msSndTsbPdDelay: c_int,
    pub pktRcvBuf: c_int,
    pub byteRcvBuf: c_int,
    pub msRcvBuf: c_int,
    pub msRcvTsbPdDelay: c_int,
    pub pktSndFilterExtraTotal: c_int,
    pub pktRcvFilterExtraTotal: c_int,
    pub pktRcvFilterSupplyTotal: c_int,
    pub pktRcvFilterLossTotal: c_int,
    pub pktSndFilterExtra: c_int,
    pub pktRcvFilterExtra: c_int,
    pub pktRcvFilterSupply: c_int,
    pub pktRcvFilterLoss: c_int,
    pub pktReorderTolerance: c_int,

    // 1.5.0
    pub pktSentUniqueTotal: i64,
    pub pktRecvUniqueTotal: i64,
    pub byteSentUniqueTotal: u64,
    pub byteRecvUniqueTotal: u64,
    pub pktSentUnique: i64,
    pub pktRecvUnique: i64,
    pub byteSentUnique: u64,
    pub byteRecvUnique: u64,
}

pub type srt_listen_callback_fn = unsafe extern "C" fn(
    opaque: *mut c_void,
    ns: SRTSOCKET,
    hs_version: c_int,
    peeraddr: *const sockaddr,
    streamid: *const c_char,
) -> c_int;

pub type SRT_LOG_HANDLER_FN = unsafe extern "C" fn(
    opaque: *mut c_void,
    level: c_int,
    file: *const c_char,
    line: c_int,
    area: *const c_char,
    message: *const c_char,
);

#[link(name = "srt")]
extern "C" {
    // Library lifecycle
    pub fn srt_startup() -> c_int;
    pub fn srt_cleanup() -> c_int;
    pub fn srt_getversion() -> u32;

    // Socket lifecycle
    pub fn srt_create_socket() -> SRTSOCKET;
    pub fn srt_close(u: SRTSOCKET) -> c_int;
    pub fn srt_bind(u: SRTSOCKET, name: *const sockaddr, namelen: c_int) -> c_int;
    pub fn srt_listen(u: SRTSOCKET, backlog: c_int) -> c_int;
    pub fn srt_accept(u: SRTSOCKET, addr: *mut sockaddr, addrlen: *mut c_int) -> SRTSOCKET;
    pub fn srt_connect(u: SRTSOCKET, name: *const sockaddr, namelen: c_int) -> c_int;
    pub fn srt_rendezvous(
        u: SRTSOCKET,
        local_name: *const sockaddr,
        local_namelen: c_int,
        remote_name: *const sockaddr,
        remote_namelen: c_int,
    ) -> c_int;
    pub fn srt_getsockstate(u: SRTSOCKET) -> SRT_SOCKSTATUS;
    pub fn srt_getpeername(u: SRTSOCKET, name: *mut sockaddr, namelen: *mut c_int) -> c_int;
    pub fn srt_getsockname(u: SRTSOCKET, name: *mut sockaddr, namelen: *mut c_int) -> c_int;

    // Options
    pub fn srt_getsockopt(
        u: SRTSOCKET,
        level: c_int,
        optname: SRT_SOCKOPT,
        optval: *mut c_void,
        optlen: *mut c_int,
    ) -> c_int;
    pub fn srt_setsockopt(
        u: SRTSOCKET,
        level: c_int,
        optname: SRT_SOCKOPT,
        optval: *const c_void,
        optlen: c_int,
    ) -> c_int;
    pub fn srt_getsockflag(
        u: SRTSOCKET,
        opt: SRT_SOCKOPT,
        optval: *mut c_void,
        optlen: *mut c_int,
    ) -> c_int;
    pub fn srt_setsockflag(
        u: SRTSOCKET,
        opt: SRT_SOCKOPT,
        optval: *const c_void,
        optlen: c_int,
    ) -> c_int;

    // Transmission
    pub fn srt_msgctrl_init(mctrl: *mut SRT_MSGCTRL);
    pub fn srt_sendmsg2(
        u: SRTSOCKET,
        buf: *const c_char,
        len: c_int,
        mctrl: *mut SRT_MSGCTRL,
    ) -> c_int;
    pub fn srt_recvmsg2(
        u: SRTSOCKET,
        buf: *mut c_char,
        len: c_int,
        mctrl: *mut SRT_MSGCTRL,
    ) -> c_int;

    // Statistics
    pub fn srt_bstats(u: SRTSOCKET, perf: *mut SRT_TRACEBSTATS, clear: c_int) -> c_int;
    pub fn srt_bistats(
        u: SRTSOCKET,
        perf: *mut SRT_TRACEBSTATS,
        clear: c_int,
        instantaneous: c_int,
    ) -> c_int;

    // Epoll
    pub fn srt_epoll_create() -> c_int;
    pub fn srt_epoll_add_usock(eid: c_int, u: SRTSOCKET, events: *const c_int) -> c_int;
    pub fn srt_epoll_remove_usock(eid: c_int, u: SRTSOCKET) -> c_int;
    pub fn srt_epoll_uwait(
        eid: c_int,
        fds_set: *mut SRT_EPOLL_EVENT,
        fds_size: c_int,
        ms_timeout: i64,
    ) -> c_int;
    pub fn srt_epoll_release(eid: c_int) -> c_int;

    // Errors
    pub fn srt_getlasterror(errno_loc: *mut c_int) -> c_int;
    pub fn srt_getlasterror_str() -> *const c_char;
    pub fn srt_clearlasterror();
    pub fn srt_strerror(code: c_int, errnoval: c_int) -> *const c_char;

    // Access control
    pub fn srt_listen_callback(
        lsn: SRTSOCKET,
        hook_fn: Option<srt_listen_callback_fn>,
        hook_opaque: *mut c_void,
    ) -> c_int;
    pub fn srt_setrejectreason(u: SRTSOCKET, value: c_int) -> c_int;
    pub fn srt_getrejectreason(u: SRTSOCKET) -> c_int;
    pub fn srt_rejectreason_str(id: c_int) -> *const c_char;

    // Logging
    pub fn srt_setloglevel(ll: c_int);
    pub fn srt_setlogflags(flags: c_int);
    pub fn srt_setloghandler(opaque: *mut c_void, handler: Option<SRT_LOG_HANDLER_FN>);
}
