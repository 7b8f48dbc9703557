//! Native error mapping
//!
//! Every failing native call leaves a thread-local error code (and possibly a
//! system `errno`) behind. [`last_error`] collects and clears it, mapping the
//! codes callers commonly branch on to dedicated [`SrtError`] variants.

use crate::reject::RejectReason;
use crate::socket::SocketState;
use srt_io::AddrError;
use srt_sys as sys;
use srt_sys::SRTSOCKET;
use std::ffi::CStr;
use std::fmt;
use std::io;
use std::os::raw::{c_char, c_int};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SrtError>;

/// Native library error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SrtErrno {
    Unknown,
    Success,
    ConnSetup,
    NoServer,
    ConnRejected,
    SockFail,
    SecFail,
    SocketClosed,
    ConnFail,
    ConnLost,
    NoConn,
    Resource,
    Thread,
    NoBuf,
    SysObj,
    File,
    InvRdOff,
    RdPerm,
    InvWrOff,
    WrPerm,
    InvOp,
    BoundSock,
    ConnSock,
    InvParam,
    InvSock,
    UnboundSock,
    NoListen,
    RdvNoServ,
    RdvUnbound,
    InvalMsgApi,
    InvalBufferApi,
    DupListen,
    LargeMsg,
    InvPollId,
    PollEmpty,
    BindConflict,
    AsyncFail,
    AsyncSnd,
    AsyncRcv,
    Timeout,
    Congest,
    PeerErr,
    Other(c_int),
}

impl SrtErrno {
    pub fn from_raw(code: c_int) -> Self {
        use SrtErrno::*;
        match code {
            sys::SRT_EUNKNOWN => Unknown,
            sys::SRT_SUCCESS => Success,
            sys::SRT_ECONNSETUP => ConnSetup,
            sys::SRT_ENOSERVER => NoServer,
            sys::SRT_ECONNREJ => ConnRejected,
            sys::SRT_ESOCKFAIL => SockFail,
            sys::SRT_ESECFAIL => SecFail,
            sys::SRT_ESCLOSED => SocketClosed,
            sys::SRT_ECONNFAIL => ConnFail,
            sys::SRT_ECONNLOST => ConnLost,
            sys::SRT_ENOCONN => NoConn,
            sys::SRT_ERESOURCE => Resource,
            sys::SRT_ETHREAD => Thread,
            sys::SRT_ENOBUF => NoBuf,
            sys::SRT_ESYSOBJ => SysObj,
            sys::SRT_EFILE => File,
            sys::SRT_EINVRDOFF => InvRdOff,
            sys::SRT_ERDPERM => RdPerm,
            sys::SRT_EINVWROFF => InvWrOff,
            sys::SRT_EWRPERM => WrPerm,
            sys::SRT_EINVOP => InvOp,
            sys::SRT_EBOUNDSOCK => BoundSock,
            sys::SRT_ECONNSOCK => ConnSock,
            sys::SRT_EINVPARAM => InvParam,
            sys::SRT_EINVSOCK => InvSock,
            sys::SRT_EUNBOUNDSOCK => UnboundSock,
            sys::SRT_ENOLISTEN => NoListen,
            sys::SRT_ERDVNOSERV => RdvNoServ,
            sys::SRT_ERDVUNBOUND => RdvUnbound,
            sys::SRT_EINVALMSGAPI => InvalMsgApi,
            sys::SRT_EINVALBUFFERAPI => InvalBufferApi,
            sys::SRT_EDUPLISTEN => DupListen,
            sys::SRT_ELARGEMSG => LargeMsg,
            sys::SRT_EINVPOLLID => InvPollId,
            sys::SRT_EPOLLEMPTY => PollEmpty,
            sys::SRT_EBINDCONFLICT => BindConflict,
            sys::SRT_EASYNCFAIL => AsyncFail,
            sys::SRT_EASYNCSND => AsyncSnd,
            sys::SRT_EASYNCRCV => AsyncRcv,
            sys::SRT_ETIMEOUT => Timeout,
            sys::SRT_ECONGEST => Congest,
            sys::SRT_EPEERERR => PeerErr,
            other => Other(other),
        }
    }

    pub fn as_raw(&self) -> c_int {
        use SrtErrno::*;
        match *self {
            Unknown => sys::SRT_EUNKNOWN,
            Success => sys::SRT_SUCCESS,
            ConnSetup => sys::SRT_ECONNSETUP,
            NoServer => sys::SRT_ENOSERVER,
            ConnRejected => sys::SRT_ECONNREJ,
            SockFail => sys::SRT_ESOCKFAIL,
            SecFail => sys::SRT_ESECFAIL,
            SocketClosed => sys::SRT_ESCLOSED,
            ConnFail => sys::SRT_ECONNFAIL,
            ConnLost => sys::SRT_ECONNLOST,
            NoConn => sys::SRT_ENOCONN,
            Resource => sys::SRT_ERESOURCE,
            Thread => sys::SRT_ETHREAD,
            NoBuf => sys::SRT_ENOBUF,
            SysObj => sys::SRT_ESYSOBJ,
            File => sys::SRT_EFILE,
            InvRdOff => sys::SRT_EINVRDOFF,
            RdPerm => sys::SRT_ERDPERM,
            InvWrOff => sys::SRT_EINVWROFF,
            WrPerm => sys::SRT_EWRPERM,
            InvOp => sys::SRT_EINVOP,
            BoundSock => sys::SRT_EBOUNDSOCK,
            ConnSock => sys::SRT_ECONNSOCK,
            InvParam => sys::SRT_EINVPARAM,
            InvSock => sys::SRT_EINVSOCK,
            UnboundSock => sys::SRT_EUNBOUNDSOCK,
            NoListen => sys::SRT_ENOLISTEN,
            RdvNoServ => sys::SRT_ERDVNOSERV,
            RdvUnbound => sys::SRT_ERDVUNBOUND,
            InvalMsgApi => sys::SRT_EINVALMSGAPI,
            InvalBufferApi => sys::SRT_EINVALBUFFERAPI,
            DupListen => sys::SRT_EDUPLISTEN,
            LargeMsg => sys::SRT_ELARGEMSG,
            InvPollId => sys::SRT_EINVPOLLID,
            PollEmpty => sys::SRT_EPOLLEMPTY,
            BindConflict => sys::SRT_EBINDCONFLICT,
            AsyncFail => sys::SRT_EASYNCFAIL,
            AsyncSnd => sys::SRT_EASYNCSND,
            AsyncRcv => sys::SRT_EASYNCRCV,
            Timeout => sys::SRT_ETIMEOUT,
            Congest => sys::SRT_ECONGEST,
            PeerErr => sys::SRT_EPEERERR,
            Other(code) => code,
        }
    }

    /// The native library's own description of this code
    pub fn description(&self) -> String {
        unsafe { cstr_lossy(sys::srt_strerror(self.as_raw(), 0)) }
    }
}

impl fmt::Display for SrtErrno {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} ({})", self, self.as_raw())
    }
}

/// SRT binding errors
#[derive(Error, Debug)]
pub enum SrtError {
    #[error("socket does not refer to a valid SRT socket")]
    InvalidSocket,

    #[error("socket is in rendezvous mode but was not bound")]
    RendezvousUnbound,

    #[error("socket is already connected")]
    AlreadyConnected,

    #[error("connection rejected: {0}")]
    ConnectionRejected(RejectReason),

    #[error("connection timed out")]
    ConnectTimeout,

    #[error("socket was closed while the call was blocking")]
    SocketClosed,

    #[error("timed out waiting for socket readiness")]
    EpollTimeout,

    #[error("connection failed, socket state {0:?}")]
    ConnectionFailed(SocketState),

    #[error("{context}: {message} [{errno}]")]
    Native {
        context: &'static str,
        errno: SrtErrno,
        message: String,
        #[source]
        source: Option<io::Error>,
    },

    #[error("address error: {0}")]
    Address(#[from] AddrError),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl SrtError {
    /// Map a native error code (plus system `errno`, 0 if none) to an error.
    pub fn from_native(context: &'static str, code: c_int, sys_errno: c_int, message: String) -> Self {
        match SrtErrno::from_raw(code) {
            SrtErrno::InvSock => SrtError::InvalidSocket,
            SrtErrno::RdvUnbound => SrtError::RendezvousUnbound,
            SrtErrno::ConnSock => SrtError::AlreadyConnected,
            SrtErrno::ConnRejected => {
                SrtError::ConnectionRejected(RejectReason::Other(sys::SRT_REJ_UNKNOWN))
            }
            SrtErrno::NoServer => SrtError::ConnectTimeout,
            SrtErrno::SocketClosed => SrtError::SocketClosed,
            SrtErrno::Timeout => SrtError::EpollTimeout,
            errno => SrtError::Native {
                context,
                errno,
                message,
                source: (sys_errno > 0).then(|| io::Error::from_raw_os_error(sys_errno)),
            },
        }
    }

    /// The native error code behind this error, if there is one
    pub fn errno(&self) -> Option<SrtErrno> {
        match self {
            SrtError::InvalidSocket => Some(SrtErrno::InvSock),
            SrtError::RendezvousUnbound => Some(SrtErrno::RdvUnbound),
            SrtError::AlreadyConnected => Some(SrtErrno::ConnSock),
            SrtError::ConnectionRejected(_) => Some(SrtErrno::ConnRejected),
            SrtError::ConnectTimeout => Some(SrtErrno::NoServer),
            SrtError::SocketClosed => Some(SrtErrno::SocketClosed),
            SrtError::EpollTimeout => Some(SrtErrno::Timeout),
            SrtError::Native { errno, .. } => Some(*errno),
            _ => None,
        }
    }

    /// True for the transient "try again later" conditions
    pub fn is_timeout(&self) -> bool {
        matches!(self, SrtError::EpollTimeout | SrtError::ConnectTimeout)
    }

    /// True when the native call would have blocked a non-blocking socket
    pub fn would_block(&self) -> bool {
        matches!(
            self.errno(),
            Some(SrtErrno::AsyncRcv) | Some(SrtErrno::AsyncSnd) | Some(SrtErrno::AsyncFail)
        )
    }
}

impl From<SrtError> for io::Error {
    fn from(err: SrtError) -> Self {
        let kind = match &err {
            SrtError::EpollTimeout | SrtError::ConnectTimeout => io::ErrorKind::TimedOut,
            SrtError::SocketClosed => io::ErrorKind::ConnectionAborted,
            SrtError::ConnectionRejected(_) => io::ErrorKind::ConnectionRefused,
            SrtError::InvalidSocket => io::ErrorKind::NotConnected,
            SrtError::InvalidArgument(_) => io::ErrorKind::InvalidInput,
            SrtError::Io(e) => e.kind(),
            e if e.would_block() => io::ErrorKind::WouldBlock,
            SrtError::Native {
                errno: SrtErrno::ConnLost,
                ..
            } => io::ErrorKind::ConnectionReset,
            _ => io::ErrorKind::Other,
        };
        io::Error::new(kind, err)
    }
}

/// Collect and clear the calling thread's native error.
///
/// `socket` is consulted for the rejection reason when the failure was a
/// rejected connection; pass `SRT_INVALID_SOCK` when there is no socket.
pub(crate) fn last_error(socket: SRTSOCKET, context: &'static str) -> SrtError {
    let mut sys_errno: c_int = 0;
    let code = unsafe { sys::srt_getlasterror(&mut sys_errno) };
    let message = unsafe { cstr_lossy(sys::srt_getlasterror_str()) };
    unsafe { sys::srt_clearlasterror() };

    match SrtError::from_native(context, code, sys_errno, message) {
        SrtError::ConnectionRejected(_) if socket != sys::SRT_INVALID_SOCK => {
            let reason = unsafe { sys::srt_getrejectreason(socket) };
            SrtError::ConnectionRejected(RejectReason::from_code(reason))
        }
        err => err,
    }
}

/// Copy a possibly-null C string owned by the native library.
pub(crate) unsafe fn cstr_lossy(ptr: *const c_char) -> String {
    if ptr.is_null() {
        String::new()
    } else {
        CStr::from_ptr(ptr).to_string_lossy().into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_errno_raw_codes() {
        for code in [1000, 1002, 2001, 5004, 5008, 6002, 6003, 7000] {
            assert_eq!(SrtErrno::from_raw(code).as_raw(), code);
        }
        assert_eq!(SrtErrno::from_raw(4242), SrtErrno::Other(4242));
    }

    #[test]
    fn test_distinguished_errors() {
        let err = |code| SrtError::from_native("test", code, 0, String::new());

        assert!(matches!(err(sys::SRT_EINVSOCK), SrtError::InvalidSocket));
        assert!(matches!(err(sys::SRT_ERDVUNBOUND), SrtError::RendezvousUnbound));
        assert!(matches!(err(sys::SRT_ECONNSOCK), SrtError::AlreadyConnected));
        assert!(matches!(err(sys::SRT_ECONNREJ), SrtError::ConnectionRejected(_)));
        assert!(matches!(err(sys::SRT_ENOSERVER), SrtError::ConnectTimeout));
        assert!(matches!(err(sys::SRT_ESCLOSED), SrtError::SocketClosed));
        assert!(matches!(err(sys::SRT_ETIMEOUT), SrtError::EpollTimeout));
    }

    #[test]
    fn test_native_error_keeps_system_error() {
        let err = SrtError::from_native("srt_bind", sys::SRT_ESOCKFAIL, libc::EADDRINUSE, "bind".into());

        match &err {
            SrtError::Native { errno, source, .. } => {
                assert_eq!(*errno, SrtErrno::SockFail);
                assert_eq!(source.as_ref().and_then(|e| e.raw_os_error()), Some(libc::EADDRINUSE));
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_would_block() {
        let err = SrtError::from_native("srt_recvmsg2", sys::SRT_EASYNCRCV, 0, String::new());
        assert!(err.would_block());
        assert!(!err.is_timeout());
        assert_eq!(io::Error::from(err).kind(), io::ErrorKind::WouldBlock);

        assert!(SrtError::EpollTimeout.is_timeout());
        assert_eq!(io::Error::from(SrtError::EpollTimeout).kind(), io::ErrorKind::TimedOut);
    }
}
