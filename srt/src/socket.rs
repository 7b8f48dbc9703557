//! SRT socket handle
//!
//! One [`Socket`] type covers listener, caller and rendezvous sockets in both
//! blocking and non-blocking mode. Non-blocking sockets own two readiness
//! groups: the read group (`IN | ERR`) serves `accept` and reads, the write
//! group (`OUT | ERR`) serves `connect` and writes.

use crate::callback::{self, ConnectionRequest};
use crate::config::{Mode, SocketConfig};
use crate::epoll::{Events, Readiness, ReadinessGroup};
use crate::error::{last_error, Result, SrtError};
use crate::options::{self, OptionBinding, OptionValue};
use crate::reject::RejectReason;
use crate::stats::Stats;
use socket2::SockAddr;
use srt_io::{create_addr_inet, PollTimeout};
use srt_sys as sys;
use srt_sys::{SRTSOCKET, SRT_SOCKOPT, SRT_TRACEBSTATS};
use std::mem;
use std::net::SocketAddr;
use std::os::raw::c_int;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Longest value of a string option (`streamid`, `passphrase`, ...)
pub const MAX_STRING_OPTION_LEN: usize = 512;

/// Native socket status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocketState {
    Init,
    Opened,
    Listening,
    Connecting,
    Connected,
    Broken,
    Closing,
    Closed,
    NonExist,
    Unknown(i32),
}

impl SocketState {
    pub fn from_raw(raw: sys::SRT_SOCKSTATUS) -> Self {
        match raw {
            sys::SRTS_INIT => SocketState::Init,
            sys::SRTS_OPENED => SocketState::Opened,
            sys::SRTS_LISTENING => SocketState::Listening,
            sys::SRTS_CONNECTING => SocketState::Connecting,
            sys::SRTS_CONNECTED => SocketState::Connected,
            sys::SRTS_BROKEN => SocketState::Broken,
            sys::SRTS_CLOSING => SocketState::Closing,
            sys::SRTS_CLOSED => SocketState::Closed,
            sys::SRTS_NONEXIST => SocketState::NonExist,
            other => SocketState::Unknown(other),
        }
    }

    /// The connection can no longer carry data
    pub fn is_closed(&self) -> bool {
        matches!(
            self,
            SocketState::Broken | SocketState::Closing | SocketState::Closed | SocketState::NonExist
        )
    }
}

/// An SRT socket
#[derive(Debug)]
pub struct Socket {
    pub(crate) id: SRTSOCKET,
    blocking: bool,
    host: String,
    port: u16,
    config: SocketConfig,
    mode: Mode,
    packet_size: usize,
    poll_timeout: PollTimeout,
    pub(crate) read_group: Option<ReadinessGroup>,
    pub(crate) write_group: Option<ReadinessGroup>,
}

impl Socket {
    /// Create a socket for `host:port`.
    ///
    /// An empty host makes a listener on all interfaces unless `mode` says
    /// otherwise. The socket is non-blocking unless `blocking` is set.
    pub fn new(host: &str, port: u16, config: SocketConfig) -> Result<Self> {
        let id = unsafe { sys::srt_create_socket() };
        if id == sys::SRT_INVALID_SOCK {
            return Err(last_error(sys::SRT_INVALID_SOCK, "srt_create_socket"));
        }

        let blocking = config.blocking();
        let mode = config.mode(host);

        // Owned from here on, so every early return closes the native id.
        let mut socket = Socket {
            id,
            blocking,
            host: host.to_string(),
            port,
            mode,
            packet_size: config.packet_size(),
            poll_timeout: config.poll_timeout(),
            config,
            read_group: None,
            write_group: None,
        };

        socket.preconfigure()?;
        if !blocking {
            socket.create_groups()?;
        }

        debug!(
            "Created socket {} for {}:{} ({:?}, {})",
            id,
            socket.host,
            port,
            mode,
            if blocking { "blocking" } else { "non-blocking" }
        );
        Ok(socket)
    }

    fn from_accepted(listener: &Socket, id: SRTSOCKET) -> Result<Self> {
        let mut socket = Socket {
            id,
            blocking: listener.blocking,
            host: listener.host.clone(),
            port: listener.port,
            config: listener.config.clone(),
            mode: listener.mode,
            packet_size: listener.packet_size,
            poll_timeout: listener.poll_timeout,
            read_group: None,
            write_group: None,
        };

        socket.postconfigure();
        if !socket.blocking {
            socket.create_groups()?;
        }
        Ok(socket)
    }

    fn create_groups(&mut self) -> Result<()> {
        self.read_group = Some(ReadinessGroup::for_socket(self.id, Events::IN | Events::ERR)?);
        self.write_group = Some(ReadinessGroup::for_socket(self.id, Events::OUT | Events::ERR)?);
        Ok(())
    }

    /// Options that must be in place before bind/connect.
    fn preconfigure(&mut self) -> Result<()> {
        for key in self.config.unknown_keys() {
            warn!("Ignoring unknown option {} on socket {}", key, self.id);
        }

        self.set_sock_opt_bool(sys::SRTO_RCVSYN, self.blocking)?;

        if let Some(seconds) = self.config.linger() {
            if let Err(e) = options::set_linger(self.id, seconds) {
                warn!("Error setting linger on socket {}: {}", self.id, e);
            }
        }

        if self.mode == Mode::Rendezvous {
            self.set_sock_opt_bool(sys::SRTO_RENDEZVOUS, true)?;
        }

        options::apply(self.id, OptionBinding::Pre, &self.config);
        Ok(())
    }

    /// Options applied once a connection exists. Failures are only logged.
    fn postconfigure(&self) {
        for (code, name) in [(sys::SRTO_SNDSYN, "SRTO_SNDSYN"), (sys::SRTO_RCVSYN, "SRTO_RCVSYN")] {
            if let Err(e) = self.set_sock_opt_bool(code, self.blocking) {
                warn!("Error setting {} on socket {}: {}", name, self.id, e);
            }
        }
        options::apply(self.id, OptionBinding::Post, &self.config);
    }

    pub(crate) fn ensure_open(&self) -> Result<()> {
        if self.id == sys::SRT_INVALID_SOCK {
            Err(SrtError::InvalidSocket)
        } else {
            Ok(())
        }
    }

    /// Bind to `host:port` and start listening.
    ///
    /// The native socket is closed if either step fails.
    pub fn listen(&mut self, backlog: i32) -> Result<()> {
        self.ensure_open()?;
        let addr = create_addr_inet(&self.host, self.port)?;

        if unsafe { sys::srt_bind(self.id, addr.as_ptr(), addr.len() as c_int) } == sys::SRT_ERROR {
            return Err(self.fail("srt_bind"));
        }
        if unsafe { sys::srt_listen(self.id, backlog) } == sys::SRT_ERROR {
            return Err(self.fail("srt_listen"));
        }

        self.postconfigure();
        info!("Socket {} listening on {}:{}", self.id, self.host, self.port);
        Ok(())
    }

    /// Accept one pending connection.
    ///
    /// Non-blocking listeners wait up to the poll timeout for a caller.
    pub fn accept(&self) -> Result<(Socket, SocketAddr)> {
        self.ensure_open()?;

        if let Some(group) = &self.read_group {
            if group.wait(self.poll_timeout)? == Readiness::TimedOut {
                return Err(SrtError::EpollTimeout);
            }
        }

        let (id, native_addr) = unsafe {
            SockAddr::try_init(|storage, len| {
                Ok(sys::srt_accept(self.id, storage.cast(), len.cast()))
            })
        }?;
        if id == sys::SRT_INVALID_SOCK {
            return Err(last_error(self.id, "srt_accept"));
        }

        let accepted = Socket::from_accepted(self, id)?;
        let peer = match native_addr.as_socket() {
            Some(addr) => addr,
            None => accepted.peer_addr()?,
        };

        debug!("Socket {} accepted {} from {}", self.id, id, peer);
        Ok((accepted, peer))
    }

    /// Connect to `host:port` as caller, or rendezvous from `adapter:localport`.
    ///
    /// The native socket is closed if the connection cannot be made.
    pub fn connect(&mut self) -> Result<()> {
        self.ensure_open()?;
        let remote = create_addr_inet(&self.host, self.port)?;

        let (res, context) = if self.mode == Mode::Rendezvous {
            let local = create_addr_inet(
                self.config.adapter().unwrap_or(""),
                self.config.local_port().unwrap_or(self.port),
            )?;
            let res = unsafe {
                sys::srt_rendezvous(
                    self.id,
                    local.as_ptr(),
                    local.len() as c_int,
                    remote.as_ptr(),
                    remote.len() as c_int,
                )
            };
            (res, "srt_rendezvous")
        } else {
            let res = unsafe { sys::srt_connect(self.id, remote.as_ptr(), remote.len() as c_int) };
            (res, "srt_connect")
        };
        if res == sys::SRT_ERROR {
            return Err(self.fail(context));
        }

        if let Some(group) = &self.write_group {
            let ready = match group.wait(self.poll_timeout) {
                Ok(ready) => ready,
                Err(e) => {
                    self.close_quietly();
                    return Err(e);
                }
            };
            let state = self.state();
            if ready == Readiness::TimedOut || state != SocketState::Connected {
                let err = self.classify_connect_failure(ready, state);
                self.close_quietly();
                return Err(err);
            }
        }

        self.postconfigure();
        info!("Socket {} connected to {}:{}", self.id, self.host, self.port);
        Ok(())
    }

    fn classify_connect_failure(&self, ready: Readiness, state: SocketState) -> SrtError {
        if ready == Readiness::TimedOut {
            return SrtError::ConnectTimeout;
        }
        match unsafe { sys::srt_getrejectreason(self.id) } {
            sys::SRT_REJ_TIMEOUT => SrtError::ConnectTimeout,
            sys::SRT_REJ_UNKNOWN => SrtError::ConnectionFailed(state),
            code => SrtError::ConnectionRejected(RejectReason::from_code(code)),
        }
    }

    /// Collect the native error for `context`, then close the socket.
    fn fail(&mut self, context: &'static str) -> SrtError {
        let err = last_error(self.id, context);
        self.close_quietly();
        err
    }

    fn close_quietly(&mut self) {
        if let Err(e) = self.close() {
            warn!("Error closing socket: {}", e);
        }
    }

    /// Close the socket. Later calls are no-ops.
    pub fn close(&mut self) -> Result<()> {
        if self.id == sys::SRT_INVALID_SOCK {
            return Ok(());
        }
        let id = mem::replace(&mut self.id, sys::SRT_INVALID_SOCK);

        callback::unregister(id);
        self.read_group = None;
        self.write_group = None;

        if unsafe { sys::srt_close(id) } == sys::SRT_ERROR {
            return Err(last_error(sys::SRT_INVALID_SOCK, "srt_close"));
        }
        debug!("Closed socket {}", id);
        Ok(())
    }

    pub fn id(&self) -> SRTSOCKET {
        self.id
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_blocking(&self) -> bool {
        self.blocking
    }

    /// Preferred read/write unit, from `pktsize`
    pub fn packet_size(&self) -> usize {
        self.packet_size
    }

    /// Largest message a single write can carry.
    ///
    /// `packet_size`, capped by the native payload size when one is set
    /// (live mode caps messages at 1316 bytes by default).
    pub fn max_message_size(&self) -> Result<usize> {
        let payload = self.get_sock_opt_int(sys::SRTO_PAYLOADSIZE)?;
        Ok(match usize::try_from(payload) {
            Ok(payload) if payload > 0 => payload.min(self.packet_size),
            _ => self.packet_size,
        })
    }

    pub fn poll_timeout(&self) -> PollTimeout {
        self.poll_timeout
    }

    /// Bound for readiness waits in accept, connect, read and write
    pub fn set_poll_timeout(&mut self, timeout: impl Into<PollTimeout>) {
        self.poll_timeout = timeout.into();
    }

    pub fn config(&self) -> &SocketConfig {
        &self.config
    }

    pub fn state(&self) -> SocketState {
        SocketState::from_raw(unsafe { sys::srt_getsockstate(self.id) })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.query_addr(sys::srt_getsockname, "srt_getsockname")
    }

    pub fn peer_addr(&self) -> Result<SocketAddr> {
        self.query_addr(sys::srt_getpeername, "srt_getpeername")
    }

    fn query_addr(
        &self,
        query: unsafe extern "C" fn(SRTSOCKET, *mut libc::sockaddr, *mut c_int) -> c_int,
        context: &'static str,
    ) -> Result<SocketAddr> {
        self.ensure_open()?;
        let (res, addr) = unsafe {
            SockAddr::try_init(|storage, len| Ok(query(self.id, storage.cast(), len.cast())))
        }?;
        if res == sys::SRT_ERROR {
            return Err(last_error(self.id, context));
        }
        addr.as_socket()
            .ok_or_else(|| SrtError::InvalidArgument(format!("{} returned a non-IP address", context)))
    }

    pub fn get_sock_opt_byte(&self, opt: SRT_SOCKOPT) -> Result<u8> {
        let mut buf = [0u8; 8];
        self.ensure_open()?;
        options::get_raw(self.id, opt, &mut buf)?;
        Ok(buf[0])
    }

    pub fn set_sock_opt_byte(&self, opt: SRT_SOCKOPT, value: u8) -> Result<()> {
        self.ensure_open()?;
        options::set_raw(self.id, opt, &[value])
    }

    /// Read a boolean option; the library reports these as 1 or 4 bytes.
    pub fn get_sock_opt_bool(&self, opt: SRT_SOCKOPT) -> Result<bool> {
        let mut buf = [0u8; 8];
        self.ensure_open()?;
        match options::get_raw(self.id, opt, &mut buf)? {
            1 => Ok(buf[0] != 0),
            _ => Ok(c_int::from_ne_bytes([buf[0], buf[1], buf[2], buf[3]]) != 0),
        }
    }

    pub fn set_sock_opt_bool(&self, opt: SRT_SOCKOPT, value: bool) -> Result<()> {
        self.ensure_open()?;
        OptionValue::Bool(value).apply_to(self.id, opt)
    }

    pub fn get_sock_opt_int(&self, opt: SRT_SOCKOPT) -> Result<i32> {
        let mut buf = [0u8; 4];
        self.ensure_open()?;
        options::get_raw(self.id, opt, &mut buf)?;
        Ok(i32::from_ne_bytes(buf))
    }

    pub fn set_sock_opt_int(&self, opt: SRT_SOCKOPT, value: i32) -> Result<()> {
        self.ensure_open()?;
        OptionValue::Int32(value).apply_to(self.id, opt)
    }

    pub fn get_sock_opt_int64(&self, opt: SRT_SOCKOPT) -> Result<i64> {
        let mut buf = [0u8; 8];
        self.ensure_open()?;
        options::get_raw(self.id, opt, &mut buf)?;
        Ok(i64::from_ne_bytes(buf))
    }

    pub fn set_sock_opt_int64(&self, opt: SRT_SOCKOPT, value: i64) -> Result<()> {
        self.ensure_open()?;
        OptionValue::Int64(value).apply_to(self.id, opt)
    }

    pub fn get_sock_opt_string(&self, opt: SRT_SOCKOPT) -> Result<String> {
        // Room for the terminating NUL the library writes after the value.
        let mut buf = [0u8; MAX_STRING_OPTION_LEN + 1];
        self.ensure_open()?;
        let len = options::get_raw(self.id, opt, &mut buf)?;
        let text = &buf[..len];
        let end = text.iter().position(|&b| b == 0).unwrap_or(text.len());
        Ok(String::from_utf8_lossy(&text[..end]).into_owned())
    }

    pub fn set_sock_opt_string(&self, opt: SRT_SOCKOPT, value: &str) -> Result<()> {
        self.ensure_open()?;
        OptionValue::String(value.to_string()).apply_to(self.id, opt)
    }

    /// Transfer statistics; `clear` resets the interval counters.
    pub fn stats(&self, clear: bool) -> Result<Stats> {
        self.read_stats(clear, false)
    }

    /// Like [`Socket::stats`], with buffer and RTT figures sampled instantly
    /// instead of averaged.
    pub fn instant_stats(&self, clear: bool) -> Result<Stats> {
        self.read_stats(clear, true)
    }

    fn read_stats(&self, clear: bool, instantaneous: bool) -> Result<Stats> {
        self.ensure_open()?;
        let mut native = SRT_TRACEBSTATS::default();
        let res = unsafe {
            sys::srt_bistats(self.id, &mut native, c_int::from(clear), c_int::from(instantaneous))
        };
        if res == sys::SRT_ERROR {
            return Err(last_error(self.id, "srt_bistats"));
        }
        Ok(Stats::from(&native))
    }

    /// Decide on every incoming connection before it is accepted.
    ///
    /// The callback returns `true` to accept. It runs on a library thread
    /// and must not block; a panic rejects the connection.
    pub fn set_listen_callback<F>(&self, callback: F) -> Result<()>
    where
        F: Fn(&ConnectionRequest<'_>) -> bool + Send + Sync + 'static,
    {
        self.ensure_open()?;
        callback::register(self.id, Arc::new(callback))
    }

    pub fn set_reject_reason(&self, reason: RejectReason) -> Result<()> {
        self.ensure_open()?;
        if unsafe { sys::srt_setrejectreason(self.id, reason.code()) } == sys::SRT_ERROR {
            return Err(last_error(self.id, "srt_setrejectreason"));
        }
        Ok(())
    }

    /// Why the last connection attempt on this socket was rejected
    pub fn reject_reason(&self) -> RejectReason {
        RejectReason::from_code(unsafe { sys::srt_getrejectreason(self.id) })
    }
}

impl Drop for Socket {
    fn drop(&mut self) {
        self.close_quietly();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_from_raw() {
        assert_eq!(SocketState::from_raw(sys::SRTS_CONNECTED), SocketState::Connected);
        assert_eq!(SocketState::from_raw(sys::SRTS_LISTENING), SocketState::Listening);
        assert_eq!(SocketState::from_raw(42), SocketState::Unknown(42));
    }

    #[test]
    fn test_close_releases_groups_once() {
        crate::startup().unwrap();
        let mut socket = Socket::new("127.0.0.1", 9000, SocketConfig::new()).unwrap();
        let eids = [
            socket.read_group.as_ref().unwrap().id(),
            socket.write_group.as_ref().unwrap().id(),
        ];
        assert_ne!(eids[0], eids[1]);

        socket.close().unwrap();
        assert!(socket.read_group.is_none());
        assert!(socket.write_group.is_none());

        for eid in eids {
            assert_eq!(unsafe { sys::srt_epoll_release(eid) }, sys::SRT_ERROR);
            let mut sys_errno = 0;
            assert_eq!(unsafe { sys::srt_getlasterror(&mut sys_errno) }, sys::SRT_EINVPOLLID);
            unsafe { sys::srt_clearlasterror() };
        }

        socket.close().unwrap();
        drop(socket);
    }

    #[test]
    fn test_failed_connect_wait_closes_socket() {
        crate::startup().unwrap();
        let config = SocketConfig::new().set("mode", "caller");
        let mut socket = Socket::new("127.0.0.1", 9, config).unwrap();

        // Pull the epoll id out from under the write group so the wait errors.
        let eid = socket.write_group.as_ref().unwrap().id();
        assert_ne!(unsafe { sys::srt_epoll_release(eid) }, sys::SRT_ERROR);

        let err = socket.connect().unwrap_err();
        assert!(!err.is_timeout(), "unexpected error {:?}", err);
        assert_eq!(socket.id(), sys::SRT_INVALID_SOCK);
        assert!(socket.write_group.is_none());
    }

    #[test]
    fn test_blocking_socket_has_no_groups() {
        crate::startup().unwrap();
        let socket = Socket::new("127.0.0.1", 9000, SocketConfig::new().set("blocking", "1")).unwrap();
        assert!(socket.read_group.is_none());
        assert!(socket.write_group.is_none());
    }

    #[test]
    fn test_closed_states() {
        assert!(SocketState::Broken.is_closed());
        assert!(SocketState::NonExist.is_closed());
        assert!(!SocketState::Connected.is_closed());
        assert!(!SocketState::Connecting.is_closed());
    }
}
