//! Listen callbacks
//!
//! The native library calls back into us from its own receiver thread for
//! every incoming handshake on a listener. Callbacks live in a process-wide
//! registry keyed by listener id; the id travels through the native opaque
//! pointer, so no Rust pointer ever crosses the boundary.

use crate::error::{cstr_lossy, last_error, Result, SrtError};
use crate::options::{self, OptionValue};
use crate::reject::RejectReason;
use parking_lot::Mutex;
use srt_sys as sys;
use srt_sys::SRTSOCKET;
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::os::raw::{c_char, c_int, c_void};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, error};

/// Decides whether an incoming connection is accepted
pub type ListenCallback = dyn Fn(&ConnectionRequest<'_>) -> bool + Send + Sync + 'static;

static REGISTRY: Mutex<BTreeMap<SRTSOCKET, Arc<ListenCallback>>> =
    parking_lot::const_mutex(BTreeMap::new());

/// An incoming connection awaiting a listen callback's verdict.
///
/// The candidate socket exists but is not yet accepted; options set on it
/// here (a per-stream passphrase, say) apply to the connection being made.
#[derive(Debug)]
pub struct ConnectionRequest<'a> {
    socket: SRTSOCKET,
    hs_version: c_int,
    peer: Option<SocketAddr>,
    stream_id: &'a str,
}

impl<'a> ConnectionRequest<'a> {
    pub fn socket_id(&self) -> SRTSOCKET {
        self.socket
    }

    pub fn handshake_version(&self) -> i32 {
        self.hs_version
    }

    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.peer
    }

    /// Stream id sent by the caller, empty if none
    pub fn stream_id(&self) -> &'a str {
        self.stream_id
    }

    /// Reason reported to the caller if this request is rejected
    pub fn set_reject_reason(&self, reason: RejectReason) -> Result<()> {
        if unsafe { sys::srt_setrejectreason(self.socket, reason.code()) } == sys::SRT_ERROR {
            return Err(last_error(self.socket, "srt_setrejectreason"));
        }
        Ok(())
    }

    /// Set a named option on the candidate socket
    pub fn set_option(&self, name: &str, value: &str) -> Result<()> {
        let option = options::find(name)
            .ok_or_else(|| SrtError::InvalidArgument(format!("unknown option '{}'", name)))?;
        OptionValue::parse(option.kind, value)?.apply_to(self.socket, option.code)
    }
}

/// Install `callback` on `listener`, replacing any previous one.
pub(crate) fn register(listener: SRTSOCKET, callback: Arc<ListenCallback>) -> Result<()> {
    let previous = {
        let mut registry = REGISTRY.lock();
        let res = unsafe {
            sys::srt_listen_callback(listener, Some(trampoline), listener as isize as *mut c_void)
        };
        if res == sys::SRT_ERROR {
            return Err(last_error(listener, "srt_listen_callback"));
        }
        registry.insert(listener, callback)
    };

    // Dropped outside the lock; the old closure may own arbitrary state.
    drop(previous);
    debug!("Registered listen callback on socket {}", listener);
    Ok(())
}

pub(crate) fn unregister(listener: SRTSOCKET) {
    let removed = REGISTRY.lock().remove(&listener);
    if removed.is_some() {
        debug!("Removed listen callback from socket {}", listener);
    }
}

#[cfg(test)]
pub(crate) fn is_registered(listener: SRTSOCKET) -> bool {
    REGISTRY.lock().contains_key(&listener)
}

unsafe extern "C" fn trampoline(
    opaque: *mut c_void,
    ns: SRTSOCKET,
    hs_version: c_int,
    peeraddr: *const libc::sockaddr,
    streamid: *const c_char,
) -> c_int {
    let listener = opaque as isize as SRTSOCKET;

    // Never hold the lock while user code runs.
    let callback = REGISTRY.lock().get(&listener).cloned();
    let Some(callback) = callback else {
        return 0;
    };

    let stream_id = cstr_lossy(streamid);
    let request = ConnectionRequest {
        socket: ns,
        hs_version,
        peer: srt_io::from_raw(peeraddr),
        stream_id: &stream_id,
    };

    match panic::catch_unwind(AssertUnwindSafe(|| callback(&request))) {
        Ok(true) => 0,
        Ok(false) => {
            debug!("Listen callback on {} rejected socket {}", listener, ns);
            -1
        }
        Err(_) => {
            error!("Listen callback on {} panicked, rejecting socket {}", listener, ns);
            -1
        }
    }
}
