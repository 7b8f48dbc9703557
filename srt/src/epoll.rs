//! Readiness groups (native SRT epoll)
//!
//! A [`ReadinessGroup`] owns one native epoll id subscribed to a single
//! socket. Non-blocking sockets wait on these before retrying a native call
//! that reported it would block. The id is released when the group drops.

use crate::error::{last_error, Result, SrtError};
use srt_io::PollTimeout;
use srt_sys as sys;
use srt_sys::{SRTSOCKET, SRT_EPOLL_EVENT};
use std::ops::BitOr;
use std::os::raw::c_int;
use tracing::{debug, warn};

/// Epoll event mask
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Events(c_int);

impl Events {
    pub const IN: Events = Events(sys::SRT_EPOLL_IN);
    pub const OUT: Events = Events(sys::SRT_EPOLL_OUT);
    pub const ERR: Events = Events(sys::SRT_EPOLL_ERR);

    pub fn from_bits(bits: c_int) -> Self {
        Events(bits)
    }

    pub fn bits(&self) -> c_int {
        self.0
    }

    pub fn contains(&self, other: Events) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for Events {
    type Output = Events;

    fn bitor(self, rhs: Events) -> Events {
        Events(self.0 | rhs.0)
    }
}

/// Outcome of a readiness wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    Ready(Events),
    TimedOut,
}

/// One native epoll id watching one socket
#[derive(Debug)]
pub struct ReadinessGroup {
    eid: c_int,
    events: Events,
}

impl ReadinessGroup {
    /// Create a group and subscribe `socket` to `events`
    pub fn for_socket(socket: SRTSOCKET, events: Events) -> Result<Self> {
        let eid = unsafe { sys::srt_epoll_create() };
        if eid < 0 {
            return Err(last_error(sys::SRT_INVALID_SOCK, "srt_epoll_create"));
        }

        // Owned from here on, so a failed subscription still releases the id.
        let group = ReadinessGroup { eid, events };

        let modes = events.bits();
        if unsafe { sys::srt_epoll_add_usock(eid, socket, &modes) } == sys::SRT_ERROR {
            return Err(last_error(socket, "srt_epoll_add_usock"));
        }

        debug!("Created readiness group {} for socket {}", eid, socket);
        Ok(group)
    }

    pub fn id(&self) -> c_int {
        self.eid
    }

    pub fn events(&self) -> Events {
        self.events
    }

    /// Block until the socket reports one of the subscribed events.
    pub fn wait(&self, timeout: PollTimeout) -> Result<Readiness> {
        let mut fds = [SRT_EPOLL_EVENT::default(); 1];
        let res = unsafe {
            sys::srt_epoll_uwait(self.eid, fds.as_mut_ptr(), fds.len() as c_int, timeout.as_millis())
        };

        match res {
            0 => Ok(Readiness::TimedOut),
            n if n < 0 => match last_error(sys::SRT_INVALID_SOCK, "srt_epoll_uwait") {
                SrtError::EpollTimeout => Ok(Readiness::TimedOut),
                err => Err(err),
            },
            _ => Ok(Readiness::Ready(Events::from_bits(fds[0].events))),
        }
    }
}

impl Drop for ReadinessGroup {
    fn drop(&mut self) {
        if unsafe { sys::srt_epoll_release(self.eid) } == sys::SRT_ERROR {
            warn!(
                "Failed to release readiness group {}: {}",
                self.eid,
                last_error(sys::SRT_INVALID_SOCK, "srt_epoll_release")
            );
        } else {
            debug!("Released readiness group {}", self.eid);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_mask() {
        let mask = Events::IN | Events::ERR;
        assert!(mask.contains(Events::IN));
        assert!(mask.contains(Events::ERR));
        assert!(!mask.contains(Events::OUT));
        assert!(!mask.contains(Events::IN | Events::OUT));
        assert_eq!(mask.bits(), sys::SRT_EPOLL_IN | sys::SRT_EPOLL_ERR);
    }
}
