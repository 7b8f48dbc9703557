//! Reading and writing
//!
//! Every transfer tries the native call first. A non-blocking socket that
//! reports it would block waits once on the matching readiness group and
//! retries once; blocking sockets surface native errors directly.

use crate::epoll::{Events, Readiness, ReadinessGroup};
use crate::error::{last_error, Result, SrtError};
use crate::msgctrl::MsgCtrl;
use crate::socket::Socket;
use srt_io::PollTimeout;
use srt_sys as sys;
use std::io;
use std::os::raw::{c_char, c_int};
use std::ptr;
use tracing::trace;

fn native_len(len: usize) -> c_int {
    c_int::try_from(len).unwrap_or(c_int::MAX)
}

impl Socket {
    /// Read one message into `buf`, waiting up to the poll timeout.
    pub fn read(&self, buf: &mut [u8]) -> Result<usize> {
        self.read_timeout(buf, self.poll_timeout())
    }

    /// Read one message into `buf`.
    ///
    /// `timeout` bounds the readiness wait of a non-blocking socket and
    /// yields [`SrtError::EpollTimeout`] when it elapses. Blocking sockets
    /// ignore it.
    pub fn read_timeout(&self, buf: &mut [u8], timeout: impl Into<PollTimeout>) -> Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        let len = native_len(buf.len());
        let n = self.transfer(self.read_group.as_ref(), timeout.into(), "srt_recvmsg2", || unsafe {
            sys::srt_recvmsg2(self.id, buf.as_mut_ptr() as *mut c_char, len, ptr::null_mut())
        })?;
        Ok(n)
    }

    /// Write `buf` as one message, waiting up to the poll timeout.
    pub fn write(&self, buf: &[u8]) -> Result<usize> {
        self.write_timeout(buf, self.poll_timeout())
    }

    /// Write `buf` as one message, with the same timeout rules as
    /// [`Socket::read_timeout`].
    pub fn write_timeout(&self, buf: &[u8], timeout: impl Into<PollTimeout>) -> Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        let len = native_len(buf.len());
        self.transfer(self.write_group.as_ref(), timeout.into(), "srt_sendmsg2", || unsafe {
            sys::srt_sendmsg2(self.id, buf.as_ptr() as *const c_char, len, ptr::null_mut())
        })
    }

    /// Read one message along with its control block.
    pub fn recv_msg(&self, buf: &mut [u8]) -> Result<(usize, MsgCtrl)> {
        let mut ctrl = MsgCtrl::default().to_native();
        if buf.is_empty() {
            return Ok((0, MsgCtrl::from(&ctrl)));
        }
        let len = native_len(buf.len());
        let n = self.transfer(self.read_group.as_ref(), self.poll_timeout(), "srt_recvmsg2", || unsafe {
            sys::srt_recvmsg2(self.id, buf.as_mut_ptr() as *mut c_char, len, &mut ctrl)
        })?;
        Ok((n, MsgCtrl::from(&ctrl)))
    }

    /// Write one message with explicit TTL, ordering and source time.
    pub fn send_msg(&self, buf: &[u8], ctrl: &MsgCtrl) -> Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        let len = native_len(buf.len());
        let mut native = ctrl.to_native();
        self.transfer(self.write_group.as_ref(), self.poll_timeout(), "srt_sendmsg2", || unsafe {
            sys::srt_sendmsg2(self.id, buf.as_ptr() as *const c_char, len, &mut native)
        })
    }

    fn transfer(
        &self,
        group: Option<&ReadinessGroup>,
        timeout: PollTimeout,
        context: &'static str,
        mut op: impl FnMut() -> c_int,
    ) -> Result<usize> {
        self.ensure_open()?;

        let res = op();
        if res != sys::SRT_ERROR {
            return Ok(res.max(0) as usize);
        }

        let err = last_error(self.id, context);
        let group = match group {
            Some(group) if err.would_block() => group,
            _ => return Err(err),
        };

        trace!("Socket {} would block in {}, waiting", self.id, context);
        match group.wait(timeout)? {
            Readiness::TimedOut => return Err(SrtError::EpollTimeout),
            Readiness::Ready(events) if events.contains(Events::ERR) => {
                if self.state().is_closed() {
                    return Err(SrtError::SocketClosed);
                }
            }
            Readiness::Ready(_) => {}
        }

        let res = op();
        if res == sys::SRT_ERROR {
            return Err(last_error(self.id, context));
        }
        Ok(res.max(0) as usize)
    }
}

impl io::Read for Socket {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Socket::read(self, buf).map_err(io::Error::from)
    }
}

impl io::Read for &Socket {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Socket::read(*self, buf).map_err(io::Error::from)
    }
}

impl io::Write for Socket {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Socket::write(self, buf).map_err(io::Error::from)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl io::Write for &Socket {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Socket::write(*self, buf).map_err(io::Error::from)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_len_clamps() {
        assert_eq!(native_len(1316), 1316);
        assert_eq!(native_len(usize::MAX), c_int::MAX);
    }
}
