//! SRT - Secure Reliable Transport
//!
//! Safe bindings to the native `libsrt` library. A single [`Socket`] type
//! covers listener, caller and rendezvous roles, configured from a string
//! map the way `srt://host:port?key=value` URLs are.
//!
//! ```no_run
//! use srt::{Socket, SocketConfig};
//!
//! srt::startup()?;
//! let config = SocketConfig::new().set("latency", "120").set("blocking", "1");
//! let mut caller = Socket::new("127.0.0.1", 9000, config)?;
//! caller.connect()?;
//! caller.write(b"hello")?;
//! # Ok::<(), srt::SrtError>(())
//! ```
//!
//! The library must be started with [`startup`] before any socket is
//! created.

pub mod callback;
pub mod config;
pub mod epoll;
pub mod error;
pub mod logging;
pub mod msgctrl;
pub mod options;
pub mod reject;
pub mod socket;
pub mod stats;
mod transfer;

pub use srt_io as io;
pub use srt_sys as sys;

pub use callback::ConnectionRequest;
pub use config::{Mode, SocketConfig, BINDING_KEYS, DEFAULT_PACKET_SIZE};
pub use error::{Result, SrtErrno, SrtError};
pub use logging::LogLevel;
pub use msgctrl::{Boundary, MsgCtrl};
pub use reject::RejectReason;
pub use socket::{Socket, SocketState, MAX_STRING_OPTION_LEN};
pub use srt_io::PollTimeout;
pub use stats::Stats;

use error::last_error;
use tracing::debug;

/// Native library version
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl Version {
    fn from_raw(raw: u32) -> Self {
        Version {
            major: (raw >> 16) & 0xff,
            minor: (raw >> 8) & 0xff,
            patch: raw & 0xff,
        }
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Start the native library. Calling it again is harmless.
pub fn startup() -> Result<()> {
    match unsafe { sys::srt_startup() } {
        res if res < 0 => Err(last_error(sys::SRT_INVALID_SOCK, "srt_startup")),
        1 => {
            debug!("SRT library already started");
            Ok(())
        }
        _ => {
            debug!("Started SRT library {}", version());
            Ok(())
        }
    }
}

/// Release the native library's resources; open sockets become invalid.
pub fn cleanup() -> Result<()> {
    if unsafe { sys::srt_cleanup() } < 0 {
        return Err(last_error(sys::SRT_INVALID_SOCK, "srt_cleanup"));
    }
    Ok(())
}

pub fn version() -> Version {
    Version::from_raw(unsafe { sys::srt_getversion() })
}
