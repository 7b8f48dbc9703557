//! Native socket option table
//!
//! Maps configuration keys to native option codes, value types and the
//! phase in which they must be applied. Options bound `Pre` only take effect
//! before the socket is bound or connected; `Post` ones are applied once the
//! connection exists (and on every accepted socket).

use crate::config::SocketConfig;
use crate::error::{last_error, Result, SrtError};
use srt_sys as sys;
use srt_sys::{SRTSOCKET, SRT_SOCKOPT};
use std::mem;
use std::os::raw::{c_int, c_void};
use tracing::{debug, warn};

/// Phase in which an option is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionBinding {
    Pre,
    Post,
}

/// Native value type of an option
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    Int32,
    Int64,
    String,
    Bool,
    /// `live` or `file`, sent as a 32-bit enum
    TransType,
}

#[derive(Debug, Clone, Copy)]
pub struct SocketOption {
    pub name: &'static str,
    pub code: SRT_SOCKOPT,
    pub binding: OptionBinding,
    pub kind: OptionKind,
}

const fn opt(
    name: &'static str,
    code: SRT_SOCKOPT,
    binding: OptionBinding,
    kind: OptionKind,
) -> SocketOption {
    SocketOption {
        name,
        code,
        binding,
        kind,
    }
}

use OptionBinding::{Post, Pre};
use OptionKind::{Bool, Int32, Int64, String as Str, TransType};

/// All options settable through a [`SocketConfig`]
pub static SOCKET_OPTIONS: &[SocketOption] = &[
    opt("transtype", sys::SRTO_TRANSTYPE, Pre, TransType),
    opt("maxbw", sys::SRTO_MAXBW, Pre, Int64),
    opt("pbkeylen", sys::SRTO_PBKEYLEN, Pre, Int32),
    opt("passphrase", sys::SRTO_PASSPHRASE, Pre, Str),
    opt("mss", sys::SRTO_MSS, Pre, Int32),
    opt("fc", sys::SRTO_FC, Pre, Int32),
    opt("sndbuf", sys::SRTO_SNDBUF, Pre, Int32),
    opt("rcvbuf", sys::SRTO_RCVBUF, Pre, Int32),
    opt("udpsndbuf", sys::SRTO_UDP_SNDBUF, Pre, Int32),
    opt("udprcvbuf", sys::SRTO_UDP_RCVBUF, Pre, Int32),
    opt("ipttl", sys::SRTO_IPTTL, Pre, Int32),
    opt("iptos", sys::SRTO_IPTOS, Pre, Int32),
    opt("ipv6only", sys::SRTO_IPV6ONLY, Pre, Int32),
    opt("inputbw", sys::SRTO_INPUTBW, Post, Int64),
    opt("oheadbw", sys::SRTO_OHEADBW, Post, Int32),
    opt("latency", sys::SRTO_LATENCY, Pre, Int32),
    opt("tsbpdmode", sys::SRTO_TSBPDMODE, Pre, Bool),
    opt("tlpktdrop", sys::SRTO_TLPKTDROP, Pre, Bool),
    opt("snddropdelay", sys::SRTO_SNDDROPDELAY, Post, Int32),
    opt("nakreport", sys::SRTO_NAKREPORT, Pre, Bool),
    opt("conntimeo", sys::SRTO_CONNTIMEO, Pre, Int32),
    opt("drifttracer", sys::SRTO_DRIFTTRACER, Post, Bool),
    opt("lossmaxttl", sys::SRTO_LOSSMAXTTL, Pre, Int32),
    opt("rcvlatency", sys::SRTO_RCVLATENCY, Pre, Int32),
    opt("peerlatency", sys::SRTO_PEERLATENCY, Pre, Int32),
    opt("minversion", sys::SRTO_MINVERSION, Pre, Int32),
    opt("streamid", sys::SRTO_STREAMID, Pre, Str),
    opt("congestion", sys::SRTO_CONGESTION, Pre, Str),
    opt("messageapi", sys::SRTO_MESSAGEAPI, Pre, Bool),
    opt("payloadsize", sys::SRTO_PAYLOADSIZE, Pre, Int32),
    opt("kmrefreshrate", sys::SRTO_KMREFRESHRATE, Pre, Int32),
    opt("kmpreannounce", sys::SRTO_KMPREANNOUNCE, Pre, Int32),
    opt("enforcedencryption", sys::SRTO_ENFORCEDENCRYPTION, Pre, Bool),
    opt("peeridletimeo", sys::SRTO_PEERIDLETIMEO, Pre, Int32),
    opt("packetfilter", sys::SRTO_PACKETFILTER, Pre, Str),
    opt("retransmitalgo", sys::SRTO_RETRANSMITALGO, Pre, Int32),
    opt("rcvtimeo", sys::SRTO_RCVTIMEO, Post, Int32),
    opt("sndtimeo", sys::SRTO_SNDTIMEO, Post, Int32),
];

/// Look up an option by configuration key
pub fn find(name: &str) -> Option<&'static SocketOption> {
    SOCKET_OPTIONS.iter().find(|o| o.name == name)
}

/// A typed option value ready to hand to the native library
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    Int32(i32),
    Int64(i64),
    String(String),
    Bool(bool),
}

impl OptionValue {
    /// Parse the textual configuration value for an option of `kind`
    pub fn parse(kind: OptionKind, raw: &str) -> Result<Self> {
        let raw = raw.trim();
        let invalid = || SrtError::InvalidArgument(format!("'{}' is not a valid {:?}", raw, kind));

        match kind {
            OptionKind::Int32 => raw.parse().map(OptionValue::Int32).map_err(|_| invalid()),
            OptionKind::Int64 => raw.parse().map(OptionValue::Int64).map_err(|_| invalid()),
            OptionKind::String => Ok(OptionValue::String(raw.to_string())),
            OptionKind::Bool => match raw {
                "1" | "true" => Ok(OptionValue::Bool(true)),
                "0" | "false" => Ok(OptionValue::Bool(false)),
                _ => Err(invalid()),
            },
            OptionKind::TransType => match raw {
                "live" => Ok(OptionValue::Int32(sys::SRTT_LIVE)),
                "file" => Ok(OptionValue::Int32(sys::SRTT_FILE)),
                _ => Err(invalid()),
            },
        }
    }

    /// Set this value on a native socket
    pub(crate) fn apply_to(&self, socket: SRTSOCKET, code: SRT_SOCKOPT) -> Result<()> {
        match self {
            OptionValue::Int32(v) => set_raw(socket, code, &v.to_ne_bytes()),
            OptionValue::Int64(v) => set_raw(socket, code, &v.to_ne_bytes()),
            OptionValue::String(s) => set_raw(socket, code, s.as_bytes()),
            OptionValue::Bool(b) => set_raw(socket, code, &c_int::from(*b).to_ne_bytes()),
        }
    }
}

/// Apply every option in `config` that belongs to `binding`.
///
/// Best effort: malformed values and native failures are logged and skipped.
pub(crate) fn apply(socket: SRTSOCKET, binding: OptionBinding, config: &SocketConfig) {
    for option in SOCKET_OPTIONS.iter().filter(|o| o.binding == binding) {
        let Some(raw) = config.get(option.name) else {
            continue;
        };

        let result = OptionValue::parse(option.kind, raw)
            .and_then(|value| value.apply_to(socket, option.code));

        match result {
            Ok(()) => debug!("Set option {} on socket {}", option.name, socket),
            Err(e) => warn!("Error setting option {} to {}: {}", option.name, raw, e),
        }
    }
}

/// Set `SRTO_LINGER`; a positive value enables lingering for that many seconds.
pub(crate) fn set_linger(socket: SRTSOCKET, seconds: i32) -> Result<()> {
    let linger = libc::linger {
        l_onoff: c_int::from(seconds > 0),
        l_linger: seconds.max(0),
    };
    let size = mem::size_of::<libc::linger>() as c_int;
    let res = unsafe {
        sys::srt_setsockflag(
            socket,
            sys::SRTO_LINGER,
            &linger as *const libc::linger as *const c_void,
            size,
        )
    };
    if res == sys::SRT_ERROR {
        return Err(last_error(socket, "srt_setsockflag(SRTO_LINGER)"));
    }
    Ok(())
}

pub(crate) fn set_raw(socket: SRTSOCKET, code: SRT_SOCKOPT, value: &[u8]) -> Result<()> {
    let len = c_int::try_from(value.len())
        .map_err(|_| SrtError::InvalidArgument("option value too long".into()))?;
    let res = unsafe { sys::srt_setsockflag(socket, code, value.as_ptr() as *const c_void, len) };
    if res == sys::SRT_ERROR {
        return Err(last_error(socket, "srt_setsockflag"));
    }
    Ok(())
}

/// Read an option into `buf`, returning the number of bytes written.
pub(crate) fn get_raw(socket: SRTSOCKET, code: SRT_SOCKOPT, buf: &mut [u8]) -> Result<usize> {
    let mut len = c_int::try_from(buf.len()).unwrap_or(c_int::MAX);
    let res = unsafe {
        sys::srt_getsockflag(socket, code, buf.as_mut_ptr() as *mut c_void, &mut len)
    };
    if res == sys::SRT_ERROR {
        return Err(last_error(socket, "srt_getsockflag"));
    }
    Ok((len.max(0) as usize).min(buf.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_option_names_unique() {
        let names: HashSet<_> = SOCKET_OPTIONS.iter().map(|o| o.name).collect();
        assert_eq!(names.len(), SOCKET_OPTIONS.len());
    }

    #[test]
    fn test_find() {
        let latency = find("latency").unwrap();
        assert_eq!(latency.code, sys::SRTO_LATENCY);
        assert_eq!(latency.binding, OptionBinding::Pre);
        assert_eq!(latency.kind, OptionKind::Int32);

        assert_eq!(find("inputbw").unwrap().binding, OptionBinding::Post);
        assert_eq!(find("maxbw").unwrap().kind, OptionKind::Int64);
        assert!(find("blocking").is_none());
        assert!(find("nonsense").is_none());
    }

    #[test]
    fn test_parse_values() {
        assert_eq!(OptionValue::parse(OptionKind::Int32, "120").unwrap(), OptionValue::Int32(120));
        assert_eq!(
            OptionValue::parse(OptionKind::Int64, "300000").unwrap(),
            OptionValue::Int64(300_000)
        );
        assert_eq!(
            OptionValue::parse(OptionKind::String, "stream-1").unwrap(),
            OptionValue::String("stream-1".into())
        );
        assert_eq!(OptionValue::parse(OptionKind::Bool, "1").unwrap(), OptionValue::Bool(true));
        assert_eq!(OptionValue::parse(OptionKind::Bool, "false").unwrap(), OptionValue::Bool(false));
        assert_eq!(
            OptionValue::parse(OptionKind::TransType, "file").unwrap(),
            OptionValue::Int32(sys::SRTT_FILE)
        );
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(OptionValue::parse(OptionKind::Int32, "ten").is_err());
        assert!(OptionValue::parse(OptionKind::Int32, "99999999999").is_err());
        assert!(OptionValue::parse(OptionKind::Bool, "yes").is_err());
        assert!(OptionValue::parse(OptionKind::TransType, "3").is_err());
    }
}
