//! Address translation between host/port text and native `sockaddr` layouts
//!
//! The native library takes and reports addresses as raw `sockaddr` pointers.
//! `socket2::SockAddr` owns the storage; this module resolves text into it and
//! turns raw peer addresses back into `SocketAddr`.

use socket2::SockAddr;
use std::io;
use std::mem;
use std::net::{IpAddr, Ipv4Addr, SocketAddr, ToSocketAddrs};
use std::ptr;
use thiserror::Error;

/// Address resolution errors
#[derive(Error, Debug)]
pub enum AddrError {
    #[error("could not resolve host '{host}': {source}")]
    Resolve {
        host: String,
        #[source]
        source: io::Error,
    },

    #[error("no address found for host '{0}'")]
    NotFound(String),
}

/// Resolve `host` and `port` into a socket address.
///
/// IP literals (optionally bracketed for IPv6) are used directly, anything
/// else goes through the system resolver and the first answer wins. An empty
/// host means the IPv4 wildcard address.
pub fn resolve(host: &str, port: u16) -> Result<SocketAddr, AddrError> {
    if host.is_empty() {
        return Ok(SocketAddr::new(Ipv4Addr::UNSPECIFIED.into(), port));
    }

    let literal = host.trim_start_matches('[').trim_end_matches(']');
    if let Ok(ip) = literal.parse::<IpAddr>() {
        return Ok(SocketAddr::new(unmap(ip), port));
    }

    let mut addrs = (host, port)
        .to_socket_addrs()
        .map_err(|source| AddrError::Resolve {
            host: host.to_string(),
            source,
        })?;

    addrs
        .next()
        .map(|addr| SocketAddr::new(unmap(addr.ip()), addr.port()))
        .ok_or_else(|| AddrError::NotFound(host.to_string()))
}

/// Resolve `host` and `port` into the native address layout.
pub fn create_addr_inet(host: &str, port: u16) -> Result<SockAddr, AddrError> {
    resolve(host, port).map(to_native)
}

/// Native layout of a socket address (`sockaddr_in` or `sockaddr_in6`).
pub fn to_native(addr: SocketAddr) -> SockAddr {
    SockAddr::from(addr)
}

/// Structured form of a native address, `None` for non-IP families.
pub fn from_native(addr: &SockAddr) -> Option<SocketAddr> {
    addr.as_socket()
}

/// Copy a raw native address into a `SocketAddr`.
///
/// # Safety
/// `ptr` must be null or point to a valid `sockaddr_in` / `sockaddr_in6`
/// (as indicated by its family field) for the duration of the call.
pub unsafe fn from_raw(ptr: *const libc::sockaddr) -> Option<SocketAddr> {
    if ptr.is_null() {
        return None;
    }

    let len = match (*ptr).sa_family as libc::c_int {
        libc::AF_INET => mem::size_of::<libc::sockaddr_in>(),
        libc::AF_INET6 => mem::size_of::<libc::sockaddr_in6>(),
        _ => return None,
    };

    let ((), addr) = SockAddr::try_init(|storage, storage_len| {
        ptr::copy_nonoverlapping(ptr as *const u8, storage as *mut u8, len);
        *storage_len = len as libc::socklen_t;
        Ok(())
    })
    .ok()?;

    addr.as_socket()
}

/// IPv4-mapped IPv6 addresses are treated as plain IPv4.
fn unmap(ip: IpAddr) -> IpAddr {
    match ip {
        IpAddr::V6(v6) => v6.to_ipv4_mapped().map_or(IpAddr::V6(v6), IpAddr::V4),
        v4 => v4,
    }
}
