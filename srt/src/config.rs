//! String-keyed socket configuration
//!
//! Sockets are configured from a plain `key -> value` map, the same shape
//! as the query string of an `srt://` URL. A handful of keys drive the
//! binding itself (`blocking`, `mode`, `pktsize`, `linger`, `adapter`,
//! `localport`, `polltimeout`); the rest are native options looked up in
//! [`crate::options::SOCKET_OPTIONS`]. Unknown keys and malformed values are logged
//! and skipped.

use srt_io::PollTimeout;
use std::collections::HashMap;
use tracing::warn;

/// Default SRT payload size for live streaming (7 × 188-byte TS packets + headers)
pub const DEFAULT_PACKET_SIZE: usize = 1456;

/// Keys consumed by the binding rather than passed to the native library
pub const BINDING_KEYS: &[&str] = &[
    "blocking",
    "mode",
    "pktsize",
    "linger",
    "adapter",
    "localport",
    "polltimeout",
];

/// Working mode of a socket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Listener,
    Caller,
    Rendezvous,
}

/// Socket configuration map
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SocketConfig {
    values: HashMap<String, String>,
}

impl SocketConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a key, returning the config for chaining
    pub fn set(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Keys that are neither binding keys nor known native options
    pub fn unknown_keys(&self) -> impl Iterator<Item = &str> {
        self.iter()
            .map(|(key, _)| key)
            .filter(|key| !BINDING_KEYS.contains(key) && crate::options::find(key).is_none())
    }

    /// Sockets are non-blocking unless `blocking` is present and not `0`/`false`.
    pub fn blocking(&self) -> bool {
        match self.get("blocking") {
            None => false,
            Some(v) => !matches!(v.trim(), "0" | "false"),
        }
    }

    /// Resolve the working mode, inferring it from `host` when unset.
    pub fn mode(&self, host: &str) -> Mode {
        match self.get("mode").unwrap_or("default") {
            "caller" | "client" => Mode::Caller,
            "listener" | "server" => Mode::Listener,
            "rendezvous" => Mode::Rendezvous,
            "default" => self.inferred_mode(host),
            other => {
                warn!("Unknown socket mode '{}', inferring from host", other);
                self.inferred_mode(host)
            }
        }
    }

    fn inferred_mode(&self, host: &str) -> Mode {
        if host.is_empty() {
            Mode::Listener
        } else if self.contains("adapter") {
            Mode::Rendezvous
        } else {
            Mode::Caller
        }
    }

    pub fn packet_size(&self) -> usize {
        match self.parsed::<i64>("pktsize") {
            Some(size) if size > 0 => size as usize,
            _ => DEFAULT_PACKET_SIZE,
        }
    }

    /// Linger time in seconds, if configured
    pub fn linger(&self) -> Option<i32> {
        self.parsed("linger")
    }

    /// Local interface for rendezvous connections
    pub fn adapter(&self) -> Option<&str> {
        self.get("adapter")
    }

    /// Local port for rendezvous connections
    pub fn local_port(&self) -> Option<u16> {
        self.parsed("localport")
    }

    pub fn poll_timeout(&self) -> PollTimeout {
        self.parsed::<i64>("polltimeout")
            .map(PollTimeout::from_millis)
            .unwrap_or_default()
    }

    fn parsed<T: std::str::FromStr>(&self, key: &str) -> Option<T> {
        let raw = self.get(key)?;
        match raw.trim().parse() {
            Ok(v) => Some(v),
            Err(_) => {
                warn!("Ignoring malformed value '{}' for option {}", raw, key);
                None
            }
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for SocketConfig {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        SocketConfig {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl From<HashMap<String, String>> for SocketConfig {
    fn from(values: HashMap<String, String>) -> Self {
        SocketConfig { values }
    }
}
