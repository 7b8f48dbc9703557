//! Time utilities for SRT sockets
//!
//! Provides the poll timeout used by readiness waits, plus the periodic
//! timer and pacing limiter used by the command-line tools.

use std::time::{Duration, Instant};

/// How long a readiness wait may block.
///
/// The native library takes milliseconds as a signed 64-bit value where
/// `-1` means "wait forever".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PollTimeout {
    /// Block until the socket becomes ready
    #[default]
    Forever,
    /// Block for at most the given duration (zero polls once)
    After(Duration),
}

impl PollTimeout {
    /// Build from the native millisecond convention (negative = forever)
    pub fn from_millis(ms: i64) -> Self {
        if ms < 0 {
            PollTimeout::Forever
        } else {
            PollTimeout::After(Duration::from_millis(ms as u64))
        }
    }

    /// Convert to the native millisecond convention
    pub fn as_millis(&self) -> i64 {
        match self {
            PollTimeout::Forever => -1,
            PollTimeout::After(d) => d.as_millis().min(i64::MAX as u128) as i64,
        }
    }

    /// The bounded duration, if any
    pub fn duration(&self) -> Option<Duration> {
        match self {
            PollTimeout::Forever => None,
            PollTimeout::After(d) => Some(*d),
        }
    }
}

impl From<Duration> for PollTimeout {
    fn from(d: Duration) -> Self {
        PollTimeout::After(d)
    }
}

impl From<Option<Duration>> for PollTimeout {
    fn from(d: Option<Duration>) -> Self {
        d.map_or(PollTimeout::Forever, PollTimeout::After)
    }
}

/// Timer for periodic operations
///
/// Used by the tools for periodic statistics reports.
pub struct Timer {
    interval: Duration,
    last_fire: Instant,
}

impl Timer {
    /// Create a new timer with the given interval
    pub fn new(interval: Duration) -> Self {
        Timer {
            interval,
            last_fire: Instant::now(),
        }
    }

    /// Check if the timer has expired
    pub fn expired(&self) -> bool {
        self.last_fire.elapsed() >= self.interval
    }

    /// Reset the timer
    pub fn reset(&mut self) {
        self.last_fire = Instant::now();
    }

    /// Fire the timer if expired, returning true if it fired
    pub fn try_fire(&mut self) -> bool {
        if self.expired() {
            self.reset();
            true
        } else {
            false
        }
    }
}

/// Token bucket limiter used to pace writes to a target bitrate.
pub struct RateLimiter {
    capacity: u64,
    tokens: u64,
    /// Bytes added per microsecond
    rate: f64,
    last_update: Instant,
}

impl RateLimiter {
    /// Create a new rate limiter
    ///
    /// # Arguments
    /// * `rate_bps` - Rate in bits per second
    /// * `burst_bytes` - Maximum burst size in bytes
    pub fn new(rate_bps: u64, burst_bytes: u64) -> Self {
        RateLimiter {
            capacity: burst_bytes,
            tokens: burst_bytes,
            rate: (rate_bps as f64) / 8.0 / 1_000_000.0,
            last_update: Instant::now(),
        }
    }

    fn refill(&mut self) {
        let now = Instant::now();
        let elapsed_us = now.duration_since(self.last_update).as_micros() as f64;
        let new_tokens = (elapsed_us * self.rate) as u64;

        if new_tokens > 0 {
            self.tokens = (self.tokens + new_tokens).min(self.capacity);
            self.last_update = now;
        }
    }

    /// Consume tokens for `bytes`, returning false if not enough are available
    pub fn consume(&mut self, bytes: usize) -> bool {
        self.refill();
        if self.tokens >= bytes as u64 {
            self.tokens -= bytes as u64;
            true
        } else {
            false
        }
    }

    /// Get time to wait before `bytes` will be available
    pub fn time_to_available(&mut self, bytes: usize) -> Duration {
        self.refill();

        if self.tokens >= bytes as u64 {
            return Duration::ZERO;
        }

        let needed = (bytes as u64) - self.tokens;
        let micros = (needed as f64 / self.rate).ceil() as u64;
        Duration::from_micros(micros)
    }
}
