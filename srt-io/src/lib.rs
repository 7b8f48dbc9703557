//! SRT I/O and Platform Abstraction
//!
//! Platform plumbing that does not need the native library: translating
//! host/port text to native socket addresses and back, and the timing
//! primitives used around readiness waits.

pub mod addr;
pub mod time;

pub use addr::{create_addr_inet, from_native, from_raw, resolve, to_native, AddrError};
pub use time::{PollTimeout, RateLimiter, Timer};
