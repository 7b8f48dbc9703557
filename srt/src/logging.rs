//! Native library logging
//!
//! By default libsrt prints to stderr. [`forward_to_tracing`] routes its log
//! lines into `tracing` under the `srt::native` target instead.

use crate::error::cstr_lossy;
use srt_sys as sys;
use std::os::raw::{c_char, c_int, c_void};
use std::ptr;
use tracing::{debug, error, info, warn};

/// Native log threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Critical,
    Error,
    Warning,
    Notice,
    Debug,
}

impl LogLevel {
    pub fn as_raw(&self) -> c_int {
        match self {
            LogLevel::Critical => sys::LOG_CRIT,
            LogLevel::Error => sys::LOG_ERR,
            LogLevel::Warning => sys::LOG_WARNING,
            LogLevel::Notice => sys::LOG_NOTICE,
            LogLevel::Debug => sys::LOG_DEBUG,
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "crit" | "critical" => Ok(LogLevel::Critical),
            "err" | "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warning),
            "notice" | "info" => Ok(LogLevel::Notice),
            "debug" => Ok(LogLevel::Debug),
            other => Err(format!("unknown log level '{}'", other)),
        }
    }
}

/// Set the most verbose level the native library will emit
pub fn set_log_level(level: LogLevel) {
    unsafe { sys::srt_setloglevel(level.as_raw()) };
}

/// Send native log lines to `tracing` instead of stderr.
pub fn forward_to_tracing() {
    let flags = sys::SRT_LOGF_DISABLE_TIME
        | sys::SRT_LOGF_DISABLE_THREADNAME
        | sys::SRT_LOGF_DISABLE_SEVERITY
        | sys::SRT_LOGF_DISABLE_EOL;
    unsafe {
        sys::srt_setlogflags(flags);
        sys::srt_setloghandler(ptr::null_mut(), Some(log_handler));
    }
}

unsafe extern "C" fn log_handler(
    _opaque: *mut c_void,
    level: c_int,
    file: *const c_char,
    line: c_int,
    area: *const c_char,
    message: *const c_char,
) {
    let message = cstr_lossy(message);
    let message = message.trim_end();
    let area = cstr_lossy(area);
    let file = cstr_lossy(file);

    match level {
        l if l <= sys::LOG_ERR => error!(target: "srt::native", %area, %file, line, "{}", message),
        sys::LOG_WARNING => warn!(target: "srt::native", %area, %file, line, "{}", message),
        sys::LOG_NOTICE | sys::LOG_INFO => info!(target: "srt::native", %area, %file, line, "{}", message),
        _ => debug!(target: "srt::native", %area, %file, line, "{}", message),
    }
}
