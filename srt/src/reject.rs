//! Connection rejection reasons
//!
//! A listen callback may attach one of these to a connection it refuses; the
//! caller side reads it back after its connect attempt fails.

use crate::error::cstr_lossy;
use srt_sys as sys;
use std::fmt;
use std::os::raw::c_int;

/// Why a connection was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectReason {
    /// 1401
    Unauthorized,
    /// 1402
    Overload,
    /// 1403
    Forbidden,
    /// 1404
    NotFound,
    /// 1405
    BadMode,
    /// 1406
    Unacceptable,
    /// Application-defined code, sent as `2000 + n`
    User(u16),
    /// Any other code, including the library's own internal reasons
    Other(c_int),
}

impl RejectReason {
    pub fn code(&self) -> c_int {
        match *self {
            RejectReason::Unauthorized => sys::SRT_REJX_UNAUTHORIZED,
            RejectReason::Overload => sys::SRT_REJX_OVERLOAD,
            RejectReason::Forbidden => sys::SRT_REJX_FORBIDDEN,
            RejectReason::NotFound => sys::SRT_REJX_NOTFOUND,
            RejectReason::BadMode => sys::SRT_REJX_BAD_MODE,
            RejectReason::Unacceptable => sys::SRT_REJX_UNACCEPTABLE,
            RejectReason::User(n) => sys::SRT_REJC_USERDEFINED + c_int::from(n),
            RejectReason::Other(code) => code,
        }
    }

    pub fn from_code(code: c_int) -> Self {
        match code {
            sys::SRT_REJX_UNAUTHORIZED => RejectReason::Unauthorized,
            sys::SRT_REJX_OVERLOAD => RejectReason::Overload,
            sys::SRT_REJX_FORBIDDEN => RejectReason::Forbidden,
            sys::SRT_REJX_NOTFOUND => RejectReason::NotFound,
            sys::SRT_REJX_BAD_MODE => RejectReason::BadMode,
            sys::SRT_REJX_UNACCEPTABLE => RejectReason::Unacceptable,
            code if code >= sys::SRT_REJC_USERDEFINED => {
                match u16::try_from(code - sys::SRT_REJC_USERDEFINED) {
                    Ok(n) => RejectReason::User(n),
                    Err(_) => RejectReason::Other(code),
                }
            }
            code => RejectReason::Other(code),
        }
    }

    /// Codes below 1000 are set by the library itself, never by a callback.
    pub fn is_internal(&self) -> bool {
        self.code() < sys::SRT_REJC_PREDEFINED
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::Unauthorized => write!(f, "unauthorized"),
            RejectReason::Overload => write!(f, "overload"),
            RejectReason::Forbidden => write!(f, "forbidden"),
            RejectReason::NotFound => write!(f, "not found"),
            RejectReason::BadMode => write!(f, "bad mode"),
            RejectReason::Unacceptable => write!(f, "unacceptable"),
            RejectReason::User(n) => write!(f, "user-defined reason {}", n),
            RejectReason::Other(code) if *code < sys::SRT_REJC_PREDEFINED => {
                let text = unsafe { cstr_lossy(sys::srt_rejectreason_str(*code)) };
                write!(f, "{} ({})", text, code)
            }
            RejectReason::Other(code) => write!(f, "reason code {}", code),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predefined_codes() {
        assert_eq!(RejectReason::Unauthorized.code(), 1401);
        assert_eq!(RejectReason::Unacceptable.code(), 1406);
        assert_eq!(RejectReason::from_code(1403), RejectReason::Forbidden);
        assert_eq!(RejectReason::from_code(1404), RejectReason::NotFound);
    }

    #[test]
    fn test_user_defined_range() {
        assert_eq!(RejectReason::User(7).code(), 2007);
        assert_eq!(RejectReason::from_code(2007), RejectReason::User(7));
        assert_eq!(RejectReason::from_code(2000), RejectReason::User(0));
    }

    #[test]
    fn test_other_codes() {
        assert_eq!(RejectReason::from_code(1500), RejectReason::Other(1500));
        assert!(RejectReason::from_code(sys::SRT_REJ_TIMEOUT).is_internal());
        assert!(!RejectReason::Forbidden.is_internal());
    }
}
