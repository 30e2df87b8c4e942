//! Error types and wire status codes for the host bridge.
//!
//! `ErrorCode` is the closed table of `i32` status codes returned by every
//! guest-facing callback. Its integer mapping is part of the external
//! contract and must never be renumbered.

use core::fmt;

/// Callback status codes returned to the guest (`0` = OK).
///
/// These repr values are stable across versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ErrorCode {
    Ok = 0,
    BadPointer = 1,
    SizeMismatch = 2,
    AllocationFailed = 3,
    ProviderFailure = 4,
    Internal = 5,
}

impl ErrorCode {
    /// Convert from an i32 status code returned by a callback.
    pub fn from_i32(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Ok),
            1 => Some(Self::BadPointer),
            2 => Some(Self::SizeMismatch),
            3 => Some(Self::AllocationFailed),
            4 => Some(Self::ProviderFailure),
            5 => Some(Self::Internal),
            _ => None,
        }
    }

    /// Return the i32 representation of this status code.
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Returns true if this is the `Ok` variant.
    pub fn is_ok(self) -> bool {
        matches!(self, Self::Ok)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => write!(f, "OK"),
            Self::BadPointer => write!(f, "ERR_BAD_POINTER"),
            Self::SizeMismatch => write!(f, "ERR_SIZE_MISMATCH"),
            Self::AllocationFailed => write!(f, "ERR_ALLOCATION_FAILED"),
            Self::ProviderFailure => write!(f, "ERR_PROVIDER_FAILURE"),
            Self::Internal => write!(f, "ERR_INTERNAL"),
        }
    }
}

/// Errors raised while building or decoding primitive values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrimitiveError {
    /// A fixed-width value was built from the wrong number of bytes.
    SizeMismatch { expected: usize, got: usize },

    /// A wire status code outside the documented table.
    UnknownStatus(i32),
}

impl fmt::Display for PrimitiveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SizeMismatch { expected, got } => {
                write!(f, "size mismatch: expected {} bytes, got {}", expected, got)
            }
            Self::UnknownStatus(code) => write!(f, "unknown status code {}", code),
        }
    }
}

impl std::error::Error for PrimitiveError {}
