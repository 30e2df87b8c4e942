//! Provider-side error type for the host bridge.
//!
//! `HostError` is returned by every `HostContext` method. The bridge never
//! reinterprets it: the Rust surface hands it back unchanged, and the guest
//! surface maps it to an `ErrorCode` via [`to_error_code`](HostError::to_error_code)
//! while keeping the full value for the embedder.

use std::fmt;

use vmhost_primitives::ErrorCode;

/// Error type returned by `HostContext` methods.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    /// The provider chose a specific wire status code.
    Code(ErrorCode),
    /// Any other provider failure. Returned to the guest as
    /// `ERR_PROVIDER_FAILURE` (4).
    Provider(String),
}

impl HostError {
    /// Convert to the `i32` status code returned to the guest.
    ///
    /// Never 0: an error that carries `ErrorCode::Ok` is still a failure
    /// and is reported as `ERR_PROVIDER_FAILURE`.
    pub fn to_error_code(&self) -> i32 {
        match self {
            Self::Code(ErrorCode::Ok) | Self::Provider(_) => ErrorCode::ProviderFailure as i32,
            Self::Code(code) => code.as_i32(),
        }
    }

    /// Create a provider failure with a descriptive message.
    pub fn provider(msg: impl Into<String>) -> Self {
        Self::Provider(msg.into())
    }

    /// Create an internal error.
    pub fn internal() -> Self {
        Self::Code(ErrorCode::Internal)
    }
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Code(code) => write!(f, "host error: {}", code),
            Self::Provider(msg) => write!(f, "provider error: {}", msg),
        }
    }
}

impl std::error::Error for HostError {}

impl From<ErrorCode> for HostError {
    fn from(code: ErrorCode) -> Self {
        Self::Code(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_conversion() {
        let err = HostError::Code(ErrorCode::BadPointer);
        assert_eq!(err.to_error_code(), 1);

    }

    #[test]
    fn test_ok_code_error_is_still_a_failure() {
        let err = HostError::Code(ErrorCode::Ok);
        assert_eq!(err.to_error_code(), 4);
    }

    #[test]
    fn test_provider_maps_to_provider_failure() {
        let err = HostError::provider("database offline");
        assert_eq!(err.to_error_code(), 4);
    }

    #[test]
    fn test_internal() {
        assert_eq!(HostError::internal().to_error_code(), 5);
    }

    #[test]
    fn test_display() {
        let err = HostError::Code(ErrorCode::SizeMismatch);
        assert!(format!("{}", err).contains("ERR_SIZE_MISMATCH"));

        let err = HostError::provider("disk full");
        assert!(format!("{}", err).contains("disk full"));
    }

    #[test]
    fn test_from_error_code() {
        let err: HostError = ErrorCode::AllocationFailed.into();
        assert_eq!(err.to_error_code(), 3);
    }
}
