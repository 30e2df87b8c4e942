//! Bridge error types.

use vmhost_hostapi::HostError;
use vmhost_primitives::ErrorCode;

/// Top-level error type for the bridge crate.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// A fixed-width argument did not have exactly the required length.
    #[error("size mismatch for {field}: expected {expected} bytes, got {got}")]
    SizeMismatch {
        field: &'static str,
        expected: usize,
        got: usize,
    },

    /// A result buffer could not be allocated.
    #[error("failed to allocate a {len}-byte result buffer")]
    AllocationFailed { len: usize },

    /// The state provider failed. Carried unchanged.
    #[error("host error: {0}")]
    Host(#[from] HostError),

    /// A guest pointer/length pair fell outside linear memory.
    #[error("bad guest pointer {ptr} (len {len})")]
    BadPointer { ptr: i32, len: i64 },

    /// Wasmtime engine, compilation, or instantiation error.
    #[error("wasmtime error: {0}")]
    Wasmtime(#[from] anyhow::Error),

    /// Module validation failed (missing exports, bad imports, etc.).
    #[error("validation error: {0}")]
    ValidationError(String),

    /// Memory plumbing failed (missing export, initial grow failure).
    #[error("memory error: {0}")]
    MemoryError(String),

    /// Fuel exhausted during execution.
    #[error("fuel exhausted (instruction limit)")]
    FuelExhausted,

    /// WASM guest trapped.
    #[error("guest trapped: {0}")]
    GuestTrapped(String),
}

impl BridgeError {
    /// Status code returned to the guest for this failure.
    pub fn to_error_code(&self) -> i32 {
        match self {
            Self::SizeMismatch { .. } => ErrorCode::SizeMismatch as i32,
            Self::AllocationFailed { .. } => ErrorCode::AllocationFailed as i32,
            Self::Host(err) => err.to_error_code(),
            Self::BadPointer { .. } => ErrorCode::BadPointer as i32,
            _ => ErrorCode::Internal as i32,
        }
    }
}
