//! Buffer adapter: turn a provider's byte result into boundary-stable bytes.

use bytes::Bytes;
use vmhost_primitives::{HostBuffer, StableBuffer};

use crate::error::BridgeError;

/// Return a boundary-stable view of `input`.
///
/// Stable input is returned as-is, sharing its storage. Relocatable input
/// is copied into a fresh allocation of exactly its remaining length; the
/// input, including its read position, is left untouched.
pub fn ensure_stable(input: &HostBuffer) -> Result<StableBuffer, BridgeError> {
    match input {
        HostBuffer::Stable(bytes) => Ok(StableBuffer::from_pinned(bytes.clone())),
        HostBuffer::Relocatable(bytes) => copy_to_stable(&bytes[..]),
    }
}

fn copy_to_stable(src: &[u8]) -> Result<StableBuffer, BridgeError> {
    let mut out = Vec::new();
    out.try_reserve_exact(src.len())
        .map_err(|_| BridgeError::AllocationFailed { len: src.len() })?;
    out.extend_from_slice(src);
    Ok(StableBuffer::from_pinned(Bytes::from(out)))
}
