//! Byte results crossing the VM/host boundary.
//!
//! A provider hands byte results back as a [`HostBuffer`]: either storage
//! that is already pinned (`Stable`) or an ordinary growable buffer that may
//! be reallocated (`Relocatable`). The bridge only ever returns a
//! [`StableBuffer`] to the native side.

use core::ops::Deref;

use bytes::{Bytes, BytesMut};

/// A byte result produced by a state provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostBuffer {
    /// Reference-counted, immutable storage. Never moves while referenced.
    Stable(Bytes),
    /// Growable heap storage with a read position. Only the bytes after the
    /// read position (`remaining`) are the value.
    Relocatable(BytesMut),
}

impl HostBuffer {
    /// An empty, already stable buffer.
    pub fn empty() -> Self {
        Self::Stable(Bytes::new())
    }

    /// Wrap pinned storage.
    pub fn stable(data: impl Into<Bytes>) -> Self {
        Self::Stable(data.into())
    }

    /// Copy `data` into a fresh relocatable buffer.
    pub fn relocatable(data: &[u8]) -> Self {
        Self::Relocatable(BytesMut::from(data))
    }

    /// True if the storage is already boundary-stable.
    pub fn is_stable(&self) -> bool {
        matches!(self, Self::Stable(_))
    }

    /// The bytes between the read position and the end.
    pub fn remaining(&self) -> &[u8] {
        match self {
            Self::Stable(b) => &b[..],
            Self::Relocatable(b) => &b[..],
        }
    }

    /// Number of remaining bytes.
    pub fn len(&self) -> usize {
        self.remaining().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Bytes> for HostBuffer {
    fn from(bytes: Bytes) -> Self {
        Self::Stable(bytes)
    }
}

impl From<BytesMut> for HostBuffer {
    fn from(bytes: BytesMut) -> Self {
        Self::Relocatable(bytes)
    }
}

/// Boundary-stable bytes: the storage does not move or get reclaimed while
/// any clone of this buffer is alive.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StableBuffer(Bytes);

impl StableBuffer {
    /// Wrap storage that is already pinned. No copy.
    pub fn from_pinned(bytes: Bytes) -> Self {
        Self(bytes)
    }

    /// Address of the first byte. Stable for the lifetime of the buffer.
    pub fn as_ptr(&self) -> *const u8 {
        self.0.as_ptr()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    /// Release the underlying shared storage.
    pub fn into_bytes(self) -> Bytes {
        self.0
    }
}

impl Deref for StableBuffer {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl AsRef<[u8]> for StableBuffer {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl PartialEq<[u8]> for StableBuffer {
    fn eq(&self, other: &[u8]) -> bool {
        self.as_slice() == other
    }
}
