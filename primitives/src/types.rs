//! Fixed-width value types crossing the VM/host boundary.
//!
//! `Address` is exactly 20 bytes and `Hash32` exactly 32 bytes. Both are
//! built fresh from caller-supplied bytes on every callback and are never
//! mutated afterwards. Construction from a slice of any other length fails
//! with [`PrimitiveError::SizeMismatch`].

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::error::PrimitiveError;

/// Wire length of an account address.
pub const ADDRESS_LEN: usize = 20;

/// Wire length of a hash, storage key, storage value, or 256-bit word.
pub const HASH_LEN: usize = 32;

macro_rules! fixed_bytes {
    ($(#[$meta:meta])* $name:ident, $len:expr) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
        pub struct $name([u8; $len]);

        impl $name {
            /// Length of the value in bytes.
            pub const LEN: usize = $len;

            /// The all-zero value.
            pub const ZERO: Self = Self([0u8; $len]);

            /// Wrap an owned array.
            pub const fn new(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }

            /// Copy from a slice that must be exactly `LEN` bytes long.
            pub fn from_slice(bytes: &[u8]) -> Result<Self, PrimitiveError> {
                let arr: [u8; $len] = bytes.try_into().map_err(|_| PrimitiveError::SizeMismatch {
                    expected: $len,
                    got: bytes.len(),
                })?;
                Ok(Self(arr))
            }

            /// Borrow the raw bytes.
            pub fn as_bytes(&self) -> &[u8; $len] {
                &self.0
            }

            /// Return the raw bytes by value.
            pub fn to_array(self) -> [u8; $len] {
                self.0
            }

            /// True if every byte is zero.
            pub fn is_zero(&self) -> bool {
                self.0.iter().all(|b| *b == 0)
            }
        }

        impl From<[u8; $len]> for $name {
            fn from(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }
        }

        impl TryFrom<&[u8]> for $name {
            type Error = PrimitiveError;

            fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
                Self::from_slice(bytes)
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("0x")?;
                for byte in &self.0 {
                    write!(f, "{:02x}", byte)?;
                }
                Ok(())
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self)
            }
        }
    };
}

fixed_bytes!(
    /// 20-byte account address. No padding, no endianness transformation.
    Address,
    ADDRESS_LEN
);

fixed_bytes!(
    /// 32-byte word: storage keys and values, code and block hashes, and
    /// 256-bit integers (balances, prices) in big-endian order.
    Hash32,
    HASH_LEN
);

/// Alternate name used for storage keys and values.
pub type Bytes32 = Hash32;

impl Hash32 {
    /// Big-endian 256-bit encoding of a `u64`.
    pub fn from_u64(value: u64) -> Self {
        let mut out = [0u8; HASH_LEN];
        out[HASH_LEN - 8..].copy_from_slice(&value.to_be_bytes());
        Self(out)
    }

    /// Big-endian 256-bit encoding of a `u128`.
    pub fn from_u128(value: u128) -> Self {
        let mut out = [0u8; HASH_LEN];
        out[HASH_LEN - 16..].copy_from_slice(&value.to_be_bytes());
        Self(out)
    }

    /// Add two big-endian 256-bit words. Returns `None` on overflow.
    pub fn checked_add(&self, other: &Hash32) -> Option<Hash32> {
        let mut out = [0u8; HASH_LEN];
        let mut carry = 0u16;
        for i in (0..HASH_LEN).rev() {
            let sum = self.0[i] as u16 + other.0[i] as u16 + carry;
            out[i] = sum as u8;
            carry = sum >> 8;
        }
        if carry != 0 {
            return None;
        }
        Some(Hash32(out))
    }
}
