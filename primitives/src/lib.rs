//! `vmhost-primitives`: value types shared by the VM host bridge.
//!
//! This crate provides the fixed-width values that cross the boundary
//! between a hosted VM and its state provider, the stable wire tables
//! (`ErrorCode`, `StorageStatus`), the transaction context snapshot with
//! its fixed encoding, and the buffer types used for byte results.

pub mod types;
pub mod error;
pub mod status;
pub mod context;
pub mod codec;
pub mod buffer;
pub mod log;

// Re-export commonly used types at the crate root for convenience.
pub use types::{Address, Bytes32, Hash32, ADDRESS_LEN, HASH_LEN};
pub use error::{ErrorCode, PrimitiveError};
pub use status::StorageStatus;
pub use context::TxContext;
pub use codec::{decode_tx_context, encode_tx_context, TX_CONTEXT_LEN};
pub use buffer::{HostBuffer, StableBuffer};
pub use log::LogRecord;
