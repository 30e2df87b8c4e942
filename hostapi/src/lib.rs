//! `vmhost-hostapi`: the state provider side of the VM host bridge.
//!
//! This crate defines the capability interface a state provider implements
//! to serve a hosted VM. It provides:
//!
//! - `HostContext` trait: one method per host callback
//! - `HostError`: provider error type with `ErrorCode` conversion
//! - `MemHost`: in-memory `HostContext` for testing
//!
//! Value types (`Address`, `Hash32`, `StorageStatus`, `TxContext`, ...) come
//! from `vmhost-primitives`.

pub mod error;
pub mod traits;
pub mod mem_host;

// Re-export commonly used types at the crate root.
pub use error::HostError;
pub use traits::HostContext;
pub use mem_host::{Account, MemHost, SelfDestruct};
