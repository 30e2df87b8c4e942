//! `vmhost-bridge`: binds a state provider to a VM through host callbacks.
//!
//! The bridge sits between a VM and a [`HostContext`](vmhost_hostapi::HostContext)
//! implementation. It has two surfaces over the same dispatch shims:
//!
//! - **Rust:** [`dispatch`] takes raw byte arguments, checks fixed widths,
//!   and forwards to the provider.
//! - **Guest:** [`HostedVm`] runs a WASM guest inside Wasmtime and exposes
//!   every callback as an `evmc_host` import returning an i32 status code.
//!
//! Byte results always reach the caller as boundary-stable storage; see
//! [`ensure_stable`].

pub mod error;
pub mod config;
pub mod memory;
pub mod buffer;
pub mod dispatch;
pub mod host_impl;
pub mod validation;
pub mod linker;
pub mod runtime;

pub use buffer::ensure_stable;
pub use config::BridgeConfig;
pub use error::BridgeError;
pub use host_impl::{CallRecord, HostState};
pub use linker::HOST_MODULE;
pub use runtime::{HostedVm, VmInstance};
