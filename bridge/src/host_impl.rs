//! Per-instance state held in the Wasmtime Store.
//!
//! `HostState` binds one state provider to one VM instance for its whole
//! lifetime, together with the host allocator for result buffers, the
//! store's resource limits, and the call trace.

use wasmtime::{StoreLimits, StoreLimitsBuilder};

use crate::config::BridgeConfig;
use crate::error::BridgeError;
use crate::memory::{HostAllocator, PAGE_SIZE};

/// One callback invocation as seen by the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallRecord {
    /// Import name of the callback, e.g. `"get_balance"`.
    pub callback: &'static str,
    /// Status code returned to the guest.
    pub code: i32,
}

/// Per-instance state held in the Wasmtime `Store`.
pub struct HostState<H> {
    /// The bound state provider.
    pub host: H,
    /// Host-side bump allocator for guest memory.
    pub host_alloc: HostAllocator,
    /// Memory limits enforced by the store.
    pub limits: StoreLimits,
    trace: Option<Vec<CallRecord>>,
    last_error: Option<BridgeError>,
}

impl<H> HostState<H> {
    /// Bind `host` for a new instance.
    pub fn new(host: H, config: &BridgeConfig) -> Self {
        let limits = StoreLimitsBuilder::new()
            .memory_size(config.max_memory_pages as usize * PAGE_SIZE)
            .build();
        Self {
            host,
            // Initialized empty; the runtime reserves the real region after instantiation
            host_alloc: HostAllocator::new(0, 0),
            limits,
            trace: config.enable_call_trace.then(Vec::new),
            last_error: None,
        }
    }

    /// Record the outcome of a callback and return its status code.
    pub fn finish(&mut self, callback: &'static str, result: Result<(), BridgeError>) -> i32 {
        let code = match result {
            Ok(()) => 0,
            Err(err) => {
                let code = err.to_error_code();
                self.last_error = Some(err);
                code
            }
        };
        if let Some(trace) = self.trace.as_mut() {
            trace.push(CallRecord { callback, code });
        }
        code
    }

    /// Callbacks in invocation order. Empty unless tracing is enabled.
    pub fn call_trace(&self) -> &[CallRecord] {
        self.trace.as_deref().unwrap_or(&[])
    }

    /// The most recent callback failure, with provider errors unchanged.
    pub fn last_error(&self) -> Option<&BridgeError> {
        self.last_error.as_ref()
    }

    pub fn take_last_error(&mut self) -> Option<BridgeError> {
        self.last_error.take()
    }
}
