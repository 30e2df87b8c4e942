//! Bridge configuration.

/// Configuration for a hosted VM instance.
///
/// Controls guest memory limits, instruction fuel, the initial host
/// allocation region, and call tracing.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Maximum linear memory pages (1 page = 64 KiB), host region included.
    /// Default: 256 pages = 16 MiB.
    pub max_memory_pages: u32,

    /// Wasmtime fuel limit (instruction metering).
    /// Prevents a guest from spinning forever between callbacks.
    pub fuel_limit: u64,

    /// Pages reserved for host-allocated result buffers at instantiation.
    /// The region grows on demand past this.
    pub host_alloc_pages: u32,

    /// Whether to record every callback and its status code.
    pub enable_call_trace: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            max_memory_pages: 256,       // 16 MiB
            fuel_limit: 100_000_000,
            host_alloc_pages: 4,         // 256 KiB
            enable_call_trace: false,
        }
    }
}
