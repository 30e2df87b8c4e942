//! Hosted VM runtime: Wasmtime engine, module loading, and instances.
//!
//! `HostedVm` compiles and validates a guest module once. Each
//! [`instantiate`](HostedVm::instantiate) call binds a state provider to a
//! fresh instance, which keeps that provider for its whole lifetime.

use std::path::Path;

use wasmtime::{Config, Engine, Instance, Linker, Memory, Module, Store, Trap, WasmParams, WasmResults};

use vmhost_hostapi::HostContext;

use crate::config::BridgeConfig;
use crate::error::BridgeError;
use crate::host_impl::{CallRecord, HostState};
use crate::linker::register_host_functions;
use crate::memory::{self, HostAllocator, PAGE_SIZE};
use crate::validation::validate_module;

/// A compiled, validated guest module.
pub struct HostedVm {
    engine: Engine,
    module: Module,
    config: BridgeConfig,
}

impl HostedVm {
    /// Compile a guest from WASM bytecode (or WAT text).
    ///
    /// Validates the module's imports, its memory export, and each of
    /// `entry_points` before accepting.
    pub fn new(
        wasm_bytes: &[u8],
        config: BridgeConfig,
        entry_points: &[&str],
    ) -> Result<Self, BridgeError> {
        let engine = create_engine(&config)?;
        let module = Module::new(&engine, wasm_bytes)?;
        validate_module(&module, entry_points)?;
        Ok(Self {
            engine,
            module,
            config,
        })
    }

    /// Load from a `.wasm` file path.
    pub fn from_file(
        path: &Path,
        config: BridgeConfig,
        entry_points: &[&str],
    ) -> Result<Self, BridgeError> {
        let engine = create_engine(&config)?;
        let module = Module::from_file(&engine, path)?;
        validate_module(&module, entry_points)?;
        Ok(Self {
            engine,
            module,
            config,
        })
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Create a fresh instance bound to `host`.
    pub fn instantiate<H: HostContext + 'static>(
        &self,
        host: H,
    ) -> Result<VmInstance<H>, BridgeError> {
        let mut store = Store::new(&self.engine, HostState::new(host, &self.config));
        store.limiter(|state| &mut state.limits);
        store.set_fuel(self.config.fuel_limit)?;

        let mut linker = Linker::new(&self.engine);
        register_host_functions(&mut linker)?;

        let instance = linker.instantiate(&mut store, &self.module)?;
        let wasm_memory = instance
            .get_memory(&mut store, "memory")
            .ok_or_else(|| BridgeError::MemoryError("no memory export".into()))?;

        // Reserve the host allocation region past the guest's own pages
        let alloc_pages = u64::from(self.config.host_alloc_pages);
        let current_pages = wasm_memory
            .grow(&mut store, alloc_pages)
            .map_err(|e| BridgeError::MemoryError(format!("initial grow: {}", e)))?;

        let alloc_base = current_pages as usize * PAGE_SIZE;
        let alloc_capacity = self.config.host_alloc_pages as usize * PAGE_SIZE;
        store.data_mut().host_alloc = HostAllocator::new(alloc_base, alloc_capacity);

        Ok(VmInstance {
            store,
            instance,
            memory: wasm_memory,
        })
    }
}

/// A live guest instance with its bound provider.
pub struct VmInstance<H: 'static> {
    store: Store<HostState<H>>,
    instance: Instance,
    memory: Memory,
}

impl<H: HostContext + 'static> VmInstance<H> {
    /// Call an exported guest function.
    ///
    /// Fuel exhaustion → `BridgeError::FuelExhausted`,
    /// other traps → `BridgeError::GuestTrapped`.
    pub fn call<P, R>(&mut self, name: &str, params: P) -> Result<R, BridgeError>
    where
        P: WasmParams,
        R: WasmResults,
    {
        let func = self.instance.get_typed_func::<P, R>(&mut self.store, name)?;
        handle_trap(func.call(&mut self.store, params))
    }

    /// Copy `data` into the host allocation region and return its guest address.
    ///
    /// Used to place call arguments where the guest can read them.
    pub fn alloc_and_write(&mut self, data: &[u8]) -> Result<i32, BridgeError> {
        let alloc_failed = || BridgeError::AllocationFailed { len: data.len() };
        let plan = self
            .store
            .data()
            .host_alloc
            .plan(data.len(), self.memory.data_size(&self.store));
        let ptr = i32::try_from(plan.ptr).map_err(|_| alloc_failed())?;
        if plan.grow_pages > 0 {
            self.memory
                .grow(&mut self.store, plan.grow_pages)
                .map_err(|_| alloc_failed())?;
        }

        memory::write_bytes(self.memory.data_mut(&mut self.store), ptr, data)?;
        self.store.data_mut().host_alloc.commit(&plan);
        Ok(ptr)
    }

    /// Copy `len` bytes out of guest memory.
    pub fn read_memory(&self, ptr: i32, len: i32) -> Result<Vec<u8>, BridgeError> {
        memory::read_bytes(self.memory.data(&self.store), ptr, len)
    }

    pub fn write_memory(&mut self, ptr: i32, data: &[u8]) -> Result<(), BridgeError> {
        memory::write_bytes(self.memory.data_mut(&mut self.store), ptr, data)
    }

    /// Current guest memory size in bytes.
    pub fn memory_size(&self) -> usize {
        self.memory.data_size(&self.store)
    }

    pub fn fuel_remaining(&self) -> Result<u64, BridgeError> {
        Ok(self.store.get_fuel()?)
    }

    /// The bound provider.
    pub fn host(&self) -> &H {
        &self.store.data().host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.store.data_mut().host
    }

    /// Drop the instance and hand the provider back.
    pub fn into_host(self) -> H {
        self.store.into_data().host
    }

    pub fn call_trace(&self) -> &[CallRecord] {
        self.store.data().call_trace()
    }

    /// The most recent failed callback's error, as the provider returned it.
    pub fn last_error(&self) -> Option<&BridgeError> {
        self.store.data().last_error()
    }

    pub fn take_last_error(&mut self) -> Option<BridgeError> {
        self.store.data_mut().take_last_error()
    }
}

/// Create a Wasmtime engine with deterministic configuration.
fn create_engine(config: &BridgeConfig) -> Result<Engine, BridgeError> {
    let mut wasm_config = Config::new();

    // Fuel metering
    wasm_config.consume_fuel(true);

    // Determinism enforcement
    wasm_config.wasm_threads(false);
    wasm_config.wasm_simd(false);
    wasm_config.wasm_relaxed_simd(false);
    wasm_config.wasm_multi_memory(false);
    wasm_config.cranelift_nan_canonicalization(true);

    let max_bytes = config.max_memory_pages as u64 * PAGE_SIZE as u64;
    wasm_config.memory_guaranteed_dense_image_size(max_bytes.min(16 * 1024 * 1024));

    Ok(Engine::new(&wasm_config)?)
}

/// Convert a guest call failure into a `BridgeError`.
fn handle_trap<R>(result: Result<R, anyhow::Error>) -> Result<R, BridgeError> {
    result.map_err(|e| match e.downcast_ref::<Trap>() {
        Some(Trap::OutOfFuel) => BridgeError::FuelExhausted,
        _ => BridgeError::GuestTrapped(format!("{:#}", e)),
    })
}
