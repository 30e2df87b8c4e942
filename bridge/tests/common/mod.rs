//! Shared test helpers for integration tests.
//!
//! Provides deterministic addresses, a trampoline guest that re-exports
//! every host import, fixed guest memory offsets, and a provider that
//! fails every call.

#![allow(dead_code)]

use vmhost_bridge::linker::{Param, HOST_FUNCTIONS};
use vmhost_bridge::{BridgeConfig, HostedVm, VmInstance, HOST_MODULE};
use vmhost_hostapi::{HostContext, HostError, MemHost};
use vmhost_primitives::{Address, ErrorCode, Hash32, HostBuffer, StorageStatus, TxContext};

// ── Guest memory layout (page 0) ──

pub const ADDR_PTR: i32 = 0x100;
pub const ADDR2_PTR: i32 = 0x140;
pub const KEY_PTR: i32 = 0x200;
pub const VAL_PTR: i32 = 0x300;
pub const OUT_PTR: i32 = 0x400;
pub const OUT_PTR_PTR: i32 = 0x500;
pub const OUT_LEN_PTR: i32 = 0x504;
pub const DATA_PTR: i32 = 0x600;
pub const TOPICS_PTR: i32 = 0x800;

/// A pointer beyond every page of guest memory.
pub const OUT_OF_BOUNDS: i32 = 65_536 * 64;

// ── Addresses ──

pub fn addr(seed: u8) -> Address {
    Address::new([seed; 20])
}

/// Alice: a funded account with code.
pub fn alice() -> Address {
    addr(0xA1)
}

pub fn bob() -> Address {
    addr(0xB0)
}

pub fn word(v: u64) -> Hash32 {
    Hash32::from_u64(v)
}

// ── Guest ──

fn wat_type(p: &Param) -> &'static str {
    match p {
        Param::I32 => "i32",
        Param::I64 => "i64",
    }
}

/// A guest that imports every host callback and re-exports each one under
/// the same name, forwarding its arguments unchanged. Also exports `spin`,
/// which loops forever.
pub fn trampoline_wat() -> String {
    let mut imports = String::new();
    let mut exports = String::new();
    for f in HOST_FUNCTIONS {
        let params: Vec<&str> = f.params.iter().map(wat_type).collect();
        let params = params.join(" ");
        imports.push_str(&format!(
            "(import \"{}\" \"{}\" (func ${} (param {}) (result i32)))\n",
            HOST_MODULE, f.name, f.name, params
        ));
        let args: String = (0..f.params.len())
            .map(|i| format!("local.get {} ", i))
            .collect();
        exports.push_str(&format!(
            "(func (export \"{}\") (param {}) (result i32) {}call ${})\n",
            f.name, params, args, f.name
        ));
    }
    format!(
        "(module\n{}(memory (export \"memory\") 1)\n{}(func (export \"spin\") (loop br 0))\n)",
        imports, exports
    )
}

/// Compile the trampoline guest with the given config.
pub fn load_vm_with(config: BridgeConfig) -> HostedVm {
    HostedVm::new(trampoline_wat().as_bytes(), config, &["get_balance", "spin"]).unwrap()
}

/// Compile the trampoline guest with call tracing enabled.
pub fn load_vm() -> HostedVm {
    load_vm_with(BridgeConfig {
        enable_call_trace: true,
        ..BridgeConfig::default()
    })
}

pub fn instance<H: HostContext + 'static>(host: H) -> VmInstance<H> {
    load_vm().instantiate(host).unwrap()
}

/// Read the `(ptr, len)` pair a host-allocating callback wrote.
pub fn read_out_pair<H: HostContext + 'static>(vm: &VmInstance<H>) -> (i32, i32) {
    let ptr = vm.read_memory(OUT_PTR_PTR, 4).unwrap();
    let len = vm.read_memory(OUT_LEN_PTR, 4).unwrap();
    (
        i32::from_le_bytes(ptr.try_into().unwrap()),
        i32::from_le_bytes(len.try_into().unwrap()),
    )
}

// ── Providers ──

/// A provider with Alice funded, holding code, and one storage slot.
pub fn funded_host() -> MemHost {
    let mut host = MemHost::new();
    host.set_balance(&alice(), word(1));
    host.set_code(&alice(), &b"\x60\x00\x60\x00\xf3"[..]);
    host.insert_storage(&alice(), word(1), word(42));
    host
}

pub fn sample_tx_context() -> TxContext {
    TxContext {
        gas_price: word(7),
        origin: alice(),
        coinbase: bob(),
        block_number: 19_000_000,
        block_timestamp: 1_700_000_000,
        block_gas_limit: 30_000_000,
        prev_randao: word(0xABCD),
        chain_id: word(1),
        base_fee: word(12),
        blob_base_fee: word(1),
    }
}

/// A provider whose backing store is unreachable.
pub struct OfflineHost;

fn offline() -> HostError {
    HostError::provider("backend offline")
}

impl HostContext for OfflineHost {
    fn account_exists(&self, _: &Address) -> Result<bool, HostError> {
        Err(offline())
    }
    fn get_balance(&self, _: &Address) -> Result<Hash32, HostError> {
        Err(offline())
    }
    fn get_storage(&self, _: &Address, _: &Hash32) -> Result<Hash32, HostError> {
        Err(offline())
    }
    fn set_storage(&mut self, _: &Address, _: &Hash32, _: &Hash32) -> Result<StorageStatus, HostError> {
        Err(offline())
    }
    fn get_code_size(&self, _: &Address) -> Result<u64, HostError> {
        Err(offline())
    }
    fn get_code_hash(&self, _: &Address) -> Result<Hash32, HostError> {
        Err(offline())
    }
    fn get_code(&self, _: &Address) -> Result<HostBuffer, HostError> {
        Err(offline())
    }
    fn selfdestruct(&mut self, _: &Address, _: &Address) -> Result<(), HostError> {
        Err(offline())
    }
    fn call(&mut self, _: &[u8]) -> Result<HostBuffer, HostError> {
        Err(offline())
    }
    fn get_tx_context(&self) -> Result<TxContext, HostError> {
        Err(offline())
    }
    fn get_block_hash(&self, _: i64) -> Result<Hash32, HostError> {
        Err(offline())
    }
    fn emit_log(&mut self, _: &Address, _: &[u8], _: &[Hash32]) -> Result<(), HostError> {
        Err(offline())
    }
}

/// A provider that fails every call with one fixed wire code.
pub struct CodeHost(pub ErrorCode);

impl CodeHost {
    fn fail<T>(&self) -> Result<T, HostError> {
        Err(HostError::Code(self.0))
    }
}

impl HostContext for CodeHost {
    fn account_exists(&self, _: &Address) -> Result<bool, HostError> {
        self.fail()
    }
    fn get_balance(&self, _: &Address) -> Result<Hash32, HostError> {
        self.fail()
    }
    fn get_storage(&self, _: &Address, _: &Hash32) -> Result<Hash32, HostError> {
        self.fail()
    }
    fn set_storage(&mut self, _: &Address, _: &Hash32, _: &Hash32) -> Result<StorageStatus, HostError> {
        self.fail()
    }
    fn get_code_size(&self, _: &Address) -> Result<u64, HostError> {
        self.fail()
    }
    fn get_code_hash(&self, _: &Address) -> Result<Hash32, HostError> {
        self.fail()
    }
    fn get_code(&self, _: &Address) -> Result<HostBuffer, HostError> {
        self.fail()
    }
    fn selfdestruct(&mut self, _: &Address, _: &Address) -> Result<(), HostError> {
        self.fail()
    }
    fn call(&mut self, _: &[u8]) -> Result<HostBuffer, HostError> {
        self.fail()
    }
    fn get_tx_context(&self) -> Result<TxContext, HostError> {
        self.fail()
    }
    fn get_block_hash(&self, _: i64) -> Result<Hash32, HostError> {
        self.fail()
    }
    fn emit_log(&mut self, _: &Address, _: &[u8], _: &[Hash32]) -> Result<(), HostError> {
        self.fail()
    }
}
