//! Host function registration via Wasmtime linker.
//!
//! Registers every `evmc_host` callback with the Wasmtime `Linker`.
//! Each function:
//! 1. Extracts memory and `HostState` from the Caller
//! 2. Copies input arguments out of linear memory
//! 3. Validates every output location
//! 4. Calls the matching dispatch shim (and through it, the provider)
//! 5. Writes results and returns an i32 status code (0 = OK)
//!
//! Nothing is written to guest memory when a callback fails.

use wasmtime::{Caller, Linker, Memory};

use vmhost_hostapi::HostContext;
use vmhost_primitives::{encode_tx_context, HASH_LEN};

use crate::dispatch;
use crate::error::BridgeError;
use crate::host_impl::HostState;
use crate::memory;

/// Import module name for all host callbacks.
pub const HOST_MODULE: &str = "evmc_host";

/// Wasm parameter type of a host callback argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Param {
    I32,
    I64,
}

/// Name and parameter list of one host callback. Every callback returns one i32.
#[derive(Debug, Clone, Copy)]
pub struct HostFunction {
    pub name: &'static str,
    pub params: &'static [Param],
}

const fn host_fn(name: &'static str, params: &'static [Param]) -> HostFunction {
    HostFunction { name, params }
}

use Param::{I32, I64};

/// The full `evmc_host` import surface.
pub const HOST_FUNCTIONS: &[HostFunction] = &[
    host_fn("account_exists", &[I32, I32, I32]),
    host_fn("get_storage", &[I32, I32, I32, I32, I32, I32]),
    host_fn("set_storage", &[I32, I32, I32, I32, I32, I32, I32]),
    host_fn("get_balance", &[I32, I32, I32, I32]),
    host_fn("get_code_size", &[I32, I32, I32]),
    host_fn("get_code_hash", &[I32, I32, I32, I32]),
    host_fn("copy_code", &[I32, I32, I32, I32]),
    host_fn("selfdestruct", &[I32, I32, I32, I32]),
    host_fn("call", &[I32, I32, I32, I32]),
    host_fn("get_tx_context", &[I32, I32]),
    host_fn("get_block_hash", &[I64, I32, I32]),
    host_fn("emit_log", &[I32, I32, I32, I32, I32, I32]),
    host_fn("host_free", &[I32, I32]),
];

type HostCaller<'a, H> = Caller<'a, HostState<H>>;

/// Get the guest's exported memory from a Caller.
fn get_memory<H>(caller: &mut HostCaller<'_, H>) -> Result<Memory, BridgeError> {
    caller
        .get_export("memory")
        .and_then(|e| e.into_memory())
        .ok_or_else(|| BridgeError::MemoryError("no memory export".into()))
}

fn read_arg<H: 'static>(
    caller: &HostCaller<'_, H>,
    mem: &Memory,
    ptr: i32,
    len: i32,
) -> Result<Vec<u8>, BridgeError> {
    memory::read_bytes(mem.data(caller), ptr, len)
}

fn check_out<H: 'static>(
    caller: &HostCaller<'_, H>,
    mem: &Memory,
    ptr: i32,
    len: i32,
) -> Result<(), BridgeError> {
    memory::validate_range(mem.data_size(caller), ptr, len)
}

/// Validate a caller-provided 32-byte output slot.
fn check_word_out<H: 'static>(
    caller: &HostCaller<'_, H>,
    mem: &Memory,
    out_ptr: i32,
    out_len: i32,
) -> Result<(), BridgeError> {
    check_out(caller, mem, out_ptr, out_len)?;
    if out_len as usize != HASH_LEN {
        return Err(BridgeError::SizeMismatch {
            field: "out",
            expected: HASH_LEN,
            got: out_len as usize,
        });
    }
    Ok(())
}

fn write_out<H: 'static>(
    caller: &mut HostCaller<'_, H>,
    mem: &Memory,
    ptr: i32,
    data: &[u8],
) -> Result<(), BridgeError> {
    memory::write_bytes(mem.data_mut(&mut *caller), ptr, data)
}

/// Copy `data` into the host allocation region and report its location
/// through `out_ptr_ptr` / `out_len_ptr`.
///
/// The region grows on demand; growth past the store limit is an
/// allocation failure.
fn write_host_alloc<H: 'static>(
    caller: &mut HostCaller<'_, H>,
    mem: &Memory,
    data: &[u8],
    out_ptr_ptr: i32,
    out_len_ptr: i32,
) -> Result<(), BridgeError> {
    let alloc_failed = || BridgeError::AllocationFailed { len: data.len() };
    let len = i32::try_from(data.len()).map_err(|_| alloc_failed())?;

    let plan = caller
        .data()
        .host_alloc
        .plan(data.len(), mem.data_size(&*caller));
    let ptr = i32::try_from(plan.ptr).map_err(|_| alloc_failed())?;
    if plan.grow_pages > 0 {
        mem.grow(&mut *caller, plan.grow_pages)
            .map_err(|_| alloc_failed())?;
    }

    let guest = mem.data_mut(&mut *caller);
    memory::write_bytes(guest, ptr, data)?;
    memory::write_i32(guest, out_ptr_ptr, ptr)?;
    memory::write_i32(guest, out_len_ptr, len)?;

    caller.data_mut().host_alloc.commit(&plan);
    Ok(())
}

/// Register all `evmc_host` functions with the linker.
pub fn register_host_functions<H: HostContext + 'static>(
    linker: &mut Linker<HostState<H>>,
) -> Result<(), BridgeError> {
    register_account_exists(linker)?;
    register_get_storage(linker)?;
    register_set_storage(linker)?;
    register_get_balance(linker)?;
    register_get_code_size(linker)?;
    register_get_code_hash(linker)?;
    register_copy_code(linker)?;
    register_selfdestruct(linker)?;
    register_call(linker)?;
    register_get_tx_context(linker)?;
    register_get_block_hash(linker)?;
    register_emit_log(linker)?;
    register_host_free(linker)?;
    Ok(())
}

// ── Account queries ──

fn register_account_exists<H: HostContext + 'static>(
    linker: &mut Linker<HostState<H>>,
) -> Result<(), BridgeError> {
    linker.func_wrap(
        HOST_MODULE,
        "account_exists",
        |mut caller: HostCaller<'_, H>, addr_ptr: i32, addr_len: i32, out_ptr: i32| -> i32 {
            let result = account_exists_impl(&mut caller, addr_ptr, addr_len, out_ptr);
            caller.data_mut().finish("account_exists", result)
        },
    )?;
    Ok(())
}

fn account_exists_impl<H: HostContext + 'static>(
    caller: &mut HostCaller<'_, H>,
    addr_ptr: i32,
    addr_len: i32,
    out_ptr: i32,
) -> Result<(), BridgeError> {
    let mem = get_memory(caller)?;
    let address = read_arg(caller, &mem, addr_ptr, addr_len)?;
    check_out(caller, &mem, out_ptr, 4)?;

    let exists = dispatch::account_exists(&caller.data().host, &address)?;
    memory::write_i32(mem.data_mut(&mut *caller), out_ptr, exists as i32)
}

fn register_get_balance<H: HostContext + 'static>(
    linker: &mut Linker<HostState<H>>,
) -> Result<(), BridgeError> {
    linker.func_wrap(
        HOST_MODULE,
        "get_balance",
        |mut caller: HostCaller<'_, H>,
         addr_ptr: i32,
         addr_len: i32,
         out_ptr: i32,
         out_len: i32|
         -> i32 {
            let result = get_balance_impl(&mut caller, addr_ptr, addr_len, out_ptr, out_len);
            caller.data_mut().finish("get_balance", result)
        },
    )?;
    Ok(())
}

fn get_balance_impl<H: HostContext + 'static>(
    caller: &mut HostCaller<'_, H>,
    addr_ptr: i32,
    addr_len: i32,
    out_ptr: i32,
    out_len: i32,
) -> Result<(), BridgeError> {
    let mem = get_memory(caller)?;
    let address = read_arg(caller, &mem, addr_ptr, addr_len)?;
    check_word_out(caller, &mem, out_ptr, out_len)?;

    let balance = dispatch::get_balance(&caller.data().host, &address)?;
    write_out(caller, &mem, out_ptr, balance.as_bytes())
}

fn register_get_code_size<H: HostContext + 'static>(
    linker: &mut Linker<HostState<H>>,
) -> Result<(), BridgeError> {
    linker.func_wrap(
        HOST_MODULE,
        "get_code_size",
        |mut caller: HostCaller<'_, H>, addr_ptr: i32, addr_len: i32, out_ptr: i32| -> i32 {
            let result = get_code_size_impl(&mut caller, addr_ptr, addr_len, out_ptr);
            caller.data_mut().finish("get_code_size", result)
        },
    )?;
    Ok(())
}

fn get_code_size_impl<H: HostContext + 'static>(
    caller: &mut HostCaller<'_, H>,
    addr_ptr: i32,
    addr_len: i32,
    out_ptr: i32,
) -> Result<(), BridgeError> {
    let mem = get_memory(caller)?;
    let address = read_arg(caller, &mem, addr_ptr, addr_len)?;
    check_out(caller, &mem, out_ptr, 8)?;

    let size = dispatch::get_code_size(&caller.data().host, &address)?;
    write_out(caller, &mem, out_ptr, &size.to_le_bytes())
}

fn register_get_code_hash<H: HostContext + 'static>(
    linker: &mut Linker<HostState<H>>,
) -> Result<(), BridgeError> {
    linker.func_wrap(
        HOST_MODULE,
        "get_code_hash",
        |mut caller: HostCaller<'_, H>,
         addr_ptr: i32,
         addr_len: i32,
         out_ptr: i32,
         out_len: i32|
         -> i32 {
            let result = get_code_hash_impl(&mut caller, addr_ptr, addr_len, out_ptr, out_len);
            caller.data_mut().finish("get_code_hash", result)
        },
    )?;
    Ok(())
}

fn get_code_hash_impl<H: HostContext + 'static>(
    caller: &mut HostCaller<'_, H>,
    addr_ptr: i32,
    addr_len: i32,
    out_ptr: i32,
    out_len: i32,
) -> Result<(), BridgeError> {
    let mem = get_memory(caller)?;
    let address = read_arg(caller, &mem, addr_ptr, addr_len)?;
    check_word_out(caller, &mem, out_ptr, out_len)?;

    let hash = dispatch::get_code_hash(&caller.data().host, &address)?;
    write_out(caller, &mem, out_ptr, hash.as_bytes())
}

fn register_copy_code<H: HostContext + 'static>(
    linker: &mut Linker<HostState<H>>,
) -> Result<(), BridgeError> {
    linker.func_wrap(
        HOST_MODULE,
        "copy_code",
        |mut caller: HostCaller<'_, H>,
         addr_ptr: i32,
         addr_len: i32,
         out_ptr_ptr: i32,
         out_len_ptr: i32|
         -> i32 {
            let result = copy_code_impl(&mut caller, addr_ptr, addr_len, out_ptr_ptr, out_len_ptr);
            caller.data_mut().finish("copy_code", result)
        },
    )?;
    Ok(())
}

fn copy_code_impl<H: HostContext + 'static>(
    caller: &mut HostCaller<'_, H>,
    addr_ptr: i32,
    addr_len: i32,
    out_ptr_ptr: i32,
    out_len_ptr: i32,
) -> Result<(), BridgeError> {
    let mem = get_memory(caller)?;
    let address = read_arg(caller, &mem, addr_ptr, addr_len)?;
    check_out(caller, &mem, out_ptr_ptr, 4)?;
    check_out(caller, &mem, out_len_ptr, 4)?;

    let code = dispatch::copy_code(&caller.data().host, &address)?;
    write_host_alloc(caller, &mem, &code, out_ptr_ptr, out_len_ptr)
}

// ── Storage ──

fn register_get_storage<H: HostContext + 'static>(
    linker: &mut Linker<HostState<H>>,
) -> Result<(), BridgeError> {
    linker.func_wrap(
        HOST_MODULE,
        "get_storage",
        |mut caller: HostCaller<'_, H>,
         addr_ptr: i32,
         addr_len: i32,
         key_ptr: i32,
         key_len: i32,
         out_ptr: i32,
         out_len: i32|
         -> i32 {
            let result = get_storage_impl(
                &mut caller, addr_ptr, addr_len, key_ptr, key_len, out_ptr, out_len,
            );
            caller.data_mut().finish("get_storage", result)
        },
    )?;
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn get_storage_impl<H: HostContext + 'static>(
    caller: &mut HostCaller<'_, H>,
    addr_ptr: i32,
    addr_len: i32,
    key_ptr: i32,
    key_len: i32,
    out_ptr: i32,
    out_len: i32,
) -> Result<(), BridgeError> {
    let mem = get_memory(caller)?;
    let address = read_arg(caller, &mem, addr_ptr, addr_len)?;
    let key = read_arg(caller, &mem, key_ptr, key_len)?;
    check_word_out(caller, &mem, out_ptr, out_len)?;

    let value = dispatch::get_storage(&caller.data().host, &address, &key)?;
    write_out(caller, &mem, out_ptr, value.as_bytes())
}

fn register_set_storage<H: HostContext + 'static>(
    linker: &mut Linker<HostState<H>>,
) -> Result<(), BridgeError> {
    linker.func_wrap(
        HOST_MODULE,
        "set_storage",
        |mut caller: HostCaller<'_, H>,
         addr_ptr: i32,
         addr_len: i32,
         key_ptr: i32,
         key_len: i32,
         val_ptr: i32,
         val_len: i32,
         out_status_ptr: i32|
         -> i32 {
            let result = set_storage_impl(
                &mut caller,
                (addr_ptr, addr_len),
                (key_ptr, key_len),
                (val_ptr, val_len),
                out_status_ptr,
            );
            caller.data_mut().finish("set_storage", result)
        },
    )?;
    Ok(())
}

fn set_storage_impl<H: HostContext + 'static>(
    caller: &mut HostCaller<'_, H>,
    address: (i32, i32),
    key: (i32, i32),
    value: (i32, i32),
    out_status_ptr: i32,
) -> Result<(), BridgeError> {
    let mem = get_memory(caller)?;
    let address = read_arg(caller, &mem, address.0, address.1)?;
    let key = read_arg(caller, &mem, key.0, key.1)?;
    let value = read_arg(caller, &mem, value.0, value.1)?;
    check_out(caller, &mem, out_status_ptr, 4)?;

    let status = dispatch::set_storage(&mut caller.data_mut().host, &address, &key, &value)?;
    memory::write_i32(mem.data_mut(&mut *caller), out_status_ptr, status.code())
}

// ── Notifications ──

fn register_selfdestruct<H: HostContext + 'static>(
    linker: &mut Linker<HostState<H>>,
) -> Result<(), BridgeError> {
    linker.func_wrap(
        HOST_MODULE,
        "selfdestruct",
        |mut caller: HostCaller<'_, H>,
         addr_ptr: i32,
         addr_len: i32,
         ben_ptr: i32,
         ben_len: i32|
         -> i32 {
            let result = selfdestruct_impl(&mut caller, addr_ptr, addr_len, ben_ptr, ben_len);
            caller.data_mut().finish("selfdestruct", result)
        },
    )?;
    Ok(())
}

fn selfdestruct_impl<H: HostContext + 'static>(
    caller: &mut HostCaller<'_, H>,
    addr_ptr: i32,
    addr_len: i32,
    ben_ptr: i32,
    ben_len: i32,
) -> Result<(), BridgeError> {
    let mem = get_memory(caller)?;
    let address = read_arg(caller, &mem, addr_ptr, addr_len)?;
    let beneficiary = read_arg(caller, &mem, ben_ptr, ben_len)?;
    dispatch::selfdestruct(&mut caller.data_mut().host, &address, &beneficiary)
}

fn register_emit_log<H: HostContext + 'static>(
    linker: &mut Linker<HostState<H>>,
) -> Result<(), BridgeError> {
    linker.func_wrap(
        HOST_MODULE,
        "emit_log",
        |mut caller: HostCaller<'_, H>,
         addr_ptr: i32,
         addr_len: i32,
         data_ptr: i32,
         data_len: i32,
         topics_ptr: i32,
         topic_count: i32|
         -> i32 {
            let result = emit_log_impl(
                &mut caller,
                (addr_ptr, addr_len),
                (data_ptr, data_len),
                topics_ptr,
                topic_count,
            );
            caller.data_mut().finish("emit_log", result)
        },
    )?;
    Ok(())
}

fn emit_log_impl<H: HostContext + 'static>(
    caller: &mut HostCaller<'_, H>,
    address: (i32, i32),
    data: (i32, i32),
    topics_ptr: i32,
    topic_count: i32,
) -> Result<(), BridgeError> {
    let mem = get_memory(caller)?;
    let address = read_arg(caller, &mem, address.0, address.1)?;
    let data = read_arg(caller, &mem, data.0, data.1)?;
    let topics = memory::read_words(mem.data(&*caller), topics_ptr, topic_count)?;

    dispatch::emit_log_packed(
        &mut caller.data_mut().host,
        &address,
        &data,
        &topics,
        topic_count as usize,
    )
}

// ── Sub-calls ──

fn register_call<H: HostContext + 'static>(
    linker: &mut Linker<HostState<H>>,
) -> Result<(), BridgeError> {
    linker.func_wrap(
        HOST_MODULE,
        "call",
        |mut caller: HostCaller<'_, H>,
         msg_ptr: i32,
         msg_len: i32,
         out_ptr_ptr: i32,
         out_len_ptr: i32|
         -> i32 {
            let result = call_impl(&mut caller, msg_ptr, msg_len, out_ptr_ptr, out_len_ptr);
            caller.data_mut().finish("call", result)
        },
    )?;
    Ok(())
}

fn call_impl<H: HostContext + 'static>(
    caller: &mut HostCaller<'_, H>,
    msg_ptr: i32,
    msg_len: i32,
    out_ptr_ptr: i32,
    out_len_ptr: i32,
) -> Result<(), BridgeError> {
    let mem = get_memory(caller)?;
    let message = read_arg(caller, &mem, msg_ptr, msg_len)?;
    check_out(caller, &mem, out_ptr_ptr, 4)?;
    check_out(caller, &mem, out_len_ptr, 4)?;

    let output = dispatch::call(&mut caller.data_mut().host, &message)?;
    write_host_alloc(caller, &mem, &output, out_ptr_ptr, out_len_ptr)
}

// ── Context ──

fn register_get_tx_context<H: HostContext + 'static>(
    linker: &mut Linker<HostState<H>>,
) -> Result<(), BridgeError> {
    linker.func_wrap(
        HOST_MODULE,
        "get_tx_context",
        |mut caller: HostCaller<'_, H>, out_ptr_ptr: i32, out_len_ptr: i32| -> i32 {
            let result = get_tx_context_impl(&mut caller, out_ptr_ptr, out_len_ptr);
            caller.data_mut().finish("get_tx_context", result)
        },
    )?;
    Ok(())
}

fn get_tx_context_impl<H: HostContext + 'static>(
    caller: &mut HostCaller<'_, H>,
    out_ptr_ptr: i32,
    out_len_ptr: i32,
) -> Result<(), BridgeError> {
    let mem = get_memory(caller)?;
    check_out(caller, &mem, out_ptr_ptr, 4)?;
    check_out(caller, &mem, out_len_ptr, 4)?;

    let context = dispatch::get_tx_context(&caller.data().host)?;
    let encoded = encode_tx_context(&context);
    write_host_alloc(caller, &mem, &encoded, out_ptr_ptr, out_len_ptr)
}

fn register_get_block_hash<H: HostContext + 'static>(
    linker: &mut Linker<HostState<H>>,
) -> Result<(), BridgeError> {
    linker.func_wrap(
        HOST_MODULE,
        "get_block_hash",
        |mut caller: HostCaller<'_, H>, number: i64, out_ptr: i32, out_len: i32| -> i32 {
            let result = get_block_hash_impl(&mut caller, number, out_ptr, out_len);
            caller.data_mut().finish("get_block_hash", result)
        },
    )?;
    Ok(())
}

fn get_block_hash_impl<H: HostContext + 'static>(
    caller: &mut HostCaller<'_, H>,
    number: i64,
    out_ptr: i32,
    out_len: i32,
) -> Result<(), BridgeError> {
    let mem = get_memory(caller)?;
    check_word_out(caller, &mem, out_ptr, out_len)?;

    let hash = dispatch::get_block_hash(&caller.data().host, number)?;
    write_out(caller, &mem, out_ptr, hash.as_bytes())
}

// ── Memory management ──

fn register_host_free<H: HostContext + 'static>(
    linker: &mut Linker<HostState<H>>,
) -> Result<(), BridgeError> {
    linker.func_wrap(
        HOST_MODULE,
        "host_free",
        |mut caller: HostCaller<'_, H>, ptr: i32, len: i32| -> i32 {
            let result = host_free_impl(&mut caller, ptr, len);
            caller.data_mut().finish("host_free", result)
        },
    )?;
    Ok(())
}

/// Reclaim the most recent host allocation. Freeing any other buffer is
/// accepted and leaves it in place until the instance is dropped.
fn host_free_impl<H>(caller: &mut HostCaller<'_, H>, ptr: i32, len: i32) -> Result<(), BridgeError> {
    if ptr < 0 || len < 0 {
        return Err(BridgeError::BadPointer {
            ptr,
            len: len as i64,
        });
    }
    caller
        .data_mut()
        .host_alloc
        .release(ptr as usize, len as usize);
    Ok(())
}
