//! Host capability interface: the contract a state provider implements.
//!
//! `HostContext` is the sole extension point of the bridge. The dispatch
//! shims decode raw callback arguments into the value types used here and
//! call exactly one method per callback. Implementations own all policy:
//! caching, locking, retries, ordering, and how state is stored.
//!
//! Pointer and length validation happens in the bridge, not here. This
//! trait works with decoded value types only.

use vmhost_primitives::{Address, Hash32, HostBuffer, StorageStatus, TxContext};

use crate::error::HostError;

/// State access for a hosted VM.
///
/// A provider is bound once per VM instance. The bridge makes no
/// reentrancy or thread-safety assumptions beyond what `&self`/`&mut self`
/// already express.
pub trait HostContext {
    // ── Accounts ──

    /// Whether the account exists in state.
    fn account_exists(&self, address: &Address) -> Result<bool, HostError>;

    /// Balance as a big-endian 256-bit word.
    fn get_balance(&self, address: &Address) -> Result<Hash32, HostError>;

    // ── Storage ──

    /// Current value of a storage slot (zero if never written).
    fn get_storage(&self, address: &Address, key: &Hash32) -> Result<Hash32, HostError>;

    /// Write a storage slot and report the transition it caused.
    ///
    /// This is the only operation with a write outcome; gas accounting on
    /// the VM side depends on the returned status.
    fn set_storage(
        &mut self,
        address: &Address,
        key: &Hash32,
        value: &Hash32,
    ) -> Result<StorageStatus, HostError>;

    // ── Code ──

    /// Length of the account's code in bytes, `0` if it has none.
    fn get_code_size(&self, address: &Address) -> Result<u64, HostError>;

    fn get_code_hash(&self, address: &Address) -> Result<Hash32, HostError>;

    /// Full code body. May be empty, and may be returned as either stable or
    /// relocatable storage.
    fn get_code(&self, address: &Address) -> Result<HostBuffer, HostError>;

    // ── Calls & lifecycle ──

    /// Irreversibly remove `address`, transferring its balance to
    /// `beneficiary`. Write-only notification.
    fn selfdestruct(&mut self, address: &Address, beneficiary: &Address) -> Result<(), HostError>;

    /// Dispatch an opaque sub-call message and return the opaque result.
    fn call(&mut self, message: &[u8]) -> Result<HostBuffer, HostError>;

    // ── Context ──

    fn get_tx_context(&self) -> Result<TxContext, HostError>;

    /// Hash of block `number`.
    fn get_block_hash(&self, number: i64) -> Result<Hash32, HostError>;

    // ── Logs ──

    /// Record an event. `topics` arrive in caller order, duplicates included.
    fn emit_log(&mut self, address: &Address, data: &[u8], topics: &[Hash32]) -> Result<(), HostError>;
}
