//! In-memory state provider for testing.
//!
//! `MemHost` implements `HostContext` using `BTreeMap`s for deterministic
//! ordering. It tracks each storage slot's value at the start of the current
//! transaction so `set_storage` can report the full `StorageStatus`
//! transition, and it records every write-only notification (logs,
//! self-destructs, sub-calls) so tests can observe exactly what the bridge
//! forwarded.

use std::collections::BTreeMap;

use bytes::Bytes;
use vmhost_primitives::{
    Address, Hash32, HostBuffer, LogRecord, StorageStatus, TxContext,
};

use crate::error::HostError;
use crate::traits::HostContext;

/// A single storage slot: value at transaction start and value now.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Slot {
    original: Hash32,
    current: Hash32,
}

/// Account state held by [`MemHost`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Account {
    pub balance: Hash32,
    pub code: Bytes,
    pub code_hash: Hash32,
    storage: BTreeMap<Hash32, Slot>,
}

/// A recorded `selfdestruct` notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelfDestruct {
    pub address: Address,
    pub beneficiary: Address,
}

/// In-memory `HostContext` backed by `BTreeMap`.
#[derive(Debug, Clone, Default)]
pub struct MemHost {
    accounts: BTreeMap<Address, Account>,
    block_hashes: BTreeMap<i64, Hash32>,
    tx_context: TxContext,
    logs: Vec<LogRecord>,
    selfdestructs: Vec<SelfDestruct>,
    calls: Vec<Vec<u8>>,
    call_output: Vec<u8>,
}

impl MemHost {
    /// Create a new empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a provider that reports `tx_context` for every call.
    pub fn with_tx_context(tx_context: TxContext) -> Self {
        Self {
            tx_context,
            ..Self::default()
        }
    }

    fn account_mut(&mut self, address: &Address) -> &mut Account {
        self.accounts.entry(*address).or_default()
    }

    /// Create the account if missing and set its balance.
    pub fn set_balance(&mut self, address: &Address, balance: Hash32) {
        self.account_mut(address).balance = balance;
    }

    /// Create the account if missing and set its code. The code hash is the
    /// BLAKE3 digest of the code.
    pub fn set_code(&mut self, address: &Address, code: impl Into<Bytes>) {
        let code = code.into();
        let code_hash = Hash32::new(*blake3::hash(&code).as_bytes());
        let account = self.account_mut(address);
        account.code = code;
        account.code_hash = code_hash;
    }

    /// Seed a committed storage value (original and current).
    pub fn insert_storage(&mut self, address: &Address, key: Hash32, value: Hash32) {
        self.account_mut(address).storage.insert(
            key,
            Slot {
                original: value,
                current: value,
            },
        );
    }

    pub fn set_block_hash(&mut self, number: i64, hash: Hash32) {
        self.block_hashes.insert(number, hash);
    }

    /// Bytes returned by every subsequent `call`.
    pub fn set_call_output(&mut self, output: Vec<u8>) {
        self.call_output = output;
    }

    /// End the current transaction: current storage values become originals.
    pub fn commit(&mut self) {
        for account in self.accounts.values_mut() {
            for slot in account.storage.values_mut() {
                slot.original = slot.current;
            }
        }
    }

    pub fn account(&self, address: &Address) -> Option<&Account> {
        self.accounts.get(address)
    }

    /// Logs in the order they were emitted.
    pub fn logs(&self) -> &[LogRecord] {
        &self.logs
    }

    pub fn selfdestructs(&self) -> &[SelfDestruct] {
        &self.selfdestructs
    }

    /// Sub-call messages in the order they were dispatched.
    pub fn calls(&self) -> &[Vec<u8>] {
        &self.calls
    }
}

impl HostContext for MemHost {
    fn account_exists(&self, address: &Address) -> Result<bool, HostError> {
        Ok(self.accounts.contains_key(address))
    }

    fn get_balance(&self, address: &Address) -> Result<Hash32, HostError> {
        Ok(self
            .accounts
            .get(address)
            .map(|a| a.balance)
            .unwrap_or_default())
    }

    fn get_storage(&self, address: &Address, key: &Hash32) -> Result<Hash32, HostError> {
        Ok(self
            .accounts
            .get(address)
            .and_then(|a| a.storage.get(key))
            .map(|s| s.current)
            .unwrap_or_default())
    }

    fn set_storage(
        &mut self,
        address: &Address,
        key: &Hash32,
        value: &Hash32,
    ) -> Result<StorageStatus, HostError> {
        let slot = self.account_mut(address).storage.entry(*key).or_default();
        let status = StorageStatus::classify(&slot.original, &slot.current, value);
        slot.current = *value;
        Ok(status)
    }

    fn get_code_size(&self, address: &Address) -> Result<u64, HostError> {
        Ok(self
            .accounts
            .get(address)
            .map(|a| a.code.len() as u64)
            .unwrap_or(0))
    }

    fn get_code_hash(&self, address: &Address) -> Result<Hash32, HostError> {
        Ok(self
            .accounts
            .get(address)
            .map(|a| a.code_hash)
            .unwrap_or_default())
    }

    fn get_code(&self, address: &Address) -> Result<HostBuffer, HostError> {
        Ok(match self.accounts.get(address) {
            Some(account) => HostBuffer::Stable(account.code.clone()),
            None => HostBuffer::empty(),
        })
    }

    /// Credits the balance to `beneficiary`, then removes the account.
    /// On failure nothing changes and nothing is recorded.
    fn selfdestruct(&mut self, address: &Address, beneficiary: &Address) -> Result<(), HostError> {
        let balance = self.get_balance(address)?;
        let credit = if address != beneficiary && !balance.is_zero() {
            let target = self.get_balance(beneficiary)?;
            let credited = target
                .checked_add(&balance)
                .ok_or_else(|| HostError::provider("beneficiary balance overflow"))?;
            Some(credited)
        } else {
            None
        };

        if let Some(credited) = credit {
            self.set_balance(beneficiary, credited);
        }
        self.accounts.remove(address);
        self.selfdestructs.push(SelfDestruct {
            address: *address,
            beneficiary: *beneficiary,
        });
        Ok(())
    }

    fn call(&mut self, message: &[u8]) -> Result<HostBuffer, HostError> {
        self.calls.push(message.to_vec());
        Ok(HostBuffer::relocatable(&self.call_output))
    }

    fn get_tx_context(&self) -> Result<TxContext, HostError> {
        Ok(self.tx_context.clone())
    }

    fn get_block_hash(&self, number: i64) -> Result<Hash32, HostError> {
        Ok(self
            .block_hashes
            .get(&number)
            .copied()
            .unwrap_or_default())
    }

    fn emit_log(&mut self, address: &Address, data: &[u8], topics: &[Hash32]) -> Result<(), HostError> {
        self.logs.push(LogRecord {
            address: *address,
            data: data.to_vec(),
            topics: topics.to_vec(),
        });
        Ok(())
    }
}
