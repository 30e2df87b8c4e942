//! Transaction context snapshot.

use serde::{Deserialize, Serialize};

use crate::types::{Address, Hash32};

/// Immutable snapshot of transaction and block metadata visible to the
/// executing call.
///
/// Fetched once per callback and handed across as a value; it is never a
/// live view into provider state. 256-bit quantities are big-endian words.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxContext {
    /// Effective gas price of the transaction.
    pub gas_price: Hash32,
    /// Externally owned account that signed the transaction.
    pub origin: Address,
    /// Beneficiary of the block's fees.
    pub coinbase: Address,
    pub block_number: i64,
    /// Block timestamp in seconds.
    pub block_timestamp: i64,
    pub block_gas_limit: i64,
    /// Beacon chain randomness (formerly block difficulty).
    pub prev_randao: Hash32,
    pub chain_id: Hash32,
    pub base_fee: Hash32,
    pub blob_base_fee: Hash32,
}
