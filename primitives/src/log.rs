//! Log records emitted through the host.

use serde::{Deserialize, Serialize};

use crate::types::{Address, Hash32};

/// An event as observed by a state provider.
///
/// Topic order and multiplicity are exactly as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    pub address: Address,
    pub data: Vec<u8>,
    pub topics: Vec<Hash32>,
}
