//! Fixed-layout wire encoding for [`TxContext`].
//!
//! The guest receives the context as a single host-allocated buffer of
//! exactly [`TX_CONTEXT_LEN`] bytes. Layout:
//!
//! ```text
//! [gas_price: 32] [origin: 20] [coinbase: 20]
//! [block_number: 8 LE] [block_timestamp: 8 LE] [block_gas_limit: 8 LE]
//! [prev_randao: 32] [chain_id: 32] [base_fee: 32] [blob_base_fee: 32]
//! ```
//!
//! 256-bit fields keep their big-endian word form; the three 64-bit
//! integers are little-endian like every other integer on the guest ABI.

use crate::context::TxContext;
use crate::error::PrimitiveError;
use crate::types::{Address, Hash32, ADDRESS_LEN, HASH_LEN};

/// Encoded size of a [`TxContext`].
pub const TX_CONTEXT_LEN: usize = 5 * HASH_LEN + 2 * ADDRESS_LEN + 3 * 8;

/// A cursor for reading bytes during decoding.
struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], PrimitiveError> {
        let end = self.pos + n;
        if end > self.data.len() {
            return Err(PrimitiveError::SizeMismatch {
                expected: end,
                got: self.data.len(),
            });
        }
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn read_i64(&mut self) -> Result<i64, PrimitiveError> {
        let bytes = self.read_bytes(8)?;
        let mut buf = [0u8; 8];
        buf.copy_from_slice(bytes);
        Ok(i64::from_le_bytes(buf))
    }

    fn read_hash(&mut self) -> Result<Hash32, PrimitiveError> {
        Hash32::from_slice(self.read_bytes(HASH_LEN)?)
    }

    fn read_address(&mut self) -> Result<Address, PrimitiveError> {
        Address::from_slice(self.read_bytes(ADDRESS_LEN)?)
    }
}

fn write_i64(buf: &mut Vec<u8>, v: i64) {
    buf.extend_from_slice(&v.to_le_bytes());
}

/// Encode a `TxContext` into its fixed 224-byte layout.
pub fn encode_tx_context(ctx: &TxContext) -> Vec<u8> {
    let mut buf = Vec::with_capacity(TX_CONTEXT_LEN);
    buf.extend_from_slice(ctx.gas_price.as_bytes());
    buf.extend_from_slice(ctx.origin.as_bytes());
    buf.extend_from_slice(ctx.coinbase.as_bytes());
    write_i64(&mut buf, ctx.block_number);
    write_i64(&mut buf, ctx.block_timestamp);
    write_i64(&mut buf, ctx.block_gas_limit);
    buf.extend_from_slice(ctx.prev_randao.as_bytes());
    buf.extend_from_slice(ctx.chain_id.as_bytes());
    buf.extend_from_slice(ctx.base_fee.as_bytes());
    buf.extend_from_slice(ctx.blob_base_fee.as_bytes());
    buf
}

/// Decode a `TxContext`. The input must be exactly [`TX_CONTEXT_LEN`] bytes.
pub fn decode_tx_context(data: &[u8]) -> Result<TxContext, PrimitiveError> {
    if data.len() != TX_CONTEXT_LEN {
        return Err(PrimitiveError::SizeMismatch {
            expected: TX_CONTEXT_LEN,
            got: data.len(),
        });
    }
    let mut r = Reader::new(data);
    Ok(TxContext {
        gas_price: r.read_hash()?,
        origin: r.read_address()?,
        coinbase: r.read_address()?,
        block_number: r.read_i64()?,
        block_timestamp: r.read_i64()?,
        block_gas_limit: r.read_i64()?,
        prev_randao: r.read_hash()?,
        chain_id: r.read_hash()?,
        base_fee: r.read_hash()?,
        blob_base_fee: r.read_hash()?,
    })
}
