//! Dispatch shims: one per host callback.
//!
//! Each shim takes the raw byte arguments exactly as they arrive from the
//! native side, decodes the declared fixed-width fields, calls the single
//! matching `HostContext` method, and encodes the result. Byte results go
//! through the buffer adapter so the caller always gets boundary-stable
//! storage.
//!
//! A length mismatch on any field fails before the provider is called.
//! Provider errors come back unchanged as [`BridgeError::Host`]. Shims never
//! retry, cache, or reorder calls.

use vmhost_hostapi::HostContext;
use vmhost_primitives::{
    Address, Hash32, StableBuffer, StorageStatus, TxContext, ADDRESS_LEN, HASH_LEN,
};

use crate::buffer::ensure_stable;
use crate::error::BridgeError;

fn decode_address(field: &'static str, bytes: &[u8]) -> Result<Address, BridgeError> {
    Address::from_slice(bytes).map_err(|_| BridgeError::SizeMismatch {
        field,
        expected: ADDRESS_LEN,
        got: bytes.len(),
    })
}

fn decode_hash(field: &'static str, bytes: &[u8]) -> Result<Hash32, BridgeError> {
    Hash32::from_slice(bytes).map_err(|_| BridgeError::SizeMismatch {
        field,
        expected: HASH_LEN,
        got: bytes.len(),
    })
}

pub fn account_exists<H: HostContext + ?Sized>(host: &H, address: &[u8]) -> Result<bool, BridgeError> {
    let address = decode_address("address", address)?;
    Ok(host.account_exists(&address)?)
}

pub fn get_storage<H: HostContext + ?Sized>(
    host: &H,
    address: &[u8],
    key: &[u8],
) -> Result<Hash32, BridgeError> {
    let address = decode_address("address", address)?;
    let key = decode_hash("key", key)?;
    Ok(host.get_storage(&address, &key)?)
}

pub fn set_storage<H: HostContext + ?Sized>(
    host: &mut H,
    address: &[u8],
    key: &[u8],
    value: &[u8],
) -> Result<StorageStatus, BridgeError> {
    let address = decode_address("address", address)?;
    let key = decode_hash("key", key)?;
    let value = decode_hash("value", value)?;
    Ok(host.set_storage(&address, &key, &value)?)
}

/// Balance as the provider's 32-byte big-endian word, unmodified.
pub fn get_balance<H: HostContext + ?Sized>(host: &H, address: &[u8]) -> Result<Hash32, BridgeError> {
    let address = decode_address("address", address)?;
    Ok(host.get_balance(&address)?)
}

pub fn get_code_size<H: HostContext + ?Sized>(host: &H, address: &[u8]) -> Result<u64, BridgeError> {
    let address = decode_address("address", address)?;
    Ok(host.get_code_size(&address)?)
}

pub fn get_code_hash<H: HostContext + ?Sized>(host: &H, address: &[u8]) -> Result<Hash32, BridgeError> {
    let address = decode_address("address", address)?;
    Ok(host.get_code_hash(&address)?)
}

/// Full code body. A code-less account yields an empty buffer.
pub fn copy_code<H: HostContext + ?Sized>(host: &H, address: &[u8]) -> Result<StableBuffer, BridgeError> {
    let address = decode_address("address", address)?;
    let code = host.get_code(&address)?;
    ensure_stable(&code)
}

pub fn selfdestruct<H: HostContext + ?Sized>(
    host: &mut H,
    address: &[u8],
    beneficiary: &[u8],
) -> Result<(), BridgeError> {
    let address = decode_address("address", address)?;
    let beneficiary = decode_address("beneficiary", beneficiary)?;
    Ok(host.selfdestruct(&address, &beneficiary)?)
}

/// Forward an opaque sub-call message; the result is equally opaque.
pub fn call<H: HostContext + ?Sized>(host: &mut H, message: &[u8]) -> Result<StableBuffer, BridgeError> {
    let output = host.call(message)?;
    ensure_stable(&output)
}

pub fn get_tx_context<H: HostContext + ?Sized>(host: &H) -> Result<TxContext, BridgeError> {
    Ok(host.get_tx_context()?)
}

pub fn get_block_hash<H: HostContext + ?Sized>(host: &H, number: i64) -> Result<Hash32, BridgeError> {
    Ok(host.get_block_hash(number)?)
}

/// Emit a log with one slice per topic. Every topic is decoded before the
/// provider sees any of them.
pub fn emit_log<H: HostContext + ?Sized>(
    host: &mut H,
    address: &[u8],
    data: &[u8],
    topics: &[&[u8]],
) -> Result<(), BridgeError> {
    let address = decode_address("address", address)?;
    let topics = topics
        .iter()
        .map(|t| decode_hash("topic", t))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(host.emit_log(&address, data, &topics)?)
}

/// Emit a log whose topics are packed back to back, `topic_count * 32`
/// bytes in total.
pub fn emit_log_packed<H: HostContext + ?Sized>(
    host: &mut H,
    address: &[u8],
    data: &[u8],
    packed_topics: &[u8],
    topic_count: usize,
) -> Result<(), BridgeError> {
    let address = decode_address("address", address)?;
    // A count whose byte length overflows can never match; report it as a
    // count mismatch against what the packed bytes actually hold.
    let expected = topic_count
        .checked_mul(HASH_LEN)
        .ok_or(BridgeError::SizeMismatch {
            field: "topic_count",
            expected: packed_topics.len() / HASH_LEN,
            got: topic_count,
        })?;
    if packed_topics.len() != expected {
        return Err(BridgeError::SizeMismatch {
            field: "topics",
            expected,
            got: packed_topics.len(),
        });
    }
    let topics = packed_topics
        .chunks_exact(HASH_LEN)
        .map(|t| decode_hash("topic", t))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(host.emit_log(&address, data, &topics)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vmhost_hostapi::{HostError, MemHost};

    const ADDR: [u8; 20] = [0x11; 20];

    #[test]
    fn test_short_address_never_reaches_provider() {
        let mut host = MemHost::new();
        let err = set_storage(&mut host, &[0x11; 19], &[0; 32], &[1; 32]).unwrap_err();
        assert!(matches!(
            err,
            BridgeError::SizeMismatch {
                field: "address",
                expected: 20,
                got: 19
            }
        ));
        assert!(!host.account_exists(&Address::new([0x11; 20])).unwrap());
    }

    #[test]
    fn test_long_value_rejected() {
        let mut host = MemHost::new();
        let err = set_storage(&mut host, &ADDR, &[0; 32], &[1; 33]).unwrap_err();
        assert!(matches!(err, BridgeError::SizeMismatch { field: "value", .. }));
    }

    #[test]
    fn test_get_storage_reads_back() {
        let mut host = MemHost::new();
        set_storage(&mut host, &ADDR, &[2; 32], &[3; 32]).unwrap();
        let v = get_storage(&host, &ADDR, &[2; 32]).unwrap();
        assert_eq!(v, Hash32::new([3; 32]));
    }

    #[test]
    fn test_set_storage_twice_reports_unchanged() {
        let mut host = MemHost::new();
        let addr = Address::new(ADDR);
        host.insert_storage(&addr, Hash32::new([2; 32]), Hash32::from_u64(9));

        let first = set_storage(&mut host, &ADDR, &[2; 32], &[3; 32]).unwrap();
        let second = set_storage(&mut host, &ADDR, &[2; 32], &[3; 32]).unwrap();
        assert_eq!(first, StorageStatus::Modified);
        assert_eq!(second, StorageStatus::Unchanged);
    }

    #[test]
    fn test_copy_code_without_code_is_empty() {
        let host = MemHost::new();
        let code = copy_code(&host, &ADDR).unwrap();
        assert!(code.is_empty());
        assert_eq!(get_code_size(&host, &ADDR).unwrap(), 0);
    }

    #[test]
    fn test_copy_code_shares_provider_storage() {
        let mut host = MemHost::new();
        host.set_code(&Address::new(ADDR), vec![0x60, 0x01]);
        let stored_ptr = host.account(&Address::new(ADDR)).unwrap().code.as_ptr();

        let code = copy_code(&host, &ADDR).unwrap();
        assert_eq!(code.as_slice(), &[0x60, 0x01]);
        assert_eq!(code.as_ptr(), stored_ptr);
    }

    #[test]
    fn test_selfdestruct_checks_beneficiary_width() {
        let mut host = MemHost::new();
        let err = selfdestruct(&mut host, &ADDR, &[0x22; 32]).unwrap_err();
        assert!(matches!(
            err,
            BridgeError::SizeMismatch {
                field: "beneficiary",
                expected: 20,
                got: 32
            }
        ));
        assert!(host.selfdestructs().is_empty());
    }

    #[test]
    fn test_call_copies_relocatable_result() {
        let mut host = MemHost::new();
        host.set_call_output(vec![9; 40]);
        let out = call(&mut host, b"opaque message").unwrap();
        assert_eq!(out.as_slice(), &[9u8; 40][..]);
        assert_eq!(host.calls(), &[b"opaque message".to_vec()]);
    }

    #[test]
    fn test_emit_log_topic_order() {
        let mut host = MemHost::new();
        let t1 = [0xA1u8; 32];
        let t2 = [0xB2u8; 32];

        emit_log(&mut host, &ADDR, b"", &[]).unwrap();
        emit_log(&mut host, &ADDR, b"payload", &[&t1[..], &t2[..]]).unwrap();

        let logs = host.logs();
        assert!(logs[0].topics.is_empty());
        assert_eq!(logs[1].topics, vec![Hash32::new(t1), Hash32::new(t2)]);
        assert_eq!(logs[1].data, b"payload".to_vec());
    }

    #[test]
    fn test_emit_log_bad_topic_emits_nothing() {
        let mut host = MemHost::new();
        let good = [1u8; 32];
        let bad = [2u8; 31];
        let err = emit_log(&mut host, &ADDR, b"", &[&good[..], &bad[..]]).unwrap_err();
        assert!(matches!(err, BridgeError::SizeMismatch { field: "topic", .. }));
        assert!(host.logs().is_empty());
    }

    #[test]
    fn test_emit_log_packed() {
        let mut host = MemHost::new();
        let mut packed = vec![0xCC; 32];
        packed.extend_from_slice(&[0xDD; 32]);
        emit_log_packed(&mut host, &ADDR, b"d", &packed, 2).unwrap();
        assert_eq!(
            host.logs()[0].topics,
            vec![Hash32::new([0xCC; 32]), Hash32::new([0xDD; 32])]
        );

        let err = emit_log_packed(&mut host, &ADDR, b"d", &packed, 3).unwrap_err();
        assert!(matches!(
            err,
            BridgeError::SizeMismatch {
                field: "topics",
                expected: 96,
                got: 64
            }
        ));
    }

    #[test]
    fn test_emit_log_packed_overflowing_count() {
        let mut host = MemHost::new();
        let packed = vec![0xCC; 64];
        let err = emit_log_packed(&mut host, &ADDR, b"d", &packed, usize::MAX).unwrap_err();
        assert!(matches!(
            err,
            BridgeError::SizeMismatch {
                field: "topic_count",
                expected: 2,
                got: usize::MAX
            }
        ));
        assert!(host.logs().is_empty());
    }

    #[test]
    fn test_balance_passes_through_exactly() {
        let mut host = MemHost::new();
        host.set_balance(&Address::new(ADDR), Hash32::from_u64(1));
        let balance = get_balance(&host, &ADDR).unwrap();
        let mut expected = [0u8; 32];
        expected[31] = 1;
        assert_eq!(balance.to_array(), expected);
    }

    struct FailingHost;

    impl HostContext for FailingHost {
        fn account_exists(&self, _: &Address) -> Result<bool, HostError> {
            Err(HostError::provider("state unavailable"))
        }
        fn get_balance(&self, _: &Address) -> Result<Hash32, HostError> {
            Err(HostError::provider("state unavailable"))
        }
        fn get_storage(&self, _: &Address, _: &Hash32) -> Result<Hash32, HostError> {
            Err(HostError::provider("state unavailable"))
        }
        fn set_storage(&mut self, _: &Address, _: &Hash32, _: &Hash32) -> Result<StorageStatus, HostError> {
            Err(HostError::provider("read-only"))
        }
        fn get_code_size(&self, _: &Address) -> Result<u64, HostError> {
            Err(HostError::provider("state unavailable"))
        }
        fn get_code_hash(&self, _: &Address) -> Result<Hash32, HostError> {
            Err(HostError::provider("state unavailable"))
        }
        fn get_code(&self, _: &Address) -> Result<vmhost_primitives::HostBuffer, HostError> {
            Err(HostError::provider("state unavailable"))
        }
        fn selfdestruct(&mut self, _: &Address, _: &Address) -> Result<(), HostError> {
            Err(HostError::provider("read-only"))
        }
        fn call(&mut self, _: &[u8]) -> Result<vmhost_primitives::HostBuffer, HostError> {
            Err(HostError::Code(vmhost_primitives::ErrorCode::Internal))
        }
        fn get_tx_context(&self) -> Result<TxContext, HostError> {
            Err(HostError::provider("state unavailable"))
        }
        fn get_block_hash(&self, _: i64) -> Result<Hash32, HostError> {
            Err(HostError::provider("pruned"))
        }
        fn emit_log(&mut self, _: &Address, _: &[u8], _: &[Hash32]) -> Result<(), HostError> {
            Err(HostError::provider("read-only"))
        }
    }

    #[test]
    fn test_provider_error_is_unchanged() {
        let mut host = FailingHost;
        match get_block_hash(&host, 5).unwrap_err() {
            BridgeError::Host(e) => assert_eq!(e, HostError::provider("pruned")),
            other => panic!("unexpected error: {:?}", other),
        }
        match call(&mut host, b"").unwrap_err() {
            BridgeError::Host(e) => {
                assert_eq!(e, HostError::Code(vmhost_primitives::ErrorCode::Internal))
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_size_check_precedes_provider_error() {
        let host = FailingHost;
        let err = get_balance(&host, &[0; 4]).unwrap_err();
        assert!(matches!(err, BridgeError::SizeMismatch { .. }));
    }
}
