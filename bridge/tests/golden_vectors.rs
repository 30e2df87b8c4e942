//! Golden vector tests: frozen wire codes and storage classifications.
//!
//! Downstream gas accounting and guest code depend on these integers.
//! A failing vector means the wire contract changed and must be reviewed.

mod common;

use serde::Deserialize;
use vmhost_bridge::VmInstance;
use vmhost_hostapi::{HostContext, MemHost};
use vmhost_primitives::{encode_tx_context, ErrorCode, StorageStatus};

use common::*;

/// One storage write: slot values are small integers widened to 32-byte words.
#[derive(Deserialize)]
struct StorageVector {
    name: String,
    original: u64,
    current: u64,
    new: u64,
    expected_status: i32,
}

const STORAGE_VECTORS: &str = r#"[
    {"name": "noop_clean",          "original": 0, "current": 0, "new": 0, "expected_status": 0},
    {"name": "noop_dirty",          "original": 1, "current": 2, "new": 2, "expected_status": 0},
    {"name": "reassign_dirty",      "original": 1, "current": 2, "new": 3, "expected_status": 0},
    {"name": "reassign_added",      "original": 0, "current": 2, "new": 3, "expected_status": 0},
    {"name": "added",               "original": 0, "current": 0, "new": 1, "expected_status": 1},
    {"name": "deleted",             "original": 1, "current": 1, "new": 0, "expected_status": 2},
    {"name": "modified",            "original": 1, "current": 1, "new": 2, "expected_status": 3},
    {"name": "deleted_added",       "original": 1, "current": 0, "new": 2, "expected_status": 4},
    {"name": "modified_deleted",    "original": 1, "current": 2, "new": 0, "expected_status": 5},
    {"name": "deleted_restored",    "original": 1, "current": 0, "new": 1, "expected_status": 6},
    {"name": "added_deleted",       "original": 0, "current": 1, "new": 0, "expected_status": 7},
    {"name": "modified_restored",   "original": 1, "current": 2, "new": 1, "expected_status": 8}
]"#;

/// Drive `original -> current` through the provider, then write `new`
/// from the guest and return the reported status.
fn guest_status(vector: &StorageVector) -> i32 {
    let mut host = MemHost::new();
    host.insert_storage(&alice(), word(5), word(vector.original));
    if vector.current != vector.original {
        host.set_storage(&alice(), &word(5), &word(vector.current))
            .unwrap();
    }

    let mut vm: VmInstance<MemHost> = instance(host);
    vm.write_memory(ADDR_PTR, alice().as_bytes()).unwrap();
    vm.write_memory(KEY_PTR, word(5).as_bytes()).unwrap();
    vm.write_memory(VAL_PTR, word(vector.new).as_bytes()).unwrap();

    let code: i32 = vm
        .call::<(i32, i32, i32, i32, i32, i32, i32), i32>(
            "set_storage",
            (ADDR_PTR, 20, KEY_PTR, 32, VAL_PTR, 32, OUT_PTR),
        )
        .unwrap();
    assert_eq!(code, 0, "{}: call failed", vector.name);

    let status = vm.read_memory(OUT_PTR, 4).unwrap();
    i32::from_le_bytes(status.try_into().unwrap())
}

#[test]
fn test_storage_status_vectors() {
    let vectors: Vec<StorageVector> = serde_json::from_str(STORAGE_VECTORS).unwrap();
    assert_eq!(vectors.len(), 12);

    for vector in &vectors {
        let classified = StorageStatus::classify(
            &word(vector.original),
            &word(vector.current),
            &word(vector.new),
        );
        assert_eq!(classified.code(), vector.expected_status, "{}", vector.name);
        assert_eq!(guest_status(vector), vector.expected_status, "{} (guest)", vector.name);
    }
}

#[test]
fn test_storage_status_codes_are_frozen() {
    let json = r#"{
        "Unchanged": 0, "Added": 1, "Deleted": 2, "Modified": 3, "DeletedAdded": 4,
        "ModifiedDeleted": 5, "DeletedRestored": 6, "AddedDeleted": 7, "ModifiedRestored": 8
    }"#;
    let table: std::collections::BTreeMap<String, i32> = serde_json::from_str(json).unwrap();

    for status in StorageStatus::ALL {
        let name = serde_json::to_value(status).unwrap();
        let name = name.as_str().unwrap();
        assert_eq!(table[name], status.code(), "{}", name);
        assert_eq!(StorageStatus::from_code(status.code()).unwrap(), status);
    }
    assert!(StorageStatus::from_code(9).is_err());
}

#[test]
fn test_error_codes_are_frozen() {
    let expected = [
        (ErrorCode::Ok, 0),
        (ErrorCode::BadPointer, 1),
        (ErrorCode::SizeMismatch, 2),
        (ErrorCode::AllocationFailed, 3),
        (ErrorCode::ProviderFailure, 4),
        (ErrorCode::Internal, 5),
    ];
    for (code, value) in expected {
        assert_eq!(code.as_i32(), value);
        assert_eq!(ErrorCode::from_i32(value), Some(code));
    }
    assert_eq!(ErrorCode::from_i32(6), None);
}

#[test]
fn test_tx_context_field_offsets() {
    // (field, offset, length) in the encoded context.
    let json = r#"[
        ["gas_price", 0, 32], ["origin", 32, 20], ["coinbase", 52, 20],
        ["block_number", 72, 8], ["block_timestamp", 80, 8], ["block_gas_limit", 88, 8],
        ["prev_randao", 96, 32], ["chain_id", 128, 32], ["base_fee", 160, 32],
        ["blob_base_fee", 192, 32]
    ]"#;
    let layout: Vec<(String, usize, usize)> = serde_json::from_str(json).unwrap();

    let context = sample_tx_context();
    let encoded = encode_tx_context(&context);
    assert_eq!(encoded.len(), 224);

    for (field, offset, len) in &layout {
        let slice = &encoded[*offset..*offset + *len];
        let expected: Vec<u8> = match field.as_str() {
            "gas_price" => context.gas_price.as_bytes().to_vec(),
            "origin" => context.origin.as_bytes().to_vec(),
            "coinbase" => context.coinbase.as_bytes().to_vec(),
            "block_number" => context.block_number.to_le_bytes().to_vec(),
            "block_timestamp" => context.block_timestamp.to_le_bytes().to_vec(),
            "block_gas_limit" => context.block_gas_limit.to_le_bytes().to_vec(),
            "prev_randao" => context.prev_randao.as_bytes().to_vec(),
            "chain_id" => context.chain_id.as_bytes().to_vec(),
            "base_fee" => context.base_fee.as_bytes().to_vec(),
            "blob_base_fee" => context.blob_base_fee.as_bytes().to_vec(),
            other => panic!("unknown field {}", other),
        };
        assert_eq!(slice, expected.as_slice(), "{}", field);
    }
}
