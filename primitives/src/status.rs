//! Storage write outcomes.
//!
//! `StorageStatus` classifies what a single storage write did relative to
//! the slot's value at the start of the transaction ("original") and its
//! value right before the write ("current"). Downstream gas accounting
//! depends on this classification, so the integer mapping is frozen.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::error::PrimitiveError;
use crate::types::Hash32;

/// Effect of a storage write. Wire codes are stable and never renumbered.
///
/// Notation below is `original -> current -> new`, where `0` is the zero
/// word and `X`, `Y`, `Z` are distinct non-zero words.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum StorageStatus {
    /// No net effect: the new value equals the current one, or a slot that
    /// is already dirty is reassigned without hitting a special case.
    Unchanged = 0,
    /// `0 -> 0 -> Z`
    Added = 1,
    /// `X -> X -> 0`
    Deleted = 2,
    /// `X -> X -> Z`
    Modified = 3,
    /// `X -> 0 -> Z`
    DeletedAdded = 4,
    /// `X -> Y -> 0`
    ModifiedDeleted = 5,
    /// `X -> 0 -> X`
    DeletedRestored = 6,
    /// `0 -> Y -> 0`
    AddedDeleted = 7,
    /// `X -> Y -> X`
    ModifiedRestored = 8,
}

impl StorageStatus {
    /// Every variant in wire order.
    pub const ALL: [StorageStatus; 9] = [
        Self::Unchanged,
        Self::Added,
        Self::Deleted,
        Self::Modified,
        Self::DeletedAdded,
        Self::ModifiedDeleted,
        Self::DeletedRestored,
        Self::AddedDeleted,
        Self::ModifiedRestored,
    ];

    /// Wire code for this status.
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Parse a wire code.
    pub fn from_code(code: i32) -> Result<Self, PrimitiveError> {
        Self::ALL
            .iter()
            .copied()
            .find(|s| s.code() == code)
            .ok_or(PrimitiveError::UnknownStatus(code))
    }

    /// Classify a write of `new` into a slot holding `current`, whose value
    /// at the start of the transaction was `original`.
    pub fn classify(original: &Hash32, current: &Hash32, new: &Hash32) -> Self {
        if current == new {
            return Self::Unchanged;
        }

        // Clean slot: first write in this transaction.
        if original == current {
            return if original.is_zero() {
                Self::Added
            } else if new.is_zero() {
                Self::Deleted
            } else {
                Self::Modified
            };
        }

        // Dirty slot.
        if original.is_zero() {
            return if new.is_zero() {
                Self::AddedDeleted
            } else {
                Self::Unchanged
            };
        }
        if current.is_zero() {
            return if new == original {
                Self::DeletedRestored
            } else {
                Self::DeletedAdded
            };
        }
        if new.is_zero() {
            Self::ModifiedDeleted
        } else if new == original {
            Self::ModifiedRestored
        } else {
            Self::Unchanged
        }
    }
}

impl TryFrom<i32> for StorageStatus {
    type Error = PrimitiveError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        Self::from_code(code)
    }
}

impl fmt::Display for StorageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unchanged => "UNCHANGED",
            Self::Added => "ADDED",
            Self::Deleted => "DELETED",
            Self::Modified => "MODIFIED",
            Self::DeletedAdded => "DELETED_ADDED",
            Self::ModifiedDeleted => "MODIFIED_DELETED",
            Self::DeletedRestored => "DELETED_RESTORED",
            Self::AddedDeleted => "ADDED_DELETED",
            Self::ModifiedRestored => "MODIFIED_RESTORED",
        };
        f.write_str(name)
    }
}
