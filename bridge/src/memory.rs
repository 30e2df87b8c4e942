//! Bounds-checked access to guest linear memory, and the host allocator.
//!
//! All functions validate pointer and length arguments against the guest's
//! linear memory size before accessing. Out-of-bounds or negative values
//! fail with [`BridgeError::BadPointer`].
//!
//! Byte results handed to the guest live in a host allocation region: guest
//! memory the host reserves and bump-allocates. A region is never moved, and
//! only the most recent allocation can be handed back, so a live buffer is
//! never overwritten while the instance lives.

use crate::error::BridgeError;

/// WebAssembly page size in bytes.
pub const PAGE_SIZE: usize = 65_536;

fn bad_pointer(ptr: i32, len: i64) -> BridgeError {
    BridgeError::BadPointer { ptr, len }
}

/// Validate that `[ptr, ptr+len)` lies inside a memory of `mem_size` bytes
/// and return the range as `usize` bounds.
pub fn checked_range(mem_size: usize, ptr: i32, len: i32) -> Result<(usize, usize), BridgeError> {
    if ptr < 0 || len < 0 {
        return Err(bad_pointer(ptr, len as i64));
    }
    let start = ptr as usize;
    let end = start
        .checked_add(len as usize)
        .ok_or_else(|| bad_pointer(ptr, len as i64))?;
    if end > mem_size {
        return Err(bad_pointer(ptr, len as i64));
    }
    Ok((start, end))
}

/// Validate a range without touching memory.
pub fn validate_range(mem_size: usize, ptr: i32, len: i32) -> Result<(), BridgeError> {
    checked_range(mem_size, ptr, len).map(|_| ())
}

/// Copy `len` bytes out of guest memory at `ptr`.
///
/// The copy is owned by the host; nothing borrowed from guest memory
/// outlives the callback.
pub fn read_bytes(mem: &[u8], ptr: i32, len: i32) -> Result<Vec<u8>, BridgeError> {
    let (start, end) = checked_range(mem.len(), ptr, len)?;
    Ok(mem[start..end].to_vec())
}

/// Copy `count` packed 32-byte words out of guest memory at `ptr`.
pub fn read_words(mem: &[u8], ptr: i32, count: i32) -> Result<Vec<u8>, BridgeError> {
    let len = count
        .checked_mul(32)
        .ok_or_else(|| bad_pointer(ptr, count as i64 * 32))?;
    read_bytes(mem, ptr, len)
}

/// Write `data` bytes to guest memory at `ptr`.
pub fn write_bytes(mem: &mut [u8], ptr: i32, data: &[u8]) -> Result<(), BridgeError> {
    let len = i32::try_from(data.len()).map_err(|_| bad_pointer(ptr, data.len() as i64))?;
    let (start, end) = checked_range(mem.len(), ptr, len)?;
    mem[start..end].copy_from_slice(data);
    Ok(())
}

/// Read an i32 value (little-endian) from guest memory at `ptr`.
pub fn read_i32(mem: &[u8], ptr: i32) -> Result<i32, BridgeError> {
    let bytes = read_bytes(mem, ptr, 4)?;
    Ok(i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

/// Write an i32 value (little-endian) to guest memory at `ptr`.
pub fn write_i32(mem: &mut [u8], ptr: i32, value: i32) -> Result<(), BridgeError> {
    write_bytes(mem, ptr, &value.to_le_bytes())
}

/// Compute how many 8-byte-aligned bytes are needed.
fn align8(size: usize) -> usize {
    (size + 7) & !7
}

/// Bump allocator over a host-owned region of guest memory.
///
/// Freeing is stack-like: [`release`](Self::release) rolls back the most
/// recent allocation and ignores anything else. The region itself goes away
/// with the instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostAllocator {
    /// Base address of the current region in guest memory.
    pub base: usize,
    /// Current bump offset from base.
    pub bump: usize,
    /// Total bytes in the current region.
    pub capacity: usize,
}

/// A planned allocation. Apply with [`HostAllocator::commit`] once the
/// memory growth (if any) has succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Allocation {
    /// Guest address of the allocated bytes. Never zero once a region exists.
    pub ptr: usize,
    /// Pages the guest memory must grow by before writing at `ptr`.
    pub grow_pages: u64,
    next: HostAllocator,
}

impl HostAllocator {
    /// Create a new allocator for a region starting at `base` with `capacity` bytes.
    pub fn new(base: usize, capacity: usize) -> Self {
        Self {
            base,
            bump: 0,
            capacity,
        }
    }

    /// Plan an allocation of `size` bytes in a memory currently
    /// `memory_size` bytes long.
    ///
    /// Zero-sized requests still reserve 8 bytes so the returned pointer is
    /// distinct and non-null. When the current region is full, a fresh
    /// region is opened at the end of memory; the old region's tail is
    /// abandoned, never reused.
    pub fn plan(&self, size: usize, memory_size: usize) -> Allocation {
        let aligned = align8(size.max(1));
        if self.bump + aligned <= self.capacity {
            return Allocation {
                ptr: self.base + self.bump,
                grow_pages: 0,
                next: Self {
                    bump: self.bump + aligned,
                    ..*self
                },
            };
        }

        let pages = aligned.div_ceil(PAGE_SIZE);
        Allocation {
            ptr: memory_size,
            grow_pages: pages as u64,
            next: Self {
                base: memory_size,
                bump: aligned,
                capacity: pages * PAGE_SIZE,
            },
        }
    }

    /// Update allocator state after a successful allocation.
    pub fn commit(&mut self, allocation: &Allocation) {
        *self = allocation.next;
    }

    /// Give back `[ptr, ptr+len)` if it is the most recent allocation in the
    /// current region. Returns whether space was reclaimed.
    pub fn release(&mut self, ptr: usize, len: usize) -> bool {
        let size = align8(len.max(1));
        let top = self.base + self.bump;
        if ptr >= self.base && ptr.checked_add(size) == Some(top) {
            self.bump -= size;
            true
        } else {
            false
        }
    }
}
