//! Kernel heap
//!
//! First-fit allocator over a kernel-owned arena, the direct descendant of
//! the original block-header free list: blocks are split on allocation and
//! coalesced with their successor on free, and the usage counters are
//! maintained O(1) on the mutation path instead of by scanning.
//!
//! Handles are arena offsets wrapped in [`HeapPtr`], not raw pointers;
//! `heap_start`/`heap_end` report the virtual address range the original
//! system would have exposed so the diagnostics surface stays shaped the
//! same.

/// Virtual base address reported for the heap arena.
pub const HEAP_BASE: u64 = 0x4000_0000;

/// Allocation alignment in bytes.
const ALIGN: usize = 16;

/// Opaque handle to a heap allocation. `NULL` models the C null pointer:
/// freeing it is a no-op and no allocation ever has it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HeapPtr(usize);

impl HeapPtr {
    pub const NULL: HeapPtr = HeapPtr(usize::MAX);

    pub fn is_null(self) -> bool {
        self == Self::NULL
    }

    /// The virtual address this handle would have on the original system.
    pub fn address(self) -> u64 {
        HEAP_BASE + self.0 as u64
    }
}

#[derive(Debug, Clone)]
struct Block {
    offset: usize,
    size: usize,
    is_free: bool,
}

/// The allocator. One instance per kernel.
pub struct KernelHeap {
    arena: Vec<u8>,
    /// Blocks ordered by offset; adjacency is index adjacency.
    blocks: Vec<Block>,
    used: usize,
    free: usize,
    alloc_count: u64,
}

impl KernelHeap {
    pub fn new(size: usize) -> Self {
        Self {
            arena: vec![0; size],
            blocks: vec![Block {
                offset: 0,
                size,
                is_free: true,
            }],
            used: 0,
            free: size,
            alloc_count: 0,
        }
    }

    /// First-fit allocation of at least `size` bytes, 16-byte aligned.
    /// `None` when no free block fits or `size` is zero.
    pub fn alloc(&mut self, size: usize) -> Option<HeapPtr> {
        if size == 0 {
            return None;
        }
        let size = size.div_ceil(ALIGN) * ALIGN;
        let idx = self
            .blocks
            .iter()
            .position(|b| b.is_free && b.size >= size)?;

        let remainder = self.blocks[idx].size - size;
        if remainder >= ALIGN {
            let tail = Block {
                offset: self.blocks[idx].offset + size,
                size: remainder,
                is_free: true,
            };
            self.blocks[idx].size = size;
            self.blocks.insert(idx + 1, tail);
        }
        self.blocks[idx].is_free = false;

        self.used += self.blocks[idx].size;
        self.free -= self.blocks[idx].size;
        self.alloc_count += 1;
        Some(HeapPtr(self.blocks[idx].offset))
    }

    /// Releases an allocation. Null and unknown handles are ignored, and a
    /// double free is idempotent.
    pub fn free(&mut self, ptr: HeapPtr) {
        if ptr.is_null() {
            return;
        }
        let Some(idx) = self
            .blocks
            .iter()
            .position(|b| b.offset == ptr.0 && !b.is_free)
        else {
            return;
        };
        self.blocks[idx].is_free = true;
        self.used -= self.blocks[idx].size;
        self.free += self.blocks[idx].size;
        self.alloc_count -= 1;

        // Coalesce with the next block if it is free too.
        if idx + 1 < self.blocks.len() && self.blocks[idx + 1].is_free {
            let next = self.blocks.remove(idx + 1);
            self.blocks[idx].size += next.size;
        }
        // And with the previous.
        if idx > 0 && self.blocks[idx - 1].is_free {
            let cur = self.blocks.remove(idx);
            self.blocks[idx - 1].size += cur.size;
        }
    }

    /// Copies `data` into the allocation at `ptr`. Writes beyond the
    /// block are truncated.
    pub fn write_bytes(&mut self, ptr: HeapPtr, data: &[u8]) {
        if let Some(b) = self.blocks.iter().find(|b| b.offset == ptr.0 && !b.is_free) {
            let n = data.len().min(b.size);
            self.arena[b.offset..b.offset + n].copy_from_slice(&data[..n]);
        }
    }

    /// Reads `len` bytes from the allocation at `ptr` (clamped to the
    /// block).
    pub fn read_bytes(&self, ptr: HeapPtr, len: usize) -> Vec<u8> {
        match self.blocks.iter().find(|b| b.offset == ptr.0 && !b.is_free) {
            Some(b) => {
                let n = len.min(b.size);
                self.arena[b.offset..b.offset + n].to_vec()
            }
            None => Vec::new(),
        }
    }

    /// Number of live allocations.
    pub fn alloc_count(&self) -> u64 {
        self.alloc_count
    }

    /// Bytes currently allocated (rounded to block granularity).
    pub fn used(&self) -> usize {
        self.used
    }

    /// Bytes currently free.
    pub fn free_bytes(&self) -> usize {
        self.free
    }

    pub fn start_address(&self) -> u64 {
        HEAP_BASE
    }

    pub fn end_address(&self) -> u64 {
        HEAP_BASE + self.arena.len() as u64
    }
}
