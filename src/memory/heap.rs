//! In-process heap implementing [`LinearMemory`]
//!
//! This module provides heap memory management with:
//! - Explicit allocation/deallocation (malloc/free)
//! - Tombstones for freed blocks, so use-after-free and double free are
//!   reported instead of silently reusing memory
//! - Bounds checking: an access must stay inside one allocated block
//!
//! Blocks are zero-filled on allocation. Address 0 is never handed out.

use super::{Address, LinearMemory, MemoryError};
use std::collections::BTreeMap;

/// First address handed out by the allocator
pub const HEAP_ADDRESS_START: Address = 0x0000_1000;

/// State of a heap block
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockState {
    Allocated,
    Tombstone, // Freed, kept so stale pointers are detected
}

/// A block of heap memory
#[derive(Debug, Clone)]
pub struct HeapBlock {
    pub data: Vec<u8>,
    pub state: BlockState,
}

impl HeapBlock {
    pub fn new(size: usize) -> Self {
        HeapBlock {
            data: vec![0; size],
            state: BlockState::Allocated,
        }
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// The heap
#[derive(Debug, Clone)]
pub struct Heap {
    blocks: BTreeMap<Address, HeapBlock>,
    next_address: Address,
    total_allocated_bytes: usize,
    max_heap_size: usize,
}

impl Heap {
    /// Create a new heap with a maximum size limit
    pub fn new(max_heap_size: usize) -> Self {
        Heap {
            blocks: BTreeMap::new(),
            next_address: HEAP_ADDRESS_START,
            total_allocated_bytes: 0,
            max_heap_size,
        }
    }

    /// All blocks, including tombstones
    pub fn blocks(&self) -> &BTreeMap<Address, HeapBlock> {
        &self.blocks
    }

    pub fn total_allocated(&self) -> usize {
        self.total_allocated_bytes
    }

    /// Block containing `[address, address + len)` and the offset into it
    fn locate(&self, address: Address, len: usize) -> Result<(Address, usize), MemoryError> {
        let (&start, block) = self
            .blocks
            .range(..=address)
            .next_back()
            .ok_or(MemoryError::InvalidPointer { address })?;

        let offset = (address - start) as usize;
        if block.state == BlockState::Tombstone {
            if offset < block.size().max(1) {
                return Err(MemoryError::UseAfterFree { address });
            }
            return Err(MemoryError::InvalidPointer { address });
        }
        if offset >= block.size() && !(offset == block.size() && len == 0) {
            return Err(MemoryError::InvalidPointer { address });
        }
        if offset.checked_add(len).map_or(true, |end| end > block.size()) {
            return Err(MemoryError::OutOfBounds { address, len });
        }
        Ok((start, offset))
    }
}

impl LinearMemory for Heap {
    fn malloc(&mut self, size: usize) -> Result<Address, MemoryError> {
        let out_of_memory = MemoryError::OutOfMemory {
            requested: size,
            limit: self.max_heap_size,
        };
        let total = self
            .total_allocated_bytes
            .checked_add(size)
            .filter(|total| *total <= self.max_heap_size)
            .ok_or_else(|| out_of_memory.clone())?;

        let address = self.next_address;
        // zero-sized blocks still get a distinct address
        let span = Address::try_from(size.max(1)).map_err(|_| out_of_memory.clone())?;
        self.next_address = address.checked_add(span).ok_or(out_of_memory)?;
        self.blocks.insert(address, HeapBlock::new(size));
        self.total_allocated_bytes = total;

        Ok(address)
    }

    fn free(&mut self, address: Address) -> Result<(), MemoryError> {
        match self.blocks.get_mut(&address) {
            Some(block) if block.state == BlockState::Allocated => {
                block.state = BlockState::Tombstone;
                self.total_allocated_bytes -= block.size();
                Ok(())
            }
            Some(_) => Err(MemoryError::DoubleFree { address }),
            None => Err(MemoryError::InvalidFree { address }),
        }
    }

    fn read_bytes(&self, address: Address, len: usize) -> Result<Vec<u8>, MemoryError> {
        let (start, offset) = self.locate(address, len)?;
        let block = &self.blocks[&start];
        Ok(block.data[offset..offset + len].to_vec())
    }

    fn write_bytes(&mut self, address: Address, bytes: &[u8]) -> Result<(), MemoryError> {
        let (start, offset) = self.locate(address, bytes.len())?;
        let block = self
            .blocks
            .get_mut(&start)
            .ok_or(MemoryError::InvalidPointer { address })?;
        block.data[offset..offset + bytes.len()].copy_from_slice(bytes);
        Ok(())
    }
}

impl Default for Heap {
    fn default() -> Self {
        // Default heap size: 16 MB (the default wasm initial memory)
        Self::new(16 * 1024 * 1024)
    }
}
