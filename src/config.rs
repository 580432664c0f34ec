//! Build-time layout of the simulated memory, the heap and the memory control block.

use crate::addr::AddressSpace;
use crate::unit::KIB;
use displaydoc_lite::displaydoc;

displaydoc! {
    /// Any error that makes a memory layout unusable.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum ConfigError {
        /// block sizes must be powers of two.
        NotPowerOfTwo,
        /// the minimum block size must be at least two bytes.
        MinBlockTooSmall,
        /// the minimum block size exceeds the maximum block size.
        InvalidBlockRange,
        /// control table entries must be two or four bytes wide.
        UnsupportedEntrySize,
        /// the maximum block size can not be encoded inside a single entry.
        EntryTooNarrow,
        /// the minimum block size is not a multiple of the entry size.
        GranuleMismatch,
        /// the heap or the control table does not fit into the simulated memory.
        RegionOutOfBounds,
        /// the heap and the control table overlap.
        RegionsOverlap,
        /// the backing memory is smaller than the simulated memory.
        MemoryTooSmall,
    }
}

/// The layout of a single arena.
///
/// All addresses are addresses inside the simulated memory described by
/// [`sram`](Self::sram). The heap is exactly one maximum sized block, and
/// the control table holds one entry per minimum sized block of the heap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    sram: AddressSpace,
    heap_base: usize,
    max_block: usize,
    min_block: usize,
    table_base: usize,
    entry_size: usize,
}

impl Config {
    /// The layout of a Cortex-M SRAM with 32 KiB, a 16 KiB heap
    /// and a 1 KiB control table made of 512 two byte entries.
    pub const CORTEX_M: Config = Config {
        sram: AddressSpace::new(0x2000_0000, 32 * KIB),
        heap_base: 0x2000_1000,
        max_block: 16 * KIB,
        min_block: 32,
        table_base: 0x2000_6800,
        entry_size: 2,
    };

    /// Create and validate a custom layout.
    pub fn new(
        sram: AddressSpace,
        heap_base: usize,
        max_block: usize,
        min_block: usize,
        table_base: usize,
        entry_size: usize,
    ) -> Result<Self, ConfigError> {
        if !max_block.is_power_of_two() || !min_block.is_power_of_two() {
            return Err(ConfigError::NotPowerOfTwo);
        }

        // the lowest bit of every size is the occupied flag
        if min_block < 2 {
            return Err(ConfigError::MinBlockTooSmall);
        }

        if min_block > max_block {
            return Err(ConfigError::InvalidBlockRange);
        }

        if entry_size != 2 && entry_size != 4 {
            return Err(ConfigError::UnsupportedEntrySize);
        }

        if max_block as u64 >= 1u64 << (entry_size * 8) {
            return Err(ConfigError::EntryTooNarrow);
        }

        if min_block % entry_size != 0 {
            return Err(ConfigError::GranuleMismatch);
        }

        let config = Self {
            sram,
            heap_base,
            max_block,
            min_block,
            table_base,
            entry_size,
        };

        let sram_end = sram
            .base()
            .checked_add(sram.size())
            .ok_or(ConfigError::RegionOutOfBounds)?;
        let heap_end = heap_base
            .checked_add(max_block)
            .ok_or(ConfigError::RegionOutOfBounds)?;
        let table_end = table_base
            .checked_add(config.table_len())
            .ok_or(ConfigError::RegionOutOfBounds)?;

        if heap_base < sram.base()
            || heap_end > sram_end
            || table_base < sram.base()
            || table_end > sram_end
        {
            return Err(ConfigError::RegionOutOfBounds);
        }

        if heap_base < table_end && table_base < heap_end {
            return Err(ConfigError::RegionsOverlap);
        }

        Ok(config)
    }

    /// The simulated memory that contains both the heap and the control table.
    pub const fn sram(&self) -> AddressSpace {
        self.sram
    }

    /// The address of the first heap byte.
    pub const fn heap_base(&self) -> usize {
        self.heap_base
    }

    /// The size of the whole heap, which is also the largest block.
    pub const fn max_block(&self) -> usize {
        self.max_block
    }

    /// The smallest block that will be handed out.
    pub const fn min_block(&self) -> usize {
        self.min_block
    }

    /// The address of the first control table entry.
    pub const fn table_base(&self) -> usize {
        self.table_base
    }

    /// The number of bytes of a single control table entry.
    pub const fn entry_size(&self) -> usize {
        self.entry_size
    }

    /// The number of entries inside the control table.
    pub const fn slot_count(&self) -> usize {
        self.max_block / self.min_block
    }

    /// The size of the control table in bytes.
    pub const fn table_len(&self) -> usize {
        self.slot_count() * self.entry_size
    }

    /// The number of heap bytes that one byte of the control table accounts for.
    ///
    /// Every conversion between table offsets and heap offsets goes through
    /// this factor.
    pub const fn granule_scale(&self) -> usize {
        self.min_block / self.entry_size
    }

    /// The address of the last minimum sized block of the heap.
    pub const fn heap_last(&self) -> usize {
        self.heap_base + self.max_block - self.min_block
    }

    /// Address of the heap block that starts at `slot`.
    pub fn heap_addr(&self, slot: usize) -> usize {
        let table_offset = slot * self.entry_size;
        self.heap_base + table_offset * self.granule_scale()
    }

    /// Address of the control table entry for `slot`.
    pub fn table_addr(&self, slot: usize) -> usize {
        self.table_base + slot * self.entry_size
    }

    /// Find the slot that belongs to the heap address `addr`.
    ///
    /// Returns `None` if `addr` is outside of the heap or is not
    /// aligned to the minimum block size.
    pub fn heap_slot(&self, addr: usize) -> Option<usize> {
        if addr < self.heap_base || addr > self.heap_last() {
            return None;
        }

        let heap_offset = addr - self.heap_base;
        if heap_offset % self.min_block != 0 {
            return None;
        }

        let table_offset = heap_offset / self.granule_scale();
        Some(table_offset / self.entry_size)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::CORTEX_M
    }
}
