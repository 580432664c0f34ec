//! The allocator context that owns the simulated memory and
//! the memory control block inside of it.

mod coalesce;
mod dump;
mod split;

pub use dump::TableDump;

use crate::{config::Config, entry::Entry, AllocStats, ConfigError, Error, Result};
use core::ops::Range;

/// A single buddy arena.
///
/// The arena keeps no state besides the backing memory: the tree of blocks
/// is encoded entirely inside the control table, where the entry at the
/// first slot of every block records its size and whether it is occupied.
pub struct Arena<M> {
    config: Config,
    memory: M,
    initialized: bool,
}

impl<M: AsRef<[u8]> + AsMut<[u8]>> Arena<M> {
    /// Create a new arena that uses `memory` as the simulated memory of `config`.
    ///
    /// The arena must be [initialized](Self::initialize) before it can be used.
    pub fn new(config: Config, memory: M) -> Result<Self> {
        if memory.as_ref().len() < config.sram().size() {
            return Err(Error::Config(ConfigError::MemoryTooSmall));
        }

        Ok(Self {
            config,
            memory,
            initialized: false,
        })
    }

    /// Zero the heap and reset the control table to a single free block
    /// that spans the whole heap.
    ///
    /// Calling this again discards every live allocation.
    pub fn initialize(&mut self) {
        let heap = self.heap_range();
        let table = self.table_range();

        let memory = self.memory.as_mut();
        memory[heap].iter_mut().for_each(|byte| *byte = 0);
        memory[table].iter_mut().for_each(|byte| *byte = 0);

        let max = self.config.max_block();
        self.set_entry(0, Entry::free(max));
        self.initialized = true;

        log::info!(
            "Initialized arena with {} heap at {:#x} and {} control entries at {:#x}",
            crate::unit::bytes(max),
            self.config.heap_base(),
            self.config.slot_count(),
            self.config.table_base(),
        );
    }

    /// Returns whether [`initialize`](Self::initialize) was called.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// The layout of this arena.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Decode the control entry at `slot`.
    ///
    /// # Panics
    ///
    /// Panics if `slot` is outside of the control table.
    pub fn entry(&self, slot: usize) -> Entry {
        let range = self.entry_range(slot);
        Entry::read(&self.memory.as_ref()[range])
    }

    /// Iterate over every block of the heap, in address order.
    ///
    /// Yields the slot where each block starts together with its entry.
    pub fn blocks(&self) -> Blocks<'_, M> {
        Blocks {
            arena: self,
            slot: 0,
        }
    }

    /// Collect statistics about the current state of this arena.
    pub fn stats(&self) -> AllocStats {
        let mut stats = AllocStats::with_name("Buddy Arena");
        stats.total = self.config.max_block();

        for (_, entry) in self.blocks() {
            stats.blocks += 1;
            if entry.occupied {
                stats.allocated += entry.size;
            } else {
                stats.free += entry.size;
            }
        }

        stats
    }

    /// A printable view of the control table.
    pub fn dump(&self) -> TableDump<'_, M> {
        TableDump { arena: self }
    }

    /// The raw bytes of the control table.
    pub fn table(&self) -> &[u8] {
        &self.memory.as_ref()[self.table_range()]
    }

    /// Borrow `len` heap bytes starting at `addr`.
    pub fn heap(&self, addr: usize, len: usize) -> Result<&[u8]> {
        let range = self.heap_bytes(addr, len)?;
        Ok(&self.memory.as_ref()[range])
    }

    /// Mutably borrow `len` heap bytes starting at `addr`.
    pub fn heap_mut(&mut self, addr: usize, len: usize) -> Result<&mut [u8]> {
        let range = self.heap_bytes(addr, len)?;
        Ok(&mut self.memory.as_mut()[range])
    }

    pub(crate) fn set_entry(&mut self, slot: usize, entry: Entry) {
        let range = self.entry_range(slot);
        entry.write(&mut self.memory.as_mut()[range]);
    }

    pub(crate) fn ensure_initialized(&self) -> Result<()> {
        if self.initialized {
            Ok(())
        } else {
            Err(Error::Uninitialized)
        }
    }

    fn entry_range(&self, slot: usize) -> Range<usize> {
        assert!(
            slot < self.config.slot_count(),
            "slot {} outside of the control table",
            slot
        );

        let start = self.config.sram().to_offset(self.config.table_addr(slot));
        start..start + self.config.entry_size()
    }

    fn table_range(&self) -> Range<usize> {
        let start = self.config.sram().to_offset(self.config.table_base());
        start..start + self.config.table_len()
    }

    fn heap_range(&self) -> Range<usize> {
        let start = self.config.sram().to_offset(self.config.heap_base());
        start..start + self.config.max_block()
    }

    fn heap_bytes(&self, addr: usize, len: usize) -> Result<Range<usize>> {
        let heap = self.heap_range();
        let heap_end = self.config.heap_base() + self.config.max_block();

        let end = addr.checked_add(len).ok_or(Error::InvalidAddress)?;
        if addr < self.config.heap_base() || end > heap_end {
            return Err(Error::InvalidAddress);
        }

        let start = heap.start + (addr - self.config.heap_base());
        Ok(start..start + len)
    }
}

/// Iterator over the blocks of an [`Arena`], created by [`Arena::blocks`].
pub struct Blocks<'arena, M> {
    arena: &'arena Arena<M>,
    slot: usize,
}

impl<M: AsRef<[u8]> + AsMut<[u8]>> Iterator for Blocks<'_, M> {
    type Item = (usize, Entry);

    fn next(&mut self) -> Option<Self::Item> {
        if self.slot >= self.arena.config.slot_count() {
            return None;
        }

        let slot = self.slot;
        let entry = self.arena.entry(slot);

        // an empty block start means the table is corrupted,
        // so stop walking instead of looping forever
        let span = entry.size / self.arena.config.min_block();
        if span == 0 {
            self.slot = self.arena.config.slot_count();
            return None;
        }

        self.slot += span;
        Some((slot, entry))
    }
}
