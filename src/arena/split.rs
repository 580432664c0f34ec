//! Top-down search for a free block that is split on demand.

use super::Arena;
use crate::{entry::Entry, Error, Result};
use core::ops::Range;

impl<M: AsRef<[u8]> + AsMut<[u8]>> Arena<M> {
    /// Allocate a block that can hold at least `size` bytes.
    ///
    /// The block will be the smallest power of two that is large enough,
    /// and is always searched for in the lowest possible address first,
    /// so the placement is deterministic for a given table state.
    ///
    /// Returns the heap address of the block.
    pub fn allocate(&mut self, size: usize) -> Result<usize> {
        self.ensure_initialized()?;

        if size < self.config.min_block() || size > self.config.max_block() {
            log::debug!("Rejected allocation of {} bytes", size);
            return Err(Error::InvalidSize);
        }

        let slot = self
            .split_search(size, 0..self.config.slot_count())
            .ok_or(Error::OutOfMemory)?;

        let addr = self.config.heap_addr(slot);
        log::debug!(
            "Allocated {} at {:#x} for {} bytes",
            crate::unit::bytes(self.entry(slot).size),
            addr,
            size
        );
        Ok(addr)
    }

    /// Search the block that spans `window` for a free block
    /// of at least `size` bytes.
    ///
    /// Returns the slot of the block that was marked as occupied.
    fn split_search(&mut self, size: usize, window: Range<usize>) -> Option<usize> {
        let entire = window.len() * self.config.min_block();
        let half = entire / 2;

        if size > half {
            // this window is the smallest block that fits
            let entry = self.entry(window.start);
            if entry.occupied || entry.size < entire {
                return None;
            }

            self.set_entry(window.start, Entry::occupied(entire));
            return Some(window.start);
        }

        let midpoint = window.start + window.len() / 2;
        match self.split_search(size, window.start..midpoint) {
            Some(slot) => {
                // the left half was taken from this block, so the
                // right half becomes its own block, unless it already is one
                if self.entry(midpoint).is_empty() {
                    log::trace!(
                        "Split block at slot {} into two halves of {}",
                        window.start,
                        half
                    );
                    self.set_entry(midpoint, Entry::free(half));
                }
                Some(slot)
            }
            None => self.split_search(size, midpoint..window.end),
        }
    }
}
