//! Bottom-up merging of freed blocks with their buddies.

use super::Arena;
use crate::{entry::Entry, Error, Result};
use core::cmp;

impl<M: AsRef<[u8]> + AsMut<[u8]>> Arena<M> {
    /// Free the block that starts at the heap address `addr`, and merge it
    /// with its buddies as long as they are free.
    ///
    /// Returns `addr` on success. Freeing an address that is not the start of an
    /// allocated block fails with [`Error::NotAllocated`] and leaves the table untouched.
    pub fn free(&mut self, addr: usize) -> Result<usize> {
        self.ensure_initialized()?;

        let slot = self.config.heap_slot(addr).ok_or(Error::InvalidAddress)?;
        let entry = self.entry(slot);
        if !entry.occupied {
            log::debug!("Tried to free {:#x}, which is not allocated", addr);
            return Err(Error::NotAllocated);
        }

        let merged = self.coalesce(slot);
        log::debug!(
            "Freed {} at {:#x}, now part of a free block of {} at {:#x}",
            crate::unit::bytes(entry.size),
            addr,
            crate::unit::bytes(self.entry(merged).size),
            self.config.heap_addr(merged),
        );

        Ok(addr)
    }

    /// Release the block at `slot` and merge it upwards.
    ///
    /// Returns the slot of the block where the freed memory ended up.
    fn coalesce(&mut self, slot: usize) -> usize {
        let mut entry = self.entry(slot);
        if entry.occupied {
            entry.occupied = false;
            self.set_entry(slot, entry);
        }

        // the root block has no buddy
        if entry.size >= self.config.max_block() {
            return slot;
        }

        // blocks at an even index (counted in their own size) are
        // the left buddy, blocks at an odd index the right one
        let span = entry.size / self.config.min_block();
        let buddy = if (slot / span) % 2 == 0 {
            slot + span
        } else {
            slot - span
        };

        // a buddy that is smaller than us is split further and can't be merged
        let other = self.entry(buddy);
        if other.occupied || other.size != entry.size {
            return slot;
        }

        let (low, high) = (cmp::min(slot, buddy), cmp::max(slot, buddy));
        log::trace!(
            "Merging buddies at slot {} and {} into a block of {}",
            low,
            high,
            entry.size * 2
        );

        self.set_entry(high, Entry::EMPTY);
        self.set_entry(low, Entry::free(entry.size + other.size));
        self.coalesce(low)
    }
}
