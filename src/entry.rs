//! Encoding of a single memory control block entry.
//!
//! Every entry stores the size of the block starting at its slot, in bytes.
//! Block sizes are powers of two of at least two bytes, so the lowest bit
//! of the size is always clear and is used to mark the block as occupied.

use bitflags::bitflags;

bitflags! {
    /// Flags that live inside the low bits of a raw entry.
    struct EntryFlags: u32 {
        const OCCUPIED = 1 << 0;
    }
}

/// The decoded state of the block that starts at a control table slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry {
    /// The size of the block in bytes, or `0` if no block starts at this slot.
    pub size: usize,
    /// Whether the block is currently handed out.
    pub occupied: bool,
}

impl Entry {
    /// An entry for a slot where no block starts.
    pub const EMPTY: Entry = Entry {
        size: 0,
        occupied: false,
    };

    /// A free block of `size` bytes.
    pub const fn free(size: usize) -> Self {
        Self {
            size,
            occupied: false,
        }
    }

    /// An allocated block of `size` bytes.
    pub const fn occupied(size: usize) -> Self {
        Self {
            size,
            occupied: true,
        }
    }

    /// Returns `true` if no block has been recorded at this slot.
    pub const fn is_empty(&self) -> bool {
        self.size == 0 && !self.occupied
    }

    /// Pack this entry into its raw representation.
    pub fn encode(self) -> u32 {
        debug_assert!(
            (self.size & EntryFlags::all().bits() as usize) == 0,
            "block size {:#x} overlaps the flag bits",
            self.size
        );

        let mut flags = EntryFlags::empty();
        flags.set(EntryFlags::OCCUPIED, self.occupied);
        self.size as u32 | flags.bits()
    }

    /// Unpack a raw entry.
    pub fn decode(raw: u32) -> Self {
        let flags = EntryFlags::from_bits_truncate(raw);
        Self {
            size: (raw & !EntryFlags::all().bits()) as usize,
            occupied: flags.contains(EntryFlags::OCCUPIED),
        }
    }

    /// Read a little endian entry that is `bytes.len()` bytes wide.
    pub(crate) fn read(bytes: &[u8]) -> Self {
        let raw = bytes
            .iter()
            .rev()
            .fold(0u32, |raw, &byte| (raw << 8) | byte as u32);
        Self::decode(raw)
    }

    /// Write this entry as little endian into `bytes`.
    pub(crate) fn write(self, bytes: &mut [u8]) {
        let raw = self.encode();
        bytes
            .iter_mut()
            .enumerate()
            .for_each(|(idx, byte)| *byte = (raw >> (idx * 8)) as u8);
    }
}
