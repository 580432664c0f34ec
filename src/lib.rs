//! A buddy allocator for a single, fixed size heap.
//!
//! The heap is one block of [`max_block`](Config::max_block) bytes that is split
//! into halves until a block of the requested size is reached. Instead of storing
//! headers next to the blocks, the state of every block lives inside a separate
//! memory control block (the control table), which holds one entry for every
//! minimum sized block of the heap. The tree of blocks is never stored explicitly:
//! children and buddies are found using address arithmetic on the slot indices.
//!
//! Both the heap and the control table live inside a simulated memory that is
//! addressed like the SRAM of a Cortex-M microcontroller.
//!
//! ```
//! use buddy_mcb::{Arena, Config};
//!
//! let mut arena = Arena::new(Config::CORTEX_M, [0u8; 0x8000]).unwrap();
//! arena.initialize();
//!
//! let addr = arena.allocate(100).unwrap();
//! assert_eq!(addr, 0x2000_1000);
//! assert_eq!(arena.free(addr), Ok(addr));
//! ```

#![deny(rust_2018_idioms, rustdoc::broken_intra_doc_links)]
#![cfg_attr(not(test), no_std)]

pub mod addr;
pub mod arena;
pub mod config;
pub mod entry;
pub mod global;
pub mod unit;

mod stats;
#[cfg(test)]
mod testing;

pub use arena::Arena;
pub use config::{Config, ConfigError};
pub use entry::Entry;
pub use stats::AllocStats;

use displaydoc_lite::displaydoc;

/// Result for every arena operation.
pub type Result<T, E = Error> = core::result::Result<T, E>;

displaydoc! {
    /// Any error that can happen while allocating or freeing heap memory.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Error {
        /// tried to allocate a size outside of the block size range.
        InvalidSize,
        /// tried to allocate, but there was no free block large enough.
        OutOfMemory,
        /// the address does not point to a block inside the heap.
        InvalidAddress,
        /// tried to free a block that is not allocated.
        NotAllocated,
        /// the arena was used before it was initialized.
        Uninitialized,
        /// {_0}
        Config(ConfigError),
    }
}
