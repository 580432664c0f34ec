//! The process wide heap that is used by the trap handler.
//!
//! Every operation locks the whole arena, because splitting and merging
//! touches entries far away from the block that is allocated or freed.

use crate::{arena::Arena, config::Config, unit::KIB, AllocStats, Error, Result};
use spin::Mutex;

/// The size of the simulated SRAM that backs the global heap.
pub const SRAM_SIZE: usize = 32 * KIB;

/// The memory that backs the global heap.
pub type Sram = [u8; SRAM_SIZE];

static HEAP: GlobalArena = GlobalArena::new();

/// An [`Arena`] with the [`Config::CORTEX_M`] layout behind a lock.
pub struct GlobalArena(Mutex<Option<Arena<Sram>>>);

impl GlobalArena {
    /// Create a global arena that is not initialized yet.
    pub const fn new() -> Self {
        Self(Mutex::new(None))
    }

    /// Initialize the arena, or reset it if it was already initialized.
    pub fn init(&self) -> Result<()> {
        let mut guard = self.0.lock();
        match &mut *guard {
            Some(arena) => arena.initialize(),
            None => *guard = Some(Self::fresh()?),
        }
        Ok(())
    }

    /// Returns whether [`init`](Self::init) was called.
    pub fn is_initialized(&self) -> bool {
        self.0.lock().is_some()
    }

    /// Run `f` with exclusive access to the arena.
    pub fn with_arena<R>(&self, f: impl FnOnce(&mut Arena<Sram>) -> R) -> Result<R> {
        let mut guard = self.0.lock();
        let arena = guard.as_mut().ok_or(Error::Uninitialized)?;
        Ok(f(arena))
    }

    /// Allocate a block of at least `size` bytes.
    pub fn alloc(&self, size: usize) -> Result<usize> {
        self.with_arena(|arena| arena.allocate(size))?
    }

    /// Free the block that starts at `addr`.
    pub fn free(&self, addr: usize) -> Result<usize> {
        self.with_arena(|arena| arena.free(addr))?
    }

    /// Like [`alloc`](Self::alloc), but initializes the arena
    /// if it wasn't initialized before.
    pub fn alloc_or_init(&self, size: usize) -> Result<usize> {
        let mut guard = self.0.lock();
        if guard.is_none() {
            *guard = Some(Self::fresh()?);
        }

        let arena = guard.as_mut().ok_or(Error::Uninitialized)?;
        arena.allocate(size)
    }

    /// Return the statistics for this arena.
    pub fn stats(&self) -> Result<AllocStats> {
        self.with_arena(|arena| arena.stats())
    }

    fn fresh() -> Result<Arena<Sram>> {
        let mut arena = Arena::new(Config::CORTEX_M, [0; SRAM_SIZE])?;
        arena.initialize();
        Ok(arena)
    }
}

impl Default for GlobalArena {
    fn default() -> Self {
        Self::new()
    }
}

/// Return a reference to the global heap.
pub fn heap() -> &'static GlobalArena {
    &HEAP
}

/// Initialize the global heap. Must be called once during startup.
pub fn kinit() -> Result<()> {
    heap().init()
}

/// Allocate `size` bytes from the global heap.
pub fn kalloc(size: usize) -> Result<usize> {
    heap().alloc(size)
}

/// Free the block at `addr` of the global heap.
pub fn kfree(addr: usize) -> Result<usize> {
    heap().free(addr)
}

/// Like [`kalloc`], but initializes the global heap on first use.
pub fn malloc(size: usize) -> Result<usize> {
    heap().alloc_or_init(size)
}

/// Free the block at `addr` of the global heap.
pub fn free(addr: usize) -> Result<usize> {
    kfree(addr)
}
