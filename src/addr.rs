//! Translation between simulated addresses and offsets into the backing memory.

/// A contiguous range of the simulated address space, backed by
/// a byte buffer that starts at offset `0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressSpace {
    base: usize,
    size: usize,
}

impl AddressSpace {
    /// Create a new address space that starts at `base` and spans `size` bytes.
    pub const fn new(base: usize, size: usize) -> Self {
        Self { base, size }
    }

    /// The first address of this space.
    pub const fn base(&self) -> usize {
        self.base
    }

    /// The number of bytes inside this space.
    pub const fn size(&self) -> usize {
        self.size
    }

    /// One past the last address of this space.
    ///
    /// Saturates at `usize::MAX` for spaces that touch the end of the address space.
    pub const fn end(&self) -> usize {
        self.base.saturating_add(self.size)
    }

    /// Check if `addr` lies inside this space.
    pub const fn contains(&self, addr: usize) -> bool {
        addr >= self.base && addr < self.end()
    }

    /// Convert a simulated address into an offset into the backing memory.
    ///
    /// Callers only pass addresses that were derived from the layout,
    /// so the result is always in bounds.
    pub fn to_offset(&self, addr: usize) -> usize {
        debug_assert!(
            self.contains(addr),
            "address {:#x} outside of {:?}",
            addr,
            self
        );
        addr - self.base
    }

    /// Convert an offset into the backing memory back into a simulated address.
    pub fn to_addr(&self, offset: usize) -> usize {
        debug_assert!(
            offset < self.size,
            "offset {:#x} outside of {:?}",
            offset,
            self
        );
        self.base + offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translates_both_ways() {
        let space = AddressSpace::new(0x2000_0000, 0x8000);

        assert_eq!(space.to_offset(0x2000_1000), 0x1000);
        assert_eq!(space.to_addr(0x6800), 0x2000_6800);
        assert_eq!(space.to_addr(space.to_offset(0x2000_7FFF)), 0x2000_7FFF);
    }

    #[test]
    fn bounds() {
        let space = AddressSpace::new(0x2000_0000, 0x8000);

        assert!(space.contains(0x2000_0000));
        assert!(space.contains(0x2000_7FFF));
        assert!(!space.contains(0x2000_8000));
        assert!(!space.contains(0x1FFF_FFFF));
        assert_eq!(space.end(), 0x2000_8000);
    }
}
