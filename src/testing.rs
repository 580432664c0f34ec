//! Helpers shared by the unit tests.

use crate::{arena::Arena, config::Config};
use std::sync::Once;

struct Logger;

impl log::Log for Logger {
    fn enabled(&self, _metadata: &log::Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &log::Record<'_>) {
        if self.enabled(record.metadata()) {
            let mod_path = record
                .module_path_static()
                .or_else(|| record.module_path())
                .unwrap_or("<n/a>");

            eprintln!("[ {:>5} ] [{}] {}", record.level(), mod_path, record.args());
        }
    }

    fn flush(&self) {}
}

/// Install the test logger, if it's not installed yet.
pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        // another test harness may have installed a logger already
        if log::set_logger(&Logger).is_ok() {
            log::set_max_level(log::LevelFilter::Trace);
        }
    });
}

/// An initialized arena with the Cortex-M layout.
pub fn arena() -> Arena<Vec<u8>> {
    init_logging();

    let config = Config::CORTEX_M;
    let mut arena = Arena::new(config, vec![0u8; config.sram().size()]).unwrap();
    arena.initialize();
    arena
}

/// Check every structural invariant of the control table.
///
/// * the blocks cover the heap exactly
/// * every block is a power of two inside the block size range and
///   aligned to its own size
/// * slots that don't start a block are empty
pub fn check_invariants<M: AsRef<[u8]> + AsMut<[u8]>>(arena: &Arena<M>) {
    let config = arena.config();
    let mut starts = vec![false; config.slot_count()];
    let mut total = 0;

    for (slot, entry) in arena.blocks() {
        assert!(entry.size.is_power_of_two(), "slot {}: {:?}", slot, entry);
        assert!(
            entry.size >= config.min_block() && entry.size <= config.max_block(),
            "slot {}: {:?}",
            slot,
            entry
        );

        let span = entry.size / config.min_block();
        assert_eq!(
            slot % span,
            0,
            "slot {} is not aligned to {:?}",
            slot,
            entry
        );

        starts[slot] = true;
        total += entry.size;
    }

    assert_eq!(total, config.max_block(), "blocks don't cover the heap");

    for (slot, &start) in starts.iter().enumerate() {
        if !start {
            assert!(
                arena.entry(slot).is_empty(),
                "stale entry at slot {}",
                slot
            );
        }
    }
}

/// Deterministic pseudo random numbers.
pub struct XorShift(u64);

impl XorShift {
    pub fn new(seed: u64) -> Self {
        Self(seed)
    }

    pub fn next(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    pub fn below(&mut self, bound: usize) -> usize {
        (self.next() % bound as u64) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn random_alloc_free_sequences() {
        for seed in 1..=8u64 {
            let mut rng = XorShift::new(seed.wrapping_mul(0x9E37_79B9_7F4A_7C15));
            let mut arena = arena();
            let initial = arena.table().to_vec();
            let mut live: Vec<(usize, usize, u8)> = Vec::new();

            for step in 0..400 {
                if live.is_empty() || rng.below(3) != 0 {
                    // a size that rounds up to a block of `32 << order`
                    let order = rng.below(9);
                    let block = 32 << order;
                    let size = if order == 0 {
                        block
                    } else {
                        block - rng.below(block / 2)
                    };
                    match arena.allocate(size) {
                        Ok(addr) => {
                            let block = arena.entry(arena.config().heap_slot(addr).unwrap()).size;
                            assert!(block >= size && block < size * 2);

                            for &(other, other_size, _) in &live {
                                assert!(addr + size <= other || other + other_size <= addr);
                            }

                            let tag = step as u8;
                            arena.heap_mut(addr, size).unwrap().fill(tag);
                            live.push((addr, size, tag));
                        }
                        Err(err) => assert_eq!(err, Error::OutOfMemory),
                    }
                } else {
                    let (addr, size, tag) = live.swap_remove(rng.below(live.len()));
                    assert!(arena
                        .heap(addr, size)
                        .unwrap()
                        .iter()
                        .all(|&b| b == tag));
                    assert_eq!(arena.free(addr), Ok(addr));
                }

                check_invariants(&arena);
            }

            for (addr, _, _) in live.drain(..) {
                arena.free(addr).unwrap();
            }
            assert_eq!(arena.table(), &initial[..], "seed {}", seed);
        }
    }

    #[test]
    fn small_custom_layout() {
        init_logging();

        let sram = crate::addr::AddressSpace::new(0x100, 0x200);
        let config = Config::new(sram, 0x100, 0x100, 16, 0x200, 4).unwrap();
        let mut arena = Arena::new(config, vec![0u8; 0x200]).unwrap();
        arena.initialize();

        let addrs = (0..16)
            .map(|_| arena.allocate(16).unwrap())
            .collect::<Vec<_>>();
        assert_eq!(addrs[15], 0x1F0);
        assert_eq!(arena.allocate(16), Err(Error::OutOfMemory));
        check_invariants(&arena);

        addrs.iter().rev().for_each(|&addr| {
            arena.free(addr).unwrap();
        });
        assert_eq!(arena.blocks().count(), 1);
        check_invariants(&arena);
    }
}
