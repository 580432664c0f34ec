use super::Arena;
use core::fmt;

/// Printable view of the control table of an [`Arena`].
///
/// The normal format only lists slots where a block starts,
/// the alternate format (`{:#}`) lists every slot.
pub struct TableDump<'arena, M> {
    pub(super) arena: &'arena Arena<M>,
}

impl<M: AsRef<[u8]> + AsMut<[u8]>> fmt::Display for TableDump<'_, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let config = self.arena.config();

        writeln!(f, "memory control block")?;
        "memory control block"
            .chars()
            .try_for_each(|_| write!(f, "~"))?;
        writeln!(f)?;

        for slot in 0..config.slot_count() {
            let entry = self.arena.entry(slot);
            if entry.is_empty() && !f.alternate() {
                continue;
            }

            let state = match (entry.is_empty(), entry.occupied) {
                (true, _) => "-",
                (false, true) => "occupied",
                (false, false) => "free",
            };

            writeln!(
                f,
                "{:#x} = {:#06x} ({}) {}",
                config.table_addr(slot),
                entry.encode(),
                entry.size,
                state
            )?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::testing::arena;

    #[test]
    fn lists_block_starts() {
        let mut arena = arena();
        arena.allocate(0x2000).unwrap();

        let dump = arena.dump().to_string();
        let lines = dump.lines().collect::<Vec<_>>();
        assert_eq!(
            &lines[2..],
            &[
                "0x20006800 = 0x2001 (8192) occupied",
                "0x20006a00 = 0x2000 (8192) free",
            ]
        );
    }

    #[test]
    fn alternate_lists_every_slot() {
        let arena = arena();

        let dump = format!("{:#}", arena.dump());
        assert_eq!(dump.lines().count(), 2 + 512);
        assert!(dump.contains("0x20006bfe = 0x0000 (0) -"));
    }

    #[test]
    fn dumping_does_not_mutate() {
        let mut arena = arena();
        arena.allocate(100).unwrap();

        let before = arena.table().to_vec();
        let _ = format!("{:#}", arena.dump());
        assert_eq!(arena.table(), &before[..]);
    }
}
