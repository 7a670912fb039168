use crate::instruction::Instruction;
use crate::settings::Settings;

/// Restrict a core offset to the window `limit` allows.
///
/// `offset` is read as a signed distance in `(-core_size/2, core_size/2]`.
/// Distances of at most `limit` cells are kept; longer ones are reduced
/// modulo `limit`, keeping their sign. The result is expressed again in
/// `0..core_size`. With `limit == core_size` this is the identity.
pub fn fold(offset: usize, limit: usize, core_size: usize) -> usize {
    let size = core_size as i64;
    let offset = (offset % core_size) as i64;
    let signed = if offset > size / 2 { offset - size } else { offset };
    if signed.unsigned_abs() as usize <= limit {
        return offset as usize;
    }
    (signed % limit as i64).rem_euclid(size) as usize
}

/// The circular memory shared by both warriors.
///
/// Every address is reduced modulo the core size before use, and every
/// stored field is normalised into `0..core_size`, so there are no bounds
/// errors to observe.
#[derive(Clone, Debug)]
pub struct Core {
    cells: Vec<Instruction>,
    read_distance: usize,
    write_distance: usize,
    /// Addresses written since the last `take_writes`.
    journal: Vec<usize>,
}

impl Core {
    /// A core of `size` cells all holding `fill`, with no folding.
    pub fn new(size: usize, fill: Instruction) -> Self {
        Self::with_distances(size, fill, size, size)
    }

    pub fn with_distances(
        size: usize,
        fill: Instruction,
        read_distance: usize,
        write_distance: usize,
    ) -> Self {
        assert!(size > 0, "core size must be positive");
        Self {
            cells: vec![fill.normalized(size); size],
            read_distance,
            write_distance,
            journal: Vec::new(),
        }
    }

    /// A core configured from validated settings.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::with_distances(
            settings.core_size,
            settings.fill_instruction(),
            settings.read_distance,
            settings.write_distance,
        )
    }

    pub fn size(&self) -> usize {
        self.cells.len()
    }

    /// True modulo: negative addresses wrap to a non-negative representative.
    pub fn wrap(&self, address: i64) -> usize {
        address.rem_euclid(self.size() as i64) as usize
    }

    /// `(base + offset) mod size`.
    pub fn offset(&self, base: usize, offset: usize) -> usize {
        (base % self.size() + offset % self.size()) % self.size()
    }

    pub fn load(&self, address: i64) -> Instruction {
        self.cells[self.wrap(address)]
    }

    pub fn store(&mut self, address: i64, instruction: Instruction) {
        let address = self.wrap(address);
        self.cells[address] = instruction.normalized(self.size());
        self.journal.push(address);
    }

    /// The cell at an already-reduced address.
    pub fn cell(&self, address: usize) -> &Instruction {
        &self.cells[address % self.size()]
    }

    /// Mutate one cell in place, re-normalising its fields afterwards.
    pub fn update(&mut self, address: usize, f: impl FnOnce(&mut Instruction)) {
        let size = self.size();
        let address = address % size;
        let cell = &mut self.cells[address];
        f(cell);
        *cell = cell.normalized(size);
        self.journal.push(address);
    }

    pub fn fold_read(&self, offset: usize) -> usize {
        fold(offset % self.size(), self.read_distance, self.size())
    }

    pub fn fold_write(&self, offset: usize) -> usize {
        fold(offset % self.size(), self.write_distance, self.size())
    }

    /// Copy a run of instructions into consecutive cells starting at `base`.
    pub fn load_program(&mut self, base: usize, instructions: &[Instruction]) {
        for (i, &instruction) in instructions.iter().enumerate() {
            self.store((base + i) as i64, instruction);
        }
    }

    /// Distinct addresses written since the last call, in first-write order.
    pub fn take_writes(&mut self) -> Vec<usize> {
        let mut seen = Vec::with_capacity(self.journal.len());
        for address in self.journal.drain(..) {
            if !seen.contains(&address) {
                seen.push(address);
            }
        }
        seen
    }

    pub fn cells(&self) -> &[Instruction] {
        &self.cells
    }

    /// Redcode listing of `len` cells starting at `start`.
    pub fn disassemble(&self, start: usize, len: usize) -> String {
        use std::fmt::Write;
        let mut out = String::new();
        for i in 0..len {
            let address = self.offset(start, i);
            let _ = writeln!(out, "{address:05}: {}", self.cells[address]);
        }
        out
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn load_wraps_by_core_size(size in 1usize..512, address in -10_000i64..10_000) {
            let mut core = Core::new(size, Instruction::default());
            for i in 0..size {
                core.update(i, |c| c.a_field = i as i64);
            }
            prop_assert_eq!(core.load(address), core.load(address + size as i64));
            prop_assert_eq!(core.load(address), core.load(address - size as i64));
        }

        #[test]
        fn fold_stays_in_core_and_window(size in 1usize..4096, limit_seed in 1usize..4096, offset_seed in 0usize..4096) {
            let limit = 1 + limit_seed % size;
            let offset = offset_seed % size;
            let folded = fold(offset, limit, size);
            prop_assert!(folded < size);
            let signed = |x: usize| if x > size / 2 { x as i64 - size as i64 } else { x as i64 };
            let (before, after) = (signed(offset), signed(folded));
            if before.unsigned_abs() as usize <= limit {
                prop_assert_eq!(folded, offset);
            } else {
                // Same direction, shorter than the window, congruent modulo the window.
                prop_assert!((after.unsigned_abs() as usize) < limit);
                prop_assert!(after == 0 || after.signum() == before.signum());
                prop_assert_eq!((before - after) % limit as i64, 0);
            }
        }
    }
}
