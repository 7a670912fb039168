use serde::{Deserialize, Serialize};

use crate::instruction::Instruction;

/// A warrior as handed over by the assembler: decoded instructions plus
/// the offset its first process starts at.
///
/// The program itself is never executed; the copy loaded into the core is.
/// It belongs to whichever player it is entered for in
/// [`Match::new`](crate::battle::Match::new), so one program can face itself.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    instructions: Vec<Instruction>,
    #[serde(default)]
    entry: usize,
}

impl Program {
    pub fn new(instructions: Vec<Instruction>) -> Self {
        Self {
            instructions,
            entry: 0,
        }
    }

    /// Start execution `entry` instructions past the load address.
    pub fn with_entry(mut self, entry: usize) -> Self {
        self.entry = entry;
        self
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn entry(&self) -> usize {
        self.entry
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}

impl From<Vec<Instruction>> for Program {
    fn from(instructions: Vec<Instruction>) -> Self {
        Self::new(instructions)
    }
}
