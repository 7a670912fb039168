//! A handful of classic warriors in decoded form.

use crate::instruction::AddressMode::{BIndirect, Direct, Immediate};
use crate::instruction::{AddressMode, Instruction, Opcode};
use crate::program::Program;

/// Names accepted by [`by_name`].
pub const NAMES: [&str; 5] = ["imp", "dwarf", "duck", "loop", "splitter"];

fn op(opcode: Opcode, a_mode: AddressMode, a: i64, b_mode: AddressMode, b: i64) -> Instruction {
    Instruction::with_default_modifier(opcode, a_mode, a, b_mode, b)
}

/// `MOV.I $0, $1`: copies itself one cell ahead forever.
pub fn imp() -> Program {
    Program::new(vec![op(Opcode::Mov, Direct, 0, Direct, 1)])
}

/// Drops a `DAT` bomb on every fourth cell.
pub fn dwarf() -> Program {
    Program::new(vec![
        op(Opcode::Add, Immediate, 4, Direct, 3),
        op(Opcode::Mov, Direct, 2, BIndirect, 2),
        op(Opcode::Jmp, Direct, -2, Direct, 0),
        op(Opcode::Dat, Immediate, 0, Immediate, 0),
    ])
}

/// A lone `DAT`: dies on its first instruction.
pub fn sitting_duck() -> Program {
    Program::new(vec![op(Opcode::Dat, Immediate, 0, Immediate, 0)])
}

/// `JMP $0`: survives forever without touching anything.
pub fn looper() -> Program {
    Program::new(vec![op(Opcode::Jmp, Direct, 0, Direct, 0)])
}

/// Forks until it hits the process limit, every process looping in place.
pub fn splitter() -> Program {
    Program::new(vec![
        op(Opcode::Spl, Direct, 0, Direct, 0),
        op(Opcode::Jmp, Direct, -1, Direct, 0),
    ])
}

pub fn by_name(name: &str) -> Option<Program> {
    match name {
        "imp" => Some(imp()),
        "dwarf" => Some(dwarf()),
        "duck" => Some(sitting_duck()),
        "loop" => Some(looper()),
        "splitter" => Some(splitter()),
        _ => None,
    }
}
