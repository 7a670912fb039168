use crate::instruction::{AddressMode, Instruction};
use crate::memory::Core;

/// A fully resolved operand.
///
/// `read` and `write` are offsets from the executing instruction, folded by
/// the core's read and write distances respectively. `value` is the cell at
/// the read offset as it stood right after this operand's side effects.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Operand {
    pub read: usize,
    pub write: usize,
    pub value: Instruction,
}

/// Resolve one operand of the instruction executing at `pc`.
///
/// Pre-decrements land before the pointer is followed; post-increments
/// land after the operand's value has been captured, so only later
/// resolutions observe them.
pub fn resolve(core: &mut Core, pc: usize, mode: AddressMode, field: i64) -> Operand {
    let field = core.wrap(field);
    let (mut read, mut write) = match mode {
        AddressMode::Immediate => (0, 0),
        _ => (core.fold_read(field), core.fold_write(field)),
    };

    let mut post_increment = None;
    if let Some(which) = mode.indirection() {
        let pointer = core.offset(pc, write);
        if mode.is_pre_decrement() {
            core.update(pointer, |cell| {
                let decremented = cell.field(which) - 1;
                cell.set_field(which, decremented);
            });
        }
        if mode.is_post_increment() {
            post_increment = Some(pointer);
        }
        let read_step = core.cell(core.offset(pc, read)).field(which) as usize;
        let write_step = core.cell(pointer).field(which) as usize;
        read = core.fold_read(read + read_step);
        write = core.fold_write(write + write_step);
    }

    let value = *core.cell(core.offset(pc, read));

    if let (Some(pointer), Some(which)) = (post_increment, mode.indirection()) {
        core.update(pointer, |cell| {
            let incremented = cell.field(which) + 1;
            cell.set_field(which, incremented);
        });
    }

    Operand { read, write, value }
}
