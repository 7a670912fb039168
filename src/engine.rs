use crate::address::{Operand, resolve};
use crate::instruction::{Field, Instruction, Modifier, Opcode};
use crate::memory::Core;

/// Why a process stopped executing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Retirement {
    /// Executed a `DAT`.
    Dat,
    /// `DIV` or `MOD` with a divisor that resolved to zero.
    DivideByZero,
}

/// What the scheduler should do with a process after one instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Requeue the process at this address.
    Continue(usize),
    /// Requeue at `next`, then spawn a new process at `spawn`.
    Split { next: usize, spawn: usize },
    /// Drop the process.
    Retire(Retirement),
}

/// Execute the instruction at `pc` against `core`.
///
/// The A operand is resolved completely, side effects included, before the
/// B operand. Arithmetic results are reduced modulo the core size.
pub fn execute(core: &mut Core, pc: usize) -> Outcome {
    let current = *core.cell(pc);
    let a = resolve(core, pc, current.a_mode, current.a_field);
    let b = resolve(core, pc, current.b_mode, current.b_field);

    let modifier = current.modifier;
    let next = core.offset(pc, 1);
    let skip = core.offset(pc, 2);
    let jump = core.offset(pc, a.read);
    let target = core.offset(pc, b.write);

    match current.opcode {
        Opcode::Dat => Outcome::Retire(Retirement::Dat),
        Opcode::Mov => {
            if modifier == Modifier::I {
                core.store(target as i64, a.value);
            } else {
                core.update(target, |cell| {
                    for &(src, dst) in modifier.pairs() {
                        cell.set_field(dst, a.value.field(src));
                    }
                });
            }
            Outcome::Continue(next)
        }
        Opcode::Add => {
            arithmetic(core, modifier, &a, &b, target, |x, y| Some(x + y));
            Outcome::Continue(next)
        }
        Opcode::Sub => {
            arithmetic(core, modifier, &a, &b, target, |x, y| Some(x - y));
            Outcome::Continue(next)
        }
        Opcode::Mul => {
            arithmetic(core, modifier, &a, &b, target, |x, y| Some(x * y));
            Outcome::Continue(next)
        }
        Opcode::Div => {
            let ok = arithmetic(core, modifier, &a, &b, target, |x, y| {
                (y != 0).then(|| x / y)
            });
            if ok {
                Outcome::Continue(next)
            } else {
                Outcome::Retire(Retirement::DivideByZero)
            }
        }
        Opcode::Mod => {
            let ok = arithmetic(core, modifier, &a, &b, target, |x, y| {
                (y != 0).then(|| x % y)
            });
            if ok {
                Outcome::Continue(next)
            } else {
                Outcome::Retire(Retirement::DivideByZero)
            }
        }
        Opcode::Jmp => Outcome::Continue(jump),
        Opcode::Jmz => {
            if all_zero(&b.value, modifier) {
                Outcome::Continue(jump)
            } else {
                Outcome::Continue(next)
            }
        }
        Opcode::Jmn => {
            if all_zero(&b.value, modifier) {
                Outcome::Continue(next)
            } else {
                Outcome::Continue(jump)
            }
        }
        Opcode::Djn => {
            let size = core.size() as i64;
            let decrement = |cell: &mut Instruction| {
                for &field in modifier.targets() {
                    cell.set_field(field, (cell.field(field) - 1).rem_euclid(size));
                }
            };
            core.update(target, &decrement);
            let mut tested = b.value;
            decrement(&mut tested);
            if all_zero(&tested, modifier) {
                Outcome::Continue(next)
            } else {
                Outcome::Continue(jump)
            }
        }
        Opcode::Seq => {
            if equal(&a.value, &b.value, modifier) {
                Outcome::Continue(skip)
            } else {
                Outcome::Continue(next)
            }
        }
        Opcode::Sne => {
            if equal(&a.value, &b.value, modifier) {
                Outcome::Continue(next)
            } else {
                Outcome::Continue(skip)
            }
        }
        Opcode::Slt => {
            let less = modifier
                .pairs()
                .iter()
                .all(|&(src, dst)| a.value.field(src) < b.value.field(dst));
            if less {
                Outcome::Continue(skip)
            } else {
                Outcome::Continue(next)
            }
        }
        Opcode::Spl => Outcome::Split { next, spawn: jump },
        Opcode::Nop => Outcome::Continue(next),
    }
}

/// Apply `op(destination, source)` to every field pair the modifier selects,
/// writing into the cell at `target`.
///
/// Operands come from the snapshots taken during resolution, not from the
/// live core. A pair whose `op` yields `None` is left untouched and makes
/// the whole call report failure.
fn arithmetic(
    core: &mut Core,
    modifier: Modifier,
    a: &Operand,
    b: &Operand,
    target: usize,
    op: impl Fn(i128, i128) -> Option<i128>,
) -> bool {
    let size = core.size() as i128;
    let mut ok = true;
    let mut results: [Option<(Field, i64)>; 2] = [None, None];
    for (slot, &(src, dst)) in modifier.pairs().iter().enumerate() {
        let x = b.value.field(dst) as i128;
        let y = a.value.field(src) as i128;
        match op(x, y) {
            Some(value) => results[slot] = Some((dst, value.rem_euclid(size) as i64)),
            None => ok = false,
        }
    }
    if results.iter().any(Option::is_some) {
        core.update(target, |cell| {
            for (field, value) in results.iter().flatten() {
                cell.set_field(*field, *value);
            }
        });
    }
    ok
}

/// Whether the fields the modifier tests are all zero.
fn all_zero(value: &Instruction, modifier: Modifier) -> bool {
    modifier.targets().iter().all(|&field| value.field(field) == 0)
}

/// Whether A and B agree on the fields the modifier compares. `I` compares
/// the whole instruction.
fn equal(a: &Instruction, b: &Instruction, modifier: Modifier) -> bool {
    if modifier == Modifier::I {
        return a == b;
    }
    modifier
        .pairs()
        .iter()
        .all(|&(src, dst)| a.field(src) == b.field(dst))
}
