use std::fmt;

use serde::{Deserialize, Serialize};

/// The instruction set understood by the engine.
///
/// `Seq` is the ICWS'94 spelling of the older `CMP`; both names parse to it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Opcode {
    Dat,
    Mov,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Jmp,
    Jmz,
    Jmn,
    Djn,
    #[serde(alias = "CMP")]
    Seq,
    Sne,
    Slt,
    Spl,
    Nop,
}

impl Opcode {
    pub const ALL: [Opcode; 16] = [
        Opcode::Dat,
        Opcode::Mov,
        Opcode::Add,
        Opcode::Sub,
        Opcode::Mul,
        Opcode::Div,
        Opcode::Mod,
        Opcode::Jmp,
        Opcode::Jmz,
        Opcode::Jmn,
        Opcode::Djn,
        Opcode::Seq,
        Opcode::Sne,
        Opcode::Slt,
        Opcode::Spl,
        Opcode::Nop,
    ];

    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Dat => "DAT",
            Opcode::Mov => "MOV",
            Opcode::Add => "ADD",
            Opcode::Sub => "SUB",
            Opcode::Mul => "MUL",
            Opcode::Div => "DIV",
            Opcode::Mod => "MOD",
            Opcode::Jmp => "JMP",
            Opcode::Jmz => "JMZ",
            Opcode::Jmn => "JMN",
            Opcode::Djn => "DJN",
            Opcode::Seq => "SEQ",
            Opcode::Sne => "SNE",
            Opcode::Slt => "SLT",
            Opcode::Spl => "SPL",
            Opcode::Nop => "NOP",
        }
    }
}

/// Selects which sub-fields of the source and destination an opcode touches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Modifier {
    A,
    B,
    AB,
    BA,
    F,
    X,
    I,
}

impl Modifier {
    pub fn mnemonic(self) -> &'static str {
        match self {
            Modifier::A => "A",
            Modifier::B => "B",
            Modifier::AB => "AB",
            Modifier::BA => "BA",
            Modifier::F => "F",
            Modifier::X => "X",
            Modifier::I => "I",
        }
    }

    /// The (source, destination) field pairs this modifier selects.
    ///
    /// `I` pairs like `F`; opcodes that treat `I` as "whole instruction"
    /// check for it before consulting the pairs.
    pub fn pairs(self) -> &'static [(Field, Field)] {
        match self {
            Modifier::A => &[(Field::A, Field::A)],
            Modifier::B => &[(Field::B, Field::B)],
            Modifier::AB => &[(Field::A, Field::B)],
            Modifier::BA => &[(Field::B, Field::A)],
            Modifier::F | Modifier::I => &[(Field::A, Field::A), (Field::B, Field::B)],
            Modifier::X => &[(Field::A, Field::B), (Field::B, Field::A)],
        }
    }

    /// The destination fields this modifier selects, without their sources.
    pub fn targets(self) -> &'static [Field] {
        match self {
            Modifier::A | Modifier::BA => &[Field::A],
            Modifier::B | Modifier::AB => &[Field::B],
            Modifier::F | Modifier::X | Modifier::I => &[Field::A, Field::B],
        }
    }
}

/// How an operand's field is turned into an address.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AddressMode {
    /// `#`
    Immediate,
    /// `$`
    Direct,
    /// `*`
    AIndirect,
    /// `@`
    BIndirect,
    /// `{`
    APreDecrement,
    /// `<`
    BPreDecrement,
    /// `}`
    APostIncrement,
    /// `>`
    BPostIncrement,
}

impl AddressMode {
    pub fn symbol(self) -> char {
        match self {
            AddressMode::Immediate => '#',
            AddressMode::Direct => '$',
            AddressMode::AIndirect => '*',
            AddressMode::BIndirect => '@',
            AddressMode::APreDecrement => '{',
            AddressMode::BPreDecrement => '<',
            AddressMode::APostIncrement => '}',
            AddressMode::BPostIncrement => '>',
        }
    }

    /// The pointer-cell field an indirect mode follows, or `None` for
    /// immediate and direct operands.
    pub fn indirection(self) -> Option<Field> {
        match self {
            AddressMode::Immediate | AddressMode::Direct => None,
            AddressMode::AIndirect | AddressMode::APreDecrement | AddressMode::APostIncrement => {
                Some(Field::A)
            }
            AddressMode::BIndirect | AddressMode::BPreDecrement | AddressMode::BPostIncrement => {
                Some(Field::B)
            }
        }
    }

    pub fn is_pre_decrement(self) -> bool {
        matches!(self, AddressMode::APreDecrement | AddressMode::BPreDecrement)
    }

    pub fn is_post_increment(self) -> bool {
        matches!(self, AddressMode::APostIncrement | AddressMode::BPostIncrement)
    }
}

/// One of the two numeric fields of an instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Field {
    A,
    B,
}

/// A decoded Redcode instruction: one memory cell.
///
/// Field values are signed as handed in by the assembler. Once stored in a
/// [`Core`](crate::memory::Core) they are normalised into `0..core_size`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Instruction {
    pub opcode: Opcode,
    pub modifier: Modifier,
    pub a_mode: AddressMode,
    pub a_field: i64,
    pub b_mode: AddressMode,
    pub b_field: i64,
}

impl Instruction {
    pub fn new(
        opcode: Opcode,
        modifier: Modifier,
        a_mode: AddressMode,
        a_field: i64,
        b_mode: AddressMode,
        b_field: i64,
    ) -> Self {
        Self {
            opcode,
            modifier,
            a_mode,
            a_field,
            b_mode,
            b_field,
        }
    }

    /// Build an instruction whose modifier is the ICWS'94 default for its
    /// opcode and addressing modes.
    pub fn with_default_modifier(
        opcode: Opcode,
        a_mode: AddressMode,
        a_field: i64,
        b_mode: AddressMode,
        b_field: i64,
    ) -> Self {
        let modifier = default_modifier(opcode, a_mode, b_mode);
        Self::new(opcode, modifier, a_mode, a_field, b_mode, b_field)
    }

    /// The cell every address holds before programs are loaded:
    /// `opcode $0, $0` with the default modifier.
    pub fn fill(opcode: Opcode) -> Self {
        Self::with_default_modifier(opcode, AddressMode::Direct, 0, AddressMode::Direct, 0)
    }

    pub fn field(&self, field: Field) -> i64 {
        match field {
            Field::A => self.a_field,
            Field::B => self.b_field,
        }
    }

    pub fn set_field(&mut self, field: Field, value: i64) {
        match field {
            Field::A => self.a_field = value,
            Field::B => self.b_field = value,
        }
    }

    /// A copy with both fields reduced into `0..core_size`.
    pub fn normalized(mut self, core_size: usize) -> Self {
        let m = core_size as i64;
        self.a_field = self.a_field.rem_euclid(m);
        self.b_field = self.b_field.rem_euclid(m);
        self
    }
}

impl Default for Instruction {
    fn default() -> Self {
        Self::fill(Opcode::Dat)
    }
}

/// ICWS'94 default modifier for an opcode given its addressing modes.
pub fn default_modifier(opcode: Opcode, a_mode: AddressMode, b_mode: AddressMode) -> Modifier {
    let a_immediate = a_mode == AddressMode::Immediate;
    let b_immediate = b_mode == AddressMode::Immediate;
    match opcode {
        Opcode::Dat | Opcode::Nop => Modifier::F,
        Opcode::Mov | Opcode::Seq | Opcode::Sne => {
            if a_immediate {
                Modifier::AB
            } else if b_immediate {
                Modifier::B
            } else {
                Modifier::I
            }
        }
        Opcode::Add | Opcode::Sub | Opcode::Mul | Opcode::Div | Opcode::Mod => {
            if a_immediate {
                Modifier::AB
            } else if b_immediate {
                Modifier::B
            } else {
                Modifier::F
            }
        }
        Opcode::Slt => {
            if a_immediate {
                Modifier::AB
            } else {
                Modifier::B
            }
        }
        Opcode::Jmp | Opcode::Jmz | Opcode::Jmn | Opcode::Djn | Opcode::Spl => Modifier::B,
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{} {}{}, {}{}",
            self.opcode,
            self.modifier,
            self.a_mode.symbol(),
            self.a_field,
            self.b_mode.symbol(),
            self.b_field
        )
    }
}
