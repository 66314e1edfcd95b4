use strum_macros::{Display, EnumCount, EnumString};

/// The CoVM mnemonic set.
///
/// Mnemonic lookup is case-insensitive; `Display` renders the canonical
/// uppercase form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumCount, EnumString)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum Opcode {
    // Generic register machine
    Mov,
    Add,
    Sub,
    Cmp,
    Jmp,
    Jz,
    Jnz,
    Print,
    Halt,

    // Coherence domain
    Contract,
    Observe,
    Derive,
    Apply,
    Receipt,
    Validate,
    Resolve,
    Sync,
}

impl Opcode {
    /// Returns the number of operands expected by the given opcode.
    pub fn num_args(&self) -> usize {
        match self {
            Opcode::Mov => 2,
            Opcode::Add => 2,
            Opcode::Sub => 2,
            Opcode::Cmp => 2,
            Opcode::Jmp => 1,
            Opcode::Jz => 1,
            Opcode::Jnz => 1,
            Opcode::Print => 1,
            Opcode::Halt => 0,
            Opcode::Contract => 1,
            Opcode::Observe => 1,
            Opcode::Derive => 2,
            Opcode::Apply => 1,
            Opcode::Receipt => 2,
            Opcode::Validate => 0,
            Opcode::Resolve => 2,
            Opcode::Sync => 1,
        }
    }
}
