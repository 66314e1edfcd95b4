use std::collections::HashMap;
use std::fmt;

use smallvec::SmallVec;

use crate::errors::AsmError;
use crate::opcodes::Opcode;
use crate::parser;

/// Operand tokens as written in source, quotes already stripped.
pub type Operands = SmallVec<[String; 2]>;

/// A single decoded instruction: an opcode and its raw operand tokens.
///
/// Operands are resolved lazily at execution time, so a token carries no
/// type information here. Immutable once decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    opcode: Opcode,
    operands: Operands,
}

impl Instruction {
    pub(crate) fn new(opcode: Opcode, operands: Operands) -> Self {
        Self { opcode, operands }
    }

    pub fn opcode(&self) -> Opcode {
        self.opcode
    }

    pub fn operands(&self) -> &[String] {
        &self.operands
    }

    /// The operand at `idx`. Arity is validated at load time, so every
    /// handler may index up to its opcode's declared operand count.
    pub(crate) fn operand(&self, idx: usize) -> &str {
        &self.operands[idx]
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.operands.is_empty() {
            write!(f, "{}", self.opcode)
        } else {
            write!(f, "{} {}", self.opcode, self.operands.join(", "))
        }
    }
}

/// An assembled program: the immutable instruction sequence plus the label
/// table built during the first pass.
///
/// A `Program` is consumed by [`crate::Machine::new`]; re-loading code into
/// a live machine is not representable.
#[derive(Debug, Clone, Default)]
pub struct Program {
    instructions: Vec<Instruction>,
    labels: HashMap<String, usize>,
}

impl Program {
    /// Assembles source text. See the assembly format notes on
    /// [`crate::Machine`].
    pub fn parse(text: &str) -> Result<Self, AsmError> {
        parser::assemble(text)
    }

    pub(crate) fn new(instructions: Vec<Instruction>, labels: HashMap<String, usize>) -> Self {
        Self {
            instructions,
            labels,
        }
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn get(&self, pc: usize) -> Option<&Instruction> {
        self.instructions.get(pc)
    }

    /// The instruction index a label is bound to, if declared.
    pub fn label(&self, name: &str) -> Option<usize> {
        self.labels.get(name).copied()
    }

    pub fn labels(&self) -> &HashMap<String, usize> {
        &self.labels
    }
}
