use thiserror::Error;

use crate::opcodes::Opcode;

/// Errors raised while assembling source text into a [`crate::Program`].
#[derive(Error, Debug)]
pub enum AsmError {
    /// Unrecognized instruction mnemonic.
    #[error("line {line}: unknown instruction: {mnemonic}")]
    UnknownInstruction { line: usize, mnemonic: String },

    /// Wrong number of operands for an instruction.
    #[error("line {line}: {opcode} expects {expected} operand(s), got {got}")]
    WrongNumberOfOperands {
        line: usize,
        opcode: Opcode,
        expected: usize,
        got: usize,
    },

    /// Label declared more than once.
    #[error("line {line}: duplicate label: {label}")]
    DuplicateLabel { line: usize, label: String },
}

/// Errors that abort a run. Nothing here is retried; the caller decides
/// whether to surface, log, or re-run with different input.
#[derive(Error, Debug)]
pub enum ExecError {
    /// Destination token is not a valid register name.
    #[error("bad register: {0}")]
    BadRegister(String),

    /// An operand resolved to a value kind the instruction cannot use.
    #[error("{opcode}: operand {token:?} is {actual}, expected {expected}")]
    OperandKind {
        opcode: Opcode,
        token: String,
        expected: &'static str,
        actual: &'static str,
    },
}
