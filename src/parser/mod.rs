use std::collections::HashMap;
use std::str::FromStr;

use crate::errors::AsmError;
use crate::opcodes::Opcode;
use crate::program::{Instruction, Operands, Program};


/// A classified source line. Classification happens exactly once, so the
/// label pass and the decode pass can never disagree about what a line is.
#[derive(Debug)]
enum SourceLine<'a> {
    /// `<name>:` binds the name to the next instruction index.
    Label { name: &'a str, line: usize },
    /// `<MNEMONIC> [operands]` becomes exactly one instruction.
    Instr {
        mnemonic: &'a str,
        rest: &'a str,
        line: usize,
    },
}

/// Trims lines, drops blanks and `;` comment lines, and classifies what
/// survives. `line` is the 1-based source line number for diagnostics.
fn classify(text: &str) -> Vec<SourceLine<'_>> {
    text.lines()
        .enumerate()
        .filter_map(|(i, raw)| {
            let line = raw.trim();
            if line.is_empty() || line.starts_with(';') {
                return None;
            }
            Some((i + 1, line))
        })
        .map(|(line, text)| match text.strip_suffix(':') {
            Some(name) => SourceLine::Label {
                name: name.trim_end(),
                line,
            },
            None => {
                let (mnemonic, rest) = text
                    .split_once(char::is_whitespace)
                    .unwrap_or((text, ""));
                SourceLine::Instr {
                    mnemonic,
                    rest: rest.trim_start(),
                    line,
                }
            }
        })
        .collect()
}

/// Assembles source text into a [`Program`].
///
/// Pass 1 binds each label to the index the next instruction line will
/// receive; label lines do not advance the counter. Pass 2 decodes every
/// instruction line: the mnemonic lookup is case-insensitive, operands
/// split on commas, and the operand count must match the opcode's arity.
/// Operand tokens stay raw; they are resolved against machine state at
/// execution time.
pub(crate) fn assemble(text: &str) -> Result<Program, AsmError> {
    let lines = classify(text);

    let mut labels = HashMap::new();
    let mut pc = 0usize;
    for source_line in &lines {
        match source_line {
            SourceLine::Label { name, line } => {
                if labels.insert((*name).to_string(), pc).is_some() {
                    return Err(AsmError::DuplicateLabel {
                        line: *line,
                        label: (*name).to_string(),
                    });
                }
            }
            SourceLine::Instr { .. } => pc += 1,
        }
    }

    let mut instructions = Vec::with_capacity(pc);
    for source_line in &lines {
        let SourceLine::Instr {
            mnemonic,
            rest,
            line,
        } = source_line
        else {
            continue;
        };
        let opcode =
            Opcode::from_str(mnemonic).map_err(|_| AsmError::UnknownInstruction {
                line: *line,
                mnemonic: (*mnemonic).to_string(),
            })?;
        let operands = split_operands(rest);
        if operands.len() != opcode.num_args() {
            return Err(AsmError::WrongNumberOfOperands {
                line: *line,
                opcode,
                expected: opcode.num_args(),
                got: operands.len(),
            });
        }
        instructions.push(Instruction::new(opcode, operands));
    }

    Ok(Program::new(instructions, labels))
}

/// Splits the operand field on commas, trimming each token and stripping
/// one surrounding layer of double quotes. Quoting is purely cosmetic, so
/// a quoted token must not contain a comma.
fn split_operands(rest: &str) -> Operands {
    if rest.is_empty() {
        return Operands::new();
    }
    rest.split(',')
        .map(|token| unquote(token.trim()).to_string())
        .collect()
}

fn unquote(token: &str) -> &str {
    token
        .strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .unwrap_or(token)
}
