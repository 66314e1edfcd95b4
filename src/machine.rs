use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use tracing::{debug, trace};

use crate::clock::{Clock, SystemClock};
use crate::errors::ExecError;
use crate::ledger::{ContractRegistry, Ledger};
use crate::opcodes::Opcode;
use crate::program::{Instruction, Program};
use crate::value::{Num, Value};

/// Number of general-purpose registers, `R0..R7`.
pub const REG_COUNT: usize = 8;
/// Default step budget for [`Machine::run`].
pub const DEFAULT_STEP_BUDGET: u64 = 10_000;

/// Initial stack pointer. Reserved: no instruction touches the stack yet.
const STACK_BASE: usize = 1024;
/// Initial energy budget. Reserved: no instruction consumes energy yet.
const ENERGY_BUDGET: u32 = 10_000;
/// Upper bound on accumulated coherence.
const COHERENCE_CEILING: u32 = 10_000;
/// Modulus for synthetic observation ids.
const OBSERVATION_MODULUS: i64 = 100_000;

/// The flag register.
///
/// Two meaning domains share this field: CMP writes a three-way comparison
/// outcome and VALIDATE writes a pass/fail check. Keeping them as distinct
/// variants avoids cross-contaminating the two result kinds; JZ and JNZ
/// branch on [`Flag::is_set`], which covers both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flag {
    /// Three-way outcome of the last CMP.
    Cmp(Ordering),
    /// Pass/fail outcome of the last VALIDATE.
    Check(bool),
}

impl Flag {
    /// Whether JZ branches: the comparison found equal, or the check
    /// passed.
    pub fn is_set(self) -> bool {
        matches!(self, Flag::Cmp(Ordering::Equal) | Flag::Check(true))
    }

    /// The numeric encoding: 0 for less/fail, 1 for equal/pass, 2 for
    /// greater.
    pub fn code(self) -> u8 {
        match self {
            Flag::Cmp(Ordering::Less) | Flag::Check(false) => 0,
            Flag::Cmp(Ordering::Equal) | Flag::Check(true) => 1,
            Flag::Cmp(Ordering::Greater) => 2,
        }
    }
}

impl Default for Flag {
    fn default() -> Self {
        Flag::Check(false)
    }
}

/// Why a run stopped.
///
/// Step-limit exhaustion is a reported outcome, not an error: the program
/// simply did not converge within its budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The program counter ran past the end of the instruction sequence.
    ProgramEnd,
    /// A HALT instruction executed.
    Halt,
    /// The step budget was exhausted before the program terminated.
    StepLimit { steps: u64 },
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Termination::ProgramEnd => write!(f, "end of program"),
            Termination::Halt => write!(f, "HALT"),
            Termination::StepLimit { steps } => {
                write!(f, "max steps reached ({steps} executed)")
            }
        }
    }
}

/// The virtual machine.
///
/// One `Machine` value owns every piece of run state (registers, flags,
/// counters, the contract registry and the receipt ledger), so two
/// programs can never contaminate each other through shared globals.
/// Construct a fresh machine per run.
#[derive(Debug)]
pub struct Machine {
    program: Program,
    regs: [Num; REG_COUNT],
    pc: usize,
    sp: usize,
    flag: Flag,
    coherence: u32,
    energy: u32,
    memory: BTreeMap<i64, i64>,
    contracts: ContractRegistry,
    ledger: Ledger,
    clock: Box<dyn Clock>,
    output: Vec<String>,
}

impl Machine {
    /// Creates a machine over an assembled program, reading the system
    /// clock.
    pub fn new(program: Program) -> Self {
        Self::with_clock(program, Box::new(SystemClock))
    }

    /// Creates a machine with an injected clock, for reproducible runs.
    pub fn with_clock(program: Program, clock: Box<dyn Clock>) -> Self {
        Self {
            program,
            regs: [Num::default(); REG_COUNT],
            pc: 0,
            sp: STACK_BASE,
            flag: Flag::default(),
            coherence: 0,
            energy: ENERGY_BUDGET,
            memory: BTreeMap::new(),
            contracts: ContractRegistry::default(),
            ledger: Ledger::default(),
            clock,
            output: Vec::new(),
        }
    }

    /// Runs with the default step budget.
    pub fn run(&mut self) -> Result<Termination, ExecError> {
        self.run_with_budget(DEFAULT_STEP_BUDGET)
    }

    /// Executes from the current PC until the program ends, a HALT
    /// executes, or `max_steps` instructions have run. At most `max_steps`
    /// instructions execute, so a non-converging program cannot hang the
    /// caller.
    pub fn run_with_budget(&mut self, max_steps: u64) -> Result<Termination, ExecError> {
        let mut steps = 0u64;
        while self.pc < self.program.len() {
            if steps == max_steps {
                debug!(steps, "step budget exhausted");
                return Ok(Termination::StepLimit { steps });
            }
            steps += 1;
            if let Some(termination) = self.step()? {
                debug!(steps, %termination, "run terminated");
                return Ok(termination);
            }
        }
        debug!(steps, "program ended");
        Ok(Termination::ProgramEnd)
    }

    /// Executes the instruction at the current PC. The PC increments
    /// before dispatch, so jump handlers overwrite it with an absolute
    /// index.
    fn step(&mut self) -> Result<Option<Termination>, ExecError> {
        let Some(instr) = self.program.get(self.pc).cloned() else {
            return Ok(Some(Termination::ProgramEnd));
        };
        trace!(pc = self.pc, %instr, "step");
        self.pc += 1;

        match instr.opcode() {
            Opcode::Mov => self.exec_mov(&instr)?,
            Opcode::Add => self.exec_add(&instr)?,
            Opcode::Sub => self.exec_sub(&instr)?,
            Opcode::Cmp => self.exec_cmp(&instr)?,
            Opcode::Jmp => self.exec_jmp(&instr)?,
            Opcode::Jz => self.exec_jz(&instr)?,
            Opcode::Jnz => self.exec_jnz(&instr)?,
            Opcode::Print => self.exec_print(&instr),
            Opcode::Halt => return Ok(Some(Termination::Halt)),
            Opcode::Contract => self.exec_contract(&instr)?,
            Opcode::Observe => self.exec_observe(&instr)?,
            Opcode::Derive => self.exec_derive(&instr)?,
            Opcode::Apply => self.exec_apply(&instr)?,
            Opcode::Receipt => self.exec_receipt(&instr)?,
            Opcode::Validate => self.exec_validate(),
            Opcode::Resolve => self.exec_resolve(),
            // Placeholder: agents do not exist yet.
            Opcode::Sync => {}
        }
        Ok(None)
    }

    // --- operand resolution ---

    /// Parses a register token: case-insensitive `R` followed by decimal
    /// digits forming an index in range. Anything else is `None`.
    fn reg_index(token: &str) -> Option<usize> {
        let digits = token.strip_prefix(['R', 'r'])?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse::<usize>().ok().filter(|&i| i < REG_COUNT)
    }

    /// Resolves an operand token to a value. First match wins: register
    /// contents, numeric literal (float iff the token contains a `.`),
    /// label index, then the raw token itself. Resolution never fails;
    /// handlers reject the kinds they cannot use.
    fn resolve(&self, token: &str) -> Value {
        if let Some(idx) = Self::reg_index(token) {
            return self.regs[idx].into();
        }
        if token.contains('.') {
            if let Ok(f) = token.parse::<f64>() {
                return Value::Float(f);
            }
        } else if let Ok(n) = token.parse::<i64>() {
            return Value::Int(n);
        }
        if let Some(idx) = self.program.label(token) {
            return Value::Index(idx);
        }
        Value::Text(token.to_string())
    }

    fn num_operand(&self, opcode: Opcode, token: &str) -> Result<Num, ExecError> {
        let value = self.resolve(token);
        value.to_num().ok_or_else(|| ExecError::OperandKind {
            opcode,
            token: token.to_string(),
            expected: "a numeric value",
            actual: value.kind(),
        })
    }

    fn jump_target(&self, opcode: Opcode, token: &str) -> Result<usize, ExecError> {
        let value = self.resolve(token);
        value.to_index().ok_or_else(|| ExecError::OperandKind {
            opcode,
            token: token.to_string(),
            expected: "an instruction index",
            actual: value.kind(),
        })
    }

    /// Writes to a destination operand. Destinations are register names,
    /// never resolved values; a token that does not name a register is a
    /// fatal operand error.
    fn write_reg(&mut self, token: &str, value: Num) -> Result<(), ExecError> {
        let idx =
            Self::reg_index(token).ok_or_else(|| ExecError::BadRegister(token.to_string()))?;
        self.regs[idx] = value;
        Ok(())
    }

    // --- generic register machine ---

    fn exec_mov(&mut self, instr: &Instruction) -> Result<(), ExecError> {
        let src = self.num_operand(Opcode::Mov, instr.operand(1))?;
        self.write_reg(instr.operand(0), src)
    }

    fn exec_add(&mut self, instr: &Instruction) -> Result<(), ExecError> {
        let dst = self.num_operand(Opcode::Add, instr.operand(0))?;
        let src = self.num_operand(Opcode::Add, instr.operand(1))?;
        self.write_reg(instr.operand(0), dst + src)
    }

    fn exec_sub(&mut self, instr: &Instruction) -> Result<(), ExecError> {
        let dst = self.num_operand(Opcode::Sub, instr.operand(0))?;
        let src = self.num_operand(Opcode::Sub, instr.operand(1))?;
        self.write_reg(instr.operand(0), dst - src)
    }

    fn exec_cmp(&mut self, instr: &Instruction) -> Result<(), ExecError> {
        let a = self.num_operand(Opcode::Cmp, instr.operand(0))?;
        let b = self.num_operand(Opcode::Cmp, instr.operand(1))?;
        self.flag = Flag::Cmp(a.total_cmp(&b));
        Ok(())
    }

    fn exec_jmp(&mut self, instr: &Instruction) -> Result<(), ExecError> {
        self.pc = self.jump_target(Opcode::Jmp, instr.operand(0))?;
        Ok(())
    }

    fn exec_jz(&mut self, instr: &Instruction) -> Result<(), ExecError> {
        if self.flag.is_set() {
            self.pc = self.jump_target(Opcode::Jz, instr.operand(0))?;
        }
        Ok(())
    }

    fn exec_jnz(&mut self, instr: &Instruction) -> Result<(), ExecError> {
        if !self.flag.is_set() {
            self.pc = self.jump_target(Opcode::Jnz, instr.operand(0))?;
        }
        Ok(())
    }

    fn exec_print(&mut self, instr: &Instruction) {
        let token = instr.operand(0);
        // Register tokens emit their value; anything else emits the raw
        // token verbatim, with no numeric coercion.
        let line = match Self::reg_index(token) {
            Some(idx) => self.regs[idx].to_string(),
            None => token.to_string(),
        };
        self.output.push(line);
    }

    // --- coherence domain ---

    fn exec_contract(&mut self, instr: &Instruction) -> Result<(), ExecError> {
        let id = self.contracts.create(self.clock.now());
        self.write_reg(instr.operand(0), Num::Int(id as i64))
    }

    fn exec_observe(&mut self, instr: &Instruction) -> Result<(), ExecError> {
        let obs = (self.clock.now() as i64).rem_euclid(OBSERVATION_MODULUS);
        self.write_reg(instr.operand(0), Num::Int(obs))
    }

    fn exec_derive(&mut self, instr: &Instruction) -> Result<(), ExecError> {
        let obs = self.num_operand(Opcode::Derive, instr.operand(1))?;
        self.write_reg(instr.operand(0), obs + Num::Int(1))
    }

    fn exec_apply(&mut self, instr: &Instruction) -> Result<(), ExecError> {
        let policy = self.num_operand(Opcode::Apply, instr.operand(0))?;
        self.bump_coherence(policy.as_i64().rem_euclid(10) as u32);
        Ok(())
    }

    fn exec_receipt(&mut self, instr: &Instruction) -> Result<(), ExecError> {
        // Metadata is the raw token, observed as text rather than coerced.
        let meta = instr.operand(1).to_string();
        let id = self.ledger.append(self.clock.now(), meta);
        self.write_reg(instr.operand(0), Num::Int(id as i64))
    }

    fn exec_validate(&mut self) {
        // R0 holds the coherence target by convention.
        let target = self.regs[0].as_f64();
        self.flag = Flag::Check(self.coherence as f64 >= target);
    }

    fn exec_resolve(&mut self) {
        // Operand registers are reserved for a richer resolution policy.
        self.bump_coherence(5);
    }

    fn bump_coherence(&mut self, delta: u32) {
        self.coherence = (self.coherence + delta).min(COHERENCE_CEILING);
    }

    // --- inspection ---

    /// The value of register `idx`.
    ///
    /// # Panics
    /// Panics if `idx >= REG_COUNT`.
    pub fn reg(&self, idx: usize) -> Num {
        self.regs[idx]
    }

    pub fn regs(&self) -> &[Num; REG_COUNT] {
        &self.regs
    }

    pub fn pc(&self) -> usize {
        self.pc
    }

    /// Reserved stack pointer; no instruction reads or writes it yet.
    pub fn sp(&self) -> usize {
        self.sp
    }

    pub fn flag(&self) -> Flag {
        self.flag
    }

    pub fn coherence(&self) -> u32 {
        self.coherence
    }

    /// Reserved energy counter; no instruction consumes it yet.
    pub fn energy(&self) -> u32 {
        self.energy
    }

    /// Reserved sparse memory map; no instruction accesses it yet.
    pub fn memory(&self) -> &BTreeMap<i64, i64> {
        &self.memory
    }

    pub fn contracts(&self) -> &ContractRegistry {
        &self.contracts
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Lines emitted by PRINT, in execution order.
    pub fn output(&self) -> &[String] {
        &self.output
    }
}
