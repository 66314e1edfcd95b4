//! A minimal register machine and textual assembler for coherence-contract
//! experiments.

mod clock;
mod errors;
mod ledger;
mod machine;
mod opcodes;
mod parser;
mod program;
mod util;
mod value;

pub use clock::{Clock, FixedClock, SystemClock};
pub use errors::{AsmError, ExecError};
pub use ledger::{Contract, ContractRegistry, Ledger, Receipt};
pub use machine::{Flag, Machine, Termination, DEFAULT_STEP_BUDGET, REG_COUNT};
pub use opcodes::Opcode;
pub use program::{Instruction, Program};
pub use util::init_logger;
pub use value::{Num, Value};
