use std::env;
use std::fs;

use anyhow::{Context, Result};
use covm::{init_logger, Machine, Program};
use tracing::info;

fn main() -> Result<()> {
    init_logger();

    let source = match env::args().nth(1) {
        Some(path) => fs::read_to_string(&path).with_context(|| format!("reading {path}"))?,
        None => include_str!("../demos/coherence.asm").to_string(),
    };

    let program = Program::parse(&source).context("assembling program")?;
    info!(instructions = program.len(), "program assembled");

    let mut machine = Machine::new(program);
    let termination = machine.run().context("running program")?;

    for line in machine.output() {
        println!("{line}");
    }
    println!("{termination}");
    println!("Final coherence: {}", machine.coherence());
    print!("{}", machine.ledger());

    Ok(())
}
