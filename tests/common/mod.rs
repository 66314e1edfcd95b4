use covm::{FixedClock, Machine, Program, Termination};

/// Timestamp used by tests that do not care about the clock value.
pub const TEST_NOW: f64 = 1_700_000_000.0;

/// Assembles `source` and runs it on a fixed clock with the default step
/// budget.
pub fn run(source: &str) -> (Machine, Termination) {
    run_fixed(source, TEST_NOW)
}

/// Assembles `source` and runs it on a clock fixed at `now`.
pub fn run_fixed(source: &str, now: f64) -> (Machine, Termination) {
    let program = Program::parse(source).expect("program should assemble");
    let mut machine = Machine::with_clock(program, Box::new(FixedClock(now)));
    let termination = machine.run().expect("program should run");
    (machine, termination)
}

/// Assembles `source` and runs it with an explicit step budget.
pub fn run_budget(source: &str, max_steps: u64) -> (Machine, Termination) {
    let program = Program::parse(source).expect("program should assemble");
    let mut machine = Machine::with_clock(program, Box::new(FixedClock(TEST_NOW)));
    let termination = machine.run_with_budget(max_steps).expect("program should run");
    (machine, termination)
}
