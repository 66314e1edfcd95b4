pub mod common;

use common::{run, run_fixed};
use covm::{Num, Termination};

#[test]
fn contract_writes_the_registered_id() {
    let (machine, _) = run_fixed("CONTRACT R1\n", 123.5);

    assert_eq!(machine.contracts().len(), 1);
    assert_eq!(machine.reg(1), Num::Int(1));
    let contract = machine.contracts().get(1).expect("contract should exist");
    assert_eq!(contract.created(), 123.5);
    assert_eq!(contract.meta(), None);
}

#[test]
fn contract_ids_are_monotonic() {
    let (machine, _) = run("CONTRACT R1\nCONTRACT R2\nCONTRACT R3\n");
    assert_eq!(machine.reg(1), Num::Int(1));
    assert_eq!(machine.reg(2), Num::Int(2));
    assert_eq!(machine.reg(3), Num::Int(3));
}

#[test]
fn observe_is_deterministic_under_a_fixed_clock() {
    let (machine, _) = run_fixed("OBSERVE R5\n", 1_234_567.0);
    assert_eq!(machine.reg(5), Num::Int(34_567));
}

#[test]
fn derive_adds_one_to_the_observation() {
    let (machine, _) = run_fixed("OBSERVE R2\nDERIVE R3, R2\n", 1_234_567.0);
    assert_eq!(machine.reg(3), Num::Int(34_568));
}

#[test]
fn apply_adds_the_policy_modulo_ten() {
    let (machine, _) = run("APPLY 23\n");
    assert_eq!(machine.coherence(), 3);

    let (machine, _) = run("APPLY 23\nAPPLY 23\n");
    assert_eq!(machine.coherence(), 6);
}

#[test]
fn apply_reads_registers_and_negative_policies() {
    let (machine, _) = run("MOV R3, 17\nAPPLY R3\n");
    assert_eq!(machine.coherence(), 7);

    // Euclidean remainder: -3 contributes 7.
    let (machine, _) = run("APPLY -3\n");
    assert_eq!(machine.coherence(), 7);
}

#[test]
fn coherence_never_exceeds_the_ceiling() {
    let source = "RESOLVE R1, R2\n".repeat(2_001);
    let (machine, _) = run(&source);
    assert_eq!(machine.coherence(), 10_000);
}

#[test]
fn resolve_bumps_coherence_without_reading_operands() {
    let (machine, _) = run("RESOLVE R1, R2\n");
    assert_eq!(machine.coherence(), 5);
    assert_eq!(machine.reg(1), Num::Int(0));
    assert_eq!(machine.reg(2), Num::Int(0));
}

#[test]
fn validate_checks_coherence_against_r0() {
    let (machine, _) = run("APPLY 23\nMOV R0, 3\nVALIDATE\n");
    assert_eq!(machine.flag().code(), 1);

    let (machine, _) = run("APPLY 23\nMOV R0, 4\nVALIDATE\n");
    assert_eq!(machine.flag().code(), 0);
}

#[test]
fn coherence_grows_monotonically() {
    let mut last = 0;
    for ops in 1..=6 {
        let source = "APPLY 9\nRESOLVE R1, R2\n".repeat(ops);
        let (machine, _) = run(&source);
        assert!(machine.coherence() >= last);
        assert!(machine.coherence() <= 10_000);
        last = machine.coherence();
    }
}

#[test]
fn receipt_ids_count_up_and_entries_stay_fixed() {
    let (machine, _) = run(
        "RECEIPT R1, \"a\"\n\
         RECEIPT R2, \"b\"\n\
         RECEIPT R3, \"c\"\n",
    );
    assert_eq!(machine.reg(1), Num::Int(1));
    assert_eq!(machine.reg(2), Num::Int(2));
    assert_eq!(machine.reg(3), Num::Int(3));

    let ledger = machine.ledger();
    assert_eq!(ledger.len(), 3);
    let ids: Vec<u64> = ledger.iter().map(|r| r.id()).collect();
    assert_eq!(ids, [1, 2, 3]);
    assert_eq!(ledger.get(1).expect("receipt 1").meta(), "a");
}

#[test]
fn receipt_metadata_is_stored_as_text() {
    let (machine, _) = run("RECEIPT R1, \"auto sync\"\nRECEIPT R2, 42\n");
    assert_eq!(machine.ledger().get(1).expect("receipt 1").meta(), "auto sync");
    // Numeric-looking metadata stays text: the token is never coerced.
    assert_eq!(machine.ledger().get(2).expect("receipt 2").meta(), "42");
}

#[test]
fn sync_has_no_observable_effect() {
    let (machine, termination) = run("SYNC peer\n");
    assert_eq!(termination, Termination::ProgramEnd);
    assert_eq!(machine.regs(), &[Num::Int(0); 8]);
    assert_eq!(machine.coherence(), 0);
    assert!(machine.ledger().is_empty());
    assert!(machine.contracts().is_empty());
    assert!(machine.output().is_empty());
}

#[test]
fn demo_program_converges_and_halts() {
    // A clock ending in ...998 makes every derived policy contribute 9,
    // so each unconverged iteration gains 14 coherence (APPLY 9 +
    // RESOLVE 5) and the run fits comfortably in the default budget.
    let (machine, termination) = run_fixed(include_str!("../demos/coherence.asm"), 99_998.0);

    assert_eq!(termination, Termination::Halt);
    assert_eq!(machine.output(), ["Coherence OK, stopping"]);
    // 681 full iterations at +14, then the 682nd APPLY reaches 9543.
    assert_eq!(machine.coherence(), 9_543);
    assert_eq!(machine.ledger().len(), 682);
    assert_eq!(machine.reg(1), Num::Int(1));
    assert_eq!(machine.reg(4), Num::Int(682));
}
