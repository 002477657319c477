//! Host Edit Tests.
//!
//! Accepted edits re-evaluate the current cycle; rejected ones change nothing.

use crate::common::asm::*;
use crate::common::harness::TestContext;
use mipsflow_core::common::EditError;
use mipsflow_core::config::Config;
use mipsflow_core::core::units::{AdderSpec, ConstantSpec, UnitSpec};
use mipsflow_core::sim::description::{
    CircuitDescription, ComponentDescription, Endpoint, WireDescription,
};
use rstest::rstest;

fn program() -> TestContext {
    TestContext::preset("single-cycle").load_program(&[
        add(10, 8, 9),
        addi(1, 0, 1),
        addi(2, 0, 2),
    ])
}

#[test]
fn register_edit_is_visible_immediately() {
    let mut ctx = program();
    ctx.cpu.set_register_value(8, 3).unwrap();
    ctx.cpu.set_register_value(9, 4).unwrap();
    assert_eq!(ctx.port("alu", "result"), 7);
    assert_eq!(ctx.port("regbank", "write_data"), 7);
}

#[test]
fn program_counter_edit_refetches() {
    let mut ctx = program();
    assert_eq!(
        ctx.cpu.set_program_counter(2),
        Err(EditError::UnalignedAddress(2))
    );
    ctx.cpu.set_program_counter(8).unwrap();
    assert_eq!(ctx.cpu.pc(), Some(8));
    assert_eq!(ctx.cpu.stages().fetching(), Some(8));
    assert_eq!(ctx.port("imem", "instruction"), addi(2, 0, 2));

    let outcome = ctx.run();
    assert_eq!(outcome.cycles, 1);
    assert_eq!((ctx.reg(1), ctx.reg(2)), (0, 2));
}

#[test]
fn program_counter_past_the_program_finishes() {
    let mut ctx = program();
    ctx.cpu.set_program_counter(64).unwrap();
    assert!(ctx.cpu.is_finished());
    assert_eq!(ctx.port("imem", "instruction"), 0);
}

#[rstest]
#[case::unaligned(2, EditError::UnalignedAddress(2))]
#[case::past_the_end(1024, EditError::AddressOutOfRange(1024))]
fn rejected_memory_writes(#[case] address: u32, #[case] expected: EditError) {
    let mut ctx = program();
    assert_eq!(ctx.cpu.set_data_memory_word(address, 1), Err(expected));
}

#[test]
fn last_memory_word_is_writable() {
    let mut ctx = program();
    ctx.cpu.set_data_memory_word(1020, 5).unwrap();
    assert_eq!(ctx.mem(1020), 5);
    assert_eq!(ctx.cpu.data_memory().unwrap().words().len(), 256);
}

#[test]
fn rejected_edit_leaves_state_unchanged() {
    let mut ctx = program();
    ctx.cpu.step();
    let components = ctx.cpu.components().to_vec();
    let counters = *ctx.cpu.counters();
    let revision = ctx.cpu.revision();

    assert!(ctx.cpu.set_register_value(0, 1).is_err());
    assert!(ctx.cpu.set_register_value(40, 1).is_err());
    assert!(ctx.cpu.set_program_counter(3).is_err());
    assert!(ctx.cpu.set_data_memory_word(4096, 1).is_err());
    assert!(ctx.cpu.set_component_latency("alu", -5).is_err());

    assert_eq!(ctx.cpu.components(), components.as_slice());
    assert_eq!(*ctx.cpu.counters(), counters);
    assert_eq!(ctx.cpu.revision(), revision);
}

#[test]
fn accepted_edits_bump_the_revision() {
    let mut ctx = program();
    let start = ctx.cpu.revision();
    ctx.cpu.set_register_value(8, 1).unwrap();
    ctx.cpu.set_data_memory_word(0, 1).unwrap();
    ctx.cpu.set_component_latency("alu", 150).unwrap();
    assert!(ctx.cpu.add_breakpoint(4));
    ctx.cpu.step();
    assert_eq!(ctx.cpu.revision(), start + 5);
}

#[test]
fn datapath_without_state_units() {
    let circuit = CircuitDescription {
        components: vec![
            ComponentDescription::new("one", UnitSpec::Constant(ConstantSpec { size: 32, value: 1 })),
            ComponentDescription::new("add", UnitSpec::Adder(AdderSpec::default())).with_latency(10),
        ],
        wires: vec![WireDescription {
            from: Endpoint::new("one", "output"),
            to: vec![Endpoint::new("add", "in1"), Endpoint::new("add", "in2")],
        }],
        ..CircuitDescription::default()
    };
    let mut cpu = circuit.build(Config::default()).unwrap();

    assert_eq!(
        cpu.load_program(vec![0]),
        Err(EditError::MissingUnit("instruction memory"))
    );
    assert_eq!(
        cpu.set_register_value(1, 1),
        Err(EditError::MissingUnit("register bank"))
    );
    assert_eq!(
        cpu.set_program_counter(0),
        Err(EditError::MissingUnit("program counter"))
    );
    assert_eq!(
        cpu.set_data_memory_word(0, 1),
        Err(EditError::MissingUnit("data memory"))
    );
    assert!(cpu.registers().is_empty());
    assert_eq!(cpu.pc(), None);
    assert!(!cpu.is_finished());

    // No clocked inputs: the period is the slowest output.
    assert_eq!(cpu.clock_period(), 10);
    let outcome = cpu.run_until(3, |_| false);
    assert_eq!(outcome.cycles, 3);
}
