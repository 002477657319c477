//! Forwarding Unit Tests.
//!
//! The unit is linked to an 8-register bank with register 0 constant, and every
//! input is driven by a constant.

use crate::common::harness::linked_unit;
use mipsflow_core::core::units::UnitSpec;
use mipsflow_core::Cpu;
use pretty_assertions::assert_eq;
use rstest::rstest;

fn forwarding(linked: bool, ex_mem: (u32, u32), mem_wb: (u32, u32), rs: u32, rt: u32) -> Cpu {
    linked_unit(
        UnitSpec::ForwardingUnit,
        linked,
        &[
            ("ex_mem_reg_write", ex_mem.0),
            ("ex_mem_rd", ex_mem.1),
            ("mem_wb_reg_write", mem_wb.0),
            ("mem_wb_rd", mem_wb.1),
            ("id_ex_rs", rs),
            ("id_ex_rt", rt),
        ],
    )
}

fn selectors(cpu: &Cpu) -> (u32, u32) {
    let dut = cpu.component_by_name("dut").unwrap();
    (
        dut.output("forward_a").unwrap().value(),
        dut.output("forward_b").unwrap().value(),
    )
}

#[rstest]
#[case::ex_mem_to_rs((1, 3), (0, 0), 3, 5, (2, 0))]
#[case::mem_wb_to_rt((0, 0), (1, 5), 3, 5, (0, 1))]
#[case::ex_mem_wins((1, 3), (1, 3), 3, 3, (2, 2))]
#[case::both_sources((1, 3), (1, 5), 3, 5, (2, 1))]
#[case::constant_register((1, 0), (1, 0), 0, 0, (0, 0))]
#[case::write_disabled((0, 4), (0, 4), 4, 4, (0, 0))]
#[case::pending_ex_mem_destination((0, 4), (1, 4), 4, 6, (0, 0))]
#[case::no_match((1, 1), (1, 2), 3, 4, (0, 0))]
fn linked_unit_selects_sources(
    #[case] ex_mem: (u32, u32),
    #[case] mem_wb: (u32, u32),
    #[case] rs: u32,
    #[case] rt: u32,
    #[case] expected: (u32, u32),
) {
    let cpu = forwarding(true, ex_mem, mem_wb, rs, rt);
    assert_eq!(selectors(&cpu), expected);

    let dut = cpu.component_by_name("dut").unwrap();
    for port in ["forward_a", "forward_b"] {
        let output = dut.output(port).unwrap();
        assert_eq!(output.is_relevant(), output.value() != 0, "{port}");
    }
}

#[rstest]
#[case((1, 3), (1, 3), 3, 3)]
#[case((1, 7), (1, 9), 9, 7)]
fn unlinked_unit_never_forwards(
    #[case] ex_mem: (u32, u32),
    #[case] mem_wb: (u32, u32),
    #[case] rs: u32,
    #[case] rt: u32,
) {
    let cpu = forwarding(false, ex_mem, mem_wb, rs, rt);
    assert_eq!(selectors(&cpu), (0, 0));
    let dut = cpu.component_by_name("dut").unwrap();
    assert!(!dut.output("forward_a").unwrap().is_relevant());
    assert!(!dut.output("forward_b").unwrap().is_relevant());
}

#[test]
fn unlinked_unit_builds_without_inputs() {
    let cpu = linked_unit(UnitSpec::ForwardingUnit, false, &[]);
    assert_eq!(selectors(&cpu), (0, 0));
}
