//! Register Bank Tests.
//!
//! The bank is driven by constants so each test controls exactly one read and one
//! write per cycle.

use mipsflow_core::common::{BuildError, EditError};
use mipsflow_core::config::Config;
use mipsflow_core::core::units::{
    register_name, ConstantRegister, ConstantSpec, RegisterBankSpec, UnitSpec,
};
use mipsflow_core::sim::description::{
    CircuitDescription, ComponentDescription, Endpoint, WireDescription,
};
use mipsflow_core::Cpu;
use rstest::rstest;

fn constant(id: &str, size: u8, value: u32) -> ComponentDescription {
    ComponentDescription::new(id, UnitSpec::Constant(ConstantSpec { size, value }))
}

fn wire(from: &str, to: &str) -> WireDescription {
    let (fc, fp) = from.split_once('.').unwrap();
    let (tc, tp) = to.split_once('.').unwrap();
    WireDescription {
        from: Endpoint::new(fc, fp),
        to: vec![Endpoint::new(tc, tp)],
    }
}

/// A bank reading register `read` and writing `value` to register `write`.
fn bank(spec: RegisterBankSpec, read: u32, write: u32, value: u32) -> Cpu {
    CircuitDescription {
        components: vec![
            ComponentDescription::new("regs", UnitSpec::RegisterBank(spec)).with_latency(100),
            constant("read", 5, read),
            constant("dest", 5, write),
            constant("value", 32, value),
            constant("enable", 1, 1),
        ],
        wires: vec![
            wire("read.output", "regs.read_reg1"),
            wire("read.output", "regs.read_reg2"),
            wire("dest.output", "regs.write_reg"),
            wire("value.output", "regs.write_data"),
            wire("enable.output", "regs.reg_write"),
        ],
        ..CircuitDescription::default()
    }
    .build(Config::default())
    .unwrap()
}

fn read_data1(cpu: &Cpu) -> u32 {
    cpu.component_by_name("regs").unwrap().output("read_data1").unwrap().value()
}

#[test]
fn write_lands_at_the_clock_edge() {
    let mut cpu = bank(RegisterBankSpec::default(), 5, 5, 99);
    assert_eq!(read_data1(&cpu), 0);
    cpu.step();
    assert_eq!(cpu.registers()[5], 99);
    assert_eq!(read_data1(&cpu), 99);
}

#[test]
fn internal_forwarding_reads_the_write_in_the_same_cycle() {
    let spec = RegisterBankSpec {
        forwarding: true,
        ..RegisterBankSpec::default()
    };
    let cpu = bank(spec, 5, 5, 99);
    assert_eq!(cpu.registers()[5], 0);
    assert_eq!(read_data1(&cpu), 99);
}

#[test]
fn internal_forwarding_ignores_other_registers() {
    let spec = RegisterBankSpec {
        forwarding: true,
        ..RegisterBankSpec::default()
    };
    let cpu = bank(spec, 6, 5, 99);
    assert_eq!(read_data1(&cpu), 0);
}

#[rstest]
#[case(false)]
#[case(true)]
fn constant_register_ignores_writes(#[case] forwarding: bool) {
    let spec = RegisterBankSpec {
        forwarding,
        ..RegisterBankSpec::default()
    };
    let mut cpu = bank(spec, 0, 0, 99);
    assert_eq!(read_data1(&cpu), 0);
    cpu.step();
    assert_eq!(cpu.registers()[0], 0);
    assert_eq!(read_data1(&cpu), 0);
}

#[test]
fn constant_register_holds_a_nonzero_value() {
    let spec = RegisterBankSpec {
        num_registers: 32,
        constants: vec![ConstantRegister {
            register: 31,
            value: 0xDEAD,
        }],
        forwarding: false,
    };
    let mut cpu = bank(spec, 31, 31, 1);
    assert_eq!(read_data1(&cpu), 0xDEAD);
    cpu.step();
    assert_eq!(cpu.registers()[31], 0xDEAD);
}

#[test]
fn host_writes_respect_constants_and_range() {
    let mut cpu = bank(RegisterBankSpec::default(), 7, 1, 0);
    assert_eq!(cpu.set_register_value(0, 5), Err(EditError::ConstantRegister(0)));
    assert_eq!(
        cpu.set_register_value(32, 5),
        Err(EditError::RegisterOutOfRange {
            index: 32,
            count: 32
        })
    );
    cpu.set_register_value(7, 1234).unwrap();
    assert_eq!(cpu.registers()[7], 1234);
    assert_eq!(read_data1(&cpu), 1234);
}

#[rstest]
#[case::not_power_of_two(RegisterBankSpec { num_registers: 24, ..RegisterBankSpec::default() })]
#[case::too_small(RegisterBankSpec { num_registers: 1, constants: vec![], forwarding: false })]
#[case::constant_out_of_range(RegisterBankSpec {
    num_registers: 8,
    constants: vec![ConstantRegister { register: 8, value: 0 }],
    forwarding: false,
})]
#[case::constant_twice(RegisterBankSpec {
    num_registers: 8,
    constants: vec![
        ConstantRegister { register: 0, value: 0 },
        ConstantRegister { register: 0, value: 1 },
    ],
    forwarding: false,
})]
fn invalid_geometry_is_rejected(#[case] spec: RegisterBankSpec) {
    let mut builder = mipsflow_core::CpuBuilder::new();
    let result = builder.add_component(&ComponentDescription::new(
        "regs",
        UnitSpec::RegisterBank(spec),
    ));
    assert!(matches!(result, Err(BuildError::InvalidParameter { .. })));
}

#[test]
fn small_bank_uses_narrow_register_numbers() {
    let mut builder = mipsflow_core::CpuBuilder::new();
    let _ = builder
        .add_component(&ComponentDescription::new(
            "regs",
            UnitSpec::RegisterBank(RegisterBankSpec {
                num_registers: 8,
                ..RegisterBankSpec::default()
            }),
        ))
        .unwrap();
    let _ = builder.add_component(&constant("r", 5, 1)).unwrap();
    let result = builder.connect(&Endpoint::new("r", "output"), &[Endpoint::new("regs", "read_reg1")]);
    assert!(matches!(
        result,
        Err(BuildError::WidthMismatch {
            expected: 5,
            found: 3,
            ..
        })
    ));
}

#[rstest]
#[case(0, 32, "$zero")]
#[case(2, 32, "$v0")]
#[case(8, 32, "$t0")]
#[case(16, 32, "$s0")]
#[case(24, 32, "$t8")]
#[case(29, 32, "$sp")]
#[case(31, 32, "$ra")]
#[case(3, 8, "$3")]
#[case(40, 64, "$40")]
fn register_names(#[case] index: u32, #[case] count: usize, #[case] expected: &str) {
    assert_eq!(register_name(index, count), expected);
}

#[test]
fn bank_names_its_registers() {
    let cpu = bank(RegisterBankSpec::default(), 0, 1, 0);
    let regs = cpu.register_bank().unwrap();
    let names: Vec<String> = (0..4).map(|i| regs.name(i)).collect();
    assert_eq!(names, ["$zero", "$at", "$v0", "$v1"]);
}
