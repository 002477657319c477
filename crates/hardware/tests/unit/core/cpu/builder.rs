//! Graph Construction Tests.
//!
//! Every rejection the builder can raise, plus the structural facts of a valid graph.

use mipsflow_core::common::BuildError;
use mipsflow_core::config::Config;
use mipsflow_core::core::pipeline::latches::{LatchField, PipelineRegisterSpec, ProgramCounterSpec};
use mipsflow_core::core::units::{AdderSpec, ConstantSpec, LinkSpec, RegisterBankSpec, UnitSpec};
use mipsflow_core::sim::description::{ComponentDescription, Endpoint};
use mipsflow_core::sim::presets;
use mipsflow_core::CpuBuilder;

fn constant(id: &str, size: u8, value: u32) -> ComponentDescription {
    ComponentDescription::new(id, UnitSpec::Constant(ConstantSpec { size, value }))
}

fn adder(id: &str) -> ComponentDescription {
    ComponentDescription::new(id, UnitSpec::Adder(AdderSpec::default())).with_latency(100)
}

fn latch(id: &str) -> ComponentDescription {
    ComponentDescription::new(
        id,
        UnitSpec::PipelineRegister(PipelineRegisterSpec {
            fields: vec![LatchField::new("value", 32)],
        }),
    )
}

fn end(component: &str, port: &str) -> Endpoint {
    Endpoint::new(component, port)
}

/// A constant and an adder with nothing wired yet.
fn constant_and_adder() -> CpuBuilder {
    let mut builder = CpuBuilder::new();
    let _ = builder.add_component(&constant("one", 32, 1)).unwrap();
    let _ = builder.add_component(&adder("add")).unwrap();
    builder
}

#[test]
fn empty_identifier_is_rejected() {
    let mut builder = CpuBuilder::new();
    assert!(matches!(
        builder.add_component(&constant("", 32, 0)),
        Err(BuildError::EmptyIdentifier { .. })
    ));
}

#[test]
fn duplicate_component_is_rejected() {
    let mut builder = constant_and_adder();
    assert_eq!(
        builder.add_component(&adder("add")),
        Err(BuildError::DuplicateComponent("add".to_string()))
    );
}

#[test]
fn second_program_counter_is_rejected() {
    let mut builder = CpuBuilder::new();
    let pc = UnitSpec::ProgramCounter(ProgramCounterSpec::default());
    let _ = builder
        .add_component(&ComponentDescription::new("pc", pc.clone()))
        .unwrap();
    assert_eq!(
        builder.add_component(&ComponentDescription::new("pc2", pc)),
        Err(BuildError::DuplicateUnit {
            kind: "program_counter",
            component: "pc2".to_string(),
        })
    );
}

#[test]
fn unknown_endpoints_are_rejected() {
    let mut builder = constant_and_adder();
    assert_eq!(
        builder.connect(&end("two", "output"), &[end("add", "in1")]),
        Err(BuildError::UnknownComponent("two".to_string()))
    );
    assert_eq!(
        builder.connect(&end("one", "output"), &[end("add", "in3")]),
        Err(BuildError::UnknownPort {
            component: "add".to_string(),
            port: "in3".to_string(),
        })
    );
    // Outputs and inputs live in separate namespaces.
    assert!(matches!(
        builder.connect(&end("add", "in1"), &[end("add", "in2")]),
        Err(BuildError::UnknownPort { .. })
    ));
}

#[test]
fn width_mismatch_is_rejected() {
    let mut builder = constant_and_adder();
    let _ = builder.add_component(&constant("byte", 8, 1)).unwrap();
    assert_eq!(
        builder.connect(&end("byte", "output"), &[end("add", "in1")]),
        Err(BuildError::WidthMismatch {
            from: "byte.output".to_string(),
            to: "add.in1".to_string(),
            expected: 8,
            found: 32,
        })
    );
}

#[test]
fn input_driven_twice_is_rejected() {
    let mut builder = constant_and_adder();
    let _ = builder.add_component(&constant("two", 32, 2)).unwrap();
    let _ = builder
        .connect(&end("one", "output"), &[end("add", "in1")])
        .unwrap();
    assert_eq!(
        builder.connect(&end("two", "output"), &[end("add", "in1")]),
        Err(BuildError::InputAlreadyConnected {
            component: "add".to_string(),
            port: "in1".to_string(),
        })
    );
    // The same input listed twice in one request is caught before anything connects.
    assert!(matches!(
        builder.connect(&end("two", "output"), &[end("add", "in2"), end("add", "in2")]),
        Err(BuildError::InputAlreadyConnected { .. })
    ));
    let _ = builder
        .connect(&end("two", "output"), &[end("add", "in2")])
        .unwrap();
    let cpu = builder.build(Config::default()).unwrap();
    assert_eq!(cpu.component_by_name("add").unwrap().output("output").unwrap().value(), 3);
}

#[test]
fn unconnected_required_input_is_rejected() {
    let mut builder = constant_and_adder();
    let _ = builder
        .connect(&end("one", "output"), &[end("add", "in1")])
        .unwrap();
    assert_eq!(
        builder.build(Config::default()).err(),
        Some(BuildError::UnconnectedInput {
            component: "add".to_string(),
            port: "in2".to_string(),
        })
    );
}

#[test]
fn connecting_an_output_again_extends_its_wire() {
    let mut builder = constant_and_adder();
    let first = builder
        .connect(&end("one", "output"), &[end("add", "in1")])
        .unwrap();
    let second = builder
        .connect(&end("one", "output"), &[end("add", "in2")])
        .unwrap();
    assert_eq!(first, second);

    let cpu = builder.build(Config::default()).unwrap();
    assert_eq!(cpu.wires().len(), 1);
    assert_eq!(cpu.wires()[0].targets().len(), 2);
    let add = cpu.component_by_name("add").unwrap();
    let source = add.input("in2").unwrap().source().unwrap();
    assert_eq!(cpu.component(source.component).unwrap().id(), "one");
}

#[test]
fn combinational_loop_is_rejected() {
    let mut builder = constant_and_adder();
    let _ = builder.add_component(&adder("other")).unwrap();
    let _ = builder
        .connect(&end("one", "output"), &[end("add", "in2"), end("other", "in2")])
        .unwrap();
    let _ = builder
        .connect(&end("add", "output"), &[end("other", "in1")])
        .unwrap();
    let _ = builder
        .connect(&end("other", "output"), &[end("add", "in1")])
        .unwrap();
    assert!(matches!(
        builder.build(Config::default()),
        Err(BuildError::CombinationalLoop { .. })
    ));
}

#[test]
fn loop_through_a_clocked_input_is_allowed() {
    let mut builder = CpuBuilder::new();
    let _ = builder.add_component(&constant("four", 32, 4)).unwrap();
    let _ = builder
        .add_component(&ComponentDescription::new(
            "pc",
            UnitSpec::ProgramCounter(ProgramCounterSpec::default()),
        ))
        .unwrap();
    let _ = builder.add_component(&adder("next")).unwrap();
    let _ = builder.connect(&end("pc", "address"), &[end("next", "in1")]).unwrap();
    let _ = builder.connect(&end("four", "output"), &[end("next", "in2")]).unwrap();
    let _ = builder.connect(&end("next", "output"), &[end("pc", "new")]).unwrap();

    let mut cpu = builder.build(Config::default()).unwrap();
    assert!(cpu.component_by_name("pc").unwrap().input("new").unwrap().is_clocked());
    cpu.step();
    cpu.step();
    assert_eq!(cpu.pc(), Some(8));
}

#[test]
fn control_unit_without_a_table_is_rejected() {
    let mut builder = CpuBuilder::new();
    let _ = builder
        .add_component(&ComponentDescription::new("control", UnitSpec::ControlUnit))
        .unwrap();
    assert!(matches!(
        builder.build(Config::default()),
        Err(BuildError::InvalidControlTable { .. })
    ));
}

#[test]
fn control_table_needs_a_control_unit() {
    let mut builder = constant_and_adder();
    assert_eq!(
        builder.set_control("add", presets::OPCODE_SIZE, &presets::mips_control_table()),
        Err(BuildError::WrongComponentKind {
            component: "add".to_string(),
            expected: "control_unit",
        })
    );
}

#[test]
fn control_unit_ports_follow_its_table() {
    let mut builder = CpuBuilder::new();
    let _ = builder
        .add_component(&ComponentDescription::new("control", UnitSpec::ControlUnit))
        .unwrap();
    let _ = builder.add_component(&constant("op", 6, 0x23)).unwrap();
    builder
        .set_control("control", presets::OPCODE_SIZE, &presets::mips_control_table())
        .unwrap();
    let _ = builder
        .connect(&end("op", "output"), &[end("control", "opcode")])
        .unwrap();
    let cpu = builder.build(Config::default()).unwrap();

    let control = cpu.component_by_name("control").unwrap();
    assert_eq!(control.outputs().len(), 9);
    assert_eq!(control.output("ALUOp").unwrap().size(), 2);
    assert_eq!(control.output("MemRead").unwrap().value(), 1);
    assert_eq!(control.output("MemWrite").unwrap().value(), 0);
}

#[test]
fn register_link_needs_an_existing_bank() {
    let mut builder = CpuBuilder::new();
    let forwarding = ComponentDescription::new(
        "fwd",
        UnitSpec::ForwardingUnit(LinkSpec {
            register_bank: Some("regs".to_string()),
        }),
    );
    assert_eq!(
        builder.add_component(&forwarding),
        Err(BuildError::UnknownComponent("regs".to_string()))
    );

    let _ = builder.add_component(&constant("regs", 32, 0)).unwrap();
    assert_eq!(
        builder.add_component(&forwarding),
        Err(BuildError::WrongComponentKind {
            component: "regs".to_string(),
            expected: "register_bank",
        })
    );
}

#[test]
fn register_links_are_recorded() {
    let cpu = presets::pipeline().build(Config::default()).unwrap();
    let bank = cpu.component_id("regbank").unwrap();
    for unit in ["forwarding_unit", "hazard_unit"] {
        let id = cpu.component_id(unit).unwrap();
        assert_eq!(cpu.linked_register_bank(id), Some(bank));
    }
    assert_eq!(cpu.register_links().len(), 2);
}

#[test]
fn small_bank_narrows_linked_unit_ports() {
    let mut builder = CpuBuilder::new();
    let _ = builder
        .add_component(&ComponentDescription::new(
            "regs",
            UnitSpec::RegisterBank(RegisterBankSpec {
                num_registers: 8,
                ..RegisterBankSpec::default()
            }),
        ))
        .unwrap();
    let _ = builder
        .add_component(&ComponentDescription::new(
            "hazard",
            UnitSpec::HazardDetectionUnit(LinkSpec {
                register_bank: Some("regs".to_string()),
            }),
        ))
        .unwrap();
    let _ = builder.add_component(&constant("r", 5, 1)).unwrap();
    assert!(matches!(
        builder.connect(&end("r", "output"), &[end("hazard", "if_id_rs")]),
        Err(BuildError::WidthMismatch { found: 3, .. })
    ));
}

#[test]
fn pipeline_stages_must_be_distinct_latches() {
    let mut builder = constant_and_adder();
    let _ = builder.add_component(&latch("if_id")).unwrap();
    assert_eq!(
        builder.set_pipeline_stages(&["add".to_string()]),
        Err(BuildError::WrongComponentKind {
            component: "add".to_string(),
            expected: "pipeline_register",
        })
    );
    assert!(matches!(
        builder.set_pipeline_stages(&["if_id".to_string(), "if_id".to_string()]),
        Err(BuildError::InvalidPipeline(_))
    ));
    assert_eq!(
        builder.set_pipeline_stages(&["missing".to_string()]),
        Err(BuildError::UnknownComponent("missing".to_string()))
    );
}

#[test]
fn evaluation_order_respects_combinational_edges() {
    let cpu = presets::single_cycle().build(Config::default()).unwrap();
    let order = cpu.evaluation_order();
    assert_eq!(order.len(), cpu.components().len());

    let position = |id| order.iter().position(|o| *o == id).unwrap();
    for (i, component) in cpu.components().iter().enumerate() {
        let me = cpu.component_id(component.id()).unwrap();
        assert_eq!(me.index(), i);
        for input in component.inputs().iter().filter(|i| !i.is_clocked()) {
            if let Some(source) = input.source() {
                assert!(
                    position(source.component) < position(me),
                    "{} evaluated before its driver",
                    component.id()
                );
            }
        }
    }
}

#[test]
fn ready_components_are_scheduled_in_declaration_order() {
    let mut builder = CpuBuilder::new();
    let _ = builder.add_component(&adder("sum")).unwrap();
    let _ = builder.add_component(&constant("c", 32, 1)).unwrap();
    let _ = builder.add_component(&constant("d", 32, 2)).unwrap();
    let _ = builder
        .connect(&end("c", "output"), &[end("sum", "in1"), end("sum", "in2")])
        .unwrap();

    let cpu = builder.build(Config::default()).unwrap();
    let names: Vec<&str> = cpu
        .evaluation_order()
        .iter()
        .map(|id| cpu.component(*id).unwrap().id())
        .collect();
    assert_eq!(names, ["c", "sum", "d"]);
}

#[test]
fn handle_from_another_cpu_is_not_found() {
    let pipeline = presets::pipeline().build(Config::default()).unwrap();
    let mut builder = constant_and_adder();
    let _ = builder
        .connect(&end("one", "output"), &[end("add", "in1"), end("add", "in2")])
        .unwrap();
    let small = builder.build(Config::default()).unwrap();

    let last = pipeline.components().last().unwrap().id();
    let handle = pipeline.component_id(last).unwrap();
    assert_eq!(pipeline.component(handle).unwrap().id(), last);
    assert!(small.component(handle).is_none());
}
