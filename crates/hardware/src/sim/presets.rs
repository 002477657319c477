//! Built-in datapaths.
//!
//! This module provides ready-made MIPS datapaths as [`CircuitDescription`]s:
//! 1. **Single-cycle:** Every instruction completes in one clock cycle.
//! 2. **Pipeline:** The classic five stages with a forwarding unit, load-use hazard
//!    detection, and branches and jumps resolved in EX.
//!
//! Both decode `add`, `sub`, `and`, `or`, `xor`, `nor`, `slt`, `sltu`, `lw`, `sw`,
//! `beq`, `addi` and `j`. Unknown opcodes decode to an all-zero control vector.

use crate::core::pipeline::latches::{LatchField, PipelineRegisterSpec, ProgramCounterSpec};
use crate::core::pipeline::signals::{ControlSignal, ControlTable};
use crate::core::units::{
    AdderSpec, BitField, ConcatenatorSpec, ConstantSpec, DataMemorySpec, DistributorSpec,
    ExtendSpec, GateOperation, GateSpec, InstructionMemorySpec, LinkSpec, MultiplexerSpec,
    RegisterBankSpec, ShiftLeftSpec, UnitSpec,
};
use crate::sim::description::{
    CircuitDescription, ComponentDescription, ControlDescription, Endpoint, WireDescription,
};

/// Names accepted by [`by_name`].
pub const PRESETS: &[&str] = &["single-cycle", "pipeline"];

/// Width of the MIPS opcode field.
pub const OPCODE_SIZE: u8 = 6;

/// Looks up a preset by name.
pub fn by_name(name: &str) -> Option<CircuitDescription> {
    match name {
        "single-cycle" => Some(single_cycle()),
        "pipeline" => Some(pipeline()),
        _ => None,
    }
}

/// Control table of the main control unit.
///
/// Signals: `RegDst`, `Branch`, `MemRead`, `MemToReg`, `ALUOp` (2 bits), `MemWrite`,
/// `ALUSrc`, `RegWrite`, `Jump`.
pub fn mips_control_table() -> ControlTable {
    let signals = [
        ("RegDst", 1),
        ("Branch", 1),
        ("MemRead", 1),
        ("MemToReg", 1),
        ("ALUOp", 2),
        ("MemWrite", 1),
        ("ALUSrc", 1),
        ("RegWrite", 1),
        ("Jump", 1),
    ];
    ControlTable::new(
        signals
            .iter()
            .map(|(name, size)| ControlSignal::new(*name, *size))
            .collect(),
    )
    .row(0x00, &[("RegDst", 1), ("ALUOp", 2), ("RegWrite", 1)])
    .row(
        0x23,
        &[("MemRead", 1), ("MemToReg", 1), ("ALUSrc", 1), ("RegWrite", 1)],
    )
    .row(0x2b, &[("MemWrite", 1), ("ALUSrc", 1)])
    .row(0x04, &[("Branch", 1), ("ALUOp", 1)])
    .row(0x08, &[("ALUSrc", 1), ("RegWrite", 1)])
    .row(0x02, &[("Jump", 1)])
    .with_default(&[])
}

/// Accumulates components and wires in construction order.
#[derive(Default)]
struct Sketch {
    circuit: CircuitDescription,
}

impl Sketch {
    fn add(mut self, id: &str, latency: u32, unit: UnitSpec) -> Self {
        self.circuit
            .components
            .push(ComponentDescription::new(id, unit).with_latency(latency));
        self
    }

    fn add_control(mut self, id: &str, latency: u32, unit: UnitSpec) -> Self {
        self.circuit
            .components
            .push(ComponentDescription::new(id, unit).with_latency(latency).in_control_path());
        self
    }

    /// Connects `from` (`"component.port"`) to every endpoint in `to`.
    fn wire(mut self, from: &str, to: &[&str]) -> Self {
        self.circuit.wires.push(WireDescription {
            from: endpoint(from),
            to: to.iter().map(|t| endpoint(t)).collect(),
        });
        self
    }

    fn finish(mut self, control_unit: &str, pipeline: &[&str]) -> CircuitDescription {
        self.circuit.control = Some(ControlDescription {
            unit: control_unit.to_string(),
            opcode_size: OPCODE_SIZE,
            table: mips_control_table(),
        });
        self.circuit.pipeline = pipeline.iter().map(|s| (*s).to_string()).collect();
        self.circuit
    }
}

fn endpoint(path: &str) -> Endpoint {
    let (component, port) = path.split_once('.').unwrap_or((path, ""));
    Endpoint::new(component, port)
}

fn mux(size: u8, inputs: u32) -> UnitSpec {
    UnitSpec::Multiplexer(MultiplexerSpec { size, inputs })
}

fn and_gate() -> UnitSpec {
    UnitSpec::Gate(GateSpec {
        operation: GateOperation::And,
        size: 1,
    })
}

fn or_gate() -> UnitSpec {
    UnitSpec::Gate(GateSpec {
        operation: GateOperation::Or,
        size: 1,
    })
}

fn instruction_fields() -> UnitSpec {
    UnitSpec::Distributor(DistributorSpec {
        size: 32,
        fields: vec![
            BitField::new("opcode", 31, 26),
            BitField::new("rs", 25, 21),
            BitField::new("rt", 20, 16),
            BitField::new("rd", 15, 11),
            BitField::new("imm", 15, 0),
            BitField::new("funct", 5, 0),
            BitField::new("target", 25, 0),
        ],
    })
}

/// PC, `+4` adder and instruction memory.
fn fetch_units(sketch: Sketch) -> Sketch {
    sketch
        .add("pc", 0, UnitSpec::ProgramCounter(ProgramCounterSpec::default()))
        .add("four", 0, UnitSpec::Constant(ConstantSpec { size: 32, value: 4 }))
        .add("pc_adder", 100, UnitSpec::Adder(AdderSpec::default()))
        .add(
            "imem",
            200,
            UnitSpec::InstructionMemory(InstructionMemorySpec::default()),
        )
}

/// Jump target `(pc + 4)[31:28] ‖ target << 2`.
fn jump_units(sketch: Sketch) -> Sketch {
    sketch
        .add(
            "pc4_split",
            0,
            UnitSpec::Distributor(DistributorSpec {
                size: 32,
                fields: vec![BitField::new("high", 31, 28)],
            }),
        )
        .add(
            "shift_jump",
            0,
            UnitSpec::ShiftLeft(ShiftLeftSpec {
                in_size: 26,
                out_size: 28,
                amount: 2,
            }),
        )
        .add(
            "jump_target",
            0,
            UnitSpec::Concatenator(ConcatenatorSpec {
                in1_size: 4,
                in2_size: 28,
            }),
        )
}

fn sign_extend() -> UnitSpec {
    UnitSpec::SignExtend(ExtendSpec {
        in_size: 16,
        out_size: 32,
    })
}

fn shift_branch() -> UnitSpec {
    UnitSpec::ShiftLeft(ShiftLeftSpec {
        in_size: 32,
        out_size: 32,
        amount: 2,
    })
}

/// Single-cycle MIPS datapath.
///
/// With the default latencies the critical path is a load: instruction memory,
/// register read, ALU, data memory, and the write-back multiplexer (750 ps).
pub fn single_cycle() -> CircuitDescription {
    let sketch = fetch_units(Sketch::default())
        .add("fields", 0, instruction_fields())
        .add_control("control", 50, UnitSpec::ControlUnit)
        .add("reg_dst_mux", 25, mux(5, 2))
        .add("regbank", 100, UnitSpec::RegisterBank(RegisterBankSpec::default()))
        .add("sign_extend", 0, sign_extend())
        .add("alu_src_mux", 25, mux(32, 2))
        .add_control("alu_control", 50, UnitSpec::AluControl)
        .add("alu", 200, UnitSpec::Alu)
        .add("dmem", 200, UnitSpec::DataMemory(DataMemorySpec::default()))
        .add("mem_to_reg_mux", 25, mux(32, 2))
        .add("shift_branch", 0, shift_branch())
        .add("branch_adder", 100, UnitSpec::Adder(AdderSpec::default()))
        .add_control("branch_and", 0, and_gate())
        .add("branch_mux", 25, mux(32, 2));
    let sketch = jump_units(sketch).add("jump_mux", 25, mux(32, 2));

    sketch
        .wire("pc.address", &["pc_adder.in1", "imem.address"])
        .wire("four.output", &["pc_adder.in2"])
        .wire(
            "pc_adder.output",
            &["branch_adder.in1", "branch_mux.in0", "pc4_split.input"],
        )
        .wire("imem.instruction", &["fields.input"])
        .wire("fields.opcode", &["control.opcode"])
        .wire("fields.rs", &["regbank.read_reg1"])
        .wire("fields.rt", &["regbank.read_reg2", "reg_dst_mux.in0"])
        .wire("fields.rd", &["reg_dst_mux.in1"])
        .wire("fields.imm", &["sign_extend.input"])
        .wire("fields.funct", &["alu_control.funct"])
        .wire("fields.target", &["shift_jump.input"])
        .wire("control.RegDst", &["reg_dst_mux.select"])
        .wire("control.Branch", &["branch_and.in1"])
        .wire("control.MemRead", &["dmem.mem_read"])
        .wire("control.MemToReg", &["mem_to_reg_mux.select"])
        .wire("control.ALUOp", &["alu_control.alu_op"])
        .wire("control.MemWrite", &["dmem.mem_write"])
        .wire("control.ALUSrc", &["alu_src_mux.select"])
        .wire("control.RegWrite", &["regbank.reg_write"])
        .wire("control.Jump", &["jump_mux.select"])
        .wire("reg_dst_mux.output", &["regbank.write_reg"])
        .wire("regbank.read_data1", &["alu.in1"])
        .wire("regbank.read_data2", &["alu_src_mux.in0", "dmem.write_data"])
        .wire("sign_extend.output", &["alu_src_mux.in1", "shift_branch.input"])
        .wire("alu_src_mux.output", &["alu.in2"])
        .wire("alu_control.output", &["alu.control"])
        .wire("alu.result", &["dmem.address", "mem_to_reg_mux.in0"])
        .wire("alu.zero", &["branch_and.in2"])
        .wire("dmem.read_data", &["mem_to_reg_mux.in1"])
        .wire("mem_to_reg_mux.output", &["regbank.write_data"])
        .wire("shift_branch.output", &["branch_adder.in2"])
        .wire("branch_adder.output", &["branch_mux.in1"])
        .wire("branch_and.output", &["branch_mux.select"])
        .wire("branch_mux.output", &["jump_mux.in0"])
        .wire("pc4_split.high", &["jump_target.in1"])
        .wire("shift_jump.output", &["jump_target.in2"])
        .wire("jump_target.output", &["jump_mux.in1"])
        .wire("jump_mux.output", &["pc.new"])
        .finish("control", &[])
}

fn latch(fields: &[(&str, u8)]) -> UnitSpec {
    UnitSpec::PipelineRegister(PipelineRegisterSpec {
        fields: fields
            .iter()
            .map(|(id, size)| LatchField::new(*id, *size))
            .collect(),
    })
}

/// Five-stage pipelined MIPS datapath.
///
/// * Operands are forwarded from EX/MEM and MEM/WB into EX; the register bank
///   forwards its write port to its read ports within a cycle.
/// * A load followed by a dependent instruction stalls one cycle: the PC and IF/ID
///   hold and ID/EX is flushed.
/// * Taken branches and jumps are resolved in EX and flush IF/ID and ID/EX.
pub fn pipeline() -> CircuitDescription {
    // IF
    let sketch = fetch_units(Sketch::default())
        .add("branch_mux", 25, mux(32, 2))
        .add("jump_mux", 25, mux(32, 2))
        .add("if_id", 0, latch(&[("pc4", 32), ("instruction", 32)]));

    // ID
    let sketch = sketch
        .add("fields", 0, instruction_fields())
        .add_control("control", 50, UnitSpec::ControlUnit)
        .add(
            "regbank",
            100,
            UnitSpec::RegisterBank(RegisterBankSpec {
                forwarding: true,
                ..RegisterBankSpec::default()
            }),
        )
        .add_control(
            "hazard_unit",
            25,
            UnitSpec::HazardDetectionUnit(LinkSpec {
                register_bank: Some("regbank".to_string()),
            }),
        )
        .add("sign_extend", 0, sign_extend());
    let sketch = jump_units(sketch).add(
        "id_ex",
        0,
        latch(&[
            ("pc4", 32),
            ("read_data1", 32),
            ("read_data2", 32),
            ("imm", 32),
            ("jump_target", 32),
            ("rs", 5),
            ("rt", 5),
            ("rd", 5),
            ("funct", 6),
            ("RegDst", 1),
            ("Branch", 1),
            ("MemRead", 1),
            ("MemToReg", 1),
            ("ALUOp", 2),
            ("MemWrite", 1),
            ("ALUSrc", 1),
            ("RegWrite", 1),
            ("Jump", 1),
        ]),
    );

    // EX
    let sketch = sketch
        .add_control(
            "forwarding_unit",
            25,
            UnitSpec::ForwardingUnit(LinkSpec {
                register_bank: Some("regbank".to_string()),
            }),
        )
        .add("forward_a_mux", 25, mux(32, 3))
        .add("forward_b_mux", 25, mux(32, 3))
        .add("alu_src_mux", 25, mux(32, 2))
        .add_control("alu_control", 50, UnitSpec::AluControl)
        .add("alu", 200, UnitSpec::Alu)
        .add("reg_dst_mux", 25, mux(5, 2))
        .add("shift_branch", 0, shift_branch())
        .add("branch_adder", 100, UnitSpec::Adder(AdderSpec::default()))
        .add_control("branch_and", 0, and_gate())
        .add_control("taken_or", 0, or_gate())
        .add_control("flush_or", 0, or_gate())
        .add(
            "ex_mem",
            0,
            latch(&[
                ("alu_result", 32),
                ("write_data", 32),
                ("write_reg", 5),
                ("MemRead", 1),
                ("MemWrite", 1),
                ("MemToReg", 1),
                ("RegWrite", 1),
            ]),
        );

    // MEM
    let sketch = sketch
        .add("dmem", 200, UnitSpec::DataMemory(DataMemorySpec::default()))
        .add(
            "mem_wb",
            0,
            latch(&[
                ("read_data", 32),
                ("alu_result", 32),
                ("write_reg", 5),
                ("MemToReg", 1),
                ("RegWrite", 1),
            ]),
        );

    // WB
    let sketch = sketch.add("mem_to_reg_mux", 25, mux(32, 2));

    sketch
        // IF
        .wire("pc.address", &["pc_adder.in1", "imem.address"])
        .wire("four.output", &["pc_adder.in2"])
        .wire("pc_adder.output", &["branch_mux.in0", "if_id.pc4"])
        .wire("imem.instruction", &["if_id.instruction"])
        .wire("branch_mux.output", &["jump_mux.in0"])
        .wire("jump_mux.output", &["pc.new"])
        // ID
        .wire("if_id.pc4", &["pc4_split.input", "id_ex.pc4"])
        .wire("if_id.instruction", &["fields.input"])
        .wire("fields.opcode", &["control.opcode"])
        .wire(
            "fields.rs",
            &["regbank.read_reg1", "hazard_unit.if_id_rs", "id_ex.rs"],
        )
        .wire(
            "fields.rt",
            &["regbank.read_reg2", "hazard_unit.if_id_rt", "id_ex.rt"],
        )
        .wire("fields.rd", &["id_ex.rd"])
        .wire("fields.imm", &["sign_extend.input"])
        .wire("fields.funct", &["id_ex.funct"])
        .wire("fields.target", &["shift_jump.input"])
        .wire("pc4_split.high", &["jump_target.in1"])
        .wire("shift_jump.output", &["jump_target.in2"])
        .wire("jump_target.output", &["id_ex.jump_target"])
        .wire("sign_extend.output", &["id_ex.imm"])
        .wire("regbank.read_data1", &["id_ex.read_data1"])
        .wire("regbank.read_data2", &["id_ex.read_data2"])
        .wire("control.RegDst", &["id_ex.RegDst"])
        .wire("control.Branch", &["id_ex.Branch"])
        .wire("control.MemRead", &["id_ex.MemRead"])
        .wire("control.MemToReg", &["id_ex.MemToReg"])
        .wire("control.ALUOp", &["id_ex.ALUOp"])
        .wire("control.MemWrite", &["id_ex.MemWrite"])
        .wire("control.ALUSrc", &["id_ex.ALUSrc"])
        .wire("control.RegWrite", &["id_ex.RegWrite"])
        .wire("control.Jump", &["id_ex.Jump"])
        .wire("hazard_unit.stall", &["flush_or.in2"])
        .wire("hazard_unit.pc_write", &["pc.write"])
        .wire("hazard_unit.if_id_write", &["if_id.write"])
        // EX
        .wire("id_ex.pc4", &["branch_adder.in1"])
        .wire("id_ex.read_data1", &["forward_a_mux.in0"])
        .wire("id_ex.read_data2", &["forward_b_mux.in0"])
        .wire("id_ex.imm", &["alu_src_mux.in1", "shift_branch.input"])
        .wire("id_ex.jump_target", &["jump_mux.in1"])
        .wire("id_ex.rs", &["forwarding_unit.id_ex_rs"])
        .wire(
            "id_ex.rt",
            &["forwarding_unit.id_ex_rt", "hazard_unit.id_ex_rt", "reg_dst_mux.in0"],
        )
        .wire("id_ex.rd", &["reg_dst_mux.in1"])
        .wire("id_ex.funct", &["alu_control.funct"])
        .wire("id_ex.RegDst", &["reg_dst_mux.select"])
        .wire("id_ex.Branch", &["branch_and.in1"])
        .wire("id_ex.MemRead", &["hazard_unit.id_ex_mem_read", "ex_mem.MemRead"])
        .wire("id_ex.MemToReg", &["ex_mem.MemToReg"])
        .wire("id_ex.ALUOp", &["alu_control.alu_op"])
        .wire("id_ex.MemWrite", &["ex_mem.MemWrite"])
        .wire("id_ex.ALUSrc", &["alu_src_mux.select"])
        .wire("id_ex.RegWrite", &["ex_mem.RegWrite"])
        .wire("id_ex.Jump", &["jump_mux.select", "taken_or.in2"])
        .wire("forwarding_unit.forward_a", &["forward_a_mux.select"])
        .wire("forwarding_unit.forward_b", &["forward_b_mux.select"])
        .wire("forward_a_mux.output", &["alu.in1"])
        .wire("forward_b_mux.output", &["alu_src_mux.in0", "ex_mem.write_data"])
        .wire("alu_src_mux.output", &["alu.in2"])
        .wire("alu_control.output", &["alu.control"])
        .wire("alu.result", &["ex_mem.alu_result"])
        .wire("alu.zero", &["branch_and.in2"])
        .wire("reg_dst_mux.output", &["ex_mem.write_reg"])
        .wire("shift_branch.output", &["branch_adder.in2"])
        .wire("branch_adder.output", &["branch_mux.in1"])
        .wire("branch_and.output", &["branch_mux.select", "taken_or.in1"])
        .wire("taken_or.output", &["if_id.flush", "flush_or.in1"])
        .wire("flush_or.output", &["id_ex.flush"])
        // MEM
        .wire(
            "ex_mem.alu_result",
            &["dmem.address", "mem_wb.alu_result", "forward_a_mux.in2", "forward_b_mux.in2"],
        )
        .wire("ex_mem.write_data", &["dmem.write_data"])
        .wire("ex_mem.write_reg", &["mem_wb.write_reg", "forwarding_unit.ex_mem_rd"])
        .wire("ex_mem.MemRead", &["dmem.mem_read"])
        .wire("ex_mem.MemWrite", &["dmem.mem_write"])
        .wire("ex_mem.MemToReg", &["mem_wb.MemToReg"])
        .wire(
            "ex_mem.RegWrite",
            &["mem_wb.RegWrite", "forwarding_unit.ex_mem_reg_write"],
        )
        .wire("dmem.read_data", &["mem_wb.read_data"])
        // WB
        .wire("mem_wb.read_data", &["mem_to_reg_mux.in1"])
        .wire("mem_wb.alu_result", &["mem_to_reg_mux.in0"])
        .wire("mem_wb.MemToReg", &["mem_to_reg_mux.select"])
        .wire(
            "mem_wb.write_reg",
            &["regbank.write_reg", "forwarding_unit.mem_wb_rd"],
        )
        .wire(
            "mem_wb.RegWrite",
            &["regbank.reg_write", "forwarding_unit.mem_wb_reg_write"],
        )
        .wire(
            "mem_to_reg_mux.output",
            &["regbank.write_data", "forward_a_mux.in1", "forward_b_mux.in1"],
        )
        .finish("control", &["if_id", "id_ex", "ex_mem", "mem_wb"])
}
