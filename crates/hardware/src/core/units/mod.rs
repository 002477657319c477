//! Component behaviors.
//!
//! Every component of a datapath is one variant of the closed [`Unit`] enum. This
//! module provides:
//! 1. **Capabilities:** [`Combinational`] (every unit) and [`Synchronous`] (units with
//!    state committed at the clock edge).
//! 2. **Descriptions:** [`UnitSpec`], the serializable parameters a loader supplies.
//! 3. **Dispatch:** Construction of a unit from its description, and static dispatch
//!    of evaluation and commit.

/// ALU, extended ALU and ALU control.
pub mod alu;

/// Main control unit.
pub mod control;

/// Forwarding unit.
pub mod forwarding;

/// Load-use hazard detection unit.
pub mod hazard;

/// Adder, gates, multiplexer, shifter and extenders.
pub mod logic;

/// Instruction and data memories.
pub mod memory;

/// General-purpose register file.
pub mod regbank;

/// Distributor, concatenator, fork and constant.
pub mod wiring;

use serde::{Deserialize, Serialize};

use crate::common::BuildError;
use crate::core::pipeline::latches::{
    PipelineRegister, PipelineRegisterSpec, ProgramCounter, ProgramCounterSpec,
};
use crate::core::port::{Input, PortBuilder, PortIo};

pub use alu::{Alu, AluControl, ExtendedAlu};
pub use control::ControlUnit;
pub use forwarding::{ForwardingUnit, LinkSpec};
pub use hazard::HazardDetectionUnit;
pub use logic::{
    Adder, AdderSpec, ExtendSpec, Extender, Gate, GateOperation, GateSpec, Multiplexer,
    MultiplexerSpec, Not, NotSpec, ShiftLeft, ShiftLeftSpec,
};
pub use memory::{DataMemory, DataMemorySpec, InstructionMemory, InstructionMemorySpec};
pub use regbank::{
    register_name, ConstantRegister, RegisterBank, RegisterBankSpec, RegisterProfile,
    MIPS_REGISTER_NAMES,
};
pub use wiring::{
    BitField, Concatenator, ConcatenatorSpec, Constant, ConstantSpec, Distributor,
    DistributorSpec, Fork, ForkSpec,
};

/// Combinational behavior: outputs as a function of inputs and stored state.
pub trait Combinational {
    /// Computes the outputs and adjusts port relevance.
    fn execute(&self, io: &mut PortIo<'_>);

    /// Name of the operation selected by the current inputs, if the unit has one.
    fn operation(&self, _inputs: &[Input]) -> Option<&'static str> {
        None
    }
}

/// State updated at the clock edge.
pub trait Synchronous {
    /// Samples the inputs of the completed cycle into the unit's state.
    fn commit(&mut self, io: &PortIo<'_>);
}

/// Serializable description of a unit, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UnitSpec {
    /// Integer ALU.
    Alu,
    /// ALU with HI/LO registers.
    ExtendedAlu,
    /// ALU selector decoder.
    AluControl,
    /// Register file.
    RegisterBank(RegisterBankSpec),
    /// Main control unit; its ports come from the control table.
    ControlUnit,
    /// Forwarding unit.
    ForwardingUnit(LinkSpec),
    /// Load-use hazard detection unit.
    HazardDetectionUnit(LinkSpec),
    /// Bit-field splitter.
    Distributor(DistributorSpec),
    /// Signal joiner.
    Concatenator(ConcatenatorSpec),
    /// Signal copier.
    Fork(ForkSpec),
    /// Fixed value.
    Constant(ConstantSpec),
    /// Inter-stage latch.
    PipelineRegister(PipelineRegisterSpec),
    /// Fetch address register.
    ProgramCounter(ProgramCounterSpec),
    /// Program storage.
    InstructionMemory(InstructionMemorySpec),
    /// Read/write memory.
    DataMemory(DataMemorySpec),
    /// Adder.
    Adder(AdderSpec),
    /// Two-input gate.
    Gate(GateSpec),
    /// Inverter.
    Not(NotSpec),
    /// Multiplexer.
    Multiplexer(MultiplexerSpec),
    /// Constant shifter.
    ShiftLeft(ShiftLeftSpec),
    /// Sign extender.
    SignExtend(ExtendSpec),
    /// Zero extender.
    ZeroExtend(ExtendSpec),
}

/// The behavior of one component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unit {
    /// Integer ALU.
    Alu(Alu),
    /// ALU with HI/LO registers.
    ExtendedAlu(ExtendedAlu),
    /// ALU selector decoder.
    AluControl(AluControl),
    /// Register file.
    RegisterBank(RegisterBank),
    /// Main control unit.
    ControlUnit(ControlUnit),
    /// Forwarding unit.
    ForwardingUnit(ForwardingUnit),
    /// Load-use hazard detection unit.
    HazardDetectionUnit(HazardDetectionUnit),
    /// Bit-field splitter.
    Distributor(Distributor),
    /// Signal joiner.
    Concatenator(Concatenator),
    /// Signal copier.
    Fork(Fork),
    /// Fixed value.
    Constant(Constant),
    /// Inter-stage latch.
    PipelineRegister(PipelineRegister),
    /// Fetch address register.
    ProgramCounter(ProgramCounter),
    /// Program storage.
    InstructionMemory(InstructionMemory),
    /// Read/write memory.
    DataMemory(DataMemory),
    /// Adder.
    Adder(Adder),
    /// Two-input gate.
    Gate(Gate),
    /// Inverter.
    Not(Not),
    /// Multiplexer.
    Multiplexer(Multiplexer),
    /// Constant shifter.
    ShiftLeft(ShiftLeft),
    /// Sign or zero extender.
    Extender(Extender),
}

/// Dispatches a method call to the unit inside any variant.
macro_rules! dispatch {
    ($unit:expr, $u:ident => $body:expr) => {
        match $unit {
            Unit::Alu($u) => $body,
            Unit::ExtendedAlu($u) => $body,
            Unit::AluControl($u) => $body,
            Unit::RegisterBank($u) => $body,
            Unit::ControlUnit($u) => $body,
            Unit::ForwardingUnit($u) => $body,
            Unit::HazardDetectionUnit($u) => $body,
            Unit::Distributor($u) => $body,
            Unit::Concatenator($u) => $body,
            Unit::Fork($u) => $body,
            Unit::Constant($u) => $body,
            Unit::PipelineRegister($u) => $body,
            Unit::ProgramCounter($u) => $body,
            Unit::InstructionMemory($u) => $body,
            Unit::DataMemory($u) => $body,
            Unit::Adder($u) => $body,
            Unit::Gate($u) => $body,
            Unit::Not($u) => $body,
            Unit::Multiplexer($u) => $body,
            Unit::ShiftLeft($u) => $body,
            Unit::Extender($u) => $body,
        }
    };
}

impl Unit {
    /// Builds a unit and declares its ports.
    ///
    /// # Arguments
    ///
    /// * `spec` - The unit description.
    /// * `profile` - Geometry of the linked register bank, for forwarding and hazard
    ///   detection units.
    /// * `ports` - Port declaration handle for the component being built.
    pub(crate) fn attach(
        spec: &UnitSpec,
        profile: Option<RegisterProfile>,
        ports: &mut PortBuilder<'_>,
    ) -> Result<Self, BuildError> {
        Ok(match spec {
            UnitSpec::Alu => Self::Alu(Alu::attach(ports)?),
            UnitSpec::ExtendedAlu => Self::ExtendedAlu(ExtendedAlu::attach(ports)?),
            UnitSpec::AluControl => Self::AluControl(AluControl::attach(ports)?),
            UnitSpec::RegisterBank(s) => Self::RegisterBank(RegisterBank::attach(s, ports)?),
            UnitSpec::ControlUnit => Self::ControlUnit(ControlUnit::attach()),
            UnitSpec::ForwardingUnit(_) => {
                Self::ForwardingUnit(ForwardingUnit::attach(profile, ports)?)
            }
            UnitSpec::HazardDetectionUnit(_) => {
                Self::HazardDetectionUnit(HazardDetectionUnit::attach(profile, ports)?)
            }
            UnitSpec::Distributor(s) => Self::Distributor(Distributor::attach(s, ports)?),
            UnitSpec::Concatenator(s) => Self::Concatenator(Concatenator::attach(s, ports)?),
            UnitSpec::Fork(s) => Self::Fork(Fork::attach(s, ports)?),
            UnitSpec::Constant(s) => Self::Constant(Constant::attach(s, ports)?),
            UnitSpec::PipelineRegister(s) => {
                Self::PipelineRegister(PipelineRegister::attach(s, ports)?)
            }
            UnitSpec::ProgramCounter(s) => Self::ProgramCounter(ProgramCounter::attach(s, ports)?),
            UnitSpec::InstructionMemory(s) => {
                Self::InstructionMemory(InstructionMemory::attach(s, ports)?)
            }
            UnitSpec::DataMemory(s) => Self::DataMemory(DataMemory::attach(s, ports)?),
            UnitSpec::Adder(s) => Self::Adder(Adder::attach(s, ports)?),
            UnitSpec::Gate(s) => Self::Gate(Gate::attach(s, ports)?),
            UnitSpec::Not(s) => Self::Not(Not::attach(s, ports)?),
            UnitSpec::Multiplexer(s) => Self::Multiplexer(Multiplexer::attach(s, ports)?),
            UnitSpec::ShiftLeft(s) => Self::ShiftLeft(ShiftLeft::attach(s, ports)?),
            UnitSpec::SignExtend(s) => Self::Extender(Extender::attach(s, true, ports)?),
            UnitSpec::ZeroExtend(s) => Self::Extender(Extender::attach(s, false, ports)?),
        })
    }

    /// The description this unit can be rebuilt from.
    ///
    /// Register bank links of forwarding and hazard detection units are owned by
    /// the CPU and are left empty here.
    pub fn spec(&self) -> UnitSpec {
        match self {
            Self::Alu(_) => UnitSpec::Alu,
            Self::ExtendedAlu(_) => UnitSpec::ExtendedAlu,
            Self::AluControl(_) => UnitSpec::AluControl,
            Self::RegisterBank(u) => UnitSpec::RegisterBank(u.spec()),
            Self::ControlUnit(_) => UnitSpec::ControlUnit,
            Self::ForwardingUnit(_) => UnitSpec::ForwardingUnit(LinkSpec::default()),
            Self::HazardDetectionUnit(_) => UnitSpec::HazardDetectionUnit(LinkSpec::default()),
            Self::Distributor(u) => UnitSpec::Distributor(u.spec()),
            Self::Concatenator(u) => UnitSpec::Concatenator(u.spec()),
            Self::Fork(u) => UnitSpec::Fork(u.spec()),
            Self::Constant(u) => UnitSpec::Constant(u.spec()),
            Self::PipelineRegister(u) => UnitSpec::PipelineRegister(u.spec()),
            Self::ProgramCounter(u) => UnitSpec::ProgramCounter(u.spec()),
            Self::InstructionMemory(u) => UnitSpec::InstructionMemory(u.spec()),
            Self::DataMemory(u) => UnitSpec::DataMemory(u.spec()),
            Self::Adder(u) => UnitSpec::Adder(u.spec()),
            Self::Gate(u) => UnitSpec::Gate(u.spec()),
            Self::Not(u) => UnitSpec::Not(u.spec()),
            Self::Multiplexer(u) => UnitSpec::Multiplexer(u.spec()),
            Self::ShiftLeft(u) => UnitSpec::ShiftLeft(u.spec()),
            Self::Extender(u) if u.is_signed() => UnitSpec::SignExtend(u.spec()),
            Self::Extender(u) => UnitSpec::ZeroExtend(u.spec()),
        }
    }

    /// Kind name, matching the `type` tag of [`UnitSpec`].
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Alu(_) => "alu",
            Self::ExtendedAlu(_) => "extended_alu",
            Self::AluControl(_) => "alu_control",
            Self::RegisterBank(_) => "register_bank",
            Self::ControlUnit(_) => "control_unit",
            Self::ForwardingUnit(_) => "forwarding_unit",
            Self::HazardDetectionUnit(_) => "hazard_detection_unit",
            Self::Distributor(_) => "distributor",
            Self::Concatenator(_) => "concatenator",
            Self::Fork(_) => "fork",
            Self::Constant(_) => "constant",
            Self::PipelineRegister(_) => "pipeline_register",
            Self::ProgramCounter(_) => "program_counter",
            Self::InstructionMemory(_) => "instruction_memory",
            Self::DataMemory(_) => "data_memory",
            Self::Adder(_) => "adder",
            Self::Gate(_) => "gate",
            Self::Not(_) => "not",
            Self::Multiplexer(_) => "multiplexer",
            Self::ShiftLeft(_) => "shift_left",
            Self::Extender(u) if u.is_signed() => "sign_extend",
            Self::Extender(_) => "zero_extend",
        }
    }

    /// Returns `true` if the unit has state committed at the clock edge.
    ///
    /// A register bank with internal forwarding is still synchronous: only its
    /// read path changes.
    pub const fn is_synchronous(&self) -> bool {
        matches!(
            self,
            Self::ExtendedAlu(_)
                | Self::RegisterBank(_)
                | Self::PipelineRegister(_)
                | Self::ProgramCounter(_)
                | Self::DataMemory(_)
        )
    }

    pub(crate) fn execute(&self, io: &mut PortIo<'_>) {
        dispatch!(self, u => u.execute(io));
    }

    pub(crate) fn operation(&self, inputs: &[Input]) -> Option<&'static str> {
        dispatch!(self, u => u.operation(inputs))
    }

    pub(crate) fn commit(&mut self, io: &PortIo<'_>) {
        match self {
            Self::ExtendedAlu(u) => u.commit(io),
            Self::RegisterBank(u) => u.commit(io),
            Self::PipelineRegister(u) => u.commit(io),
            Self::ProgramCounter(u) => u.commit(io),
            Self::DataMemory(u) => u.commit(io),
            _ => {}
        }
    }
}
