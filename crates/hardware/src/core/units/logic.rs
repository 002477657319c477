//! Combinational building blocks.
//!
//! Small stateless components used to assemble datapaths: an adder, logic gates,
//! an inverter, a multiplexer, a constant shifter, and sign/zero extenders.

use serde::{Deserialize, Serialize};

use crate::common::constants::DATA_SIZE;
use crate::common::{BuildError, Data};
use crate::core::port::{Input, PortBuilder, PortIo};
use crate::core::units::Combinational;

const fn data_size() -> u8 {
    DATA_SIZE
}

const fn bit_size() -> u8 {
    1
}

/// Parameters of an adder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdderSpec {
    /// Width of every port.
    #[serde(default = "data_size")]
    pub size: u8,
}

impl Default for AdderSpec {
    fn default() -> Self {
        Self { size: DATA_SIZE }
    }
}

/// Drives `output = in1 + in2`, wrapping at the port width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Adder {
    size: u8,
    in1: usize,
    in2: usize,
    out: usize,
}

impl Adder {
    pub(crate) fn attach(spec: &AdderSpec, ports: &mut PortBuilder<'_>) -> Result<Self, BuildError> {
        Ok(Self {
            size: spec.size,
            in1: ports.input("in1", spec.size)?,
            in2: ports.input("in2", spec.size)?,
            out: ports.output("output", spec.size)?,
        })
    }

    pub(crate) const fn spec(&self) -> AdderSpec {
        AdderSpec { size: self.size }
    }
}

impl Combinational for Adder {
    fn execute(&self, io: &mut PortIo<'_>) {
        let sum = io.value(self.in1).wrapping_add(io.value(self.in2));
        io.set(self.out, sum);
    }
}

/// Boolean function of a two-input gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GateOperation {
    /// Bitwise AND.
    And,
    /// Bitwise OR.
    Or,
    /// Bitwise XOR.
    Xor,
}

impl GateOperation {
    /// Applies the function.
    pub const fn apply(self, a: u32, b: u32) -> u32 {
        match self {
            Self::And => a & b,
            Self::Or => a | b,
            Self::Xor => a ^ b,
        }
    }

    /// Lower-case name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
            Self::Xor => "xor",
        }
    }
}

/// Parameters of a gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateSpec {
    /// Boolean function.
    pub operation: GateOperation,
    /// Width of every port.
    #[serde(default = "bit_size")]
    pub size: u8,
}

/// Two-input bitwise gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gate {
    operation: GateOperation,
    size: u8,
    in1: usize,
    in2: usize,
    out: usize,
}

impl Gate {
    pub(crate) fn attach(spec: &GateSpec, ports: &mut PortBuilder<'_>) -> Result<Self, BuildError> {
        Ok(Self {
            operation: spec.operation,
            size: spec.size,
            in1: ports.input("in1", spec.size)?,
            in2: ports.input("in2", spec.size)?,
            out: ports.output("output", spec.size)?,
        })
    }

    pub(crate) const fn spec(&self) -> GateSpec {
        GateSpec {
            operation: self.operation,
            size: self.size,
        }
    }
}

impl Combinational for Gate {
    fn execute(&self, io: &mut PortIo<'_>) {
        let value = self.operation.apply(io.value(self.in1), io.value(self.in2));
        io.set(self.out, value);
    }

    fn operation(&self, _inputs: &[Input]) -> Option<&'static str> {
        Some(self.operation.name())
    }
}

/// Parameters of an inverter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotSpec {
    /// Width of both ports.
    #[serde(default = "bit_size")]
    pub size: u8,
}

impl Default for NotSpec {
    fn default() -> Self {
        Self { size: 1 }
    }
}

/// Bitwise inverter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Not {
    size: u8,
    input: usize,
    out: usize,
}

impl Not {
    pub(crate) fn attach(spec: &NotSpec, ports: &mut PortBuilder<'_>) -> Result<Self, BuildError> {
        Ok(Self {
            size: spec.size,
            input: ports.input("input", spec.size)?,
            out: ports.output("output", spec.size)?,
        })
    }

    pub(crate) const fn spec(&self) -> NotSpec {
        NotSpec { size: self.size }
    }
}

impl Combinational for Not {
    fn execute(&self, io: &mut PortIo<'_>) {
        let value = !io.value(self.input);
        io.set(self.out, value);
    }
}

/// Parameters of a multiplexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiplexerSpec {
    /// Width of the data ports.
    #[serde(default = "data_size")]
    pub size: u8,
    /// Number of data inputs, named `in0`, `in1`, ...
    pub inputs: u32,
}

/// Selects one of its data inputs.
///
/// Unselected inputs are marked irrelevant and the output follows the relevance
/// of the selected one. A selector beyond the last input drives 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Multiplexer {
    size: u8,
    data: Vec<usize>,
    select: usize,
    out: usize,
}

impl Multiplexer {
    pub(crate) fn attach(
        spec: &MultiplexerSpec,
        ports: &mut PortBuilder<'_>,
    ) -> Result<Self, BuildError> {
        if !(2..=65_536).contains(&spec.inputs) {
            return Err(ports.invalid(format!("{} data inputs (needs 2 to 65536)", spec.inputs)));
        }
        let data = (0..spec.inputs)
            .map(|i| ports.input(&format!("in{i}"), spec.size))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            size: spec.size,
            data,
            select: ports.input("select", Data::bits_for(spec.inputs))?,
            out: ports.output("output", spec.size)?,
        })
    }

    pub(crate) fn spec(&self) -> MultiplexerSpec {
        MultiplexerSpec {
            size: self.size,
            inputs: self.data.len() as u32,
        }
    }
}

impl Combinational for Multiplexer {
    fn execute(&self, io: &mut PortIo<'_>) {
        let selected = self.data.get(io.value(self.select) as usize).copied();
        for &input in &self.data {
            if Some(input) != selected {
                io.set_input_relevant(input, false);
            }
        }
        match selected {
            Some(input) => {
                let value = io.value(input);
                let relevant = io.is_input_relevant(input);
                io.set(self.out, value);
                io.set_relevant(self.out, relevant);
            }
            None => {
                io.set(self.out, 0);
                io.set_relevant(self.out, false);
            }
        }
    }
}

/// Parameters of a constant shifter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftLeftSpec {
    /// Width of `input`.
    pub in_size: u8,
    /// Width of `output`.
    pub out_size: u8,
    /// Shift amount in bits.
    pub amount: u8,
}

/// Drives `output = input << amount`, truncated to the output width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShiftLeft {
    spec: ShiftLeftSpec,
    input: usize,
    out: usize,
}

impl ShiftLeft {
    pub(crate) fn attach(
        spec: &ShiftLeftSpec,
        ports: &mut PortBuilder<'_>,
    ) -> Result<Self, BuildError> {
        if spec.amount >= DATA_SIZE {
            return Err(ports.invalid(format!("shift amount {} is too large", spec.amount)));
        }
        Ok(Self {
            spec: *spec,
            input: ports.input("input", spec.in_size)?,
            out: ports.output("output", spec.out_size)?,
        })
    }

    pub(crate) const fn spec(&self) -> ShiftLeftSpec {
        self.spec
    }
}

impl Combinational for ShiftLeft {
    fn execute(&self, io: &mut PortIo<'_>) {
        let value = io.value(self.input) << self.spec.amount;
        io.set(self.out, value);
    }
}

/// Parameters of a sign or zero extender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtendSpec {
    /// Width of `input`.
    pub in_size: u8,
    /// Width of `output`; at least `in_size`.
    pub out_size: u8,
}

/// Widens `input` to `output`, replicating the sign bit or filling with zeros.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extender {
    spec: ExtendSpec,
    signed: bool,
    input: usize,
    out: usize,
}

impl Extender {
    pub(crate) fn attach(
        spec: &ExtendSpec,
        signed: bool,
        ports: &mut PortBuilder<'_>,
    ) -> Result<Self, BuildError> {
        let input = ports.input("input", spec.in_size)?;
        let out = ports.output("output", spec.out_size)?;
        if spec.out_size < spec.in_size {
            return Err(ports.invalid(format!(
                "output width {} is narrower than input width {}",
                spec.out_size, spec.in_size
            )));
        }
        Ok(Self {
            spec: *spec,
            signed,
            input,
            out,
        })
    }

    pub(crate) const fn spec(&self) -> ExtendSpec {
        self.spec
    }

    /// Whether the sign bit is replicated.
    pub const fn is_signed(&self) -> bool {
        self.signed
    }
}

impl Combinational for Extender {
    fn execute(&self, io: &mut PortIo<'_>) {
        let input = io.input(self.input);
        let extended = if self.signed {
            input.sign_extend(self.spec.out_size)
        } else {
            input.zero_extend(self.spec.out_size)
        };
        io.set(self.out, extended.value());
    }
}
