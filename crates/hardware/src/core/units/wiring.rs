//! Signal plumbing.
//!
//! Components that reshape signals without computing on them:
//! 1. **Distributor:** Splits a signal into named bit fields (e.g. instruction fields).
//! 2. **Concatenator:** Joins two signals, the first in the high bits.
//! 3. **Fork:** Copies one signal to several named outputs.
//! 4. **Constant:** Drives a fixed value.

use serde::{Deserialize, Serialize};

use crate::common::constants::MAX_SIGNAL_SIZE;
use crate::common::{BuildError, Data};
use crate::core::port::{PortBuilder, PortIo};
use crate::core::units::Combinational;

/// A bit range `msb..=lsb` of a distributed signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BitField {
    /// Output identifier.
    pub id: String,
    /// Most significant bit.
    pub msb: u8,
    /// Least significant bit.
    pub lsb: u8,
}

impl BitField {
    /// Creates a field.
    pub fn new(id: impl Into<String>, msb: u8, lsb: u8) -> Self {
        Self {
            id: id.into(),
            msb,
            lsb,
        }
    }

    /// Width of the field; a reversed range counts as one bit.
    pub const fn size(&self) -> u8 {
        self.msb.saturating_sub(self.lsb) + 1
    }
}

/// Parameters of a distributor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributorSpec {
    /// Width of the `input` port.
    pub size: u8,
    /// Extracted fields, in output order.
    pub fields: Vec<BitField>,
}

/// Splits `input` into bit-field outputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Distributor {
    size: u8,
    fields: Vec<BitField>,
    input: usize,
}

impl Distributor {
    pub(crate) fn attach(
        spec: &DistributorSpec,
        ports: &mut PortBuilder<'_>,
    ) -> Result<Self, BuildError> {
        let input = ports.input("input", spec.size)?;
        for field in &spec.fields {
            if field.msb < field.lsb || field.msb >= spec.size {
                return Err(ports.invalid(format!(
                    "field `{}` ({}..{}) does not fit a {}-bit input",
                    field.id, field.msb, field.lsb, spec.size
                )));
            }
            let _ = ports.output(&field.id, field.size())?;
        }
        Ok(Self {
            size: spec.size,
            fields: spec.fields.clone(),
            input,
        })
    }

    pub(crate) fn spec(&self) -> DistributorSpec {
        DistributorSpec {
            size: self.size,
            fields: self.fields.clone(),
        }
    }
}

impl Combinational for Distributor {
    fn execute(&self, io: &mut PortIo<'_>) {
        let value = io.value(self.input);
        let relevant = io.is_input_relevant(self.input);
        for (output, field) in self.fields.iter().enumerate() {
            io.set(output, value >> field.lsb);
            io.set_relevant(output, relevant);
        }
    }
}

/// Parameters of a concatenator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConcatenatorSpec {
    /// Width of `in1`, placed in the high bits.
    pub in1_size: u8,
    /// Width of `in2`, placed in the low bits.
    pub in2_size: u8,
}

/// Drives `output = in1 << size(in2) | in2`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Concatenator {
    in1_size: u8,
    in2_size: u8,
    in1: usize,
    in2: usize,
    out: usize,
}

impl Concatenator {
    pub(crate) fn attach(
        spec: &ConcatenatorSpec,
        ports: &mut PortBuilder<'_>,
    ) -> Result<Self, BuildError> {
        let total = u16::from(spec.in1_size) + u16::from(spec.in2_size);
        if total > u16::from(MAX_SIGNAL_SIZE) {
            return Err(ports.invalid(format!("concatenated width {total} exceeds 32 bits")));
        }
        Ok(Self {
            in1_size: spec.in1_size,
            in2_size: spec.in2_size,
            in1: ports.input("in1", spec.in1_size)?,
            in2: ports.input("in2", spec.in2_size)?,
            out: ports.output("output", spec.in1_size + spec.in2_size)?,
        })
    }

    pub(crate) const fn spec(&self) -> ConcatenatorSpec {
        ConcatenatorSpec {
            in1_size: self.in1_size,
            in2_size: self.in2_size,
        }
    }
}

impl Combinational for Concatenator {
    fn execute(&self, io: &mut PortIo<'_>) {
        let high = u64::from(io.value(self.in1)) << self.in2_size;
        io.set(self.out, (high | u64::from(io.value(self.in2))) as u32);
    }
}

/// Parameters of a fork.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForkSpec {
    /// Width of every port.
    pub size: u8,
    /// Output identifiers.
    pub outputs: Vec<String>,
}

/// Copies `input` to every output; output relevance follows the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fork {
    size: u8,
    outputs: Vec<String>,
    input: usize,
}

impl Fork {
    pub(crate) fn attach(spec: &ForkSpec, ports: &mut PortBuilder<'_>) -> Result<Self, BuildError> {
        if spec.outputs.is_empty() {
            return Err(ports.invalid("a fork needs at least one output"));
        }
        let input = ports.input("input", spec.size)?;
        for id in &spec.outputs {
            let _ = ports.output(id, spec.size)?;
        }
        Ok(Self {
            size: spec.size,
            outputs: spec.outputs.clone(),
            input,
        })
    }

    pub(crate) fn spec(&self) -> ForkSpec {
        ForkSpec {
            size: self.size,
            outputs: self.outputs.clone(),
        }
    }
}

impl Combinational for Fork {
    fn execute(&self, io: &mut PortIo<'_>) {
        let value = io.value(self.input);
        let relevant = io.is_input_relevant(self.input);
        for output in 0..self.outputs.len() {
            io.set(output, value);
            io.set_relevant(output, relevant);
        }
    }
}

/// Parameters of a constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstantSpec {
    /// Width of `output`.
    pub size: u8,
    /// Driven value; must fit the width.
    pub value: u32,
}

/// Drives a fixed value on `output`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constant {
    size: u8,
    value: u32,
    out: usize,
}

impl Constant {
    pub(crate) fn attach(
        spec: &ConstantSpec,
        ports: &mut PortBuilder<'_>,
    ) -> Result<Self, BuildError> {
        let out = ports.output("output", spec.size)?;
        if !Data::fits(spec.size, spec.value) {
            return Err(ports.invalid(format!(
                "value {} does not fit in {} bits",
                spec.value, spec.size
            )));
        }
        Ok(Self {
            size: spec.size,
            value: spec.value,
            out,
        })
    }

    pub(crate) const fn spec(&self) -> ConstantSpec {
        ConstantSpec {
            size: self.size,
            value: self.value,
        }
    }

    /// The driven value.
    pub const fn value(&self) -> u32 {
        self.value
    }
}

impl Combinational for Constant {
    fn execute(&self, io: &mut PortIo<'_>) {
        io.set(self.out, self.value);
    }
}
