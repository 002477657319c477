//! Arithmetic Logic Units.
//!
//! This module implements the integer ALU components of the datapath. A 4-bit
//! control input selects the operation (see [`AluOperation`]); the unit drives a
//! 32-bit result, a zero flag and a signed-overflow flag.
//!
//! Operations are organized into submodules by category:
//! - [`arithmetic`]: Add, Sub, Mult, Multu, Div
//! - [`logic`]:      And, Or, Xor, Nor, Slt, Sltu
//! - [`shifts`]:     Sll, Srl, Sra
//!
//! [`ExtendedAlu`] adds the HI/LO register pair written by multiply and divide
//! at the clock edge and read back by `mfhi`/`mflo`. [`AluControl`] derives the
//! selector from `ALUOp` and the function field.

/// Integer arithmetic operations (add, subtract, multiply, divide).
pub mod arithmetic;

/// ALU control decoding.
pub mod control;

/// Bitwise logical and comparison operations.
pub mod logic;

/// Shift operations (sll, srl, sra).
pub mod shifts;

pub use control::AluControl;

use crate::common::constants::{ALU_CONTROL_SIZE, DATA_SIZE};
use crate::common::BuildError;
use crate::core::pipeline::signals::AluOperation;
use crate::core::port::{Input, PortBuilder, PortIo};
use crate::core::units::{Combinational, Synchronous};

/// Port indices shared by both ALU kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct AluPorts {
    in1: usize,
    in2: usize,
    control: usize,
    result: usize,
    zero: usize,
    overflow: usize,
}

impl AluPorts {
    fn declare(ports: &mut PortBuilder<'_>) -> Result<Self, BuildError> {
        Ok(Self {
            in1: ports.input("in1", DATA_SIZE)?,
            in2: ports.input("in2", DATA_SIZE)?,
            control: ports.input("control", ALU_CONTROL_SIZE)?,
            result: ports.output("result", DATA_SIZE)?,
            zero: ports.output("zero", 1)?,
            overflow: ports.output("overflow", 1)?,
        })
    }

    fn drive(&self, io: &mut PortIo<'_>, op: AluOperation, result: u32) {
        let overflow = arithmetic::overflows(op, io.value(self.in1), io.value(self.in2));
        io.set(self.result, result);
        io.set(self.zero, u32::from(result == 0));
        io.set(self.overflow, u32::from(overflow));
    }
}

/// Integer ALU without HI/LO registers.
///
/// Multiply, divide and HI/LO moves produce 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alu {
    ports: AluPorts,
}

impl Alu {
    pub(crate) fn attach(ports: &mut PortBuilder<'_>) -> Result<Self, BuildError> {
        Ok(Self {
            ports: AluPorts::declare(ports)?,
        })
    }

    /// Computes a single-result operation.
    ///
    /// # Arguments
    ///
    /// * `op` - The ALU operation to perform.
    /// * `a`  - First operand.
    /// * `b`  - Second operand (also the shift amount).
    ///
    /// # Returns
    ///
    /// The 32-bit result, or `0` for operations that need HI/LO.
    ///
    /// # Examples
    ///
    /// ```
    /// use mipsflow_core::core::pipeline::signals::AluOperation;
    /// use mipsflow_core::core::units::alu::Alu;
    ///
    /// assert_eq!(Alu::compute(AluOperation::Add, 42, 8), 50);
    /// assert_eq!(Alu::compute(AluOperation::Slt, (-5_i32) as u32, 10), 1);
    /// assert_eq!(Alu::compute(AluOperation::Sll, 1, 4), 0x10);
    /// assert_eq!(Alu::compute(AluOperation::Nor, 0, 0), u32::MAX);
    /// ```
    pub fn compute(op: AluOperation, a: u32, b: u32) -> u32 {
        match op {
            AluOperation::Add | AluOperation::Sub => arithmetic::execute(op, a, b),
            AluOperation::And
            | AluOperation::Or
            | AluOperation::Xor
            | AluOperation::Nor
            | AluOperation::Slt
            | AluOperation::Sltu => logic::execute(op, a, b),
            AluOperation::Sll | AluOperation::Srl | AluOperation::Sra => {
                shifts::execute(op, a, b)
            }
            AluOperation::Mult
            | AluOperation::Multu
            | AluOperation::Div
            | AluOperation::Mfhi
            | AluOperation::Mflo => 0,
        }
    }
}

impl Combinational for Alu {
    fn execute(&self, io: &mut PortIo<'_>) {
        let op = AluOperation::from_code(io.value(self.ports.control));
        let result = Self::compute(op, io.value(self.ports.in1), io.value(self.ports.in2));
        self.ports.drive(io, op, result);
    }

    fn operation(&self, inputs: &[Input]) -> Option<&'static str> {
        Some(AluOperation::from_code(inputs[self.ports.control].value()).name())
    }
}

/// ALU with HI/LO registers for multiply and divide.
///
/// `mult`, `multu` and `div` output 0 and update HI/LO at the clock edge; a
/// division by zero leaves them unchanged. `mfhi` and `mflo` output the stored
/// values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtendedAlu {
    ports: AluPorts,
    hi: u32,
    lo: u32,
}

impl ExtendedAlu {
    pub(crate) fn attach(ports: &mut PortBuilder<'_>) -> Result<Self, BuildError> {
        Ok(Self {
            ports: AluPorts::declare(ports)?,
            hi: 0,
            lo: 0,
        })
    }

    /// The HI register.
    pub const fn hi(&self) -> u32 {
        self.hi
    }

    /// The LO register.
    pub const fn lo(&self) -> u32 {
        self.lo
    }
}

impl Combinational for ExtendedAlu {
    fn execute(&self, io: &mut PortIo<'_>) {
        let op = AluOperation::from_code(io.value(self.ports.control));
        let result = match op {
            AluOperation::Mfhi => self.hi,
            AluOperation::Mflo => self.lo,
            _ => Alu::compute(op, io.value(self.ports.in1), io.value(self.ports.in2)),
        };
        self.ports.drive(io, op, result);
    }

    fn operation(&self, inputs: &[Input]) -> Option<&'static str> {
        Some(AluOperation::from_code(inputs[self.ports.control].value()).name())
    }
}

impl Synchronous for ExtendedAlu {
    fn commit(&mut self, io: &PortIo<'_>) {
        let (a, b) = (io.value(self.ports.in1), io.value(self.ports.in2));
        let update = match AluOperation::from_code(io.value(self.ports.control)) {
            AluOperation::Mult => Some(arithmetic::multiply(a, b, true)),
            AluOperation::Multu => Some(arithmetic::multiply(a, b, false)),
            AluOperation::Div => arithmetic::divide(a, b),
            _ => None,
        };
        if let Some((hi, lo)) = update {
            self.hi = hi;
            self.lo = lo;
        }
    }
}
