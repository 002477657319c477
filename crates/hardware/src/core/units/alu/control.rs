//! ALU control.
//!
//! Decodes the 2-bit `ALUOp` from the main control unit and the instruction's
//! function field into the 4-bit ALU selector.

use crate::common::constants::{ALU_CONTROL_SIZE, ALU_OP_SIZE, FUNCT_SIZE};
use crate::common::BuildError;
use crate::core::pipeline::signals::AluOperation;
use crate::core::port::{Input, PortBuilder, PortIo};
use crate::core::units::Combinational;

/// Maps (`alu_op`, `funct`) to the ALU `output` selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AluControl {
    alu_op: usize,
    funct: usize,
    out: usize,
}

impl AluControl {
    pub(crate) fn attach(ports: &mut PortBuilder<'_>) -> Result<Self, BuildError> {
        Ok(Self {
            alu_op: ports.input("alu_op", ALU_OP_SIZE)?,
            funct: ports.input("funct", FUNCT_SIZE)?,
            out: ports.output("output", ALU_CONTROL_SIZE)?,
        })
    }
}

impl Combinational for AluControl {
    fn execute(&self, io: &mut PortIo<'_>) {
        let op = AluOperation::from_alu_op(io.value(self.alu_op), io.value(self.funct));
        io.set(self.out, op.code());
        // The function field only matters for R-type instructions.
        let decodes_funct = io.value(self.alu_op) == 2;
        io.set_input_relevant(self.funct, decodes_funct && io.is_input_relevant(self.funct));
    }

    fn operation(&self, inputs: &[Input]) -> Option<&'static str> {
        let op = AluOperation::from_alu_op(inputs[self.alu_op].value(), inputs[self.funct].value());
        Some(op.name())
    }
}
