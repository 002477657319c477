//! ALU shift operations.
//!
//! Implements shift-left logical (SLL), shift-right logical (SRL), and
//! shift-right arithmetic (SRA). The first operand is shifted by the low
//! five bits of the second.

use crate::core::pipeline::signals::AluOperation;

/// Bit mask for the shift amount (0-31).
const SHAMT_MASK: u32 = 0x1f;

/// Executes a shift operation.
///
/// # Returns
///
/// The 32-bit result. Returns `0` for non-shift opcodes.
pub fn execute(op: AluOperation, a: u32, b: u32) -> u32 {
    let shamt = b & SHAMT_MASK;
    match op {
        AluOperation::Sll => a << shamt,
        AluOperation::Srl => a >> shamt,
        AluOperation::Sra => ((a as i32) >> shamt) as u32,
        _ => 0,
    }
}
