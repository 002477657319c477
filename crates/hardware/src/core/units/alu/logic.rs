//! ALU logical and comparison operations.
//!
//! Implements bitwise AND, OR, XOR and NOR, and set-less-than (signed and
//! unsigned). Comparison results are always 0 or 1.

use crate::core::pipeline::signals::AluOperation;

/// Executes a logical or comparison operation.
///
/// # Returns
///
/// The 32-bit result. Returns `0` for non-logic opcodes.
pub fn execute(op: AluOperation, a: u32, b: u32) -> u32 {
    match op {
        AluOperation::And => a & b,
        AluOperation::Or => a | b,
        AluOperation::Xor => a ^ b,
        AluOperation::Nor => !(a | b),
        AluOperation::Slt => u32::from((a as i32) < (b as i32)),
        AluOperation::Sltu => u32::from(a < b),
        _ => 0,
    }
}
