//! ALU arithmetic operations.
//!
//! Implements 32-bit addition and subtraction with signed-overflow detection,
//! and the multiply/divide family that writes the HI/LO register pair.
//!
//! Results wrap modulo 2^32; overflow is reported separately and never traps.

use crate::core::pipeline::signals::AluOperation;

/// Executes an addition or subtraction.
///
/// # Returns
///
/// The wrapped result. Returns `0` for other opcodes.
pub fn execute(op: AluOperation, a: u32, b: u32) -> u32 {
    match op {
        AluOperation::Add => a.wrapping_add(b),
        AluOperation::Sub => a.wrapping_sub(b),
        _ => 0,
    }
}

/// Returns `true` if the operation overflows as a signed 32-bit computation.
pub fn overflows(op: AluOperation, a: u32, b: u32) -> bool {
    match op {
        AluOperation::Add => (a as i32).checked_add(b as i32).is_none(),
        AluOperation::Sub => (a as i32).checked_sub(b as i32).is_none(),
        _ => false,
    }
}

/// Computes the 64-bit product as `(hi, lo)`.
pub fn multiply(a: u32, b: u32, signed: bool) -> (u32, u32) {
    let product = if signed {
        i64::from(a as i32).wrapping_mul(i64::from(b as i32)) as u64
    } else {
        u64::from(a) * u64::from(b)
    };
    ((product >> 32) as u32, product as u32)
}

/// Computes the signed quotient and remainder as `(hi, lo) = (remainder, quotient)`.
///
/// Returns `None` on division by zero; the HI/LO registers are then left unchanged.
pub fn divide(a: u32, b: u32) -> Option<(u32, u32)> {
    if b == 0 {
        return None;
    }
    let (a, b) = (a as i32, b as i32);
    Some((a.wrapping_rem(b) as u32, a.wrapping_div(b) as u32))
}
