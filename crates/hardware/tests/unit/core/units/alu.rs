//! ALU Operation Tests.
//!
//! Deterministic vectors for every 32-bit operation at the boundary values, plus the
//! `(ALUOp, funct)` decoding performed by the ALU control.

use mipsflow_core::core::pipeline::signals::AluOperation;
use mipsflow_core::core::units::alu::{arithmetic, Alu};
use proptest::prelude::*;
use rstest::rstest;

const I32_MAX: u32 = i32::MAX as u32;
const I32_MIN: u32 = i32::MIN as u32;
const NEG1: u32 = u32::MAX;

#[rstest]
#[case(AluOperation::Add, 42, 8, 50)]
#[case(AluOperation::Add, NEG1, 1, 0)]
#[case(AluOperation::Add, I32_MAX, 1, I32_MIN)]
#[case(AluOperation::Sub, 5, 7, (-2_i32) as u32)]
#[case(AluOperation::Sub, I32_MIN, 1, I32_MAX)]
#[case(AluOperation::And, 0b1100, 0b1010, 0b1000)]
#[case(AluOperation::Or, 0b1100, 0b1010, 0b1110)]
#[case(AluOperation::Xor, 0b1100, 0b1010, 0b0110)]
#[case(AluOperation::Nor, 0, 0, NEG1)]
#[case(AluOperation::Nor, 0xFFFF_0000, 0x0000_FF00, 0x0000_00FF)]
#[case(AluOperation::Slt, (-5_i32) as u32, 10, 1)]
#[case(AluOperation::Slt, 10, (-5_i32) as u32, 0)]
#[case(AluOperation::Slt, 3, 3, 0)]
#[case(AluOperation::Sltu, (-5_i32) as u32, 10, 0)]
#[case(AluOperation::Sltu, 10, (-5_i32) as u32, 1)]
#[case(AluOperation::Sll, 1, 31, I32_MIN)]
#[case(AluOperation::Sll, 1, 32, 1)]
#[case(AluOperation::Srl, I32_MIN, 31, 1)]
#[case(AluOperation::Sra, I32_MIN, 31, NEG1)]
#[case(AluOperation::Sra, 0x40, 4, 0x4)]
fn compute(#[case] op: AluOperation, #[case] a: u32, #[case] b: u32, #[case] expected: u32) {
    assert_eq!(Alu::compute(op, a, b), expected, "{} {a:#x} {b:#x}", op.name());
}

#[rstest]
#[case(AluOperation::Mult)]
#[case(AluOperation::Multu)]
#[case(AluOperation::Div)]
#[case(AluOperation::Mfhi)]
#[case(AluOperation::Mflo)]
fn hi_lo_operations_need_the_extended_alu(#[case] op: AluOperation) {
    assert!(op.is_extended());
    assert_eq!(Alu::compute(op, 6, 7), 0);
}

#[test]
fn overflow_detection() {
    assert!(arithmetic::overflows(AluOperation::Add, I32_MAX, 1));
    assert!(!arithmetic::overflows(AluOperation::Add, NEG1, 1));
    assert!(arithmetic::overflows(AluOperation::Sub, I32_MIN, 1));
    assert!(!arithmetic::overflows(AluOperation::Sub, 0, 1));
    assert!(!arithmetic::overflows(AluOperation::Or, I32_MAX, I32_MAX));
}

#[test]
fn multiply_and_divide_split_into_hi_lo() {
    assert_eq!(arithmetic::multiply(NEG1, 2, true), (NEG1, (-2_i32) as u32));
    assert_eq!(arithmetic::multiply(NEG1, 2, false), (1, (-2_i32) as u32));
    assert_eq!(arithmetic::divide(7, 2), Some((1, 3)));
    assert_eq!(arithmetic::divide((-7_i32) as u32, 2), Some(((-1_i32) as u32, (-3_i32) as u32)));
    assert_eq!(arithmetic::divide(I32_MIN, NEG1), Some((0, I32_MIN)));
    assert_eq!(arithmetic::divide(5, 0), None);
}

#[rstest]
#[case(0, 0x22, AluOperation::Add)]
#[case(1, 0x20, AluOperation::Sub)]
#[case(3, 0x00, AluOperation::Or)]
#[case(2, 0x20, AluOperation::Add)]
#[case(2, 0x22, AluOperation::Sub)]
#[case(2, 0x24, AluOperation::And)]
#[case(2, 0x25, AluOperation::Or)]
#[case(2, 0x26, AluOperation::Xor)]
#[case(2, 0x27, AluOperation::Nor)]
#[case(2, 0x2A, AluOperation::Slt)]
#[case(2, 0x2B, AluOperation::Sltu)]
#[case(2, 0x00, AluOperation::Sll)]
#[case(2, 0x02, AluOperation::Srl)]
#[case(2, 0x03, AluOperation::Sra)]
#[case(2, 0x18, AluOperation::Mult)]
#[case(2, 0x1A, AluOperation::Div)]
#[case(2, 0x3F, AluOperation::Add)]
fn alu_control_decoding(#[case] alu_op: u32, #[case] funct: u32, #[case] expected: AluOperation) {
    assert_eq!(AluOperation::from_alu_op(alu_op, funct), expected);
}

#[test]
fn selector_codes_round_trip() {
    for (code, op) in AluOperation::ALL.iter().enumerate() {
        assert_eq!(op.code(), code as u32);
        assert_eq!(AluOperation::from_code(code as u32), *op);
    }
    assert_eq!(AluOperation::from_code(0x12), AluOperation::Add);
}

proptest! {
    #[test]
    fn add_then_sub_restores_operand(a in any::<u32>(), b in any::<u32>()) {
        let sum = Alu::compute(AluOperation::Add, a, b);
        prop_assert_eq!(Alu::compute(AluOperation::Sub, sum, b), a);
    }

    #[test]
    fn zero_flag_matches_equality(a in any::<u32>(), b in any::<u32>()) {
        let difference = Alu::compute(AluOperation::Sub, a, b);
        prop_assert_eq!(difference == 0, a == b);
    }

    #[test]
    fn shift_amount_uses_low_five_bits(a in any::<u32>(), b in any::<u32>()) {
        prop_assert_eq!(
            Alu::compute(AluOperation::Sll, a, b),
            Alu::compute(AluOperation::Sll, a, b & 0x1f)
        );
    }
}
