//! Control Table Tests.
//!
//! Validation of opcode tables and the vectors the MIPS table produces.

use mipsflow_core::common::BuildError;
use mipsflow_core::core::pipeline::signals::{ControlSignal, ControlTable};
use mipsflow_core::sim::presets::{mips_control_table, OPCODE_SIZE};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn two_signals() -> ControlTable {
    ControlTable::new(vec![ControlSignal::new("A", 1), ControlSignal::new("B", 2)])
}

#[test]
fn rows_expand_with_unlisted_signals_zero() {
    let table = two_signals()
        .row(0, &[("A", 1)])
        .row(1, &[("B", 3)])
        .with_default(&[("B", 2)]);
    let vectors = table.resolve("ctl", 2).unwrap();
    assert_eq!(vectors, vec![vec![1, 0], vec![0, 3], vec![0, 2], vec![0, 2]]);
}

#[test]
fn complete_table_needs_no_default() {
    let table = two_signals()
        .row(0, &[])
        .row(1, &[("A", 1), ("B", 1)]);
    assert_eq!(table.resolve("ctl", 1).unwrap(), vec![vec![0, 0], vec![1, 1]]);
}

#[test]
fn missing_opcode_without_default_is_reported() {
    let table = two_signals().row(0, &[]).row(2, &[]);
    assert_eq!(
        table.resolve("ctl", 2),
        Err(BuildError::IncompleteControlTable {
            unit: "ctl".to_string(),
            opcode: 1
        })
    );
}

#[rstest]
#[case::unknown_signal(two_signals().row(0, &[("C", 1)]).with_default(&[]), 2)]
#[case::value_too_wide(two_signals().row(0, &[("A", 2)]).with_default(&[]), 2)]
#[case::opcode_too_wide(two_signals().row(4, &[]).with_default(&[]), 2)]
#[case::duplicate_opcode(two_signals().row(1, &[]).row(1, &[]).with_default(&[]), 2)]
#[case::zero_opcode_width(two_signals().with_default(&[]), 0)]
#[case::opcode_width_too_large(two_signals().with_default(&[]), 17)]
#[case::duplicate_signal(
    ControlTable::new(vec![ControlSignal::new("A", 1), ControlSignal::new("A", 1)]).with_default(&[]),
    2
)]
#[case::signal_width_zero(
    ControlTable::new(vec![ControlSignal::new("A", 0)]).with_default(&[]),
    2
)]
fn malformed_tables_are_rejected(#[case] table: ControlTable, #[case] opcode_size: u8) {
    assert!(matches!(
        table.resolve("ctl", opcode_size),
        Err(BuildError::InvalidControlTable { .. })
    ));
}

#[rstest]
// RegDst Branch MemRead MemToReg ALUOp MemWrite ALUSrc RegWrite Jump
#[case::r_type(0x00, [1, 0, 0, 0, 2, 0, 0, 1, 0])]
#[case::lw(0x23, [0, 0, 1, 1, 0, 0, 1, 1, 0])]
#[case::sw(0x2b, [0, 0, 0, 0, 0, 1, 1, 0, 0])]
#[case::beq(0x04, [0, 1, 0, 0, 1, 0, 0, 0, 0])]
#[case::addi(0x08, [0, 0, 0, 0, 0, 0, 1, 1, 0])]
#[case::j(0x02, [0, 0, 0, 0, 0, 0, 0, 0, 1])]
#[case::unknown(0x3f, [0; 9])]
fn mips_control_vectors(#[case] opcode: usize, #[case] expected: [u32; 9]) {
    let vectors = mips_control_table().resolve("control", OPCODE_SIZE).unwrap();
    assert_eq!(vectors.len(), 64);
    assert_eq!(vectors[opcode], expected.to_vec());
}

#[test]
fn control_table_json_round_trip() {
    let table = mips_control_table();
    let json = serde_json::to_string(&table).unwrap();
    let parsed: ControlTable = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, table);
}
