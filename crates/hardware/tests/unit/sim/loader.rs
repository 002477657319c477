//! Program File Tests.

use std::io::Write;

use crate::common::asm::*;
use mipsflow_core::sim::loader::{load_program_file, parse_program, ProgramError};
use pretty_assertions::assert_eq;
use rstest::rstest;

#[test]
fn accepts_prefixes_separators_and_comments() {
    let text = "\
# load, double, store
0x8C080000      # lw $t0, 0($zero)
01085020
0X0109_5020

  ac0a0004
";
    assert_eq!(
        parse_program(text).unwrap(),
        vec![lw(8, 0, 0), 0x0108_5020, add(10, 8, 9), sw(10, 4, 0)]
    );
}

#[test]
fn empty_text_is_an_empty_program() {
    assert!(parse_program("").unwrap().is_empty());
    assert!(parse_program("\n# nothing here\n   \n").unwrap().is_empty());
}

#[rstest]
#[case::not_hex("00000000\nzz\n", 2, "zz")]
#[case::too_wide("00000000\n\n1_0000_0000 # 33 bits\n", 3, "1_0000_0000")]
#[case::bare_prefix("0x\n", 1, "0x")]
fn reports_the_offending_line(#[case] text: &str, #[case] line: usize, #[case] word: &str) {
    match parse_program(text) {
        Err(ProgramError::InvalidWord { line: l, text: t }) => {
            assert_eq!(l, line);
            assert_eq!(t, word);
        }
        other => panic!("expected an invalid word, got {other:?}"),
    }
}

#[test]
fn loads_a_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "# program").unwrap();
    writeln!(file, "{:08x}", addi(1, 0, 1)).unwrap();
    writeln!(file, "{:#010x}", j(0)).unwrap();
    file.flush().unwrap();

    let program = load_program_file(file.path()).unwrap();
    assert_eq!(program, vec![addi(1, 0, 1), j(0)]);
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.hex");
    let err = load_program_file(&path).unwrap_err();
    assert!(matches!(&err, ProgramError::Io { path: p, .. } if *p == path));
    assert!(err.to_string().contains("missing.hex"));
}
