use mipsflow_core::common::{BuildError, EditError};

#[test]
fn build_error_messages_name_the_offender() {
    let err = BuildError::WidthMismatch {
        from: "imem.instruction".to_string(),
        to: "control.opcode".to_string(),
        expected: 32,
        found: 6,
    };
    assert_eq!(
        err.to_string(),
        "width mismatch on wire imem.instruction -> control.opcode: output is 32 bits, input is 6 bits"
    );

    let err = BuildError::IncompleteControlTable {
        unit: "control".to_string(),
        opcode: 0x3f,
    };
    assert!(err.to_string().contains("0x3f"));
}

#[test]
fn edit_error_messages() {
    assert_eq!(EditError::ConstantRegister(0).to_string(), "register 0 is constant");
    assert_eq!(
        EditError::UnalignedAddress(6).to_string(),
        "address 0x6 is not word aligned"
    );
    assert_eq!(
        EditError::MissingUnit("data memory").to_string(),
        "the CPU has no data memory"
    );
}
