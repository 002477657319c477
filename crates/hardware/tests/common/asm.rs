//! Encoders for the MIPS instructions decoded by the presets.
//!
//! Register arguments are plain numbers (`8` is `$t0`). Immediates are truncated to
//! their field width, so negative offsets can be passed directly.

pub const OP_RTYPE: u32 = 0x00;
pub const OP_J: u32 = 0x02;
pub const OP_BEQ: u32 = 0x04;
pub const OP_ADDI: u32 = 0x08;
pub const OP_LW: u32 = 0x23;
pub const OP_SW: u32 = 0x2b;

pub const FUNCT_ADD: u32 = 0x20;
pub const FUNCT_SUB: u32 = 0x22;
pub const FUNCT_AND: u32 = 0x24;
pub const FUNCT_OR: u32 = 0x25;
pub const FUNCT_SLT: u32 = 0x2a;

/// Encodes an R-type instruction.
pub fn r_type(rs: u32, rt: u32, rd: u32, shamt: u32, funct: u32) -> u32 {
    (OP_RTYPE << 26)
        | ((rs & 0x1f) << 21)
        | ((rt & 0x1f) << 16)
        | ((rd & 0x1f) << 11)
        | ((shamt & 0x1f) << 6)
        | (funct & 0x3f)
}

/// Encodes an I-type instruction.
pub fn i_type(opcode: u32, rs: u32, rt: u32, imm: i32) -> u32 {
    (opcode << 26) | ((rs & 0x1f) << 21) | ((rt & 0x1f) << 16) | (imm as u32 & 0xffff)
}

pub fn add(rd: u32, rs: u32, rt: u32) -> u32 {
    r_type(rs, rt, rd, 0, FUNCT_ADD)
}

pub fn sub(rd: u32, rs: u32, rt: u32) -> u32 {
    r_type(rs, rt, rd, 0, FUNCT_SUB)
}

pub fn and(rd: u32, rs: u32, rt: u32) -> u32 {
    r_type(rs, rt, rd, 0, FUNCT_AND)
}

pub fn or(rd: u32, rs: u32, rt: u32) -> u32 {
    r_type(rs, rt, rd, 0, FUNCT_OR)
}

pub fn slt(rd: u32, rs: u32, rt: u32) -> u32 {
    r_type(rs, rt, rd, 0, FUNCT_SLT)
}

pub fn addi(rt: u32, rs: u32, imm: i32) -> u32 {
    i_type(OP_ADDI, rs, rt, imm)
}

pub fn lw(rt: u32, offset: i32, base: u32) -> u32 {
    i_type(OP_LW, base, rt, offset)
}

pub fn sw(rt: u32, offset: i32, base: u32) -> u32 {
    i_type(OP_SW, base, rt, offset)
}

/// `offset` is in instructions, relative to the following instruction.
pub fn beq(rs: u32, rt: u32, offset: i32) -> u32 {
    i_type(OP_BEQ, rs, rt, offset)
}

/// `address` is a byte address inside the current 256 MiB region.
pub fn j(address: u32) -> u32 {
    (OP_J << 26) | ((address >> 2) & 0x03ff_ffff)
}

#[test]
fn encodes_reference_words() {
    assert_eq!(add(10, 8, 9), 0x0109_5020);
    assert_eq!(lw(8, 0, 0), 0x8c08_0000);
    assert_eq!(sw(10, 4, 0), 0xac0a_0004);
    assert_eq!(addi(8, 0, -1), 0x2008_ffff);
    assert_eq!(j(0x40), 0x0800_0010);
}
