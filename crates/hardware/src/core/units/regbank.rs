//! Register Bank.
//!
//! This module implements the general-purpose register file. It provides:
//! 1. **Storage:** `2^n` registers of 32 bits.
//! 2. **Constant Registers:** Registers wired to a fixed value (register zero in MIPS)
//!    that ignore every write.
//! 3. **Access:** Two combinational read ports and one write port sampled at the
//!    clock edge when `reg_write` is high.
//! 4. **Internal Forwarding:** Optionally, a read of the register being written
//!    returns the write data in the same cycle. The write inputs then become
//!    combinational so the evaluation order accounts for them.

use serde::{Deserialize, Serialize};

use crate::common::constants::DATA_SIZE;
use crate::common::{BuildError, Data, EditError};
use crate::core::port::{PortBuilder, PortIo};
use crate::core::units::{Combinational, Synchronous};

/// Assembler names of the 32 MIPS general-purpose registers.
pub const MIPS_REGISTER_NAMES: [&str; 32] = [
    "$zero", "$at", "$v0", "$v1", "$a0", "$a1", "$a2", "$a3", "$t0", "$t1", "$t2", "$t3", "$t4",
    "$t5", "$t6", "$t7", "$s0", "$s1", "$s2", "$s3", "$s4", "$s5", "$s6", "$s7", "$t8", "$t9",
    "$k0", "$k1", "$gp", "$sp", "$fp", "$ra",
];

/// Display name of register `index` in a bank of `count` registers.
///
/// 32-register banks use the MIPS names; other sizes fall back to `$N`.
pub fn register_name(index: u32, count: usize) -> String {
    match MIPS_REGISTER_NAMES.get(index as usize) {
        Some(name) if count == MIPS_REGISTER_NAMES.len() => (*name).to_string(),
        _ => format!("${index}"),
    }
}

/// A register with a fixed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstantRegister {
    /// Register index.
    pub register: u32,
    /// Fixed value.
    pub value: u32,
}

/// Parameters of a register bank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterBankSpec {
    /// Number of registers; must be a power of two.
    #[serde(default = "RegisterBankSpec::default_registers")]
    pub num_registers: u32,
    /// Registers with fixed values.
    #[serde(default)]
    pub constants: Vec<ConstantRegister>,
    /// Same-cycle write-to-read forwarding.
    #[serde(default)]
    pub forwarding: bool,
}

impl RegisterBankSpec {
    const fn default_registers() -> u32 {
        32
    }
}

impl Default for RegisterBankSpec {
    fn default() -> Self {
        Self {
            num_registers: Self::default_registers(),
            constants: vec![ConstantRegister {
                register: 0,
                value: 0,
            }],
            forwarding: false,
        }
    }
}

/// Register bank geometry shared with units that compare register numbers.
///
/// Forwarding and hazard detection units keep a copy taken when they are linked
/// to a bank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterProfile {
    address_bits: u8,
    constants: Vec<u32>,
}

impl RegisterProfile {
    /// Creates a profile from the register address width and the constant registers.
    pub fn new(address_bits: u8, constants: Vec<u32>) -> Self {
        Self {
            address_bits,
            constants,
        }
    }

    /// Width of a register number.
    pub const fn address_bits(&self) -> u8 {
        self.address_bits
    }

    /// Returns `true` if `register` ignores writes.
    pub fn is_constant(&self, register: u32) -> bool {
        self.constants.contains(&register)
    }
}

impl Default for RegisterProfile {
    /// 32 registers with register zero constant.
    fn default() -> Self {
        Self::new(5, vec![0])
    }
}

/// The register file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterBank {
    registers: Vec<u32>,
    constants: Vec<ConstantRegister>,
    forwarding: bool,
    read_reg1: usize,
    read_reg2: usize,
    write_reg: usize,
    write_data: usize,
    reg_write: usize,
    read_data1: usize,
    read_data2: usize,
}

impl RegisterBank {
    pub(crate) fn attach(
        spec: &RegisterBankSpec,
        ports: &mut PortBuilder<'_>,
    ) -> Result<Self, BuildError> {
        if spec.num_registers < 2 || !spec.num_registers.is_power_of_two() {
            return Err(ports.invalid(format!(
                "register count {} is not a power of two",
                spec.num_registers
            )));
        }
        let mut registers = vec![0; spec.num_registers as usize];
        for (i, constant) in spec.constants.iter().enumerate() {
            if constant.register >= spec.num_registers {
                return Err(ports.invalid(format!(
                    "constant register {} is out of range",
                    constant.register
                )));
            }
            if spec.constants[..i]
                .iter()
                .any(|c| c.register == constant.register)
            {
                return Err(ports.invalid(format!(
                    "register {} is declared constant twice",
                    constant.register
                )));
            }
            registers[constant.register as usize] = constant.value;
        }

        let bits = Data::bits_for(spec.num_registers);
        let clocked = !spec.forwarding;
        Ok(Self {
            registers,
            constants: spec.constants.clone(),
            forwarding: spec.forwarding,
            read_reg1: ports.input("read_reg1", bits)?,
            read_reg2: ports.input("read_reg2", bits)?,
            write_reg: ports.optional_input("write_reg", bits, 0, clocked)?,
            write_data: ports.optional_input("write_data", DATA_SIZE, 0, clocked)?,
            reg_write: ports.optional_input("reg_write", 1, 0, clocked)?,
            read_data1: ports.output("read_data1", DATA_SIZE)?,
            read_data2: ports.output("read_data2", DATA_SIZE)?,
        })
    }

    pub(crate) fn spec(&self) -> RegisterBankSpec {
        RegisterBankSpec {
            num_registers: self.registers.len() as u32,
            constants: self.constants.clone(),
            forwarding: self.forwarding,
        }
    }

    /// Geometry handed to linked forwarding and hazard detection units.
    pub fn profile(&self) -> RegisterProfile {
        RegisterProfile::new(
            Data::bits_for(self.registers.len() as u32),
            self.constants.iter().map(|c| c.register).collect(),
        )
    }

    /// Register contents.
    pub fn registers(&self) -> &[u32] {
        &self.registers
    }

    /// Display name of register `index`.
    pub fn name(&self, index: u32) -> String {
        register_name(index, self.registers.len())
    }

    /// Value of one register.
    pub fn register(&self, index: u32) -> Option<u32> {
        self.registers.get(index as usize).copied()
    }

    /// Returns `true` if `index` is a constant register.
    pub fn is_constant(&self, index: u32) -> bool {
        self.constants.iter().any(|c| c.register == index)
    }

    /// Whether same-cycle write-to-read forwarding is on.
    pub const fn has_forwarding(&self) -> bool {
        self.forwarding
    }

    pub(crate) fn set_register(&mut self, index: u32, value: u32) -> Result<(), EditError> {
        let count = self.registers.len() as u32;
        if index >= count {
            return Err(EditError::RegisterOutOfRange { index, count });
        }
        if self.is_constant(index) {
            return Err(EditError::ConstantRegister(index));
        }
        self.registers[index as usize] = value;
        Ok(())
    }

    fn read(&self, io: &PortIo<'_>, address: usize) -> u32 {
        let index = io.value(address);
        if self.forwarding
            && io.input(self.reg_write).is_set()
            && io.value(self.write_reg) == index
            && !self.is_constant(index)
        {
            io.value(self.write_data)
        } else {
            self.registers.get(index as usize).copied().unwrap_or(0)
        }
    }
}

impl Combinational for RegisterBank {
    fn execute(&self, io: &mut PortIo<'_>) {
        let data1 = self.read(io, self.read_reg1);
        let data2 = self.read(io, self.read_reg2);
        io.set(self.read_data1, data1);
        io.set(self.read_data2, data2);

        if !self.forwarding {
            return;
        }
        // Write inputs only feed the reads when a read matches the written register.
        let writing = io.input(self.reg_write).is_set();
        let target = io.value(self.write_reg);
        let hit = writing
            && !self.is_constant(target)
            && (io.value(self.read_reg1) == target || io.value(self.read_reg2) == target);
        let data_relevant = hit && io.is_input_relevant(self.write_data);
        io.set_input_relevant(self.write_data, data_relevant);
    }
}

impl Synchronous for RegisterBank {
    fn commit(&mut self, io: &PortIo<'_>) {
        if !io.input(self.reg_write).is_set() {
            return;
        }
        let index = io.value(self.write_reg);
        if self.is_constant(index) {
            return;
        }
        if let Some(register) = self.registers.get_mut(index as usize) {
            *register = io.value(self.write_data);
        }
    }
}
