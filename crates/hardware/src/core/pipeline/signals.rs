//! Control signals and operation encodings.
//!
//! This module defines the values that steer the datapath. It provides:
//! 1. **ALU Operations:** The 4-bit selector driven into ALUs and its decoding.
//! 2. **ALU Control:** The (ALUOp, funct) to selector mapping used by `AluControl`.
//! 3. **Control Tables:** Opcode to control-vector tables loaded into a `ControlUnit`,
//!    and their validation into a dense lookup.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::common::{BuildError, Data};

/// Operation selected by an ALU's 4-bit control input.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AluOperation {
    /// Bitwise AND.
    And,
    /// Bitwise OR.
    Or,
    /// Integer addition.
    #[default]
    Add,
    /// Bitwise XOR.
    Xor,
    /// Shift left logical by the low 5 bits of the second operand.
    Sll,
    /// Shift right logical.
    Srl,
    /// Integer subtraction.
    Sub,
    /// Set less than (signed).
    Slt,
    /// Shift right arithmetic.
    Sra,
    /// Set less than unsigned.
    Sltu,
    /// Signed multiply into HI/LO.
    Mult,
    /// Signed divide into HI (remainder) and LO (quotient).
    Div,
    /// Bitwise NOR.
    Nor,
    /// Read the HI register.
    Mfhi,
    /// Read the LO register.
    Mflo,
    /// Unsigned multiply into HI/LO.
    Multu,
}

impl AluOperation {
    /// Every operation, indexed by its selector code.
    pub const ALL: [Self; 16] = [
        Self::And,
        Self::Or,
        Self::Add,
        Self::Xor,
        Self::Sll,
        Self::Srl,
        Self::Sub,
        Self::Slt,
        Self::Sra,
        Self::Sltu,
        Self::Mult,
        Self::Div,
        Self::Nor,
        Self::Mfhi,
        Self::Mflo,
        Self::Multu,
    ];

    /// Decodes a selector value; only the low 4 bits are used.
    pub const fn from_code(code: u32) -> Self {
        Self::ALL[(code & 0xF) as usize]
    }

    /// Selector value driven on the control input.
    pub const fn code(self) -> u32 {
        self as u32
    }

    /// Lower-case mnemonic shown to the host.
    pub const fn name(self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
            Self::Add => "add",
            Self::Xor => "xor",
            Self::Sll => "sll",
            Self::Srl => "srl",
            Self::Sub => "sub",
            Self::Slt => "slt",
            Self::Sra => "sra",
            Self::Sltu => "sltu",
            Self::Mult => "mult",
            Self::Div => "div",
            Self::Nor => "nor",
            Self::Mfhi => "mfhi",
            Self::Mflo => "mflo",
            Self::Multu => "multu",
        }
    }

    /// Returns `true` for operations that need the HI/LO registers of an extended ALU.
    pub const fn is_extended(self) -> bool {
        matches!(
            self,
            Self::Mult | Self::Multu | Self::Div | Self::Mfhi | Self::Mflo
        )
    }

    /// Maps an `ALUOp` value and a function field to an operation.
    ///
    /// `ALUOp` 0 adds (loads/stores), 1 subtracts (branches), 2 decodes `funct`
    /// (R-type) and 3 ors (immediate logic). Unknown function codes add.
    pub const fn from_alu_op(alu_op: u32, funct: u32) -> Self {
        match alu_op & 0x3 {
            0 => Self::Add,
            1 => Self::Sub,
            2 => Self::from_funct(funct),
            _ => Self::Or,
        }
    }

    /// Decodes an R-type function field.
    pub const fn from_funct(funct: u32) -> Self {
        match funct & 0x3F {
            0x00 => Self::Sll,
            0x02 => Self::Srl,
            0x03 => Self::Sra,
            0x10 => Self::Mfhi,
            0x12 => Self::Mflo,
            0x18 => Self::Mult,
            0x19 => Self::Multu,
            0x1A => Self::Div,
            0x22 => Self::Sub,
            0x24 => Self::And,
            0x25 => Self::Or,
            0x26 => Self::Xor,
            0x27 => Self::Nor,
            0x2A => Self::Slt,
            0x2B => Self::Sltu,
            _ => Self::Add,
        }
    }
}

/// A named control output of a control unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlSignal {
    /// Output port identifier.
    pub name: String,
    /// Width in bits.
    #[serde(default = "ControlSignal::default_size")]
    pub size: u8,
}

impl ControlSignal {
    /// Creates a signal.
    pub fn new(name: impl Into<String>, size: u8) -> Self {
        Self {
            name: name.into(),
            size,
        }
    }

    const fn default_size() -> u8 {
        1
    }
}

/// The control vector of one opcode. Signals not listed are 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlRow {
    /// Opcode field value.
    pub opcode: u32,
    /// Signal values by name.
    #[serde(default)]
    pub signals: BTreeMap<String, u32>,
}

/// Opcode to control-vector table.
///
/// `default` is the vector used for opcodes without a row. A table without a
/// default must cover every opcode of the field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlTable {
    /// Declared outputs, in port order.
    pub signals: Vec<ControlSignal>,
    /// Rows by opcode.
    #[serde(default)]
    pub rows: Vec<ControlRow>,
    /// Vector for unmapped opcodes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<BTreeMap<String, u32>>,
}

impl ControlTable {
    /// Creates an empty table with the given signals.
    pub fn new(signals: Vec<ControlSignal>) -> Self {
        Self {
            signals,
            ..Self::default()
        }
    }

    /// Adds a row. Duplicate opcodes are reported by [`resolve`](Self::resolve).
    #[must_use]
    pub fn row(mut self, opcode: u32, values: &[(&str, u32)]) -> Self {
        self.rows.push(ControlRow {
            opcode,
            signals: values.iter().map(|(n, v)| ((*n).to_string(), *v)).collect(),
        });
        self
    }

    /// Sets the vector for unmapped opcodes.
    #[must_use]
    pub fn with_default(mut self, values: &[(&str, u32)]) -> Self {
        self.default = Some(values.iter().map(|(n, v)| ((*n).to_string(), *v)).collect());
        self
    }

    /// Validates the table against an opcode field width and expands it to one
    /// vector per opcode.
    ///
    /// # Arguments
    ///
    /// * `unit` - Identifier of the control unit, used in errors.
    /// * `opcode_size` - Width of the opcode field in bits.
    ///
    /// # Returns
    ///
    /// A vector indexed by opcode, each entry holding the signal values in
    /// declaration order.
    pub fn resolve(&self, unit: &str, opcode_size: u8) -> Result<Vec<Vec<u32>>, BuildError> {
        let invalid = |detail: String| BuildError::InvalidControlTable {
            unit: unit.to_string(),
            detail,
        };

        if opcode_size == 0 || opcode_size > MAX_OPCODE_SIZE {
            return Err(invalid(format!(
                "opcode size {opcode_size} outside 1..={MAX_OPCODE_SIZE}"
            )));
        }
        for (i, signal) in self.signals.iter().enumerate() {
            if self.signals[..i].iter().any(|s| s.name == signal.name) {
                return Err(invalid(format!("signal `{}` declared twice", signal.name)));
            }
            if !Data::is_valid_size(signal.size) {
                return Err(invalid(format!(
                    "signal `{}` has invalid width {}",
                    signal.name, signal.size
                )));
            }
        }

        let default = self
            .default
            .as_ref()
            .map(|values| self.vector(values, &invalid))
            .transpose()?;

        let count = 1usize << opcode_size;
        let mut table: Vec<Option<Vec<u32>>> = vec![None; count];
        for row in &self.rows {
            if !Data::fits(opcode_size, row.opcode) {
                return Err(invalid(format!(
                    "opcode {:#x} does not fit in {opcode_size} bits",
                    row.opcode
                )));
            }
            let slot = &mut table[row.opcode as usize];
            if slot.is_some() {
                return Err(invalid(format!("opcode {:#x} appears twice", row.opcode)));
            }
            *slot = Some(self.vector(&row.signals, &invalid)?);
        }

        table
            .into_iter()
            .enumerate()
            .map(|(opcode, entry)| {
                entry.or_else(|| default.clone()).ok_or_else(|| {
                    BuildError::IncompleteControlTable {
                        unit: unit.to_string(),
                        opcode: opcode as u32,
                    }
                })
            })
            .collect()
    }

    fn vector(
        &self,
        values: &BTreeMap<String, u32>,
        invalid: &impl Fn(String) -> BuildError,
    ) -> Result<Vec<u32>, BuildError> {
        if let Some(name) = values
            .keys()
            .find(|name| !self.signals.iter().any(|s| &s.name == *name))
        {
            return Err(invalid(format!("unknown signal `{name}`")));
        }
        self.signals
            .iter()
            .map(|signal| {
                let value = values.get(&signal.name).copied().unwrap_or(0);
                if Data::fits(signal.size, value) {
                    Ok(value)
                } else {
                    Err(invalid(format!(
                        "value {value} does not fit signal `{}` ({} bits)",
                        signal.name, signal.size
                    )))
                }
            })
            .collect()
    }
}

/// Widest opcode field a control table may decode.
pub const MAX_OPCODE_SIZE: u8 = 16;
