//! Clocked storage between pipeline stages.
//!
//! This module defines the components that hold state across clock edges:
//! 1. **Program Counter:** The address of the instruction being fetched.
//! 2. **Pipeline Registers:** Named fields latched from one stage to the next, with
//!    hold (write disabled) and flush (clear to zero) controls.
//!
//! Both record what happened at the last clock edge so the stage tracker can tell a
//! moving instruction from a stalled or squashed one.

use serde::{Deserialize, Serialize};

use crate::common::constants::DATA_SIZE;
use crate::common::BuildError;
use crate::core::port::{PortBuilder, PortIo};
use crate::core::units::{Combinational, Synchronous};

/// What a latch did at the most recent clock edge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LatchEffect {
    /// New values were captured.
    #[default]
    Written,
    /// The write enable was low; the old values were kept.
    Held,
    /// The flush input was high; every field was cleared.
    Flushed,
}

/// Parameters of a program counter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramCounterSpec {
    /// Address held after construction and reset.
    #[serde(default)]
    pub initial: u32,
}

/// Holds the fetch address.
///
/// Inputs `new` (next address) and the optional `write` enable are sampled at the
/// clock edge; the output `address` shows the stored value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramCounter {
    initial: u32,
    address: u32,
    new: usize,
    write: usize,
    out: usize,
    last_effect: LatchEffect,
}

impl ProgramCounter {
    pub(crate) fn attach(
        spec: &ProgramCounterSpec,
        ports: &mut PortBuilder<'_>,
    ) -> Result<Self, BuildError> {
        Ok(Self {
            initial: spec.initial,
            address: spec.initial,
            new: ports.clocked_input("new", DATA_SIZE)?,
            write: ports.optional_input("write", 1, 1, true)?,
            out: ports.output("address", DATA_SIZE)?,
            last_effect: LatchEffect::Written,
        })
    }

    pub(crate) fn spec(&self) -> ProgramCounterSpec {
        ProgramCounterSpec {
            initial: self.initial,
        }
    }

    /// Stored address.
    pub const fn address(&self) -> u32 {
        self.address
    }

    /// Effect of the last clock edge.
    pub const fn last_effect(&self) -> LatchEffect {
        self.last_effect
    }

    pub(crate) fn set_address(&mut self, address: u32) {
        self.address = address;
    }
}

impl Combinational for ProgramCounter {
    fn execute(&self, io: &mut PortIo<'_>) {
        io.set(self.out, self.address);
    }
}

impl Synchronous for ProgramCounter {
    fn commit(&mut self, io: &PortIo<'_>) {
        if io.input(self.write).is_set() {
            self.address = io.value(self.new);
            self.last_effect = LatchEffect::Written;
        } else {
            self.last_effect = LatchEffect::Held;
        }
    }
}

/// One named field of a pipeline register.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatchField {
    /// Identifier shared by the field's input and output.
    pub id: String,
    /// Width in bits.
    pub size: u8,
}

impl LatchField {
    /// Creates a field.
    pub fn new(id: impl Into<String>, size: u8) -> Self {
        Self {
            id: id.into(),
            size,
        }
    }
}

/// Parameters of a pipeline register.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineRegisterSpec {
    /// Latched fields, in port order.
    pub fields: Vec<LatchField>,
}

/// A pipeline latch (IF/ID, ID/EX, EX/MEM, MEM/WB).
///
/// Every field has a clocked input and an output of the same name. The optional
/// `write` input (default 1) holds the latch when low; the optional `flush` input
/// (default 0) clears it and takes priority over `write`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineRegister {
    fields: Vec<LatchField>,
    values: Vec<u32>,
    write: usize,
    flush: usize,
    last_effect: LatchEffect,
}

impl PipelineRegister {
    pub(crate) fn attach(
        spec: &PipelineRegisterSpec,
        ports: &mut PortBuilder<'_>,
    ) -> Result<Self, BuildError> {
        if spec.fields.is_empty() {
            return Err(ports.invalid("a pipeline register needs at least one field"));
        }
        for field in &spec.fields {
            let _ = ports.clocked_input(&field.id, field.size)?;
            let _ = ports.output(&field.id, field.size)?;
        }
        Ok(Self {
            fields: spec.fields.clone(),
            values: vec![0; spec.fields.len()],
            write: ports.optional_input("write", 1, 1, true)?,
            flush: ports.optional_input("flush", 1, 0, true)?,
            last_effect: LatchEffect::Written,
        })
    }

    pub(crate) fn spec(&self) -> PipelineRegisterSpec {
        PipelineRegisterSpec {
            fields: self.fields.clone(),
        }
    }

    /// Stored value of a field.
    pub fn value(&self, field: &str) -> Option<u32> {
        self.fields
            .iter()
            .position(|f| f.id == field)
            .map(|i| self.values[i])
    }

    /// Declared fields.
    pub fn fields(&self) -> &[LatchField] {
        &self.fields
    }

    /// Effect of the last clock edge.
    pub const fn last_effect(&self) -> LatchEffect {
        self.last_effect
    }
}

impl Combinational for PipelineRegister {
    fn execute(&self, io: &mut PortIo<'_>) {
        for (i, value) in self.values.iter().enumerate() {
            io.set(i, *value);
        }
    }
}

impl Synchronous for PipelineRegister {
    fn commit(&mut self, io: &PortIo<'_>) {
        if io.input(self.flush).is_set() {
            self.values.fill(0);
            self.last_effect = LatchEffect::Flushed;
        } else if !io.input(self.write).is_set() {
            self.last_effect = LatchEffect::Held;
        } else {
            for (i, value) in self.values.iter_mut().enumerate() {
                *value = io.value(i);
            }
            self.last_effect = LatchEffect::Written;
        }
    }
}
