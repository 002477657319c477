//! Main control unit.
//!
//! Decodes the opcode field into the control signals that steer the datapath. The
//! unit has no ports until a [`ControlTable`] is installed; installing it creates an
//! `opcode` input of the field width and one output per declared signal.

use crate::common::BuildError;
use crate::core::pipeline::signals::ControlTable;
use crate::core::port::{PortBuilder, PortIo};
use crate::core::units::Combinational;

/// Opcode to control-vector lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControlUnit {
    table: Option<ControlTable>,
    opcode_size: u8,
    vectors: Vec<Vec<u32>>,
    opcode: usize,
}

impl ControlUnit {
    pub(crate) fn attach() -> Self {
        Self::default()
    }

    /// Installs the table and creates the unit's ports.
    ///
    /// The table is validated in full before any port is declared.
    pub(crate) fn set_control(
        &mut self,
        table: &ControlTable,
        opcode_size: u8,
        ports: &mut PortBuilder<'_>,
    ) -> Result<(), BuildError> {
        if self.table.is_some() {
            return Err(BuildError::InvalidControlTable {
                unit: ports.component().to_string(),
                detail: "a control table is already installed".to_string(),
            });
        }
        let vectors = table.resolve(ports.component(), opcode_size)?;
        let opcode = ports.input("opcode", opcode_size)?;
        for signal in &table.signals {
            let _ = ports.output(&signal.name, signal.size)?;
        }
        self.table = Some(table.clone());
        self.opcode_size = opcode_size;
        self.vectors = vectors;
        self.opcode = opcode;
        Ok(())
    }

    /// The installed table.
    pub const fn table(&self) -> Option<&ControlTable> {
        self.table.as_ref()
    }

    /// Width of the opcode field.
    pub const fn opcode_size(&self) -> u8 {
        self.opcode_size
    }

    /// Control vector for `opcode`, in signal declaration order.
    pub fn vector(&self, opcode: u32) -> Option<&[u32]> {
        self.vectors.get(opcode as usize).map(Vec::as_slice)
    }
}

impl Combinational for ControlUnit {
    fn execute(&self, io: &mut PortIo<'_>) {
        if self.table.is_none() {
            return;
        }
        if let Some(vector) = self.vector(io.value(self.opcode)) {
            for (output, value) in vector.iter().enumerate() {
                io.set(output, *value);
            }
        }
    }
}
