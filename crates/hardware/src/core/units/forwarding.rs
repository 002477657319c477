//! Forwarding unit.
//!
//! Drives the ALU operand multiplexers of a pipelined datapath so that an
//! instruction in EX sees results that have not been written back yet. The
//! decision rule lives in [`forward_source`]; this unit applies it to its ports.
//!
//! Register-number inputs are as wide as the linked register bank's addresses.
//! A unit that is not linked to a bank never forwards.

use serde::{Deserialize, Serialize};

use crate::common::constants::FORWARD_SELECTOR_SIZE;
use crate::common::BuildError;
use crate::core::pipeline::hazards::{forward_source, RegisterWrite};
use crate::core::port::{PortBuilder, PortIo};
use crate::core::units::{Combinational, RegisterProfile};

/// Link of a forwarding or hazard detection unit to a register bank.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkSpec {
    /// Identifier of the register bank; it must be declared before the unit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub register_bank: Option<String>,
}

/// Declares a register-number input, required only when the unit is linked.
pub(crate) fn register_input(
    ports: &mut PortBuilder<'_>,
    id: &str,
    profile: Option<&RegisterProfile>,
) -> Result<usize, BuildError> {
    match profile {
        Some(p) => ports.input(id, p.address_bits()),
        None => ports.optional_input(id, RegisterProfile::default().address_bits(), 0, false),
    }
}

/// Selects ALU operand sources: 0 register bank, 1 MEM/WB, 2 EX/MEM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardingUnit {
    profile: Option<RegisterProfile>,
    ex_mem_reg_write: usize,
    mem_wb_reg_write: usize,
    ex_mem_rd: usize,
    mem_wb_rd: usize,
    id_ex_rs: usize,
    id_ex_rt: usize,
    forward_a: usize,
    forward_b: usize,
}

impl ForwardingUnit {
    pub(crate) fn attach(
        profile: Option<RegisterProfile>,
        ports: &mut PortBuilder<'_>,
    ) -> Result<Self, BuildError> {
        Ok(Self {
            ex_mem_reg_write: ports.optional_input("ex_mem_reg_write", 1, 0, false)?,
            mem_wb_reg_write: ports.optional_input("mem_wb_reg_write", 1, 0, false)?,
            ex_mem_rd: register_input(ports, "ex_mem_rd", profile.as_ref())?,
            mem_wb_rd: register_input(ports, "mem_wb_rd", profile.as_ref())?,
            id_ex_rs: register_input(ports, "id_ex_rs", profile.as_ref())?,
            id_ex_rt: register_input(ports, "id_ex_rt", profile.as_ref())?,
            forward_a: ports.output("forward_a", FORWARD_SELECTOR_SIZE)?,
            forward_b: ports.output("forward_b", FORWARD_SELECTOR_SIZE)?,
            profile,
        })
    }

    /// The copied register bank geometry, if linked.
    pub const fn profile(&self) -> Option<&RegisterProfile> {
        self.profile.as_ref()
    }

    /// Output indices of the two selectors.
    pub(crate) const fn selectors(&self) -> [usize; 2] {
        [self.forward_a, self.forward_b]
    }
}

impl Combinational for ForwardingUnit {
    fn execute(&self, io: &mut PortIo<'_>) {
        let (a, b) = match &self.profile {
            Some(profile) => {
                let ex_mem = RegisterWrite {
                    enabled: io.input(self.ex_mem_reg_write).is_set(),
                    register: io.value(self.ex_mem_rd),
                };
                let mem_wb = RegisterWrite {
                    enabled: io.input(self.mem_wb_reg_write).is_set(),
                    register: io.value(self.mem_wb_rd),
                };
                (
                    forward_source(io.value(self.id_ex_rs), ex_mem, mem_wb, profile).code(),
                    forward_source(io.value(self.id_ex_rt), ex_mem, mem_wb, profile).code(),
                )
            }
            None => (0, 0),
        };
        io.set(self.forward_a, a);
        io.set(self.forward_b, b);
        io.set_relevant(self.forward_a, a != 0);
        io.set_relevant(self.forward_b, b != 0);
    }
}
