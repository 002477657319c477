//! Hazard detection unit.
//!
//! Detects load-use hazards: the instruction in ID reads a register that the load
//! in EX has not fetched from memory yet. The datapath uses `stall` to hold the
//! program counter and the IF/ID latch and to flush ID/EX, inserting one bubble.
//! `pc_write` and `if_id_write` carry the inverse of `stall` for datapaths that
//! drive write enables directly.

use crate::common::BuildError;
use crate::core::pipeline::hazards::need_stall_load_use;
use crate::core::port::{PortBuilder, PortIo};
use crate::core::units::forwarding::register_input;
use crate::core::units::{Combinational, RegisterProfile};

/// Load-use stall detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HazardDetectionUnit {
    profile: Option<RegisterProfile>,
    id_ex_mem_read: usize,
    id_ex_rt: usize,
    if_id_rs: usize,
    if_id_rt: usize,
    stall: usize,
    pc_write: usize,
    if_id_write: usize,
}

impl HazardDetectionUnit {
    pub(crate) fn attach(
        profile: Option<RegisterProfile>,
        ports: &mut PortBuilder<'_>,
    ) -> Result<Self, BuildError> {
        Ok(Self {
            id_ex_mem_read: ports.optional_input("id_ex_mem_read", 1, 0, false)?,
            id_ex_rt: register_input(ports, "id_ex_rt", profile.as_ref())?,
            if_id_rs: register_input(ports, "if_id_rs", profile.as_ref())?,
            if_id_rt: register_input(ports, "if_id_rt", profile.as_ref())?,
            stall: ports.output("stall", 1)?,
            pc_write: ports.output("pc_write", 1)?,
            if_id_write: ports.output("if_id_write", 1)?,
            profile,
        })
    }

    /// The copied register bank geometry, if linked.
    pub const fn profile(&self) -> Option<&RegisterProfile> {
        self.profile.as_ref()
    }

    pub(crate) const fn stall_output(&self) -> usize {
        self.stall
    }
}

impl Combinational for HazardDetectionUnit {
    fn execute(&self, io: &mut PortIo<'_>) {
        let stall = self.profile.as_ref().is_some_and(|profile| {
            need_stall_load_use(
                io.input(self.id_ex_mem_read).is_set(),
                io.value(self.id_ex_rt),
                io.value(self.if_id_rs),
                io.value(self.if_id_rt),
                profile,
            )
        });
        io.set(self.stall, u32::from(stall));
        io.set(self.pc_write, u32::from(!stall));
        io.set(self.if_id_write, u32::from(!stall));
        io.set_relevant(self.stall, stall);
    }
}
