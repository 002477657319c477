//! Data Hazard Detection and Forwarding.
//!
//! This module implements the decision rules that keep a pipelined datapath consistent
//! when data dependencies exist between instructions. It provides:
//! 1. **Operand Forwarding:** Selects a bypass source for a read-after-write hazard.
//! 2. **Hazard Detection:** Identifies load-use hazards that require a one-cycle stall.
//!
//! The rules are pure functions; the forwarding and hazard detection units apply
//! them to their input ports every cycle.

use crate::core::units::RegisterProfile;

/// Bypass source selected for one ALU operand.
///
/// The discriminant is the value driven on the unit's 2-bit output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ForwardSource {
    /// Use the register bank value.
    #[default]
    None = 0,
    /// Forward the value being written back (MEM/WB latch).
    MemWb = 1,
    /// Forward the ALU result of the previous instruction (EX/MEM latch).
    ExMem = 2,
}

impl ForwardSource {
    /// Value driven on the forwarding output.
    pub const fn code(self) -> u32 {
        self as u32
    }
}

/// A pending register write carried by a pipeline latch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RegisterWrite {
    /// The `RegWrite` control signal.
    pub enabled: bool,
    /// Destination register.
    pub register: u32,
}

impl RegisterWrite {
    /// Returns `true` if the write will change `register` in a bank with this profile.
    fn targets(self, register: u32, profile: &RegisterProfile) -> bool {
        self.enabled && !profile.is_constant(self.register) && self.register == register
    }
}

/// Selects the forwarding source for an operand in the EX stage.
///
/// The EX hazard is checked first: the most recent producer wins. A MEM hazard
/// only applies when the EX/MEM destination differs from the operand. Writes to
/// constant registers never forward.
///
/// # Arguments
///
/// * `operand` - Source register read by the instruction in ID/EX.
/// * `ex_mem` - The write carried by the EX/MEM latch.
/// * `mem_wb` - The write carried by the MEM/WB latch.
/// * `profile` - Register bank geometry and constant registers.
///
/// # Examples
///
/// ```
/// use mipsflow_core::core::pipeline::hazards::{forward_source, ForwardSource, RegisterWrite};
/// use mipsflow_core::core::units::RegisterProfile;
///
/// let profile = RegisterProfile::new(5, vec![0]);
/// let ex_mem = RegisterWrite { enabled: true, register: 5 };
/// let mem_wb = RegisterWrite { enabled: true, register: 5 };
/// assert_eq!(forward_source(5, ex_mem, mem_wb, &profile), ForwardSource::ExMem);
/// assert_eq!(forward_source(0, ex_mem, mem_wb, &profile), ForwardSource::None);
/// ```
pub fn forward_source(
    operand: u32,
    ex_mem: RegisterWrite,
    mem_wb: RegisterWrite,
    profile: &RegisterProfile,
) -> ForwardSource {
    if ex_mem.targets(operand, profile) {
        ForwardSource::ExMem
    } else if mem_wb.targets(operand, profile) && ex_mem.register != operand {
        ForwardSource::MemWb
    } else {
        ForwardSource::None
    }
}

/// Checks if a pipeline stall is needed due to a load-use data hazard.
///
/// A load-use hazard occurs when the instruction in the Decode (ID) stage reads a
/// register that the load currently in the Execute (EX) stage has not produced yet.
///
/// # Arguments
///
/// * `mem_read` - The `MemRead` control signal in ID/EX.
/// * `id_ex_rt` - Destination of the load in ID/EX.
/// * `if_id_rs` - First source register of the instruction in IF/ID.
/// * `if_id_rt` - Second source register of the instruction in IF/ID.
/// * `profile` - Register bank geometry and constant registers.
///
/// # Returns
///
/// `true` if the instruction in ID must wait one cycle.
pub fn need_stall_load_use(
    mem_read: bool,
    id_ex_rt: u32,
    if_id_rs: u32,
    if_id_rt: u32,
    profile: &RegisterProfile,
) -> bool {
    mem_read && !profile.is_constant(id_ex_rt) && (id_ex_rt == if_id_rs || id_ex_rt == if_id_rt)
}
