//! Datapath graph and simulation engine.
//!
//! This module contains the component graph and the CPU that drives it:
//! 1. **Graph model:** Ports, wires, and components.
//! 2. **Units:** The behavior of every component kind.
//! 3. **Pipeline:** Latches, hazard and forwarding rules, control tables, and stage
//!    occupancy.
//! 4. **CPU:** Construction, the clock cycle, timing, and host edits.

/// Graph nodes.
pub mod component;

/// CPU construction, scheduling, and host interface.
pub mod cpu;

/// Pipeline latches, hazard rules, control signals, and stage tracking.
pub mod pipeline;

/// Component ports.
pub mod port;

/// Component behaviors (ALU, register bank, control, memories, logic, wiring).
pub mod units;

/// Graph edges.
pub mod wire;

pub use self::cpu::{Cpu, CpuBuilder};
