//! Functional-block MIPS datapath simulator library.
//!
//! This crate simulates a MIPS CPU datapath, single-cycle or pipelined, as a graph of
//! functional blocks connected by wires. It provides:
//! 1. **Core:** The component/port/wire graph, the per-cycle evaluator, and the
//!    structural timing model.
//! 2. **Units:** ALUs, register bank, control unit, forwarding and hazard detection
//!    units, memories, latches, and wiring helpers.
//! 3. **Simulation:** Serializable circuit descriptions, built-in presets, and a hex
//!    program loader.
//! 4. **Statistics:** Cycle, instruction, forward, and stall counters with CPI and
//!    clock frequency.

/// Common types and constants (signals, widths, errors).
pub mod common;
/// Engine configuration (run limits, history, performance mode).
pub mod config;
/// Datapath graph, units, pipeline support, and the CPU.
pub mod core;
/// Circuit descriptions, presets, and program loading.
pub mod sim;
/// Performance counters and reporting.
pub mod stats;

/// Root configuration type; use `Config::default()` or deserialize from JSON.
pub use crate::config::Config;
/// A built datapath; construct with [`CpuBuilder`] or a [`CircuitDescription`].
pub use crate::core::{Cpu, CpuBuilder};
/// Serializable datapath description.
pub use crate::sim::description::CircuitDescription;
