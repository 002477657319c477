//! Pipeline support.
//!
//! This module contains the pieces that turn a datapath graph into a pipelined CPU:
//! 1. **Hazards:** Forwarding and load-use stall decision rules.
//! 2. **Latches:** The program counter and the inter-stage pipeline registers.
//! 3. **Signals:** ALU operation encoding and control-unit tables.
//! 4. **Stages:** Tracking of which instruction occupies each stage.

/// Pipeline hazard detection and forwarding rules.
pub mod hazards;

/// Program counter and inter-stage pipeline registers.
pub mod latches;

/// ALU operations and control signal tables.
pub mod signals;

/// Pipeline stage occupancy tracking.
pub mod stages;

pub use hazards::{ForwardSource, RegisterWrite, forward_source, need_stall_load_use};
pub use latches::{LatchEffect, LatchField, PipelineRegister, ProgramCounter};
pub use signals::{AluOperation, ControlRow, ControlSignal, ControlTable};
pub use stages::StageTracker;
