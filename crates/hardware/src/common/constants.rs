//! Global Datapath Constants.
//!
//! This module defines constants shared across the engine. It includes:
//! 1. **Signal Constants:** Widths of data words and signals.
//! 2. **Instruction Constants:** Instruction size and alignment.
//! 3. **Timing Constants:** The unit latencies are expressed in.

/// Width in bits of a datapath word (registers, ALU operands, memory words).
pub const DATA_SIZE: u8 = 32;

/// Largest width a single signal may have.
pub const MAX_SIGNAL_SIZE: u8 = 32;

/// Size of an instruction in bytes. The PC must be a multiple of this.
pub const INSTRUCTION_BYTES: u32 = (DATA_SIZE / 8) as u32;

/// Size of a data memory word in bytes.
pub const WORD_BYTES: u32 = (DATA_SIZE / 8) as u32;

/// Unit of every latency value in the engine (picoseconds).
pub const LATENCY_UNIT: &str = "ps";

/// Picoseconds per second, used to turn a clock period into a frequency.
pub const PICOSECONDS_PER_SECOND: f64 = 1e12;

/// Width of the selector produced by the ALU control and consumed by the ALUs.
pub const ALU_CONTROL_SIZE: u8 = 4;

/// Width of the `ALUOp` field driven by the main control unit.
pub const ALU_OP_SIZE: u8 = 2;

/// Width of the R-type `funct` field.
pub const FUNCT_SIZE: u8 = 6;

/// Width of the forwarding unit selector outputs.
pub const FORWARD_SELECTOR_SIZE: u8 = 2;
