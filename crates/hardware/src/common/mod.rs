//! Common utilities and types used throughout the datapath engine.
//!
//! This module provides the building blocks shared by every component:
//! 1. **Signals:** The fixed-width [`Data`] value and its display formats.
//! 2. **Constants:** Word sizes, alignment, and the latency unit.
//! 3. **Error Handling:** Build-time and host-edit error enums.

/// Datapath-wide constants.
pub mod constants;

/// Fixed-width signal values.
pub mod data;

/// Error types.
pub mod error;

pub use constants::{DATA_SIZE, INSTRUCTION_BYTES, LATENCY_UNIT};
pub use data::{Data, DataFormat};
pub use error::{BuildError, EditError};
