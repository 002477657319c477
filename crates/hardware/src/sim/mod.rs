//! Simulation inputs.
//!
//! Everything a host needs to get a datapath running:
//! 1. **Descriptions:** The serializable circuit format and its round trip.
//! 2. **Presets:** Built-in single-cycle and pipelined MIPS datapaths.
//! 3. **Programs:** Loading instruction words from hex text files.

/// Serializable circuit descriptions.
pub mod description;

/// Program file loading.
pub mod loader;

/// Built-in datapaths.
pub mod presets;
