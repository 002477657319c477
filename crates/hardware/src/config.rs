//! Configuration system for the datapath engine.
//!
//! This module defines the structures used to parameterize a [`Cpu`](crate::core::Cpu)
//! independently of the circuit it simulates. It provides:
//! 1. **Defaults:** Baseline run limits and history depth.
//! 2. **Structures:** General and performance settings.
//! 3. **Enums:** The performance (latency accounting) mode.
//!
//! Configuration is supplied as JSON by a host or built with `Config::default()`.

use serde::Deserialize;

/// Default configuration constants for the engine.
mod defaults {
    /// Cycle limit applied by `Cpu::run` when the caller gives none.
    ///
    /// Protects hosts from programs that loop forever.
    pub const MAX_CYCLES: u64 = 1_000_000;

    /// Number of previous cycles kept for stepping backwards.
    pub const HISTORY_DEPTH: usize = 1024;
}

/// How per-port accumulated latencies are computed each cycle.
///
/// The clock period is always structural; this mode only changes what the host
/// sees on individual ports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceMode {
    /// Only relevant inputs contribute, so port latencies follow the current instruction.
    #[default]
    InstructionDependent,
    /// Every combinational input contributes, showing the worst case at each port.
    CriticalPath,
}

/// Root configuration structure.
///
/// # Examples
///
/// ```
/// use mipsflow_core::config::{Config, PerformanceMode};
///
/// let config = Config::default();
/// assert_eq!(config.performance.mode, PerformanceMode::InstructionDependent);
///
/// let json = r#"{
///     "general": { "max_cycles": 500, "trace_cycles": true },
///     "performance": { "mode": "critical_path" }
/// }"#;
/// let config: Config = serde_json::from_str(json).unwrap();
/// assert_eq!(config.general.max_cycles, 500);
/// assert_eq!(config.general.history_depth, 1024);
/// assert_eq!(config.performance.mode, PerformanceMode::CriticalPath);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Config {
    /// General simulation settings
    #[serde(default)]
    pub general: GeneralConfig,
    /// Latency accounting settings
    #[serde(default)]
    pub performance: PerformanceConfig,
}

impl Config {
    /// Parses a configuration from a JSON document.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// General simulation settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GeneralConfig {
    /// Emit a `debug` event with the stage occupancy after every step.
    #[serde(default)]
    pub trace_cycles: bool,

    /// Cycle limit for `Cpu::run`.
    #[serde(default = "GeneralConfig::default_max_cycles")]
    pub max_cycles: u64,

    /// Number of previous cycles kept for `Cpu::step_back` (0 disables history).
    #[serde(default = "GeneralConfig::default_history_depth")]
    pub history_depth: usize,
}

impl GeneralConfig {
    fn default_max_cycles() -> u64 {
        defaults::MAX_CYCLES
    }

    fn default_history_depth() -> usize {
        defaults::HISTORY_DEPTH
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            trace_cycles: false,
            max_cycles: defaults::MAX_CYCLES,
            history_depth: defaults::HISTORY_DEPTH,
        }
    }
}

/// Latency accounting settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PerformanceConfig {
    /// Per-port latency mode.
    #[serde(default)]
    pub mode: PerformanceMode,
}
