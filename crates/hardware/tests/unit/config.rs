//! Configuration parsing tests.

use mipsflow_core::config::{Config, PerformanceMode};
use pretty_assertions::assert_eq;

#[test]
fn defaults() {
    let config = Config::default();
    assert!(!config.general.trace_cycles);
    assert_eq!(config.general.max_cycles, 1_000_000);
    assert_eq!(config.general.history_depth, 1024);
    assert_eq!(config.performance.mode, PerformanceMode::InstructionDependent);
}

#[test]
fn empty_document_is_the_default() {
    assert_eq!(Config::from_json("{}").unwrap(), Config::default());
}

#[test]
fn partial_sections_keep_other_defaults() {
    let config = Config::from_json(r#"{ "general": { "history_depth": 0 } }"#).unwrap();
    assert_eq!(config.general.history_depth, 0);
    assert_eq!(config.general.max_cycles, 1_000_000);
    assert_eq!(config.performance.mode, PerformanceMode::InstructionDependent);
}

#[test]
fn critical_path_mode() {
    let config =
        Config::from_json(r#"{ "performance": { "mode": "critical_path" } }"#).unwrap();
    assert_eq!(config.performance.mode, PerformanceMode::CriticalPath);
}

#[test]
fn unknown_mode_is_rejected() {
    assert!(Config::from_json(r#"{ "performance": { "mode": "fastest" } }"#).is_err());
}
