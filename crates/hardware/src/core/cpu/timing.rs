//! Clock Period and Critical Path.
//!
//! The clock period is structural: it depends only on the graph and the component
//! latencies, never on the instruction in flight. This module provides:
//! 1. **Arrival times:** The longest combinational path from the previous clock edge to
//!    every component's outputs.
//! 2. **Clock period:** The latest arrival at any clocked input.
//! 3. **Critical path:** The chain of components that produces that arrival.
//! 4. **Derived metrics:** Frequency, execution time, and the performance report.

use super::Cpu;
use crate::common::constants::PICOSECONDS_PER_SECOND;
use crate::core::component::{Component, ComponentId};
use crate::stats::PerformanceReport;

/// Result of the structural timing analysis.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Timing {
    /// Clock period in picoseconds.
    pub clock_period: u64,
    /// Components on the longest path, from the clock edge to the sampling input.
    pub critical_path: Vec<ComponentId>,
}

/// Computes arrival times in evaluation order and picks the latest clocked sample.
///
/// A graph without clocked inputs uses the latest arrival at any output.
pub(crate) fn analyze(components: &[Component], order: &[ComponentId]) -> Timing {
    let mut arrival = vec![0u64; components.len()];
    let mut predecessor: Vec<Option<ComponentId>> = vec![None; components.len()];

    for &id in order {
        let component = &components[id.index()];
        let mut latest: Option<(u64, ComponentId)> = None;
        for input in component.inputs.iter().filter(|i| !i.is_clocked()) {
            if let Some(source) = input.source() {
                let time = arrival[source.component.index()];
                if latest.is_none_or(|(best, _)| time > best) {
                    latest = Some((time, source.component));
                }
            }
        }
        arrival[id.index()] =
            u64::from(component.latency) + latest.map_or(0, |(time, _)| time);
        predecessor[id.index()] = latest.map(|(_, source)| source);
    }

    let mut end: Option<(u64, ComponentId)> = None;
    let mut has_clocked = false;
    for component in components {
        for input in component.inputs.iter().filter(|i| i.is_clocked()) {
            if let Some(source) = input.source() {
                has_clocked = true;
                let time = arrival[source.component.index()];
                if end.is_none_or(|(best, _)| time > best) {
                    end = Some((time, source.component));
                }
            }
        }
    }
    if !has_clocked {
        for &id in order {
            let time = arrival[id.index()];
            if end.is_none_or(|(best, _)| time > best) {
                end = Some((time, id));
            }
        }
    }

    let Some((clock_period, last)) = end else {
        return Timing::default();
    };
    let mut critical_path = vec![last];
    let mut current = last;
    while let Some(previous) = predecessor[current.index()] {
        critical_path.push(previous);
        current = previous;
    }
    critical_path.reverse();

    Timing {
        clock_period,
        critical_path,
    }
}

impl Cpu {
    pub(crate) fn analyze_timing(&self) -> Timing {
        analyze(&self.components, &self.order)
    }

    /// Clock period in picoseconds.
    pub const fn clock_period(&self) -> u64 {
        self.timing.clock_period
    }

    /// Components on the critical path, in signal order.
    pub fn critical_path(&self) -> &[ComponentId] {
        &self.timing.critical_path
    }

    /// Clock frequency in hertz, `0.0` for a zero clock period.
    pub fn clock_frequency(&self) -> f64 {
        if self.timing.clock_period == 0 {
            0.0
        } else {
            PICOSECONDS_PER_SECOND / self.timing.clock_period as f64
        }
    }

    /// Simulated execution time in picoseconds.
    pub const fn execution_time(&self) -> u64 {
        self.counters.cycles.saturating_mul(self.timing.clock_period)
    }

    /// Snapshot of the counters and timing for display.
    pub fn performance(&self) -> PerformanceReport {
        PerformanceReport {
            counters: self.counters,
            clock_period: self.timing.clock_period,
            critical_path: self
                .timing
                .critical_path
                .iter()
                .map(|id| self.components[id.index()].id.clone())
                .collect(),
        }
    }
}
