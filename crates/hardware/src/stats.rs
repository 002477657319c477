//! Performance counters and reporting.
//!
//! This module tracks the performance of the simulated datapath. It provides:
//! 1. **Counters:** Cycles, executed instructions, forwards, and stalls, aggregated by
//!    the CPU once per cycle.
//! 2. **Derived metrics:** CPI, clock frequency, and execution time from the structural
//!    clock period.
//! 3. **Reporting:** Human-readable sections for hosts and the command line.

use std::fmt;

use crate::common::constants::{LATENCY_UNIT, PICOSECONDS_PER_SECOND};

/// Counters aggregated by the CPU after every cycle.
///
/// Counters are reset exactly when the CPU is reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PerformanceCounters {
    /// Completed clock cycles.
    pub cycles: u64,
    /// Instructions that left the last pipeline stage.
    pub executed_instructions: u64,
    /// Non-zero forwarding unit selectors, one per forwarded operand per cycle.
    pub forwards: u64,
    /// Cycles in which a hazard detection unit asserted stall, per unit.
    pub stalls: u64,
}

/// Section names for selective report output.
///
/// Valid section identifiers: `"summary"`, `"timing"`, `"hazards"`.
/// Pass an empty slice to [`PerformanceReport::render`] to render all sections.
pub const REPORT_SECTIONS: &[&str] = &["summary", "timing", "hazards"];

const FREQUENCY_UNITS: [&str; 5] = ["Hz", "kHz", "MHz", "GHz", "THz"];
const TIME_UNITS: [&str; 5] = [LATENCY_UNIT, "ns", "us", "ms", "s"];

/// Divides by 1000 until the value drops below 1000 or the units run out.
fn scaled(mut value: f64, units: &[&str]) -> String {
    let mut unit = 0;
    while value >= 1000.0 && unit < units.len() - 1 {
        value /= 1000.0;
        unit += 1;
    }
    format!("{value:.2} {}", units[unit])
}

/// Counters together with the timing they are interpreted against.
///
/// # Examples
///
/// ```
/// use mipsflow_core::stats::{PerformanceCounters, PerformanceReport};
///
/// let report = PerformanceReport {
///     counters: PerformanceCounters {
///         cycles: 9,
///         executed_instructions: 4,
///         ..PerformanceCounters::default()
///     },
///     clock_period: 500,
///     critical_path: Vec::new(),
/// };
/// assert_eq!(report.cpi_as_string(), "2.25");
/// assert_eq!(report.frequency_in_adequate_unit(), "2.00 GHz");
/// assert_eq!(report.execution_time(), 4500);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PerformanceReport {
    /// Counter values.
    pub counters: PerformanceCounters,
    /// Clock period in picoseconds.
    pub clock_period: u64,
    /// Identifiers of the components on the critical path.
    pub critical_path: Vec<String>,
}

impl PerformanceReport {
    /// Cycles per instruction, `None` before the first instruction completes.
    pub fn cpi(&self) -> Option<f64> {
        match self.counters.executed_instructions {
            0 => None,
            executed => Some(self.counters.cycles as f64 / executed as f64),
        }
    }

    /// CPI with two decimals, or `"-"` when undefined.
    pub fn cpi_as_string(&self) -> String {
        self.cpi().map_or_else(|| "-".to_string(), |cpi| format!("{cpi:.2}"))
    }

    /// Clock frequency in hertz, `0.0` for a zero clock period.
    pub fn clock_frequency(&self) -> f64 {
        if self.clock_period == 0 {
            0.0
        } else {
            PICOSECONDS_PER_SECOND / self.clock_period as f64
        }
    }

    /// Clock frequency scaled to the largest unit that keeps it at or above one,
    /// or `"-"` for a zero clock period.
    pub fn frequency_in_adequate_unit(&self) -> String {
        if self.clock_period == 0 {
            return "-".to_string();
        }
        scaled(self.clock_frequency(), &FREQUENCY_UNITS)
    }

    /// Simulated execution time in picoseconds.
    pub const fn execution_time(&self) -> u64 {
        self.counters.cycles.saturating_mul(self.clock_period)
    }

    /// Execution time scaled to the largest unit that keeps it at or above one.
    pub fn execution_time_in_adequate_unit(&self) -> String {
        let picoseconds = self.execution_time();
        if picoseconds < 1000 {
            return format!("{picoseconds} {LATENCY_UNIT}");
        }
        scaled(picoseconds as f64, &TIME_UNITS)
    }

    /// Renders the requested sections, or every section for an empty slice.
    ///
    /// Each element of `sections` should be one of [`REPORT_SECTIONS`]; unknown names
    /// are ignored.
    pub fn render(&self, sections: &[String]) -> String {
        let mut out = String::new();
        let _ = self.write_sections(&mut out, sections);
        out
    }

    /// Prints the requested sections to stdout.
    pub fn print_sections(&self, sections: &[String]) {
        print!("{}", self.render(sections));
    }

    fn write_sections(&self, out: &mut impl fmt::Write, sections: &[String]) -> fmt::Result {
        let want = |s: &str| sections.is_empty() || sections.iter().any(|x| x == s);
        let counters = &self.counters;

        writeln!(out, "==========================================================")?;
        writeln!(out, "MIPS DATAPATH PERFORMANCE")?;
        writeln!(out, "==========================================================")?;
        if want("summary") {
            writeln!(out, "sim_cycles               {}", counters.cycles)?;
            writeln!(out, "sim_insts                {}", counters.executed_instructions)?;
            writeln!(out, "sim_cpi                  {}", self.cpi_as_string())?;
            writeln!(out, "----------------------------------------------------------")?;
        }
        if want("timing") {
            writeln!(out, "TIMING")?;
            writeln!(out, "  clock.period           {} {LATENCY_UNIT}", self.clock_period)?;
            writeln!(out, "  clock.frequency        {}", self.frequency_in_adequate_unit())?;
            writeln!(
                out,
                "  exec.time              {}",
                self.execution_time_in_adequate_unit()
            )?;
            if !self.critical_path.is_empty() {
                writeln!(out, "  critical.path          {}", self.critical_path.join(" -> "))?;
            }
            writeln!(out, "----------------------------------------------------------")?;
        }
        if want("hazards") {
            let cycles = counters.cycles.max(1) as f64;
            writeln!(out, "HAZARDS")?;
            writeln!(
                out,
                "  forwards               {} ({:.2}/cycle)",
                counters.forwards,
                counters.forwards as f64 / cycles
            )?;
            writeln!(
                out,
                "  stalls                 {} ({:.2}%)",
                counters.stalls,
                counters.stalls as f64 / cycles * 100.0
            )?;
        }
        writeln!(out, "==========================================================")
    }
}

impl fmt::Display for PerformanceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_sections(f, &[])
    }
}
