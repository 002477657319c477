//! Main Execution Loop.
//!
//! This module implements the clock cycle of the CPU. It performs the following:
//! 1. **Aggregation:** Counts the completed cycle's executed instruction, forwards,
//!    and stalls.
//! 2. **Commit:** Latches synchronous state from the completed cycle's inputs.
//! 3. **Stage Tracking:** Moves instruction addresses through the pipeline stages.
//! 4. **Evaluation:** Re-evaluates every component in topological order and propagates
//!    outputs along wires.
//! 5. **Run Control:** Repeated stepping with breakpoints, stop predicates, and a cycle
//!    limit; reset and single-cycle undo.

use tracing::{debug, trace};

use super::Cpu;
use crate::common::EditError;
use crate::core::pipeline::latches::LatchEffect;
use crate::core::units::Unit;

/// Why [`Cpu::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Every pipeline stage is empty.
    Finished,
    /// An instruction at a breakpoint address entered the fetch stage.
    Breakpoint(u32),
    /// The cycle limit was reached.
    CycleLimit,
    /// The caller's stop predicate returned `true`.
    Stopped,
}

/// Result of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOutcome {
    /// Why the run ended.
    pub reason: StopReason,
    /// Cycles executed by this run.
    pub cycles: u64,
}

impl Cpu {
    /// Evaluates the first cycle and records the initial state.
    pub(crate) fn initialize(&mut self) {
        self.timing = self.analyze_timing();
        self.evaluate();
        let fetched = self.fetch_address();
        self.tracker.restart(fetched);
        self.initial = self.snapshot();
    }

    /// Advances the simulated clock by one cycle.
    ///
    /// The completed cycle is counted, synchronous state is committed, the pipeline
    /// stages advance, and the new cycle is evaluated. A step never fails.
    pub fn step(&mut self) {
        self.push_history();
        self.aggregate();
        for component in &mut self.components {
            component.commit();
        }
        self.advance_stages();
        self.evaluate();
        self.revision += 1;

        if self.config.general.trace_cycles {
            debug!(
                cycle = self.counters.cycles,
                pc = ?self.pc(),
                stages = ?self.tracker.occupancy(),
                "cycle"
            );
        }
    }

    /// Steps until the program finishes or the configured cycle limit is reached.
    pub fn run(&mut self) -> RunOutcome {
        self.run_until(self.config.general.max_cycles, |_| false)
    }

    /// Steps until the program finishes, a breakpoint is fetched, `max_cycles` cycles
    /// have run, or `stop` returns `true` after a step.
    ///
    /// # Arguments
    ///
    /// * `max_cycles` - Upper bound on the number of steps.
    /// * `stop` - Predicate checked after every step; lets the host cancel the run.
    ///
    /// # Returns
    ///
    /// The reason the run ended and the number of cycles it executed.
    pub fn run_until<F>(&mut self, max_cycles: u64, mut stop: F) -> RunOutcome
    where
        F: FnMut(&Self) -> bool,
    {
        let mut cycles = 0;
        let reason = loop {
            if self.is_finished() {
                break StopReason::Finished;
            }
            if cycles >= max_cycles {
                break StopReason::CycleLimit;
            }
            self.step();
            cycles += 1;
            if let Some(address) = self
                .tracker
                .fetching()
                .filter(|a| self.breakpoints.contains(a))
            {
                break StopReason::Breakpoint(address);
            }
            if stop(self) {
                break StopReason::Stopped;
            }
        };
        debug!(?reason, cycles, "run ended");
        RunOutcome { reason, cycles }
    }

    /// Restores the state right after construction.
    ///
    /// Components, counters, and stage occupancy return to their initial values and
    /// the history is cleared. Latency edits and the loaded program are kept.
    pub fn reset(&mut self) {
        self.restore(self.initial.clone());
        self.history.clear();
        self.evaluate();
        self.revision += 1;
    }

    /// Returns to the state before the last step.
    pub fn step_back(&mut self) -> Result<(), EditError> {
        let snapshot = self.history.pop_back().ok_or(EditError::NothingToUndo)?;
        self.restore(snapshot);
        self.evaluate();
        self.revision += 1;
        Ok(())
    }

    fn push_history(&mut self) {
        let depth = self.config.general.history_depth;
        if depth == 0 {
            return;
        }
        while self.history.len() >= depth {
            let _ = self.history.pop_front();
        }
        self.history.push_back(self.snapshot());
    }

    /// Counts the events of the cycle about to complete.
    fn aggregate(&mut self) {
        self.counters.cycles += 1;
        if self.tracker.retiring().is_some() {
            self.counters.executed_instructions += 1;
        }

        for &id in &self.roles.forwarding_units {
            let component = &self.components[id.index()];
            if let Unit::ForwardingUnit(unit) = &component.unit {
                for output in unit.selectors() {
                    let value = component.outputs[output].value();
                    if value != 0 {
                        self.counters.forwards += 1;
                        trace!(
                            unit = component.id,
                            port = component.outputs[output].id(),
                            source = value,
                            "forward"
                        );
                    }
                }
            }
        }

        for &id in &self.roles.hazard_units {
            let component = &self.components[id.index()];
            if let Unit::HazardDetectionUnit(unit) = &component.unit
                && component.outputs[unit.stall_output()].value() != 0
            {
                self.counters.stalls += 1;
                trace!(unit = component.id, "stall");
            }
        }
    }

    fn advance_stages(&mut self) {
        let Some(pc) = self.program_counter() else {
            return;
        };
        let pc_effect = pc.last_effect();
        let fetched = self.fetch_address();
        let effects: Vec<LatchEffect> = self
            .tracker
            .latches()
            .iter()
            .map(|id| match &self.components[id.index()].unit {
                Unit::PipelineRegister(latch) => latch.last_effect(),
                _ => LatchEffect::Written,
            })
            .collect();
        self.tracker.advance(pc_effect, fetched, &effects);
    }

    /// Evaluates every component in topological order, propagating each output to
    /// the inputs its wire drives.
    pub(crate) fn evaluate(&mut self) {
        let mode = self.config.performance.mode;
        for position in 0..self.order.len() {
            let id = self.order[position].index();
            self.components[id].evaluate(mode);

            for output in 0..self.components[id].outputs.len() {
                let source = &self.components[id].outputs[output];
                let Some(wire) = source.wire() else {
                    continue;
                };
                let (data, relevant, latency) =
                    (source.data(), source.is_relevant(), source.accumulated_latency());
                for target in &self.wires[wire.index()].targets {
                    self.components[target.component.index()].inputs[target.port]
                        .drive(data, relevant, latency);
                }
            }
        }
    }
}
