//! Host Edits.
//!
//! Runtime mutations requested by a host between steps. Every edit is validated
//! first; a rejected edit returns an [`EditError`], logs a warning, and leaves the
//! CPU untouched. An accepted edit re-evaluates the current cycle and bumps the
//! revision counter.

use tracing::warn;

use super::Cpu;
use crate::common::constants::INSTRUCTION_BYTES;
use crate::common::EditError;
use crate::config::PerformanceMode;
use crate::core::component::ComponentId;
use crate::core::units::Unit;

impl Cpu {
    /// Changes the base latency of a component and recomputes the critical path.
    ///
    /// The new latency also applies after [`Cpu::reset`] and [`Cpu::step_back`].
    ///
    /// # Arguments
    ///
    /// * `component` - Identifier of the component.
    /// * `latency` - New latency in picoseconds; negative values are rejected.
    pub fn set_component_latency(&mut self, component: &str, latency: i64) -> Result<(), EditError> {
        let result = self.try_set_component_latency(component, latency);
        self.finish("set_component_latency", result)
    }

    fn try_set_component_latency(&mut self, component: &str, latency: i64) -> Result<(), EditError> {
        if latency < 0 {
            return Err(EditError::NegativeLatency(latency));
        }
        let latency = u32::try_from(latency).map_err(|_| EditError::LatencyTooLarge(latency))?;
        let id = self.require_component(component)?;

        let index = id.index();
        self.components[index].latency = latency;
        if let Some(initial) = self.initial.components.get_mut(index) {
            initial.latency = latency;
        }
        for snapshot in &mut self.history {
            if let Some(past) = snapshot.components.get_mut(index) {
                past.latency = latency;
            }
        }
        self.timing = self.analyze_timing();
        Ok(())
    }

    /// Replaces the program in instruction memory and resets the CPU.
    pub fn load_program(&mut self, program: Vec<u32>) -> Result<(), EditError> {
        let Some(id) = self.roles.instruction_memory else {
            return self.finish("load_program", Err(EditError::MissingUnit("instruction memory")));
        };
        if let Some(Unit::InstructionMemory(memory)) =
            self.initial.components.get_mut(id.index()).map(|c| &mut c.unit)
        {
            memory.load(program);
        }
        self.reset();
        let fetched = self.fetch_address();
        self.tracker.restart(fetched);
        self.initial.tracker = self.tracker.clone();
        Ok(())
    }

    /// Writes a register of the register bank.
    ///
    /// Constant registers and indices outside the bank are rejected.
    pub fn set_register_value(&mut self, index: u32, value: u32) -> Result<(), EditError> {
        let result = match self.roles.register_bank.map(|id| &mut self.components[id.index()].unit) {
            Some(Unit::RegisterBank(bank)) => bank.set_register(index, value),
            _ => Err(EditError::MissingUnit("register bank")),
        };
        self.finish("set_register_value", result)
    }

    /// Moves the program counter and refetches.
    ///
    /// The address must be a multiple of the instruction size.
    pub fn set_program_counter(&mut self, address: u32) -> Result<(), EditError> {
        let result = if address % INSTRUCTION_BYTES != 0 {
            Err(EditError::UnalignedAddress(address))
        } else {
            match self.roles.program_counter.map(|id| &mut self.components[id.index()].unit) {
                Some(Unit::ProgramCounter(pc)) => {
                    pc.set_address(address);
                    Ok(())
                }
                _ => Err(EditError::MissingUnit("program counter")),
            }
        };
        if result.is_ok() {
            let fetched = self.fetch_address();
            self.tracker.set_fetch(fetched);
        }
        self.finish("set_program_counter", result)
    }

    /// Writes a word of data memory.
    ///
    /// The address must be word aligned and inside the memory.
    pub fn set_data_memory_word(&mut self, address: u32, value: u32) -> Result<(), EditError> {
        let result = match self.roles.data_memory.map(|id| &mut self.components[id.index()].unit) {
            Some(Unit::DataMemory(memory)) => memory.set_word(address, value),
            _ => Err(EditError::MissingUnit("data memory")),
        };
        self.finish("set_data_memory_word", result)
    }

    /// Switches how per-port latencies are accumulated.
    ///
    /// The clock period is unaffected.
    pub fn set_performance_mode(&mut self, mode: PerformanceMode) {
        self.config.performance.mode = mode;
        self.evaluate();
        self.revision += 1;
    }

    /// Stops [`Cpu::run`] when the instruction at `address` is fetched.
    ///
    /// # Returns
    ///
    /// `true` if the breakpoint was not already set.
    pub fn add_breakpoint(&mut self, address: u32) -> bool {
        let added = self.breakpoints.insert(address);
        self.revision += 1;
        added
    }

    /// Removes a breakpoint, returning `true` if it was set.
    pub fn remove_breakpoint(&mut self, address: u32) -> bool {
        let removed = self.breakpoints.remove(&address);
        self.revision += 1;
        removed
    }

    /// Removes every breakpoint.
    pub fn clear_breakpoints(&mut self) {
        self.breakpoints.clear();
        self.revision += 1;
    }

    fn require_component(&self, component: &str) -> Result<ComponentId, EditError> {
        self.component_id(component)
            .ok_or_else(|| EditError::UnknownComponent(component.to_string()))
    }

    /// Re-evaluates after an accepted edit, or logs the rejection.
    fn finish(&mut self, edit: &'static str, result: Result<(), EditError>) -> Result<(), EditError> {
        match &result {
            Ok(()) => {
                self.evaluate();
                self.revision += 1;
            }
            Err(error) => warn!(edit, %error, "edit rejected"),
        }
        result
    }
}
