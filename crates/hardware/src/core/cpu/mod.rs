//! CPU Definition and Initialization.
//!
//! This module defines the central [`Cpu`] structure, which owns a validated datapath
//! graph and drives it. It coordinates the following:
//! 1. **Graph Ownership:** Components, wires, and the register bank link table.
//! 2. **Scheduling:** The topological evaluation order and the per-cycle step.
//! 3. **Performance:** Counters, clock period, and the critical path.
//! 4. **Host Interface:** Read access for display and validated runtime edits.

/// Graph construction and validation.
pub mod builder;

/// Host-requested runtime mutations.
pub mod edit;

/// Clock cycle execution, run loop, reset, and history.
pub mod execution;

/// Clock period and critical path analysis.
pub mod timing;

use std::collections::{BTreeSet, HashMap, VecDeque};

use crate::config::{Config, PerformanceMode};
use crate::core::component::{Component, ComponentId};
use crate::core::pipeline::latches::ProgramCounter;
use crate::core::pipeline::stages::StageTracker;
use crate::core::units::{DataMemory, InstructionMemory, RegisterBank, Unit};
use crate::core::wire::Wire;
use crate::stats::PerformanceCounters;

pub use builder::CpuBuilder;
pub use execution::{RunOutcome, StopReason};
pub use timing::Timing;

/// A forwarding or hazard detection unit linked to a register bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterLink {
    /// The forwarding or hazard detection unit.
    pub unit: ComponentId,
    /// The register bank whose geometry the unit copied.
    pub register_bank: ComponentId,
}

/// Components with a special role in the CPU.
///
/// Each singleton role may be filled by at most one component.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Roles {
    pub(crate) program_counter: Option<ComponentId>,
    pub(crate) instruction_memory: Option<ComponentId>,
    pub(crate) register_bank: Option<ComponentId>,
    pub(crate) data_memory: Option<ComponentId>,
    pub(crate) control_unit: Option<ComponentId>,
    pub(crate) forwarding_units: Vec<ComponentId>,
    pub(crate) hazard_units: Vec<ComponentId>,
}

/// Everything `step` mutates, captured for reset and history.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Snapshot {
    pub(crate) components: Vec<Component>,
    pub(crate) counters: PerformanceCounters,
    pub(crate) tracker: StageTracker,
}

/// A built datapath and its simulation state.
///
/// A `Cpu` is produced by [`CpuBuilder::build`] from a validated graph. Its displayed
/// state is always the combinational evaluation of the current cycle.
#[derive(Debug, Clone)]
pub struct Cpu {
    pub(crate) components: Vec<Component>,
    pub(crate) wires: Vec<Wire>,
    pub(crate) index: HashMap<String, ComponentId>,
    pub(crate) order: Vec<ComponentId>,
    pub(crate) links: Vec<RegisterLink>,
    pub(crate) roles: Roles,
    pub(crate) tracker: StageTracker,
    pub(crate) counters: PerformanceCounters,
    pub(crate) timing: Timing,
    pub(crate) config: Config,
    pub(crate) breakpoints: BTreeSet<u32>,
    pub(crate) history: VecDeque<Snapshot>,
    pub(crate) initial: Snapshot,
    pub(crate) revision: u64,
}

impl Cpu {
    /// Components in declaration order.
    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// Wires in declaration order.
    pub fn wires(&self) -> &[Wire] {
        &self.wires
    }

    /// Component by handle, or `None` for a handle from another CPU.
    pub fn component(&self, id: ComponentId) -> Option<&Component> {
        self.components.get(id.index())
    }

    /// Looks up a component handle by identifier.
    pub fn component_id(&self, id: &str) -> Option<ComponentId> {
        self.index.get(id).copied()
    }

    /// Looks up a component by identifier.
    pub fn component_by_name(&self, id: &str) -> Option<&Component> {
        self.component_id(id).and_then(|c| self.component(c))
    }

    /// Evaluation order of the combinational graph.
    pub fn evaluation_order(&self) -> &[ComponentId] {
        &self.order
    }

    /// Forwarding and hazard detection units linked to a register bank.
    pub fn register_links(&self) -> &[RegisterLink] {
        &self.links
    }

    /// Register bank linked to `unit`, if any.
    pub fn linked_register_bank(&self, unit: ComponentId) -> Option<ComponentId> {
        self.links
            .iter()
            .find(|l| l.unit == unit)
            .map(|l| l.register_bank)
    }

    /// Engine configuration.
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Current per-port latency mode.
    pub const fn performance_mode(&self) -> PerformanceMode {
        self.config.performance.mode
    }

    /// Performance counters since construction or the last reset.
    pub const fn counters(&self) -> &PerformanceCounters {
        &self.counters
    }

    /// Pipeline stage occupancy.
    pub const fn stages(&self) -> &StageTracker {
        &self.tracker
    }

    /// Counter incremented by every state change, for host change detection.
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Breakpoint addresses.
    pub const fn breakpoints(&self) -> &BTreeSet<u32> {
        &self.breakpoints
    }

    /// Number of cycles `step_back` can undo.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// The register bank, if the datapath has one.
    pub fn register_bank(&self) -> Option<&RegisterBank> {
        match &self.component(self.roles.register_bank?)?.unit {
            Unit::RegisterBank(bank) => Some(bank),
            _ => None,
        }
    }

    /// Register contents, empty without a register bank.
    pub fn registers(&self) -> &[u32] {
        match self.register_bank() {
            Some(bank) => bank.registers(),
            None => &[],
        }
    }

    /// The program counter, if the datapath has one.
    pub fn program_counter(&self) -> Option<&ProgramCounter> {
        match &self.component(self.roles.program_counter?)?.unit {
            Unit::ProgramCounter(pc) => Some(pc),
            _ => None,
        }
    }

    /// Current fetch address.
    pub fn pc(&self) -> Option<u32> {
        self.program_counter().map(ProgramCounter::address)
    }

    /// The instruction memory, if the datapath has one.
    pub fn instruction_memory(&self) -> Option<&InstructionMemory> {
        match &self.component(self.roles.instruction_memory?)?.unit {
            Unit::InstructionMemory(memory) => Some(memory),
            _ => None,
        }
    }

    /// The data memory, if the datapath has one.
    pub fn data_memory(&self) -> Option<&DataMemory> {
        match &self.component(self.roles.data_memory?)?.unit {
            Unit::DataMemory(memory) => Some(memory),
            _ => None,
        }
    }

    /// Returns `true` if the datapath is pipelined (has stage latches).
    pub fn is_pipelined(&self) -> bool {
        !self.tracker.latches().is_empty()
    }

    /// Returns `true` once the program has drained from every stage.
    ///
    /// Datapaths without a program counter and an instruction memory never finish.
    pub fn is_finished(&self) -> bool {
        self.roles.program_counter.is_some()
            && self.roles.instruction_memory.is_some()
            && self.tracker.is_empty()
    }

    /// Address of the instruction the program counter points at, if it is inside
    /// the loaded program.
    pub(crate) fn fetch_address(&self) -> Option<u32> {
        let address = self.pc()?;
        self.instruction_memory()?.fetch(address).map(|_| address)
    }

    pub(crate) fn snapshot(&self) -> Snapshot {
        Snapshot {
            components: self.components.clone(),
            counters: self.counters,
            tracker: self.tracker.clone(),
        }
    }

    pub(crate) fn restore(&mut self, snapshot: Snapshot) {
        self.components = snapshot.components;
        self.counters = snapshot.counters;
        self.tracker = snapshot.tracker;
    }
}
