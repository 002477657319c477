//! Pipeline stage occupancy.
//!
//! The datapath itself only moves bits; it has no notion of which instruction a
//! latch currently carries. [`StageTracker`] follows instruction addresses through
//! the stages by watching what the program counter and each stage latch did at the
//! clock edge. It backs the executed-instruction counter and the host's pipeline view.

use crate::core::component::ComponentId;
use crate::core::pipeline::latches::LatchEffect;

/// Conventional names of the classic five stages.
const STAGE_NAMES: [&str; 5] = ["IF", "ID", "EX", "MEM", "WB"];

/// Tracks the instruction address held by each pipeline stage.
///
/// Stage 0 is fetch. Stage `i + 1` is fed by latch `i`. A `None` entry is a bubble.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageTracker {
    names: Vec<String>,
    latches: Vec<ComponentId>,
    occupancy: Vec<Option<u32>>,
}

impl StageTracker {
    pub(crate) fn new(latches: Vec<ComponentId>) -> Self {
        let count = latches.len() + 1;
        let names = (0..count)
            .map(|i| match STAGE_NAMES.get(i) {
                Some(name) if count <= STAGE_NAMES.len() => (*name).to_string(),
                _ => format!("S{i}"),
            })
            .collect();
        Self {
            names,
            latches,
            occupancy: vec![None; count],
        }
    }

    /// Stage names, fetch first.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Latches between consecutive stages.
    pub fn latches(&self) -> &[ComponentId] {
        &self.latches
    }

    /// Instruction address in each stage, fetch first.
    pub fn occupancy(&self) -> &[Option<u32>] {
        &self.occupancy
    }

    /// Instruction address in the named stage.
    pub fn stage(&self, name: &str) -> Option<u32> {
        self.names
            .iter()
            .position(|n| n == name)
            .and_then(|i| self.occupancy[i])
    }

    /// Instruction in the fetch stage.
    pub fn fetching(&self) -> Option<u32> {
        self.occupancy.first().copied().flatten()
    }

    /// Instruction completing in the final stage this cycle.
    pub fn retiring(&self) -> Option<u32> {
        self.occupancy.last().copied().flatten()
    }

    /// Returns `true` once every stage holds a bubble.
    pub fn is_empty(&self) -> bool {
        self.occupancy.iter().all(Option::is_none)
    }

    /// Clears the pipeline and places `fetched` in the fetch stage.
    pub(crate) fn restart(&mut self, fetched: Option<u32>) {
        self.occupancy.fill(None);
        self.occupancy[0] = fetched;
    }

    pub(crate) fn set_fetch(&mut self, fetched: Option<u32>) {
        self.occupancy[0] = fetched;
    }

    /// Moves instructions forward after a clock edge.
    ///
    /// # Arguments
    ///
    /// * `pc` - What the program counter did.
    /// * `fetched` - Instruction at the program counter's new address, if any.
    /// * `effects` - What each stage latch did, in stage order.
    pub(crate) fn advance(&mut self, pc: LatchEffect, fetched: Option<u32>, effects: &[LatchEffect]) {
        let old = self.occupancy.clone();
        if pc == LatchEffect::Written {
            self.occupancy[0] = fetched;
        }
        for (i, effect) in effects.iter().enumerate() {
            let feeder_held = if i == 0 {
                pc != LatchEffect::Written
            } else {
                effects[i - 1] == LatchEffect::Held
            };
            self.occupancy[i + 1] = match effect {
                LatchEffect::Flushed => None,
                LatchEffect::Held => old[i + 1],
                LatchEffect::Written if feeder_held => None,
                LatchEffect::Written => old[i],
            };
        }
    }
}
