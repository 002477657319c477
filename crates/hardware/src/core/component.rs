//! Graph nodes.
//!
//! A [`Component`] pairs a behavioral [`Unit`] with the ports the unit declared and
//! the bookkeeping the scheduler needs:
//! 1. **Identity:** A unique identifier and an integer handle.
//! 2. **Timing:** The base latency added to every signal passing through.
//! 3. **Classification:** Whether the component belongs to the control path.

use crate::config::PerformanceMode;
use crate::core::port::{Input, Output, PortIo};
use crate::core::units::Unit;

/// Handle to a component owned by the CPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(pub(crate) u32);

impl ComponentId {
    /// Position of the component in [`Cpu::components`](crate::core::Cpu::components).
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// A node of the datapath graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    pub(crate) id: String,
    pub(crate) latency: u32,
    pub(crate) control_path: bool,
    pub(crate) inputs: Vec<Input>,
    pub(crate) outputs: Vec<Output>,
    pub(crate) unit: Unit,
}

impl Component {
    /// Unique identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Base latency in picoseconds.
    pub const fn latency(&self) -> u32 {
        self.latency
    }

    /// Whether the component belongs to the control path.
    pub const fn is_control_path(&self) -> bool {
        self.control_path
    }

    /// Inputs in declaration order.
    pub fn inputs(&self) -> &[Input] {
        &self.inputs
    }

    /// Outputs in declaration order.
    pub fn outputs(&self) -> &[Output] {
        &self.outputs
    }

    /// Looks up an input by identifier.
    pub fn input(&self, id: &str) -> Option<&Input> {
        self.inputs.iter().find(|i| i.id() == id)
    }

    /// Looks up an output by identifier.
    pub fn output(&self, id: &str) -> Option<&Output> {
        self.outputs.iter().find(|o| o.id() == id)
    }

    pub(crate) fn input_index(&self, id: &str) -> Option<usize> {
        self.inputs.iter().position(|i| i.id() == id)
    }

    pub(crate) fn output_index(&self, id: &str) -> Option<usize> {
        self.outputs.iter().position(|o| o.id() == id)
    }

    /// The behavioral unit.
    pub const fn unit(&self) -> &Unit {
        &self.unit
    }

    /// Kind name, e.g. `"alu"`.
    pub const fn kind_name(&self) -> &'static str {
        self.unit.kind_name()
    }

    /// Name of the operation currently performed, for units that have one.
    pub fn operation_name(&self) -> Option<&'static str> {
        self.unit.operation(&self.inputs)
    }

    /// Runs the unit's combinational function and refreshes output latencies.
    ///
    /// Output latency is the base latency plus the latest-arriving combinational
    /// input. In instruction-dependent mode only relevant inputs count.
    pub(crate) fn evaluate(&mut self, mode: PerformanceMode) {
        let mut io = PortIo::new(&mut self.inputs, &mut self.outputs);
        self.unit.execute(&mut io);

        let arrival = self
            .inputs
            .iter()
            .filter(|i| i.is_connected() && !i.is_clocked())
            .filter(|i| mode == PerformanceMode::CriticalPath || i.is_relevant())
            .map(Input::accumulated_latency)
            .max()
            .unwrap_or(0);
        let latency = self.latency.saturating_add(arrival);
        for output in &mut self.outputs {
            output.set_accumulated_latency(latency);
        }
    }

    /// Commits clocked state from the inputs of the completed cycle.
    pub(crate) fn commit(&mut self) {
        if self.unit.is_synchronous() {
            let io = PortIo::new(&mut self.inputs, &mut self.outputs);
            self.unit.commit(&io);
        }
    }
}
