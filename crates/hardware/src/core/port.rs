//! Component Ports.
//!
//! Ports are the named, sized terminals through which components exchange signals.
//! This module provides:
//! 1. **Inputs and Outputs:** Current value, relevance, connection state, and latency.
//! 2. **Port declaration:** [`PortBuilder`], used by units while they are attached.
//! 3. **Evaluation access:** [`PortIo`], the view a unit gets of its own ports.

use crate::common::{BuildError, Data};
use crate::core::component::ComponentId;
use crate::core::wire::WireId;

/// Handle to one port of one component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PortRef {
    /// Owning component.
    pub component: ComponentId,
    /// Index of the port within its direction.
    pub port: usize,
}

/// A component input.
///
/// An input is driven by at most one output. Unconnected inputs keep their
/// construction-time default value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Input {
    id: String,
    data: Data,
    wire: Option<WireId>,
    source: Option<PortRef>,
    relevant: bool,
    required: bool,
    clocked: bool,
    accumulated_latency: u32,
}

impl Input {
    fn new(id: &str, default: Data, required: bool, clocked: bool) -> Self {
        Self {
            id: id.to_string(),
            data: default,
            wire: None,
            source: None,
            relevant: false,
            required,
            clocked,
            accumulated_latency: 0,
        }
    }

    /// Port identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Current signal.
    pub const fn data(&self) -> Data {
        self.data
    }

    /// Width in bits.
    pub const fn size(&self) -> u8 {
        self.data.size()
    }

    /// Current unsigned value.
    pub const fn value(&self) -> u32 {
        self.data.value()
    }

    /// Returns `true` if a wire drives this input.
    pub const fn is_connected(&self) -> bool {
        self.wire.is_some()
    }

    /// The wire driving this input.
    pub const fn wire(&self) -> Option<WireId> {
        self.wire
    }

    /// The output driving this input.
    pub const fn source(&self) -> Option<PortRef> {
        self.source
    }

    /// Whether the value on this input matters for the current instruction.
    pub const fn is_relevant(&self) -> bool {
        self.relevant
    }

    /// Whether the input must be connected for the graph to be valid.
    pub const fn is_required(&self) -> bool {
        self.required
    }

    /// Whether the input is only sampled at the clock edge.
    ///
    /// Clocked inputs do not feed their component's outputs combinationally, so
    /// they are not evaluation-order dependencies.
    pub const fn is_clocked(&self) -> bool {
        self.clocked
    }

    /// Time since the last clock edge at which this input settles.
    pub const fn accumulated_latency(&self) -> u32 {
        self.accumulated_latency
    }

    pub(crate) fn connect(&mut self, wire: WireId, source: PortRef) {
        self.wire = Some(wire);
        self.source = Some(source);
    }

    pub(crate) fn drive(&mut self, data: Data, relevant: bool, latency: u32) {
        self.data.set_value(data.value());
        self.relevant = relevant;
        self.accumulated_latency = latency;
    }
}

/// A component output.
///
/// An output drives any number of inputs through a single wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Output {
    id: String,
    data: Data,
    wire: Option<WireId>,
    relevant: bool,
    accumulated_latency: u32,
}

impl Output {
    fn new(id: &str, size: u8) -> Self {
        Self {
            id: id.to_string(),
            data: Data::new(size),
            wire: None,
            relevant: true,
            accumulated_latency: 0,
        }
    }

    /// Port identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Current signal.
    pub const fn data(&self) -> Data {
        self.data
    }

    /// Width in bits.
    pub const fn size(&self) -> u8 {
        self.data.size()
    }

    /// Current unsigned value.
    pub const fn value(&self) -> u32 {
        self.data.value()
    }

    /// Returns `true` if a wire leaves this output.
    pub const fn is_connected(&self) -> bool {
        self.wire.is_some()
    }

    /// The wire leaving this output.
    pub const fn wire(&self) -> Option<WireId> {
        self.wire
    }

    /// Whether the value on this output matters for the current instruction.
    pub const fn is_relevant(&self) -> bool {
        self.relevant
    }

    /// Time since the last clock edge at which this output settles.
    pub const fn accumulated_latency(&self) -> u32 {
        self.accumulated_latency
    }

    pub(crate) fn set_wire(&mut self, wire: WireId) {
        self.wire = Some(wire);
    }

    pub(crate) fn set_accumulated_latency(&mut self, latency: u32) {
        self.accumulated_latency = latency;
    }
}

/// Declares the ports of a component while its unit is being attached.
///
/// Identifiers must be non-empty and unique per direction; widths must be 1 to 32 bits.
#[derive(Debug)]
pub struct PortBuilder<'a> {
    component: &'a str,
    inputs: &'a mut Vec<Input>,
    outputs: &'a mut Vec<Output>,
}

impl<'a> PortBuilder<'a> {
    pub(crate) fn new(
        component: &'a str,
        inputs: &'a mut Vec<Input>,
        outputs: &'a mut Vec<Output>,
    ) -> Self {
        Self {
            component,
            inputs,
            outputs,
        }
    }

    /// Identifier of the component being built.
    pub const fn component(&self) -> &str {
        self.component
    }

    /// Declares a required combinational input.
    pub fn input(&mut self, id: &str, size: u8) -> Result<usize, BuildError> {
        self.check(id, size)?;
        self.push_input(id, Data::new(size), true, false)
    }

    /// Declares a required input sampled only at the clock edge.
    pub fn clocked_input(&mut self, id: &str, size: u8) -> Result<usize, BuildError> {
        self.check(id, size)?;
        self.push_input(id, Data::new(size), true, true)
    }

    /// Declares an input that may stay unconnected, holding `default` until driven.
    pub fn optional_input(
        &mut self,
        id: &str,
        size: u8,
        default: u32,
        clocked: bool,
    ) -> Result<usize, BuildError> {
        self.check(id, size)?;
        self.push_input(id, Data::with_value(size, default), false, clocked)
    }

    /// Declares an output.
    pub fn output(&mut self, id: &str, size: u8) -> Result<usize, BuildError> {
        self.check(id, size)?;
        if self.outputs.iter().any(|o| o.id == id) {
            return Err(self.duplicate(id));
        }
        self.outputs.push(Output::new(id, size));
        Ok(self.outputs.len() - 1)
    }

    /// Builds a parameter error for the component being attached.
    pub fn invalid(&self, detail: impl Into<String>) -> BuildError {
        BuildError::InvalidParameter {
            component: self.component.to_string(),
            detail: detail.into(),
        }
    }

    fn push_input(
        &mut self,
        id: &str,
        data: Data,
        required: bool,
        clocked: bool,
    ) -> Result<usize, BuildError> {
        if self.inputs.iter().any(|i| i.id == id) {
            return Err(self.duplicate(id));
        }
        self.inputs.push(Input::new(id, data, required, clocked));
        Ok(self.inputs.len() - 1)
    }

    fn check(&self, id: &str, size: u8) -> Result<(), BuildError> {
        if id.is_empty() {
            return Err(BuildError::EmptyIdentifier {
                component: self.component.to_string(),
            });
        }
        if !Data::is_valid_size(size) {
            return Err(BuildError::InvalidWidth {
                component: self.component.to_string(),
                port: id.to_string(),
                size,
            });
        }
        Ok(())
    }

    fn duplicate(&self, id: &str) -> BuildError {
        BuildError::DuplicatePort {
            component: self.component.to_string(),
            port: id.to_string(),
        }
    }
}

/// A unit's view of its own ports during evaluation and commit.
#[derive(Debug)]
pub struct PortIo<'a> {
    inputs: &'a mut [Input],
    outputs: &'a mut [Output],
}

impl<'a> PortIo<'a> {
    pub(crate) fn new(inputs: &'a mut [Input], outputs: &'a mut [Output]) -> Self {
        Self { inputs, outputs }
    }

    /// Signal on input `index`.
    #[inline]
    pub fn input(&self, index: usize) -> Data {
        self.inputs[index].data
    }

    /// Unsigned value on input `index`.
    #[inline]
    pub fn value(&self, index: usize) -> u32 {
        self.inputs[index].data.value()
    }

    /// Relevance of input `index`.
    #[inline]
    pub fn is_input_relevant(&self, index: usize) -> bool {
        self.inputs[index].relevant
    }

    /// Marks input `index` as (ir)relevant for the current instruction.
    #[inline]
    pub fn set_input_relevant(&mut self, index: usize, relevant: bool) {
        self.inputs[index].relevant = relevant;
    }

    /// Signal currently on output `index`.
    #[inline]
    pub fn output(&self, index: usize) -> Data {
        self.outputs[index].data
    }

    /// Drives output `index`; the value is truncated to the port width.
    #[inline]
    pub fn set(&mut self, index: usize, value: u32) {
        self.outputs[index].data.set_value(value);
    }

    /// Marks output `index` as (ir)relevant for the current instruction.
    #[inline]
    pub fn set_relevant(&mut self, index: usize, relevant: bool) {
        self.outputs[index].relevant = relevant;
    }
}
