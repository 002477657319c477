//! Wires between component ports.

use crate::core::port::PortRef;

/// Handle to a wire owned by the CPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WireId(pub(crate) u32);

impl WireId {
    /// Position of the wire in [`Cpu::wires`](crate::core::Cpu::wires).
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// A directed connection from one output to one or more inputs.
///
/// Every target has the same width as the source. Wires are created while the
/// graph is built and never change afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wire {
    pub(crate) source: PortRef,
    pub(crate) targets: Vec<PortRef>,
    pub(crate) control_path: bool,
}

impl Wire {
    /// The driving output.
    pub const fn source(&self) -> PortRef {
        self.source
    }

    /// The driven inputs, in connection order.
    pub fn targets(&self) -> &[PortRef] {
        &self.targets
    }

    /// Whether the wire carries a control signal (inherited from its source component).
    pub const fn is_control_path(&self) -> bool {
        self.control_path
    }
}
