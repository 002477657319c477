//! Construction and Host-Edit Errors.
//!
//! The engine has two error surfaces:
//! 1. **Build errors:** Raised while a loader assembles the component graph. A CPU is
//!    never produced from an invalid graph.
//! 2. **Edit errors:** Raised when the host asks for a runtime mutation the datapath
//!    cannot accept (for example writing a constant register). A rejected edit leaves
//!    the engine untouched.
//!
//! Once built, stepping never fails.

use thiserror::Error;

/// Errors raised while building or validating a component graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// A component or port identifier was empty.
    #[error("empty identifier in component `{component}`")]
    EmptyIdentifier {
        /// Component the identifier belongs to (empty for the component itself).
        component: String,
    },

    /// Two components share an identifier.
    #[error("duplicate component `{0}`")]
    DuplicateComponent(String),

    /// Two ports of the same direction share an identifier.
    #[error("duplicate port `{port}` in component `{component}`")]
    DuplicatePort {
        /// Owning component.
        component: String,
        /// Repeated port identifier.
        port: String,
    },

    /// A referenced component does not exist.
    #[error("unknown component `{0}`")]
    UnknownComponent(String),

    /// A referenced port does not exist on the component.
    #[error("unknown port `{port}` in component `{component}`")]
    UnknownPort {
        /// Owning component.
        component: String,
        /// Missing port identifier.
        port: String,
    },

    /// A port was declared with a width outside `1..=32`.
    #[error("invalid width {size} for port `{port}` of `{component}`")]
    InvalidWidth {
        /// Owning component.
        component: String,
        /// Offending port.
        port: String,
        /// Requested width.
        size: u8,
    },

    /// A wire joins ports of different widths.
    #[error("width mismatch on wire {from} -> {to}: output is {expected} bits, input is {found} bits")]
    WidthMismatch {
        /// Driving output, as `component.port`.
        from: String,
        /// Driven input, as `component.port`.
        to: String,
        /// Output width.
        expected: u8,
        /// Input width.
        found: u8,
    },

    /// An input already has a driver.
    #[error("input `{port}` of `{component}` is already connected")]
    InputAlreadyConnected {
        /// Owning component.
        component: String,
        /// Input that is driven twice.
        port: String,
    },

    /// A required input was left without a driver.
    #[error("required input `{port}` of `{component}` is not connected")]
    UnconnectedInput {
        /// Owning component.
        component: String,
        /// Dangling input.
        port: String,
    },

    /// A component parameter is out of range or inconsistent.
    #[error("invalid parameter for `{component}`: {detail}")]
    InvalidParameter {
        /// Component being built.
        component: String,
        /// Description of the problem.
        detail: String,
    },

    /// A control table is malformed.
    #[error("invalid control table for `{unit}`: {detail}")]
    InvalidControlTable {
        /// Control unit identifier.
        unit: String,
        /// Description of the problem.
        detail: String,
    },

    /// An opcode has no row and the table declares no default.
    #[error("control table for `{unit}` has no entry for opcode {opcode:#x} and no default")]
    IncompleteControlTable {
        /// Control unit identifier.
        unit: String,
        /// First unmapped opcode.
        opcode: u32,
    },

    /// The component exists but is not of the expected kind.
    #[error("component `{component}` is not a {expected}")]
    WrongComponentKind {
        /// Component identifier.
        component: String,
        /// Expected kind name.
        expected: &'static str,
    },

    /// A unit that must be unique in a CPU was added twice.
    #[error("a CPU can only have one {kind}; `{component}` is the second")]
    DuplicateUnit {
        /// Kind name.
        kind: &'static str,
        /// Second instance.
        component: String,
    },

    /// The pipeline stage latch list is malformed.
    #[error("invalid pipeline stage list: {0}")]
    InvalidPipeline(String),

    /// The combinational subgraph contains a cycle not broken by a clocked input.
    #[error("combinational loop through `{component}`")]
    CombinationalLoop {
        /// A component on the loop.
        component: String,
    },
}

/// Rejections of runtime mutations requested by the host.
///
/// The variant is the reason code; engine state is unchanged whenever one is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    /// The register holds a fixed value.
    #[error("register {0} is constant")]
    ConstantRegister(u32),

    /// The register index is outside the register bank.
    #[error("register {index} is out of range (bank has {count} registers)")]
    RegisterOutOfRange {
        /// Requested index.
        index: u32,
        /// Number of registers in the bank.
        count: u32,
    },

    /// The address is not aligned to the word size.
    #[error("address {0:#x} is not word aligned")]
    UnalignedAddress(u32),

    /// The address is beyond the end of the memory.
    #[error("address {0:#x} is out of range")]
    AddressOutOfRange(u32),

    /// A latency below zero was requested.
    #[error("latency {0} is negative")]
    NegativeLatency(i64),

    /// The latency does not fit the engine's latency type.
    #[error("latency {0} is too large")]
    LatencyTooLarge(i64),

    /// The named component does not exist.
    #[error("unknown component `{0}`")]
    UnknownComponent(String),

    /// The CPU has no unit of the kind the edit needs.
    #[error("the CPU has no {0}")]
    MissingUnit(&'static str),

    /// There is no earlier cycle to return to.
    #[error("no earlier cycle to restore")]
    NothingToUndo,
}
