//! Circuit descriptions.
//!
//! A [`CircuitDescription`] is the serializable form of a datapath: the ordered
//! component and wire requests a loader hands to [`CpuBuilder`], the control table,
//! and the pipeline stage latches. It provides:
//! 1. **Loading:** JSON parsing and building into a [`Cpu`].
//! 2. **Export:** [`Cpu::description`], which reproduces a description that rebuilds
//!    an identical CPU.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::common::BuildError;
use crate::config::Config;
use crate::core::component::ComponentId;
use crate::core::cpu::{Cpu, CpuBuilder};
use crate::core::pipeline::signals::ControlTable;
use crate::core::units::{LinkSpec, Unit, UnitSpec};

/// A port of a named component.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Endpoint {
    /// Component identifier.
    pub component: String,
    /// Port identifier.
    pub port: String,
}

impl Endpoint {
    /// Creates an endpoint.
    pub fn new(component: impl Into<String>, port: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            port: port.into(),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.component, self.port)
    }
}

/// A component construction request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentDescription {
    /// Unique identifier.
    pub id: String,
    /// Base latency in picoseconds.
    #[serde(default)]
    pub latency: u32,
    /// Control-path classification.
    #[serde(default)]
    pub control_path: bool,
    /// Kind and parameters.
    #[serde(flatten)]
    pub unit: UnitSpec,
}

impl ComponentDescription {
    /// Creates a data-path component with zero latency.
    pub fn new(id: impl Into<String>, unit: UnitSpec) -> Self {
        Self {
            id: id.into(),
            latency: 0,
            control_path: false,
            unit,
        }
    }

    /// Sets the base latency.
    #[must_use]
    pub const fn with_latency(mut self, latency: u32) -> Self {
        self.latency = latency;
        self
    }

    /// Marks the component as part of the control path.
    #[must_use]
    pub const fn in_control_path(mut self) -> Self {
        self.control_path = true;
        self
    }
}

/// A wire request from one output to one or more inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireDescription {
    /// Driving output.
    pub from: Endpoint,
    /// Driven inputs.
    pub to: Vec<Endpoint>,
}

/// The control table and the unit it is installed in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlDescription {
    /// Identifier of the control unit.
    pub unit: String,
    /// Width of the opcode field.
    pub opcode_size: u8,
    /// Opcode to control-vector table.
    pub table: ControlTable,
}

/// A complete datapath.
///
/// # Examples
///
/// ```
/// use mipsflow_core::config::Config;
/// use mipsflow_core::sim::description::CircuitDescription;
///
/// let json = r#"{
///     "components": [
///         { "id": "four", "type": "constant", "size": 32, "value": 4 },
///         { "id": "pc", "type": "program_counter" },
///         { "id": "add", "type": "adder", "latency": 100 }
///     ],
///     "wires": [
///         { "from": { "component": "pc", "port": "address" },
///           "to": [ { "component": "add", "port": "in1" } ] },
///         { "from": { "component": "four", "port": "output" },
///           "to": [ { "component": "add", "port": "in2" } ] },
///         { "from": { "component": "add", "port": "output" },
///           "to": [ { "component": "pc", "port": "new" } ] }
///     ]
/// }"#;
/// let mut cpu = CircuitDescription::from_json(json)?.build(Config::default())?;
/// cpu.step();
/// assert_eq!(cpu.pc(), Some(4));
/// assert_eq!(cpu.clock_period(), 100);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitDescription {
    /// Components, in construction order.
    pub components: Vec<ComponentDescription>,
    /// Control table, installed after the components and before the wires.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control: Option<ControlDescription>,
    /// Wires, in connection order.
    #[serde(default)]
    pub wires: Vec<WireDescription>,
    /// Stage latches in pipeline order; empty for single-cycle datapaths.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pipeline: Vec<String>,
}

impl CircuitDescription {
    /// Parses a description from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serializes the description as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Validates the description and builds a CPU.
    pub fn build(&self, config: Config) -> Result<Cpu, BuildError> {
        let mut builder = CpuBuilder::new();
        for component in &self.components {
            let _ = builder.add_component(component)?;
        }
        if let Some(control) = &self.control {
            builder.set_control(&control.unit, control.opcode_size, &control.table)?;
        }
        for wire in &self.wires {
            let _ = builder.connect(&wire.from, &wire.to)?;
        }
        if !self.pipeline.is_empty() {
            builder.set_pipeline_stages(&self.pipeline)?;
        }
        builder.build(config)
    }
}

impl Cpu {
    /// Describes the CPU as constructed, with the current latencies and program.
    ///
    /// Building the returned description yields a CPU in the same initial state.
    pub fn description(&self) -> CircuitDescription {
        let components = &self.initial.components;
        let name = |id: ComponentId| components[id.index()].id.clone();

        let described = components
            .iter()
            .enumerate()
            .map(|(i, component)| {
                let register_bank = self
                    .links
                    .iter()
                    .find(|l| l.unit.index() == i)
                    .map(|l| name(l.register_bank));
                let unit = match component.unit.spec() {
                    UnitSpec::ForwardingUnit(_) => {
                        UnitSpec::ForwardingUnit(LinkSpec { register_bank })
                    }
                    UnitSpec::HazardDetectionUnit(_) => {
                        UnitSpec::HazardDetectionUnit(LinkSpec { register_bank })
                    }
                    other => other,
                };
                ComponentDescription {
                    id: component.id.clone(),
                    latency: component.latency,
                    control_path: component.control_path,
                    unit,
                }
            })
            .collect();

        let control = self.roles.control_unit.and_then(|id| match &components[id.index()].unit {
            Unit::ControlUnit(unit) => unit.table().map(|table| ControlDescription {
                unit: name(id),
                opcode_size: unit.opcode_size(),
                table: table.clone(),
            }),
            _ => None,
        });

        let wires = self
            .wires
            .iter()
            .map(|wire| {
                let endpoint = |component: ComponentId, port: String| {
                    Endpoint::new(name(component), port)
                };
                let source = &components[wire.source.component.index()];
                WireDescription {
                    from: endpoint(
                        wire.source.component,
                        source.outputs[wire.source.port].id().to_string(),
                    ),
                    to: wire
                        .targets
                        .iter()
                        .map(|t| {
                            let target = &components[t.component.index()];
                            endpoint(t.component, target.inputs[t.port].id().to_string())
                        })
                        .collect(),
                }
            })
            .collect();

        CircuitDescription {
            components: described,
            control,
            wires,
            pipeline: self.tracker.latches().iter().map(|id| name(*id)).collect(),
        }
    }
}
