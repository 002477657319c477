//! Graph Construction and Validation.
//!
//! [`CpuBuilder`] accepts the loader's requests one by one and rejects anything that
//! would produce an invalid graph. It performs:
//! 1. **Component creation:** Identifier checks, port declaration, singleton roles, and
//!    register bank links for forwarding and hazard detection units.
//! 2. **Control installation:** Validation of the opcode table and creation of the
//!    control unit's ports.
//! 3. **Wiring:** Width and single-driver checks.
//! 4. **Finalization:** Required-input checks, the combinational evaluation order, and
//!    the pipeline stage list.

use std::collections::{BTreeSet, HashMap, VecDeque};

use tracing::info;

use crate::common::BuildError;
use crate::config::Config;
use crate::core::component::{Component, ComponentId};
use crate::core::cpu::{Cpu, RegisterLink, Roles, Snapshot, Timing};
use crate::core::pipeline::signals::ControlTable;
use crate::core::pipeline::stages::StageTracker;
use crate::core::port::{PortBuilder, PortRef};
use crate::core::units::{LinkSpec, RegisterProfile, Unit, UnitSpec};
use crate::core::wire::{Wire, WireId};
use crate::sim::description::{ComponentDescription, Endpoint};
use crate::stats::PerformanceCounters;

/// Incremental builder for a [`Cpu`].
///
/// # Examples
///
/// ```
/// use mipsflow_core::config::Config;
/// use mipsflow_core::core::units::{AdderSpec, ConstantSpec, UnitSpec};
/// use mipsflow_core::core::CpuBuilder;
/// use mipsflow_core::sim::description::{ComponentDescription, Endpoint};
///
/// let mut builder = CpuBuilder::new();
/// builder.add_component(&ComponentDescription::new(
///     "one",
///     UnitSpec::Constant(ConstantSpec { size: 32, value: 1 }),
/// ))?;
/// builder.add_component(
///     &ComponentDescription::new("add", UnitSpec::Adder(AdderSpec::default())).with_latency(50),
/// )?;
/// builder.connect(
///     &Endpoint::new("one", "output"),
///     &[Endpoint::new("add", "in1"), Endpoint::new("add", "in2")],
/// )?;
/// let cpu = builder.build(Config::default())?;
/// assert_eq!(cpu.component_by_name("add").unwrap().outputs()[0].value(), 2);
/// # Ok::<(), mipsflow_core::common::BuildError>(())
/// ```
#[derive(Debug, Default)]
pub struct CpuBuilder {
    components: Vec<Component>,
    index: HashMap<String, ComponentId>,
    wires: Vec<Wire>,
    links: Vec<RegisterLink>,
    roles: Roles,
    pipeline: Option<Vec<ComponentId>>,
}

impl CpuBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a component and declares its ports.
    ///
    /// Forwarding and hazard detection units naming a register bank are linked to it;
    /// the bank must already exist.
    ///
    /// # Returns
    ///
    /// The handle of the new component.
    pub fn add_component(
        &mut self,
        description: &ComponentDescription,
    ) -> Result<ComponentId, BuildError> {
        let name = description.id.as_str();
        if name.is_empty() {
            return Err(BuildError::EmptyIdentifier {
                component: String::new(),
            });
        }
        if self.index.contains_key(name) {
            return Err(BuildError::DuplicateComponent(name.to_string()));
        }

        let link = match &description.unit {
            UnitSpec::ForwardingUnit(spec) | UnitSpec::HazardDetectionUnit(spec) => {
                self.resolve_link(spec)?
            }
            _ => None,
        };

        let id = ComponentId(self.components.len() as u32);
        let mut inputs = Vec::new();
        let mut outputs = Vec::new();
        let unit = {
            let mut ports = PortBuilder::new(name, &mut inputs, &mut outputs);
            Unit::attach(&description.unit, link.as_ref().map(|(_, p)| p.clone()), &mut ports)?
        };
        self.claim_role(&unit, id, name)?;
        if let Some((register_bank, _)) = link {
            self.links.push(RegisterLink {
                unit: id,
                register_bank,
            });
        }

        self.components.push(Component {
            id: name.to_string(),
            latency: description.latency,
            control_path: description.control_path,
            inputs,
            outputs,
            unit,
        });
        let _ = self.index.insert(name.to_string(), id);
        Ok(id)
    }

    /// Installs the control table in a control unit, creating its `opcode` input and
    /// one output per signal.
    pub fn set_control(
        &mut self,
        unit: &str,
        opcode_size: u8,
        table: &ControlTable,
    ) -> Result<(), BuildError> {
        let id = self.lookup(unit)?;
        let component = &mut self.components[id.index()];
        let Unit::ControlUnit(control) = &mut component.unit else {
            return Err(BuildError::WrongComponentKind {
                component: unit.to_string(),
                expected: "control_unit",
            });
        };
        let mut ports = PortBuilder::new(&component.id, &mut component.inputs, &mut component.outputs);
        control.set_control(table, opcode_size, &mut ports)
    }

    /// Connects an output to one or more inputs.
    ///
    /// All targets are checked before anything is connected. Connecting an output
    /// that already has a wire adds the targets to that wire.
    pub fn connect(&mut self, from: &Endpoint, to: &[Endpoint]) -> Result<WireId, BuildError> {
        let source = self.output_ref(from)?;
        let source_size = self.components[source.component.index()].outputs[source.port].size();

        let mut targets: Vec<PortRef> = Vec::with_capacity(to.len());
        for endpoint in to {
            let target = self.input_ref(endpoint)?;
            let input = &self.components[target.component.index()].inputs[target.port];
            if input.size() != source_size {
                return Err(BuildError::WidthMismatch {
                    from: from.to_string(),
                    to: endpoint.to_string(),
                    expected: source_size,
                    found: input.size(),
                });
            }
            if input.is_connected() || targets.contains(&target) {
                return Err(BuildError::InputAlreadyConnected {
                    component: endpoint.component.clone(),
                    port: endpoint.port.clone(),
                });
            }
            targets.push(target);
        }

        let wire_id = match self.components[source.component.index()].outputs[source.port].wire() {
            Some(existing) => {
                self.wires[existing.index()].targets.extend_from_slice(&targets);
                existing
            }
            None => {
                let wire_id = WireId(self.wires.len() as u32);
                self.wires.push(Wire {
                    source,
                    targets: targets.clone(),
                    control_path: self.components[source.component.index()].control_path,
                });
                self.components[source.component.index()].outputs[source.port].set_wire(wire_id);
                wire_id
            }
        };
        for target in targets {
            self.components[target.component.index()].inputs[target.port].connect(wire_id, source);
        }
        Ok(wire_id)
    }

    /// Declares the stage latches in pipeline order (IF/ID first).
    pub fn set_pipeline_stages(&mut self, latches: &[String]) -> Result<(), BuildError> {
        if self.pipeline.is_some() {
            return Err(BuildError::InvalidPipeline(
                "pipeline stages are already declared".to_string(),
            ));
        }
        let mut ids = Vec::with_capacity(latches.len());
        for name in latches {
            let id = self.lookup(name)?;
            if !matches!(self.components[id.index()].unit, Unit::PipelineRegister(_)) {
                return Err(BuildError::WrongComponentKind {
                    component: name.clone(),
                    expected: "pipeline_register",
                });
            }
            if ids.contains(&id) {
                return Err(BuildError::InvalidPipeline(format!(
                    "`{name}` is listed more than once"
                )));
            }
            ids.push(id);
        }
        self.pipeline = Some(ids);
        Ok(())
    }

    /// Validates the graph and creates the CPU.
    ///
    /// # Returns
    ///
    /// A CPU showing the evaluation of its first cycle.
    pub fn build(self, config: Config) -> Result<Cpu, BuildError> {
        for component in &self.components {
            if let Unit::ControlUnit(control) = &component.unit
                && control.table().is_none()
            {
                return Err(BuildError::InvalidControlTable {
                    unit: component.id.clone(),
                    detail: "no control table installed".to_string(),
                });
            }
            if let Some(input) = component
                .inputs
                .iter()
                .find(|i| i.is_required() && !i.is_connected())
            {
                return Err(BuildError::UnconnectedInput {
                    component: component.id.clone(),
                    port: input.id().to_string(),
                });
            }
        }

        let order = self.evaluation_order()?;
        let tracker = StageTracker::new(self.pipeline.unwrap_or_default());
        let initial = Snapshot {
            components: Vec::new(),
            counters: PerformanceCounters::default(),
            tracker: tracker.clone(),
        };
        let mut cpu = Cpu {
            components: self.components,
            wires: self.wires,
            index: self.index,
            order,
            links: self.links,
            roles: self.roles,
            tracker,
            counters: PerformanceCounters::default(),
            timing: Timing::default(),
            config,
            breakpoints: BTreeSet::new(),
            history: VecDeque::new(),
            initial,
            revision: 0,
        };
        cpu.initialize();
        info!(
            components = cpu.components().len(),
            wires = cpu.wires().len(),
            stages = cpu.stages().names().len(),
            clock_period = cpu.clock_period(),
            "datapath built"
        );
        Ok(cpu)
    }

    fn lookup(&self, name: &str) -> Result<ComponentId, BuildError> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| BuildError::UnknownComponent(name.to_string()))
    }

    fn output_ref(&self, endpoint: &Endpoint) -> Result<PortRef, BuildError> {
        let component = self.lookup(&endpoint.component)?;
        let port = self.components[component.index()]
            .output_index(&endpoint.port)
            .ok_or_else(|| unknown_port(endpoint))?;
        Ok(PortRef { component, port })
    }

    fn input_ref(&self, endpoint: &Endpoint) -> Result<PortRef, BuildError> {
        let component = self.lookup(&endpoint.component)?;
        let port = self.components[component.index()]
            .input_index(&endpoint.port)
            .ok_or_else(|| unknown_port(endpoint))?;
        Ok(PortRef { component, port })
    }

    fn resolve_link(
        &self,
        spec: &LinkSpec,
    ) -> Result<Option<(ComponentId, RegisterProfile)>, BuildError> {
        let Some(name) = &spec.register_bank else {
            return Ok(None);
        };
        let id = self.lookup(name)?;
        match &self.components[id.index()].unit {
            Unit::RegisterBank(bank) => Ok(Some((id, bank.profile()))),
            _ => Err(BuildError::WrongComponentKind {
                component: name.clone(),
                expected: "register_bank",
            }),
        }
    }

    fn claim_role(&mut self, unit: &Unit, id: ComponentId, name: &str) -> Result<(), BuildError> {
        let slot = match unit {
            Unit::ProgramCounter(_) => &mut self.roles.program_counter,
            Unit::InstructionMemory(_) => &mut self.roles.instruction_memory,
            Unit::RegisterBank(_) => &mut self.roles.register_bank,
            Unit::DataMemory(_) => &mut self.roles.data_memory,
            Unit::ControlUnit(_) => &mut self.roles.control_unit,
            Unit::ForwardingUnit(_) => {
                self.roles.forwarding_units.push(id);
                return Ok(());
            }
            Unit::HazardDetectionUnit(_) => {
                self.roles.hazard_units.push(id);
                return Ok(());
            }
            _ => return Ok(()),
        };
        if slot.is_some() {
            return Err(BuildError::DuplicateUnit {
                kind: unit.kind_name(),
                component: name.to_string(),
            });
        }
        *slot = Some(id);
        Ok(())
    }

    /// Orders components so every combinational input is driven before it is read.
    ///
    /// Kahn's algorithm over edges into non-clocked inputs. Among the ready
    /// components the earliest declared is scheduled first.
    fn evaluation_order(&self) -> Result<Vec<ComponentId>, BuildError> {
        let count = self.components.len();
        let mut in_degree = vec![0usize; count];
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); count];
        for (i, component) in self.components.iter().enumerate() {
            for input in component.inputs.iter().filter(|i| !i.is_clocked()) {
                if let Some(source) = input.source() {
                    in_degree[i] += 1;
                    dependents[source.component.index()].push(i);
                }
            }
        }

        let mut ready: BTreeSet<usize> = (0..count).filter(|&i| in_degree[i] == 0).collect();
        let mut order = Vec::with_capacity(count);
        while let Some(i) = ready.pop_first() {
            order.push(ComponentId(i as u32));
            for &dependent in &dependents[i] {
                in_degree[dependent] -= 1;
                if in_degree[dependent] == 0 {
                    let _ = ready.insert(dependent);
                }
            }
        }

        if order.len() < count {
            let stuck = in_degree.iter().position(|&d| d > 0).unwrap_or(0);
            return Err(BuildError::CombinationalLoop {
                component: self.components[stuck].id.clone(),
            });
        }
        Ok(order)
    }
}

fn unknown_port(endpoint: &Endpoint) -> BuildError {
    BuildError::UnknownPort {
        component: endpoint.component.clone(),
        port: endpoint.port.clone(),
    }
}
