//! Instruction and data memories.
//!
//! Both memories are word arrays addressed by byte address. The low two address
//! bits are ignored on access; host edits must be word aligned.
//! 1. **Instruction memory:** Read-only during simulation, loaded by the host. Reads
//!    past the end of the program return 0 and are marked irrelevant.
//! 2. **Data memory:** Combinational read gated by `mem_read`, write at the clock
//!    edge gated by `mem_write`. Out-of-range reads return 0; out-of-range writes
//!    are dropped.

use serde::{Deserialize, Serialize};

use crate::common::constants::{DATA_SIZE, WORD_BYTES};
use crate::common::{BuildError, EditError};
use crate::core::port::{PortBuilder, PortIo};
use crate::core::units::{Combinational, Synchronous};

/// Parameters of an instruction memory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstructionMemorySpec {
    /// Instruction words loaded at address 0.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub program: Vec<u32>,
}

/// Program storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionMemory {
    program: Vec<u32>,
    address: usize,
    instruction: usize,
}

impl InstructionMemory {
    pub(crate) fn attach(
        spec: &InstructionMemorySpec,
        ports: &mut PortBuilder<'_>,
    ) -> Result<Self, BuildError> {
        Ok(Self {
            program: spec.program.clone(),
            address: ports.input("address", DATA_SIZE)?,
            instruction: ports.output("instruction", DATA_SIZE)?,
        })
    }

    pub(crate) fn spec(&self) -> InstructionMemorySpec {
        InstructionMemorySpec {
            program: self.program.clone(),
        }
    }

    /// Loaded program.
    pub fn program(&self) -> &[u32] {
        &self.program
    }

    /// Instruction at a byte address, if inside the program.
    pub fn fetch(&self, address: u32) -> Option<u32> {
        self.program.get((address / WORD_BYTES) as usize).copied()
    }

    pub(crate) fn load(&mut self, program: Vec<u32>) {
        self.program = program;
    }
}

impl Combinational for InstructionMemory {
    fn execute(&self, io: &mut PortIo<'_>) {
        let fetched = self.fetch(io.value(self.address));
        io.set(self.instruction, fetched.unwrap_or(0));
        io.set_relevant(self.instruction, fetched.is_some());
    }
}

/// Parameters of a data memory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataMemorySpec {
    /// Capacity in words.
    #[serde(default = "DataMemorySpec::default_words")]
    pub words: u32,
    /// Initial contents from address 0; missing words are 0.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contents: Vec<u32>,
}

impl DataMemorySpec {
    const fn default_words() -> u32 {
        256
    }
}

impl Default for DataMemorySpec {
    fn default() -> Self {
        Self {
            words: Self::default_words(),
            contents: Vec::new(),
        }
    }
}

/// Word-addressed read/write memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataMemory {
    words: Vec<u32>,
    address: usize,
    write_data: usize,
    mem_read: usize,
    mem_write: usize,
    read_data: usize,
}

impl DataMemory {
    pub(crate) fn attach(
        spec: &DataMemorySpec,
        ports: &mut PortBuilder<'_>,
    ) -> Result<Self, BuildError> {
        if spec.words == 0 {
            return Err(ports.invalid("data memory needs at least one word"));
        }
        if spec.contents.len() > spec.words as usize {
            return Err(ports.invalid(format!(
                "{} initial words do not fit a {}-word memory",
                spec.contents.len(),
                spec.words
            )));
        }
        let mut words = spec.contents.clone();
        words.resize(spec.words as usize, 0);
        Ok(Self {
            words,
            address: ports.input("address", DATA_SIZE)?,
            write_data: ports.optional_input("write_data", DATA_SIZE, 0, true)?,
            mem_read: ports.optional_input("mem_read", 1, 0, false)?,
            mem_write: ports.optional_input("mem_write", 1, 0, true)?,
            read_data: ports.output("read_data", DATA_SIZE)?,
        })
    }

    pub(crate) fn spec(&self) -> DataMemorySpec {
        let used = self.words.iter().rposition(|w| *w != 0).map_or(0, |i| i + 1);
        DataMemorySpec {
            words: self.words.len() as u32,
            contents: self.words[..used].to_vec(),
        }
    }

    /// Memory contents.
    pub fn words(&self) -> &[u32] {
        &self.words
    }

    /// Word at a byte address, if in range.
    pub fn word(&self, address: u32) -> Option<u32> {
        self.words.get((address / WORD_BYTES) as usize).copied()
    }

    pub(crate) fn set_word(&mut self, address: u32, value: u32) -> Result<(), EditError> {
        if address % WORD_BYTES != 0 {
            return Err(EditError::UnalignedAddress(address));
        }
        let slot = self
            .words
            .get_mut((address / WORD_BYTES) as usize)
            .ok_or(EditError::AddressOutOfRange(address))?;
        *slot = value;
        Ok(())
    }
}

impl Combinational for DataMemory {
    fn execute(&self, io: &mut PortIo<'_>) {
        let reading = io.input(self.mem_read).is_set();
        let value = if reading {
            self.word(io.value(self.address)).unwrap_or(0)
        } else {
            0
        };
        io.set(self.read_data, value);
        io.set_relevant(self.read_data, reading);
        let address_relevant = reading && io.is_input_relevant(self.address);
        io.set_input_relevant(self.address, address_relevant);
    }
}

impl Synchronous for DataMemory {
    fn commit(&mut self, io: &PortIo<'_>) {
        if !io.input(self.mem_write).is_set() {
            return;
        }
        let index = (io.value(self.address) / WORD_BYTES) as usize;
        if let Some(word) = self.words.get_mut(index) {
            *word = io.value(self.write_data);
        }
    }
}
