//! Program Loader.
//!
//! This module reads machine-code programs for the instruction memory. It performs:
//! 1. **Parsing:** One 32-bit word per line in hexadecimal, with an optional `0x`
//!    prefix. Blank lines and text after `#` are ignored.
//! 2. **File loading:** Reading a program file from disk and reporting the offending
//!    line on malformed input.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors raised while loading a program.
#[derive(Debug, Error)]
pub enum ProgramError {
    /// The program file could not be read.
    #[error("could not read program `{path}`: {source}")]
    Io {
        /// File that failed to load.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A line is not a 32-bit hexadecimal word.
    #[error("line {line}: `{text}` is not a 32-bit hexadecimal word")]
    InvalidWord {
        /// One-based line number.
        line: usize,
        /// Offending text, comments stripped.
        text: String,
    },
}

/// Parses a program from its text form.
///
/// # Examples
///
/// ```
/// use mipsflow_core::sim::loader::parse_program;
///
/// let program = parse_program("# add $t2, $t0, $t1\n0x01095020\n\n8c080000 # lw\n")?;
/// assert_eq!(program, vec![0x0109_5020, 0x8c08_0000]);
/// # Ok::<(), mipsflow_core::sim::loader::ProgramError>(())
/// ```
pub fn parse_program(text: &str) -> Result<Vec<u32>, ProgramError> {
    let mut program = Vec::new();
    for (number, line) in text.lines().enumerate() {
        let word = line.split('#').next().unwrap_or_default().trim();
        if word.is_empty() {
            continue;
        }
        let digits = word
            .strip_prefix("0x")
            .or_else(|| word.strip_prefix("0X"))
            .unwrap_or(word)
            .replace('_', "");
        let value = u32::from_str_radix(&digits, 16).map_err(|_| ProgramError::InvalidWord {
            line: number + 1,
            text: word.to_string(),
        })?;
        program.push(value);
    }
    Ok(program)
}

/// Reads and parses a program file.
///
/// # Arguments
///
/// * `path` - Path to a text file with one hexadecimal instruction word per line.
///
/// # Returns
///
/// The instruction words in program order.
pub fn load_program_file(path: impl AsRef<Path>) -> Result<Vec<u32>, ProgramError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| ProgramError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_program(&text)
}
