//! MIPS datapath simulator CLI.
//!
//! This binary drives the simulation engine from the command line. It performs:
//! 1. **Run:** Build a preset or a JSON circuit, load a hex program, run it to
//!    completion, and print registers, memory, and performance.
//! 2. **Info:** List the components of a datapath with their latencies and the
//!    critical path.
//! 3. **Export:** Print a datapath as a JSON circuit description.

use clap::{Parser, Subcommand, ValueEnum};
use std::{fs, process};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use mipsflow_core::common::{Data, DataFormat};
use mipsflow_core::config::{Config, PerformanceMode};
use mipsflow_core::core::cpu::StopReason;
use mipsflow_core::sim::{loader, presets};
use mipsflow_core::stats::REPORT_SECTIONS;
use mipsflow_core::{CircuitDescription, Cpu};

#[derive(Parser, Debug)]
#[command(
    name = "mipsflow",
    author,
    version,
    about = "Functional-block MIPS datapath simulator",
    long_about = "Simulate single-cycle and pipelined MIPS datapaths built from functional blocks.\n\nExamples:\n  mipsflow run --preset pipeline --program demo.hex\n  mipsflow info --circuit my_datapath.json\n  mipsflow export --preset single-cycle > single.json\n\nSet RUST_LOG=mipsflow_core=debug to trace every cycle."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Where the datapath comes from.
#[derive(clap::Args, Debug)]
struct Source {
    /// Built-in datapath (`single-cycle` or `pipeline`).
    #[arg(short, long, default_value = "single-cycle", conflicts_with = "circuit")]
    preset: String,

    /// JSON circuit description to build instead of a preset.
    #[arg(short, long)]
    circuit: Option<String>,

    /// JSON engine configuration.
    #[arg(long)]
    config: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a program on a datapath until it drains or hits a limit.
    Run {
        #[command(flatten)]
        source: Source,

        /// Program file: one hexadecimal instruction word per line.
        #[arg(short = 'f', long)]
        program: String,

        /// Cycle limit (overrides the configuration).
        #[arg(long)]
        max_cycles: Option<u64>,

        /// Stop when this instruction address is fetched (repeatable).
        #[arg(short, long, value_parser = parse_address)]
        breakpoint: Vec<u32>,

        /// Register number format.
        #[arg(long, value_enum, default_value_t = Format::Dec)]
        format: Format,

        /// Number of data memory words to print.
        #[arg(long, default_value_t = 0)]
        memory_words: usize,

        /// Report sections to print (summary, timing, hazards); all when omitted.
        #[arg(long, value_delimiter = ',')]
        sections: Vec<String>,
    },

    /// Describe the components and timing of a datapath.
    Info {
        #[command(flatten)]
        source: Source,

        /// Show worst-case port latencies instead of the first instruction's.
        #[arg(long)]
        critical_path: bool,
    },

    /// Print a datapath as a JSON circuit description.
    Export {
        #[command(flatten)]
        source: Source,
    },
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Format {
    Bin,
    Dec,
    Hex,
}

impl From<Format> for DataFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Bin => Self::Binary,
            Format::Dec => Self::Decimal,
            Format::Hex => Self::Hexadecimal,
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            source,
            program,
            max_cycles,
            breakpoint,
            format,
            memory_words,
            sections,
        } => cmd_run(
            &source,
            &program,
            max_cycles,
            &breakpoint,
            format.into(),
            memory_words,
            &sections,
        ),
        Commands::Info {
            source,
            critical_path,
        } => cmd_info(&source, critical_path),
        Commands::Export { source } => cmd_export(&source),
    }
}

fn cmd_run(
    source: &Source,
    program: &str,
    max_cycles: Option<u64>,
    breakpoints: &[u32],
    format: DataFormat,
    memory_words: usize,
    sections: &[String],
) {
    if let Some(unknown) = sections
        .iter()
        .find(|s| !REPORT_SECTIONS.contains(&s.as_str()))
    {
        fail(&format!(
            "unknown report section `{unknown}` (expected one of {})",
            REPORT_SECTIONS.join(", ")
        ));
    }

    let mut cpu = build_cpu(source);
    let words = loader::load_program_file(program).unwrap_or_else(|e| fail(&e.to_string()));
    let count = words.len();
    if let Err(e) = cpu.load_program(words) {
        fail(&e.to_string());
    }
    for &address in breakpoints {
        if !cpu.add_breakpoint(address) {
            warn!("duplicate breakpoint at {address:#010x}");
        }
    }

    println!("[*] Loaded {count} instructions from {program}");
    let limit = max_cycles.unwrap_or(cpu.config().general.max_cycles);
    let outcome = cpu.run_until(limit, |_| false);
    info!(
        cycles = outcome.cycles,
        reason = ?outcome.reason,
        revision = cpu.revision(),
        "run finished"
    );
    match outcome.reason {
        StopReason::Finished => println!("[*] Program finished after {} cycles", outcome.cycles),
        StopReason::Breakpoint(address) => {
            println!("[*] Breakpoint at {address:#010x} after {} cycles", outcome.cycles);
        }
        StopReason::CycleLimit => {
            println!("[!] Cycle limit of {limit} reached");
        }
        StopReason::Stopped => println!("[*] Stopped after {} cycles", outcome.cycles),
    }

    print_registers(&cpu, format);
    print_memory(&cpu, memory_words, format);
    println!();
    cpu.performance().print_sections(sections);

    if outcome.reason == StopReason::CycleLimit {
        process::exit(2);
    }
}

fn cmd_info(source: &Source, critical_path: bool) {
    let mut cpu = build_cpu(source);
    if critical_path {
        cpu.set_performance_mode(PerformanceMode::CriticalPath);
    }

    println!(
        "{} components, {} wires, {}",
        cpu.components().len(),
        cpu.wires().len(),
        if cpu.is_pipelined() {
            format!("{} pipeline latches", cpu.stages().latches().len())
        } else {
            "single cycle".to_string()
        }
    );
    println!();
    println!("{:<20} {:<24} {:>8} {:>8}", "component", "kind", "latency", "settles");
    for component in cpu.components() {
        let settles = component
            .outputs()
            .iter()
            .map(|o| o.accumulated_latency())
            .max()
            .unwrap_or(0);
        let kind = if component.is_control_path() {
            format!("{} (control)", component.kind_name())
        } else {
            component.kind_name().to_string()
        };
        println!(
            "{:<20} {:<24} {:>8} {:>8}",
            component.id(),
            kind,
            component.latency(),
            settles
        );
    }
    println!();
    cpu.performance().print_sections(&["timing".to_string()]);
}

fn cmd_export(source: &Source) {
    let cpu = build_cpu(source);
    match serde_json::to_string_pretty(&cpu.description()) {
        Ok(json) => println!("{json}"),
        Err(e) => fail(&e.to_string()),
    }
}

fn build_cpu(source: &Source) -> Cpu {
    let config = match &source.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .unwrap_or_else(|e| fail(&format!("could not read config `{path}`: {e}")));
            Config::from_json(&text).unwrap_or_else(|e| fail(&format!("config `{path}`: {e}")))
        }
        None => Config::default(),
    };

    let description = match &source.circuit {
        Some(path) => {
            let text = fs::read_to_string(path)
                .unwrap_or_else(|e| fail(&format!("could not read circuit `{path}`: {e}")));
            CircuitDescription::from_json(&text)
                .unwrap_or_else(|e| fail(&format!("circuit `{path}`: {e}")))
        }
        None => presets::by_name(&source.preset).unwrap_or_else(|| {
            fail(&format!(
                "unknown preset `{}` (expected one of {})",
                source.preset,
                presets::PRESETS.join(", ")
            ))
        }),
    };

    description
        .build(config)
        .unwrap_or_else(|e| fail(&format!("invalid datapath: {e}")))
}

fn print_registers(cpu: &Cpu, format: DataFormat) {
    let Some(bank) = cpu.register_bank() else {
        return;
    };
    println!();
    for (row, chunk) in bank.registers().chunks(4).enumerate() {
        let line: Vec<String> = chunk
            .iter()
            .enumerate()
            .map(|(col, &value)| {
                let index = row * 4 + col;
                let name = bank.name(index as u32);
                let shown = Data::with_value(32, value).format(format);
                format!("{index:>2}: {name:<5} = {shown:>12}")
            })
            .collect();
        println!("{}", line.join("  "));
    }
}

fn print_memory(cpu: &Cpu, words: usize, format: DataFormat) {
    let Some(memory) = cpu.data_memory() else {
        return;
    };
    if words == 0 {
        return;
    }
    println!();
    for (i, &value) in memory.words().iter().take(words).enumerate() {
        let shown = Data::with_value(32, value).format(format);
        println!("[{:#010x}] {shown}", i * 4);
    }
}

fn parse_address(text: &str) -> Result<u32, String> {
    let digits = text.strip_prefix("0x").unwrap_or(text);
    u32::from_str_radix(digits, 16).map_err(|e| format!("`{text}` is not a hex address: {e}"))
}

fn fail(message: &str) -> ! {
    eprintln!("Error: {message}");
    process::exit(1);
}
