//! von Neumann Emulator - CLI Entry Point
//!
//! Commands:
//! - `vonneumann-emu run <program>` - Run a card deck or ASM file
//! - `vonneumann-emu debug <program>` - Interactive debugger
//! - `vonneumann-emu asm <source>` - Assemble to a card deck
//! - `vonneumann-emu disasm <deck>` - Annotate a card deck

use clap::{Parser, Subcommand};
use std::io::{BufRead, Write as _};
use std::path::Path;
use tracing_subscriber::EnvFilter;
use vonneumann::cpu::MEMORY_SIZE;
use vonneumann::{assemble, load_deck, save_deck, Deck, Machine, RunOutcome, RunReport};

#[derive(Parser)]
#[command(name = "vonneumann-emu")]
#[command(author = "Yigit")]
#[command(version = "0.1.0")]
#[command(about = "An emulator of a decimal, single-accumulator stored-program computer")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a program until it halts
    Run {
        /// Path to the deck or ASM file to execute
        program: String,
        /// Extra input cards appended after the program
        #[arg(short, long)]
        input: Vec<String>,
        /// Maximum number of cycles to run (default: 10000)
        #[arg(short, long, default_value = "10000")]
        max_cycles: u64,
        /// Log every executed instruction
        #[arg(short, long)]
        trace: bool,
        /// Print the run report as JSON
        #[arg(long)]
        json: bool,
        /// Print memory as a 10x10 grid after the run
        #[arg(long)]
        dump: bool,
        /// Ask on stdin when the deck runs out of cards
        #[arg(long)]
        interactive: bool,
    },
    /// Interactive debugger
    Debug {
        /// Path to the deck or ASM file to debug
        program: String,
    },
    /// Assemble source to a card deck
    Asm {
        /// Path to the source file
        source: String,
        /// Output deck file
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Disassemble a card deck to readable text
    Disasm {
        /// Path to the deck file
        deck: String,
    },
}

fn main() {
    let cli = Cli::parse();

    let trace = matches!(cli.command, Some(Commands::Run { trace: true, .. }));
    init_logging(trace);

    match cli.command {
        Some(Commands::Run { program, input, max_cycles, json, dump, interactive, .. }) => {
            run_program(&program, &input, max_cycles, json, dump, interactive);
        }
        Some(Commands::Debug { program }) => {
            debug_program(&program);
        }
        Some(Commands::Asm { source, output }) => {
            assemble_file(&source, output);
        }
        Some(Commands::Disasm { deck }) => {
            disassemble_file(&deck);
        }
        None => {
            println!("von Neumann Emulator v0.1.0");
            println!("A decimal stored-program computer emulator");
            println!();
            println!("Use --help for available commands");
        }
    }
}

/// Logs go to stderr. `RUST_LOG` wins over `--trace`.
fn init_logging(trace: bool) {
    let default = if trace { "trace" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Load a program as a deck. ASM sources are assembled into a self-loading
/// deck; deck files are read as-is. `inputs` are appended either way.
fn load_program(path: &str, inputs: &[String]) -> Deck {
    if path.ends_with(".asm") {
        let source = match std::fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("❌ Failed to read file: {}", e);
                std::process::exit(1);
            }
        };

        match assemble(&source) {
            Ok(program) => program.to_deck(inputs.iter().cloned()),
            Err(e) => {
                eprintln!("❌ Assembly error: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        match load_deck(path) {
            Ok(mut deck) => {
                deck.extend(inputs.iter().cloned());
                deck
            }
            Err(e) => {
                eprintln!("❌ Failed to load deck: {}", e);
                std::process::exit(1);
            }
        }
    }
}

/// Prompt on stderr and read one line from stdin. EOF means no more input.
fn stdin_line() -> Option<String> {
    eprint!("INP: ");
    std::io::stderr().flush().ok()?;

    let mut line = String::new();
    match std::io::stdin().lock().read_line(&mut line) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(line),
    }
}

fn run_program(path: &str, inputs: &[String], max_cycles: u64, json: bool, dump: bool, interactive: bool) {
    let deck = load_program(path, inputs);
    if deck.is_empty() {
        eprintln!("❌ No cards to load");
        std::process::exit(1);
    }

    let mut machine = Machine::new();
    machine.load_deck(deck);
    if interactive {
        machine.set_line_provider(stdin_line);
    }

    match machine.run_limited(max_cycles) {
        Ok(RunOutcome::Halted(report)) => {
            print_report(&report, json);
        }
        Ok(RunOutcome::CycleLimit { cycles }) => {
            let report = RunReport {
                output: machine.io.take_output(),
                registers: machine.snapshot(),
                cycles,
            };
            print_report(&report, json);
            eprintln!();
            eprintln!("⚠️  Reached max cycles limit ({}). Use --max-cycles to increase.", max_cycles);
        }
        Err(e) => {
            for line in machine.io.output() {
                println!("{}", line);
            }
            eprintln!("{}", machine.snapshot());
            eprintln!("❌ CPU error at PC={:02}: {}", machine.regs.pc, e);
            if dump {
                print_dump(&machine);
            }
            std::process::exit(1);
        }
    }

    if dump {
        print_dump(&machine);
    }
}

fn print_report(report: &RunReport, json: bool) {
    if json {
        match serde_json::to_string_pretty(report) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("❌ Failed to encode report: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    if !report.output.is_empty() {
        println!("{}", report.output);
    }
    println!();
    println!("━━━ Result ━━━");
    println!("{}", report.registers);
    println!("Cycles: {}", report.cycles);
}

/// Memory as ten rows of ten; column `c` holds cells `c0..c9`.
fn print_dump(machine: &Machine) {
    println!();
    println!("━━━ Memory ━━━");
    print!("   ");
    for col in 0..10 {
        print!("{:>5}", format!("{}x", col));
    }
    println!();

    for row in 0..10 {
        print!("x{} ", row);
        for col in 0..10 {
            let addr = col * 10 + row;
            if addr >= MEMORY_SIZE {
                break;
            }
            let cell = machine.mem.cell(addr).unwrap_or_default();
            print!("{:>5}", cell);
        }
        println!();
    }
}

#[cfg(feature = "tui")]
fn debug_program(path: &str) {
    use vonneumann::run_debugger;

    println!("🔍 Loading: {}", path);
    let deck = load_program(path, &[]);

    if deck.is_empty() {
        eprintln!("❌ No cards to load");
        std::process::exit(1);
    }

    println!("🚀 Launching debugger...");

    if let Err(e) = run_debugger(deck) {
        eprintln!("❌ Debugger error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(not(feature = "tui"))]
fn debug_program(_path: &str) {
    eprintln!("❌ Built without the `tui` feature");
    std::process::exit(1);
}

/// `prog.asm` → `prog.deck`; any other extension is replaced the same way.
fn default_deck_path(source_path: &str) -> String {
    Path::new(source_path)
        .with_extension("deck")
        .to_string_lossy()
        .into_owned()
}

fn assemble_file(source_path: &str, output: Option<String>) {
    let out_path = output.unwrap_or_else(|| default_deck_path(source_path));
    if Path::new(&out_path) == Path::new(source_path) {
        eprintln!("❌ Output would overwrite the source: {}", out_path);
        std::process::exit(1);
    }

    println!("📝 Assembling: {} → {}", source_path, out_path);

    let source = match std::fs::read_to_string(source_path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("❌ Failed to read file: {}", e);
            std::process::exit(1);
        }
    };

    let program = match assemble(&source) {
        Ok(program) => program,
        Err(e) => {
            eprintln!("❌ Assembly error: {}", e);
            std::process::exit(1);
        }
    };

    let deck = program.to_deck(std::iter::empty::<String>());
    println!("✓ Assembled {} words into {} cards", program.words().count(), deck.len());

    if let Err(e) = save_deck(&out_path, &deck) {
        eprintln!("❌ Failed to save deck: {}", e);
        std::process::exit(1);
    }

    println!("✓ Saved to {}", out_path);
}

fn disassemble_file(deck_path: &str) {
    use vonneumann::asm::disassemble_deck;

    let deck = match load_deck(deck_path) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("❌ Failed to load deck: {}", e);
            std::process::exit(1);
        }
    };

    print!("{}", disassemble_deck(&deck));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_deck_path_never_reuses_source() {
        assert_eq!(default_deck_path("prog.asm"), "prog.deck");
        assert_eq!(default_deck_path("dir/prog.txt"), "dir/prog.deck");
        assert_eq!(default_deck_path("prog"), "prog.deck");
        assert_ne!(default_deck_path("my.asm.txt"), "my.asm.txt");
    }
}
