//! Machine execution engine.
//!
//! Implements the fetch-decode-execute cycle and all instruction behaviors.

use crate::cpu::decode::{self, Operation};
use crate::cpu::io::{IoBoundary, LineProvider};
use crate::cpu::memory::{Memory, MemoryError};
use crate::cpu::registers::{RegisterSnapshot, Registers};
use crate::cpu::registry::{CapabilityGroup, ConfigurationError, OpcodeRegistry};
use crate::decimal::{arith, ParseError, Word};
use serde::{Serialize, Deserialize};
use thiserror::Error;

/// JMP stores its return instruction here.
pub const RETURN_ADDR: usize = 99;

/// Added to PC to form the return instruction (a JMP back).
pub const RETURN_BASE: i64 = 800;

/// Machine execution state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MachineState {
    /// Not inside a run. Single steps leave the machine here.
    Idle,
    /// Inside a run; the running flag is set.
    Running,
    /// Executed HRS.
    Halted,
    /// A runtime fault ended the last step. Only `reset` leaves this state.
    Faulted,
}

/// What a single step executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Executed {
    /// Address the instruction was fetched from.
    pub addr: usize,
    /// Raw instruction word.
    pub ir: i64,
    pub op: Operation,
    pub operand: u8,
}

/// Result of a run that reached HRS.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    /// Printed words, newline-joined.
    pub output: String,
    /// Registers after the halt.
    pub registers: RegisterSnapshot,
    /// Instructions executed during this run.
    pub cycles: u64,
}

impl RunReport {
    /// The printed words, one per OUT.
    pub fn output_lines(&self) -> Vec<&str> {
        if self.output.is_empty() {
            Vec::new()
        } else {
            self.output.split('\n').collect()
        }
    }
}

/// Result of a bounded run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The program executed HRS.
    Halted(RunReport),
    /// The cycle budget ran out first. The machine is stopped, not reset;
    /// printed output is kept.
    CycleLimit { cycles: u64 },
}

/// The machine: memory, registers and I/O, driven through an opcode
/// registry.
pub struct Machine {
    /// Registers.
    pub regs: Registers,
    /// Main memory.
    pub mem: Memory,
    /// Card input and printed output.
    pub io: IoBoundary,
    /// Current execution state.
    pub state: MachineState,
    /// Instruction count since reset.
    pub cycles: u64,
    registry: OpcodeRegistry,
    last_executed: Option<Executed>,
}

impl Machine {
    /// Create the complete machine in its reset state.
    pub fn new() -> Self {
        Self::with_registry(OpcodeRegistry::standard())
    }

    /// Create a machine from an explicit list of capability groups.
    pub fn with_groups(groups: &[CapabilityGroup]) -> Result<Self, ConfigurationError> {
        Ok(Self::with_registry(OpcodeRegistry::build(groups)?))
    }

    fn with_registry(registry: OpcodeRegistry) -> Self {
        Self {
            regs: Registers::new(),
            mem: Memory::new(),
            io: IoBoundary::new(),
            state: MachineState::Idle,
            cycles: 0,
            registry,
            last_executed: None,
        }
    }

    /// Restore the reset image: registers, memory, queued input and output.
    /// The registry and any line provider are kept.
    pub fn reset(&mut self) {
        self.regs.reset();
        self.mem.clear();
        self.io.clear();
        self.state = MachineState::Idle;
        self.cycles = 0;
        self.last_executed = None;
    }

    /// Replace the input queue with a deck of tokens.
    pub fn load_deck<I, S>(&mut self, tokens: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.io.load_deck(tokens);
    }

    /// Install the fallback used when the deck runs out.
    pub fn set_line_provider(&mut self, provider: impl LineProvider + 'static) {
        self.io.set_provider(Box::new(provider));
    }

    /// The assembled opcode table.
    pub fn registry(&self) -> &OpcodeRegistry {
        &self.registry
    }

    /// Execute a single instruction.
    ///
    /// Works whether or not a run is in progress, so hosts can single-step
    /// at their own pace. A fault moves the machine to `Faulted` and leaves
    /// registers and memory as they were at the fault.
    pub fn step(&mut self) -> Result<Executed, CpuError> {
        if self.state == MachineState::Faulted {
            return Err(CpuError::Faulted);
        }

        match self.cycle() {
            Ok(executed) => {
                self.cycles += 1;
                self.last_executed = Some(executed);
                self.state = if executed.op == Operation::Hrs {
                    MachineState::Halted
                } else if self.regs.running {
                    MachineState::Running
                } else {
                    MachineState::Idle
                };
                Ok(executed)
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    pc = self.regs.pc,
                    ir = self.regs.ir,
                    acc = self.regs.acc,
                    "machine fault"
                );
                self.regs.running = false;
                self.state = MachineState::Faulted;
                Err(e)
            }
        }
    }

    /// Fetch, decode and dispatch one instruction.
    fn cycle(&mut self) -> Result<Executed, CpuError> {
        // Fetch
        let addr = self.regs.pc;
        self.regs.ir = self.mem.read(addr)?;
        self.regs.advance_pc()?;

        // Decode
        let ir = self.regs.ir;
        let word = decode::decode(ir);
        let op = self.registry
            .resolve(word.opcode)
            .ok_or(CpuError::OpcodeFault { opcode: word.opcode, ir })?;

        tracing::trace!(
            ir,
            pc = self.regs.pc,
            acc = self.regs.acc,
            op = op.mnemonic(),
            operand = word.operand,
            "execute"
        );

        // Execute
        self.execute(op, word.operand)?;

        Ok(Executed { addr, ir, op, operand: word.operand })
    }

    /// Run until HRS or a fault.
    pub fn run(&mut self) -> Result<RunReport, CpuError> {
        self.start()?;
        let start_cycles = self.cycles;

        while self.regs.running {
            self.step()?;
        }

        Ok(self.finish(start_cycles))
    }

    /// Run starting at `pc`.
    pub fn run_from(&mut self, pc: usize) -> Result<RunReport, CpuError> {
        self.regs.jump(Memory::check_addr(pc)?);
        self.run()
    }

    /// Run for at most `max_cycles` instructions.
    pub fn run_limited(&mut self, max_cycles: u64) -> Result<RunOutcome, CpuError> {
        self.start()?;
        let start_cycles = self.cycles;
        let limit = start_cycles.saturating_add(max_cycles);

        while self.regs.running {
            if self.cycles >= limit {
                self.stop();
                tracing::debug!(max_cycles, "cycle limit reached");
                return Ok(RunOutcome::CycleLimit { cycles: max_cycles });
            }
            self.step()?;
        }

        Ok(RunOutcome::Halted(self.finish(start_cycles)))
    }

    /// Clear the running flag. Takes effect at the next step boundary.
    pub fn stop(&mut self) {
        self.regs.running = false;
        if self.state == MachineState::Running {
            self.state = MachineState::Idle;
        }
    }

    /// Set the running flag without executing anything.
    ///
    /// Hosts that pace execution themselves call this, then `step` until
    /// `is_running` turns false.
    pub fn start(&mut self) -> Result<(), CpuError> {
        if self.state == MachineState::Faulted {
            return Err(CpuError::Faulted);
        }
        self.regs.running = true;
        self.state = MachineState::Running;
        tracing::debug!(pc = self.regs.pc, "run started");
        Ok(())
    }

    fn finish(&mut self, start_cycles: u64) -> RunReport {
        let report = RunReport {
            output: self.io.take_output(),
            registers: self.regs.snapshot(),
            cycles: self.cycles - start_cycles,
        };
        tracing::debug!(cycles = report.cycles, "run halted");
        report
    }

    /// Execute a decoded operation.
    fn execute(&mut self, op: Operation, operand: u8) -> Result<(), CpuError> {
        let addr = operand as usize;

        match op {
            Operation::Inp => {
                let token = self.io
                    .next_token()
                    .ok_or(CpuError::InputExhausted { addr })?;
                let word = Word::parse(&token)
                    .map_err(|source| CpuError::TokenFault { token, source })?;
                self.mem.write_word(addr, word)?;
            }

            Operation::Cla => {
                self.regs.acc = self.mem.read(addr)?;
            }

            Operation::Add => {
                let value = self.mem.read(addr)?;
                self.regs.acc = self.regs.acc.checked_add(value).ok_or(CpuError::Overflow)?;
            }

            Operation::Tac => {
                if self.regs.acc < 0 {
                    self.regs.jump(addr);
                }
            }

            Operation::Sft => {
                self.regs.acc = arith::shift(self.regs.acc, operand);
            }

            Operation::Out => {
                let word = self.mem.read_word(addr)?;
                self.io.emit(word.to_string());
            }

            Operation::Sto => {
                self.mem.write(addr, self.regs.acc)?;
            }

            Operation::Sub => {
                let value = self.mem.read(addr)?;
                self.regs.acc = self.regs.acc.checked_sub(value).ok_or(CpuError::Overflow)?;
            }

            Operation::Jmp => {
                self.mem.write(RETURN_ADDR, RETURN_BASE + self.regs.pc as i64)?;
                self.regs.jump(addr);
            }

            Operation::Hrs => {
                self.regs.reset();
            }
        }

        Ok(())
    }

    /// The last successfully executed instruction.
    pub fn last_executed(&self) -> Option<Executed> {
        self.last_executed
    }

    /// Copy out PC, IR and ACC.
    pub fn snapshot(&self) -> RegisterSnapshot {
        self.regs.snapshot()
    }

    /// Check if the machine has halted.
    pub fn is_halted(&self) -> bool {
        self.state == MachineState::Halted
    }

    /// Check if a run is in progress.
    pub fn is_running(&self) -> bool {
        self.regs.running
    }
}

impl Default for Machine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Machine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Machine")
            .field("state", &self.state)
            .field("cycles", &self.cycles)
            .field("regs", &self.regs)
            .field("io", &self.io)
            .finish()
    }
}

/// Errors that can occur during execution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CpuError {
    #[error("machine is faulted; reset required")]
    Faulted,

    #[error("address fault: {0}")]
    AddressFault(#[from] MemoryError),

    #[error("invalid opcode: {opcode} (instruction {ir})")]
    OpcodeFault { opcode: i64, ir: i64 },

    #[error("invalid input token {token:?}: {source}")]
    TokenFault { token: String, source: ParseError },

    #[error("no input available for INP {addr:02}")]
    InputExhausted { addr: usize },

    #[error("accumulator overflow")]
    Overflow,
}
