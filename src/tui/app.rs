//! Debugger application state and logic.

use crate::asm::deck::Deck;
use crate::asm::disasm::{disassemble_cell, disassemble_word};
use crate::cpu::memory::MEMORY_SIZE;
use crate::cpu::{Machine, MachineState};
use crate::decimal::Word;
use std::collections::HashSet;

/// Debugger application state.
pub struct DebuggerApp {
    /// The machine being debugged.
    pub machine: Machine,
    /// Deck reloaded on every reset.
    pub deck: Deck,
    /// Breakpoints (by address).
    pub breakpoints: HashSet<usize>,
    /// Should we quit?
    pub should_quit: bool,
    /// Status message to display.
    pub status: String,
    /// Memory cell under the cursor.
    pub selected_addr: usize,
}

impl DebuggerApp {
    /// Create a new debugger with a deck loaded.
    pub fn new(deck: Deck) -> Self {
        let mut machine = Machine::new();
        machine.load_deck(deck.clone());

        Self {
            machine,
            deck,
            breakpoints: HashSet::new(),
            should_quit: false,
            status: "Ready. Press 's' to step, 'r' to run, 'q' to quit.".into(),
            selected_addr: 0,
        }
    }

    /// Step one instruction.
    pub fn step(&mut self) {
        if self.machine.state == MachineState::Faulted {
            self.status = "Machine faulted. Press 'x' to reset.".into();
            return;
        }

        match self.machine.step() {
            Ok(executed) => {
                let text = disassemble_word(Word::from_i64(executed.ir));
                self.status = format!("{:02}: {}", executed.addr, text);
                if self.machine.is_halted() {
                    self.status = format!("Halted after {} cycles", self.machine.cycles);
                }
            }
            Err(e) => {
                self.status = format!("Error: {}", e);
            }
        }
    }

    /// Start continuous execution; `tick` does the stepping.
    pub fn run(&mut self) {
        match self.machine.start() {
            Ok(()) => {
                self.status = "Running...".into();
                // Step off a breakpoint we are already sitting on
                if self.breakpoints.contains(&self.machine.regs.pc) {
                    self.step();
                }
            }
            Err(e) => self.status = format!("Error: {}", e),
        }
    }

    /// Pause continuous execution.
    pub fn pause(&mut self) {
        if self.machine.is_running() {
            self.machine.stop();
            self.status = "Paused.".into();
        }
    }

    /// Run one iteration of continuous execution.
    pub fn tick(&mut self) {
        if !self.machine.is_running() {
            return;
        }

        // Check for breakpoint
        let pc = self.machine.regs.pc;
        if self.breakpoints.contains(&pc) {
            self.machine.stop();
            self.status = format!("Breakpoint at PC={:02}", pc);
            return;
        }

        self.step();
    }

    /// Toggle breakpoint at the selected address.
    pub fn toggle_breakpoint(&mut self) {
        let addr = self.selected_addr;
        if self.breakpoints.remove(&addr) {
            self.status = format!("Removed breakpoint at {:02}", addr);
        } else {
            self.breakpoints.insert(addr);
            self.status = format!("Set breakpoint at {:02}", addr);
        }
    }

    /// Move the memory cursor, clamped to memory.
    pub fn move_selection(&mut self, delta: isize) {
        let next = self.selected_addr as isize + delta;
        self.selected_addr = next.clamp(0, MEMORY_SIZE as isize - 1) as usize;
    }

    /// Reset machine to initial state with the deck reloaded.
    pub fn reset(&mut self) {
        self.machine.reset();
        self.machine.load_deck(self.deck.clone());
        self.status = "Reset. Ready.".into();
    }

    /// Get disassembly around current PC.
    pub fn get_disassembly(&self, lines: usize) -> Vec<(usize, String, bool)> {
        let pc = self.machine.regs.pc;
        let start = pc.saturating_sub(lines / 2);
        let end = (start + lines).min(MEMORY_SIZE);

        self.machine
            .mem
            .dump(start, end - start)
            .into_iter()
            .map(|(addr, cell)| (addr, format!("{} {}", cell, disassemble_cell(cell)), addr == pc))
            .collect()
    }
}

/// Run the debugger with a deck.
pub fn run_debugger(deck: Deck) -> std::io::Result<()> {
    use crossterm::{
        event::{self, Event, KeyCode, KeyEventKind},
        terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
        ExecutableCommand,
    };
    use ratatui::prelude::*;
    use std::io::stdout;
    use std::time::Duration;

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let mut app = DebuggerApp::new(deck);

    // Main loop
    loop {
        terminal.draw(|frame| {
            super::ui::draw(frame, &app);
        })?;

        // The poll timeout paces continuous runs
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') => app.should_quit = true,
                        KeyCode::Char('s') => {
                            app.pause();
                            app.step();
                        }
                        KeyCode::Char('r') => app.run(),
                        KeyCode::Char('p') => app.pause(),
                        KeyCode::Char('b') => app.toggle_breakpoint(),
                        KeyCode::Char('x') => app.reset(),
                        KeyCode::Up => app.move_selection(-1),
                        KeyCode::Down => app.move_selection(1),
                        KeyCode::Left => app.move_selection(-10),
                        KeyCode::Right => app.move_selection(10),
                        _ => {}
                    }
                }
            }
        }

        app.tick();

        if app.should_quit {
            break;
        }
    }

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn echo_deck() -> Deck {
        crate::asm::assemble("ORG 10\nINP 20\nOUT 20\nHRS")
            .unwrap()
            .to_deck(["042"])
    }

    #[test]
    fn test_step_updates_status() {
        let mut app = DebuggerApp::new(echo_deck());
        app.step();
        assert_eq!(app.status, "00: INP 01");
        assert_eq!(app.machine.regs.pc, 1);
    }

    #[test]
    fn test_run_until_halt() {
        let mut app = DebuggerApp::new(echo_deck());
        app.run();
        for _ in 0..200 {
            app.tick();
        }
        assert!(app.machine.is_halted());
        assert_eq!(app.machine.io.output(), ["042"]);
    }

    #[test]
    fn test_breakpoint_pauses() {
        let mut app = DebuggerApp::new(echo_deck());
        app.selected_addr = 10;
        app.toggle_breakpoint();
        app.run();
        for _ in 0..200 {
            app.tick();
        }
        assert!(!app.machine.is_running());
        assert_eq!(app.machine.regs.pc, 10);
        assert_eq!(app.status, "Breakpoint at PC=10");
    }

    #[test]
    fn test_reset_reloads_deck() {
        let mut app = DebuggerApp::new(echo_deck());
        app.step();
        app.reset();
        assert_eq!(app.machine.io.pending_len(), app.deck.len());
        assert_eq!(app.machine.cycles, 0);
    }

    #[test]
    fn test_move_selection_clamps() {
        let mut app = DebuggerApp::new(Deck::new());
        app.move_selection(-10);
        assert_eq!(app.selected_addr, 0);
        app.move_selection(250);
        assert_eq!(app.selected_addr, 99);
    }
}
