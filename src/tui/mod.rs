//! TUI debugger for the emulator.
//!
//! Provides an interactive terminal-based debugger with:
//! - Register and state display
//! - A 10x10 memory grid
//! - Step/run/pause/breakpoint controls, with runs paced by the UI loop
//! - Disassembly and printed output views

mod app;
mod ui;

pub use app::{DebuggerApp, run_debugger};
