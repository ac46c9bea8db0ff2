//! External collaborator traits this crate depends on but does not
//! implement itself: raw terminal input and command dispatch.
//!
//! Grounded on `brush-core::interfaces`, which defines the shell's
//! `ShellRuntime`/input-source seams as traits the interactive front-end
//! supplies, keeping the core resolution logic free of any real terminal or
//! process dependency.

use crate::error::Error;

/// A source of raw keyboard input, implemented by the binary crate's
/// terminal glue (crossterm/nix in raw mode). Kept as a trait so the
/// resolver and runtime controls can be tested without a real TTY.
pub trait InputSource {
    /// Puts the terminal into raw mode, if not already.
    fn enter_raw_mode(&mut self) -> Result<(), Error>;

    /// Restores the terminal's prior mode.
    fn leave_raw_mode(&mut self) -> Result<(), Error>;

    /// Returns `true` if a byte is available to read without blocking.
    fn has_pending_input(&mut self) -> Result<bool, Error>;

    /// Reads the next available byte, blocking until one arrives.
    fn read_byte(&mut self) -> Result<u8, Error>;
}

/// Dispatches an already-validated, already-expanded command line to the
/// underlying version-control tool. This crate only validates and expands;
/// it never interprets VCS semantics itself (spec §1 Non-goals), so this
/// trait's only real implementation is a thin argv passthrough supplied by
/// the binary crate.
pub trait CommandDispatcher {
    /// Runs `argv` (already split into whitespace-delimited tokens) and
    /// returns the process's exit code.
    fn dispatch(&mut self, argv: &[String]) -> Result<i32, Error>;
}
