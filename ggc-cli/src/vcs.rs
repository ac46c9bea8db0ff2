//! The passthrough VCS dispatcher: shells out literal argv to the
//! configured VCS binary. Implements none of the VCS's own semantics
//! (spec §1 Non-goals) — it exists only so the engine this crate actually
//! specifies (resolver + alias expander) is runnable end to end.

use std::process::Command;

use ggc_core::error::{Error, ErrorKind};
use ggc_core::interfaces::CommandDispatcher;

/// Shells out to a configured VCS binary (default `git`) with the given
/// argv, unmodified.
pub struct PassthroughDispatcher {
    binary: String,
}

impl Default for PassthroughDispatcher {
    fn default() -> Self {
        Self::new("git".to_owned())
    }
}

impl PassthroughDispatcher {
    /// Creates a dispatcher that shells out to `binary`.
    #[must_use]
    pub fn new(binary: String) -> Self {
        Self { binary }
    }
}

impl CommandDispatcher for PassthroughDispatcher {
    fn dispatch(&mut self, argv: &[String]) -> Result<i32, Error> {
        let status = Command::new(&self.binary)
            .args(argv)
            .status()
            .map_err(|source| ErrorKind::ConfigReadFailed {
                path: std::path::PathBuf::from(&self.binary),
                source,
            })?;
        Ok(status.code().unwrap_or(1))
    }
}
