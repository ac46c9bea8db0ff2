//! The closed set of logical UI actions a keystroke can resolve to.
//!
//! Modeled after brush's `InputFunction` (`brush-core::interfaces::keybindings`):
//! a `strum`-derived enum with a fixed serialization so it can round-trip
//! through config keys (`interactive.keybindings.<action>`) and environment
//! variable names.

use strum_macros::{Display, EnumIter, EnumString};

/// A logical UI operation, decoupled from any physical key.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, EnumString, Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum Action {
    /// Delete the word before the cursor.
    DeleteWord,
    /// Clear the entire input line.
    ClearLine,
    /// Delete from the cursor to the end of the line.
    DeleteToEnd,
    /// Move the cursor to the beginning of the line.
    MoveToBeginning,
    /// Move the cursor to the end of the line.
    MoveToEnd,
    /// Move the selection/cursor up.
    MoveUp,
    /// Move the selection/cursor down.
    MoveDown,
    /// Move the selection/cursor left.
    MoveLeft,
    /// Move the selection/cursor right.
    MoveRight,
    /// Add the current selection to the workflow.
    AddToWorkflow,
    /// Toggle the workflow view.
    ToggleWorkflowView,
    /// Clear the current workflow.
    ClearWorkflow,
    /// Create a new workflow.
    WorkflowCreate,
    /// Delete the current workflow.
    WorkflowDelete,
    /// Cancel the current UI operation without exiting the process.
    SoftCancel,
}

impl Action {
    /// Returns every action in the closed enumeration, in declaration order.
    #[must_use]
    pub fn all() -> impl Iterator<Item = Self> {
        <Self as strum::IntoEnumIterator>::iter()
    }

    /// The environment variable name consulted for this action's override,
    /// e.g. `GGC_KEYBIND_DELETE_WORD`.
    #[must_use]
    pub fn env_var_name(self) -> String {
        format!("GGC_KEYBIND_{}", self.to_string().to_ascii_uppercase())
    }
}
