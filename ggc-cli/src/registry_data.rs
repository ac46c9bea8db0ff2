//! The concrete, static command registry: the curated git-wrapper surface
//! named in spec §1.
//!
//! Grounded on `brush-core::builtins::factory`'s static dispatch table
//! (a fixed list mapping command names to handlers), but answer-only here:
//! this crate never implements VCS semantics, so each entry carries just
//! enough metadata for the whitelist check and CLI help text.

use ggc_core::command::{CommandCatalog, CommandSpec};

const COMMANDS: &[CommandSpec] = &[
    CommandSpec { name: "status", description: "show the working tree status" },
    CommandSpec { name: "add", description: "stage file contents" },
    CommandSpec { name: "branch", description: "list, create, or delete branches" },
    CommandSpec { name: "checkout", description: "switch branches or restore working tree files" },
    CommandSpec { name: "switch", description: "switch branches" },
    CommandSpec { name: "commit", description: "record changes to the repository" },
    CommandSpec { name: "push", description: "update remote refs" },
    CommandSpec { name: "pull", description: "fetch and integrate with another repository" },
    CommandSpec { name: "fetch", description: "download objects and refs from another repository" },
    CommandSpec { name: "remote", description: "manage tracked repositories" },
    CommandSpec { name: "stash", description: "stash changes in a dirty working directory" },
    CommandSpec { name: "tag", description: "create, list, delete tags" },
    CommandSpec { name: "rebase", description: "reapply commits on top of another base" },
    CommandSpec { name: "log", description: "show commit logs" },
    CommandSpec { name: "diff", description: "show changes between commits/tree/working tree" },
    CommandSpec { name: "merge", description: "join two or more development histories" },
    CommandSpec { name: "reset", description: "reset current HEAD to a specified state" },
    CommandSpec { name: "restore", description: "restore working tree files" },
    CommandSpec { name: "clean", description: "remove untracked files" },
    CommandSpec { name: "config", description: "get and set config options" },
    CommandSpec { name: "alias", description: "define and list command aliases" },
    CommandSpec { name: "debug-keys", description: "inspect resolved keybindings" },
];

/// The one concrete [`CommandCatalog`] this binary ships.
pub struct StaticCatalog;

impl CommandCatalog for StaticCatalog {
    fn lookup(&self, name: &str) -> Option<&CommandSpec> {
        COMMANDS.iter().find(|c| c.name == name)
    }

    fn all(&self) -> &[CommandSpec] {
        COMMANDS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_entry_is_reachable_by_name() {
        let catalog = StaticCatalog;
        for spec in catalog.all() {
            assert!(catalog.lookup(spec.name).is_some());
        }
    }

    #[test]
    fn debug_keys_is_registered() {
        assert!(StaticCatalog.lookup("debug-keys").is_some());
    }
}
