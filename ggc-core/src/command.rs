//! Command validation: the shell-metacharacter blacklist and the
//! command-whitelist check against a [`CommandCatalog`] (spec §4.6, §4.7).
//!
//! Grounded on brush-core's builtin registry pattern
//! (`brush-core::builtins::Registry`/`factory`), which likewise separates
//! "is this a known command" lookup from execution; here the catalog plays
//! the role of that registry but is answer-only (spec's Non-goals exclude
//! this crate from actually executing anything).

use crate::error::{Error, ErrorKind};

/// Characters an alias or raw command string must never contain, since this
/// tool never invokes a shell to interpret its output (spec §4.7 item 1):
/// `;|&<>(){}[]$`, backtick, newline, and carriage return.
const BLACKLISTED_METACHARACTERS: &[char] = &[
    ';', '&', '|', '`', '$', '(', ')', '{', '}', '[', ']', '<', '>', '\n', '\r',
];

/// A single known command's static metadata.
#[derive(Debug, Clone)]
pub struct CommandSpec {
    /// The command's canonical name, e.g. `"status"`.
    pub name: &'static str,
    /// A short human-readable description.
    pub description: &'static str,
}

/// A read-only catalog of commands this tool recognizes as valid alias
/// expansion targets. Implemented by the concrete static table the binary
/// crate supplies; kept as a trait here so the resolver/validator logic is
/// testable against a small fixture catalog without the real one.
pub trait CommandCatalog {
    /// Returns the command spec named `name`, if known.
    fn lookup(&self, name: &str) -> Option<&CommandSpec>;

    /// Returns every known command, for listing/help output.
    fn all(&self) -> &[CommandSpec];
}

/// Validates that `command` contains no blacklisted shell metacharacters.
pub fn check_metacharacters(command: &str) -> Result<(), Error> {
    if let Some(bad) = command.chars().find(|c| BLACKLISTED_METACHARACTERS.contains(c)) {
        return Err(ErrorKind::UnsafeMetacharacter(format!("{bad:?} in {command:?}")).into());
    }
    Ok(())
}

/// Validates that `command`'s leading whitespace-delimited token names a
/// command in `catalog`.
pub fn check_whitelisted(command: &str, catalog: &dyn CommandCatalog) -> Result<(), Error> {
    let leading = command.split_whitespace().next().unwrap_or_default();
    if catalog.lookup(leading).is_none() {
        return Err(ErrorKind::UnknownCommand(leading.to_owned()).into());
    }
    Ok(())
}

/// Runs both checks, in the order spec §4.6 fixes: metacharacters first,
/// then the whitelist.
pub fn validate_command(command: &str, catalog: &dyn CommandCatalog) -> Result<(), Error> {
    check_metacharacters(command)?;
    check_whitelisted(command, catalog)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixtureCatalog {
        commands: Vec<CommandSpec>,
    }

    impl CommandCatalog for FixtureCatalog {
        fn lookup(&self, name: &str) -> Option<&CommandSpec> {
            self.commands.iter().find(|c| c.name == name)
        }

        fn all(&self) -> &[CommandSpec] {
            &self.commands
        }
    }

    fn fixture() -> FixtureCatalog {
        FixtureCatalog {
            commands: vec![
                CommandSpec {
                    name: "status",
                    description: "show status",
                },
                CommandSpec {
                    name: "commit",
                    description: "record changes",
                },
            ],
        }
    }

    #[test]
    fn accepts_known_command_with_args() {
        assert!(validate_command("commit -m \"hi\"", &fixture()).is_ok());
    }

    #[test]
    fn rejects_unknown_command() {
        let err = validate_command("rm -rf /", &fixture()).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::UnknownCommand(_)));
    }

    #[test]
    fn rejects_metacharacters_before_checking_whitelist() {
        let err = validate_command("status; rm -rf /", &fixture()).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::UnsafeMetacharacter(_)));
    }

    #[test]
    fn rejects_each_blacklisted_character() {
        for bad in BLACKLISTED_METACHARACTERS {
            let command = format!("status {bad}");
            assert!(check_metacharacters(&command).is_err(), "expected {bad:?} to be rejected");
        }
    }
}
