//! Top-level command dispatch: the legacy-syntax guard, alias expansion,
//! and routing to the configured VCS (spec §6).
//!
//! Grounded on `brush-core::builtins::Registry`'s lookup-then-invoke
//! pattern, simplified here since this crate's dispatcher never interprets
//! VCS semantics — it validates, expands aliases, and hands argv to
//! whatever [`ggc_core::interfaces::CommandDispatcher`] the caller supplied.

use ggc_core::alias::{self, ParsedAlias, RawAlias};
use ggc_core::command::{self, CommandCatalog};
use ggc_core::config::Config;
use ggc_core::error::Error;
use ggc_core::interfaces::CommandDispatcher;

/// The exact error string spec §6 mandates for legacy-like invocations.
pub const LEGACY_SYNTAX_MESSAGE: &str = "legacy-like syntax is not supported";

/// The outcome of attempting to dispatch a top-level invocation.
#[derive(Debug)]
pub enum DispatchOutcome {
    /// The invocation matched the legacy-syntax guard and was rejected.
    LegacySyntaxRejected,
    /// No arguments were given; the caller should start the interactive UI.
    StartInteractive,
    /// A known top-level command ran with the given exit code.
    Ran(i32),
    /// `debug-keys` was invoked with its sub-arguments (empty, `--help`,
    /// `raw`, or `raw <file>`). `debug-keys` is never shelled out to the
    /// configured VCS binary — it inspects this crate's own resolved state
    /// — so the caller, which alone holds the resolver/switcher, handles it.
    DebugKeys(Vec<String>),
}

/// Whether `rest` is one of `debug-keys`'s recognized sub-forms (spec §6):
/// no arguments, `--help`, `raw`, or `raw <file>`.
fn is_valid_debug_keys_invocation(rest: &[String]) -> bool {
    match rest {
        [] => true,
        [one] => one == "--help" || one == "raw",
        [cmd, _file] => cmd == "raw",
        _ => false,
    }
}

/// A top-level token is "known" (spec §6: "every known top-level token is
/// either a direct command or an alias name") if it names either a
/// registered command or a user-defined alias — aliases are never entries
/// in the command catalog, so both sources must be consulted.
fn is_known_token(command: &str, config: &Config, catalog: &dyn CommandCatalog) -> bool {
    catalog.lookup(command).is_some() || config.aliases.contains_key(command)
}

/// Runs one top-level invocation: `argv` excludes the binary name.
pub fn run(
    argv: &[String],
    config: &Config,
    catalog: &dyn CommandCatalog,
    dispatcher: &mut dyn CommandDispatcher,
) -> Result<DispatchOutcome, Error> {
    let Some(command) = argv.first() else {
        return Ok(DispatchOutcome::StartInteractive);
    };
    let rest = &argv[1..];

    if command == "debug-keys" {
        if is_valid_debug_keys_invocation(rest) {
            return Ok(DispatchOutcome::DebugKeys(rest.to_vec()));
        }
        return Ok(DispatchOutcome::LegacySyntaxRejected);
    }

    if !is_known_token(command, config, catalog) {
        // Either an unknown token, or a hyphenated pseudo-command like
        // "clean-interactive" that was never registered under that name.
        return Ok(DispatchOutcome::LegacySyntaxRejected);
    }

    if let Some(raw) = config.aliases.get(command) {
        return run_alias(command, raw, rest, catalog, dispatcher).map(DispatchOutcome::Ran);
    }

    // Only a catalog command (never an alias) is subject to the
    // hyphenated-flag legacy guard: an alias's own arguments may
    // legitimately start with `-` once substituted into its command(s).
    if rest.iter().any(|arg| arg == "--" || arg.starts_with('-')) {
        return Ok(DispatchOutcome::LegacySyntaxRejected);
    }

    command::validate_command(command, catalog)?;
    let code = dispatcher.dispatch(argv)?;
    Ok(DispatchOutcome::Ran(code))
}

fn run_alias(
    name: &str,
    raw: &RawAlias,
    args: &[String],
    catalog: &dyn CommandCatalog,
    dispatcher: &mut dyn CommandDispatcher,
) -> Result<i32, Error> {
    let parsed: ParsedAlias = alias::parse(name, raw)?;
    let expanded = alias::expand(&parsed, args)?;

    let mut last_code = 0;
    for command in expanded {
        command::validate_command(&command, catalog)?;
        let argv: Vec<String> = command.split_whitespace().map(str::to_owned).collect();
        last_code = dispatcher.dispatch(&argv)?;
        if last_code != 0 {
            break;
        }
    }
    Ok(last_code)
}
