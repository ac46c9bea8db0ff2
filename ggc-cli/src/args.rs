//! Types for ggc command-line parsing.
//!
//! Grounded on `brush-shell::args::CommandLineArgs`: a single clap-derived
//! struct with `disable_help_flag`/custom styling, plus a trailing raw-argv
//! capture. Unlike the teacher, this crate's command set is data-driven
//! (the [`crate::registry_data::StaticCatalog`] plus user-defined aliases)
//! rather than a fixed set of clap subcommands, so the whole invocation
//! after the binary name is captured as `command_args` and handed to
//! [`crate::dispatch::run`].

use clap::{Parser, builder::styling};
use std::path::PathBuf;

const SHORT_DESCRIPTION: &str = "interactive command-line wrapper for a version-control tool";

const USAGE: &str = "ggc [OPTIONS] [COMMAND] [ARGS]...";

/// Parsed command-line arguments for the `ggc` binary.
#[derive(Clone, Parser)]
#[clap(
    name = "ggc",
    version,
    about = SHORT_DESCRIPTION,
    author,
    override_usage = USAGE,
    disable_help_flag = true,
    styles = ggc_help_styles()
)]
pub struct CommandLineArgs {
    /// Display usage information.
    #[clap(long = "help", action = clap::ArgAction::HelpShort)]
    pub help: Option<bool>,

    /// Load configuration from this path instead of the default search
    /// path (legacy `~/.ggcconfig.yaml`, then the XDG config directory).
    #[clap(long = "config", value_name = "FILE")]
    pub config_path: Option<PathBuf>,

    /// Start in the named keybinding profile instead of the one recorded
    /// in the config file (or `default`).
    #[clap(long = "profile", value_name = "PROFILE")]
    pub profile: Option<String>,

    /// Disable the background config hot-reload watcher.
    #[clap(long = "no-watch")]
    pub no_watch: bool,

    /// Command (and its arguments) to run. Left empty, `ggc` starts its
    /// interactive mode.
    #[clap(trailing_var_arg = true, allow_hyphen_values = true)]
    pub command_args: Vec<String>,
}

/// Returns clap styling to be used for command-line help.
#[doc(hidden)]
fn ggc_help_styles() -> clap::builder::Styles {
    styling::Styles::styled()
        .header(styling::AnsiColor::Yellow.on_default() | styling::Effects::BOLD)
        .usage(styling::AnsiColor::Green.on_default() | styling::Effects::BOLD)
        .literal(styling::AnsiColor::Magenta.on_default() | styling::Effects::BOLD)
        .placeholder(styling::AnsiColor::Cyan.on_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_args_yields_empty_command_args() {
        let parsed = CommandLineArgs::parse_from(["ggc"]);
        assert!(parsed.command_args.is_empty());
    }

    #[test]
    fn trailing_args_are_captured_verbatim_including_hyphenated_ones() {
        let parsed = CommandLineArgs::parse_from(["ggc", "rebase", "-i", "HEAD~3"]);
        assert_eq!(parsed.command_args, vec!["rebase", "-i", "HEAD~3"]);
    }

    #[test]
    fn config_override_is_parsed_before_trailing_args() {
        let parsed = CommandLineArgs::parse_from(["ggc", "--config", "/tmp/ggc.yaml", "status"]);
        assert_eq!(parsed.config_path, Some(PathBuf::from("/tmp/ggc.yaml")));
        assert_eq!(parsed.command_args, vec!["status"]);
    }
}
