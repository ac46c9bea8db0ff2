//! Implements the command-line interface for the `ggc` binary.

mod args;
mod dispatch;
mod input_term;
mod registry_data;
mod vcs;

use std::path::PathBuf;
use std::str::FromStr as _;
use std::sync::Arc;

use clap::Parser as _;

use ggc_core::config;
use ggc_core::interfaces::InputSource as _;
use ggc_core::profile::ProfileName;
use ggc_core::resolver::Resolver;
use ggc_core::runtime::{self, HotReloader, ProfileSwitcher};

use crate::args::CommandLineArgs;
use crate::dispatch::DispatchOutcome;
use crate::input_term::TerminalInputSource;
use crate::registry_data::StaticCatalog;
use crate::vcs::PassthroughDispatcher;

/// Main entry point for the `ggc` binary.
fn main() {
    human_panic::setup_panic!();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = CommandLineArgs::parse();
    let exit_code = run(args);
    std::process::exit(exit_code);
}

fn run(args: CommandLineArgs) -> i32 {
    let config_path = args.config_path.clone().or_else(config::default_config_path);
    let load_result = match &config_path {
        Some(path) => config::load_from_path(path),
        None => config::load_config(),
    };
    if let Some(err) = &load_result.error {
        tracing::warn!(error = %err, "ignoring unusable config, falling back to defaults");
    }
    let config = load_result.config;

    let initial_profile = args
        .profile
        .as_deref()
        .or(config.interactive.profile.as_deref())
        .and_then(|name| ProfileName::from_str(name).ok())
        .unwrap_or(ProfileName::Default);

    let overrides = runtime::overrides_from_config(&config);
    let resolver = Arc::new(Resolver::new());
    let switcher = Arc::new(ProfileSwitcher::new(resolver, initial_profile, overrides));

    let reloader = HotReloader::new();
    if !args.no_watch {
        if let Some(path) = config_path.clone() {
            if path.exists() {
                if let Err(err) = reloader.start(path, switcher.clone()) {
                    tracing::warn!(error = %err, "failed to start config watcher");
                }
            }
        }
    }

    let catalog = StaticCatalog;
    let mut dispatcher = PassthroughDispatcher::default();

    let outcome = dispatch::run(&args.command_args, &config, &catalog, &mut dispatcher);

    reloader.stop();

    match outcome {
        Ok(DispatchOutcome::Ran(code)) => code,
        Ok(DispatchOutcome::LegacySyntaxRejected) => {
            eprintln!("{}", dispatch::LEGACY_SYNTAX_MESSAGE);
            1
        }
        Ok(DispatchOutcome::StartInteractive) => run_interactive(&switcher, &config_path),
        Ok(DispatchOutcome::DebugKeys(sub_args)) => run_debug_keys(&sub_args, &switcher),
        Err(err) => {
            eprintln!("Error: {err}");
            1
        }
    }
}

/// The help text `ggc debug-keys --help` prints (spec §6/S5).
const DEBUG_KEYS_HELP: &str = "\
ggc debug-keys - inspect resolved keybindings and raw terminal input

USAGE:
    ggc debug-keys             print every resolved keybinding, grouped by context
    ggc debug-keys raw         read one keystroke from the terminal and print its raw bytes
    ggc debug-keys raw <file>  print the raw bytes in <file> instead of reading the terminal
    ggc debug-keys --help      print this message
";

/// Runs the `debug-keys` built-in (spec §6): it inspects this tool's own
/// resolved keybinding state rather than dispatching to the configured VCS
/// binary, so it lives here rather than behind `CommandDispatcher`.
fn run_debug_keys(args: &[String], switcher: &ProfileSwitcher) -> i32 {
    match args {
        [] => {
            print_resolved_bindings(switcher);
            0
        }
        [flag] if flag == "--help" => {
            print!("{DEBUG_KEYS_HELP}");
            0
        }
        [cmd] if cmd == "raw" => print_raw_from_terminal(),
        [cmd, file] if cmd == "raw" => print_raw_from_file(file),
        _ => {
            eprintln!("{}", dispatch::LEGACY_SYNTAX_MESSAGE);
            1
        }
    }
}

fn print_resolved_bindings(switcher: &ProfileSwitcher) {
    let resolved = switcher.resolved();
    let mut contexts: Vec<_> = resolved.keys().copied().collect();
    contexts.sort_by_key(ToString::to_string);
    for context in contexts {
        println!("[{context}]");
        for (action, strokes) in &resolved[&context] {
            let rendered: Vec<String> = strokes.iter().map(ToString::to_string).collect();
            println!("  {action} = {}", rendered.join(", "));
        }
    }
}

fn print_raw_from_terminal() -> i32 {
    let mut input = TerminalInputSource::new();
    if let Err(err) = input.enter_raw_mode() {
        eprintln!("Error: {err}");
        return 1;
    }
    let result = input.read_byte();
    let _ = input.leave_raw_mode();
    match result {
        Ok(byte) => {
            println!("{byte:02x}");
            0
        }
        Err(err) => {
            eprintln!("Error: {err}");
            1
        }
    }
}

fn print_raw_from_file(path: &str) -> i32 {
    match std::fs::read(path) {
        Ok(bytes) => {
            let rendered: Vec<String> = bytes.iter().map(|b| format!("{b:02x}")).collect();
            println!("{}", rendered.join(" "));
            0
        }
        Err(err) => {
            eprintln!("Error: {err}");
            1
        }
    }
}

/// Placeholder entry point for the interactive keystroke loop: the engine
/// this crate specifies (resolver, alias expansion, context stack) is fully
/// wired up by this point via `switcher`; the interactive render loop that
/// consumes it is outside this crate's scope (spec §1 Non-goals). This stub
/// still exercises the real raw-mode lifecycle so startup fails loudly if
/// the controlling terminal can't be put in raw mode.
fn run_interactive(switcher: &Arc<ProfileSwitcher>, config_path: &Option<PathBuf>) -> i32 {
    let resolved = switcher.resolved();
    tracing::info!(
        profile = %switcher.current_name(),
        contexts = resolved.len(),
        config_path = ?config_path.as_deref(),
        "ready for interactive input"
    );

    let mut input = TerminalInputSource::new();
    let code = match input.enter_raw_mode() {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("Error: {err}");
            1
        }
    };
    let _ = input.leave_raw_mode();
    code
}
