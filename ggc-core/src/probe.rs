//! Platform and terminal detection (spec §3, §4.2, §4.3 layer 3/4).
//!
//! Grounded on brush-core's own platform dispatch (`brush-core::sys`, split
//! by `cfg(unix)`/`cfg(windows)`), but expressed here as runtime detection
//! over environment variables rather than compile-time `cfg`, since the
//! resolved bindings must react to `$TERM`/`$OSTYPE` at runtime, not at
//! build time.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use strum_macros::{Display, EnumIter, EnumString};

use crate::action::Action;
use crate::keystroke::{AltNamedKey, AltTarget, Keystroke};

/// The host platform family, as distinguished by the spec's platform
/// keybinding layer.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, EnumString, Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum Platform {
    /// macOS.
    Darwin,
    /// Linux.
    Linux,
    /// The BSD family.
    Bsd,
    /// Windows.
    Windows,
    /// Any other/unrecognized `unix`-like platform.
    Unix,
}

/// A generation counter bumped every time a test hook forces new
/// environment values, so the resolver's cache can detect staleness
/// without re-reading the environment on every lookup.
static FORCE_GENERATION: AtomicU64 = AtomicU64::new(0);

thread_local! {
    static FORCED_PLATFORM: std::cell::RefCell<Option<Platform>> = const { std::cell::RefCell::new(None) };
    static FORCED_TERMINAL: std::cell::RefCell<Option<String>> = const { std::cell::RefCell::new(None) };
}

/// Detects the running platform from `std::env::consts::OS`, falling back
/// to `$OSTYPE` for environments that override it (e.g. inside WSL or a
/// cross-compiled test harness).
#[must_use]
pub fn detect_platform() -> Platform {
    if let Some(forced) = FORCED_PLATFORM.with(std::cell::RefCell::borrow).clone() {
        return forced;
    }

    if let Ok(ostype) = std::env::var("OSTYPE") {
        if let Some(p) = platform_from_ostype(&ostype) {
            return p;
        }
    }

    match std::env::consts::OS {
        "macos" => Platform::Darwin,
        "linux" => Platform::Linux,
        "freebsd" | "openbsd" | "netbsd" | "dragonfly" => Platform::Bsd,
        "windows" => Platform::Windows,
        _ => Platform::Unix,
    }
}

fn platform_from_ostype(ostype: &str) -> Option<Platform> {
    let lower = ostype.to_ascii_lowercase();
    if lower.starts_with("darwin") {
        Some(Platform::Darwin)
    } else if lower.starts_with("linux") {
        Some(Platform::Linux)
    } else if lower.contains("bsd") {
        Some(Platform::Bsd)
    } else if lower.starts_with("msys") || lower.starts_with("cygwin") || lower.starts_with("win") {
        Some(Platform::Windows)
    } else {
        None
    }
}

/// Detects the running terminal emulator from well-known environment
/// variables. Returns `None` when no terminal identity can be determined
/// (e.g. not running in an interactive terminal at all).
#[must_use]
pub fn detect_terminal() -> Option<String> {
    if let Some(forced) = FORCED_TERMINAL.with(std::cell::RefCell::borrow).clone() {
        return Some(forced);
    }

    if let Ok(program) = std::env::var("TERM_PROGRAM") {
        if !program.is_empty() {
            return Some(program.to_ascii_lowercase());
        }
    }
    if let Ok(term) = std::env::var("TERM") {
        if !term.is_empty() {
            return Some(term.to_ascii_lowercase());
        }
    }
    None
}

/// Forces detection results for the duration of the current thread, for
/// deterministic tests. Bumps the generation counter so resolver caches
/// invalidate.
pub fn force_override(platform: Option<Platform>, terminal: Option<String>) {
    FORCED_PLATFORM.with(|cell| *cell.borrow_mut() = platform);
    FORCED_TERMINAL.with(|cell| *cell.borrow_mut() = terminal);
    FORCE_GENERATION.fetch_add(1, Ordering::SeqCst);
}

/// Clears any forced overrides, reverting to real environment detection.
pub fn clear_override() {
    force_override(None, None);
}

/// A monotonically increasing counter that changes whenever
/// [`force_override`] is called, so callers holding a resolver cache keyed
/// partly on "current generation" know to drop stale entries.
#[must_use]
pub fn generation() -> u64 {
    FORCE_GENERATION.load(Ordering::SeqCst)
}

/// Returns the platform-layer binding overrides for `platform` (spec §4.2):
/// on Linux/BSD/generic unix, `delete_word` is bound to both `Ctrl+W` and
/// `Alt+Backspace`; on Darwin, to `Alt+Backspace` alone; Windows defines no
/// platform-layer overrides.
#[must_use]
pub fn platform_overrides(platform: Platform) -> HashMap<Action, Vec<Keystroke>> {
    let mut map = HashMap::new();
    match platform {
        Platform::Darwin => {
            map.insert(
                Action::DeleteWord,
                vec![Keystroke::Alt(AltTarget::Named(AltNamedKey::Backspace))],
            );
        }
        Platform::Linux | Platform::Bsd | Platform::Unix => {
            map.insert(
                Action::DeleteWord,
                vec![
                    Keystroke::Ctrl { rune: 'w' },
                    Keystroke::Alt(AltTarget::Named(AltNamedKey::Backspace)),
                ],
            );
        }
        Platform::Windows => {}
    }
    map
}

/// Returns the terminal-layer binding overrides for a detected terminal
/// identity (spec §4.2's reserved, currently-empty terminal table).
#[must_use]
pub fn terminal_overrides(_terminal: &str) -> HashMap<Action, Vec<Keystroke>> {
    HashMap::new()
}

/// A terminal's input/display capability flags (spec §4.2).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Default)]
pub struct TerminalCapabilities {
    /// Whether `alt+<key>` combinations are reliably distinguishable.
    pub alt_keys: bool,
    /// Whether function keys (`F1`, ...) are reliably distinguishable.
    pub function_keys: bool,
    /// Whether mouse events are reported.
    pub mouse: bool,
    /// Whether 256-color output is supported.
    pub color_256: bool,
    /// Whether unicode glyphs render correctly.
    pub unicode: bool,
}

impl TerminalCapabilities {
    const ALL: Self = Self {
        alt_keys: true,
        function_keys: true,
        mouse: true,
        color_256: true,
        unicode: true,
    };

    const NONE: Self = Self {
        alt_keys: false,
        function_keys: false,
        mouse: false,
        color_256: false,
        unicode: false,
    };
}

/// The fixed terminal-identity table spec §4.2 names. `detect_terminal`
/// supplies the raw identity string this is matched against.
const KNOWN_TERMINALS: &[&str] = &[
    "iterm",
    "terminal",
    "vscode",
    "hyper",
    "tmux",
    "screen",
    "xterm",
    "alacritty",
    "kitty",
    "wezterm",
    "konsole",
    "gnome-terminal",
    "rxvt",
    "dumb",
    "generic",
];

/// Classifies a raw terminal identity string (as returned by
/// [`detect_terminal`]) against the fixed table (spec §4.2), falling back
/// to `"generic"` for anything unrecognized. Matching uses substring
/// containment since real-world `$TERM`/`$TERM_PROGRAM` values carry
/// extra detail (e.g. `xterm-256color`, `iTerm.app`).
#[must_use]
pub fn classify_terminal(raw: &str) -> &'static str {
    let lower = raw.to_ascii_lowercase();
    KNOWN_TERMINALS
        .iter()
        .copied()
        .find(|known| lower.contains(known))
        .unwrap_or("generic")
}

/// Returns the capability set for a detected terminal identity (spec
/// §4.2): `dumb` disables every capability; every other terminal in the
/// table, including the `generic` fallback, enables all of them.
#[must_use]
pub fn terminal_capabilities(raw: &str) -> TerminalCapabilities {
    match classify_terminal(raw) {
        "dumb" => TerminalCapabilities::NONE,
        _ => TerminalCapabilities::ALL,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn darwin_binds_only_alt_backspace_for_delete_word() {
        let overrides = platform_overrides(Platform::Darwin);
        assert_eq!(
            overrides.get(&Action::DeleteWord).unwrap(),
            &vec![Keystroke::Alt(AltTarget::Named(AltNamedKey::Backspace))]
        );
    }

    #[test]
    fn linux_binds_both_ctrl_w_and_alt_backspace() {
        let overrides = platform_overrides(Platform::Linux);
        assert_eq!(
            overrides.get(&Action::DeleteWord).unwrap(),
            &vec![
                Keystroke::Ctrl { rune: 'w' },
                Keystroke::Alt(AltTarget::Named(AltNamedKey::Backspace)),
            ]
        );
    }

    #[test]
    fn windows_has_no_platform_overrides() {
        assert!(platform_overrides(Platform::Windows).is_empty());
    }

    #[test]
    fn classifies_known_terminal_identities() {
        assert_eq!(classify_terminal("iTerm.app"), "iterm");
        assert_eq!(classify_terminal("xterm-256color"), "xterm");
        assert_eq!(classify_terminal("screen.tmux"), "tmux");
        assert_eq!(classify_terminal("something-bespoke"), "generic");
    }

    #[test]
    fn dumb_terminal_disables_every_capability() {
        assert_eq!(terminal_capabilities("dumb"), TerminalCapabilities::NONE);
    }

    #[test]
    fn modern_terminals_enable_every_capability() {
        for term in ["iterm", "alacritty", "kitty", "generic"] {
            assert_eq!(terminal_capabilities(term), TerminalCapabilities::ALL);
        }
    }

    #[test]
    fn force_override_takes_precedence_and_bumps_generation() {
        let before = generation();
        force_override(Some(Platform::Darwin), Some("iterm".to_owned()));
        assert_eq!(detect_platform(), Platform::Darwin);
        assert_eq!(detect_terminal().as_deref(), Some("iterm"));
        assert!(generation() > before);
        clear_override();
    }
}
