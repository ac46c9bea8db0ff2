//! The six-layer keybinding resolver (spec §4.3, §4.8, §8 properties 1-2).
//!
//! Layers, lowest to highest precedence:
//!   1. built-in defaults
//!   2. active profile
//!   3. platform ([`crate::probe::platform_overrides`])
//!   4. terminal ([`crate::probe::terminal_overrides`])
//!   5. user config (`interactive.keybindings` / `interactive.contexts.*` /
//!      `interactive.{darwin|linux|windows}.*` / `interactive.terminals.*`)
//!   6. environment variables (`GGC_KEYBIND_<ACTION>`)
//!
//! Each layer *replaces* (never merges with) a lower layer's binding for the
//! same action, per §4.3 — this is deliberately unconditional: a
//! higher-numbered layer that binds an action always wins, even if the
//! binding it replaces came from something as specific-seeming as a named
//! profile. Property 2 in §8 states this as the resolver's universal
//! contract, and this implementation follows it literally rather than any
//! narrower reading of a single worked example.
//!
//! Grounded on brush-core's layered-lookup pattern for builtin resolution
//! (`brush-core::builtins::Registry`, which also composes several sources
//! with later sources overriding earlier ones) and its environment-variable
//! escape hatches (`brush-core::env`).

use std::collections::HashMap;
use std::sync::RwLock;

use indexmap::IndexMap;

use crate::action::Action;
use crate::context::Context;
use crate::error::Error;
use crate::keystroke::Keystroke;
use crate::probe::{self, Platform};
use crate::profile::{ActionBindings, KeyBindingProfile};

/// The fully-resolved set of bindings for one context: one ordered list of
/// keystrokes per action that's actually bound.
pub type KeyBindingMap = IndexMap<Action, Vec<Keystroke>>;

/// The fully-resolved bindings across every context, keyed by [`Context`].
pub type ContextualKeyBindingMap = HashMap<Context, KeyBindingMap>;

/// User-config-supplied override layers (spec §3's `interactive.*`
/// sub-schema), already parsed into keystrokes by the config loader.
#[derive(Clone, Debug, Default)]
pub struct UserOverrides {
    /// `interactive.keybindings`: global user overrides.
    pub global: ActionBindings,
    /// `interactive.contexts.<name>.keybindings`.
    pub contexts: HashMap<Context, ActionBindings>,
    /// `interactive.{darwin|linux|windows}.keybindings`, keyed by
    /// [`Platform`].
    pub platforms: HashMap<Platform, ActionBindings>,
    /// `interactive.terminals.<name>.keybindings`, keyed by the terminal
    /// identity string as classified by [`probe::classify_terminal`].
    pub terminals: HashMap<String, ActionBindings>,
}

fn cache_key(profile: &str, context: Context, platform: Platform, terminal: Option<&str>) -> String {
    format!(
        "{profile}\0{context}\0{platform}\0{}\0{}",
        terminal.unwrap_or(""),
        probe::generation()
    )
}

/// Composes the six layers and caches the result, keyed on
/// `(profile, context, platform, terminal, probe-generation)`.
///
/// The cache exists purely as a performance guard against repeated
/// resolution on every keystroke; it is never a source of truth, since the
/// key includes every input the resolution depends on.
pub struct Resolver {
    cache: RwLock<HashMap<String, KeyBindingMap>>,
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}

impl Resolver {
    /// Creates an empty resolver.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Drops every cached resolution. Called whenever the active profile,
    /// user config, or environment changes.
    pub fn invalidate(&self) {
        self.cache
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clear();
    }

    /// Resolves bindings for a single context, consulting (then populating)
    /// the cache.
    pub fn resolve(
        &self,
        profile: &KeyBindingProfile,
        context: Context,
        overrides: &UserOverrides,
    ) -> KeyBindingMap {
        let platform = probe::detect_platform();
        let terminal = probe::detect_terminal();
        let key = cache_key(&profile.name.to_string(), context, platform, terminal.as_deref());

        if let Some(hit) = self.cache.read().ok().and_then(|c| c.get(&key).cloned()) {
            return hit;
        }

        let resolved = resolve_uncached(profile, context, platform, terminal.as_deref(), overrides);

        if let Ok(mut guard) = self.cache.write() {
            guard.insert(key, resolved.clone());
        }
        resolved
    }

    /// Resolves every context for the given profile, for callers that need
    /// the whole [`ContextualKeyBindingMap`] at once (e.g. after a profile
    /// switch).
    pub fn resolve_all(
        &self,
        profile: &KeyBindingProfile,
        overrides: &UserOverrides,
    ) -> ContextualKeyBindingMap {
        Context::all()
            .map(|ctx| (ctx, self.resolve(profile, ctx, overrides)))
            .collect()
    }
}

/// The built-in, profile-independent default bindings (spec §4.3 item 1).
/// `move_left`/`move_right` are deliberately left unbound at this layer.
fn builtin_defaults() -> KeyBindingMap {
    let mut map = IndexMap::new();
    map.insert(Action::DeleteWord, vec![Keystroke::Ctrl { rune: 'w' }]);
    map.insert(Action::ClearLine, vec![Keystroke::Ctrl { rune: 'u' }]);
    map.insert(Action::DeleteToEnd, vec![Keystroke::Ctrl { rune: 'k' }]);
    map.insert(Action::MoveToBeginning, vec![Keystroke::Ctrl { rune: 'a' }]);
    map.insert(Action::MoveToEnd, vec![Keystroke::Ctrl { rune: 'e' }]);
    map.insert(Action::MoveUp, vec![Keystroke::Ctrl { rune: 'p' }]);
    map.insert(Action::MoveDown, vec![Keystroke::Ctrl { rune: 'n' }]);
    map.insert(Action::AddToWorkflow, vec![Keystroke::RawSeq(vec![0x09])]);
    map.insert(Action::ToggleWorkflowView, vec![Keystroke::Ctrl { rune: 't' }]);
    map.insert(Action::ClearWorkflow, vec![Keystroke::RawSeq(vec![b'c'])]);
    map.insert(Action::WorkflowCreate, vec![Keystroke::Ctrl { rune: 'n' }]);
    map.insert(Action::WorkflowDelete, vec![Keystroke::Ctrl { rune: 'd' }]);
    map.insert(
        Action::SoftCancel,
        vec![Keystroke::Ctrl { rune: 'g' }, Keystroke::RawSeq(vec![0x1b])],
    );
    map
}

fn resolve_uncached(
    profile: &KeyBindingProfile,
    context: Context,
    platform: Platform,
    terminal: Option<&str>,
    overrides: &UserOverrides,
) -> KeyBindingMap {
    // Layer 1: built-in defaults (spec §4.3 item 1), seeded regardless of
    // context or active profile.
    let mut map: KeyBindingMap = builtin_defaults();

    // Layer 2: active profile. Replaces, per action, only where the
    // profile actually defines a binding — it never appends to or merges
    // with whatever layer 1 left in place.
    for action in Action::all() {
        if let Some(strokes) = profile.lookup(context, action) {
            map.insert(action, strokes.to_vec());
        }
    }

    // Layer 3: platform.
    for (action, strokes) in probe::platform_overrides(platform) {
        map.insert(action, strokes);
    }

    // Layer 4: terminal.
    if let Some(term) = terminal {
        for (action, strokes) in probe::terminal_overrides(term) {
            map.insert(action, strokes);
        }
    }

    // Layer 5: user config — global, then context-specific, then the
    // user's own platform map, then the user's own terminal map, each
    // scoped to the platform/terminal actually active (spec §4.3 item 5).
    for (action, strokes) in &overrides.global {
        map.insert(*action, strokes.clone());
    }
    if let Some(ctx_overrides) = overrides.contexts.get(&context) {
        for (action, strokes) in ctx_overrides {
            map.insert(*action, strokes.clone());
        }
    }
    if let Some(platform_overrides) = overrides.platforms.get(&platform) {
        for (action, strokes) in platform_overrides {
            map.insert(*action, strokes.clone());
        }
    }
    if let Some(term) = terminal {
        if let Some(term_overrides) = overrides.terminals.get(probe::classify_terminal(term)) {
            for (action, strokes) in term_overrides {
                map.insert(*action, strokes.clone());
            }
        }
    }

    // Layer 6: environment variables, the final and highest-precedence
    // layer. A malformed override is logged and skipped rather than
    // failing the whole resolution.
    for action in Action::all() {
        if let Ok(value) = std::env::var(action.env_var_name()) {
            match Keystroke::parse(&value) {
                Ok(stroke) => {
                    map.insert(action, vec![stroke]);
                }
                Err(err) => {
                    tracing::warn!(
                        action = %action,
                        value = %value,
                        error = %err,
                        "ignoring malformed environment keybinding override"
                    );
                }
            }
        }
    }

    map
}

/// Returns every action bound, in any context, to a keystroke that's also
/// bound to a different action within the same context — used by config
/// validation to surface accidental collisions (not itself an error: later
/// layers are permitted to intentionally shadow earlier ones, so this is
/// informational only).
#[must_use]
pub fn detect_conflicts(map: &KeyBindingMap) -> Vec<(Keystroke, Vec<Action>)> {
    let mut by_stroke: HashMap<&Keystroke, Vec<Action>> = HashMap::new();
    for (action, strokes) in map {
        for stroke in strokes {
            by_stroke.entry(stroke).or_default().push(*action);
        }
    }
    by_stroke
        .into_iter()
        .filter(|(_, actions)| actions.len() > 1)
        .map(|(stroke, actions)| (stroke.clone(), actions))
        .collect()
}

/// Returns the action (if any) bound to `stroke` in `map`.
#[must_use]
pub fn action_for_keystroke(map: &KeyBindingMap, stroke: &Keystroke) -> Option<Action> {
    map.iter()
        .find(|(_, strokes)| strokes.contains(stroke))
        .map(|(action, _)| *action)
}

/// Legacy single-byte compatibility query (spec §4.8): given a raw control
/// byte read from a terminal in raw mode, returns the bound action if any
/// `Ctrl` keystroke in `map` encodes that byte. Falls back to the
/// hardcoded `Ctrl+C` → [`Action::SoftCancel`] mapping when nothing in
/// `map` claims the byte, since a raw-mode reader must always be able to
/// escape even with an empty or corrupt config.
#[must_use]
pub fn action_for_control_byte(map: &KeyBindingMap, byte: u8) -> Option<Action> {
    for (action, strokes) in map {
        for stroke in strokes {
            if stroke.control_byte() == Some(byte) {
                return Some(*action);
            }
        }
    }
    // Ctrl+C's control byte, computed inline rather than re-derived from a
    // `Keystroke` to avoid an `expect` on an `Option` that's always `Some`.
    const CTRL_C_BYTE: u8 = b'c' - b'a' + 1;
    if byte == CTRL_C_BYTE {
        return Some(Action::SoftCancel);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{build_profile, ProfileName};

    fn default_profile() -> KeyBindingProfile {
        build_profile(ProfileName::Default)
    }

    #[test]
    fn windows_default_profile_yields_the_literal_builtin_defaults() {
        probe::force_override(Some(Platform::Windows), None);
        let resolver = Resolver::new();
        let overrides = UserOverrides::default();
        let profile = default_profile();

        let resolved = resolver.resolve(&profile, Context::Search, &overrides);
        assert_eq!(
            resolved.get(&Action::ToggleWorkflowView).unwrap(),
            &vec![Keystroke::Ctrl { rune: 't' }]
        );
        assert_eq!(
            resolved.get(&Action::SoftCancel).unwrap(),
            &vec![Keystroke::Ctrl { rune: 'g' }, Keystroke::RawSeq(vec![0x1b])]
        );
        assert!(resolved.get(&Action::MoveLeft).is_none());
        probe::clear_override();
    }

    #[test]
    fn resolution_is_deterministic() {
        probe::force_override(Some(Platform::Linux), Some("xterm".to_owned()));
        let resolver = Resolver::new();
        let overrides = UserOverrides::default();
        let profile = default_profile();

        let a = resolver.resolve(&profile, Context::Input, &overrides);
        let b = resolver.resolve(&profile, Context::Input, &overrides);
        assert_eq!(a, b);
        probe::clear_override();
    }

    #[test]
    fn higher_layer_always_wins_even_over_a_named_profile_binding() {
        // Emacs profile binds delete_word to Alt+d in the input context.
        // On Linux, the platform layer (3) always defines delete_word, so
        // per the universal "highest layer wins" property it overrides the
        // profile layer (2) regardless of what the profile set.
        probe::force_override(Some(Platform::Linux), None);
        let resolver = Resolver::new();
        let overrides = UserOverrides::default();
        let profile = build_profile(ProfileName::Emacs);

        let resolved = resolver.resolve(&profile, Context::Input, &overrides);
        assert_eq!(
            resolved.get(&Action::DeleteWord).unwrap(),
            &vec![
                Keystroke::Ctrl { rune: 'w' },
                Keystroke::Alt(crate::keystroke::AltTarget::Named(
                    crate::keystroke::AltNamedKey::Backspace
                )),
            ]
        );
        probe::clear_override();
    }

    #[test]
    fn environment_layer_overrides_everything_else() {
        probe::force_override(Some(Platform::Linux), None);
        std::env::set_var("GGC_KEYBIND_DELETE_WORD", "ctrl+x");
        let resolver = Resolver::new();
        let overrides = UserOverrides::default();
        let profile = default_profile();

        let resolved = resolver.resolve(&profile, Context::Input, &overrides);
        assert_eq!(
            resolved.get(&Action::DeleteWord).unwrap(),
            &vec![Keystroke::Ctrl { rune: 'x' }]
        );

        std::env::remove_var("GGC_KEYBIND_DELETE_WORD");
        probe::clear_override();
    }

    #[test]
    fn invalidate_forces_recomputation_after_override_change() {
        probe::force_override(Some(Platform::Darwin), None);
        let resolver = Resolver::new();
        let overrides = UserOverrides::default();
        let profile = default_profile();

        let darwin = resolver.resolve(&profile, Context::Input, &overrides);
        assert_eq!(
            darwin.get(&Action::DeleteWord).unwrap(),
            &vec![Keystroke::Alt(crate::keystroke::AltTarget::Named(
                crate::keystroke::AltNamedKey::Backspace
            ))]
        );

        probe::force_override(Some(Platform::Linux), None);
        let linux = resolver.resolve(&profile, Context::Input, &overrides);
        assert_eq!(
            linux.get(&Action::DeleteWord).unwrap(),
            &vec![
                Keystroke::Ctrl { rune: 'w' },
                Keystroke::Alt(crate::keystroke::AltTarget::Named(
                    crate::keystroke::AltNamedKey::Backspace
                )),
            ]
        );
        probe::clear_override();
    }

    #[test]
    fn control_byte_fallback_resolves_soft_cancel() {
        let map = KeyBindingMap::new();
        let ctrl_c_byte = Keystroke::Ctrl { rune: 'c' }.control_byte().unwrap();
        assert_eq!(action_for_control_byte(&map, ctrl_c_byte), Some(Action::SoftCancel));
    }

    #[test]
    fn context_override_wins_over_global_user_override() {
        probe::force_override(Some(Platform::Windows), None);
        let resolver = Resolver::new();
        let mut overrides = UserOverrides::default();
        overrides
            .global
            .insert(Action::MoveUp, vec![Keystroke::Ctrl { rune: 'p' }]);
        let mut results_ctx = ActionBindings::new();
        results_ctx.insert(Action::MoveUp, vec![Keystroke::Ctrl { rune: 'k' }]);
        overrides.contexts.insert(Context::Results, results_ctx);

        let profile = default_profile();
        let resolved = resolver.resolve(&profile, Context::Results, &overrides);
        assert_eq!(
            resolved.get(&Action::MoveUp).unwrap(),
            &vec![Keystroke::Ctrl { rune: 'k' }]
        );
        probe::clear_override();
    }

    #[test]
    fn user_platform_override_wins_over_global_user_override_but_is_scoped_to_the_active_platform() {
        probe::force_override(Some(Platform::Darwin), None);
        let resolver = Resolver::new();
        let mut overrides = UserOverrides::default();
        overrides
            .global
            .insert(Action::DeleteWord, vec![Keystroke::Ctrl { rune: 'w' }]);
        let mut darwin = ActionBindings::new();
        darwin.insert(Action::DeleteWord, vec![Keystroke::Alt(crate::keystroke::AltTarget::Char('d'))]);
        overrides.platforms.insert(Platform::Darwin, darwin);
        let mut linux = ActionBindings::new();
        linux.insert(Action::DeleteWord, vec![Keystroke::Ctrl { rune: 'x' }]);
        overrides.platforms.insert(Platform::Linux, linux);

        let profile = default_profile();
        let resolved = resolver.resolve(&profile, Context::Input, &overrides);
        assert_eq!(
            resolved.get(&Action::DeleteWord).unwrap(),
            &vec![Keystroke::Alt(crate::keystroke::AltTarget::Char('d'))]
        );
        probe::clear_override();
    }

    #[test]
    fn user_terminal_override_wins_over_user_platform_override() {
        probe::force_override(Some(Platform::Linux), Some("xterm-256color".to_owned()));
        let resolver = Resolver::new();
        let mut overrides = UserOverrides::default();
        let mut linux = ActionBindings::new();
        linux.insert(Action::MoveUp, vec![Keystroke::Ctrl { rune: 'p' }]);
        overrides.platforms.insert(Platform::Linux, linux);
        let mut xterm = ActionBindings::new();
        xterm.insert(Action::MoveUp, vec![Keystroke::Ctrl { rune: 'k' }]);
        overrides.terminals.insert("xterm".to_owned(), xterm);

        let profile = default_profile();
        let resolved = resolver.resolve(&profile, Context::Results, &overrides);
        assert_eq!(
            resolved.get(&Action::MoveUp).unwrap(),
            &vec![Keystroke::Ctrl { rune: 'k' }]
        );
        probe::clear_override();
    }
}
