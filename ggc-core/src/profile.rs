//! Named, complete keybinding profiles (spec §3, §4.3 layer 2, §8 property 3).

use indexmap::IndexMap;
use strum_macros::{Display, EnumIter, EnumString};

use crate::action::Action;
use crate::context::Context;
use crate::error::{Error, ErrorKind};
use crate::keystroke::{AltTarget, Keystroke};

/// A complete, named set of per-context bindings, drawn from a closed
/// enumeration of four built-in choices.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, EnumString, Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum ProfileName {
    /// Baseline bindings (effectively a restatement of the built-in
    /// defaults).
    Default,
    /// Emacs-style bindings.
    Emacs,
    /// Vi-style bindings.
    Vi,
    /// GNU readline-style bindings.
    Readline,
}

impl ProfileName {
    /// All four built-in profile names, for cycling and iteration.
    #[must_use]
    pub fn all() -> impl Iterator<Item = Self> {
        <Self as strum::IntoEnumIterator>::iter()
    }

    /// The next profile in cyclic order (`default → emacs → vi → readline
    /// → default → ...`).
    #[must_use]
    pub fn next(self) -> Self {
        match self {
            Self::Default => Self::Emacs,
            Self::Emacs => Self::Vi,
            Self::Vi => Self::Readline,
            Self::Readline => Self::Default,
        }
    }
}

/// Bindings for a single scope: action name to an ordered list of
/// keystrokes.
pub type ActionBindings = IndexMap<Action, Vec<Keystroke>>;

/// A complete, named set of keybindings.
///
/// Immutable once registered; every mutation (e.g. in tests, or when a
/// caller derives a custom profile) produces a deep clone rather than
/// mutating in place.
#[derive(Clone, Debug)]
pub struct KeyBindingProfile {
    /// The profile's canonical name.
    pub name: ProfileName,
    /// A short human-readable description.
    pub description: String,
    /// Bindings that apply in every context unless overridden.
    pub global: ActionBindings,
    /// Per-context bindings that override `global` for that context.
    pub contexts: IndexMap<Context, ActionBindings>,
}

impl KeyBindingProfile {
    /// Looks up this profile's binding for `action` within `context`,
    /// preferring the context-specific entry over the global one.
    #[must_use]
    pub fn lookup(&self, context: Context, action: Action) -> Option<&[Keystroke]> {
        if let Some(ctx_map) = self.contexts.get(&context) {
            if let Some(strokes) = ctx_map.get(&action) {
                return Some(strokes.as_slice());
            }
        }
        self.global.get(&action).map(Vec::as_slice)
    }

    /// Validates that this profile defines all required contexts and the
    /// minimum required bindings within `input` and `results` (spec §3).
    pub fn validate(&self) -> Result<(), Error> {
        for required in Context::all() {
            if !self.contexts.contains_key(&required) {
                return Err(ErrorKind::InvalidProfile(format!(
                    "profile '{}' is missing required context '{required}'",
                    self.name
                ))
                .into());
            }
        }

        let binds = |ctx: Context, action: Action| self.lookup(ctx, action).is_some();

        for action in [
            Action::MoveToBeginning,
            Action::MoveToEnd,
            Action::DeleteWord,
            Action::ClearLine,
        ] {
            if !binds(Context::Input, action) {
                return Err(ErrorKind::InvalidProfile(format!(
                    "profile '{}' must bind '{action}' in the 'input' context",
                    self.name
                ))
                .into());
            }
        }

        for action in [Action::MoveUp, Action::MoveDown] {
            if !binds(Context::Results, action) {
                return Err(ErrorKind::InvalidProfile(format!(
                    "profile '{}' must bind '{action}' in the 'results' context",
                    self.name
                ))
                .into());
            }
        }

        Ok(())
    }
}

fn ctrl(c: char) -> Vec<Keystroke> {
    vec![Keystroke::Ctrl { rune: c }]
}

fn alt_char(c: char) -> Vec<Keystroke> {
    vec![Keystroke::Alt(AltTarget::Char(c))]
}

fn empty_context_map() -> ActionBindings {
    IndexMap::new()
}

/// Builds one of the four built-in profiles.
#[must_use]
pub fn build_profile(name: ProfileName) -> KeyBindingProfile {
    match name {
        ProfileName::Default => build_default(),
        ProfileName::Emacs => build_emacs(),
        ProfileName::Vi => build_vi(),
        ProfileName::Readline => build_readline(),
    }
}

fn base_navigation(contexts: &mut IndexMap<Context, ActionBindings>) {
    let mut input = empty_context_map();
    input.insert(Action::MoveToBeginning, ctrl('a'));
    input.insert(Action::MoveToEnd, ctrl('e'));
    input.insert(Action::DeleteWord, ctrl('w'));
    input.insert(Action::ClearLine, ctrl('u'));
    input.insert(Action::DeleteToEnd, ctrl('k'));
    contexts.insert(Context::Input, input);

    let mut results = empty_context_map();
    results.insert(Action::MoveUp, ctrl('p'));
    results.insert(Action::MoveDown, ctrl('n'));
    contexts.insert(Context::Results, results);

    contexts.insert(Context::Search, empty_context_map());
    contexts.insert(Context::Global, empty_context_map());
}

fn build_default() -> KeyBindingProfile {
    let mut contexts = IndexMap::new();
    base_navigation(&mut contexts);

    KeyBindingProfile {
        name: ProfileName::Default,
        description: "Baseline bindings matching the built-in defaults".to_owned(),
        global: empty_context_map(),
        contexts,
    }
}

fn build_emacs() -> KeyBindingProfile {
    let mut contexts = IndexMap::new();
    base_navigation(&mut contexts);

    // Emacs-style word-delete diverges from the Ctrl+W default.
    if let Some(input) = contexts.get_mut(&Context::Input) {
        input.insert(Action::DeleteWord, alt_char('d'));
    }

    let mut global = empty_context_map();
    global.insert(Action::ToggleWorkflowView, ctrl('t'));

    KeyBindingProfile {
        name: ProfileName::Emacs,
        description: "Emacs-style bindings".to_owned(),
        global,
        contexts,
    }
}

fn build_vi() -> KeyBindingProfile {
    let mut contexts = IndexMap::new();
    base_navigation(&mut contexts);

    if let Some(results) = contexts.get_mut(&Context::Results) {
        results.insert(Action::MoveUp, vec![Keystroke::Ctrl { rune: 'p' }]);
        results.insert(Action::MoveDown, vec![Keystroke::Ctrl { rune: 'n' }]);
        results.insert(Action::MoveLeft, vec![Keystroke::Ctrl { rune: 'h' }]);
        results.insert(Action::MoveRight, vec![Keystroke::Ctrl { rune: 'l' }]);
    }
    if let Some(input) = contexts.get_mut(&Context::Input) {
        input.insert(Action::MoveToBeginning, ctrl('a'));
        input.insert(Action::MoveToEnd, ctrl('e'));
    }

    KeyBindingProfile {
        name: ProfileName::Vi,
        description: "Vi-style bindings".to_owned(),
        global: empty_context_map(),
        contexts,
    }
}

fn build_readline() -> KeyBindingProfile {
    let mut contexts = IndexMap::new();
    base_navigation(&mut contexts);

    KeyBindingProfile {
        name: ProfileName::Readline,
        description: "GNU readline-compatible bindings".to_owned(),
        global: empty_context_map(),
        contexts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_builtin_profile_validates() {
        for name in ProfileName::all() {
            build_profile(name)
                .validate()
                .unwrap_or_else(|e| panic!("profile {name} failed to validate: {e}"));
        }
    }

    #[test]
    fn emacs_overrides_delete_word_with_alt_d() {
        let profile = build_profile(ProfileName::Emacs);
        let bound = profile.lookup(Context::Input, Action::DeleteWord).unwrap();
        assert_eq!(bound, &[Keystroke::Alt(AltTarget::Char('d'))]);
    }

    #[test]
    fn cycle_wraps_around() {
        assert_eq!(ProfileName::Default.next(), ProfileName::Emacs);
        assert_eq!(ProfileName::Emacs.next(), ProfileName::Vi);
        assert_eq!(ProfileName::Vi.next(), ProfileName::Readline);
        assert_eq!(ProfileName::Readline.next(), ProfileName::Default);
    }
}
