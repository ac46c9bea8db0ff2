//! The UI context enumeration and the stack-based context manager
//! (spec §3, §4.4, §4.8).

use std::collections::HashMap;

use strum_macros::{Display, EnumIter, EnumString};

/// A named UI mode gating which keybindings are active.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, EnumString, Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum Context {
    /// Bindings active regardless of the current mode.
    Global,
    /// Free-text entry (the search box, a rename prompt, ...).
    Input,
    /// The results/candidate list.
    Results,
    /// The fuzzy-search overlay.
    Search,
}

impl Context {
    /// The four contexts every profile must define bindings for.
    #[must_use]
    pub fn all() -> impl Iterator<Item = Self> {
        <Self as strum::IntoEnumIterator>::iter()
    }
}

type Callback = Box<dyn Fn(Context, Context) + Send + Sync>;

/// Maintains the current UI context and a stack of previously-entered ones.
///
/// `EnterContext`/`ExitContext`/`SetContext` implement the pushdown automaton
/// described in spec §4.4/§4.8. Callbacks registered for a context fire, in
/// registration order, whenever a transition actually lands on that context;
/// callbacks registered for [`Context::Global`] additionally fire after any
/// transition to a non-global context, also in registration order. Firing is
/// fire-and-forget: callback errors (panics aside) are not observable here.
pub struct ContextManager {
    current: Context,
    stack: Vec<Context>,
    callbacks: HashMap<Context, Vec<Callback>>,
}

impl Default for ContextManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ContextManager {
    /// Creates a new manager with `current = Context::Global` and an empty
    /// stack.
    #[must_use]
    pub fn new() -> Self {
        Self {
            current: Context::Global,
            stack: Vec::new(),
            callbacks: HashMap::new(),
        }
    }

    /// Returns the current context.
    #[must_use]
    pub const fn current(&self) -> Context {
        self.current
    }

    /// Returns the current stack depth.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Registers a callback to run whenever a transition lands on `ctx`.
    pub fn on_enter(&mut self, ctx: Context, callback: impl Fn(Context, Context) + Send + Sync + 'static) {
        self.callbacks.entry(ctx).or_default().push(Box::new(callback));
    }

    /// Pushes the current context onto the stack and switches to `ctx`. A
    /// no-op if `ctx` is already current.
    pub fn enter_context(&mut self, ctx: Context) {
        if ctx == self.current {
            return;
        }
        let from = self.current;
        self.stack.push(self.current);
        self.current = ctx;
        self.fire(from, ctx);
    }

    /// Pops the stack into the current context. A no-op (returning the
    /// unchanged current context) if the stack is empty.
    pub fn exit_context(&mut self) -> Context {
        if let Some(previous) = self.stack.pop() {
            let from = self.current;
            self.current = previous;
            if previous != from {
                self.fire(from, previous);
            }
        }
        self.current
    }

    /// Replaces the current context without touching the stack.
    pub fn set_context(&mut self, ctx: Context) {
        if ctx == self.current {
            return;
        }
        let from = self.current;
        self.current = ctx;
        self.fire(from, ctx);
    }

    fn fire(&self, from: Context, to: Context) {
        if let Some(callbacks) = self.callbacks.get(&to) {
            for callback in callbacks {
                callback(from, to);
            }
        }
        if to != Context::Global {
            if let Some(callbacks) = self.callbacks.get(&Context::Global) {
                for callback in callbacks {
                    callback(from, to);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn enter_is_noop_when_already_current() {
        let mut mgr = ContextManager::new();
        mgr.enter_context(Context::Global);
        assert_eq!(mgr.depth(), 0);
    }

    #[test]
    fn enter_pushes_and_exit_pops() {
        let mut mgr = ContextManager::new();
        mgr.enter_context(Context::Input);
        assert_eq!(mgr.current(), Context::Input);
        assert_eq!(mgr.depth(), 1);

        mgr.enter_context(Context::Search);
        assert_eq!(mgr.current(), Context::Search);
        assert_eq!(mgr.depth(), 2);

        assert_eq!(mgr.exit_context(), Context::Input);
        assert_eq!(mgr.depth(), 1);

        assert_eq!(mgr.exit_context(), Context::Global);
        assert_eq!(mgr.depth(), 0);
    }

    #[test]
    fn exit_on_empty_stack_is_noop() {
        let mut mgr = ContextManager::new();
        assert_eq!(mgr.exit_context(), Context::Global);
        assert_eq!(mgr.depth(), 0);
    }

    #[test]
    fn set_context_does_not_touch_stack() {
        let mut mgr = ContextManager::new();
        mgr.enter_context(Context::Input);
        mgr.set_context(Context::Results);
        assert_eq!(mgr.current(), Context::Results);
        assert_eq!(mgr.depth(), 1);
    }

    #[test]
    fn callbacks_fire_target_then_global_in_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));

        let mut mgr = ContextManager::new();
        let log1 = log.clone();
        mgr.on_enter(Context::Input, move |_, _| log1.lock().unwrap().push("input-a"));
        let log2 = log.clone();
        mgr.on_enter(Context::Input, move |_, _| log2.lock().unwrap().push("input-b"));
        let log3 = log.clone();
        mgr.on_enter(Context::Global, move |_, _| log3.lock().unwrap().push("global"));

        mgr.enter_context(Context::Input);

        assert_eq!(*log.lock().unwrap(), vec!["input-a", "input-b", "global"]);
    }

    #[test]
    fn global_callbacks_do_not_fire_on_transition_to_global() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut mgr = ContextManager::new();
        let log1 = log.clone();
        mgr.on_enter(Context::Global, move |_, _| log1.lock().unwrap().push("global"));

        mgr.enter_context(Context::Input);
        mgr.exit_context();

        assert_eq!(*log.lock().unwrap(), Vec::<&str>::new());
    }
}
