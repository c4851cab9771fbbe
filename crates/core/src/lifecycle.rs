//! Listener registration and its re-entrancy guard
//!
//! Each element that owns listeners moves through
//! `Uninitialized -> Initializing -> Initialized` exactly once. Wiring code
//! asks [`Lifecycles::begin`] before binding and skips the element when it
//! has already been claimed, so running the bootstrap twice never binds a
//! handler twice.

use crate::page::RowId;
use std::collections::HashMap;
use tracing::trace;

/// Setup state of one element
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Lifecycle {
    #[default]
    Uninitialized,
    Initializing,
    Initialized,
}

/// Elements that own listeners or one-off setup work
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Resource {
    SortableTable(String),
    Toggler(String),
    Choice(String),
    OptionsGenerator(String),
    FilterForm(String),
    CompareTable(String),
    CompareToggler(String),
    CompareItem(RowId),
    Sparklines,
}

#[derive(Debug, Default)]
pub struct Lifecycles {
    states: HashMap<Resource, Lifecycle>,
}

impl Lifecycles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, resource: &Resource) -> Lifecycle {
        self.states.get(resource).copied().unwrap_or_default()
    }

    /// Claim an uninitialized resource. Returns `false` if it was already claimed.
    pub fn begin(&mut self, resource: Resource) -> bool {
        let state = self.states.entry(resource).or_default();
        if *state != Lifecycle::Uninitialized {
            return false;
        }
        *state = Lifecycle::Initializing;
        true
    }

    /// Mark a claimed resource as fully set up
    pub fn finish(&mut self, resource: Resource) {
        self.states.insert(resource, Lifecycle::Initialized);
    }
}

/// Element an event is dispatched to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Target {
    Header { table: String, column: usize },
    Toggler(String),
    Choice(String),
    FilterSelect { form: String, filter: usize },
    CompareItem(RowId),
    CompareToggler(String),
}

/// Reaction bound to a target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handler {
    SortColumn,
    ToggleColumn,
    ChoiceFilter,
    OptionFilter,
    CompareMarkRow,
    CompareRedraw,
    CompareVisibility,
}

/// Handlers bound per target, in binding order.
///
/// Binding the same handler twice makes it run twice, as with a browser's
/// `addEventListener` and distinct closures.
#[derive(Debug, Default)]
pub struct Listeners {
    bindings: HashMap<Target, Vec<Handler>>,
}

impl Listeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, target: Target, handler: Handler) {
        trace!(?target, ?handler, "Binding listener");
        self.bindings.entry(target).or_default().push(handler);
    }

    pub fn handlers(&self, target: &Target) -> &[Handler] {
        self.bindings.get(target).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Total bindings across all targets
    pub fn len(&self) -> usize {
        self.bindings.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
