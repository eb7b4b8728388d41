//! Formula store: the ordered list of tag labels and operator glyphs.
//!
//! A pure ordered container. It does not validate tokens and it does not
//! know about the calculation string; the interaction controller keeps the
//! two in step. Hosts share one store between the controller and whatever
//! renders it, so it is handed around as a `SharedStore`.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::events::{StoreCallback, StoreEvent};

/// Store shared between the controller and the host (single-threaded).
pub type SharedStore = Rc<RefCell<FormulaStore>>;

/// Handle returned by `subscribe`, used to detach an observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Default)]
pub struct FormulaStore {
    formula: Vec<String>,
    observers: Vec<(SubscriptionId, StoreCallback)>,
    next_subscription: u64,
}

impl fmt::Debug for FormulaStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormulaStore")
            .field("formula", &self.formula)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl FormulaStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh store wrapped for sharing.
    pub fn shared() -> SharedStore {
        Rc::new(RefCell::new(Self::new()))
    }

    pub fn tokens(&self) -> &[String] {
        &self.formula
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.formula.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.formula.len()
    }

    pub fn is_empty(&self) -> bool {
        self.formula.is_empty()
    }

    /// Append `tag` to the end of the formula. Always succeeds.
    pub fn add_tag(&mut self, tag: impl Into<String>) {
        let tag = tag.into();
        let index = self.formula.len();
        self.formula.push(tag.clone());
        self.notify(StoreEvent::TagAdded { index, tag });
    }

    /// Remove the tag at `index`, shifting later tags left.
    /// Out-of-range indices are ignored. Returns the removed tag.
    pub fn remove_tag(&mut self, index: usize) -> Option<String> {
        if index >= self.formula.len() {
            return None;
        }
        let tag = self.formula.remove(index);
        self.notify(StoreEvent::TagRemoved { index, tag: tag.clone() });
        Some(tag)
    }

    /// Replace the tag at `index`. Out-of-range indices are ignored.
    /// Returns the previous tag.
    pub fn update_tag(&mut self, index: usize, new_tag: impl Into<String>) -> Option<String> {
        let slot = self.formula.get_mut(index)?;
        let new = new_tag.into();
        let old = std::mem::replace(slot, new.clone());
        self.notify(StoreEvent::TagUpdated { index, old: old.clone(), new });
        Some(old)
    }

    /// Register an observer called after every successful mutation.
    pub fn subscribe(&mut self, callback: StoreCallback) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, callback));
        id
    }

    /// Detach an observer. Returns false if the id was unknown.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sub, _)| *sub != id);
        self.observers.len() != before
    }

    fn notify(&mut self, event: StoreEvent) {
        let formula = &self.formula;
        for (_, callback) in self.observers.iter_mut() {
            callback(&event, formula);
        }
    }
}
