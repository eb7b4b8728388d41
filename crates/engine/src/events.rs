//! Event types for formula change notifications and host-side effects.
//!
//! `StoreEvent`s are delivered to store observers after every successful
//! mutation. `UiEffect`s are queued by the interaction controller for the
//! host to carry out (focus moves, scrolling) since the engine has no
//! rendering surface of its own.

/// Emitted by `FormulaStore` after a mutation took effect.
/// No-op mutations (out-of-range indices) emit nothing.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    /// A tag was appended at `index` (always the new last position).
    TagAdded { index: usize, tag: String },
    /// The tag previously at `index` was removed; later tags shifted left.
    TagRemoved { index: usize, tag: String },
    /// The tag at `index` was replaced.
    TagUpdated { index: usize, old: String, new: String },
}

impl StoreEvent {
    pub fn index(&self) -> usize {
        match self {
            StoreEvent::TagAdded { index, .. }
            | StoreEvent::TagRemoved { index, .. }
            | StoreEvent::TagUpdated { index, .. } => *index,
        }
    }
}

/// Observer callback. Receives the event and the formula after the change.
pub type StoreCallback = Box<dyn FnMut(&StoreEvent, &[String])>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBehavior {
    Smooth,
}

/// Which edge to align when scrolling an item into view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBlock {
    /// Minimal scroll: align whichever edge is closest, or don't move at all
    /// if the item is already visible.
    Nearest,
}

/// Side effects requested by the controller, drained by the host.
#[derive(Debug, Clone, PartialEq)]
pub enum UiEffect {
    /// Move keyboard focus to the text input.
    FocusInput,
    /// Bring the dropdown row at `index` into view.
    ScrollIntoView {
        index: usize,
        behavior: ScrollBehavior,
        block: ScrollBlock,
    },
}

/// Simple event collector for testing.
#[derive(Debug, Default)]
pub struct EventCollector {
    events: Vec<StoreEvent>,
}

impl EventCollector {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn push(&mut self, event: StoreEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[StoreEvent] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Filter to only TagRemoved events.
    pub fn removed(&self) -> Vec<&StoreEvent> {
        self.events
            .iter()
            .filter(|e| matches!(e, StoreEvent::TagRemoved { .. }))
            .collect()
    }
}
