pub mod calc;
pub mod controller;
pub mod events;
pub mod formula;
pub mod store;
pub mod suggestion;

pub use calc::OperatorPolicy;
pub use controller::{
    ControllerOptions, DropdownRow, FormulaView, InteractionController, Key, KeyOutcome, TagChip,
};
pub use events::{ScrollBehavior, ScrollBlock, StoreEvent, UiEffect};
pub use formula::{evaluate, EvalError, EvalResult, Glyph};
pub use store::{FormulaStore, SharedStore, SubscriptionId};
pub use suggestion::{Suggestion, SuggestionCache, SuggestionSource};
