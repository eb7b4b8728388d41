//! Suggestion source client, shared by the TUI and the scriptable CLI.
//!
//! This crate is the single place that knows the autocomplete wire
//! contract: one `GET {endpoint}/autocomplete?query=` returning a JSON
//! array of `{name, category, value, id}` records.
//!
//! No retries. No incremental queries; filtering happens client-side.

mod client;
mod file;

pub use client::{SuggestClient, SuggestError};
pub use file::FileSource;
