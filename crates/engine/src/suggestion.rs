//! Suggestion records and the per-mount suggestion cache.

use serde::{Deserialize, Deserializer, Serialize};

/// A candidate quantity offered by the autocomplete dropdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub name: String,
    #[serde(default)]
    pub category: String,
    pub value: f64,
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: String,
}

impl Suggestion {
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        value: f64,
        id: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            value,
            id: id.into(),
        }
    }
}

// Mock backends hand out numeric ids as often as string ones.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(s) => s,
        Id::Int(n) => n.to_string(),
        Id::Float(n) => n.to_string(),
    })
}

/// Anything that can produce the full suggestion list.
///
/// Implementations are expected to block; hosts run them off the UI thread
/// and deliver the outcome to the controller.
pub trait SuggestionSource {
    type Error: std::fmt::Display;

    fn fetch_all(&self) -> Result<Vec<Suggestion>, Self::Error>;
}

/// State of the one-shot fetch issued at mount.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SuggestionCache {
    /// Nothing requested yet
    #[default]
    Idle,
    /// Request outstanding
    Loading,
    Ready(Vec<Suggestion>),
    /// Request failed; treated as an empty cache
    Failed(String),
}

impl SuggestionCache {
    /// Cached suggestions, if the fetch succeeded.
    pub fn entries(&self) -> Option<&[Suggestion]> {
        match self {
            SuggestionCache::Ready(list) => Some(list),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, SuggestionCache::Loading)
    }

    /// Case-insensitive substring filter over the cached names.
    /// Returns nothing when the cache isn't ready or the query is blank.
    pub fn filter(&self, query: &str) -> Vec<Suggestion> {
        match self.entries() {
            Some(list) if !query.trim().is_empty() => filter_suggestions(list, query),
            _ => Vec::new(),
        }
    }

    /// Case-insensitive exact name match (used when Enter is pressed with
    /// nothing highlighted).
    pub fn find_by_name(&self, name: &str) -> Option<&Suggestion> {
        let needle = name.to_lowercase();
        self.entries()?
            .iter()
            .find(|s| s.name.to_lowercase() == needle)
    }

    /// Exact, case-sensitive lookup used to turn a stored tag back into its
    /// value.
    pub fn resolve(&self, tag: &str) -> Option<&Suggestion> {
        self.entries()?.iter().find(|s| s.name == tag)
    }
}

pub fn filter_suggestions(list: &[Suggestion], query: &str) -> Vec<Suggestion> {
    let needle = query.to_lowercase();
    list.iter()
        .filter(|s| s.name.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}
