//! Offline suggestion source: the same JSON array, read from disk.

use std::path::{Path, PathBuf};

use tagcalc_engine::{Suggestion, SuggestionSource};

use crate::client::{parse_suggestions, SuggestError};

#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn fetch_all(&self) -> Result<Vec<Suggestion>, SuggestError> {
        let contents = std::fs::read_to_string(&self.path)
            .map_err(|e| SuggestError::Io(format!("{}: {}", self.path.display(), e)))?;
        parse_suggestions(&contents)
    }
}

impl SuggestionSource for FileSource {
    type Error = SuggestError;

    fn fetch_all(&self) -> Result<Vec<Suggestion>, SuggestError> {
        FileSource::fetch_all(self)
    }
}
