//! Where suggestions come from: the autocomplete endpoint or a local file.

use std::path::PathBuf;

use tagcalc_config::Settings;
use tagcalc_engine::{Suggestion, SuggestionSource};
use tagcalc_suggest_client::{FileSource, SuggestClient, SuggestError};

pub enum Source {
    Http(SuggestClient),
    File(FileSource),
}

impl Source {
    /// `--suggestions-file` wins over the endpoint; `--endpoint` wins over
    /// settings.
    pub fn select(
        settings: &Settings,
        endpoint: Option<String>,
        file: Option<PathBuf>,
    ) -> Result<Self, SuggestError> {
        if let Some(path) = file {
            return Ok(Source::File(FileSource::new(path)));
        }
        let endpoint = endpoint.unwrap_or_else(|| settings.endpoint.clone());
        SuggestClient::new(&endpoint, settings.timeout()).map(Source::Http)
    }

    pub fn describe(&self) -> String {
        match self {
            Source::Http(client) => client.autocomplete_url(),
            Source::File(file) => file.path().display().to_string(),
        }
    }
}

impl SuggestionSource for Source {
    type Error = SuggestError;

    fn fetch_all(&self) -> Result<Vec<Suggestion>, SuggestError> {
        match self {
            Source::Http(client) => client.fetch_all(),
            Source::File(file) => file.fetch_all(),
        }
    }
}
