// Configuration loading

pub mod settings;

pub use settings::{Settings, DEFAULT_ENDPOINT};
