// Calculation parsing and evaluation

pub mod eval;
pub mod glyph;
pub mod parser;

pub use eval::{evaluate, format_number, EvalError, EvalResult, ERROR_MARKER};
pub use glyph::{ends_with_glyph, is_glyph_token, Glyph};
