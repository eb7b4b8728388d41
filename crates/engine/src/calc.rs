//! Calculation string helpers.
//!
//! The calculation string is the expression text behind the live result.
//! It grows by plain concatenation as tags are committed and is rebuilt
//! from scratch whenever a tag leaves the formula.

use crate::formula::{ends_with_glyph, format_number, is_glyph_token, Glyph};
use crate::suggestion::SuggestionCache;

/// How operator keys are checked against the calculation so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OperatorPolicy {
    /// Every operator is accepted; malformed results show as "Error".
    #[default]
    Permissive,
    /// Reject a binary operator directly after another binary operator, and
    /// any binary operator except `-` at the start or right after `(`.
    Strict,
}

/// Adjacency gate: an operand may only follow nothing or an operator glyph.
pub fn operand_allowed(calculation: &str) -> bool {
    calculation.is_empty() || ends_with_glyph(calculation)
}

pub fn operator_allowed(policy: OperatorPolicy, calculation: &str, glyph: Glyph) -> bool {
    if policy == OperatorPolicy::Permissive || !glyph.is_binary() {
        return true;
    }

    match calculation.chars().last().and_then(Glyph::from_char) {
        // Empty calculation: only a leading minus makes sense
        None if calculation.is_empty() => glyph == Glyph::Minus,
        // Ends in a number
        None => true,
        Some(Glyph::LParen) => glyph == Glyph::Minus,
        Some(Glyph::RParen) => true,
        Some(_) => false,
    }
}

/// Text a single formula token contributes: the value of the suggestion it
/// names, or the token itself for glyphs and unresolved text.
pub fn token_fragment(token: &str, cache: &SuggestionCache) -> String {
    match cache.resolve(token) {
        Some(suggestion) => format_number(suggestion.value),
        None => token.to_string(),
    }
}

/// Rebuild the calculation string from a formula.
///
/// A `+` is inserted between two neighbouring tokens that are both
/// operands, so removing the operator between two quantities leaves a sum
/// rather than two numbers glued together.
pub fn synthesize(formula: &[String], cache: &SuggestionCache) -> String {
    let mut out = String::new();
    for (i, token) in formula.iter().enumerate() {
        if i > 0 && !is_glyph_token(token) && !is_glyph_token(&formula[i - 1]) {
            out.push('+');
        }
        out.push_str(&token_fragment(token, cache));
    }
    out
}
