//! Operator glyphs.
//!
//! The seven single-character tokens that may appear in a formula besides
//! quantity names. They are stored in the formula and copied verbatim into
//! the calculation string.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Glyph {
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
    Caret,
}

impl Glyph {
    pub const ALL: [Glyph; 7] = [
        Glyph::Plus,
        Glyph::Minus,
        Glyph::Star,
        Glyph::Slash,
        Glyph::LParen,
        Glyph::RParen,
        Glyph::Caret,
    ];

    pub fn from_char(c: char) -> Option<Glyph> {
        match c {
            '+' => Some(Glyph::Plus),
            '-' => Some(Glyph::Minus),
            '*' => Some(Glyph::Star),
            '/' => Some(Glyph::Slash),
            '(' => Some(Glyph::LParen),
            ')' => Some(Glyph::RParen),
            '^' => Some(Glyph::Caret),
            _ => None,
        }
    }

    /// Parse a whole formula token. Only single-character tokens qualify.
    pub fn from_token(token: &str) -> Option<Glyph> {
        let mut chars = token.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Glyph::from_char(c),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Glyph::Plus => '+',
            Glyph::Minus => '-',
            Glyph::Star => '*',
            Glyph::Slash => '/',
            Glyph::LParen => '(',
            Glyph::RParen => ')',
            Glyph::Caret => '^',
        }
    }

    /// Infix operators, i.e. everything except the parentheses.
    pub fn is_binary(self) -> bool {
        !matches!(self, Glyph::LParen | Glyph::RParen)
    }
}

impl fmt::Display for Glyph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// True when `token` is exactly one operator glyph.
pub fn is_glyph_token(token: &str) -> bool {
    Glyph::from_token(token).is_some()
}

/// True when the calculation string ends in an operator glyph.
pub fn ends_with_glyph(calculation: &str) -> bool {
    calculation.chars().last().and_then(Glyph::from_char).is_some()
}
