// Calculation parser - converts calculation strings into an AST
// Supports: numbers, + - * / ^, parentheses, unary + and -

use super::glyph::Glyph;

/// Longest calculation, in tokens, the parser accepts.
pub const MAX_TOKENS: usize = 4096;

/// Deepest nesting of parentheses, signs and `^` the parser accepts.
pub const MAX_DEPTH: usize = 256;

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    BinaryOp {
        op: Op,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Negate(Box<Expr>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Add,
    Sub,
    Mul,
    Div,
    /// Exponentiation (^), never bitwise XOR
    Pow,
}

/// Parse a calculation string into an AST.
///
/// Unlike spreadsheet formulas there is no leading `=`; the calculation
/// string is the raw concatenation of tag values and operator glyphs.
pub fn parse(calculation: &str) -> Result<Expr, String> {
    let tokens = tokenize(calculation)?;
    if tokens.is_empty() {
        return Err("Empty expression".to_string());
    }
    // Bounds the tree size, so evaluating and dropping it stay shallow
    if tokens.len() > MAX_TOKENS {
        return Err(format!("Expression too long ({} tokens)", tokens.len()));
    }

    let (expr, pos) = parse_add_sub(&tokens, 0, 0)?;
    if pos < tokens.len() {
        return Err(format!("Unexpected token at position {}", pos));
    }
    Ok(expr)
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Glyph(Glyph),
}

fn tokenize(input: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        if let Some(glyph) = Glyph::from_char(c) {
            tokens.push(Token::Glyph(glyph));
            chars.next();
            continue;
        }

        match c {
            ' ' | '\t' => { chars.next(); }
            '0'..='9' | '.' => {
                let mut num_str = String::new();
                while let Some(&d) = chars.peek() {
                    if d.is_ascii_digit() || d == '.' {
                        num_str.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let num: f64 = num_str.parse().map_err(|_| format!("Invalid number: {}", num_str))?;
                tokens.push(Token::Number(num));
            }
            _ => return Err(format!("Unexpected character: {}", c)),
        }
    }

    Ok(tokens)
}

fn descend(depth: usize) -> Result<usize, String> {
    if depth >= MAX_DEPTH {
        return Err("Expression too deeply nested".to_string());
    }
    Ok(depth + 1)
}

// Lowest precedence: + and -
fn parse_add_sub(tokens: &[Token], pos: usize, depth: usize) -> Result<(Expr, usize), String> {
    let (mut left, mut pos) = parse_mul_div(tokens, pos, depth)?;

    while pos < tokens.len() {
        let op = match &tokens[pos] {
            Token::Glyph(Glyph::Plus) => Op::Add,
            Token::Glyph(Glyph::Minus) => Op::Sub,
            _ => break,
        };
        let (right, new_pos) = parse_mul_div(tokens, pos + 1, depth)?;
        left = Expr::BinaryOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
        };
        pos = new_pos;
    }

    Ok((left, pos))
}

fn parse_mul_div(tokens: &[Token], pos: usize, depth: usize) -> Result<(Expr, usize), String> {
    let (mut left, mut pos) = parse_power(tokens, pos, depth)?;

    while pos < tokens.len() {
        let op = match &tokens[pos] {
            Token::Glyph(Glyph::Star) => Op::Mul,
            Token::Glyph(Glyph::Slash) => Op::Div,
            _ => break,
        };
        let (right, new_pos) = parse_power(tokens, pos + 1, depth)?;
        left = Expr::BinaryOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
        };
        pos = new_pos;
    }

    Ok((left, pos))
}

// Exponentiation (^) - right-associative, higher precedence than * /
fn parse_power(tokens: &[Token], pos: usize, depth: usize) -> Result<(Expr, usize), String> {
    let (base, pos) = parse_unary(tokens, pos, depth)?;

    if let Some(Token::Glyph(Glyph::Caret)) = tokens.get(pos) {
        let (exponent, new_pos) = parse_power(tokens, pos + 1, descend(depth)?)?;
        return Ok((
            Expr::BinaryOp {
                op: Op::Pow,
                left: Box::new(base),
                right: Box::new(exponent),
            },
            new_pos,
        ));
    }

    Ok((base, pos))
}

fn parse_unary(tokens: &[Token], pos: usize, depth: usize) -> Result<(Expr, usize), String> {
    match tokens.get(pos) {
        // Unary plus is a no-op
        Some(Token::Glyph(Glyph::Plus)) => parse_unary(tokens, pos + 1, descend(depth)?),
        Some(Token::Glyph(Glyph::Minus)) => {
            let (expr, pos) = parse_unary(tokens, pos + 1, descend(depth)?)?;
            Ok((Expr::Negate(Box::new(expr)), pos))
        }
        _ => parse_primary(tokens, pos, depth),
    }
}

fn parse_primary(tokens: &[Token], pos: usize, depth: usize) -> Result<(Expr, usize), String> {
    match tokens.get(pos) {
        None => Err("Unexpected end of expression".to_string()),
        Some(Token::Number(n)) => Ok((Expr::Number(*n), pos + 1)),
        Some(Token::Glyph(Glyph::LParen)) => {
            let (expr, pos) = parse_add_sub(tokens, pos + 1, descend(depth)?)?;
            match tokens.get(pos) {
                Some(Token::Glyph(Glyph::RParen)) => Ok((expr, pos + 1)),
                Some(_) => Err("Expected closing parenthesis".to_string()),
                None => Err("Missing closing parenthesis".to_string()),
            }
        }
        Some(_) => Err(format!("Unexpected token at position {}", pos)),
    }
}
