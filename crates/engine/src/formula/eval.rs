// Calculation evaluator - evaluates the AST produced by the parser

use std::fmt;

use super::parser::{parse, Expr, Op};

/// The marker rendered in place of a result when evaluation fails.
pub const ERROR_MARKER: &str = "Error";

/// Why a calculation string could not be evaluated.
#[derive(Debug, Clone, PartialEq)]
pub enum EvalError {
    /// Malformed calculation string (parser message)
    Syntax(String),
    /// Division with a zero divisor
    DivByZero,
    /// Result overflowed or is otherwise not a finite number
    NonFinite,
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalError::Syntax(msg) => write!(f, "syntax error: {}", msg),
            EvalError::DivByZero => write!(f, "division by zero"),
            EvalError::NonFinite => write!(f, "result is not a finite number"),
        }
    }
}

impl std::error::Error for EvalError {}

#[derive(Debug, Clone, PartialEq)]
pub enum EvalResult {
    /// Nothing to evaluate (blank calculation string)
    Empty,
    Number(f64),
    Error(EvalError),
}

impl EvalResult {
    pub fn to_display(&self) -> String {
        match self {
            EvalResult::Empty => String::new(),
            EvalResult::Number(n) => format_number(*n),
            EvalResult::Error(_) => ERROR_MARKER.to_string(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, EvalResult::Error(_))
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            EvalResult::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for EvalResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_display())
    }
}

/// Shortest decimal text for a value. Never uses exponent notation, so the
/// output can be fed straight back into the tokenizer.
pub fn format_number(n: f64) -> String {
    if n == 0.0 {
        // Avoid "-0"
        return "0".to_string();
    }
    format!("{}", n)
}

/// Evaluate a calculation string. Never panics; every failure becomes
/// `EvalResult::Error`.
pub fn evaluate(calculation: &str) -> EvalResult {
    if calculation.trim().is_empty() {
        return EvalResult::Empty;
    }

    let expr = match parse(calculation) {
        Ok(expr) => expr,
        Err(msg) => return EvalResult::Error(EvalError::Syntax(msg)),
    };

    match evaluate_expr(&expr) {
        Ok(n) if n.is_finite() => EvalResult::Number(n),
        Ok(_) => EvalResult::Error(EvalError::NonFinite),
        Err(e) => EvalResult::Error(e),
    }
}

pub fn evaluate_expr(expr: &Expr) -> Result<f64, EvalError> {
    match expr {
        Expr::Number(n) => Ok(*n),
        Expr::Negate(inner) => Ok(-evaluate_expr(inner)?),
        Expr::BinaryOp { op, left, right } => {
            let left_val = evaluate_expr(left)?;
            let right_val = evaluate_expr(right)?;

            let result = match op {
                Op::Add => left_val + right_val,
                Op::Sub => left_val - right_val,
                Op::Mul => left_val * right_val,
                Op::Div => {
                    if right_val == 0.0 {
                        return Err(EvalError::DivByZero);
                    }
                    left_val / right_val
                }
                Op::Pow => left_val.powf(right_val),
            };

            if result.is_finite() {
                Ok(result)
            } else {
                Err(EvalError::NonFinite)
            }
        }
    }
}
