//! Signal expression parsing
//!
//! The expression language is deliberately tiny: an expression is either a
//! single identifier or exactly one binary operator between two identifiers.
//! Operators are searched in the fixed order `-`, `*`, `/`. An expression
//! with mixed operators splits on the first one found in that order and keeps
//! the rest inside an operand name, which then fails lookup. Repeating the
//! chosen operator is rejected.

use crate::align::BinaryOp;
use crate::types::{AnalyzerError, Result};
use std::fmt;

/// Operators recognised by the parser, in lookup order
const OPERATOR_PRIORITY: [BinaryOp; 3] = [BinaryOp::Sub, BinaryOp::Mul, BinaryOp::Div];

/// A parsed signal expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// Reference to a raw channel alias or an earlier display name
    Ident(String),
    /// `left <op> right`
    Binary {
        op: BinaryOp,
        left: String,
        right: String,
    },
}

impl Expr {
    /// Parse an expression string
    pub fn parse(input: &str) -> Result<Self> {
        for op in OPERATOR_PRIORITY {
            if input.contains(op.symbol()) {
                return parse_binary(input, op);
            }
        }

        let ident = input.trim();
        if ident.is_empty() {
            return Err(AnalyzerError::InvalidExpression("empty expression".to_string()));
        }
        Ok(Expr::Ident(ident.to_string()))
    }

    /// Operand names in evaluation order
    pub fn operands(&self) -> Vec<&str> {
        match self {
            Expr::Ident(name) => vec![name.as_str()],
            Expr::Binary { left, right, .. } => vec![left.as_str(), right.as_str()],
        }
    }
}

fn parse_binary(input: &str, op: BinaryOp) -> Result<Expr> {
    let parts: Vec<&str> = input.split(op.symbol()).map(str::trim).collect();
    match parts.as_slice() {
        [left, right] if !left.is_empty() && !right.is_empty() => Ok(Expr::Binary {
            op,
            left: left.to_string(),
            right: right.to_string(),
        }),
        [_, _] => Err(AnalyzerError::InvalidExpression(format!(
            "missing operand in '{}'",
            input
        ))),
        _ => Err(AnalyzerError::InvalidExpression(format!(
            "expected exactly two operands around '{}' in '{}'",
            op, input
        ))),
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Ident(name) => write!(f, "{}", name),
            Expr::Binary { op, left, right } => write!(f, "{} {} {}", left, op, right),
        }
    }
}

/// Whitespace-separated tokens of an expression with operators removed
///
/// Used to find the raw channel aliases an expression may need; a token
/// that is not a known alias is simply ignored by the caller.
pub fn raw_tokens(input: &str) -> impl Iterator<Item = &str> {
    input
        .split(|c: char| c.is_whitespace() || OPERATOR_PRIORITY.iter().any(|op| op.symbol() == c))
        .filter(|token| !token.is_empty())
}
