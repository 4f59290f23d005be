//! Expression AST.
//!
//! Nodes come out of the parser and are walked directly by the
//! evaluator; no intermediate form exists between the two.

use serde::{Deserialize, Serialize};

/// An expression node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Expr {
    /// The stand-in receiver of a bare identifier: `name` parses as a
    /// property read against the ambient scope.
    ImplicitReceiver,
    LiteralString(String),
    LiteralNumber(NumberLiteral),
    LiteralBool(bool),
    /// Covers both `null` and `undefined`.
    LiteralNull,
    LiteralArray {
        expressions: Vec<Expr>,
    },
    LiteralMap {
        keys: Vec<String>,
        values: Vec<Expr>,
    },
    PropertyRead {
        receiver: Box<Expr>,
        name: String,
    },
    KeyedRead {
        receiver: Box<Expr>,
        key: Box<Expr>,
    },
    Call {
        receiver: Box<Expr>,
        args: Vec<Expr>,
    },
    Binary {
        operation: String,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    PrefixNot {
        expression: Box<Expr>,
    },
    Unary {
        operator: String,
        expression: Box<Expr>,
    },
    Conditional {
        condition: Box<Expr>,
        true_exp: Box<Expr>,
        false_exp: Box<Expr>,
    },
    /// Comma sequence: all operands evaluate, the last one is the value.
    Chain {
        expressions: Vec<Expr>,
    },
}

/// Numeric literals keep their source form: `2` stays integral, `2.0`
/// becomes a float.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum NumberLiteral {
    Int(i64),
    Float(f64),
}
