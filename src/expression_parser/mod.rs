//! The embedded expression language: lexer, recursive-descent parser
//! and AST-walking evaluator.
//!
//! Snippets are parsed once at template compile time and evaluated
//! against a scope on every render.

pub mod ast;
pub mod evaluator;
pub mod lexer;
pub mod parser;

pub use ast::Expr;
pub use parser::{Parser, SyntaxError};

use crate::error::{CompileError, RenderError};
use crate::template::scope::Scope;
use crate::value::Value;

/// A parsed expression along with the snippet it came from. Parsing
/// happens while the template compiles; rendering only walks the AST.
#[derive(Debug, Clone)]
pub struct CompiledExpr {
    source: String,
    ast: Expr,
}

impl CompiledExpr {
    /// Parse a snippet; failures report the snippet and the offending
    /// token.
    pub fn parse(snippet: &str) -> Result<CompiledExpr, CompileError> {
        match Parser::new().parse(snippet) {
            Ok(ast) => Ok(CompiledExpr {
                source: snippet.to_string(),
                ast,
            }),
            Err(err) => Err(CompileError::ExpressionSyntax {
                snippet: snippet.to_string(),
                message: err.message,
            }),
        }
    }

    /// Evaluate against a scope.
    pub fn evaluate(&self, scope: &Scope<'_>) -> Result<Value, RenderError> {
        evaluator::evaluate(&self.ast, scope)
    }

    /// The original snippet text.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The parsed form.
    pub fn ast(&self) -> &Expr {
        &self.ast
    }
}

/// Check a snippet for syntax errors without keeping the result.
pub fn validate(snippet: &str) -> Result<(), CompileError> {
    CompiledExpr::parse(snippet).map(|_| ())
}
