//! Recursive-descent parser for the expression language.
//!
//! Grammar, loosest to tightest binding:
//!
//! ```text
//! chain          := conditional ("," conditional)*
//! conditional    := logicalOr ("?" conditional ":" conditional)?
//! logicalOr      := logicalAnd ("||" logicalAnd)*
//! logicalAnd     := equality ("&&" equality)*
//! equality       := relational (("===" | "!==" | "==" | "!=") relational)*
//! relational     := additive (("<" | ">" | "<=" | ">=") additive)*
//! additive       := multiplicative (("+" | "-") multiplicative)*
//! multiplicative := prefix (("*" | "/" | "%") prefix)*
//! prefix         := ("!" | "-" | "+") prefix | callChain
//! callChain      := primary ("." ident | "[" chain "]" | "(" args ")")*
//! primary        := number | string | keyword | ident | "(" chain ")"
//!                 | "[" elements "]" | "{" entries "}"
//! ```

use thiserror::Error;

use super::ast::{Expr, NumberLiteral};
use super::lexer::{Lexer, Token, TokenType};

/// A parse failure; the message names the offending token and column.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct SyntaxError {
    pub message: String,
}

/// Expression parser
pub struct Parser {
    lexer: Lexer,
}

impl Parser {
    pub fn new() -> Parser {
        Parser { lexer: Lexer::new() }
    }

    pub fn parse(&self, input: &str) -> Result<Expr, SyntaxError> {
        let tokens = self.lexer.tokenize(input);
        for token in &tokens {
            if token.is_error() {
                return Err(SyntaxError {
                    message: token.str_value.clone(),
                });
            }
        }
        if tokens.is_empty() {
            return Err(SyntaxError {
                message: "empty expression".to_string(),
            });
        }

        let mut state = ParseState { tokens, index: 0 };
        let result = state.parse_chain()?;
        if state.index < state.tokens.len() {
            return Err(state.unexpected());
        }
        Ok(result)
    }
}

impl Default for Parser {
    fn default() -> Self {
        Parser::new()
    }
}

struct ParseState {
    tokens: Vec<Token>,
    index: usize,
}

impl ParseState {
    fn current(&self) -> Option<&Token> {
        self.tokens.get(self.index)
    }

    fn advance(&mut self) {
        self.index += 1;
    }

    fn consume_optional_character(&mut self, code: char) -> bool {
        if let Some(token) = self.current() {
            if token.is_character(code) {
                self.advance();
                return true;
            }
        }
        false
    }

    fn consume_optional_operator(&mut self, op: &str) -> bool {
        if let Some(token) = self.current() {
            if token.is_operator(op) {
                self.advance();
                return true;
            }
        }
        false
    }

    fn consume_any_operator(&mut self, ops: &[&str]) -> Option<String> {
        if let Some(token) = self.current() {
            if token.token_type == TokenType::Operator && ops.contains(&token.str_value.as_str()) {
                let operator = token.str_value.clone();
                self.advance();
                return Some(operator);
            }
        }
        None
    }

    fn expect_character(&mut self, code: char) -> Result<(), SyntaxError> {
        if self.consume_optional_character(code) {
            Ok(())
        } else {
            Err(SyntaxError {
                message: match self.current() {
                    Some(token) => format!(
                        "expected character '{}' but found '{}' at column {}",
                        code, token.str_value, token.index
                    ),
                    None => format!("expected character '{}' but the expression ended", code),
                },
            })
        }
    }

    fn unexpected(&self) -> SyntaxError {
        SyntaxError {
            message: match self.current() {
                Some(token) => format!(
                    "unexpected token '{}' at column {}",
                    token.str_value, token.index
                ),
                None => "unexpected end of expression".to_string(),
            },
        }
    }

    /// chain := conditional ("," conditional)*
    fn parse_chain(&mut self) -> Result<Expr, SyntaxError> {
        let mut expressions = vec![self.parse_conditional()?];
        while self.consume_optional_character(',') {
            expressions.push(self.parse_conditional()?);
        }
        if expressions.len() == 1 {
            Ok(expressions.remove(0))
        } else {
            Ok(Expr::Chain { expressions })
        }
    }

    /// conditional := logicalOr ("?" conditional ":" conditional)?
    fn parse_conditional(&mut self) -> Result<Expr, SyntaxError> {
        let result = self.parse_logical_or()?;

        if self.consume_optional_operator("?") {
            let true_exp = self.parse_conditional()?;
            self.expect_character(':')?;
            let false_exp = self.parse_conditional()?; // Right-associative

            return Ok(Expr::Conditional {
                condition: Box::new(result),
                true_exp: Box::new(true_exp),
                false_exp: Box::new(false_exp),
            });
        }

        Ok(result)
    }

    fn parse_logical_or(&mut self) -> Result<Expr, SyntaxError> {
        let mut result = self.parse_logical_and()?;
        while self.consume_optional_operator("||") {
            let right = self.parse_logical_and()?;
            result = Expr::Binary {
                operation: "||".to_string(),
                left: Box::new(result),
                right: Box::new(right),
            };
        }
        Ok(result)
    }

    fn parse_logical_and(&mut self) -> Result<Expr, SyntaxError> {
        let mut result = self.parse_equality()?;
        while self.consume_optional_operator("&&") {
            let right = self.parse_equality()?;
            result = Expr::Binary {
                operation: "&&".to_string(),
                left: Box::new(result),
                right: Box::new(right),
            };
        }
        Ok(result)
    }

    fn parse_equality(&mut self) -> Result<Expr, SyntaxError> {
        let mut result = self.parse_relational()?;
        while let Some(operation) = self.consume_any_operator(&["===", "!==", "==", "!="]) {
            let right = self.parse_relational()?;
            result = Expr::Binary {
                operation,
                left: Box::new(result),
                right: Box::new(right),
            };
        }
        Ok(result)
    }

    fn parse_relational(&mut self) -> Result<Expr, SyntaxError> {
        let mut result = self.parse_additive()?;
        while let Some(operation) = self.consume_any_operator(&["<", ">", "<=", ">="]) {
            let right = self.parse_additive()?;
            result = Expr::Binary {
                operation,
                left: Box::new(result),
                right: Box::new(right),
            };
        }
        Ok(result)
    }

    fn parse_additive(&mut self) -> Result<Expr, SyntaxError> {
        let mut result = self.parse_multiplicative()?;
        while let Some(operation) = self.consume_any_operator(&["+", "-"]) {
            let right = self.parse_multiplicative()?;
            result = Expr::Binary {
                operation,
                left: Box::new(result),
                right: Box::new(right),
            };
        }
        Ok(result)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, SyntaxError> {
        let mut result = self.parse_prefix()?;
        while let Some(operation) = self.consume_any_operator(&["*", "/", "%"]) {
            let right = self.parse_prefix()?;
            result = Expr::Binary {
                operation,
                left: Box::new(result),
                right: Box::new(right),
            };
        }
        Ok(result)
    }

    fn parse_prefix(&mut self) -> Result<Expr, SyntaxError> {
        if self.consume_optional_operator("!") {
            let expression = self.parse_prefix()?;
            return Ok(Expr::PrefixNot {
                expression: Box::new(expression),
            });
        }
        if let Some(operator) = self.consume_any_operator(&["-", "+"]) {
            let expression = self.parse_prefix()?;
            return Ok(Expr::Unary {
                operator,
                expression: Box::new(expression),
            });
        }
        self.parse_call_chain()
    }

    /// callChain := primary ("." ident | "[" chain "]" | "(" args ")")*
    fn parse_call_chain(&mut self) -> Result<Expr, SyntaxError> {
        let mut result = self.parse_primary()?;
        loop {
            if self.consume_optional_character('.') {
                let name = self.expect_property_name()?;
                result = Expr::PropertyRead {
                    receiver: Box::new(result),
                    name,
                };
            } else if self.consume_optional_character('[') {
                let key = self.parse_chain()?;
                self.expect_character(']')?;
                result = Expr::KeyedRead {
                    receiver: Box::new(result),
                    key: Box::new(key),
                };
            } else if self.consume_optional_character('(') {
                let args = self.parse_expression_list(')')?;
                self.expect_character(')')?;
                result = Expr::Call {
                    receiver: Box::new(result),
                    args,
                };
            } else {
                break;
            }
        }
        Ok(result)
    }

    fn parse_primary(&mut self) -> Result<Expr, SyntaxError> {
        if self.consume_optional_character('(') {
            let result = self.parse_chain()?;
            self.expect_character(')')?;
            return Ok(result);
        }

        if self.consume_optional_character('[') {
            let expressions = self.parse_expression_list(']')?;
            self.expect_character(']')?;
            return Ok(Expr::LiteralArray { expressions });
        }

        if self.current().map_or(false, |t| t.is_character('{')) {
            return self.parse_literal_map();
        }

        let token = match self.current() {
            Some(token) => token.clone(),
            None => return Err(self.unexpected()),
        };

        if token.is_keyword_true() {
            self.advance();
            return Ok(Expr::LiteralBool(true));
        }
        if token.is_keyword_false() {
            self.advance();
            return Ok(Expr::LiteralBool(false));
        }
        if token.is_keyword_null() || token.is_keyword_undefined() {
            self.advance();
            return Ok(Expr::LiteralNull);
        }

        if token.is_identifier() {
            self.advance();
            return Ok(Expr::PropertyRead {
                receiver: Box::new(Expr::ImplicitReceiver),
                name: token.str_value,
            });
        }

        if token.is_number() {
            self.advance();
            let literal = if token.str_value.contains(&['.', 'e', 'E'][..]) {
                NumberLiteral::Float(token.num_value)
            } else {
                match token.str_value.parse::<i64>() {
                    Ok(i) => NumberLiteral::Int(i),
                    Err(_) => NumberLiteral::Float(token.num_value),
                }
            };
            return Ok(Expr::LiteralNumber(literal));
        }

        if token.is_string() {
            self.advance();
            return Ok(Expr::LiteralString(token.str_value));
        }

        Err(self.unexpected())
    }

    /// Comma-separated expressions up to (not consuming) `terminator`.
    /// A trailing comma is allowed.
    fn parse_expression_list(&mut self, terminator: char) -> Result<Vec<Expr>, SyntaxError> {
        let mut result = Vec::new();
        if self.current().map_or(false, |t| t.is_character(terminator)) {
            return Ok(result);
        }
        loop {
            result.push(self.parse_conditional()?);
            if !self.consume_optional_character(',') {
                break;
            }
            if self.current().map_or(false, |t| t.is_character(terminator)) {
                break;
            }
        }
        Ok(result)
    }

    fn parse_literal_map(&mut self) -> Result<Expr, SyntaxError> {
        self.expect_character('{')?;
        let mut keys = Vec::new();
        let mut values = Vec::new();

        if !self.current().map_or(false, |t| t.is_character('}')) {
            loop {
                let key = match self.current() {
                    Some(t) if t.is_identifier() || t.is_keyword() || t.is_string() => {
                        t.str_value.clone()
                    }
                    _ => return Err(self.unexpected()),
                };
                self.advance();
                self.expect_character(':')?;
                keys.push(key);
                values.push(self.parse_conditional()?);

                if !self.consume_optional_character(',') {
                    break;
                }
                if self.current().map_or(false, |t| t.is_character('}')) {
                    break;
                }
            }
        }

        self.expect_character('}')?;
        Ok(Expr::LiteralMap { keys, values })
    }

    fn expect_property_name(&mut self) -> Result<String, SyntaxError> {
        let name = match self.current() {
            Some(token) if token.is_identifier() => token.str_value.clone(),
            _ => return Err(self.unexpected()),
        };
        self.advance();
        Ok(name)
    }
}
