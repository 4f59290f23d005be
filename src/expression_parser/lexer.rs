//! Expression lexer.
//!
//! Tokenizes embedded expression snippets into tokens for parsing.

use serde::{Deserialize, Serialize};

use crate::chars;

/// Token types in expressions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum TokenType {
    Character = 0,
    Identifier = 1,
    Keyword = 2,
    String = 3,
    Operator = 4,
    Number = 5,
    Error = 6,
}

/// Token representation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub index: usize,
    pub end: usize,
    pub token_type: TokenType,
    pub num_value: f64,
    pub str_value: String,
}

impl Token {
    pub fn new(
        index: usize,
        end: usize,
        token_type: TokenType,
        num_value: f64,
        str_value: String,
    ) -> Self {
        Token {
            index,
            end,
            token_type,
            num_value,
            str_value,
        }
    }

    pub fn operator(index: usize, end: usize, str_value: &str) -> Self {
        Token::new(index, end, TokenType::Operator, 0.0, str_value.to_string())
    }

    pub fn is_character(&self, code: char) -> bool {
        self.token_type == TokenType::Character && self.str_value.chars().next() == Some(code)
    }

    pub fn is_number(&self) -> bool {
        self.token_type == TokenType::Number
    }

    pub fn is_string(&self) -> bool {
        self.token_type == TokenType::String
    }

    pub fn is_identifier(&self) -> bool {
        self.token_type == TokenType::Identifier
    }

    pub fn is_keyword(&self) -> bool {
        self.token_type == TokenType::Keyword
    }

    pub fn is_operator(&self, operator: &str) -> bool {
        self.token_type == TokenType::Operator && self.str_value == operator
    }

    pub fn is_keyword_null(&self) -> bool {
        self.token_type == TokenType::Keyword && self.str_value == "null"
    }

    pub fn is_keyword_undefined(&self) -> bool {
        self.token_type == TokenType::Keyword && self.str_value == "undefined"
    }

    pub fn is_keyword_true(&self) -> bool {
        self.token_type == TokenType::Keyword && self.str_value == "true"
    }

    pub fn is_keyword_false(&self) -> bool {
        self.token_type == TokenType::Keyword && self.str_value == "false"
    }

    pub fn is_error(&self) -> bool {
        self.token_type == TokenType::Error
    }
}

/// Helper functions for creating tokens
pub fn new_character_token(index: usize, end: usize, code: char) -> Token {
    Token::new(
        index,
        end,
        TokenType::Character,
        code as u32 as f64,
        code.to_string(),
    )
}

pub fn new_identifier_token(index: usize, end: usize, text: String) -> Token {
    Token::new(index, end, TokenType::Identifier, 0.0, text)
}

pub fn new_keyword_token(index: usize, end: usize, text: String) -> Token {
    Token::new(index, end, TokenType::Keyword, 0.0, text)
}

pub fn new_error_token(index: usize, end: usize, message: String) -> Token {
    Token::new(index, end, TokenType::Error, 0.0, message)
}

/// Expression lexer
pub struct Lexer;

impl Lexer {
    pub fn new() -> Self {
        Lexer
    }

    pub fn tokenize(&self, text: &str) -> Vec<Token> {
        Scanner::new(text).scan()
    }
}

impl Default for Lexer {
    fn default() -> Self {
        Lexer::new()
    }
}

// Expression keywords
const KEYWORDS: &[&str] = &["null", "undefined", "true", "false"];

/// Scanner for tokenizing input
struct Scanner {
    input: String,
    length: usize,
    index: usize,
    peek: char,
    tokens: Vec<Token>,
}

impl Scanner {
    fn new(input: &str) -> Self {
        let peek = input.chars().next().unwrap_or(chars::EOF);
        Scanner {
            input: input.to_string(),
            length: input.len(),
            index: 0,
            peek,
            tokens: Vec::new(),
        }
    }

    fn scan(mut self) -> Vec<Token> {
        while let Some(token) = self.scan_token() {
            self.tokens.push(token);
        }
        self.tokens
    }

    fn advance(&mut self) {
        self.index += self.peek.len_utf8();
        self.peek = if self.index < self.length {
            self.input[self.index..].chars().next().unwrap_or(chars::EOF)
        } else {
            chars::EOF
        };
    }

    fn scan_token(&mut self) -> Option<Token> {
        // Skip whitespace
        while self.index < self.length && chars::is_whitespace(self.peek) {
            self.advance();
        }

        if self.index >= self.length {
            return None;
        }

        let start = self.index;
        let ch = self.peek;

        // Handle identifiers and keywords
        if chars::is_identifier_start(ch) {
            return Some(self.scan_identifier());
        }

        // Handle numbers
        if chars::is_digit(ch) {
            return Some(self.scan_number(start));
        }

        // Handle operators and special characters
        match ch {
            chars::PERIOD => {
                self.advance();
                if chars::is_digit(self.peek) {
                    return Some(self.scan_number(start));
                }
                Some(new_character_token(start, self.index, chars::PERIOD))
            }
            chars::LPAREN
            | chars::RPAREN
            | chars::LBRACKET
            | chars::RBRACKET
            | chars::LBRACE
            | chars::RBRACE
            | chars::COMMA
            | chars::COLON
            | chars::SEMICOLON => Some(self.scan_character(start, ch)),
            chars::SQ | chars::DQ => Some(self.scan_string(ch)),
            chars::PLUS | chars::MINUS | chars::STAR | chars::SLASH | chars::PERCENT => {
                self.advance();
                Some(Token::operator(start, self.index, &ch.to_string()))
            }
            chars::AMPERSAND => {
                self.advance();
                if self.peek == chars::AMPERSAND {
                    self.advance();
                    return Some(Token::operator(start, self.index, "&&"));
                }
                Some(Token::operator(start, self.index, "&"))
            }
            chars::BAR => {
                self.advance();
                if self.peek == chars::BAR {
                    self.advance();
                    return Some(Token::operator(start, self.index, "||"));
                }
                Some(Token::operator(start, self.index, "|"))
            }
            chars::LT => {
                self.advance();
                if self.peek == chars::EQ {
                    self.advance();
                    return Some(Token::operator(start, self.index, "<="));
                }
                Some(Token::operator(start, self.index, "<"))
            }
            chars::GT => {
                self.advance();
                if self.peek == chars::EQ {
                    self.advance();
                    return Some(Token::operator(start, self.index, ">="));
                }
                Some(Token::operator(start, self.index, ">"))
            }
            chars::QUESTION => {
                self.advance();
                Some(Token::operator(start, self.index, "?"))
            }
            chars::BANG => {
                self.advance();
                if self.peek == chars::EQ {
                    self.advance();
                    if self.peek == chars::EQ {
                        self.advance();
                        return Some(Token::operator(start, self.index, "!=="));
                    }
                    return Some(Token::operator(start, self.index, "!="));
                }
                Some(Token::operator(start, self.index, "!"))
            }
            chars::EQ => {
                self.advance();
                if self.peek == chars::EQ {
                    self.advance();
                    if self.peek == chars::EQ {
                        self.advance();
                        return Some(Token::operator(start, self.index, "==="));
                    }
                    return Some(Token::operator(start, self.index, "=="));
                }
                Some(Token::operator(start, self.index, "="))
            }
            _ => {
                self.advance();
                Some(new_error_token(
                    start,
                    self.index,
                    format!(
                        "invalid character [{}] at column {} in expression [{}]",
                        ch, start, self.input
                    ),
                ))
            }
        }
    }

    fn scan_character(&mut self, start: usize, ch: char) -> Token {
        self.advance();
        new_character_token(start, self.index, ch)
    }

    fn scan_identifier(&mut self) -> Token {
        let start = self.index;
        self.advance();

        while self.index < self.length && chars::is_identifier_part(self.peek) {
            self.advance();
        }

        let str_value = self.input[start..self.index].to_string();
        if KEYWORDS.contains(&str_value.as_str()) {
            new_keyword_token(start, self.index, str_value)
        } else {
            new_identifier_token(start, self.index, str_value)
        }
    }

    fn scan_number(&mut self, start: usize) -> Token {
        while self.index < self.length {
            if chars::is_digit(self.peek) {
                self.advance();
            } else if self.peek == chars::PERIOD {
                self.advance();
            } else if self.peek == chars::e || self.peek == chars::E {
                self.advance();
                if self.peek == chars::PLUS || self.peek == chars::MINUS {
                    self.advance();
                }
            } else {
                break;
            }
        }

        let str_value = self.input[start..self.index].to_string();

        // Handle invalid exponents like '1e' or '1e+'
        if str_value.ends_with(chars::e)
            || str_value.ends_with(chars::E)
            || str_value.ends_with(chars::PLUS)
            || str_value.ends_with(chars::MINUS)
        {
            return new_error_token(
                self.index,
                self.index,
                format!(
                    "invalid exponent at column {} in expression [{}]",
                    self.index, self.input
                ),
            );
        }

        match str_value.parse::<f64>() {
            Ok(num_value) => Token::new(start, self.index, TokenType::Number, num_value, str_value),
            Err(_) => new_error_token(
                start,
                self.index,
                format!(
                    "invalid number [{}] at column {} in expression [{}]",
                    str_value, start, self.input
                ),
            ),
        }
    }

    fn scan_string(&mut self, quote: char) -> Token {
        let start = self.index;
        self.advance(); // Skip opening quote

        let mut buffer = String::new();
        let mut escaped = false;

        while self.index < self.length {
            let ch = self.peek;

            if escaped {
                if ch == chars::u {
                    // Unicode escape \uXXXX
                    self.advance();
                    let mut hex = String::new();
                    for _ in 0..4 {
                        if self.index < self.length && chars::is_ascii_hex_digit(self.peek) {
                            hex.push(self.peek);
                            self.advance();
                        } else {
                            break;
                        }
                    }
                    let code = if hex.len() == 4 {
                        u32::from_str_radix(&hex, 16).ok().and_then(std::char::from_u32)
                    } else {
                        None
                    };
                    match code {
                        Some(c) => buffer.push(c),
                        None => {
                            return new_error_token(
                                start,
                                self.index,
                                format!(
                                    "invalid unicode escape [\\u{}] at column {} in expression [{}]",
                                    hex, start, self.input
                                ),
                            );
                        }
                    }
                } else {
                    buffer.push(match ch {
                        chars::n => '\n',
                        chars::r => '\r',
                        chars::t => '\t',
                        chars::f => '\x0c',
                        chars::v => '\x0b',
                        _ => ch,
                    });
                    self.advance();
                }
                escaped = false;
            } else if ch == chars::BACKSLASH {
                escaped = true;
                self.advance();
            } else if ch == quote {
                self.advance(); // Skip closing quote
                return Token::new(start, self.index, TokenType::String, 0.0, buffer);
            } else {
                buffer.push(ch);
                self.advance();
            }
        }

        // Unterminated string
        new_error_token(
            start,
            self.index,
            format!(
                "unterminated quote at column {} in expression [{}]",
                start, self.input
            ),
        )
    }
}
