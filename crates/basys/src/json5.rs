// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Tolerant-JSON parser for `basys.json` and component metadata blocks.
//!
//! The manifest and the embedded `<info>` blocks use a JSON superset:
//!
//! - `//` line comments and `/* */` block comments
//! - unquoted identifier keys and single-quoted keys
//! - single-quoted strings and `\`-continued multi-line strings
//! - trailing commas in objects and arrays
//!
//! The grammar lives entirely behind [`parse`]; the rest of the pipeline only
//! sees `serde_json::Value`, so the syntax extension could be swapped without
//! touching any caller.

use serde_json::{Map, Number, Value};
use thiserror::Error;

/// Short primer on the accepted syntax extensions, printed alongside fatal
/// manifest syntax errors.
pub const SYNTAX_HELP: &str = "\
The file uses an extension of the JSON format, which also accepts:
  - comments,
  - unquoted and single-quoted object keys,
  - trailing commas,
  - single-quoted and multi-line strings.";

/// A tolerant-JSON parse error with 1-indexed source location.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message} at line {line}, column {column}")]
pub struct Json5Error {
    /// Description of the syntax error.
    pub message: String,
    /// Line number where the error occurred (1-indexed).
    pub line: usize,
    /// Column number where the error occurred (1-indexed).
    pub column: usize,
}

/// Parses tolerant-JSON text into a `serde_json::Value`.
pub fn parse(text: &str) -> Result<Value, Json5Error> {
    let mut parser = Parser::new(text);
    parser.skip_trivia()?;
    let value = parser.parse_value()?;
    parser.skip_trivia()?;
    if parser.peek().is_some() {
        return Err(parser.error("unexpected trailing characters"));
    }
    Ok(value)
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
}

impl Parser {
    fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn error(&self, message: impl Into<String>) -> Json5Error {
        Json5Error {
            message: message.into(),
            line: self.line,
            column: self.column,
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), Json5Error> {
        match self.peek() {
            Some(c) if c == expected => {
                self.bump();
                Ok(())
            }
            Some(c) => Err(self.error(format!("expected {expected:?}, found {c:?}"))),
            None => Err(self.error(format!("expected {expected:?}, found end of input"))),
        }
    }

    /// Skips whitespace and comments.
    fn skip_trivia(&mut self) -> Result<(), Json5Error> {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.bump();
                }
                Some('/') => match self.peek_at(1) {
                    Some('/') => {
                        while let Some(c) = self.peek() {
                            if c == '\n' {
                                break;
                            }
                            self.bump();
                        }
                    }
                    Some('*') => {
                        self.bump();
                        self.bump();
                        loop {
                            match self.peek() {
                                Some('*') if self.peek_at(1) == Some('/') => {
                                    self.bump();
                                    self.bump();
                                    break;
                                }
                                Some(_) => {
                                    self.bump();
                                }
                                None => return Err(self.error("unterminated block comment")),
                            }
                        }
                    }
                    _ => return Err(self.error("unexpected character '/'")),
                },
                _ => return Ok(()),
            }
        }
    }

    fn parse_value(&mut self) -> Result<Value, Json5Error> {
        match self.peek() {
            Some('{') => self.parse_object(),
            Some('[') => self.parse_array(),
            Some('"') => Ok(Value::String(self.parse_string('"')?)),
            Some('\'') => Ok(Value::String(self.parse_string('\'')?)),
            Some(c) if c == '-' || c.is_ascii_digit() => self.parse_number(),
            Some(c) if c.is_alphabetic() => self.parse_word(),
            Some(c) => Err(self.error(format!("unexpected character {c:?}"))),
            None => Err(self.error("unexpected end of input")),
        }
    }

    fn parse_object(&mut self) -> Result<Value, Json5Error> {
        self.expect('{')?;
        let mut map = Map::new();
        loop {
            self.skip_trivia()?;
            match self.peek() {
                Some('}') => {
                    self.bump();
                    return Ok(Value::Object(map));
                }
                Some(_) => {
                    let key = self.parse_key()?;
                    self.skip_trivia()?;
                    self.expect(':')?;
                    self.skip_trivia()?;
                    let value = self.parse_value()?;
                    map.insert(key, value);
                    self.skip_trivia()?;
                    match self.peek() {
                        Some(',') => {
                            self.bump();
                        }
                        Some('}') => {}
                        Some(c) => {
                            return Err(self.error(format!("expected ',' or '}}', found {c:?}")))
                        }
                        None => return Err(self.error("unterminated object")),
                    }
                }
                None => return Err(self.error("unterminated object")),
            }
        }
    }

    fn parse_array(&mut self) -> Result<Value, Json5Error> {
        self.expect('[')?;
        let mut items = Vec::new();
        loop {
            self.skip_trivia()?;
            match self.peek() {
                Some(']') => {
                    self.bump();
                    return Ok(Value::Array(items));
                }
                Some(_) => {
                    items.push(self.parse_value()?);
                    self.skip_trivia()?;
                    match self.peek() {
                        Some(',') => {
                            self.bump();
                        }
                        Some(']') => {}
                        Some(c) => {
                            return Err(self.error(format!("expected ',' or ']', found {c:?}")))
                        }
                        None => return Err(self.error("unterminated array")),
                    }
                }
                None => return Err(self.error("unterminated array")),
            }
        }
    }

    /// Parses an object key: quoted string or bare identifier.
    fn parse_key(&mut self) -> Result<String, Json5Error> {
        match self.peek() {
            Some('"') => self.parse_string('"'),
            Some('\'') => self.parse_string('\''),
            Some(c) if c.is_alphabetic() || c == '_' || c == '$' => {
                let mut key = String::new();
                while let Some(c) = self.peek() {
                    if c.is_alphanumeric() || c == '_' || c == '$' {
                        key.push(c);
                        self.bump();
                    } else {
                        break;
                    }
                }
                Ok(key)
            }
            Some(c) => Err(self.error(format!("expected object key, found {c:?}"))),
            None => Err(self.error("expected object key, found end of input")),
        }
    }

    fn parse_string(&mut self, quote: char) -> Result<String, Json5Error> {
        self.expect(quote)?;
        let mut out = String::new();
        loop {
            match self.peek() {
                Some(c) if c == quote => {
                    self.bump();
                    return Ok(out);
                }
                Some('\\') => {
                    self.bump();
                    match self.peek() {
                        // Line continuation: a backslash before a newline
                        // joins the physical lines into one logical string.
                        Some('\n') => {
                            self.bump();
                        }
                        Some('\r') => {
                            self.bump();
                            if self.peek() == Some('\n') {
                                self.bump();
                            }
                        }
                        Some('n') => {
                            out.push('\n');
                            self.bump();
                        }
                        Some('t') => {
                            out.push('\t');
                            self.bump();
                        }
                        Some('r') => {
                            out.push('\r');
                            self.bump();
                        }
                        Some('b') => {
                            out.push('\u{0008}');
                            self.bump();
                        }
                        Some('f') => {
                            out.push('\u{000C}');
                            self.bump();
                        }
                        Some('u') => {
                            self.bump();
                            let mut code = 0u32;
                            for _ in 0..4 {
                                let digit = self
                                    .peek()
                                    .and_then(|c| c.to_digit(16))
                                    .ok_or_else(|| self.error("invalid unicode escape"))?;
                                code = code * 16 + digit;
                                self.bump();
                            }
                            let c = char::from_u32(code)
                                .ok_or_else(|| self.error("invalid unicode escape"))?;
                            out.push(c);
                        }
                        Some(c) if c == quote || c == '\\' || c == '/' || c == '"' || c == '\'' => {
                            out.push(c);
                            self.bump();
                        }
                        Some(c) => return Err(self.error(format!("invalid escape {c:?}"))),
                        None => return Err(self.error("unterminated string")),
                    }
                }
                Some('\n') => return Err(self.error("unterminated string")),
                Some(c) => {
                    out.push(c);
                    self.bump();
                }
                None => return Err(self.error("unterminated string")),
            }
        }
    }

    fn parse_number(&mut self) -> Result<Value, Json5Error> {
        let mut text = String::new();
        if self.peek() == Some('-') {
            text.push('-');
            self.bump();
        }
        let mut is_float = false;
        while let Some(c) = self.peek() {
            match c {
                '0'..='9' => {
                    text.push(c);
                    self.bump();
                }
                '.' | 'e' | 'E' => {
                    is_float = true;
                    text.push(c);
                    self.bump();
                }
                '+' | '-' if matches!(text.chars().last(), Some('e') | Some('E')) => {
                    text.push(c);
                    self.bump();
                }
                _ => break,
            }
        }
        if !is_float {
            if let Ok(n) = text.parse::<i64>() {
                return Ok(Value::Number(Number::from(n)));
            }
        }
        let n = text
            .parse::<f64>()
            .map_err(|_| self.error(format!("invalid number {text:?}")))?;
        Number::from_f64(n)
            .map(Value::Number)
            .ok_or_else(|| self.error(format!("invalid number {text:?}")))
    }

    fn parse_word(&mut self) -> Result<Value, Json5Error> {
        let mut word = String::new();
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() {
                word.push(c);
                self.bump();
            } else {
                break;
            }
        }
        match word.as_str() {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            "null" => Ok(Value::Null),
            _ => Err(self.error(format!("unexpected word {word:?}"))),
        }
    }
}
