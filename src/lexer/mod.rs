//! Lexer for the command language
//!
//! Turns one input line into a [`TokenStream`]. Tokens only record their kind
//! and byte offset; lengths and payloads are recomputed from the line on
//! demand, so a token can never disagree with the text it came from.
//!
//! # Example
//!
//! ```rust
//! use pwmgr::lexer::{tokenize, TokenKind};
//!
//! let stream = tokenize("add account foo").unwrap();
//! let kinds: Vec<TokenKind> = stream.tokens().iter().map(|t| t.kind).collect();
//! assert_eq!(kinds, vec![TokenKind::Word; 3]);
//! ```

mod scan;
mod token;

use std::fmt;

use thiserror::Error;

use scan::{ByteClass, StringExtent};
pub use token::{Token, TokenKind, Value};

/// Longest word-class run accepted by the lexer, in bytes
pub const MAX_WORD_LEN: usize = 255;

/// Why a line failed to tokenize
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexErrorKind {
    /// Byte outside every class (including a stray escape)
    UnrecognizedByte,
    /// Line ended inside a string
    UnterminatedString,
    /// Escape inside a string not followed by a quote
    InvalidEscape,
    /// Word run longer than [`MAX_WORD_LEN`]
    WordTooLong,
    /// Digit run that does not fit in a `u64`
    NumberTooLarge,
}

impl fmt::Display for LexErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::UnrecognizedByte => "unrecognized character",
            Self::UnterminatedString => "unterminated string",
            Self::InvalidEscape => "only '\"' may follow '\\' inside a string",
            Self::WordTooLong => "word exceeds the maximum length",
            Self::NumberTooLarge => "number is too large",
        };
        f.write_str(text)
    }
}

/// A syntax error with the byte offset it points at
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("{kind} at position {offset}")]
pub struct LexError {
    pub kind: LexErrorKind,
    pub offset: usize,
}

impl LexError {
    pub fn new(kind: LexErrorKind, offset: usize) -> Self {
        Self { kind, offset }
    }
}

/// Tokens of one line plus a read cursor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenStream<'a> {
    line: &'a str,
    tokens: Vec<Token>,
    cursor: usize,
}

impl<'a> TokenStream<'a> {
    /// The line the tokens were read from
    pub fn line(&self) -> &'a str {
        self.line
    }

    /// All tokens, including already consumed ones
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn has_next(&self) -> bool {
        self.cursor < self.tokens.len()
    }

    /// Number of tokens not yet consumed
    pub fn remaining(&self) -> usize {
        self.tokens.len() - self.cursor
    }

    pub fn peek_token(&self) -> Option<Token> {
        self.tokens.get(self.cursor).copied()
    }

    pub fn next_token(&mut self) -> Option<Token> {
        let token = self.peek_token()?;
        self.cursor += 1;
        Some(token)
    }

    /// Byte length of a token, recomputed from its offset
    pub fn token_len(&self, token: Token) -> usize {
        let bytes = self.line.as_bytes();
        match token.kind {
            TokenKind::Word | TokenKind::Number => scan::word_run_len(bytes, token.offset),
            TokenKind::String => match scan::string_extent(bytes, token.offset) {
                StringExtent::Closed(len) => len,
                StringExtent::BadEscape(_) | StringExtent::Unterminated => {
                    bytes.len() - token.offset
                }
            },
            _ => 1,
        }
    }

    /// Raw text of a token as it appears in the line
    pub fn text(&self, token: Token) -> &'a str {
        let line = self.line;
        &line[token.offset..token.offset + self.token_len(token)]
    }

    /// Payload of a literal token; punctuation has none
    pub fn value(&self, token: Token) -> Option<Value<'a>> {
        let text = self.text(token);
        match token.kind {
            TokenKind::Word => Some(Value::Word(text)),
            TokenKind::String => Some(Value::Str(&text[1..text.len() - 1])),
            // tokenize rejects digit runs that overflow
            TokenKind::Number => Some(Value::Number {
                value: text.parse().unwrap_or(u64::MAX),
                literal: text,
            }),
            _ => None,
        }
    }
}

/// Split a line into tokens
///
/// Empty and whitespace-only lines give an empty stream.
pub fn tokenize(line: &str) -> Result<TokenStream<'_>, LexError> {
    let bytes = line.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        match scan::classify(bytes[pos]) {
            ByteClass::Space => pos += 1,
            ByteClass::Word => {
                let len = scan::word_run_len(bytes, pos);
                if len > MAX_WORD_LEN {
                    return Err(LexError::new(LexErrorKind::WordTooLong, pos));
                }
                let run = &bytes[pos..pos + len];
                let kind = scan::word_kind(run);
                if kind == TokenKind::Number && line[pos..pos + len].parse::<u64>().is_err() {
                    return Err(LexError::new(LexErrorKind::NumberTooLarge, pos));
                }
                tokens.push(Token::new(kind, pos));
                pos += len;
            }
            ByteClass::Quote => match scan::string_extent(bytes, pos) {
                StringExtent::Closed(len) => {
                    tokens.push(Token::new(TokenKind::String, pos));
                    pos += len;
                }
                StringExtent::BadEscape(at) => {
                    return Err(LexError::new(LexErrorKind::InvalidEscape, at));
                }
                StringExtent::Unterminated => {
                    return Err(LexError::new(LexErrorKind::UnterminatedString, pos));
                }
            },
            ByteClass::Punctuation(kind) => {
                tokens.push(Token::new(kind, pos));
                pos += 1;
            }
            ByteClass::Escape | ByteClass::Unrecognized => {
                return Err(LexError::new(LexErrorKind::UnrecognizedByte, pos));
            }
        }
    }

    Ok(TokenStream {
        line,
        tokens,
        cursor: 0,
    })
}
