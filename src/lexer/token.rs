//! Token and value types produced by the lexer

use std::fmt;

/// Kind of a lexed token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Run of `[A-Za-z0-9_]` that is not purely numeric
    Word,
    /// Double-quoted string, quotes included in the token extent
    String,
    /// Run of ASCII digits
    Number,
    Colon,
    Dot,
    Comma,
    Percent,
    Exclam,
    Question,
    Hash,
    At,
    Plus,
    Minus,
    Equals,
}

impl TokenKind {
    /// Map a punctuation byte to its token kind
    pub fn from_punctuation(byte: u8) -> Option<Self> {
        let kind = match byte {
            b':' => Self::Colon,
            b'.' => Self::Dot,
            b',' => Self::Comma,
            b'%' => Self::Percent,
            b'!' => Self::Exclam,
            b'?' => Self::Question,
            b'#' => Self::Hash,
            b'@' => Self::At,
            b'+' => Self::Plus,
            b'-' => Self::Minus,
            b'=' => Self::Equals,
            _ => return None,
        };
        Some(kind)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Word => "word",
            Self::String => "string",
            Self::Number => "number",
            Self::Colon => "':'",
            Self::Dot => "'.'",
            Self::Comma => "','",
            Self::Percent => "'%'",
            Self::Exclam => "'!'",
            Self::Question => "'?'",
            Self::Hash => "'#'",
            Self::At => "'@'",
            Self::Plus => "'+'",
            Self::Minus => "'-'",
            Self::Equals => "'='",
        };
        f.write_str(name)
    }
}

/// A lexed token
///
/// Only the kind and the byte offset are stored. The length is re-derived
/// from the source line whenever it is needed, see
/// [`TokenStream::token_len`](super::TokenStream::token_len).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub offset: usize,
}

impl Token {
    pub fn new(kind: TokenKind, offset: usize) -> Self {
        Self { kind, offset }
    }
}

/// Materialized payload of a literal token, borrowed from the input line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value<'a> {
    Word(&'a str),
    /// String contents without the surrounding quotes; escapes are kept
    Str(&'a str),
    Number { value: u64, literal: &'a str },
}

impl<'a> Value<'a> {
    /// The text of the value as it appeared in the line
    pub fn as_str(&self) -> &'a str {
        match self {
            Self::Word(word) => word,
            Self::Str(string) => string,
            Self::Number { literal, .. } => literal,
        }
    }

    pub fn kind(&self) -> TokenKind {
        match self {
            Self::Word(_) => TokenKind::Word,
            Self::Str(_) => TokenKind::String,
            Self::Number { .. } => TokenKind::Number,
        }
    }
}

impl fmt::Display for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
