//! Byte classification and extent scanning
//!
//! These functions are pure: given the same line and start offset they always
//! produce the same class and extent. The lexer uses them to build tokens and
//! the token stream uses them again to recover token lengths.

use super::token::TokenKind;

/// Class of a single input byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ByteClass {
    Space,
    Word,
    Quote,
    Escape,
    Punctuation(TokenKind),
    Unrecognized,
}

pub(crate) const QUOTE: u8 = b'"';
pub(crate) const ESCAPE: u8 = b'\\';

pub(crate) fn classify(byte: u8) -> ByteClass {
    match byte {
        b' ' | b'\t' | 0x0b | b'\r' | 0x0c => ByteClass::Space,
        b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'_' => ByteClass::Word,
        QUOTE => ByteClass::Quote,
        ESCAPE => ByteClass::Escape,
        other => match TokenKind::from_punctuation(other) {
            Some(kind) => ByteClass::Punctuation(kind),
            None => ByteClass::Unrecognized,
        },
    }
}

/// Length of the word-class run starting at `start`
pub(crate) fn word_run_len(bytes: &[u8], start: usize) -> usize {
    bytes[start..]
        .iter()
        .take_while(|&&b| classify(b) == ByteClass::Word)
        .count()
}

/// Kind of a word-class run: all digits is a number, anything else a word
pub(crate) fn word_kind(run: &[u8]) -> TokenKind {
    if run.iter().all(u8::is_ascii_digit) {
        TokenKind::Number
    } else {
        TokenKind::Word
    }
}

/// Outcome of scanning a string that begins with a quote at `start`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StringExtent {
    /// Closed string; length includes both quotes
    Closed(usize),
    /// An escape was followed by something other than a quote
    BadEscape(usize),
    /// The line ended inside the string
    Unterminated,
}

pub(crate) fn string_extent(bytes: &[u8], start: usize) -> StringExtent {
    let mut pos = start + 1;
    while pos < bytes.len() {
        match bytes[pos] {
            QUOTE => return StringExtent::Closed(pos + 1 - start),
            ESCAPE => match bytes.get(pos + 1) {
                Some(&QUOTE) => pos += 2,
                Some(_) => return StringExtent::BadEscape(pos + 1),
                None => return StringExtent::Unterminated,
            },
            _ => pos += 1,
        }
    }
    StringExtent::Unterminated
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(classify(b' '), ByteClass::Space);
        assert_eq!(classify(b'\t'), ByteClass::Space);
        assert_eq!(classify(b'x'), ByteClass::Word);
        assert_eq!(classify(b'_'), ByteClass::Word);
        assert_eq!(classify(b'9'), ByteClass::Word);
        assert_eq!(classify(b'"'), ByteClass::Quote);
        assert_eq!(classify(b'\\'), ByteClass::Escape);
        assert_eq!(classify(b'='), ByteClass::Punctuation(TokenKind::Equals));
        assert_eq!(classify(b'$'), ByteClass::Unrecognized);
        assert_eq!(classify(0xc3), ByteClass::Unrecognized);
    }

    #[test]
    fn test_word_run() {
        let line = b"abc_12 rest";
        assert_eq!(word_run_len(line, 0), 6);
        assert_eq!(word_run_len(line, 7), 4);
        assert_eq!(word_kind(b"123"), TokenKind::Number);
        assert_eq!(word_kind(b"12a"), TokenKind::Word);
    }

    #[test]
    fn test_string_extent() {
        assert_eq!(string_extent(br#""hi" x"#, 0), StringExtent::Closed(4));
        assert_eq!(string_extent(br#""a\"b""#, 0), StringExtent::Closed(6));
        assert_eq!(string_extent(br#""a\nb""#, 0), StringExtent::BadEscape(3));
        assert_eq!(string_extent(br#""open"#, 0), StringExtent::Unterminated);
        assert_eq!(string_extent(br#""trailing\"#, 0), StringExtent::Unterminated);
    }
}
