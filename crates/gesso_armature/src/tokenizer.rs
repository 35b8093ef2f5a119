//! Low-level scanning shared by the markup parser and the script lexer.
//!
//! The [`Scanner`] owns the line table so every produced token carries its
//! line/column location.

use gesso_carton::{CompactString, LineIndex};
use gesso_relief::{Position, SourceLocation, Span, Token, TokenKind};

/// Character codes for fast comparison
pub mod char_codes {
    pub const TAB: u8 = 0x09;
    pub const NEWLINE: u8 = 0x0A;
    pub const CARRIAGE_RETURN: u8 = 0x0D;
    pub const SPACE: u8 = 0x20;
    pub const EXCLAMATION_MARK: u8 = 0x21;
    pub const DOUBLE_QUOTE: u8 = 0x22;
    pub const NUMBER: u8 = 0x23;
    pub const DOLLAR: u8 = 0x24;
    pub const SINGLE_QUOTE: u8 = 0x27;
    pub const DOT: u8 = 0x2E;
    pub const SLASH: u8 = 0x2F;
    pub const ZERO: u8 = 0x30;
    pub const NINE: u8 = 0x39;
    pub const LT: u8 = 0x3C;
    pub const EQ: u8 = 0x3D;
    pub const GT: u8 = 0x3E;
    pub const BACKSLASH: u8 = 0x5C;
    pub const UNDERSCORE: u8 = 0x5F;
    pub const GRAVE_ACCENT: u8 = 0x60;
    pub const LEFT_BRACE: u8 = 0x7B;
    pub const RIGHT_BRACE: u8 = 0x7D;
}

use char_codes::*;

/// Token factory over one source text
#[derive(Debug)]
pub struct Scanner<'a> {
    source: &'a str,
    lines: LineIndex,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            lines: LineIndex::new(source),
        }
    }

    #[inline]
    pub fn source(&self) -> &'a str {
        self.source
    }

    #[inline]
    pub fn bytes(&self) -> &'a [u8] {
        self.source.as_bytes()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.source.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }

    pub fn position(&self, offset: usize) -> Position {
        let (line, column) = self.lines.position(self.source, offset as u32);
        Position::new(offset as u32, line, column)
    }

    /// Build a token for `source[start..end]`
    pub fn token(&self, kind: TokenKind, start: usize, end: usize) -> Token {
        Token {
            kind,
            value: CompactString::new(&self.source[start..end]),
            span: Span::new(start as u32, end as u32),
            loc: SourceLocation {
                start: self.position(start),
                end: self.position(end),
            },
        }
    }

    /// Offset of the next char boundary after `pos`
    #[inline]
    pub fn next_char_end(&self, pos: usize) -> usize {
        self.source[pos..]
            .chars()
            .next()
            .map_or(self.len(), |c| pos + c.len_utf8())
    }

    /// Check if `needle` occurs at `pos`
    #[inline]
    pub fn starts_with(&self, pos: usize, needle: &str) -> bool {
        self.bytes()
            .get(pos..)
            .is_some_and(|rest| rest.starts_with(needle.as_bytes()))
    }

    /// Find `needle` at or after `from`
    pub fn find(&self, from: usize, needle: &str) -> Option<usize> {
        let haystack = self.bytes().get(from..)?;
        memchr::memmem::find(haystack, needle.as_bytes()).map(|index| from + index)
    }

    #[inline]
    pub fn byte(&self, pos: usize) -> Option<u8> {
        self.bytes().get(pos).copied()
    }
}

/// Skip markup whitespace starting at `pos`
#[inline]
pub fn skip_whitespace(bytes: &[u8], mut pos: usize) -> usize {
    while pos < bytes.len() && is_whitespace(bytes[pos]) {
        pos += 1;
    }
    pos
}

#[inline]
pub const fn is_whitespace(c: u8) -> bool {
    matches!(c, SPACE | NEWLINE | TAB | CARRIAGE_RETURN | 0x0C)
}

/// First character of a tag name
#[inline]
pub const fn is_tag_start(c: u8) -> bool {
    c.is_ascii_alphabetic()
}

/// End of a tag or attribute name
#[inline]
pub const fn is_name_end(c: u8) -> bool {
    is_whitespace(c) || matches!(c, GT | SLASH | EQ)
}

#[inline]
pub const fn is_quote(c: u8) -> bool {
    matches!(c, DOUBLE_QUOTE | SINGLE_QUOTE)
}

/// Identifier start in script (non-ASCII is decided by the caller)
#[inline]
pub const fn is_ident_start(c: u8) -> bool {
    c.is_ascii_alphabetic() || matches!(c, DOLLAR | UNDERSCORE | BACKSLASH)
}

#[inline]
pub const fn is_ident_part(c: u8) -> bool {
    is_ident_start(c) || c.is_ascii_digit()
}

#[inline]
pub const fn is_digit(c: u8) -> bool {
    c >= ZERO && c <= NINE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_location() {
        let scanner = Scanner::new("<a>\n  é<b>");
        let token = scanner.token(TokenKind::TagOpen, 8, 10);
        assert_eq!(token.value, "<b");
        assert_eq!(token.loc.start.line, 2);
        assert_eq!(token.loc.start.column, 3);
        assert_eq!(token.loc.end.column, 5);
    }

    #[test]
    fn test_find_and_starts_with() {
        let scanner = Scanner::new("x </style> y");
        assert_eq!(scanner.find(0, "</style"), Some(2));
        assert!(scanner.starts_with(2, "</"));
        assert_eq!(scanner.find(5, "</style"), None);
        assert_eq!(skip_whitespace(b"  \n x", 0), 4);
    }
}
