//! Token types shared by the markup scanner and the script lexer.

use gesso_carton::CompactString;
use serde::{Deserialize, Serialize};

/// Byte range `[start, end)` in the source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    #[inline]
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    #[inline]
    pub const fn len(&self) -> u32 {
        self.end - self.start
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Check whether `other` lies within this span
    #[inline]
    pub const fn contains(&self, other: Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

/// Source position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    /// Byte offset from start of file
    pub offset: u32,
    /// 1-indexed line number
    pub line: u32,
    /// 0-indexed column, counted in characters
    pub column: u32,
}

impl Position {
    pub const fn new(offset: u32, line: u32, column: u32) -> Self {
        Self {
            offset,
            line,
            column,
        }
    }
}

/// Start and end position of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SourceLocation {
    pub start: Position,
    pub end: Position,
}

/// Token type discriminant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    // Markup
    /// `<name` of a start tag
    TagOpen,
    /// `</name` of an end tag
    EndTagOpen,
    /// `>`
    TagClose,
    /// `/>`
    SelfClosingTagClose,
    /// Attribute or directive key
    AttributeName,
    /// `=` between an attribute key and its value
    Association,
    /// A whole attribute value, quotes included
    AttributeValue,
    /// Quote delimiting a value that contains mustaches
    Quote,
    /// A word inside a value that contains mustaches
    AttributeText,
    /// A word of text content
    Text,
    /// Opaque element content (`<style>`)
    RawText,
    /// Whitespace between words of text content
    Whitespace,
    /// `<!-- ... -->`
    HtmlComment,
    /// `{{`
    MustacheOpen,
    /// `}}`
    MustacheClose,

    // Script
    Identifier,
    Keyword,
    Punctuator,
    Numeric,
    String,
    /// A template literal chunk, including its delimiters (`` `a${ ``, `}b${`, `` }c` ``)
    Template,
    RegularExpression,
    LineComment,
    BlockComment,
}

impl TokenKind {
    /// Check if this is a comment of either grammar
    #[inline]
    pub const fn is_comment(self) -> bool {
        matches!(
            self,
            TokenKind::HtmlComment | TokenKind::LineComment | TokenKind::BlockComment
        )
    }

    #[inline]
    pub const fn is_whitespace(self) -> bool {
        matches!(self, TokenKind::Whitespace)
    }
}

/// A lexical unit of the document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    /// Source text of the token
    pub value: CompactString,
    pub span: Span,
    pub loc: SourceLocation,
}

impl Token {
    #[inline]
    pub fn is_comment(&self) -> bool {
        self.kind.is_comment()
    }

    #[inline]
    pub fn is_whitespace(&self) -> bool {
        self.kind.is_whitespace()
    }

    /// Check if this is the punctuator `value`
    #[inline]
    pub fn is_punct(&self, value: &str) -> bool {
        self.kind == TokenKind::Punctuator && self.value == value
    }

    /// Check if this is the keyword or contextual word `value`
    #[inline]
    pub fn is_word(&self, value: &str) -> bool {
        matches!(self.kind, TokenKind::Keyword | TokenKind::Identifier) && self.value == value
    }

    /// Check if the token spans more than one line
    #[inline]
    pub fn is_multiline(&self) -> bool {
        self.loc.start.line != self.loc.end.line
    }
}

/// Index of a token in [`crate::Document::tokens`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TokenId(pub u32);

impl TokenId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_contains() {
        let outer = Span::new(2, 10);
        assert!(outer.contains(Span::new(2, 10)));
        assert!(outer.contains(Span::new(4, 5)));
        assert!(!outer.contains(Span::new(1, 5)));
        assert_eq!(outer.len(), 8);
    }

    #[test]
    fn test_comment_kinds() {
        assert!(TokenKind::HtmlComment.is_comment());
        assert!(TokenKind::BlockComment.is_comment());
        assert!(!TokenKind::Text.is_comment());
        assert!(TokenKind::Whitespace.is_whitespace());
    }
}
