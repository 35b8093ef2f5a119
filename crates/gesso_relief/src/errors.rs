//! Parse errors.

use thiserror::Error;

use crate::token::Span;

/// Parse error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    UnterminatedComment,
    UnterminatedTag,
    UnterminatedAttributeValue,
    UnterminatedMustache,
    UnterminatedScript,
    UnterminatedString,
    UnterminatedTemplate,
    UnterminatedRegExp,
    /// Syntax error inside a `<script>` block
    UnexpectedToken,
    /// Syntax error inside a mustache or directive value
    InvalidExpression,
    MissingEndTag,
    InvalidEndTag,
}

impl ErrorCode {
    /// Fatal errors leave no usable token stream; rules that need one skip
    /// the document.
    pub const fn is_fatal(self) -> bool {
        !matches!(
            self,
            ErrorCode::InvalidExpression | ErrorCode::MissingEndTag | ErrorCode::InvalidEndTag
        )
    }
}

/// An error found while scanning or parsing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} ({start}..{end})", start = span.start, end = span.end)]
pub struct ParseError {
    pub code: ErrorCode,
    pub message: String,
    pub span: Span,
}

impl ParseError {
    pub fn new(code: ErrorCode, message: impl Into<String>, span: Span) -> Self {
        Self {
            code,
            message: message.into(),
            span,
        }
    }

    #[inline]
    pub fn is_fatal(&self) -> bool {
        self.code.is_fatal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_codes() {
        assert!(ErrorCode::UnterminatedComment.is_fatal());
        assert!(ErrorCode::UnexpectedToken.is_fatal());
        assert!(!ErrorCode::MissingEndTag.is_fatal());
        assert!(!ErrorCode::InvalidExpression.is_fatal());
    }

    #[test]
    fn test_display() {
        let error = ParseError::new(
            ErrorCode::UnterminatedComment,
            "Unterminated comment",
            Span::new(3, 9),
        );
        assert_eq!(error.to_string(), "Unterminated comment (3..9)");
    }
}
