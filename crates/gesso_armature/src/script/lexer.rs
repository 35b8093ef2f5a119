//! Script lexer.
//!
//! Whitespace produces no tokens. In [`LexMode::Mustache`] the lexer stops
//! at a `}}` that closes no brace or template substitution.

use gesso_relief::{ErrorCode, ParseError, Span, Token, TokenKind};
use phf::phf_set;

use crate::tokenizer::{char_codes::*, is_digit, is_ident_part, is_ident_start, Scanner};

static KEYWORDS: phf::Set<&'static str> = phf_set! {
    "await", "break", "case", "catch", "class", "const", "continue",
    "debugger", "default", "delete", "do", "else", "export", "extends",
    "false", "finally", "for", "function", "if", "import", "in",
    "instanceof", "let", "new", "null", "return", "static", "super",
    "switch", "this", "throw", "true", "try", "typeof", "var", "void",
    "while", "with", "yield",
};

/// Keywords after which `/` starts a regular expression
static REGEX_AFTER_KEYWORDS: phf::Set<&'static str> = phf_set! {
    "case", "delete", "do", "else", "in", "instanceof", "new", "return",
    "throw", "typeof", "void", "yield", "await",
};

/// Punctuators, longest first within each leading character
const PUNCTUATORS: &[&str] = &[
    ">>>=", "...", "===", "!==", "**=", "<<=", ">>=", ">>>", "&&=", "||=", "??=", "=>", "==",
    "!=", "<=", ">=", "&&", "||", "??", "?.", "++", "--", "+=", "-=", "*=", "/=", "%=", "&=",
    "|=", "^=", "**", "<<", ">>", "{", "}", "(", ")", "[", "]", ";", ",", "<", ">", "+", "-",
    "*", "/", "%", "&", "|", "^", "!", "~", "?", ":", "=", ".", "@",
];

/// Where lexing stops
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexMode {
    /// Lex up to `end` (exclusive)
    Program { end: usize },
    /// Lex up to the closing `}}`
    Mustache,
}

#[derive(Debug)]
pub struct LexOutput {
    pub tokens: Vec<Token>,
    /// Offset where lexing stopped (the closing `}}` in mustache mode)
    pub end: usize,
    /// Whether a mustache found its closing `}}`
    pub closed: bool,
    pub error: Option<ParseError>,
}

/// Lex script text starting at `start`
pub fn lex(scanner: &Scanner<'_>, start: usize, mode: LexMode) -> LexOutput {
    let end = match mode {
        LexMode::Program { end } => end.min(scanner.len()),
        LexMode::Mustache => scanner.len(),
    };
    let mut lexer = Lexer {
        scanner,
        bytes: scanner.bytes(),
        pos: start,
        end,
        mode,
        tokens: Vec::new(),
        brace_depth: 0,
        template_stack: Vec::new(),
    };
    let (closed, error) = match lexer.run() {
        Ok(closed) => (closed, None),
        Err(error) => (false, Some(error)),
    };
    LexOutput {
        end: lexer.pos,
        tokens: lexer.tokens,
        closed,
        error,
    }
}

struct Lexer<'s, 'a> {
    scanner: &'s Scanner<'a>,
    bytes: &'a [u8],
    pos: usize,
    end: usize,
    mode: LexMode,
    tokens: Vec<Token>,
    brace_depth: u32,
    /// Brace depth at each open `${`
    template_stack: Vec<u32>,
}

impl Lexer<'_, '_> {
    /// Returns whether a mustache was closed
    fn run(&mut self) -> Result<bool, ParseError> {
        loop {
            self.skip_whitespace();
            if self.pos >= self.end {
                return Ok(false);
            }
            let c = self.bytes[self.pos];
            let next = self.peek(1);

            if self.mode == LexMode::Mustache
                && c == RIGHT_BRACE
                && next == Some(RIGHT_BRACE)
                && self.brace_depth == 0
                && self.template_stack.is_empty()
            {
                return Ok(true);
            }

            match c {
                SLASH if next == Some(SLASH) => self.line_comment(),
                SLASH if next == Some(b'*') => self.block_comment()?,
                SLASH if self.regex_allowed() => self.regex()?,
                GRAVE_ACCENT => self.template(self.pos, self.pos + 1)?,
                RIGHT_BRACE if self.template_stack.last() == Some(&self.brace_depth) => {
                    self.template_stack.pop();
                    self.template(self.pos, self.pos + 1)?;
                }
                DOUBLE_QUOTE | SINGLE_QUOTE => self.string(c)?,
                c if is_digit(c) => self.number(),
                DOT if next.is_some_and(is_digit) => self.number(),
                NUMBER if next.is_some_and(|n| is_ident_start(n) || n >= 0x80) => {
                    let start = self.pos;
                    self.pos += 1;
                    self.ident_tail();
                    self.push(TokenKind::Identifier, start);
                }
                c if is_ident_start(c) || c >= 0x80 => self.identifier(),
                _ => self.punctuator()?,
            }
        }
    }

    #[inline]
    fn peek(&self, n: usize) -> Option<u8> {
        let at = self.pos + n;
        (at < self.end).then(|| self.bytes[at])
    }

    fn push(&mut self, kind: TokenKind, start: usize) {
        let token = self.scanner.token(kind, start, self.pos);
        self.tokens.push(token);
    }

    fn error(&self, code: ErrorCode, message: &str, start: usize) -> ParseError {
        ParseError::new(code, message, Span::new(start as u32, self.pos as u32))
    }

    fn skip_whitespace(&mut self) {
        while self.pos < self.end {
            let c = self.bytes[self.pos];
            if c.is_ascii_whitespace() {
                self.pos += 1;
            } else if c >= 0x80 {
                let ch = self.scanner.source()[self.pos..]
                    .chars()
                    .next()
                    .unwrap_or('\0');
                if ch.is_whitespace() || ch == '\u{FEFF}' {
                    self.pos += ch.len_utf8();
                } else {
                    break;
                }
            } else {
                break;
            }
        }
    }

    fn regex_allowed(&self) -> bool {
        let Some(last) = self.tokens.iter().rev().find(|token| !token.is_comment()) else {
            return true;
        };
        match last.kind {
            TokenKind::Punctuator => !matches!(last.value.as_str(), ")" | "]" | "}"),
            TokenKind::Keyword => REGEX_AFTER_KEYWORDS.contains(last.value.as_str()),
            _ => false,
        }
    }

    fn line_comment(&mut self) {
        let start = self.pos;
        while self.pos < self.end && !matches!(self.bytes[self.pos], NEWLINE | CARRIAGE_RETURN) {
            self.pos += 1;
        }
        self.push(TokenKind::LineComment, start);
    }

    fn block_comment(&mut self) -> Result<(), ParseError> {
        let start = self.pos;
        let close = self
            .scanner
            .find(start + 2, "*/")
            .filter(|&index| index + 2 <= self.end);
        match close {
            Some(index) => {
                self.pos = index + 2;
                self.push(TokenKind::BlockComment, start);
                Ok(())
            }
            None => {
                self.pos = self.end;
                Err(self.error(ErrorCode::UnterminatedComment, "Unterminated comment", start))
            }
        }
    }

    fn regex(&mut self) -> Result<(), ParseError> {
        let start = self.pos;
        self.pos += 1;
        let mut in_class = false;
        loop {
            let Some(c) = self.peek(0) else {
                return Err(self.error(
                    ErrorCode::UnterminatedRegExp,
                    "Unterminated regular expression",
                    start,
                ));
            };
            match c {
                NEWLINE | CARRIAGE_RETURN => {
                    return Err(self.error(
                        ErrorCode::UnterminatedRegExp,
                        "Unterminated regular expression",
                        start,
                    ))
                }
                BACKSLASH => self.pos += 2,
                b'[' => {
                    in_class = true;
                    self.pos += 1;
                }
                b']' => {
                    in_class = false;
                    self.pos += 1;
                }
                SLASH if !in_class => {
                    self.pos += 1;
                    break;
                }
                _ => self.pos += 1,
            }
        }
        self.pos = self.pos.min(self.end);
        self.ident_tail();
        self.push(TokenKind::RegularExpression, start);
        Ok(())
    }

    /// Scan a template chunk whose first delimiter ends at `body`
    fn template(&mut self, start: usize, body: usize) -> Result<(), ParseError> {
        self.pos = body;
        loop {
            let Some(c) = self.peek(0) else {
                return Err(self.error(
                    ErrorCode::UnterminatedTemplate,
                    "Unterminated template literal",
                    start,
                ));
            };
            match c {
                BACKSLASH => self.pos += 2,
                GRAVE_ACCENT => {
                    self.pos += 1;
                    break;
                }
                DOLLAR if self.peek(1) == Some(LEFT_BRACE) => {
                    self.pos += 2;
                    self.template_stack.push(self.brace_depth);
                    break;
                }
                _ => self.pos += 1,
            }
        }
        self.pos = self.pos.min(self.end);
        self.push(TokenKind::Template, start);
        Ok(())
    }

    fn string(&mut self, quote: u8) -> Result<(), ParseError> {
        let start = self.pos;
        self.pos += 1;
        loop {
            match self.peek(0) {
                None | Some(NEWLINE) | Some(CARRIAGE_RETURN) => {
                    return Err(self.error(
                        ErrorCode::UnterminatedString,
                        "Unterminated string constant",
                        start,
                    ))
                }
                Some(BACKSLASH) => {
                    // an escaped CRLF continues the string on the next line
                    self.pos += 2;
                    if self.peek(0) == Some(NEWLINE) && self.bytes[self.pos - 1] == CARRIAGE_RETURN {
                        self.pos += 1;
                    }
                }
                Some(c) if c == quote => {
                    self.pos += 1;
                    break;
                }
                Some(_) => self.pos += 1,
            }
        }
        self.pos = self.pos.min(self.end);
        self.push(TokenKind::String, start);
        Ok(())
    }

    fn number(&mut self) {
        let start = self.pos;
        let radix_prefix = self.bytes[self.pos] == ZERO
            && self
                .peek(1)
                .is_some_and(|c| matches!(c.to_ascii_lowercase(), b'x' | b'o' | b'b'));
        if radix_prefix {
            self.pos += 2;
            while self
                .peek(0)
                .is_some_and(|c| c.is_ascii_hexdigit() || c == UNDERSCORE)
            {
                self.pos += 1;
            }
        } else {
            self.digits();
            if self.peek(0) == Some(DOT) {
                self.pos += 1;
                self.digits();
            }
            if self.peek(0).is_some_and(|c| c == b'e' || c == b'E') {
                let sign = usize::from(self.peek(1).is_some_and(|c| c == b'+' || c == b'-'));
                if self.peek(1 + sign).is_some_and(is_digit) {
                    self.pos += 1 + sign;
                    self.digits();
                }
            }
        }
        if self.peek(0) == Some(b'n') {
            self.pos += 1;
        }
        self.push(TokenKind::Numeric, start);
    }

    fn digits(&mut self) {
        while self.peek(0).is_some_and(|c| is_digit(c) || c == UNDERSCORE) {
            self.pos += 1;
        }
    }

    fn ident_tail(&mut self) {
        while self.pos < self.end {
            let c = self.bytes[self.pos];
            if is_ident_part(c) {
                self.pos += 1;
            } else if c >= 0x80 {
                let ch = self.scanner.source()[self.pos..]
                    .chars()
                    .next()
                    .unwrap_or(' ');
                if ch.is_whitespace() {
                    break;
                }
                self.pos += ch.len_utf8();
            } else {
                break;
            }
        }
    }

    fn identifier(&mut self) {
        let start = self.pos;
        self.ident_tail();
        if self.pos == start {
            // a lone non-identifier character above ASCII
            self.pos = self.scanner.next_char_end(start);
        }
        let word = &self.scanner.source()[start..self.pos];
        let kind = if KEYWORDS.contains(word) {
            TokenKind::Keyword
        } else {
            TokenKind::Identifier
        };
        self.push(kind, start);
    }

    fn punctuator(&mut self) -> Result<(), ParseError> {
        let start = self.pos;
        let rest = &self.bytes[start..self.end];
        let found = PUNCTUATORS.iter().find(|punct| {
            rest.starts_with(punct.as_bytes())
                // `?.5` is a conditional followed by a number
                && !(**punct == "?." && rest.get(2).is_some_and(|&c| is_digit(c)))
        });
        let Some(punct) = found else {
            self.pos = self.scanner.next_char_end(start);
            return Err(self.error(ErrorCode::UnexpectedToken, "Unexpected character", start));
        };
        self.pos += punct.len();
        match *punct {
            "{" => self.brace_depth += 1,
            "}" => self.brace_depth = self.brace_depth.saturating_sub(1),
            _ => {}
        }
        self.push(TokenKind::Punctuator, start);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds_and_values(source: &str, mode: LexMode) -> Vec<(TokenKind, String)> {
        let scanner = Scanner::new(source);
        let output = lex(&scanner, 0, mode);
        assert!(output.error.is_none(), "{:?}", output.error);
        output
            .tokens
            .into_iter()
            .map(|token| (token.kind, token.value.to_string()))
            .collect()
    }

    #[test]
    fn test_basic_tokens() {
        let tokens = kinds_and_values(
            "const a = b >>> 2 // note",
            LexMode::Program { end: 25 },
        );
        let values: Vec<_> = tokens.iter().map(|(_, v)| v.as_str()).collect();
        assert_eq!(values, ["const", "a", "=", "b", ">>>", "2", "// note"]);
        assert_eq!(tokens[0].0, TokenKind::Keyword);
        assert_eq!(tokens[6].0, TokenKind::LineComment);
    }

    #[test]
    fn test_regex_versus_division() {
        let source = "x = a / b; y = /re[/]x/g";
        let tokens = kinds_and_values(source, LexMode::Program { end: source.len() });
        assert!(tokens.contains(&(TokenKind::Punctuator, "/".to_string())));
        assert!(tokens.contains(&(TokenKind::RegularExpression, "/re[/]x/g".to_string())));
    }

    #[test]
    fn test_template_chunks() {
        let source = "`a${ {b: 1}.b }c${d}e`";
        let tokens = kinds_and_values(source, LexMode::Program { end: source.len() });
        let templates: Vec<_> = tokens
            .iter()
            .filter(|(kind, _)| *kind == TokenKind::Template)
            .map(|(_, v)| v.as_str())
            .collect();
        assert_eq!(templates, ["`a${", "}c${", "}e`"]);
    }

    #[test]
    fn test_mustache_stops_at_close() {
        let source = "a ? {b: 1} : c }} tail";
        let scanner = Scanner::new(source);
        let output = lex(&scanner, 0, LexMode::Mustache);
        assert!(output.closed);
        assert_eq!(&source[output.end..output.end + 2], "}}");
        assert_eq!(output.tokens.last().map(|t| t.value.as_str()), Some("c"));
    }

    #[test]
    fn test_unterminated_string() {
        let scanner = Scanner::new("'abc\n");
        let output = lex(&scanner, 0, LexMode::Program { end: 5 });
        let error = output.error.map(|e| e.code);
        assert_eq!(error, Some(ErrorCode::UnterminatedString));
    }
}
