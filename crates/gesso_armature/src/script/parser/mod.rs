//! Recursive-descent script parser.
//!
//! The parser reads the tokens produced by [`super::lex`] (comments are
//! skipped) and appends ESTree-shaped nodes to the document arena. Node
//! spans run from the first to the last token a node consumed, so the
//! token store can recover a node's tokens from its span alone.

mod expression;
mod statement;

use gesso_relief::{ErrorCode, Node, NodeData, NodeId, ParseError, Span, Token, TokenKind};

type PResult<T> = Result<T, ParseError>;

/// Parse the statements of a `<script>` block.
///
/// On error the arena is left as it was before the call.
pub fn parse_program(tokens: &[Token], span: Span, nodes: &mut Vec<Node>) -> PResult<NodeId> {
    let mark = nodes.len();
    let result = {
        let mut parser = ScriptParser::new(tokens, nodes, ErrorCode::UnexpectedToken, span.end);
        parser
            .parse_statement_list()
            .map(|body| parser.alloc_span(span, NodeData::Program { body }))
    };
    if result.is_err() {
        nodes.truncate(mark);
    }
    result
}

/// Parse a mustache expression. Empty input yields `None`.
///
/// On error the arena is left as it was before the call.
pub fn parse_expression(
    tokens: &[Token],
    end: u32,
    nodes: &mut Vec<Node>,
) -> PResult<Option<NodeId>> {
    let mark = nodes.len();
    let result = {
        let mut parser = ScriptParser::new(tokens, nodes, ErrorCode::InvalidExpression, end);
        if parser.at_end() {
            Ok(None)
        } else {
            parser.parse_expression().and_then(|expression| {
                if parser.at_end() {
                    Ok(Some(expression))
                } else {
                    Err(parser.unexpected())
                }
            })
        }
    };
    if result.is_err() {
        nodes.truncate(mark);
    }
    result
}

struct ScriptParser<'t, 'n> {
    tokens: Vec<&'t Token>,
    pos: usize,
    nodes: &'n mut Vec<Node>,
    code: ErrorCode,
    eof: u32,
    /// Inside a `for` head, where `in` is not an operator
    no_in: bool,
}

impl<'t, 'n> ScriptParser<'t, 'n> {
    fn new(tokens: &'t [Token], nodes: &'n mut Vec<Node>, code: ErrorCode, eof: u32) -> Self {
        Self {
            tokens: tokens.iter().filter(|token| !token.is_comment()).collect(),
            pos: 0,
            nodes,
            code,
            eof,
            no_in: false,
        }
    }

    #[inline]
    fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos).copied()
    }

    #[inline]
    fn peek_nth(&self, n: usize) -> Option<&'t Token> {
        self.tokens.get(self.pos + n).copied()
    }

    #[inline]
    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    #[inline]
    fn is_punct(&self, value: &str) -> bool {
        self.peek().is_some_and(|token| token.is_punct(value))
    }

    #[inline]
    fn nth_is_punct(&self, n: usize, value: &str) -> bool {
        self.peek_nth(n).is_some_and(|token| token.is_punct(value))
    }

    #[inline]
    fn is_word(&self, value: &str) -> bool {
        self.peek().is_some_and(|token| token.is_word(value))
    }

    fn bump(&mut self) -> PResult<&'t Token> {
        let token = self.peek().ok_or_else(|| self.unexpected())?;
        self.pos += 1;
        Ok(token)
    }

    fn eat_punct(&mut self, value: &str) -> bool {
        if self.is_punct(value) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect_punct(&mut self, value: &str) -> PResult<&'t Token> {
        if self.is_punct(value) {
            self.bump()
        } else {
            Err(self.unexpected())
        }
    }

    fn expect_word(&mut self, value: &str) -> PResult<&'t Token> {
        if self.is_word(value) {
            self.bump()
        } else {
            Err(self.unexpected())
        }
    }

    /// Start offset of the current token
    fn start(&self) -> u32 {
        self.peek().map_or(self.eof, |token| token.span.start)
    }

    /// End offset of the last consumed token
    fn prev_end(&self) -> u32 {
        match self.pos.checked_sub(1).and_then(|index| self.tokens.get(index)) {
            Some(token) => token.span.end,
            None => self.start(),
        }
    }

    /// Whether a line break separates the current token from the previous one
    fn line_break_before(&self) -> bool {
        let previous = self.pos.checked_sub(1).and_then(|index| self.tokens.get(index));
        match (previous, self.peek()) {
            (Some(previous), Some(current)) => current.loc.start.line > previous.loc.end.line,
            _ => false,
        }
    }

    /// Whether a line break separates the `n`th token from the one after it
    fn line_break_after_nth(&self, n: usize) -> bool {
        match (self.peek_nth(n), self.peek_nth(n + 1)) {
            (Some(current), Some(next)) => next.loc.start.line > current.loc.end.line,
            _ => true,
        }
    }

    fn alloc(&mut self, start: u32, data: NodeData) -> NodeId {
        let span = Span::new(start, self.prev_end().max(start));
        self.alloc_span(span, data)
    }

    fn alloc_span(&mut self, span: Span, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::new(span, data));
        id
    }

    /// Stretch a node's span to the last consumed token
    fn extend_to_prev(&mut self, id: NodeId) {
        let end = self.prev_end();
        if let Some(node) = self.nodes.get_mut(id.index()) {
            node.span.end = node.span.end.max(end);
        }
    }

    #[inline]
    fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.index()].data
    }

    fn unexpected(&self) -> ParseError {
        match self.peek() {
            Some(token) => self.unexpected_token(token),
            None => ParseError::new(
                self.code,
                "Unexpected end of input",
                Span::new(self.eof, self.eof),
            ),
        }
    }

    fn unexpected_token(&self, token: &Token) -> ParseError {
        ParseError::new(
            self.code,
            format!("Unexpected token {}", token.value),
            token.span,
        )
    }

    /// Consume a statement terminator, allowing automatic insertion
    fn consume_semicolon(&mut self) -> PResult<()> {
        if self.eat_punct(";") || self.at_end() || self.is_punct("}") || self.line_break_before()
        {
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }
}

/// Words that may be used as binding names
fn is_identifier_token(token: &Token) -> bool {
    match token.kind {
        TokenKind::Identifier => !token.value.starts_with('#'),
        TokenKind::Keyword => matches!(token.value.as_str(), "let" | "static" | "yield" | "await"),
        _ => false,
    }
}

/// Tokens that can start an object or class member key
fn starts_key(token: &Token) -> bool {
    matches!(
        token.kind,
        TokenKind::Identifier | TokenKind::Keyword | TokenKind::String | TokenKind::Numeric
    ) || token.is_punct("[")
        || token.is_punct("*")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::{lex, LexMode};
    use crate::tokenizer::Scanner;
    use gesso_relief::NodeKind;

    fn program(source: &str) -> (Vec<Node>, PResult<NodeId>) {
        let scanner = Scanner::new(source);
        let output = lex(&scanner, 0, LexMode::Program { end: source.len() });
        assert!(output.error.is_none());
        let mut nodes = Vec::new();
        let result = parse_program(
            &output.tokens,
            Span::new(0, source.len() as u32),
            &mut nodes,
        );
        (nodes, result)
    }

    fn kinds(nodes: &[Node]) -> Vec<NodeKind> {
        nodes.iter().map(Node::kind).collect()
    }

    #[test]
    fn test_statement_spans_include_semicolon() {
        let (nodes, result) = program("a = 1;\nb()");
        let root = result.unwrap();
        let NodeData::Program { body } = &nodes[root.index()].data else {
            panic!("expected a program");
        };
        assert_eq!(body.len(), 2);
        assert_eq!(nodes[body[0].index()].span, Span::new(0, 6));
        assert_eq!(nodes[body[1].index()].span, Span::new(7, 10));
    }

    #[test]
    fn test_arrow_and_call() {
        let (nodes, result) = program("list.map((item, i) => item * i)");
        assert!(result.is_ok());
        let kinds = kinds(&nodes);
        assert!(kinds.contains(&NodeKind::ArrowFunctionExpression));
        assert!(kinds.contains(&NodeKind::CallExpression));
        assert!(kinds.contains(&NodeKind::MemberExpression));
        assert!(kinds.contains(&NodeKind::BinaryExpression));
    }

    #[test]
    fn test_asi_across_lines() {
        let (_, result) = program("let a = 1\nlet b = a\nreturn\nfoo()");
        assert!(result.is_ok());
    }

    #[test]
    fn test_error_restores_arena() {
        let (nodes, result) = program("let a = (1 +;");
        assert!(result.is_err());
        assert!(nodes.is_empty());
    }

    #[test]
    fn test_class_with_decorators() {
        let (nodes, result) = program("class A {\n  @dec(1)\n  method() {}\n  field = 2\n}");
        assert!(result.is_ok());
        let kinds = kinds(&nodes);
        assert!(kinds.contains(&NodeKind::Decorator));
        assert!(kinds.contains(&NodeKind::MethodDefinition));
        assert!(kinds.contains(&NodeKind::PropertyDefinition));
    }

    #[test]
    fn test_imports_and_exports() {
        let (nodes, result) = program(
            "import a, { b as c, d } from 'x'\nimport * as ns from 'y'\nexport { c as e }\nexport default a\nexport * from 'z'",
        );
        assert!(result.is_ok());
        let kinds = kinds(&nodes);
        for kind in [
            NodeKind::ImportDefaultSpecifier,
            NodeKind::ImportSpecifier,
            NodeKind::ImportNamespaceSpecifier,
            NodeKind::ExportSpecifier,
            NodeKind::ExportDefaultDeclaration,
            NodeKind::ExportAllDeclaration,
        ] {
            assert!(kinds.contains(&kind), "{kind} missing");
        }
    }
}
