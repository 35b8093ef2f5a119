//! Markup parser.
//!
//! Builds the token stream and the node arena in one pass. Script regions
//! (mustaches and `<script>` bodies) are handed to [`crate::script`].

use gesso_carton::CompactString;
use gesso_relief::{
    AttributeKey, DirectiveKey, Document, ErrorCode, Node, NodeData, NodeId, ParseError,
    ParserOptions, Span, TokenKind,
};

use crate::{
    script::{self, LexMode},
    tokenizer::{char_codes::*, is_name_end, is_quote, is_tag_start, is_whitespace, Scanner},
};

/// How element content is read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContentMode {
    /// Elements, text, mustaches and comments
    Normal,
    /// Text and mustaches only, up to the element's end tag
    RcData,
}

/// Words of a text run collected so far
#[derive(Debug, Default)]
struct TextRun {
    start: Option<usize>,
    end: usize,
}

/// Markup parser
pub struct Parser<'a> {
    scanner: Scanner<'a>,
    options: &'a ParserOptions,
    pos: usize,
    tokens: Vec<gesso_relief::Token>,
    nodes: Vec<Node>,
    errors: Vec<ParseError>,
    /// Names of the elements currently open
    open_elements: Vec<CompactString>,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str, options: &'a ParserOptions) -> Self {
        Self {
            scanner: Scanner::new(source),
            options,
            pos: 0,
            tokens: Vec::new(),
            nodes: Vec::new(),
            errors: Vec::new(),
            open_elements: Vec::new(),
        }
    }

    pub fn parse(mut self) -> Document {
        let children = self.parse_children(None, ContentMode::Normal);
        let span = Span::new(0, self.scanner.len() as u32);
        let root = self.alloc(span, NodeData::Document { children });
        if !self.errors.is_empty() {
            tracing::debug!(errors = self.errors.len(), "template parsed with errors");
        }
        Document::new(
            self.scanner.source(),
            self.tokens,
            self.nodes,
            root,
            self.errors,
        )
    }

    fn alloc(&mut self, span: Span, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::new(span, data));
        id
    }

    fn push_token(&mut self, kind: TokenKind, start: usize, end: usize) {
        let token = self.scanner.token(kind, start, end);
        self.tokens.push(token);
    }

    fn error(&mut self, code: ErrorCode, message: &str, start: usize, end: usize) {
        self.errors.push(ParseError::new(
            code,
            message,
            Span::new(start as u32, end as u32),
        ));
    }

    #[inline]
    fn at_end(&self) -> bool {
        self.pos >= self.scanner.len()
    }

    fn flush_text(&mut self, run: &mut TextRun, children: &mut Vec<NodeId>) {
        if let Some(start) = run.start.take() {
            let id = self.alloc(Span::new(start as u32, run.end as u32), NodeData::Text);
            children.push(id);
        }
    }

    /// Name of the end tag starting at `pos`, if any
    fn end_tag_name(&self, pos: usize) -> Option<&'a str> {
        if !self.scanner.starts_with(pos, "</") || !self.scanner.byte(pos + 2).is_some_and(is_tag_start)
        {
            return None;
        }
        let bytes = self.scanner.bytes();
        let mut end = pos + 2;
        while end < bytes.len() && !is_name_end(bytes[end]) {
            end += 1;
        }
        Some(&self.scanner.source()[pos + 2..end])
    }

    fn parse_children(&mut self, parent: Option<&str>, mode: ContentMode) -> Vec<NodeId> {
        let mut children = Vec::new();
        let mut run = TextRun::default();

        while !self.at_end() {
            if let Some(name) = self.end_tag_name(self.pos) {
                if Some(name) == parent {
                    break;
                }
                if mode == ContentMode::Normal {
                    if self.open_elements.iter().any(|open| open == name) {
                        break;
                    }
                    self.flush_text(&mut run, &mut children);
                    let start = self.pos;
                    self.parse_end_tag();
                    self.error(
                        ErrorCode::InvalidEndTag,
                        "Invalid end tag",
                        start,
                        self.pos,
                    );
                    continue;
                }
            }
            if mode == ContentMode::Normal {
                if self.scanner.starts_with(self.pos, "<!--") {
                    self.flush_text(&mut run, &mut children);
                    self.parse_comment();
                    continue;
                }
                if self.scanner.byte(self.pos) == Some(LT)
                    && self.scanner.byte(self.pos + 1).is_some_and(is_tag_start)
                {
                    self.flush_text(&mut run, &mut children);
                    let element = self.parse_element();
                    children.push(element);
                    continue;
                }
            }
            if self.scanner.starts_with(self.pos, "{{") {
                self.flush_text(&mut run, &mut children);
                let mustache = self.parse_mustache();
                children.push(mustache);
                continue;
            }
            self.scan_text(&mut run);
        }
        self.flush_text(&mut run, &mut children);
        children
    }

    /// One whitespace run or one word of text content
    fn scan_text(&mut self, run: &mut TextRun) {
        let bytes = self.scanner.bytes();
        let start = self.pos;
        if is_whitespace(bytes[start]) {
            while self.pos < bytes.len() && is_whitespace(bytes[self.pos]) {
                self.pos += 1;
            }
            self.push_token(TokenKind::Whitespace, start, self.pos);
            return;
        }
        self.pos = self.scanner.next_char_end(start);
        while self.pos < bytes.len() {
            let c = bytes[self.pos];
            if is_whitespace(c) || c == LT || self.scanner.starts_with(self.pos, "{{") {
                break;
            }
            self.pos += 1;
        }
        // stay on a char boundary
        while !self.scanner.source().is_char_boundary(self.pos) {
            self.pos += 1;
        }
        self.push_token(TokenKind::Text, start, self.pos);
        run.start.get_or_insert(start);
        run.end = self.pos;
    }

    fn parse_comment(&mut self) {
        let start = self.pos;
        match self.scanner.find(start + 4, "-->") {
            Some(close) => {
                self.pos = close + 3;
                self.push_token(TokenKind::HtmlComment, start, self.pos);
            }
            None => {
                self.pos = self.scanner.len();
                self.push_token(TokenKind::HtmlComment, start, self.pos);
                self.error(
                    ErrorCode::UnterminatedComment,
                    "Unterminated comment",
                    start,
                    self.pos,
                );
            }
        }
    }

    fn parse_element(&mut self) -> NodeId {
        let start = self.pos;
        let (name, start_tag, self_closing) = self.parse_start_tag();
        let start_tag_end = self.nodes[start_tag.index()].span.end;

        if self_closing || (self.options.is_void_tag)(&name) {
            return self.alloc(
                Span::new(start as u32, start_tag_end),
                NodeData::Element {
                    name,
                    start_tag,
                    children: Vec::new(),
                    end_tag: None,
                },
            );
        }

        let children = if self.options.is_script_tag(&name) && self.has_script_type(start_tag) {
            self.parse_script_content(&name)
        } else if self.options.is_script_tag(&name) || (self.options.is_raw_text_tag)(&name) {
            self.parse_raw_text(&name)
        } else if (self.options.is_rcdata_tag)(&name) {
            self.parse_children(Some(&name), ContentMode::RcData)
        } else {
            self.open_elements.push(name.clone());
            let children = self.parse_children(Some(&name), ContentMode::Normal);
            self.open_elements.pop();
            children
        };

        let end_tag = if self.end_tag_name(self.pos) == Some(name.as_str()) {
            Some(self.parse_end_tag())
        } else {
            self.error(
                ErrorCode::MissingEndTag,
                "Element is missing its end tag",
                start,
                start_tag_end as usize,
            );
            None
        };

        let end = match end_tag {
            Some(id) => self.nodes[id.index()].span.end,
            None => children
                .last()
                .map_or(start_tag_end, |last| self.nodes[last.index()].span.end),
        };
        self.alloc(
            Span::new(start as u32, end),
            NodeData::Element {
                name,
                start_tag,
                children,
                end_tag,
            },
        )
    }

    /// Returns the tag name, the start tag node and whether it self-closes
    fn parse_start_tag(&mut self) -> (CompactString, NodeId, bool) {
        let bytes = self.scanner.bytes();
        let start = self.pos;
        let mut end = start + 1;
        while end < bytes.len() && !is_name_end(bytes[end]) {
            end += 1;
        }
        let name = CompactString::new(&self.scanner.source()[start + 1..end]);
        self.push_token(TokenKind::TagOpen, start, end);
        self.pos = end;

        let mut attributes = Vec::new();
        let mut self_closing = false;
        loop {
            self.skip_tag_whitespace();
            if self.at_end() {
                self.error(
                    ErrorCode::UnterminatedTag,
                    "Unterminated start tag",
                    start,
                    self.pos,
                );
                break;
            }
            if self.scanner.starts_with(self.pos, "/>") {
                self.push_token(TokenKind::SelfClosingTagClose, self.pos, self.pos + 2);
                self.pos += 2;
                self_closing = true;
                break;
            }
            if self.scanner.byte(self.pos) == Some(GT) {
                self.push_token(TokenKind::TagClose, self.pos, self.pos + 1);
                self.pos += 1;
                break;
            }
            let attribute = self.parse_attribute();
            attributes.push(attribute);
        }

        let span = Span::new(start as u32, self.pos as u32);
        let start_tag = self.alloc(
            span,
            NodeData::StartTag {
                attributes,
                self_closing,
            },
        );
        (name, start_tag, self_closing)
    }

    fn skip_tag_whitespace(&mut self) {
        self.pos = crate::tokenizer::skip_whitespace(self.scanner.bytes(), self.pos);
    }

    fn parse_attribute(&mut self) -> NodeId {
        let bytes = self.scanner.bytes();
        let start = self.pos;
        let mut end = start;
        while end < bytes.len() && !is_whitespace(bytes[end]) && bytes[end] != EQ && bytes[end] != GT
        {
            if bytes[end] == SLASH && bytes.get(end + 1) == Some(&GT) {
                break;
            }
            end += 1;
        }
        if end == start {
            // a stray `=` or `/`
            end = self.scanner.next_char_end(start);
        }
        let raw = &self.scanner.source()[start..end];
        self.push_token(TokenKind::AttributeName, start, end);
        self.pos = end;

        let after_key = crate::tokenizer::skip_whitespace(bytes, self.pos);
        let value = if raw != "=" && self.scanner.byte(after_key) == Some(EQ) {
            self.push_token(TokenKind::Association, after_key, after_key + 1);
            self.pos = crate::tokenizer::skip_whitespace(bytes, after_key + 1);
            self.parse_attribute_value()
        } else {
            None
        };

        let end = value.map_or(end, |id| self.nodes[id.index()].span.end as usize);
        let span = Span::new(start as u32, end as u32);
        let data = match parse_directive_key(raw, self.options.directive_prefixes) {
            Some(key) => NodeData::Directive { key, value },
            None => NodeData::Attribute {
                key: AttributeKey { name: raw.into() },
                value,
            },
        };
        self.alloc(span, data)
    }

    fn parse_attribute_value(&mut self) -> Option<NodeId> {
        let bytes = self.scanner.bytes();
        let start = self.pos;
        let quote = self.scanner.byte(start)?;

        if !is_quote(quote) {
            let mut end = start;
            while end < bytes.len() && !is_whitespace(bytes[end]) && bytes[end] != GT {
                if bytes[end] == SLASH && bytes.get(end + 1) == Some(&GT) {
                    break;
                }
                end += 1;
            }
            if end == start {
                return None;
            }
            self.push_token(TokenKind::AttributeValue, start, end);
            self.pos = end;
            return Some(self.alloc(Span::new(start as u32, end as u32), NodeData::AttributeValue));
        }

        let naive_close = memchr::memchr(quote, &bytes[start + 1..]).map(|i| start + 1 + i);
        let has_mustache = match naive_close {
            Some(close) => self.scanner.find(start + 1, "{{").is_some_and(|at| at < close),
            None => false,
        };

        if !has_mustache {
            let Some(close) = naive_close else {
                self.pos = bytes.len();
                self.push_token(TokenKind::AttributeValue, start, self.pos);
                self.error(
                    ErrorCode::UnterminatedAttributeValue,
                    "Unterminated attribute value",
                    start,
                    self.pos,
                );
                return Some(self.alloc(
                    Span::new(start as u32, self.pos as u32),
                    NodeData::AttributeValue,
                ));
            };
            self.pos = close + 1;
            self.push_token(TokenKind::AttributeValue, start, self.pos);
            return Some(self.alloc(
                Span::new(start as u32, self.pos as u32),
                NodeData::AttributeValue,
            ));
        }

        Some(self.parse_value_container(quote))
    }

    /// A quoted value holding mustaches
    fn parse_value_container(&mut self, quote: u8) -> NodeId {
        let bytes = self.scanner.bytes();
        let start = self.pos;
        self.push_token(TokenKind::Quote, start, start + 1);
        self.pos += 1;

        let mut parts = Vec::new();
        let mut run = TextRun::default();
        loop {
            if self.at_end() {
                self.error(
                    ErrorCode::UnterminatedAttributeValue,
                    "Unterminated attribute value",
                    start,
                    self.pos,
                );
                break;
            }
            let c = bytes[self.pos];
            if c == quote {
                self.flush_text(&mut run, &mut parts);
                self.push_token(TokenKind::Quote, self.pos, self.pos + 1);
                self.pos += 1;
                break;
            }
            if is_whitespace(c) {
                self.pos += 1;
                continue;
            }
            if self.scanner.starts_with(self.pos, "{{") {
                self.flush_text(&mut run, &mut parts);
                let mustache = self.parse_mustache();
                parts.push(mustache);
                continue;
            }
            let word_start = self.pos;
            self.pos = self.scanner.next_char_end(word_start);
            while self.pos < bytes.len() {
                let c = bytes[self.pos];
                if is_whitespace(c) || c == quote || self.scanner.starts_with(self.pos, "{{") {
                    break;
                }
                self.pos += 1;
            }
            while !self.scanner.source().is_char_boundary(self.pos) {
                self.pos += 1;
            }
            self.push_token(TokenKind::AttributeText, word_start, self.pos);
            run.start.get_or_insert(word_start);
            run.end = self.pos;
        }

        self.alloc(
            Span::new(start as u32, self.pos as u32),
            NodeData::ValueContainer { parts },
        )
    }

    fn parse_mustache(&mut self) -> NodeId {
        let start = self.pos;
        self.push_token(TokenKind::MustacheOpen, start, start + 2);
        let output = script::lex(&self.scanner, start + 2, LexMode::Mustache);
        let expression_end = output.end as u32;

        let lex_failed = output.error.is_some();
        if let Some(error) = output.error {
            self.errors.push(error);
        }
        let expression = if output.closed {
            match script::parse_expression(&output.tokens, expression_end, &mut self.nodes) {
                Ok(expression) => expression,
                Err(error) => {
                    self.errors.push(error);
                    None
                }
            }
        } else {
            None
        };
        self.tokens.extend(output.tokens);

        if output.closed {
            self.push_token(TokenKind::MustacheClose, output.end, output.end + 2);
            self.pos = output.end + 2;
        } else {
            self.pos = output.end.max(start + 2);
            if !lex_failed {
                self.error(
                    ErrorCode::UnterminatedMustache,
                    "Unterminated mustache",
                    start,
                    self.pos,
                );
            }
        }
        self.alloc(
            Span::new(start as u32, self.pos as u32),
            NodeData::Mustache { expression },
        )
    }

    /// Value of a plain attribute on a start tag, quotes stripped
    fn attribute_value(&self, start_tag: NodeId, attribute: &str) -> Option<&'a str> {
        let NodeData::StartTag { attributes, .. } = &self.nodes[start_tag.index()].data else {
            return None;
        };
        attributes.iter().find_map(|id| match &self.nodes[id.index()].data {
            NodeData::Attribute {
                key,
                value: Some(value),
            } if key.name == attribute => {
                let span = self.nodes[value.index()].span;
                let text = &self.scanner.source()[span.start as usize..span.end as usize];
                Some(text.trim_matches(['"', '\'']))
            }
            _ => None,
        })
    }

    /// Whether a script element holds JavaScript
    fn has_script_type(&self, start_tag: NodeId) -> bool {
        match self.attribute_value(start_tag, "type") {
            None => true,
            Some(kind) => {
                kind.is_empty()
                    || kind == "module"
                    || kind.contains("javascript")
                    || kind.contains("ecmascript")
                    || kind.contains("babel")
            }
        }
    }

    /// Offset of `</name` at or after the current position
    fn content_end(&mut self, name: &str) -> usize {
        let needle = format!("</{name}");
        match self.scanner.find(self.pos, &needle) {
            Some(end) => end,
            None => {
                let start = self.pos;
                self.error(
                    ErrorCode::UnterminatedScript,
                    "Missing end tag for raw content",
                    start,
                    self.scanner.len(),
                );
                self.scanner.len()
            }
        }
    }

    fn parse_script_content(&mut self, name: &str) -> Vec<NodeId> {
        let start = self.pos;
        let end = self.content_end(name);
        let output = script::lex(&self.scanner, start, LexMode::Program { end });
        let span = Span::new(start as u32, end as u32);
        self.pos = end;

        if let Some(error) = output.error {
            self.errors.push(error);
            self.tokens.extend(output.tokens);
            return Vec::new();
        }
        let program = script::parse_program(&output.tokens, span, &mut self.nodes);
        self.tokens.extend(output.tokens);
        match program {
            Ok(program) => vec![program],
            Err(error) => {
                self.errors.push(error);
                Vec::new()
            }
        }
    }

    fn parse_raw_text(&mut self, name: &str) -> Vec<NodeId> {
        let start = self.pos;
        let end = self.content_end(name);
        self.pos = end;
        let text = &self.scanner.source()[start..end];
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Vec::new();
        }
        let text_start = start + (text.len() - text.trim_start().len());
        let text_end = text_start + trimmed.len();
        self.push_token(TokenKind::RawText, text_start, text_end);
        vec![self.alloc(
            Span::new(text_start as u32, text_end as u32),
            NodeData::RawText,
        )]
    }

    fn parse_end_tag(&mut self) -> NodeId {
        let bytes = self.scanner.bytes();
        let start = self.pos;
        let mut end = start + 2;
        while end < bytes.len() && !is_name_end(bytes[end]) {
            end += 1;
        }
        self.push_token(TokenKind::EndTagOpen, start, end);
        self.pos = crate::tokenizer::skip_whitespace(bytes, end);
        if self.scanner.byte(self.pos) == Some(GT) {
            self.push_token(TokenKind::TagClose, self.pos, self.pos + 1);
            self.pos += 1;
        } else {
            self.error(
                ErrorCode::UnterminatedTag,
                "Unterminated end tag",
                start,
                self.pos,
            );
            self.pos = end;
        }
        self.alloc(Span::new(start as u32, self.pos as u32), NodeData::EndTag)
    }
}

/// Split a directive key such as `wx:if`, `bindtap` or `bind:tap`
pub fn parse_directive_key(raw: &str, prefixes: &[&str]) -> Option<DirectiveKey> {
    prefixes.iter().find_map(|prefix| {
        let rest = raw.strip_prefix(prefix)?;
        let name = match rest.strip_prefix(':') {
            Some(name) => name,
            // `wx` and `model` always take a colon
            None if *prefix != "wx" && *prefix != "model" => rest,
            None => return None,
        };
        (!name.is_empty()).then(|| DirectiveKey {
            raw: raw.into(),
            prefix: (*prefix).into(),
            name: name.into(),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;
    use gesso_relief::NodeKind;
    use gesso_relief::options::DEFAULT_DIRECTIVE_PREFIXES;

    fn token_values(doc: &Document) -> Vec<(TokenKind, &str)> {
        doc.tokens()
            .iter()
            .filter(|token| !token.is_whitespace())
            .map(|token| (token.kind, token.value.as_str()))
            .collect()
    }

    #[test]
    fn test_directive_keys() {
        let key = parse_directive_key("wx:if", DEFAULT_DIRECTIVE_PREFIXES).unwrap();
        assert_eq!((key.prefix.as_str(), key.name.as_str()), ("wx", "if"));
        let key = parse_directive_key("bindtap", DEFAULT_DIRECTIVE_PREFIXES).unwrap();
        assert_eq!((key.prefix.as_str(), key.name.as_str()), ("bind", "tap"));
        let key = parse_directive_key("capture-bind:tap", DEFAULT_DIRECTIVE_PREFIXES).unwrap();
        assert_eq!(key.prefix, "capture-bind");
        assert!(parse_directive_key("class", DEFAULT_DIRECTIVE_PREFIXES).is_none());
        assert!(parse_directive_key("wxfoo", DEFAULT_DIRECTIVE_PREFIXES).is_none());
    }

    #[test]
    fn test_element_tokens() {
        let doc = parse("<view class=\"a\" wx:if=\"{{ok}}\">\n  hi there\n</view>");
        assert!(doc.errors().is_empty(), "{:?}", doc.errors());
        assert_eq!(
            token_values(&doc),
            vec![
                (TokenKind::TagOpen, "<view"),
                (TokenKind::AttributeName, "class"),
                (TokenKind::Association, "="),
                (TokenKind::AttributeValue, "\"a\""),
                (TokenKind::AttributeName, "wx:if"),
                (TokenKind::Association, "="),
                (TokenKind::Quote, "\""),
                (TokenKind::MustacheOpen, "{{"),
                (TokenKind::Identifier, "ok"),
                (TokenKind::MustacheClose, "}}"),
                (TokenKind::Quote, "\""),
                (TokenKind::TagClose, ">"),
                (TokenKind::Text, "hi"),
                (TokenKind::Text, "there"),
                (TokenKind::EndTagOpen, "</view"),
                (TokenKind::TagClose, ">"),
            ]
        );
        assert_eq!(doc.nodes_of_kind(NodeKind::Directive).len(), 1);
        assert_eq!(doc.nodes_of_kind(NodeKind::ValueContainer).len(), 1);
        let text = doc.nodes_of_kind(NodeKind::Text);
        assert_eq!(text.len(), 1);
        assert_eq!(doc.get(text[0]).text(), "hi there");
    }

    #[test]
    fn test_void_and_self_closing() {
        let doc = parse("<view><input value=\"1\"><image src=a /></view>");
        assert!(doc.errors().is_empty());
        assert_eq!(doc.nodes_of_kind(NodeKind::Element).len(), 3);
        assert_eq!(doc.nodes_of_kind(NodeKind::EndTag).len(), 1);
    }

    #[test]
    fn test_missing_and_stray_end_tags() {
        let doc = parse("<view><text>a</view></span>");
        let codes: Vec<_> = doc.errors().iter().map(|error| error.code).collect();
        assert_eq!(codes, vec![ErrorCode::MissingEndTag, ErrorCode::InvalidEndTag]);
        assert!(!doc.has_fatal_error());
    }

    #[test]
    fn test_script_and_style() {
        let doc = parse("<script>\nconst a = 1\n</script>\n<style>\n.a { color: red }\n</style>");
        assert!(doc.errors().is_empty(), "{:?}", doc.errors());
        assert_eq!(doc.nodes_of_kind(NodeKind::Program).len(), 1);
        let raw = doc.nodes_of_kind(NodeKind::RawText);
        assert_eq!(doc.get(raw[0]).text(), ".a { color: red }");
    }

    #[test]
    fn test_unterminated_comment_is_fatal() {
        let doc = parse("<view><!-- open</view>");
        assert!(doc.has_fatal_error());
    }

    #[test]
    fn test_invalid_mustache_expression_is_recoverable() {
        let doc = parse("<view>{{ a + }}</view>");
        assert_eq!(doc.errors().len(), 1);
        assert_eq!(doc.errors()[0].code, ErrorCode::InvalidExpression);
        let mustache = doc.nodes_of_kind(NodeKind::Mustache)[0];
        assert!(matches!(
            doc.node(mustache).data,
            NodeData::Mustache { expression: None }
        ));
    }
}
