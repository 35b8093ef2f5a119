//! Token store: ordered token queries over a parsed [`Document`].
//!
//! The starting index of a lookup is a binary search over the source-ordered
//! token vector; from there the lookup scans forward or backward until the
//! query accepts a token.
//! Default queries skip comments and whitespace.

use gesso_relief::{Document, NodeId, Span, Token, TokenId};

/// Which tokens a query may return
#[derive(Clone, Copy, Default)]
pub struct TokenQuery<'f> {
    pub include_comments: bool,
    pub include_whitespace: bool,
    pub filter: Option<&'f dyn Fn(&Token) -> bool>,
}

impl<'f> TokenQuery<'f> {
    /// Code tokens only
    pub const CODE: TokenQuery<'static> = TokenQuery {
        include_comments: false,
        include_whitespace: false,
        filter: None,
    };

    /// Code and comment tokens
    pub const WITH_COMMENTS: TokenQuery<'static> = TokenQuery {
        include_comments: true,
        include_whitespace: false,
        filter: None,
    };

    pub fn filter(filter: &'f dyn Fn(&Token) -> bool) -> Self {
        Self {
            filter: Some(filter),
            ..Default::default()
        }
    }

    pub fn accepts(&self, token: &Token) -> bool {
        (self.include_comments || !token.is_comment())
            && (self.include_whitespace || !token.is_whitespace())
            && self.filter.map_or(true, |filter| filter(token))
    }
}

impl std::fmt::Debug for TokenQuery<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenQuery")
            .field("include_comments", &self.include_comments)
            .field("include_whitespace", &self.include_whitespace)
            .field("filter", &self.filter.is_some())
            .finish()
    }
}

/// Token queries over one document
#[derive(Debug, Clone, Copy)]
pub struct TokenStore<'d> {
    doc: &'d Document,
}

impl<'d> TokenStore<'d> {
    pub fn new(doc: &'d Document) -> Self {
        Self { doc }
    }

    #[inline]
    pub fn document(&self) -> &'d Document {
        self.doc
    }

    #[inline]
    pub fn get(&self, id: TokenId) -> &'d Token {
        self.doc.token(id)
    }

    #[inline]
    fn tokens(&self) -> &'d [Token] {
        self.doc.tokens()
    }

    /// Index of the first token starting at or after `offset`
    #[inline]
    fn index_at(&self, offset: u32) -> usize {
        self.tokens().partition_point(|token| token.span.start < offset)
    }

    /// Index range of the tokens inside `span`
    fn range(&self, span: Span) -> std::ops::Range<usize> {
        let start = self.index_at(span.start);
        let end = self.tokens().partition_point(|token| token.span.end <= span.end);
        start..end.max(start)
    }

    fn find_forward(&self, from: usize, until: usize, query: &TokenQuery<'_>) -> Option<TokenId> {
        (from..until.min(self.tokens().len()))
            .find(|&index| query.accepts(&self.tokens()[index]))
            .map(|index| TokenId(index as u32))
    }

    fn find_backward(&self, from: usize, until: usize, query: &TokenQuery<'_>) -> Option<TokenId> {
        (until..from.min(self.tokens().len()))
            .rev()
            .find(|&index| query.accepts(&self.tokens()[index]))
            .map(|index| TokenId(index as u32))
    }

    /// All tokens of a node
    pub fn tokens_of(&self, node: NodeId, query: &TokenQuery<'_>) -> Vec<TokenId> {
        let range = self.range(self.doc.node(node).span);
        range
            .filter(|&index| query.accepts(&self.tokens()[index]))
            .map(|index| TokenId(index as u32))
            .collect()
    }

    pub fn first_token(&self, node: NodeId) -> Option<TokenId> {
        self.first_token_skip(node, 0)
    }

    pub fn last_token(&self, node: NodeId) -> Option<TokenId> {
        self.last_token_skip(node, 0)
    }

    /// The `skip`th code token of a node, counted from its start
    pub fn first_token_skip(&self, node: NodeId, skip: usize) -> Option<TokenId> {
        let range = self.range(self.doc.node(node).span);
        range
            .filter(|&index| TokenQuery::CODE.accepts(&self.tokens()[index]))
            .nth(skip)
            .map(|index| TokenId(index as u32))
    }

    /// The `skip`th code token of a node, counted from its end
    pub fn last_token_skip(&self, node: NodeId, skip: usize) -> Option<TokenId> {
        let range = self.range(self.doc.node(node).span);
        range
            .rev()
            .filter(|&index| TokenQuery::CODE.accepts(&self.tokens()[index]))
            .nth(skip)
            .map(|index| TokenId(index as u32))
    }

    pub fn token_before(&self, token: TokenId, query: &TokenQuery<'_>) -> Option<TokenId> {
        self.find_backward(token.index(), 0, query)
    }

    pub fn token_after(&self, token: TokenId, query: &TokenQuery<'_>) -> Option<TokenId> {
        self.find_forward(token.index() + 1, usize::MAX, query)
    }

    /// Closest token ending at or before the node's start
    pub fn token_before_node(&self, node: NodeId, query: &TokenQuery<'_>) -> Option<TokenId> {
        let start = self.index_at(self.doc.node(node).span.start);
        self.find_backward(start, 0, query)
    }

    /// Closest token starting at or after the node's end
    pub fn token_after_node(&self, node: NodeId, query: &TokenQuery<'_>) -> Option<TokenId> {
        let end = self.index_at(self.doc.node(node).span.end);
        self.find_forward(end, usize::MAX, query)
    }

    /// Tokens strictly between two tokens
    pub fn tokens_between(&self, left: TokenId, right: TokenId, query: &TokenQuery<'_>) -> Vec<TokenId> {
        (left.index() + 1..right.index())
            .filter(|&index| query.accepts(&self.tokens()[index]))
            .map(|index| TokenId(index as u32))
            .collect()
    }

    /// Token starting exactly at `offset`
    pub fn token_at(&self, offset: u32) -> Option<TokenId> {
        let index = self.index_at(offset);
        self.tokens()
            .get(index)
            .filter(|token| token.span.start == offset)
            .map(|_| TokenId(index as u32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;
    use gesso_relief::NodeKind;

    fn values(store: &TokenStore<'_>, ids: &[TokenId]) -> Vec<String> {
        ids.iter().map(|&id| store.get(id).value.to_string()).collect()
    }

    #[test]
    fn test_first_and_last_tokens() {
        let doc = parse("<view a=\"1\">\n  <!-- c -->\n  {{ x }}\n</view>");
        let store = TokenStore::new(&doc);
        let element = doc.nodes_of_kind(NodeKind::Element)[0];
        let first = store.first_token(element).unwrap();
        let last = store.last_token(element).unwrap();
        assert_eq!(store.get(first).value, "<view");
        assert_eq!(store.get(last).value, ">");
        let second_last = store.last_token_skip(element, 1).unwrap();
        assert_eq!(store.get(second_last).value, "</view");
        let second = store.first_token_skip(element, 1).unwrap();
        assert_eq!(store.get(second).value, "a");
    }

    #[test]
    fn test_comment_queries() {
        let doc = parse("<view>\n  <!-- c -->\n  {{ x }}\n</view>");
        let store = TokenStore::new(&doc);
        let mustache = doc.nodes_of_kind(NodeKind::Mustache)[0];
        let open = store.first_token(mustache).unwrap();

        let before = store.token_before(open, &TokenQuery::CODE).unwrap();
        assert_eq!(store.get(before).value, ">");
        let comment = store.token_before(open, &TokenQuery::WITH_COMMENTS).unwrap();
        assert_eq!(store.get(comment).value, "<!-- c -->");

        let element = doc.nodes_of_kind(NodeKind::Element)[0];
        let all = store.tokens_of(element, &TokenQuery::WITH_COMMENTS);
        assert_eq!(
            values(&store, &all),
            ["<view", ">", "<!-- c -->", "{{", "x", "}}", "</view", ">"]
        );
    }

    #[test]
    fn test_between_and_around_nodes() {
        let doc = parse("<view>{{ (a + b) }}</view>");
        let store = TokenStore::new(&doc);
        let binary = doc.nodes_of_kind(NodeKind::BinaryExpression)[0];
        let before = store.token_before_node(binary, &TokenQuery::CODE).unwrap();
        let after = store.token_after_node(binary, &TokenQuery::CODE).unwrap();
        assert_eq!(store.get(before).value, "(");
        assert_eq!(store.get(after).value, ")");

        let first = store.first_token(binary).unwrap();
        let last = store.last_token(binary).unwrap();
        let between = store.tokens_between(first, last, &TokenQuery::CODE);
        assert_eq!(values(&store, &between), ["+"]);

        let is_paren = |token: &Token| token.value == ")";
        let query = TokenQuery::filter(&is_paren);
        let paren = store.token_after(first, &query).unwrap();
        assert_eq!(store.get(paren).span.start, 15);
        assert_eq!(store.token_at(15), Some(paren));
    }

    #[test]
    fn test_filtered_lookups_scan_past_rejected_tokens() {
        let doc = parse("<view>\n  <!-- c -->\n  {{ a + b + c }}\n</view>");
        let store = TokenStore::new(&doc);
        let mustache = doc.nodes_of_kind(NodeKind::Mustache)[0];
        let open = store.first_token(mustache).unwrap();
        let close = store.last_token(mustache).unwrap();

        let is_plus = |token: &Token| token.value == "+";
        let query = TokenQuery::filter(&is_plus);
        let first_plus = store.token_after(open, &query).unwrap();
        let last_plus = store.token_before(close, &query).unwrap();
        assert!(first_plus < last_plus);
        assert_eq!(
            values(&store, &store.tokens_between(first_plus, last_plus, &TokenQuery::CODE)),
            ["b"]
        );

        // Comments stay hidden from filtered queries
        let is_view = |token: &Token| token.value == "<view";
        let view = store.token_before_node(mustache, &TokenQuery::filter(&is_view));
        assert_eq!(view.map(|id| store.get(id).span.start), Some(0));
        let is_comment = |token: &Token| token.is_comment();
        assert_eq!(store.token_before(open, &TokenQuery::filter(&is_comment)), None);
    }
}
