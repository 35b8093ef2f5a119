//! Shared offset builders: delimited node lists, parenthesized nodes and
//! bodies that may or may not be blocks.

use gesso_armature::TokenQuery;
use gesso_carton::SmallVec;
use gesso_relief::{NodeId, NodeRef, Token, TokenId, TokenKind};

use super::IndentVisitor;

/// A list delimiter: either a node (its first token counts) or a token
#[derive(Debug, Clone, Copy)]
pub(super) enum Bound {
    Node(NodeId),
    Token(TokenId),
}

pub(super) fn is_open_paren(token: &Token) -> bool {
    token.is_punct("(")
}

pub(super) fn is_close_paren(token: &Token) -> bool {
    token.is_punct(")")
}

pub(super) fn is_not_close_paren(token: &Token) -> bool {
    !is_close_paren(token)
}

pub(super) fn is_not_open_paren(token: &Token) -> bool {
    !is_open_paren(token)
}

pub(super) fn is_open_bracket(token: &Token) -> bool {
    token.is_punct("[")
}

pub(super) fn is_close_bracket(token: &Token) -> bool {
    token.is_punct("]")
}

pub(super) fn is_open_brace(token: &Token) -> bool {
    token.is_punct("{")
}

pub(super) fn is_close_brace(token: &Token) -> bool {
    token.is_punct("}")
}

pub(super) fn is_semicolon(token: &Token) -> bool {
    token.is_punct(";")
}

pub(super) fn is_arrow(token: &Token) -> bool {
    token.is_punct("=>")
}

pub(super) fn is_optional_chain(token: &Token) -> bool {
    token.is_punct("?.")
}

/// Tokens that close a construct; a comment right above one may keep the
/// indentation of the content it closes.
pub(super) fn is_closing(token: &Token) -> bool {
    is_close_paren(token)
        || is_close_bracket(token)
        || is_close_brace(token)
        || matches!(token.kind, TokenKind::EndTagOpen | TokenKind::MustacheClose)
}

/// Wrap every id as a present list item
pub(super) fn present(ids: &[NodeId]) -> SmallVec<[Option<NodeId>; 8]> {
    ids.iter().copied().map(Some).collect()
}

impl<'a> IndentVisitor<'a> {
    fn bound_first(&self, bound: Bound) -> Option<TokenId> {
        match bound {
            Bound::Node(node) => self.first(node),
            Bound::Token(token) => Some(token),
        }
    }

    fn bound_end(&self, bound: Bound) -> u32 {
        match bound {
            Bound::Node(node) => self.node(node).span().end,
            Bound::Token(token) => self.token(token).span.end,
        }
    }

    /// Code and comment tokens after `from` that end at or before `until`
    fn tokens_until(&self, from: Bound, until: u32) -> SmallVec<[TokenId; 4]> {
        let query = TokenQuery::WITH_COMMENTS;
        let mut next = match from {
            Bound::Node(node) => self.store.token_after_node(node, &query),
            Bound::Token(token) => self.store.token_after(token, &query),
        };
        let mut out = SmallVec::new();
        while let Some(token) = next {
            if self.token(token).span.end > until {
                break;
            }
            out.push(token);
            next = self.store.token_after(token, &query);
        }
        out
    }

    /// First and last tokens of `node`, widened over wrapping parentheses
    /// that start at or after `border`.
    pub(super) fn first_and_last_tokens(
        &self,
        node: NodeId,
        border: u32,
    ) -> Option<(TokenId, TokenId)> {
        let mut first = self.first(node)?;
        let mut last = self.last(node)?;
        while let (Some(open), Some(close)) = (self.before(first), self.after(last)) {
            let open_token = self.token(open);
            if !is_open_paren(open_token)
                || !is_close_paren(self.token(close))
                || open_token.span.start < border
            {
                break;
            }
            first = open;
            last = close;
        }
        Some((first, last))
    }

    /// Whether any item starts on a later line than the previous item ends
    fn begins_any_line(&self, nodes: &[Option<NodeId>]) -> bool {
        let mut previous: Option<NodeRef<'a>> = None;
        for node in nodes.iter().flatten() {
            let node = self.node(*node);
            if let Some(previous) = previous {
                if self.line_of(node.span().start) != self.line_of(previous.span().end) {
                    return true;
                }
            }
            previous = Some(node);
        }
        false
    }

    /// Offsets of a delimited list.
    ///
    /// The first item is `offset` units past `left`. Later items align with
    /// the first one, or with `left` when vertical alignment is off. When
    /// any item starts a line the first item becomes a baseline, so items
    /// sharing its line align to its printed column. Separators and
    /// comments between items follow the items; `right` aligns with `left`.
    pub(super) fn process_node_list(
        &mut self,
        nodes: &[Option<NodeId>],
        left: Option<Bound>,
        right: Option<Bound>,
        offset: u32,
        align_vertically: bool,
    ) {
        let left_token = left.and_then(|bound| self.bound_first(bound));
        let right_token = right.and_then(|bound| self.bound_first(bound));

        if !nodes.is_empty() {
            let mut base: Option<TokenId> = None;
            let mut previous = left;
            let mut before_base: SmallVec<[TokenId; 4]> = SmallVec::new();
            let mut aligned: SmallVec<[TokenId; 8]> = SmallVec::new();

            for node in nodes.iter().flatten() {
                let border = previous.map_or(0, |bound| self.bound_end(bound));
                let Some((first, last)) = self.first_and_last_tokens(*node, border) else {
                    continue;
                };

                if let Some(previous) = previous {
                    let between = self.tokens_until(previous, self.token(first).span.start);
                    if base.is_none() {
                        before_base.extend(between);
                    } else {
                        aligned.extend(between);
                    }
                }

                if base.is_none() {
                    base = Some(first);
                } else {
                    aligned.push(first);
                }
                previous = Some(Bound::Token(last));
            }

            if let (Some(right_token), Some(previous)) = (right_token, previous) {
                let trailing = self.tokens_until(previous, self.token(right_token).span.start);
                if base.is_none() {
                    before_base.extend(trailing);
                } else {
                    aligned.extend(trailing);
                }
            }

            if left_token.is_some() {
                self.table.set_offsets(before_base, offset, left_token);
            }
            if let Some(base) = base {
                if left_token.is_some() {
                    self.table.set_offset(Some(base), offset, left_token);
                }
                if self.begins_any_line(nodes) {
                    self.table.set_baseline(Some(base));
                }
                if !align_vertically && left_token.is_some() {
                    self.table.set_offsets(aligned, offset, left_token);
                } else {
                    self.table.set_offsets(aligned, 0, Some(base));
                }
            }
        }

        if right_token.is_some() {
            self.table.set_offset(right_token, 0, left_token);
        }
    }

    /// A body that is a block aligns with `base`; any other body is
    /// indented one unit.
    pub(super) fn process_maybe_block(&mut self, body: NodeId, base: Option<TokenId>) {
        let Some((first, _)) = self.first_and_last_tokens(body, 0) else {
            return;
        };
        let offset = if is_open_brace(self.token(first)) { 0 } else { 1 };
        self.table.set_offset(Some(first), offset, base);
    }

    /// Offsets for every pair of parentheses wrapping an expression
    pub(super) fn process_parens(&mut self, node: NodeRef<'a>) {
        let Some(mut first) = self.first(node.id) else {
            return;
        };
        let mut left = self.before_node(node.id);
        let mut right = self.after_node(node.id);
        while let (Some(open), Some(close)) = (left, right) {
            if !is_open_paren(self.token(open)) || !is_close_paren(self.token(close)) {
                break;
            }
            self.table.set_offset(Some(first), 1, Some(open));
            self.table.set_offset(Some(close), 0, Some(open));
            first = open;
            left = self.before(open);
            right = self.after(close);
        }
    }

    /// The trailing `;` of a statement aligns with its first token. A
    /// leading `;` written on the statement's line shares its entry.
    pub(super) fn process_semicolons(&mut self, node: NodeRef<'a>) {
        let (Some(first), Some(last)) = (self.first(node.id), self.last(node.id)) else {
            return;
        };
        if first != last && is_semicolon(self.token(last)) {
            self.table.set_offset(Some(last), 0, Some(first));
        }

        let Some(previous) = self.before(first) else {
            return;
        };
        let previous_token = self.token(previous);
        if self.table.get(first).is_some()
            && is_semicolon(previous_token)
            && previous_token.loc.end.line == self.token(first).loc.start.line
        {
            self.table.copy_entry(first, previous);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::linter::Linter;

    fn lint(source: &str) -> Vec<String> {
        Linter::new()
            .with_enabled_rules(Some(vec!["mpx/indent".to_string()]))
            .lint(source, "test.wxml")
            .diagnostics
            .into_iter()
            .map(|diagnostic| diagnostic.message.to_string())
            .collect()
    }

    #[test]
    fn test_attributes_align_with_first_attribute() {
        let source = "<view class=\"a\"\n      id=\"b\"\n      style=\"c\">\n</view>";
        assert!(lint(source).is_empty());
    }

    #[test]
    fn test_attributes_on_own_lines() {
        let source = "<view\n  class=\"a\"\n  id=\"b\"\n>\n</view>";
        assert!(lint(source).is_empty());

        let source = "<view\n  class=\"a\"\n    id=\"b\"\n>\n</view>";
        assert_eq!(
            lint(source),
            ["Expected indentation of 2 spaces but found 4 spaces."]
        );
    }

    #[test]
    fn test_list_items_follow_baseline_column() {
        let source = "<view>\n  {{ [a,\n      b] }}\n</view>";
        assert!(lint(source).is_empty());
    }

    #[test]
    fn test_comment_in_empty_list() {
        let source = "<wxs module=\"m\">\nfoo(\n  // nothing yet\n)\n</wxs>";
        assert!(lint(source).is_empty());
    }
}
