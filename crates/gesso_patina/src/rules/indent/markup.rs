//! Offsets of markup nodes.

use gesso_armature::TokenQuery;
use gesso_relief::{NodeData, NodeId, NodeKind, NodeRef, TokenId, TokenKind};

use super::node_list::{present, Bound};
use super::IndentVisitor;

impl<'a> IndentVisitor<'a> {
    pub(super) fn process_markup(&mut self, node: NodeRef<'a>) {
        match node.data() {
            NodeData::Attribute { .. } | NodeData::Directive { .. } => self.process_attribute(node),
            NodeData::Element {
                name,
                start_tag,
                children,
                end_tag,
            } => {
                if self.settings.is_preformatted(name) {
                    self.process_preformatted(node, *start_tag, *end_tag);
                } else {
                    let top_level = node
                        .parent()
                        .is_some_and(|parent| parent.kind() == NodeKind::Document);
                    let offset = if top_level { self.settings.base_indent } else { 1 };
                    self.process_node_list(
                        &present(children),
                        Some(Bound::Node(*start_tag)),
                        end_tag.map(Bound::Node),
                        offset,
                        false,
                    );
                }
            }
            NodeData::StartTag { attributes, .. } => {
                let open = self.first(node.id);
                let close = self.last(node.id);
                self.process_node_list(
                    &present(attributes),
                    open.map(Bound::Token),
                    None,
                    self.settings.attribute,
                    self.settings.align_attributes_vertically,
                );
                if let Some(close) = close.filter(|close| Some(*close) != open) {
                    let offset = match self.token(close).kind {
                        TokenKind::TagClose => self.settings.close_bracket.start_tag,
                        TokenKind::SelfClosingTagClose => self.settings.close_bracket.self_closing_tag,
                        _ => return,
                    };
                    self.table.set_offset(Some(close), offset, open);
                }
            }
            NodeData::EndTag => {
                let Some(element) = node.parent() else {
                    return;
                };
                let open = self.first(element.id);
                let close = self.last(node.id);
                if close.is_some_and(|close| self.token(close).kind == TokenKind::TagClose) {
                    self.table
                        .set_offset(close, self.settings.close_bracket.end_tag, open);
                }
            }
            NodeData::ValueContainer { parts } => {
                let open = self.first(node.id);
                let close = self
                    .last(node.id)
                    .filter(|close| Some(*close) != open && self.token(*close).kind == TokenKind::Quote);
                self.process_node_list(
                    &present(parts),
                    open.map(Bound::Token),
                    close.map(Bound::Token),
                    1,
                    true,
                );
            }
            NodeData::Text => {
                // Every word of a text run indents like its first word.
                let tokens = self.store.tokens_of(node.id, &TokenQuery::CODE);
                if let Some((first, rest)) = tokens.split_first() {
                    for token in rest {
                        self.table.copy_entry(*first, *token);
                    }
                }
            }
            NodeData::Mustache { expression } => {
                if expression.is_none() {
                    return;
                }
                let open = self.first(node.id);
                let close = self
                    .last(node.id)
                    .filter(|close| self.token(*close).kind == TokenKind::MustacheClose);
                self.table
                    .set_offset(open.and_then(|open| self.after(open)), 1, open);
                self.table.set_offset(close, 0, open);
            }
            NodeData::RawText => self.ignore_node(node.id),
            _ => {}
        }
    }

    /// `=` and the value indent one unit past the attribute name
    fn process_attribute(&mut self, node: NodeRef<'a>) {
        let Some(key) = self.first(node.id) else {
            return;
        };
        let end = node.span().end;
        let Some(eq) = self
            .after(key)
            .filter(|eq| self.token(*eq).span.end <= end)
        else {
            return;
        };
        self.table.set_offset(Some(eq), 1, Some(key));
        let value = self
            .after(eq)
            .filter(|value| self.token(*value).span.end <= end);
        self.table.set_offset(value, 1, Some(key));
    }

    /// Content of a preformatted element keeps its own layout; only the
    /// end tag is aligned with the start tag.
    fn process_preformatted(&mut self, node: NodeRef<'a>, start_tag: NodeId, end_tag: Option<NodeId>) {
        let open = self.first(node.id);
        let end = end_tag.and_then(|end_tag| self.first(end_tag));
        self.table.set_offset(end, 0, open);

        let content_start = self.node(start_tag).span().end;
        let content_end = end.map_or(node.span().end, |end| self.token(end).span.start);
        let content: Vec<TokenId> = self
            .store
            .tokens_of(node.id, &TokenQuery::WITH_COMMENTS)
            .into_iter()
            .filter(|token| {
                let span = self.token(*token).span;
                span.start >= content_start && span.end <= content_end
            })
            .collect();
        self.table.ignore(content);
    }
}
