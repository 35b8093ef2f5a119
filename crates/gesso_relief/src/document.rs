//! Parsed document: source, token stream and node arena.

use gesso_carton::LineIndex;

use crate::{
    ast::{Node, NodeData, NodeId, NodeKind},
    errors::ParseError,
    token::{Span, Token, TokenId},
};

/// A parsed template.
///
/// Tokens are sorted by start offset and include comments and the
/// whitespace between words of text content.
#[derive(Debug, Clone)]
pub struct Document {
    source: String,
    line_index: LineIndex,
    tokens: Vec<Token>,
    nodes: Vec<Node>,
    root: NodeId,
    errors: Vec<ParseError>,
}

impl Document {
    /// Assemble a document and link every node to its parent.
    pub fn new(
        source: impl Into<String>,
        mut tokens: Vec<Token>,
        mut nodes: Vec<Node>,
        root: NodeId,
        errors: Vec<ParseError>,
    ) -> Self {
        let source = source.into();
        tokens.sort_by_key(|token| token.span.start);

        let mut links = Vec::new();
        for (index, node) in nodes.iter().enumerate() {
            for child in node.data.children() {
                links.push((child, NodeId(index as u32)));
            }
        }
        for (child, parent) in links {
            if let Some(node) = nodes.get_mut(child.index()) {
                node.parent = Some(parent);
            }
        }

        let line_index = LineIndex::new(&source);
        Self {
            source,
            line_index,
            tokens,
            nodes,
            root,
            errors,
        }
    }

    #[inline]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[inline]
    pub fn line_index(&self) -> &LineIndex {
        &self.line_index
    }

    #[inline]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    #[inline]
    pub fn token(&self, id: TokenId) -> &Token {
        &self.tokens[id.index()]
    }

    #[inline]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    #[inline]
    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    /// Check if any error left the token stream unusable
    pub fn has_fatal_error(&self) -> bool {
        self.errors.iter().any(ParseError::is_fatal)
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> NodeRef<'_> {
        NodeRef { doc: self, id }
    }

    /// Text covered by `span`
    #[inline]
    pub fn slice(&self, span: Span) -> &str {
        &self.source[span.start as usize..span.end as usize]
    }

    /// Nodes of `kind` in document order
    pub fn nodes_of_kind(&self, kind: NodeKind) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            let node = self.node(id);
            if node.kind() == kind {
                out.push(id);
            }
            stack.extend(node.data.children().into_iter().rev());
        }
        out
    }
}

/// Borrowed handle to a node
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'d> {
    pub doc: &'d Document,
    pub id: NodeId,
}

impl<'d> NodeRef<'d> {
    #[inline]
    pub fn node(&self) -> &'d Node {
        self.doc.node(self.id)
    }

    #[inline]
    pub fn data(&self) -> &'d NodeData {
        &self.node().data
    }

    #[inline]
    pub fn kind(&self) -> NodeKind {
        self.node().kind()
    }

    #[inline]
    pub fn span(&self) -> Span {
        self.node().span
    }

    pub fn parent(&self) -> Option<NodeRef<'d>> {
        self.node().parent.map(|id| self.doc.get(id))
    }

    pub fn children(&self) -> impl Iterator<Item = NodeRef<'d>> + 'd {
        let doc = self.doc;
        self.data()
            .children()
            .into_iter()
            .map(move |id| doc.get(id))
    }

    /// Source text of the node
    #[inline]
    pub fn text(&self) -> &'d str {
        self.doc.slice(self.span())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::AttributeKey;

    fn sample() -> Document {
        // <a x></a>
        let nodes = vec![
            Node::new(
                Span::new(0, 9),
                NodeData::Document {
                    children: vec![NodeId(1)],
                },
            ),
            Node::new(
                Span::new(0, 9),
                NodeData::Element {
                    name: "a".into(),
                    start_tag: NodeId(2),
                    children: vec![],
                    end_tag: Some(NodeId(4)),
                },
            ),
            Node::new(
                Span::new(0, 5),
                NodeData::StartTag {
                    attributes: vec![NodeId(3)],
                    self_closing: false,
                },
            ),
            Node::new(
                Span::new(3, 4),
                NodeData::Attribute {
                    key: AttributeKey { name: "x".into() },
                    value: None,
                },
            ),
            Node::new(Span::new(5, 9), NodeData::EndTag),
        ];
        Document::new("<a x></a>", vec![], nodes, NodeId(0), vec![])
    }

    #[test]
    fn test_parents_are_linked() {
        let doc = sample();
        assert_eq!(doc.node(NodeId(3)).parent, Some(NodeId(2)));
        assert_eq!(doc.node(NodeId(2)).parent, Some(NodeId(1)));
        assert_eq!(doc.node(NodeId(4)).parent, Some(NodeId(1)));
        assert_eq!(doc.node(NodeId(0)).parent, None);
    }

    #[test]
    fn test_nodes_of_kind_in_document_order() {
        let doc = sample();
        assert_eq!(doc.nodes_of_kind(NodeKind::StartTag), vec![NodeId(2)]);
        let element = doc.get(NodeId(1));
        let kinds: Vec<_> = element.children().map(|child| child.kind()).collect();
        assert_eq!(kinds, vec![NodeKind::StartTag, NodeKind::EndTag]);
        assert_eq!(doc.get(NodeId(3)).text(), "x");
    }
}
