//! Node selectors.
//!
//! A small selector language over node kinds and a few node fields:
//!
//! ```text
//! Directive[key.name="if"]
//! BinaryExpression[operator!="+"]:exit
//! *[parent.kind="Mustache"]
//! ```
//!
//! Selectors name what to match; matching itself is a `match` over the
//! node's kind and fields.

use std::str::FromStr;

use gesso_carton::{CompactString, SmallVec};
use gesso_relief::{MethodKind, NodeData, NodeKind, NodeRef, PropertyKind};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    #[error("empty selector")]
    Empty,
    #[error("unknown node kind `{0}`")]
    UnknownKind(CompactString),
    #[error("unknown attribute `{0}`")]
    UnknownAttribute(CompactString),
    #[error("malformed attribute in `{0}`")]
    MalformedAttribute(CompactString),
    #[error("unsupported pseudo-class `{0}`")]
    UnknownPseudo(CompactString),
}

/// Node field a predicate reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributePath {
    Name,
    KeyName,
    KeyPrefix,
    KeyRaw,
    Operator,
    Kind,
    ParentKind,
}

impl AttributePath {
    fn parse(path: &str) -> Option<Self> {
        Some(match path {
            "name" => Self::Name,
            "key.name" => Self::KeyName,
            "key.prefix" => Self::KeyPrefix,
            "key.raw" => Self::KeyRaw,
            "operator" => Self::Operator,
            "kind" => Self::Kind,
            "parent.kind" => Self::ParentKind,
            _ => return None,
        })
    }

    /// Read the field from a node, if the node has it
    pub fn read<'d>(self, node: NodeRef<'d>) -> Option<&'d str> {
        let data = node.data();
        match self {
            Self::Name => match data {
                NodeData::Element { name, .. } | NodeData::Identifier { name } => Some(name.as_str()),
                NodeData::Attribute { key, .. } => Some(key.name.as_str()),
                NodeData::Directive { key, .. } => Some(key.raw.as_str()),
                _ => None,
            },
            Self::KeyName => match data {
                NodeData::Attribute { key, .. } => Some(key.name.as_str()),
                NodeData::Directive { key, .. } => Some(key.name.as_str()),
                _ => None,
            },
            Self::KeyPrefix => match data {
                NodeData::Directive { key, .. } => Some(key.prefix.as_str()),
                _ => None,
            },
            Self::KeyRaw => match data {
                NodeData::Attribute { key, .. } => Some(key.name.as_str()),
                NodeData::Directive { key, .. } => Some(key.raw.as_str()),
                _ => None,
            },
            Self::Operator => match data {
                NodeData::BinaryExpression { operator, .. }
                | NodeData::LogicalExpression { operator, .. }
                | NodeData::AssignmentExpression { operator, .. }
                | NodeData::UnaryExpression { operator, .. }
                | NodeData::UpdateExpression { operator, .. } => Some(operator.as_str()),
                _ => None,
            },
            Self::Kind => match data {
                NodeData::VariableDeclaration { kind, .. } => Some(kind.as_str()),
                NodeData::MethodDefinition { kind, .. } => Some(match kind {
                    MethodKind::Constructor => "constructor",
                    MethodKind::Method => "method",
                    MethodKind::Get => "get",
                    MethodKind::Set => "set",
                }),
                NodeData::Property { kind, .. } => Some(match kind {
                    PropertyKind::Init => "init",
                    PropertyKind::Get => "get",
                    PropertyKind::Set => "set",
                }),
                _ => None,
            },
            Self::ParentKind => node.parent().map(|parent| parent.kind().as_str()),
        }
    }
}

/// `[path="value"]` or `[path!="value"]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    pub path: AttributePath,
    pub value: CompactString,
    pub negated: bool,
}

impl Predicate {
    fn parse(body: &str, selector: &str) -> Result<Self, SelectorError> {
        let malformed = || SelectorError::MalformedAttribute(selector.into());
        let (path, value, negated) = match body.find("!=") {
            Some(at) => (&body[..at], &body[at + 2..], true),
            None => {
                let at = body.find('=').ok_or_else(malformed)?;
                (&body[..at], &body[at + 1..], false)
            }
        };
        let path = path.trim();
        let path =
            AttributePath::parse(path).ok_or_else(|| SelectorError::UnknownAttribute(path.into()))?;
        let value = value.trim();
        let value = match value.as_bytes() {
            [b'"', .., b'"'] | [b'\'', .., b'\''] => &value[1..value.len() - 1],
            [b'"' | b'\'', ..] => return Err(malformed()),
            _ => value,
        };
        Ok(Self {
            path,
            value: value.into(),
            negated,
        })
    }

    pub fn matches(&self, node: NodeRef<'_>) -> bool {
        let equal = self.path.read(node) == Some(self.value.as_str());
        equal != self.negated
    }
}

/// A parsed selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeSelector {
    /// `None` matches every kind
    pub kind: Option<NodeKind>,
    pub predicates: SmallVec<[Predicate; 2]>,
    /// Fires when leaving the node instead of entering it
    pub exit: bool,
}

impl NodeSelector {
    pub fn parse(selector: &str) -> Result<Self, SelectorError> {
        let text = selector.trim();
        if text.is_empty() {
            return Err(SelectorError::Empty);
        }

        let (text, exit) = match text.strip_suffix(":exit") {
            Some(rest) => (rest, true),
            None => (text, false),
        };

        let kind_end = text.find('[').unwrap_or(text.len());
        let kind_name = &text[..kind_end];
        if let Some(colon) = kind_name.find(':') {
            return Err(SelectorError::UnknownPseudo(kind_name[colon..].into()));
        }
        let kind = match kind_name {
            "*" => None,
            "" => return Err(SelectorError::Empty),
            name => Some(
                NodeKind::from_name(name).ok_or_else(|| SelectorError::UnknownKind(name.into()))?,
            ),
        };

        let mut predicates = SmallVec::new();
        let mut rest = &text[kind_end..];
        while !rest.is_empty() {
            let body = rest
                .strip_prefix('[')
                .and_then(|inner| inner.find(']').map(|close| (&inner[..close], &inner[close + 1..])));
            let Some((body, after)) = body else {
                return Err(match rest.find(':') {
                    Some(colon) => SelectorError::UnknownPseudo(rest[colon..].into()),
                    None => SelectorError::MalformedAttribute(selector.into()),
                });
            };
            predicates.push(Predicate::parse(body, selector)?);
            rest = after;
        }

        Ok(Self {
            kind,
            predicates,
            exit,
        })
    }

    /// Kind name written at the start of `selector`, if any
    pub fn kind_name(selector: &str) -> &str {
        let text = selector.trim();
        let end = text.find(['[', ':']).unwrap_or(text.len());
        &text[..end]
    }

    pub fn matches(&self, node: NodeRef<'_>) -> bool {
        self.kind.map_or(true, |kind| node.kind() == kind)
            && self.predicates.iter().all(|predicate| predicate.matches(node))
    }
}

impl FromStr for NodeSelector {
    type Err = SelectorError;

    fn from_str(selector: &str) -> Result<Self, Self::Err> {
        Self::parse(selector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gesso_armature::parse;

    #[test]
    fn test_parse_kinds_and_phase() {
        let selector = NodeSelector::parse("Element").unwrap();
        assert_eq!(selector.kind, Some(NodeKind::Element));
        assert!(!selector.exit);

        let selector: NodeSelector = "Document:exit".parse().unwrap();
        assert_eq!(selector.kind, Some(NodeKind::Document));
        assert!(selector.exit);

        let selector = NodeSelector::parse("*").unwrap();
        assert_eq!(selector.kind, None);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(NodeSelector::parse("  "), Err(SelectorError::Empty));
        assert_eq!(
            NodeSelector::parse("VElement"),
            Err(SelectorError::UnknownKind("VElement".into()))
        );
        assert_eq!(
            NodeSelector::parse("Element:first-child"),
            Err(SelectorError::UnknownPseudo(":first-child".into()))
        );
        assert_eq!(
            NodeSelector::parse("Directive[key.size=\"1\"]"),
            Err(SelectorError::UnknownAttribute("key.size".into()))
        );
        assert!(matches!(
            NodeSelector::parse("Directive[key.name]"),
            Err(SelectorError::MalformedAttribute(_))
        ));
    }

    #[test]
    fn test_match_directive_fields() {
        let doc = parse("<view wx:if=\"{{a}}\" bindtap=\"go\" class=\"x\"></view>");
        let directives = doc.nodes_of_kind(NodeKind::Directive);
        let if_directive = doc.get(directives[0]);
        let tap_directive = doc.get(directives[1]);

        let selector = NodeSelector::parse("Directive[key.name=\"if\"]").unwrap();
        assert!(selector.matches(if_directive));
        assert!(!selector.matches(tap_directive));

        let selector = NodeSelector::parse("Directive[key.prefix!='wx']").unwrap();
        assert!(!selector.matches(if_directive));
        assert!(selector.matches(tap_directive));

        let attribute = doc.get(doc.nodes_of_kind(NodeKind::Attribute)[0]);
        let selector = NodeSelector::parse("*[key.name=class][parent.kind=StartTag]").unwrap();
        assert!(selector.matches(attribute));
        assert!(!selector.matches(if_directive));
    }

    #[test]
    fn test_match_operator() {
        let doc = parse("<view>{{ a == b }}</view>");
        let binary = doc.get(doc.nodes_of_kind(NodeKind::BinaryExpression)[0]);
        assert!(NodeSelector::parse("BinaryExpression[operator=\"==\"]")
            .unwrap()
            .matches(binary));
        assert!(!NodeSelector::parse("BinaryExpression[operator=\"===\"]")
            .unwrap()
            .matches(binary));
    }

    #[test]
    fn test_kind_name() {
        assert_eq!(NodeSelector::kind_name("Program:exit"), "Program");
        assert_eq!(NodeSelector::kind_name("Directive[key.name=\"if\"]"), "Directive");
        assert_eq!(NodeSelector::kind_name("*"), "*");
    }
}
