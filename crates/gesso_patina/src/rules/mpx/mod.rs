//! Template rules for the mpx dialect.

// Essential rules
mod no_duplicate_attributes;
mod valid_wx_else;

pub use no_duplicate_attributes::NoDuplicateAttributes;
pub use valid_wx_else::ValidWxElse;

use gesso_relief::{NodeData, NodeId, NodeRef};

/// Attribute and directive nodes of an element's start tag
pub(crate) fn attributes<'d>(element: NodeRef<'d>) -> impl Iterator<Item = NodeRef<'d>> + 'd {
    let attributes: &'d [NodeId] = match element.data() {
        NodeData::Element { start_tag, .. } => match element.doc.get(*start_tag).data() {
            NodeData::StartTag { attributes, .. } => attributes,
            _ => &[],
        },
        _ => &[],
    };
    let doc = element.doc;
    attributes.iter().map(move |id| doc.get(*id))
}

/// Whether the element carries the `wx:` directive `name`
pub(crate) fn has_wx_directive(element: NodeRef<'_>, name: &str) -> bool {
    attributes(element).any(|attribute| {
        matches!(
            attribute.data(),
            NodeData::Directive { key, .. } if key.prefix == "wx" && key.name == name
        )
    })
}
