//! Retargeting generic handlers onto template documents.
//!
//! Core rules key their handlers by selector strings written for script
//! trees. [`adapt_generic_visitor`] parses those selectors, renaming node
//! kinds through a key mapping first (a whole-file `Program` handler becomes
//! a `Document` handler), and returns a [`SelectorVisitor`] that the
//! traversal driver runs like any other stateful visitor.

use std::borrow::Cow;

use gesso_carton::CompactString;
use gesso_relief::{NodeKind, NodeRef};

use crate::context::LintContext;
use crate::rule::NodeVisitor;
use crate::selector::{NodeSelector, SelectorError};

/// Handler called with each matching node
pub type GenericHandler<'a> = Box<dyn FnMut(&mut LintContext<'a>, NodeRef<'a>) + 'a>;

/// Handlers keyed by selector strings, in registration order
#[derive(Default)]
pub struct GenericHandlers<'a> {
    entries: Vec<(CompactString, GenericHandler<'a>)>,
}

impl<'a> GenericHandlers<'a> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Add a handler for `selector`
    pub fn on(
        mut self,
        selector: &str,
        handler: impl FnMut(&mut LintContext<'a>, NodeRef<'a>) + 'a,
    ) -> Self {
        self.entries.push((selector.into(), Box::new(handler)));
        self
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Kind renames applied to selectors, `(from, to)`
pub type KeyMapping = &'static [(&'static str, &'static str)];

/// Build a visitor from `handlers`, renaming selector kinds through
/// `key_mapping`
pub fn adapt_generic_visitor<'a>(
    handlers: GenericHandlers<'a>,
    key_mapping: &[(&str, &str)],
) -> Result<SelectorVisitor<'a>, SelectorError> {
    let entries = handlers
        .entries
        .into_iter()
        .map(|(selector, handler)| {
            let selector = remap_selector(&selector, key_mapping);
            Ok((NodeSelector::parse(&selector)?, handler))
        })
        .collect::<Result<Vec<_>, SelectorError>>()?;
    Ok(SelectorVisitor {
        entries,
        template_only: false,
        script_depth: 0,
    })
}

fn remap_selector<'s>(selector: &'s str, key_mapping: &[(&str, &str)]) -> Cow<'s, str> {
    let kind = NodeSelector::kind_name(selector);
    match key_mapping.iter().find(|(from, _)| *from == kind) {
        Some((_, to)) => {
            let rest = &selector.trim()[kind.len()..];
            Cow::Owned(format!("{to}{rest}"))
        }
        None => Cow::Borrowed(selector),
    }
}

/// Runs selector-keyed handlers during traversal
pub struct SelectorVisitor<'a> {
    entries: Vec<(NodeSelector, GenericHandler<'a>)>,
    template_only: bool,
    /// Nesting depth inside script element bodies
    script_depth: u32,
}

impl<'a> SelectorVisitor<'a> {
    /// Skip everything inside script element bodies, so only template
    /// expressions reach the handlers
    pub fn template_only(mut self) -> Self {
        self.template_only = true;
        self
    }

    fn dispatch(&mut self, ctx: &mut LintContext<'a>, node: NodeRef<'a>, exit: bool) {
        for (selector, handler) in self.entries.iter_mut() {
            if selector.exit == exit && selector.matches(node) {
                handler(ctx, node);
            }
        }
    }
}

impl<'a> NodeVisitor<'a> for SelectorVisitor<'a> {
    fn enter(&mut self, ctx: &mut LintContext<'a>, node: NodeRef<'a>) {
        if self.template_only && node.kind() == NodeKind::Program {
            self.script_depth += 1;
        }
        if self.script_depth == 0 {
            self.dispatch(ctx, node, false);
        }
    }

    fn exit(&mut self, ctx: &mut LintContext<'a>, node: NodeRef<'a>) {
        if self.script_depth == 0 {
            self.dispatch(ctx, node, true);
        }
        if self.template_only && node.kind() == NodeKind::Program {
            self.script_depth = self.script_depth.saturating_sub(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gesso_armature::parse;
    use std::cell::RefCell;

    fn walk<'a>(visitor: &mut SelectorVisitor<'a>, ctx: &mut LintContext<'a>, node: NodeRef<'a>) {
        visitor.enter(ctx, node);
        for child in node.children() {
            walk(visitor, ctx, child);
        }
        visitor.exit(ctx, node);
    }

    #[test]
    fn test_remap_selector() {
        let mapping = [("Program", "Document")];
        assert_eq!(remap_selector("Program:exit", &mapping), "Document:exit");
        assert_eq!(remap_selector("Program", &mapping), "Document");
        assert_eq!(
            remap_selector("BinaryExpression[operator=\"==\"]", &mapping),
            "BinaryExpression[operator=\"==\"]"
        );
    }

    #[test]
    fn test_unknown_kind_is_an_error() {
        let handlers = GenericHandlers::new().on("VElement", |_, _| {});
        assert!(matches!(
            adapt_generic_visitor(handlers, &[]),
            Err(SelectorError::UnknownKind(_))
        ));
    }

    #[test]
    fn test_handlers_fire_by_phase() {
        let doc = parse("<view>{{ a }}</view>");
        let seen = RefCell::new(Vec::new());
        let handlers = GenericHandlers::new()
            .on("Identifier", |_, node| seen.borrow_mut().push(node.text().to_string()))
            .on("Program:exit", |_, _| seen.borrow_mut().push("done".to_string()));
        assert_eq!(handlers.len(), 2);

        let mut visitor = adapt_generic_visitor(handlers, &[("Program", "Document")]).unwrap();
        let mut ctx = LintContext::new(doc.source(), "test.wxml");
        walk(&mut visitor, &mut ctx, doc.get(doc.root()));
        assert_eq!(*seen.borrow(), ["a", "done"]);
    }

    #[test]
    fn test_empty_handlers_adapt_to_a_silent_visitor() {
        let handlers = GenericHandlers::new();
        assert!(handlers.is_empty());
        assert_eq!(handlers.len(), 0);

        let doc = parse("<view>{{ a == b }}</view>");
        let mut visitor = adapt_generic_visitor(handlers, &[("Program", "Document")]).unwrap();
        let mut ctx = LintContext::new(doc.source(), "test.wxml");
        walk(&mut visitor, &mut ctx, doc.get(doc.root()));
        assert!(ctx.into_diagnostics().is_empty());
    }

    #[test]
    fn test_template_only_skips_script_bodies() {
        let doc = parse("<wxs module=\"m\">\nvar b = c\n</wxs>\n<view>{{ a }}</view>");
        let seen = RefCell::new(Vec::new());
        let handlers = GenericHandlers::new()
            .on("Identifier", |_, node| seen.borrow_mut().push(node.text().to_string()));

        let mut visitor = adapt_generic_visitor(handlers, &[]).unwrap().template_only();
        let mut ctx = LintContext::new(doc.source(), "test.wxml");
        walk(&mut visitor, &mut ctx, doc.get(doc.root()));
        assert_eq!(*seen.borrow(), ["a"]);
    }
}
