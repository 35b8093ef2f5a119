//! Traversal driver for lint rule execution.
//!
//! Walks the node arena in strict pre-order. Stateful rule visitors see
//! every node on enter and exit; stateless rules are dispatched by node kind.

use crate::context::LintContext;
use crate::rule::{NodeVisitor, Rule};
use crate::source_view::ScopedSourceView;
use gesso_relief::{Document, NodeKind, NodeRef};

/// Visit the document and run all rules
pub struct LintVisitor<'a, 'ctx, 'rules> {
    ctx: &'ctx mut LintContext<'a>,
    rules: &'rules [Box<dyn Rule>],
    /// Stateful visitors with the name of the rule that created them
    visitors: Vec<(&'static str, Box<dyn NodeVisitor<'a> + 'a>)>,
}

impl<'a, 'ctx, 'rules> LintVisitor<'a, 'ctx, 'rules> {
    /// Create a new visitor, asking every rule for its stateful visitor
    pub fn new(
        ctx: &'ctx mut LintContext<'a>,
        rules: &'rules [Box<dyn Rule>],
        view: &ScopedSourceView<'a>,
    ) -> Self {
        let visitors = rules
            .iter()
            .filter(|rule| ctx.is_rule_enabled(rule.meta().name))
            .filter_map(|rule| {
                rule.create_visitor(view)
                    .map(|visitor| (rule.meta().name, visitor))
            })
            .collect();
        Self {
            ctx,
            rules,
            visitors,
        }
    }

    /// Visit the document root and traverse the tree
    pub fn visit_document(&mut self, doc: &'a Document) {
        for rule in self.rules.iter() {
            self.ctx.current_rule = rule.meta().name;
            rule.run_on_document(self.ctx, doc);
        }

        self.visit_node(doc.get(doc.root()));
    }

    fn visit_node(&mut self, node: NodeRef<'a>) {
        for (name, visitor) in self.visitors.iter_mut() {
            self.ctx.current_rule = *name;
            visitor.enter(self.ctx, node);
        }

        match node.kind() {
            NodeKind::Element => {
                for rule in self.rules.iter() {
                    self.ctx.current_rule = rule.meta().name;
                    rule.enter_element(self.ctx, node);
                }
            }
            NodeKind::Directive => {
                // Directive -> StartTag -> Element
                if let Some(element) = node.parent().and_then(|tag| tag.parent()) {
                    for rule in self.rules.iter() {
                        self.ctx.current_rule = rule.meta().name;
                        rule.check_directive(self.ctx, element, node);
                    }
                }
            }
            NodeKind::Mustache => {
                for rule in self.rules.iter() {
                    self.ctx.current_rule = rule.meta().name;
                    rule.check_mustache(self.ctx, node);
                }
            }
            _ => {}
        }

        for child in node.children() {
            self.visit_node(child);
        }

        if node.kind() == NodeKind::Element {
            for rule in self.rules.iter() {
                self.ctx.current_rule = rule.meta().name;
                rule.exit_element(self.ctx, node);
            }
        }

        for (name, visitor) in self.visitors.iter_mut() {
            self.ctx.current_rule = *name;
            visitor.exit(self.ctx, node);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::{RuleCategory, RuleMeta};
    use crate::diagnostic::Severity;
    use gesso_armature::parse;
    use std::sync::Mutex;

    static META: RuleMeta = RuleMeta {
        name: "test/trace",
        description: "Record traversal order",
        category: RuleCategory::Recommended,
        fixable: false,
        default_severity: Severity::Warning,
    };

    #[derive(Default)]
    struct Trace {
        events: Mutex<Vec<String>>,
    }

    struct TraceVisitor<'r> {
        events: &'r Mutex<Vec<String>>,
    }

    impl<'a> NodeVisitor<'a> for TraceVisitor<'a> {
        fn enter(&mut self, _ctx: &mut LintContext<'a>, node: NodeRef<'a>) {
            if node.kind().is_markup() {
                self.events.lock().unwrap().push(node.kind().to_string());
            }
        }

        fn exit(&mut self, _ctx: &mut LintContext<'a>, node: NodeRef<'a>) {
            if node.kind().is_markup() {
                self.events.lock().unwrap().push(format!("{}:exit", node.kind()));
            }
        }
    }

    struct TraceRule(&'static Trace);

    impl Rule for TraceRule {
        fn meta(&self) -> &'static RuleMeta {
            &META
        }

        fn check_directive<'a>(
            &self,
            _ctx: &mut LintContext<'a>,
            element: NodeRef<'a>,
            directive: NodeRef<'a>,
        ) {
            self.0
                .events
                .lock()
                .unwrap()
                .push(format!("directive {} on {}", directive.text(), element.kind()));
        }

        fn create_visitor<'a>(
            &self,
            _view: &ScopedSourceView<'a>,
        ) -> Option<Box<dyn NodeVisitor<'a> + 'a>> {
            Some(Box::new(TraceVisitor {
                events: &self.0.events,
            }))
        }
    }

    #[test]
    fn test_pre_order_with_exit() {
        let trace: &'static Trace = Box::leak(Box::new(Trace::default()));
        let rules: Vec<Box<dyn Rule>> = vec![Box::new(TraceRule(trace))];
        let doc = parse("<view wx:if=\"{{a}}\">x</view>");
        let view = ScopedSourceView::for_document(&doc);
        let mut ctx = LintContext::new(doc.source(), "test.wxml");
        LintVisitor::new(&mut ctx, &rules, &view).visit_document(&doc);

        let events = trace.events.lock().unwrap();
        assert_eq!(
            events.as_slice(),
            [
                "Document",
                "Element",
                "StartTag",
                "Directive",
                "directive wx:if=\"{{a}}\" on Element",
                "ValueContainer",
                "Mustache",
                "Mustache:exit",
                "ValueContainer:exit",
                "Directive:exit",
                "StartTag:exit",
                "Text",
                "Text:exit",
                "EndTag",
                "EndTag:exit",
                "Element:exit",
                "Document:exit",
            ]
        );
    }
}
