//! mpx/valid-wx-else
//!
//! Enforce valid `wx:else` and `wx:elif` directives.
//!
//! Both must:
//! - Be on an element immediately following a `wx:if` or `wx:elif` element
//! - Not be combined with `wx:if` on the same element
//!
//! `wx:else` takes no value; `wx:elif` requires one.
//!
//! ## Examples
//!
//! ### Invalid
//! ```html
//! <view wx:else="{{foo}}"></view>
//! <view wx:else wx:if="{{bar}}"></view>
//! <view wx:elif></view>
//! ```
//!
//! ### Valid
//! ```html
//! <view wx:if="{{foo}}"></view>
//! <view wx:elif="{{bar}}"></view>
//! <view wx:else></view>
//! ```

use super::has_wx_directive;
use crate::context::LintContext;
use crate::diagnostic::{Fix, LintDiagnostic, Severity, TextEdit};
use crate::rule::{Rule, RuleCategory, RuleMeta};
use gesso_relief::{NodeData, NodeId, NodeKind, NodeRef};

static META: RuleMeta = RuleMeta {
    name: "mpx/valid-wx-else",
    description: "Enforce valid `wx:else` and `wx:elif` directives",
    category: RuleCategory::Essential,
    fixable: true,
    default_severity: Severity::Error,
};

/// Enforce valid wx:else / wx:elif directives
pub struct ValidWxElse;

impl Rule for ValidWxElse {
    fn meta(&self) -> &'static RuleMeta {
        &META
    }

    fn check_directive<'a>(
        &self,
        ctx: &mut LintContext<'a>,
        element: NodeRef<'a>,
        directive: NodeRef<'a>,
    ) {
        let NodeData::Directive { key, value } = directive.data() else {
            return;
        };
        if key.prefix != "wx" || (key.name != "else" && key.name != "elif") {
            return;
        }
        let span = directive.span();

        match (key.name.as_str(), value) {
            ("else", Some(_)) => {
                let key_end = span.start + key.raw.len() as u32;
                ctx.report(
                    LintDiagnostic::error(
                        META.name,
                        "`wx:else` should not have a value",
                        span.start,
                        span.end,
                    )
                    .with_help("Use `wx:else` without `=\"...\"`")
                    .with_fix(Fix::new(
                        "Remove the value of wx:else",
                        TextEdit::delete(key_end, span.end),
                    )),
                );
            }
            ("elif", None) => {
                ctx.error("`wx:elif` requires a condition", span);
            }
            _ => {}
        }

        if has_wx_directive(element, "if") {
            ctx.error_with_help(
                format!("`{}` and `wx:if` should not be on the same element", key.raw),
                span,
                "Remove one of the directives",
            );
        } else if !previous_element(element)
            .is_some_and(|previous| has_wx_directive(previous, "if") || has_wx_directive(previous, "elif"))
        {
            ctx.error(
                format!(
                    "`{}` must follow an element with `wx:if` or `wx:elif`",
                    key.raw
                ),
                span,
            );
        }
    }
}

/// The sibling right before `element`, if it is an element
fn previous_element(element: NodeRef<'_>) -> Option<NodeRef<'_>> {
    let parent = element.parent()?;
    let siblings: &[NodeId] = match parent.data() {
        NodeData::Document { children } | NodeData::Element { children, .. } => children,
        _ => return None,
    };
    let index = siblings.iter().position(|id| *id == element.id)?;
    let previous = element.doc.get(*siblings.get(index.checked_sub(1)?)?);
    (previous.kind() == NodeKind::Element).then_some(previous)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linter::Linter;
    use crate::rule::RuleRegistry;

    fn create_linter() -> Linter {
        let mut registry = RuleRegistry::new();
        registry.register(Box::new(ValidWxElse));
        Linter::with_registry(registry)
    }

    #[test]
    fn test_valid_chain() {
        let linter = create_linter();
        let result = linter.lint(
            r#"<view wx:if="{{a}}"></view><view wx:elif="{{b}}"></view><view wx:else></view>"#,
            "test.wxml",
        );
        assert_eq!(result.error_count, 0);
    }

    #[test]
    fn test_invalid_else_with_value() {
        let linter = create_linter();
        let source = r#"<view wx:if="{{a}}"></view><view wx:else="{{b}}"></view>"#;
        let result = linter.lint(source, "test.wxml");
        assert_eq!(result.error_count, 1);
        assert!(result.diagnostics[0].message.contains("value"));

        let fixed = linter.fix(source, "test.wxml");
        assert_eq!(fixed.output, r#"<view wx:if="{{a}}"></view><view wx:else></view>"#);
    }

    #[test]
    fn test_invalid_else_with_if() {
        let linter = create_linter();
        let result = linter.lint(r#"<view wx:if="{{a}}" wx:else></view>"#, "test.wxml");
        assert_eq!(result.error_count, 1);
    }

    #[test]
    fn test_invalid_orphan_else() {
        let linter = create_linter();
        let result = linter.lint(r#"<view></view><view wx:else></view>"#, "test.wxml");
        assert_eq!(result.error_count, 1);
        assert!(result.diagnostics[0].message.contains("must follow"));

        let result = linter.lint(r#"<view wx:if="{{a}}"></view>text<view wx:else></view>"#, "test.wxml");
        assert_eq!(result.error_count, 1);
    }

    #[test]
    fn test_invalid_elif_without_condition() {
        let linter = create_linter();
        let result = linter.lint(r#"<view wx:if="{{a}}"></view><view wx:elif></view>"#, "test.wxml");
        assert_eq!(result.error_count, 1);
        assert!(result.diagnostics[0].message.contains("condition"));
    }
}
