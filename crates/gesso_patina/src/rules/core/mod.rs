//! Generic script rules retargeted onto templates.
//!
//! A [`CoreRule`] is written for script trees and knows nothing about
//! markup. [`WrappedCoreRule`] registers one under an `mpx/` name, adapts
//! its selector-keyed handlers with [`adapt_generic_visitor`] and, for
//! rules that only make sense on template expressions, keeps script
//! element bodies out of reach.

mod adapter;
mod eqeqeq;
mod no_multiple_empty_lines;
mod provider;

use std::sync::Arc;

pub use adapter::{
    adapt_generic_visitor, GenericHandler, GenericHandlers, KeyMapping, SelectorVisitor,
};
pub use eqeqeq::Eqeqeq;
pub use no_multiple_empty_lines::NoMultipleEmptyLines;
pub use provider::{BuiltinCoreRules, CoreRule, CoreRuleProvider};

use crate::diagnostic::Severity;
use crate::rule::{NodeVisitor, Rule, RuleCategory, RuleMeta};
use crate::source_view::ScopedSourceView;

static EQEQEQ_META: RuleMeta = RuleMeta {
    name: "mpx/eqeqeq",
    description: "Require `===` and `!==` in template expressions",
    category: RuleCategory::Extension,
    fixable: false,
    default_severity: Severity::Error,
};

static NO_MULTIPLE_EMPTY_LINES_META: RuleMeta = RuleMeta {
    name: "mpx/no-multiple-empty-lines",
    description: "Disallow multiple empty lines",
    category: RuleCategory::Extension,
    fixable: true,
    default_severity: Severity::Warning,
};

/// How a core rule is exposed to templates
struct Wrapping {
    core_name: &'static str,
    meta: &'static RuleMeta,
    template_only: bool,
    key_mapping: KeyMapping,
}

static WRAPPINGS: &[Wrapping] = &[
    Wrapping {
        core_name: "eqeqeq",
        meta: &EQEQEQ_META,
        template_only: true,
        key_mapping: &[],
    },
    Wrapping {
        core_name: "no-multiple-empty-lines",
        meta: &NO_MULTIPLE_EMPTY_LINES_META,
        template_only: false,
        key_mapping: &[("Program", "Document")],
    },
];

/// A core rule registered as a template rule
pub struct WrappedCoreRule {
    core: Arc<dyn CoreRule>,
    meta: &'static RuleMeta,
    template_only: bool,
    key_mapping: KeyMapping,
}

impl WrappedCoreRule {
    #[inline]
    pub fn core(&self) -> &dyn CoreRule {
        self.core.as_ref()
    }
}

impl Rule for WrappedCoreRule {
    fn meta(&self) -> &'static RuleMeta {
        self.meta
    }

    fn create_visitor<'a>(
        &self,
        view: &ScopedSourceView<'a>,
    ) -> Option<Box<dyn NodeVisitor<'a> + 'a>> {
        let handlers = self.core.create(view);
        match adapt_generic_visitor(handlers, self.key_mapping) {
            Ok(visitor) if self.template_only => Some(Box::new(visitor.template_only())),
            Ok(visitor) => Some(Box::new(visitor)),
            Err(error) => {
                tracing::warn!(rule = self.meta.name, %error, "invalid core rule selector");
                None
            }
        }
    }
}

/// Every wrapped rule whose core rule `provider` supplies
pub fn wrapped_core_rules(provider: &dyn CoreRuleProvider) -> Vec<WrappedCoreRule> {
    WRAPPINGS
        .iter()
        .filter_map(|wrapping| {
            let Some(core) = provider.get(wrapping.core_name) else {
                tracing::debug!(rule = wrapping.core_name, "core rule not provided, skipping");
                return None;
            };
            Some(WrappedCoreRule {
                core,
                meta: wrapping.meta,
                template_only: wrapping.template_only,
                key_mapping: wrapping.key_mapping,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct OnlyEqeqeq;

    impl CoreRuleProvider for OnlyEqeqeq {
        fn get(&self, name: &str) -> Option<Arc<dyn CoreRule>> {
            (name == "eqeqeq").then(|| Arc::new(Eqeqeq) as Arc<dyn CoreRule>)
        }
    }

    #[test]
    fn test_wraps_every_builtin() {
        let rules = wrapped_core_rules(&BuiltinCoreRules::new());
        let names: Vec<_> = rules.iter().map(|rule| rule.meta().name).collect();
        assert_eq!(names, ["mpx/eqeqeq", "mpx/no-multiple-empty-lines"]);
        assert!(rules
            .iter()
            .all(|rule| rule.meta().category == RuleCategory::Extension));
        assert_eq!(rules[1].core().name(), "no-multiple-empty-lines");
    }

    #[test]
    fn test_missing_core_rules_are_skipped() {
        let rules = wrapped_core_rules(&OnlyEqeqeq);
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].core().description(), "Require the use of `===` and `!==`");
    }
}
