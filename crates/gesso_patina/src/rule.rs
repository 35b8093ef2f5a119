//! Rule trait and registry for lint rules.

use std::sync::Arc;

use crate::config::{ConfigError, GessoConfig};
use crate::context::LintContext;
use crate::diagnostic::Severity;
use crate::rules::core::{wrapped_core_rules, BuiltinCoreRules, CoreRuleProvider};
use crate::source_view::ScopedSourceView;
use gesso_relief::{Document, NodeRef};

/// Rule category for organization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleCategory {
    /// Essential rules - prevent errors
    Essential,
    /// Strongly recommended rules - improve readability
    StronglyRecommended,
    /// Recommended rules - ensure consistency
    Recommended,
    /// Generic script rules retargeted onto templates
    Extension,
}

/// Rule metadata
#[derive(Debug)]
pub struct RuleMeta {
    /// Rule name (e.g., "mpx/indent")
    pub name: &'static str,
    /// Human-readable description
    pub description: &'static str,
    /// Rule category
    pub category: RuleCategory,
    /// Whether rule is auto-fixable
    pub fixable: bool,
    /// Default severity
    pub default_severity: Severity,
}

/// Stateful per-document visitor.
///
/// Called for every node in pre-order; `exit` fires after all descendants
/// have been visited.
pub trait NodeVisitor<'a> {
    #[allow(unused_variables)]
    fn enter(&mut self, ctx: &mut LintContext<'a>, node: NodeRef<'a>) {}

    #[allow(unused_variables)]
    fn exit(&mut self, ctx: &mut LintContext<'a>, node: NodeRef<'a>) {}
}

/// Rule trait for implementing lint rules
///
/// Stateless rules implement the typed hooks called during traversal.
/// Rules that carry state across nodes return a [`NodeVisitor`] from
/// [`Rule::create_visitor`] instead.
pub trait Rule: Send + Sync {
    /// Get rule metadata
    fn meta(&self) -> &'static RuleMeta;

    /// Run on the document root (called once per document)
    #[allow(unused_variables)]
    fn run_on_document<'a>(&self, ctx: &mut LintContext<'a>, doc: &'a Document) {}

    /// Called when entering an element node
    #[allow(unused_variables)]
    fn enter_element<'a>(&self, ctx: &mut LintContext<'a>, element: NodeRef<'a>) {}

    /// Called when exiting an element node
    #[allow(unused_variables)]
    fn exit_element<'a>(&self, ctx: &mut LintContext<'a>, element: NodeRef<'a>) {}

    /// Called for each directive on an element
    #[allow(unused_variables)]
    fn check_directive<'a>(
        &self,
        ctx: &mut LintContext<'a>,
        element: NodeRef<'a>,
        directive: NodeRef<'a>,
    ) {
    }

    /// Called for mustache nodes {{ expr }}
    #[allow(unused_variables)]
    fn check_mustache<'a>(&self, ctx: &mut LintContext<'a>, mustache: NodeRef<'a>) {}

    /// Create a stateful visitor for one document
    #[allow(unused_variables)]
    fn create_visitor<'a>(
        &self,
        view: &ScopedSourceView<'a>,
    ) -> Option<Box<dyn NodeVisitor<'a> + 'a>> {
        None
    }
}

/// Registry holding all enabled lint rules
pub struct RuleRegistry {
    rules: Vec<Box<dyn Rule>>,
}

impl RuleRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Register a rule
    pub fn register(&mut self, rule: Box<dyn Rule>) {
        self.rules.push(rule);
    }

    /// Add a rule (alias for register)
    pub fn add(&mut self, rule: Box<dyn Rule>) {
        self.register(rule);
    }

    /// Get all registered rules
    pub fn rules(&self) -> &[Box<dyn Rule>] {
        &self.rules
    }

    /// Create registry with the built-in template rules enabled
    pub fn with_recommended() -> Self {
        let mut registry = Self::new();

        // ============================================
        // Essential Rules (Error)
        // ============================================

        registry.register(Box::new(crate::rules::mpx::NoDuplicateAttributes));
        registry.register(Box::new(crate::rules::mpx::ValidWxElse));

        // ============================================
        // Strongly Recommended Rules (Warning)
        // ============================================

        registry.register(Box::new(crate::rules::indent::Indent::default()));

        registry
    }

    /// Register every wrapped core rule the provider can supply
    pub fn with_core_rules(mut self, provider: &dyn CoreRuleProvider) -> Self {
        for wrapped in wrapped_core_rules(provider) {
            self.register(Box::new(wrapped));
        }
        self
    }

    /// Recommended rules plus the built-in core rules
    pub fn with_all() -> Self {
        Self::with_recommended().with_core_rules(&BuiltinCoreRules::new())
    }

    /// Every rule, with rule options taken from `config`
    pub fn from_config(config: &GessoConfig) -> Result<Self, ConfigError> {
        let indent = match &config.rules.indent {
            Some(options) => crate::rules::indent::Indent::new(Arc::new(options.resolve()?)),
            None => crate::rules::indent::Indent::default(),
        };

        let mut registry = Self::new();
        registry.register(Box::new(crate::rules::mpx::NoDuplicateAttributes));
        registry.register(Box::new(crate::rules::mpx::ValidWxElse));
        registry.register(Box::new(indent));
        Ok(registry.with_core_rules(&BuiltinCoreRules::new()))
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(registry: &RuleRegistry) -> Vec<&'static str> {
        registry.rules().iter().map(|rule| rule.meta().name).collect()
    }

    #[test]
    fn test_recommended_rules() {
        let registry = RuleRegistry::with_recommended();
        assert_eq!(
            names(&registry),
            ["mpx/no-duplicate-attributes", "mpx/valid-wx-else", "mpx/indent"]
        );
    }

    #[test]
    fn test_all_rules_include_core_rules() {
        let registry = RuleRegistry::with_all();
        let names = names(&registry);
        assert!(names.contains(&"mpx/eqeqeq"));
        assert!(names.contains(&"mpx/no-multiple-empty-lines"));
        assert_eq!(names.len(), 5);
    }

    #[test]
    fn test_from_config_rejects_bad_options() {
        let config = GessoConfig::from_json(r#"{"rules": {"mpx/indent": {"indentUnit": 0}}}"#)
            .unwrap();
        assert!(matches!(
            RuleRegistry::from_config(&config),
            Err(ConfigError::InvalidIndentUnit(0))
        ));
        assert!(RuleRegistry::from_config(&GessoConfig::default()).is_ok());
    }
}
