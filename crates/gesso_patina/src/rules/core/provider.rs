//! Generic script rules and where they come from.

use std::sync::Arc;

use gesso_carton::FxHashMap;

use super::adapter::GenericHandlers;
use super::eqeqeq::Eqeqeq;
use super::no_multiple_empty_lines::NoMultipleEmptyLines;
use crate::source_view::ScopedSourceView;

/// A rule written against script nodes only.
///
/// It knows nothing about templates: it names the node kinds it wants in
/// selector strings and reports through the context it is handed.
pub trait CoreRule: Send + Sync {
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// Handlers for one document, keyed by selector
    fn create<'a>(&self, view: &ScopedSourceView<'a>) -> GenericHandlers<'a>;
}

/// Lookup of core rules by name
pub trait CoreRuleProvider {
    fn get(&self, name: &str) -> Option<Arc<dyn CoreRule>>;
}

/// The core rules shipped with the linter
pub struct BuiltinCoreRules {
    rules: FxHashMap<&'static str, Arc<dyn CoreRule>>,
}

impl BuiltinCoreRules {
    pub fn new() -> Self {
        let builtins: [Arc<dyn CoreRule>; 2] = [
            Arc::new(Eqeqeq),
            Arc::new(NoMultipleEmptyLines::default()),
        ];
        let rules = builtins
            .into_iter()
            .map(|rule| (rule.name(), rule))
            .collect();
        Self { rules }
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rules.keys().copied()
    }
}

impl Default for BuiltinCoreRules {
    fn default() -> Self {
        Self::new()
    }
}

impl CoreRuleProvider for BuiltinCoreRules {
    fn get(&self, name: &str) -> Option<Arc<dyn CoreRule>> {
        self.rules.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_lookup() {
        let provider = BuiltinCoreRules::new();
        assert_eq!(provider.get("eqeqeq").map(|rule| rule.name()), Some("eqeqeq"));
        assert!(provider.get("no-multiple-empty-lines").is_some());
        assert!(provider.get("no-console").is_none());

        let mut names: Vec<_> = provider.names().collect();
        names.sort_unstable();
        assert_eq!(names, ["eqeqeq", "no-multiple-empty-lines"]);
    }
}
