//! Lint context for rule execution.

use crate::diagnostic::{LintDiagnostic, Severity};
use gesso_carton::{CompactString, FxHashSet};
use gesso_relief::Span;

/// Lint context provides utilities for rules during execution.
pub struct LintContext<'a> {
    /// Source code being linted
    pub source: &'a str,
    /// Filename for diagnostics
    pub filename: &'a str,
    /// Collected diagnostics (pre-allocated capacity)
    diagnostics: Vec<LintDiagnostic>,
    /// Current rule name (set by visitor before calling rule methods)
    pub current_rule: &'static str,
    /// Rules allowed to report; `None` allows every rule
    enabled_rules: Option<FxHashSet<String>>,
    /// Cached error count for fast access
    error_count: usize,
    /// Cached warning count for fast access
    warning_count: usize,
}

impl<'a> LintContext<'a> {
    /// Initial capacity for diagnostics vector
    const INITIAL_DIAGNOSTICS_CAPACITY: usize = 16;

    #[inline]
    pub fn new(source: &'a str, filename: &'a str) -> Self {
        Self {
            source,
            filename,
            diagnostics: Vec::with_capacity(Self::INITIAL_DIAGNOSTICS_CAPACITY),
            current_rule: "",
            enabled_rules: None,
            error_count: 0,
            warning_count: 0,
        }
    }

    /// Restrict reporting to the given rules
    #[inline]
    pub fn set_enabled_rules(&mut self, rules: Option<FxHashSet<String>>) {
        self.enabled_rules = rules;
    }

    #[inline]
    pub fn is_rule_enabled(&self, rule_name: &str) -> bool {
        self.enabled_rules
            .as_ref()
            .map_or(true, |rules| rules.contains(rule_name))
    }

    /// Report a lint diagnostic
    #[inline]
    pub fn report(&mut self, diagnostic: LintDiagnostic) {
        if !self.is_rule_enabled(diagnostic.rule_name) {
            return;
        }
        match diagnostic.severity {
            Severity::Error => self.error_count += 1,
            Severity::Warning => self.warning_count += 1,
        }
        self.diagnostics.push(diagnostic);
    }

    /// Report an error at a span
    #[inline]
    pub fn error(&mut self, message: impl Into<CompactString>, span: Span) {
        self.report(LintDiagnostic::error(
            self.current_rule,
            message,
            span.start,
            span.end,
        ));
    }

    /// Report a warning at a span
    #[inline]
    pub fn warn(&mut self, message: impl Into<CompactString>, span: Span) {
        self.report(LintDiagnostic::warn(
            self.current_rule,
            message,
            span.start,
            span.end,
        ));
    }

    /// Report an error with help message
    #[inline]
    pub fn error_with_help(
        &mut self,
        message: impl Into<CompactString>,
        span: Span,
        help: impl Into<CompactString>,
    ) {
        self.report(
            LintDiagnostic::error(self.current_rule, message, span.start, span.end).with_help(help),
        );
    }

    #[inline]
    pub fn into_diagnostics(self) -> Vec<LintDiagnostic> {
        self.diagnostics
    }

    #[inline]
    pub fn diagnostics(&self) -> &[LintDiagnostic] {
        &self.diagnostics
    }

    #[inline]
    pub fn error_count(&self) -> usize {
        self.error_count
    }

    #[inline]
    pub fn warning_count(&self) -> usize {
        self.warning_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_counts() {
        let mut ctx = LintContext::new("<view/>", "a.wxml");
        ctx.current_rule = "mpx/indent";
        ctx.warn("w", Span::new(0, 1));
        ctx.error_with_help("e", Span::new(1, 2), "help");
        assert_eq!((ctx.error_count(), ctx.warning_count()), (1, 1));
        assert_eq!(ctx.diagnostics()[1].help.as_deref(), Some("help"));
    }

    #[test]
    fn test_disabled_rules_are_dropped() {
        let mut ctx = LintContext::new("<view/>", "a.wxml");
        ctx.set_enabled_rules(Some(["mpx/eqeqeq".to_string()].into_iter().collect()));
        ctx.current_rule = "mpx/indent";
        ctx.error("dropped", Span::new(0, 1));
        ctx.current_rule = "mpx/eqeqeq";
        ctx.error("kept", Span::new(0, 1));
        let diagnostics = ctx.into_diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].message, "kept");
    }
}
