//! Main linter entry point.
//!
//! Parses a template, runs every registered rule over it and, on request,
//! applies the reported fixes until the output stops changing.

use crate::config::{ConfigError, GessoConfig};
use crate::context::LintContext;
use crate::diagnostic::{Fix, LintDiagnostic, LintSummary, TextEdit};
use crate::rule::RuleRegistry;
use crate::source_view::ScopedSourceView;
use crate::visitor::LintVisitor;
use gesso_carton::FxHashSet;
use gesso_relief::{Document, ParserOptions};

/// Lint result for a single file
#[derive(Debug, Clone)]
pub struct LintResult {
    /// Filename that was linted
    pub filename: String,
    /// Collected diagnostics, ordered by start offset
    pub diagnostics: Vec<LintDiagnostic>,
    /// Number of errors
    pub error_count: usize,
    /// Number of warnings
    pub warning_count: usize,
}

impl LintResult {
    /// Check if there are any errors
    #[inline]
    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    /// Check if there are any diagnostics
    #[inline]
    pub fn has_diagnostics(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    /// Check if any diagnostic carries a fix
    #[inline]
    pub fn has_fixes(&self) -> bool {
        self.diagnostics.iter().any(LintDiagnostic::has_fix)
    }
}

/// Outcome of [`Linter::fix`]
#[derive(Debug, Clone)]
pub struct FixResult {
    /// Source after all applied fixes
    pub output: String,
    /// Number of passes that changed the source
    pub passes: usize,
    /// Whether the last lint of `output` reported no fixable diagnostic
    pub converged: bool,
    /// Diagnostics of the last lint of `output`
    pub remaining: Vec<LintDiagnostic>,
}

/// Main linter struct.
pub struct Linter {
    registry: RuleRegistry,
    parser_options: ParserOptions,
    /// Optional set of enabled rule names (if None, all rules are enabled)
    enabled_rules: Option<FxHashSet<String>>,
}

impl Linter {
    /// Upper bound on fix-and-relint passes
    pub const MAX_FIX_PASSES: usize = 10;

    /// Create a new linter with recommended rules
    #[inline]
    pub fn new() -> Self {
        Self::with_registry(RuleRegistry::with_recommended())
    }

    /// Create a linter with a custom rule registry
    #[inline]
    pub fn with_registry(registry: RuleRegistry) -> Self {
        Self {
            registry,
            parser_options: ParserOptions::default(),
            enabled_rules: None,
        }
    }

    /// Create a linter with every rule, configured from `config`
    pub fn from_config(config: &GessoConfig) -> Result<Self, ConfigError> {
        let registry = RuleRegistry::from_config(config)?;
        Ok(Self::with_registry(registry).with_enabled_rules(config.enabled_rules.clone()))
    }

    /// Set the options used to parse templates
    #[inline]
    pub fn with_parser_options(mut self, options: ParserOptions) -> Self {
        self.parser_options = options;
        self
    }

    /// Set enabled rules (if None, all rules are enabled)
    ///
    /// Pass a list of rule names to enable only those rules.
    /// Rules not in the list will be skipped during linting.
    #[inline]
    pub fn with_enabled_rules(mut self, rules: Option<Vec<String>>) -> Self {
        self.enabled_rules = rules.map(|r| r.into_iter().collect());
        self
    }

    /// Check if a rule is enabled
    #[inline]
    pub fn is_rule_enabled(&self, rule_name: &str) -> bool {
        match &self.enabled_rules {
            Some(set) => set.contains(rule_name),
            None => true,
        }
    }

    /// Lint a template source
    pub fn lint(&self, source: &str, filename: &str) -> LintResult {
        let doc = gesso_armature::parse_with_options(source, &self.parser_options);
        self.lint_document(&doc, filename)
    }

    /// Lint an already parsed document
    pub fn lint_document<'a>(&self, doc: &'a Document, filename: &'a str) -> LintResult {
        let view = ScopedSourceView::for_document(doc);

        let mut ctx = LintContext::new(doc.source(), filename);
        ctx.set_enabled_rules(self.enabled_rules.clone());

        let mut visitor = LintVisitor::new(&mut ctx, self.registry.rules(), &view);
        visitor.visit_document(doc);

        let error_count = ctx.error_count();
        let warning_count = ctx.warning_count();
        let mut diagnostics = ctx.into_diagnostics();
        for diagnostic in &mut diagnostics {
            diagnostic.ensure_loc(doc.line_index(), doc.source());
        }
        diagnostics.sort_by_key(|diagnostic| diagnostic.start);

        LintResult {
            filename: filename.to_string(),
            diagnostics,
            error_count,
            warning_count,
        }
    }

    /// Lint multiple files and aggregate results
    pub fn lint_files(&self, files: &[(String, String)]) -> (Vec<LintResult>, LintSummary) {
        let mut results = Vec::with_capacity(files.len());
        let mut summary = LintSummary::default();

        for (filename, source) in files {
            let result = self.lint(source, filename);
            summary.error_count += result.error_count;
            summary.warning_count += result.warning_count;
            results.push(result);
        }

        summary.file_count = files.len();
        (results, summary)
    }

    /// Apply fixes and re-lint until no fix applies or
    /// [`Self::MAX_FIX_PASSES`] is reached
    pub fn fix(&self, source: &str, filename: &str) -> FixResult {
        let mut output = source.to_string();
        let mut passes = 0;
        loop {
            let result = self.lint(&output, filename);
            let fixes: Vec<&Fix> = result
                .diagnostics
                .iter()
                .filter_map(|diagnostic| diagnostic.fix.as_ref())
                .collect();

            if fixes.is_empty() || passes == Self::MAX_FIX_PASSES {
                tracing::trace!(passes, remaining = result.diagnostics.len(), "fix loop done");
                return FixResult {
                    converged: fixes.is_empty(),
                    output,
                    passes,
                    remaining: result.diagnostics,
                };
            }

            let (fixed, applied) = apply_fixes(&output, &fixes);
            tracing::trace!(pass = passes + 1, applied, "applied fixes");
            if fixed == output {
                return FixResult {
                    output,
                    passes,
                    converged: false,
                    remaining: result.diagnostics,
                };
            }
            output = fixed;
            passes += 1;
        }
    }

    /// Get the rule registry
    #[inline]
    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    /// Get all registered rules
    #[inline]
    pub fn rules(&self) -> &[Box<dyn crate::rule::Rule>] {
        self.registry.rules()
    }
}

impl Default for Linter {
    fn default() -> Self {
        Self::new()
    }
}

/// Apply non-overlapping fixes left to right.
///
/// A fix whose range starts at or before the end of the previously applied
/// fix is skipped; the next pass picks it up again. Returns the new text and
/// the number of fixes applied.
pub fn apply_fixes(source: &str, fixes: &[&Fix]) -> (String, usize) {
    let mut ranged: Vec<(u32, u32, &Fix)> = fixes
        .iter()
        .filter_map(|fix| fix.range().map(|(start, end)| (start, end, *fix)))
        .collect();
    ranged.sort_by_key(|(start, end, _)| (*start, *end));

    let mut edits: Vec<&TextEdit> = Vec::new();
    let mut last_end: Option<u32> = None;
    let mut applied = 0;
    for (start, end, fix) in ranged {
        if last_end.is_some_and(|last| last >= start) {
            continue;
        }
        if end as usize > source.len() {
            continue;
        }
        edits.extend(fix.edits.iter());
        last_end = Some(end);
        applied += 1;
    }

    let mut output = String::with_capacity(source.len());
    let mut cursor = 0usize;
    edits.sort_by_key(|edit| (edit.start, edit.end));
    for edit in edits {
        let (start, end) = (edit.start as usize, edit.end as usize);
        if start < cursor || start > end {
            continue;
        }
        output.push_str(&source[cursor..start]);
        output.push_str(&edit.text);
        cursor = end;
    }
    output.push_str(&source[cursor..]);
    (output, applied)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lint_empty_template() {
        let linter = Linter::new();
        let result = linter.lint("", "test.wxml");
        assert!(!result.has_errors());
        assert!(!result.has_diagnostics());
    }

    #[test]
    fn test_lint_simple_template() {
        let linter = Linter::new();
        let result = linter.lint("<view>Hello</view>", "test.wxml");
        assert!(!result.has_diagnostics());
    }

    #[test]
    fn test_lint_files_batch() {
        let linter = Linter::new();
        let files = vec![
            ("a.wxml".to_string(), "<view>Hello</view>".to_string()),
            ("b.wxml".to_string(), "<view>\n<text/>\n</view>".to_string()),
        ];

        let (results, summary) = linter.lint_files(&files);
        assert_eq!(results.len(), 2);
        assert_eq!(summary.file_count, 2);
        assert_eq!(summary.warning_count, 1);
    }

    #[test]
    fn test_enabled_rules_filter() {
        let source = "<view a=\"1\" a=\"2\">\n<text/>\n</view>";
        let all = Linter::new().lint(source, "test.wxml");
        assert_eq!(all.diagnostics.len(), 2);

        let linter = Linter::new().with_enabled_rules(Some(vec!["mpx/indent".to_string()]));
        assert!(linter.is_rule_enabled("mpx/indent"));
        assert!(!linter.is_rule_enabled("mpx/no-duplicate-attributes"));
        let result = linter.lint(source, "test.wxml");
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].rule_name, "mpx/indent");
    }

    #[test]
    fn test_diagnostics_are_ordered() {
        let source = "<view>\n<text/>\n<text a=\"1\" a=\"1\"/>\n</view>";
        let result = Linter::new().lint(source, "test.wxml");
        let starts: Vec<u32> = result.diagnostics.iter().map(|d| d.start).collect();
        let mut sorted = starts.clone();
        sorted.sort_unstable();
        assert_eq!(starts, sorted);
    }

    #[test]
    fn test_fix_converges() {
        let linter = Linter::new();
        let result = linter.fix("<view>\n<text></text>\n</view>", "test.wxml");
        assert_eq!(result.output, "<view>\n  <text></text>\n</view>");
        assert_eq!(result.passes, 1);
        assert!(result.converged);
        assert!(result.remaining.is_empty());
    }

    #[test]
    fn test_apply_fixes_skips_overlaps() {
        let first = Fix::new("a", TextEdit::replace(0, 2, "x"));
        let overlapping = Fix::new("b", TextEdit::replace(1, 3, "y"));
        let later = Fix::new("c", TextEdit::replace(4, 5, "z"));
        let (output, applied) = apply_fixes("01234", &[&later, &overlapping, &first]);
        assert_eq!(output, "x23z");
        assert_eq!(applied, 2);
    }

    #[test]
    fn test_from_config() {
        let config = GessoConfig::from_json(
            r#"{"rules": {"mpx/indent": {"indentUnit": 4}}, "enabledRules": ["mpx/indent"]}"#,
        )
        .unwrap();
        let linter = Linter::from_config(&config).unwrap();
        let result = linter.fix("<view>\n<text/>\n</view>", "test.wxml");
        assert_eq!(result.output, "<view>\n    <text/>\n</view>");
    }
}
