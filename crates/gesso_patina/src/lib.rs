//! # gesso_patina
//!
//! Patina - The quality checker for Gesso.
//! Linter for mpx-style templates and their embedded scripts.
//!
//! ## Name Origin
//!
//! **Patina** (/ˈpætɪnə/) refers to the greenish layer that forms on copper,
//! bronze, and similar metals through oxidation over time. In art and antiques,
//! patina is highly valued as it indicates authenticity, age, and quality.
//! `gesso_patina` examines templates to ensure their quality and authenticity.
//!
//! ## Usage
//!
//! ```rust
//! use gesso_patina::Linter;
//!
//! let linter = Linter::new();
//! let source = "<view>\n<text>hello</text>\n</view>";
//! let result = linter.lint(source, "index.wxml");
//! assert_eq!(result.warning_count, 1);
//!
//! let fixed = linter.fix(source, "index.wxml");
//! assert_eq!(fixed.output, "<view>\n  <text>hello</text>\n</view>");
//! ```
//!
//! ## Rules
//!
//! ### Essential Rules
//! - `mpx/no-duplicate-attributes` - Disallow duplicate attributes
//! - `mpx/valid-wx-else` - Enforce valid `wx:else` and `wx:elif` directives
//!
//! ### Strongly Recommended Rules
//! - `mpx/indent` - Enforce consistent indentation in templates and scripts
//!
//! ### Extension Rules (core rules retargeted onto templates)
//! - `mpx/eqeqeq` - Require `===` and `!==` in template expressions
//! - `mpx/no-multiple-empty-lines` - Disallow multiple empty lines

pub mod config;
mod context;
mod diagnostic;
mod linter;
mod rule;
pub mod rules;
pub mod selector;
pub mod source_view;
mod visitor;

pub use config::{load_config, try_load_config, ConfigError, GessoConfig, IndentOptions};
pub use context::LintContext;
pub use diagnostic::{
    DiagnosticLoc, Fix, LintDiagnostic, LintSummary, Severity, TextEdit,
};
pub use linter::{apply_fixes, FixResult, LintResult, Linter};
pub use rule::{NodeVisitor, Rule, RuleCategory, RuleMeta, RuleRegistry};
pub use selector::{NodeSelector, SelectorError};
pub use source_view::{GenericSourceView, ScopedSourceView};

/// Lint a template source with the recommended rules
///
/// This is a convenience function for simple use cases.
/// For more control, use `Linter::new()` directly.
pub fn lint(source: &str, filename: &str) -> LintResult {
    Linter::new().lint(source, filename)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lint_function() {
        let result = lint("<view a=\"1\" a=\"2\"></view>", "test.wxml");
        assert!(result.has_errors());
    }

    #[test]
    fn test_lint_valid_template() {
        let result = lint(
            "<view wx:if=\"{{ show }}\">\n  <text>{{ message }}</text>\n</view>",
            "test.wxml",
        );
        assert!(!result.has_diagnostics());
    }
}
