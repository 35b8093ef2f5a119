//! no-multiple-empty-lines
//!
//! Disallow runs of more than `max` blank lines, including at the end of
//! the file. The rule reads the whole source once when the root node is
//! left.

use gesso_carton::plural_suffix;

use super::adapter::GenericHandlers;
use super::provider::CoreRule;
use crate::diagnostic::{DiagnosticLoc, Fix, LintDiagnostic, TextEdit};
use crate::source_view::{GenericSourceView, ScopedSourceView};

/// Disallow multiple empty lines
pub struct NoMultipleEmptyLines {
    /// Longest allowed run of blank lines
    pub max: u32,
}

impl Default for NoMultipleEmptyLines {
    fn default() -> Self {
        Self { max: 2 }
    }
}

/// A run of more than `max` blank lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ExcessRun {
    /// First blank line past the allowed ones
    first_excess: u32,
    /// Line that ends the run, exclusive; past the last line at EOF
    end: u32,
    at_eof: bool,
}

fn excess_runs(view: &GenericSourceView<'_>, max: u32) -> Vec<ExcessRun> {
    let mut line_count = view.line_count() as u32;
    // A final newline does not open another line.
    if line_count > 1 && view.line_text(line_count).is_empty() {
        line_count -= 1;
    }

    let mut runs = Vec::new();
    let mut blank = 0u32;
    for line in 1..=line_count {
        if view.line_text(line).trim().is_empty() {
            blank += 1;
            continue;
        }
        if blank > max {
            runs.push(ExcessRun {
                first_excess: line - blank + max,
                end: line,
                at_eof: false,
            });
        }
        blank = 0;
    }
    if blank > max {
        runs.push(ExcessRun {
            first_excess: line_count + 1 - blank + max,
            end: line_count + 1,
            at_eof: true,
        });
    }
    runs
}

impl CoreRule for NoMultipleEmptyLines {
    fn name(&self) -> &'static str {
        "no-multiple-empty-lines"
    }

    fn description(&self) -> &'static str {
        "Disallow multiple empty lines"
    }

    fn create<'a>(&self, view: &ScopedSourceView<'a>) -> GenericHandlers<'a> {
        let max = self.max;
        let generic = *view.generic();
        GenericHandlers::new().on("Program:exit", move |ctx, _| {
            for run in excess_runs(&generic, max) {
                let start = generic.line_start(run.first_excess);
                let end = if run.at_eof {
                    generic.text().len() as u32
                } else {
                    generic.line_start(run.end)
                };
                let message = if run.at_eof {
                    format!("Too many blank lines at the end of file. Max of {max} allowed.")
                } else {
                    format!("More than {max} blank line{} not allowed.", plural_suffix(max))
                };
                ctx.report(
                    LintDiagnostic::warn(ctx.current_rule, message, start, end)
                        .with_loc(DiagnosticLoc {
                            line: run.first_excess,
                            start_column: 0,
                            end_column: 0,
                        })
                        .with_fix(Fix::new("Remove blank lines", TextEdit::delete(start, end))),
                );
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linter::Linter;
    use crate::rule::RuleRegistry;
    use crate::rules::core::BuiltinCoreRules;
    use gesso_carton::LineIndex;

    fn runs(source: &str) -> Vec<ExcessRun> {
        let lines = LineIndex::new(source);
        excess_runs(&GenericSourceView::new(source, &lines), 2)
    }

    fn create_linter() -> Linter {
        Linter::with_registry(RuleRegistry::new().with_core_rules(&BuiltinCoreRules::new()))
            .with_enabled_rules(Some(vec!["mpx/no-multiple-empty-lines".to_string()]))
    }

    #[test]
    fn test_runs_within_limit() {
        assert!(runs("<view/>\n\n\n<view/>\n").is_empty());
        assert!(runs("<view/>\n").is_empty());
    }

    #[test]
    fn test_excess_run() {
        assert_eq!(
            runs("<view/>\n\n\n\n\n<view/>"),
            [ExcessRun {
                first_excess: 4,
                end: 6,
                at_eof: false
            }]
        );
    }

    #[test]
    fn test_excess_run_at_eof() {
        assert_eq!(
            runs("<view/>\n\n\n\n"),
            [ExcessRun {
                first_excess: 4,
                end: 5,
                at_eof: true
            }]
        );
    }

    #[test]
    fn test_fix_removes_extra_lines() {
        let linter = create_linter();
        let result = linter.lint("<view/>\n\n\n\n\n<view/>", "test.wxml");
        assert_eq!(result.warning_count, 1);
        assert_eq!(result.diagnostics[0].message, "More than 2 blank lines not allowed.");

        let fixed = linter.fix("<view/>\n\n\n\n\n<view/>", "test.wxml");
        assert_eq!(fixed.output, "<view/>\n\n\n<view/>");
        assert!(fixed.converged);
    }

    #[test]
    fn test_fix_at_eof() {
        let linter = create_linter();
        let fixed = linter.fix("<view/>\n\n\n\n", "test.wxml");
        assert_eq!(fixed.output, "<view/>\n\n\n");
    }
}
