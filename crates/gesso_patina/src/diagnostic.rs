//! Diagnostics and the fix protocol.
//!
//! A diagnostic covers a byte range and carries a line/column location. A
//! [`Fix`] is a list of [`TextEdit`]s over the source the diagnostic was
//! produced from; hosts apply fixes left to right without overlap
//! (see [`crate::apply_fixes`]).

use std::fmt;

use gesso_carton::{CompactString, LineIndex};
use serde::Serialize;

/// Lint diagnostic severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Replace `start..end` with `text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextEdit {
    pub start: u32,
    pub end: u32,
    pub text: String,
}

impl TextEdit {
    #[inline]
    pub fn replace(start: u32, end: u32, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }

    #[inline]
    pub fn insert(offset: u32, text: impl Into<String>) -> Self {
        Self::replace(offset, offset, text)
    }

    #[inline]
    pub fn delete(start: u32, end: u32) -> Self {
        Self::replace(start, end, "")
    }
}

/// An automatic fix: one or more edits applied together
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fix {
    /// What the fix does, e.g. "Fix indentation"
    pub message: String,
    pub edits: Vec<TextEdit>,
}

impl Fix {
    #[inline]
    pub fn new(message: impl Into<String>, edit: TextEdit) -> Self {
        Self::with_edits(message, vec![edit])
    }

    #[inline]
    pub fn with_edits(message: impl Into<String>, edits: Vec<TextEdit>) -> Self {
        Self {
            message: message.into(),
            edits,
        }
    }

    /// Byte range covered by all edits
    pub fn range(&self) -> Option<(u32, u32)> {
        let start = self.edits.iter().map(|edit| edit.start).min()?;
        let end = self.edits.iter().map(|edit| edit.end).max()?;
        Some((start, end))
    }
}

/// Line/column location of a diagnostic.
///
/// Lines are 1-based, columns are 0-based character counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DiagnosticLoc {
    pub line: u32,
    pub start_column: u32,
    pub end_column: u32,
}

impl DiagnosticLoc {
    /// Location of the byte range `start..end`. A range spanning several
    /// lines ends at the end of its first line.
    pub fn locate(lines: &LineIndex, source: &str, start: u32, end: u32) -> Self {
        let (line, start_column) = lines.position(source, start);
        let end_column = if lines.line_of(end) == line {
            lines.position(source, end).1
        } else {
            lines.line_text(source, line).chars().count() as u32
        };
        Self {
            line,
            start_column,
            end_column: end_column.max(start_column),
        }
    }
}

impl fmt::Display for DiagnosticLoc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.start_column + 1)
    }
}

/// A problem found by a rule
#[derive(Debug, Clone, Serialize)]
pub struct LintDiagnostic {
    pub rule_name: &'static str,
    pub severity: Severity,
    pub message: CompactString,
    /// Start byte offset in source
    pub start: u32,
    /// End byte offset in source
    pub end: u32,
    /// Set by rules that compute their own location, otherwise filled in
    /// by the linter from `start..end`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loc: Option<DiagnosticLoc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<CompactString>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fix: Option<Fix>,
}

impl LintDiagnostic {
    fn new(
        rule_name: &'static str,
        severity: Severity,
        message: impl Into<CompactString>,
        start: u32,
        end: u32,
    ) -> Self {
        Self {
            rule_name,
            severity,
            message: message.into(),
            start,
            end,
            loc: None,
            help: None,
            fix: None,
        }
    }

    #[inline]
    pub fn error(
        rule_name: &'static str,
        message: impl Into<CompactString>,
        start: u32,
        end: u32,
    ) -> Self {
        Self::new(rule_name, Severity::Error, message, start, end)
    }

    #[inline]
    pub fn warn(
        rule_name: &'static str,
        message: impl Into<CompactString>,
        start: u32,
        end: u32,
    ) -> Self {
        Self::new(rule_name, Severity::Warning, message, start, end)
    }

    #[inline]
    pub fn with_loc(mut self, loc: DiagnosticLoc) -> Self {
        self.loc = Some(loc);
        self
    }

    #[inline]
    pub fn with_help(mut self, help: impl Into<CompactString>) -> Self {
        self.help = Some(help.into());
        self
    }

    #[inline]
    pub fn with_fix(mut self, fix: Fix) -> Self {
        self.fix = Some(fix);
        self
    }

    #[inline]
    pub fn has_fix(&self) -> bool {
        self.fix.is_some()
    }

    /// Compute `loc` from the byte range unless the rule set one
    pub(crate) fn ensure_loc(&mut self, lines: &LineIndex, source: &str) {
        if self.loc.is_none() {
            self.loc = Some(DiagnosticLoc::locate(lines, source, self.start, self.end));
        }
    }
}

/// Counts over several linted files
#[derive(Debug, Clone, Default, Serialize)]
pub struct LintSummary {
    pub error_count: usize,
    pub warning_count: usize,
    pub file_count: usize,
}

impl LintSummary {
    #[inline]
    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fix_range() {
        let fix = Fix::with_edits(
            "reindent",
            vec![TextEdit::insert(0, "  "), TextEdit::replace(4, 5, "\t")],
        );
        assert_eq!(fix.range(), Some((0, 5)));
        assert_eq!(Fix::with_edits("none", Vec::new()).range(), None);
    }

    #[test]
    fn test_locate() {
        let source = "<view>\n  <text a=\"1\"/>\n</view>";
        let lines = LineIndex::new(source);
        let loc = DiagnosticLoc::locate(&lines, source, 15, 20);
        assert_eq!((loc.line, loc.start_column, loc.end_column), (2, 8, 13));
        assert_eq!(loc.to_string(), "2:9");

        // Ends on a later line: clamp to the first line
        let loc = DiagnosticLoc::locate(&lines, source, 0, 30);
        assert_eq!((loc.line, loc.start_column, loc.end_column), (1, 0, 6));
    }

    #[test]
    fn test_ensure_loc_keeps_rule_location() {
        let source = "<view>\n<text/>\n</view>";
        let lines = LineIndex::new(source);
        let given = DiagnosticLoc {
            line: 2,
            start_column: 0,
            end_column: 0,
        };
        let mut diagnostic = LintDiagnostic::warn("mpx/indent", "msg", 7, 7).with_loc(given);
        diagnostic.ensure_loc(&lines, source);
        assert_eq!(diagnostic.loc, Some(given));

        let mut diagnostic = LintDiagnostic::error("mpx/eqeqeq", "msg", 8, 12);
        diagnostic.ensure_loc(&lines, source);
        assert_eq!(diagnostic.loc.map(|loc| loc.start_column), Some(1));
    }

    #[test]
    fn test_diagnostic_serializes_location() {
        let diagnostic = LintDiagnostic::warn("mpx/indent", "msg", 3, 5).with_loc(DiagnosticLoc {
            line: 2,
            start_column: 0,
            end_column: 2,
        });
        let json = serde_json::to_value(&diagnostic).unwrap();
        assert_eq!(json["loc"]["line"], 2);
        assert_eq!(json["severity"], "warning");
        assert!(json.get("fix").is_none());
        assert_eq!(Severity::Warning.to_string(), "warning");
    }
}
