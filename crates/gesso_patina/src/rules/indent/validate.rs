//! Line-by-line validation of a subtree against its offset table.

use gesso_armature::TokenQuery;
use gesso_carton::{plural_suffix, FxHashSet, SmallVec};
use gesso_relief::{NodeId, TokenId};

use super::node_list::is_closing;
use super::{IndentVisitor, META};
use crate::context::LintContext;
use crate::diagnostic::{DiagnosticLoc, LintDiagnostic};

/// Expected indentation of a line's first token and the smallest
/// expectation among all of its tokens
#[derive(Debug, Clone, Copy)]
struct ExpectedIndents {
    first: u32,
    base: u32,
}

impl<'a> IndentVisitor<'a> {
    /// Check the first token of every line in `node`.
    ///
    /// Lines holding only comments are deferred to the next code line, so a
    /// comment may borrow the indentation of the code around it. Lines that
    /// begin inside a multi-line token are skipped.
    pub(super) fn validate_subtree(&mut self, ctx: &mut LintContext<'a>, node: NodeId) {
        let tokens = self.store.tokens_of(node, &TokenQuery::WITH_COMMENTS);
        let mut line: SmallVec<[TokenId; 8]> = SmallVec::new();
        let mut comments: SmallVec<[TokenId; 4]> = SmallVec::new();
        let mut beside_multiline = false;
        let mut last_validated: Option<TokenId> = None;

        for token in tokens {
            let current = self.token(token);
            let Some((&first, &last)) = line.first().zip(line.last()) else {
                line.push(token);
                continue;
            };
            if self.token(first).loc.start.line == current.loc.start.line {
                line.push(token);
                continue;
            }

            let ends_on_this_line = self.token(last).loc.end.line == current.loc.start.line;
            if line.iter().all(|token| self.token(*token).is_comment()) {
                comments.push(first);
            } else {
                if !beside_multiline {
                    self.validate_line(ctx, &line, &comments, last_validated);
                    last_validated = Some(first);
                }
                comments.clear();
            }
            beside_multiline = ends_on_this_line;
            line.clear();
            line.push(token);
        }

        if line.iter().any(|token| !self.token(*token).is_comment()) {
            self.validate_line(ctx, &line, &comments, last_validated);
        }
    }

    fn expected_indents(&self, tokens: &[TokenId]) -> Option<ExpectedIndents> {
        let size = self.settings.indent_size;
        let mut indents: SmallVec<[u32; 8]> = SmallVec::new();
        for (i, token) in tokens.iter().enumerate() {
            let Some(entry) = self.table.get(*token) else {
                continue;
            };
            if let Some(expected) = entry.expected_indent {
                indents.push(expected);
                continue;
            }
            let Some(base) = entry.base.and_then(|base| self.table.get(base)) else {
                continue;
            };
            if let Some(base_expected) = base.expected_indent {
                if i == 0 || !base.baseline {
                    indents.push(base_expected + entry.offset * size);
                    if base.baseline {
                        break;
                    }
                }
            }
        }
        Some(ExpectedIndents {
            first: *indents.first()?,
            base: indents.iter().copied().min()?,
        })
    }

    fn validate_line(
        &mut self,
        ctx: &mut LintContext<'a>,
        tokens: &[TokenId],
        comments: &[TokenId],
        last_validated: Option<TokenId>,
    ) {
        let Some(&first) = tokens.first() else {
            return;
        };
        let Some(expected) = self.expected_indents(tokens) else {
            return;
        };
        let actual = self.token(first).loc.start.column;

        // Record what was decided for this line; later lines resolve
        // against it.
        let mut baseline: FxHashSet<TokenId> = FxHashSet::default();
        for token in tokens {
            let column = self.token(*token).loc.start.column;
            let is_tab = self.settings.is_tab();
            let Some(entry) = self.table.get(*token).copied() else {
                continue;
            };
            let inherited = entry
                .base
                .filter(|base| baseline.contains(base))
                .and_then(|base| self.table.get(base))
                .and_then(|base| base.expected_indent);
            let resolved = if entry.baseline {
                baseline.insert(*token);
                if is_tab {
                    // Columns cannot be matched with tabs, so align one unit in.
                    expected.base + u32::from(*token != first)
                } else {
                    (column + expected.base).saturating_sub(actual)
                }
            } else if let Some(inherited) = inherited {
                baseline.insert(*token);
                inherited
            } else {
                expected.base
            };
            if let Some(entry) = self.table.get_mut(*token) {
                entry.expected_indent = Some(resolved);
            }
        }

        if self.table.is_ignored(first) {
            return;
        }

        let last_expected = last_validated
            .and_then(|token| self.table.get(token))
            .and_then(|entry| entry.expected_indent);
        let optional = self.comment_expected_indents(first, expected.first, last_expected);
        for comment in comments {
            let own = self
                .expected_indents(&[*comment])
                .map_or(optional[0], |indents| indents.first);
            self.validate_token(ctx, *comment, own, Some(&optional));
        }
        self.validate_token(ctx, first, expected.first, None);
    }

    /// Indentations accepted for comments right above `next`
    fn comment_expected_indents(
        &self,
        next: TokenId,
        next_expected: u32,
        last_expected: Option<u32>,
    ) -> SmallVec<[u32; 2]> {
        let mut indents = SmallVec::new();
        match last_expected {
            Some(last) if is_closing(self.token(next)) => {
                if last == next_expected {
                    // Only comment in the block: inside or level with the close
                    indents.push(next_expected + self.settings.indent_size);
                } else {
                    indents.push(last);
                }
                indents.push(next_expected);
            }
            _ => indents.push(next_expected),
        }
        indents
    }

    fn validate_token(
        &self,
        ctx: &mut LintContext<'a>,
        token_id: TokenId,
        expected: u32,
        optional: Option<&[u32]>,
    ) {
        let token = self.token(token_id);
        let line = token.loc.start.line;
        let line_start = self.doc.line_index().line_start(line);
        let Some(indent_text) = self
            .doc
            .source()
            .get(line_start as usize..token.span.start as usize)
        else {
            return;
        };
        // Code right after a start tag on the same line has no indentation
        // of its own.
        if !indent_text.trim().is_empty() {
            return;
        }

        let indent_char = self.settings.indent_char;
        for (column, (offset, ch)) in indent_text.char_indices().enumerate() {
            if ch == indent_char {
                continue;
            }
            let start = line_start + offset as u32;
            let message = format!(
                "Expected {} character, but found {} character.",
                json_char(indent_char),
                json_char(ch)
            );
            ctx.report(
                LintDiagnostic::warn(META.name, message, start, start + ch.len_utf8() as u32)
                    .with_loc(DiagnosticLoc {
                        line,
                        start_column: column as u32,
                        end_column: column as u32 + 1,
                    })
                    .with_fix(self.define_fix(token, line_start, expected)),
            );
            return;
        }

        let actual = token.loc.start.column;
        if actual == expected || optional.is_some_and(|optional| optional.contains(&actual)) {
            return;
        }
        let unit = self.settings.unit();
        let message = format!(
            "Expected indentation of {expected} {unit}{} but found {actual} {unit}{}.",
            plural_suffix(expected),
            plural_suffix(actual)
        );
        tracing::trace!(line, expected, actual, "indentation mismatch");
        ctx.report(
            LintDiagnostic::warn(META.name, message, line_start, token.span.start)
                .with_loc(DiagnosticLoc {
                    line,
                    start_column: 0,
                    end_column: actual,
                })
                .with_fix(self.define_fix(token, line_start, expected)),
        );
    }
}

/// A character quoted the way JSON prints it
fn json_char(ch: char) -> String {
    serde_json::Value::String(ch.to_string()).to_string()
}
