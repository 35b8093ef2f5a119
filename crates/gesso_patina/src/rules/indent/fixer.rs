//! Indentation fixes.

use gesso_carton::is_line_terminator;
use gesso_relief::{Token, TokenKind};

use super::IndentVisitor;
use crate::diagnostic::{Fix, TextEdit};

impl IndentVisitor<'_> {
    /// Replace the indentation in front of `token` with `expected` units of
    /// the indent character.
    ///
    /// A multi-line block comment whose continuation lines all start with
    /// `*` is re-indented as a whole so the stars stay aligned.
    pub(super) fn define_fix(&self, token: &Token, line_start: u32, expected: u32) -> Fix {
        let indent: String = std::iter::repeat(self.settings.indent_char)
            .take(expected as usize)
            .collect();

        if token.kind == TokenKind::BlockComment && token.is_multiline() {
            if let Some(text) = reindent_block_comment(&token.value, &indent) {
                return Fix::new(
                    "Fix indentation",
                    TextEdit::replace(line_start, token.span.end, text),
                );
            }
        }
        Fix::new(
            "Fix indentation",
            TextEdit::replace(line_start, token.span.start, indent),
        )
    }
}

/// The comment prefixed with `indent`, every continuation line re-indented
/// to ` *` past it. `None` unless every non-empty continuation line starts
/// with `*` after its indentation.
fn reindent_block_comment(comment: &str, indent: &str) -> Option<String> {
    let mut lines = comment.split_inclusive('\n');
    let first = lines.next()?;
    let mut out = String::with_capacity(comment.len() + indent.len() * 4);
    out.push_str(indent);
    out.push_str(first);

    for line in lines {
        if line.chars().all(is_line_terminator) {
            out.push_str(line);
            continue;
        }
        let rest = line.trim_start().strip_prefix('*')?;
        out.push_str(indent);
        out.push_str(" *");
        out.push_str(rest);
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::reindent_block_comment;
    use crate::config::GessoConfig;
    use crate::linter::Linter;

    fn fix(source: &str) -> String {
        Linter::new()
            .with_enabled_rules(Some(vec!["mpx/indent".to_string()]))
            .fix(source, "test.wxml")
            .output
    }

    #[test]
    fn test_reindent_block_comment() {
        assert_eq!(
            reindent_block_comment("/*\n      * a\n*/", "  ").as_deref(),
            Some("  /*\n   * a\n   */")
        );
        assert_eq!(
            reindent_block_comment("/*\n\n * a\n */", "").as_deref(),
            Some("/*\n\n * a\n */")
        );
        assert_eq!(reindent_block_comment("/*\n  a\n*/", "  "), None);
    }

    #[test]
    fn test_fix_block_comment_keeps_stars_aligned() {
        let source = "<wxs module=\"m\">\nfunction f() {\n/*\n * doc\n */\nreturn 1\n}\n</wxs>";
        assert_eq!(
            fix(source),
            "<wxs module=\"m\">\nfunction f() {\n  /*\n   * doc\n   */\n  return 1\n}\n</wxs>"
        );
    }

    #[test]
    fn test_fix_free_form_block_comment_moves_first_line_only() {
        let source = "<wxs module=\"m\">\nfunction f() {\n/* one\n   two */\nreturn 1\n}\n</wxs>";
        assert_eq!(
            fix(source),
            "<wxs module=\"m\">\nfunction f() {\n  /* one\n   two */\n  return 1\n}\n</wxs>"
        );
    }

    #[test]
    fn test_fix_replaces_wrong_characters() {
        let config = GessoConfig::from_json(
            r#"{"rules": {"mpx/indent": {"indentUnit": "tab"}}, "enabledRules": ["mpx/indent"]}"#,
        )
        .unwrap();
        let linter = Linter::from_config(&config).unwrap();
        let result = linter.fix("<view>\n  <text/>\n</view>", "test.wxml");
        assert_eq!(result.output, "<view>\n\t<text/>\n</view>");
        assert!(result.converged);
    }

    #[test]
    fn test_fix_nested_elements() {
        assert_eq!(
            fix("<view>\n<view>\n<text/>\n</view>\n</view>"),
            "<view>\n  <view>\n    <text/>\n  </view>\n</view>"
        );
    }
}
