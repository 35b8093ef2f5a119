//! Indentation scenarios run through the public linter API.

use gesso_patina::{GessoConfig, LintDiagnostic, Linter};

fn indent_linter(options: &str) -> Linter {
    let config = GessoConfig::from_json(&format!(
        r#"{{"rules": {{"mpx/indent": {options}}}, "enabledRules": ["mpx/indent"]}}"#
    ))
    .unwrap();
    Linter::from_config(&config).unwrap()
}

/// Render diagnostics as `line:column message`, one per line
fn render(diagnostics: &[LintDiagnostic]) -> String {
    diagnostics
        .iter()
        .map(|diagnostic| {
            let loc = diagnostic.loc.unwrap();
            format!("{}:{} {}", loc.line, loc.end_column, diagnostic.message)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn lint(options: &str, source: &str) -> String {
    render(&indent_linter(options).lint(source, "index.wxml").diagnostics)
}

/// Fix `source`, then check a second fix changes nothing
fn fix(options: &str, source: &str) -> String {
    let linter = indent_linter(options);
    let first = linter.fix(source, "index.wxml");
    assert!(first.converged, "did not converge: {:?}", first.remaining);
    assert!(first.remaining.is_empty());
    assert!(first.passes <= 1, "needed {} passes", first.passes);

    let second = linter.fix(&first.output, "index.wxml");
    assert_eq!(second.output, first.output);
    assert_eq!(second.passes, 0);
    first.output
}

// =============================================================================
// Markup
// =============================================================================

mod markup {
    use super::*;

    #[test]
    fn every_misplaced_line_is_reported() {
        insta::assert_snapshot!(lint("{}", "<view>\n<view>\n<text>hi</text>\n</view>\n</view>"), @r"
        2:0 Expected indentation of 2 spaces but found 0 spaces.
        3:0 Expected indentation of 4 spaces but found 0 spaces.
        4:0 Expected indentation of 2 spaces but found 0 spaces.
        ");
    }

    #[test]
    fn over_indented_lines() {
        insta::assert_snapshot!(lint("{}", "<view>\n    <text>hi</text>\n</view>"), @"2:4 Expected indentation of 2 spaces but found 4 spaces.");
    }

    #[test]
    fn four_space_unit() {
        let source = "<view>\n    <view>\n        <text/>\n    </view>\n</view>";
        assert_eq!(lint(r#"{"indentUnit": 4}"#, source), "");
        insta::assert_snapshot!(lint("{}", source), @r"
        2:4 Expected indentation of 2 spaces but found 4 spaces.
        3:8 Expected indentation of 4 spaces but found 8 spaces.
        4:4 Expected indentation of 2 spaces but found 4 spaces.
        ");
    }

    #[test]
    fn fix_nested_elements() {
        assert_eq!(
            fix("{}", "<view>\n<view>\n<text>hi</text>\n</view>\n</view>"),
            "<view>\n  <view>\n    <text>hi</text>\n  </view>\n</view>"
        );
    }

    #[test]
    fn fix_to_tabs() {
        assert_eq!(
            fix(r#"{"indentUnit": "tab"}"#, "<view>\n    <view>\n        <text/>\n    </view>\n</view>"),
            "<view>\n\t<view>\n\t\t<text/>\n\t</view>\n</view>"
        );
    }

    #[test]
    fn fix_multiline_attributes() {
        assert_eq!(
            fix("{}", "<view\nclass=\"a\"\nid=\"b\">\n</view>"),
            "<view\n  class=\"a\"\n  id=\"b\">\n</view>"
        );
    }

    #[test]
    fn preformatted_content_survives_fix() {
        let source = "<view>\n<pre>\n text\n      keep\n</pre>\n</view>";
        assert_eq!(
            fix("{}", source),
            "<view>\n  <pre>\n text\n      keep\n  </pre>\n</view>"
        );
    }
}

// =============================================================================
// Script
// =============================================================================

mod script {
    use super::*;

    #[test]
    fn function_body() {
        insta::assert_snapshot!(lint("{}", "<wxs module=\"m\">\nfunction f(a) {\nreturn a + 1\n}\n</wxs>"), @"3:0 Expected indentation of 2 spaces but found 0 spaces.");
    }

    #[test]
    fn fix_function_body() {
        assert_eq!(
            fix("{}", "<wxs module=\"m\">\nfunction f(a) {\n      return a + 1\n}\n</wxs>"),
            "<wxs module=\"m\">\nfunction f(a) {\n  return a + 1\n}\n</wxs>"
        );
    }

    #[test]
    fn fix_nested_object_literal() {
        assert_eq!(
            fix("{}", "<wxs module=\"m\">\nvar o = {\na: 1,\nb: [\n1,\n2\n]\n}\n</wxs>"),
            "<wxs module=\"m\">\nvar o = {\n  a: 1,\n  b: [\n    1,\n    2\n  ]\n}\n</wxs>"
        );
    }

    #[test]
    fn fix_with_script_base_indent() {
        assert_eq!(
            fix(r#"{"scriptBaseIndent": 1}"#, "<wxs module=\"m\">\nvar a = 1\nvar b = 2\n</wxs>"),
            "<wxs module=\"m\">\n  var a = 1\n  var b = 2\n</wxs>"
        );
    }
}
