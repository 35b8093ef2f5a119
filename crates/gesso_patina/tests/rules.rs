//! All rules together on one template.

use gesso_patina::{Linter, RuleRegistry, Severity};

const SOURCE: &str = "<view a=\"1\" a=\"2\">\n  <text wx:if=\"{{ x == 1 }}\">a</text>\n  <text wx:else>b</text>\n</view>\n\n\n\n";

fn linter() -> Linter {
    Linter::with_registry(RuleRegistry::with_all())
}

#[test]
fn diagnostics_of_every_rule() {
    let result = linter().lint(SOURCE, "index.wxml");
    assert_eq!(result.error_count, 2);
    assert_eq!(result.warning_count, 1);

    let rendered = result
        .diagnostics
        .iter()
        .map(|diagnostic| format!("{}: {}", diagnostic.rule_name, diagnostic.message))
        .collect::<Vec<_>>()
        .join("\n");
    insta::assert_snapshot!(rendered, @r"
    mpx/no-duplicate-attributes: Duplicate attribute 'a'
    mpx/eqeqeq: Expected '===' and instead saw '=='.
    mpx/no-multiple-empty-lines: Too many blank lines at the end of file. Max of 2 allowed.
    ");
}

#[test]
fn fix_leaves_unfixable_errors() {
    let result = linter().fix(SOURCE, "index.wxml");
    assert!(result.converged);
    assert_eq!(result.passes, 1);
    assert_eq!(
        result.output,
        "<view a=\"1\" a=\"2\">\n  <text wx:if=\"{{ x == 1 }}\">a</text>\n  <text wx:else>b</text>\n</view>\n\n\n"
    );
    assert_eq!(result.remaining.len(), 2);
    assert!(result
        .remaining
        .iter()
        .all(|diagnostic| diagnostic.severity == Severity::Error));
}

#[test]
fn enabled_rules_filter_diagnostics() {
    let result = linter()
        .with_enabled_rules(Some(vec!["mpx/eqeqeq".to_string()]))
        .lint(SOURCE, "index.wxml");
    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(result.diagnostics[0].rule_name, "mpx/eqeqeq");
}
