//! Token stream snapshot tests.
//!
//! These tests pin the token sequence the parser produces for markup,
//! mustaches and script element bodies.

use gesso_armature::parse;

/// Render every non-whitespace token as `Kind value`, one per line
fn dump_tokens(src: &str) -> String {
    let doc = parse(src);
    if !doc.errors().is_empty() {
        panic!("Parse errors: {:?}", doc.errors());
    }

    doc.tokens()
        .iter()
        .filter(|token| !token.is_whitespace())
        .map(|token| format!("{:?} {}", token.kind, token.value))
        .collect::<Vec<_>>()
        .join("\n")
}

// =============================================================================
// Markup Tests
// =============================================================================

mod markup {
    use super::*;

    #[test]
    fn attributes_and_text() {
        insta::assert_snapshot!(dump_tokens("<view class=\"a\" wx:if=\"{{ok}}\">\n  hi there\n</view>"), @r#"
        TagOpen <view
        AttributeName class
        Association =
        AttributeValue "a"
        AttributeName wx:if
        Association =
        Quote "
        MustacheOpen {{
        Identifier ok
        MustacheClose }}
        Quote "
        TagClose >
        Text hi
        Text there
        EndTagOpen </view
        TagClose >
        "#);
    }

    #[test]
    fn html_comment() {
        insta::assert_snapshot!(dump_tokens("<view>\n  <!-- c -->\n</view>"), @r"
        TagOpen <view
        TagClose >
        HtmlComment <!-- c -->
        EndTagOpen </view
        TagClose >
        ");
    }
}

// =============================================================================
// Script Tests
// =============================================================================

mod script {
    use super::*;

    #[test]
    fn mustache_expression() {
        insta::assert_snapshot!(dump_tokens("<view>{{ a + b }}</view>"), @r"
        TagOpen <view
        TagClose >
        MustacheOpen {{
        Identifier a
        Punctuator +
        Identifier b
        MustacheClose }}
        EndTagOpen </view
        TagClose >
        ");
    }

    #[test]
    fn wxs_body() {
        insta::assert_snapshot!(dump_tokens("<wxs module=\"m\">\nvar a = 1\n</wxs>"), @r#"
        TagOpen <wxs
        AttributeName module
        Association =
        AttributeValue "m"
        TagClose >
        Keyword var
        Identifier a
        Punctuator =
        Numeric 1
        EndTagOpen </wxs
        TagClose >
        "#);
    }
}
