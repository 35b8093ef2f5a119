//! eqeqeq
//!
//! Require `===` and `!==`.
//!
//! ## Examples
//!
//! ### Invalid
//! ```js
//! a == b
//! a != null
//! ```
//!
//! ### Valid
//! ```js
//! a === b
//! a !== null
//! ```

use gesso_armature::TokenQuery;
use gesso_relief::{NodeData, Token};

use super::adapter::GenericHandlers;
use super::provider::CoreRule;
use crate::source_view::ScopedSourceView;

/// Require strict equality operators
pub struct Eqeqeq;

impl CoreRule for Eqeqeq {
    fn name(&self) -> &'static str {
        "eqeqeq"
    }

    fn description(&self) -> &'static str {
        "Require the use of `===` and `!==`"
    }

    fn create<'a>(&self, view: &ScopedSourceView<'a>) -> GenericHandlers<'a> {
        let store = view.token_store();
        GenericHandlers::new().on("BinaryExpression", move |ctx, node| {
            let NodeData::BinaryExpression { operator, left, .. } = node.data() else {
                return;
            };
            let expected = match operator.as_str() {
                "==" => "===",
                "!=" => "!==",
                _ => return,
            };

            let operator_span = store
                .and_then(|store| {
                    let is_operator = |token: &Token| token.is_punct(operator.as_str());
                    store
                        .token_after_node(*left, &TokenQuery::filter(&is_operator))
                        .map(|token| store.get(token).span)
                })
                .unwrap_or_else(|| node.span());

            ctx.error_with_help(
                format!("Expected '{expected}' and instead saw '{operator}'."),
                operator_span,
                format!("Use '{expected}' to compare without type coercion"),
            );
        })
    }
}
