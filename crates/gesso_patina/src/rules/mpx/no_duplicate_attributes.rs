//! mpx/no-duplicate-attributes
//!
//! Disallow duplicate attributes on the same element.
//!
//! Directives are compared by prefix and name, so `bindtap` and `bind:tap`
//! are the same handler.
//!
//! ## Examples
//!
//! ### Invalid
//! ```html
//! <view id="foo" id="bar"></view>
//! <view bindtap="a" bind:tap="b"></view>
//! ```
//!
//! ### Valid
//! ```html
//! <view id="foo"></view>
//! <view bindtap="a" catchtap="b"></view>
//! ```

use super::attributes;
use crate::context::LintContext;
use crate::diagnostic::Severity;
use crate::rule::{Rule, RuleCategory, RuleMeta};
use gesso_carton::{CompactString, FxHashSet};
use gesso_relief::{NodeData, NodeRef};

static META: RuleMeta = RuleMeta {
    name: "mpx/no-duplicate-attributes",
    description: "Disallow duplicate attributes on the same element",
    category: RuleCategory::Essential,
    fixable: false,
    default_severity: Severity::Error,
};

/// Disallow duplicate attributes
pub struct NoDuplicateAttributes;

impl Rule for NoDuplicateAttributes {
    fn meta(&self) -> &'static RuleMeta {
        &META
    }

    fn enter_element<'a>(&self, ctx: &mut LintContext<'a>, element: NodeRef<'a>) {
        let mut seen: FxHashSet<CompactString> = FxHashSet::default();

        for attribute in attributes(element) {
            let (key, raw) = match attribute.data() {
                NodeData::Attribute { key, .. } => {
                    (CompactString::new(key.name.to_lowercase()), key.name.as_str())
                }
                NodeData::Directive { key, .. } => (
                    CompactString::new(format!("{}:{}", key.prefix, key.name)),
                    key.raw.as_str(),
                ),
                _ => continue,
            };

            if !seen.insert(key) {
                ctx.error(format!("Duplicate attribute '{raw}'"), attribute.span());
            }
        }
    }
}
