//! mpx/indent
//!
//! Enforce consistent indentation in templates and in embedded scripts.
//!
//! Every top-level element is checked as one subtree. While the subtree is
//! walked, node handlers describe how each token is indented relative to
//! another token (see [`offsets`]). When the subtree is left, the tokens are
//! grouped by line and the first token of every line is checked against the
//! indentation resolved from that graph.
//!
//! ## Examples
//!
//! ### Invalid
//! ```html
//! <view>
//! <text>hello</text>
//!       </view>
//! ```
//!
//! ### Valid
//! ```html
//! <view>
//!   <text>hello</text>
//! </view>
//! ```
//!
//! ## Options
//!
//! Configured under `"mpx/indent"` in `gesso.config.json`; see
//! [`crate::config::IndentOptions`].

mod fixer;
mod markup;
mod node_list;
pub mod offsets;
mod script;
mod validate;

use std::sync::Arc;

use crate::config::{ConfigError, IndentOptions, IndentSettings};
use crate::context::LintContext;
use crate::diagnostic::Severity;
use crate::rule::{NodeVisitor, Rule, RuleCategory, RuleMeta};
use crate::source_view::ScopedSourceView;
use gesso_armature::{TokenQuery, TokenStore};
use gesso_carton::{phf_set, PhfSet};
use gesso_relief::{Document, NodeId, NodeKind, NodeRef, Token, TokenId};

pub use offsets::{OffsetEntry, OffsetTable};

static META: RuleMeta = RuleMeta {
    name: "mpx/indent",
    description: "Enforce consistent indentation in templates",
    category: RuleCategory::StronglyRecommended,
    fixable: true,
    default_severity: Severity::Warning,
};

/// Node kinds with an indentation handler. Tokens of any other node are
/// excluded from validation when the node is left.
static KNOWN_NODES: PhfSet<&'static str> = phf_set! {
    "Document", "Element", "StartTag", "EndTag", "Attribute", "Directive",
    "AttributeValue", "ValueContainer", "Text", "Mustache", "RawText",
    "Program", "Identifier", "Literal", "TemplateLiteral", "TemplateElement",
    "TaggedTemplateExpression", "ThisExpression", "Super", "ArrayExpression",
    "ObjectExpression", "Property", "FunctionExpression",
    "ArrowFunctionExpression", "ClassExpression", "ClassBody",
    "MethodDefinition", "PropertyDefinition", "UnaryExpression",
    "UpdateExpression", "AwaitExpression", "YieldExpression", "SpreadElement",
    "RestElement", "BinaryExpression", "LogicalExpression",
    "AssignmentExpression", "AssignmentPattern", "ConditionalExpression",
    "CallExpression", "NewExpression", "MemberExpression",
    "SequenceExpression", "ArrayPattern", "ObjectPattern",
    "ExpressionStatement", "BlockStatement", "EmptyStatement",
    "DebuggerStatement", "ReturnStatement", "BreakStatement",
    "ContinueStatement", "ThrowStatement", "IfStatement", "SwitchStatement",
    "SwitchCase", "WhileStatement", "DoWhileStatement", "ForStatement",
    "ForInStatement", "ForOfStatement", "TryStatement", "CatchClause",
    "LabeledStatement", "VariableDeclaration", "VariableDeclarator",
    "FunctionDeclaration", "ClassDeclaration", "ImportDeclaration",
    "ImportSpecifier", "ImportDefaultSpecifier", "ImportNamespaceSpecifier",
    "ExportNamedDeclaration", "ExportSpecifier", "ExportDefaultDeclaration",
    "ExportAllDeclaration",
};

/// Enforce consistent indentation
pub struct Indent {
    settings: Arc<IndentSettings>,
}

impl Indent {
    pub fn new(settings: Arc<IndentSettings>) -> Self {
        Self { settings }
    }

    /// Build the rule from raw configuration options
    pub fn from_options(options: &IndentOptions) -> Result<Self, ConfigError> {
        Ok(Self::new(Arc::new(options.resolve()?)))
    }

    #[inline]
    pub fn settings(&self) -> &IndentSettings {
        &self.settings
    }
}

impl Default for Indent {
    fn default() -> Self {
        Self::new(Arc::new(IndentSettings::default()))
    }
}

impl Rule for Indent {
    fn meta(&self) -> &'static RuleMeta {
        &META
    }

    fn create_visitor<'a>(
        &self,
        view: &ScopedSourceView<'a>,
    ) -> Option<Box<dyn NodeVisitor<'a> + 'a>> {
        let Some(store) = view.token_store() else {
            tracing::debug!(rule = META.name, "no token store, skipping indentation checks");
            return None;
        };
        Some(Box::new(IndentVisitor::new(
            view.document(),
            store,
            Arc::clone(&self.settings),
        )))
    }
}

/// Per-document indentation state
pub(crate) struct IndentVisitor<'a> {
    doc: &'a Document,
    store: TokenStore<'a>,
    settings: Arc<IndentSettings>,
    table: OffsetTable,
}

impl<'a> IndentVisitor<'a> {
    fn new(doc: &'a Document, store: TokenStore<'a>, settings: Arc<IndentSettings>) -> Self {
        Self {
            doc,
            store,
            settings,
            table: OffsetTable::new(),
        }
    }

    #[inline]
    fn node(&self, id: NodeId) -> NodeRef<'a> {
        self.doc.get(id)
    }

    #[inline]
    fn token(&self, id: TokenId) -> &'a Token {
        self.store.get(id)
    }

    #[inline]
    fn first(&self, node: NodeId) -> Option<TokenId> {
        self.store.first_token(node)
    }

    #[inline]
    fn last(&self, node: NodeId) -> Option<TokenId> {
        self.store.last_token(node)
    }

    #[inline]
    fn after(&self, token: TokenId) -> Option<TokenId> {
        self.store.token_after(token, &TokenQuery::CODE)
    }

    #[inline]
    fn before(&self, token: TokenId) -> Option<TokenId> {
        self.store.token_before(token, &TokenQuery::CODE)
    }

    /// First code token after `token` accepted by `accept`
    fn after_where(&self, token: TokenId, accept: fn(&Token) -> bool) -> Option<TokenId> {
        let filter = |token: &Token| accept(token);
        self.store.token_after(token, &TokenQuery::filter(&filter))
    }

    /// First code token after the end of `node` accepted by `accept`
    fn after_node_where(&self, node: NodeId, accept: fn(&Token) -> bool) -> Option<TokenId> {
        let filter = |token: &Token| accept(token);
        self.store.token_after_node(node, &TokenQuery::filter(&filter))
    }

    /// Last code token before the start of `node` accepted by `accept`
    fn before_node_where(&self, node: NodeId, accept: fn(&Token) -> bool) -> Option<TokenId> {
        let filter = |token: &Token| accept(token);
        self.store.token_before_node(node, &TokenQuery::filter(&filter))
    }

    #[inline]
    fn after_node(&self, node: NodeId) -> Option<TokenId> {
        self.store.token_after_node(node, &TokenQuery::CODE)
    }

    #[inline]
    fn before_node(&self, node: NodeId) -> Option<TokenId> {
        self.store.token_before_node(node, &TokenQuery::CODE)
    }

    /// 1-based line of a byte offset
    #[inline]
    fn line_of(&self, offset: u32) -> u32 {
        self.doc.line_index().line_of(offset)
    }

    /// Exclude every code token of `node` from validation
    fn ignore_node(&mut self, node: NodeId) {
        let tokens = self.store.tokens_of(node, &TokenQuery::CODE);
        self.table.ignore(tokens);
    }

    /// Dispatch to the handler of the node's kind
    fn process_node(&mut self, node: NodeRef<'a>) {
        let kind = node.kind();
        if kind.is_markup() {
            self.process_markup(node);
        } else {
            self.process_script(node);
        }
    }
}

/// Element directly under the document root
fn is_top_level_element(node: NodeRef<'_>) -> bool {
    node.kind() == NodeKind::Element
        && node
            .parent()
            .is_some_and(|parent| parent.kind() == NodeKind::Document)
}

impl<'a> NodeVisitor<'a> for IndentVisitor<'a> {
    fn enter(&mut self, _ctx: &mut LintContext<'a>, node: NodeRef<'a>) {
        let kind = node.kind();
        if !KNOWN_NODES.contains(kind.as_str()) {
            return;
        }
        let top_level = is_top_level_element(node);
        if top_level {
            self.table.clear();
        }

        self.process_node(node);
        if kind.is_expression() {
            self.process_parens(node);
        }
        if kind.is_statement() || kind.is_declaration() {
            self.process_semicolons(node);
        }

        if top_level {
            self.table.set_expected(self.first(node.id), 0);
        }
    }

    fn exit(&mut self, ctx: &mut LintContext<'a>, node: NodeRef<'a>) {
        if !KNOWN_NODES.contains(node.kind().as_str()) {
            self.ignore_node(node.id);
        }
        if self
            .settings
            .ignores
            .iter()
            .any(|selector| selector.matches(node))
        {
            self.ignore_node(node.id);
        }

        if is_top_level_element(node) {
            tracing::trace!(
                entries = self.table.len(),
                start = node.span().start,
                "validating indentation of subtree"
            );
            self.validate_subtree(ctx, node.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GessoConfig;
    use crate::linter::Linter;
    use crate::rule::RuleRegistry;

    fn create_linter() -> Linter {
        let mut registry = RuleRegistry::new();
        registry.register(Box::new(Indent::default()));
        Linter::with_registry(registry)
    }

    fn linter_with(options: &str) -> Linter {
        let config = GessoConfig::from_json(&format!(r#"{{"rules": {{"mpx/indent": {options}}}}}"#))
            .unwrap();
        let rule = Indent::from_options(config.rules.indent.as_ref().unwrap()).unwrap();
        let mut registry = RuleRegistry::new();
        registry.register(Box::new(rule));
        Linter::with_registry(registry)
    }

    #[test]
    fn test_known_nodes_cover_every_kind_but_decorators() {
        for kind in NodeKind::ALL {
            assert_eq!(
                KNOWN_NODES.contains(kind.as_str()),
                *kind != NodeKind::Decorator,
                "{kind}"
            );
        }
    }

    fn walk<'a>(visitor: &mut IndentVisitor<'a>, ctx: &mut LintContext<'a>, node: NodeRef<'a>) {
        visitor.enter(ctx, node);
        for child in node.children() {
            walk(visitor, ctx, child);
        }
        visitor.exit(ctx, node);
    }

    #[test]
    fn test_offset_chains_end_without_cycles() {
        let source = "<view class=\"a\"\n      id=\"b\">\n  <wxs module=\"m\">\n  function f(a) {\n    return [a,\n      {b: (1 +\n        2)}]\n  }\n  </wxs>\n  <text>{{ a ? b : c }}</text>\n</view>";
        let doc = gesso_armature::parse(source);
        let mut visitor = IndentVisitor::new(
            &doc,
            TokenStore::new(&doc),
            Arc::new(IndentSettings::default()),
        );
        let mut ctx = LintContext::new(doc.source(), "test.wxml");
        walk(&mut visitor, &mut ctx, doc.get(doc.root()));

        let table = &visitor.table;
        assert!(table.len() > 10);
        for index in 0..doc.tokens().len() {
            let token = TokenId(index as u32);
            if table.get(token).is_some() {
                // A chain visiting every entry at most once has at most `len` hops
                assert!(
                    table.chain_len(token) <= table.len(),
                    "cycle through {:?}",
                    doc.token(token).value
                );
            }
        }
    }

    #[test]
    fn test_valid_nested_elements() {
        let linter = create_linter();
        let result = linter.lint(
            "<view>\n  <view>\n    <text>hi</text>\n  </view>\n</view>",
            "test.wxml",
        );
        assert!(!result.has_diagnostics());
    }

    #[test]
    fn test_invalid_child_indentation() {
        let linter = create_linter();
        let result = linter.lint("<view>\n<text>hi</text>\n</view>", "test.wxml");
        assert_eq!(result.warning_count, 1);
        assert_eq!(
            result.diagnostics[0].message,
            "Expected indentation of 2 spaces but found 0 spaces."
        );
        let loc = result.diagnostics[0].loc.unwrap();
        assert_eq!((loc.line, loc.start_column, loc.end_column), (2, 0, 0));
    }

    #[test]
    fn test_closing_tag_aligns_with_start_tag() {
        let linter = create_linter();
        let result = linter.lint("<view>\n  <text>hi</text>\n      </view>", "test.wxml");
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(
            result.diagnostics[0].message,
            "Expected indentation of 0 spaces but found 6 spaces."
        );
    }

    #[test]
    fn test_tab_indentation() {
        let linter = linter_with(r#"{"indentUnit": "tab"}"#);
        let result = linter.lint("<view>\n\t<text>hi</text>\n</view>", "test.wxml");
        assert!(!result.has_diagnostics());

        let result = linter.lint("<view>\n  <text>hi</text>\n</view>", "test.wxml");
        assert_eq!(
            result.diagnostics[0].message,
            "Expected \"\\t\" character, but found \" \" character."
        );
    }

    #[test]
    fn test_ignore_patterns() {
        let linter = linter_with(r#"{"ignorePatterns": ["Element[name=\"map\"]"]}"#);
        let result = linter.lint(
            "<view>\n  <map>\n        <text/>\n  </map>\n</view>",
            "test.wxml",
        );
        assert!(!result.has_diagnostics());
    }

    #[test]
    fn test_skipped_without_token_store() {
        let linter = create_linter();
        let result = linter.lint("<view>\n<text/>\n<!-- open", "test.wxml");
        assert!(!result.has_diagnostics());
    }
}
