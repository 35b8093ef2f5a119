//! Node tree of a Gesso template.
//!
//! Markup nodes and script nodes share one arena. Script node kinds follow
//! the ESTree vocabulary so selectors written against it keep working.

use gesso_carton::CompactString;
use serde::{Deserialize, Serialize};

use crate::token::Span;

/// Index of a node in [`crate::Document`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

macro_rules! node_kinds {
    ($($(#[$meta:meta])* $name:ident),* $(,)?) => {
        /// Node type discriminant
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum NodeKind {
            $($(#[$meta])* $name,)*
        }

        impl NodeKind {
            /// Every kind, in declaration order
            pub const ALL: &'static [NodeKind] = &[$(NodeKind::$name,)*];

            /// Kind name as used by selectors and diagnostics
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(NodeKind::$name => stringify!($name),)*
                }
            }
        }
    };
}

node_kinds! {
    // Markup
    Document,
    Element,
    StartTag,
    EndTag,
    Attribute,
    Directive,
    /// Attribute value without mustaches
    AttributeValue,
    /// Quoted attribute value with mustaches
    ValueContainer,
    Text,
    Mustache,
    /// Opaque element content
    RawText,

    // Script
    Program,
    Identifier,
    Literal,
    TemplateLiteral,
    TemplateElement,
    TaggedTemplateExpression,
    ThisExpression,
    Super,
    ArrayExpression,
    ObjectExpression,
    Property,
    FunctionExpression,
    ArrowFunctionExpression,
    ClassExpression,
    ClassBody,
    MethodDefinition,
    PropertyDefinition,
    Decorator,
    UnaryExpression,
    UpdateExpression,
    AwaitExpression,
    YieldExpression,
    SpreadElement,
    RestElement,
    BinaryExpression,
    LogicalExpression,
    AssignmentExpression,
    AssignmentPattern,
    ConditionalExpression,
    CallExpression,
    NewExpression,
    MemberExpression,
    SequenceExpression,
    ArrayPattern,
    ObjectPattern,
    ExpressionStatement,
    BlockStatement,
    EmptyStatement,
    DebuggerStatement,
    ReturnStatement,
    BreakStatement,
    ContinueStatement,
    ThrowStatement,
    IfStatement,
    SwitchStatement,
    SwitchCase,
    WhileStatement,
    DoWhileStatement,
    ForStatement,
    ForInStatement,
    ForOfStatement,
    TryStatement,
    CatchClause,
    LabeledStatement,
    VariableDeclaration,
    VariableDeclarator,
    FunctionDeclaration,
    ClassDeclaration,
    ImportDeclaration,
    ImportSpecifier,
    ImportDefaultSpecifier,
    ImportNamespaceSpecifier,
    ExportNamedDeclaration,
    ExportSpecifier,
    ExportDefaultDeclaration,
    ExportAllDeclaration,
}

impl NodeKind {
    /// Look a kind up by its name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.as_str() == name)
    }

    /// Check if this kind belongs to the markup grammar
    pub const fn is_markup(self) -> bool {
        matches!(
            self,
            NodeKind::Document
                | NodeKind::Element
                | NodeKind::StartTag
                | NodeKind::EndTag
                | NodeKind::Attribute
                | NodeKind::Directive
                | NodeKind::AttributeValue
                | NodeKind::ValueContainer
                | NodeKind::Text
                | NodeKind::Mustache
                | NodeKind::RawText
        )
    }

    pub const fn is_statement(self) -> bool {
        matches!(
            self,
            NodeKind::ExpressionStatement
                | NodeKind::BlockStatement
                | NodeKind::EmptyStatement
                | NodeKind::DebuggerStatement
                | NodeKind::ReturnStatement
                | NodeKind::BreakStatement
                | NodeKind::ContinueStatement
                | NodeKind::ThrowStatement
                | NodeKind::IfStatement
                | NodeKind::SwitchStatement
                | NodeKind::WhileStatement
                | NodeKind::DoWhileStatement
                | NodeKind::ForStatement
                | NodeKind::ForInStatement
                | NodeKind::ForOfStatement
                | NodeKind::TryStatement
                | NodeKind::LabeledStatement
        )
    }

    pub const fn is_declaration(self) -> bool {
        matches!(
            self,
            NodeKind::VariableDeclaration
                | NodeKind::FunctionDeclaration
                | NodeKind::ClassDeclaration
                | NodeKind::ImportDeclaration
                | NodeKind::ExportNamedDeclaration
                | NodeKind::ExportDefaultDeclaration
                | NodeKind::ExportAllDeclaration
        )
    }

    pub const fn is_expression(self) -> bool {
        matches!(
            self,
            NodeKind::Identifier
                | NodeKind::Literal
                | NodeKind::TemplateLiteral
                | NodeKind::TaggedTemplateExpression
                | NodeKind::ThisExpression
                | NodeKind::Super
                | NodeKind::ArrayExpression
                | NodeKind::ObjectExpression
                | NodeKind::FunctionExpression
                | NodeKind::ArrowFunctionExpression
                | NodeKind::ClassExpression
                | NodeKind::UnaryExpression
                | NodeKind::UpdateExpression
                | NodeKind::AwaitExpression
                | NodeKind::YieldExpression
                | NodeKind::BinaryExpression
                | NodeKind::LogicalExpression
                | NodeKind::AssignmentExpression
                | NodeKind::ConditionalExpression
                | NodeKind::CallExpression
                | NodeKind::NewExpression
                | NodeKind::MemberExpression
                | NodeKind::SequenceExpression
        )
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key of a plain attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeKey {
    pub name: CompactString,
}

/// Key of a directive attribute.
///
/// `wx:if` has prefix `wx` and name `if`; `bindtap` and `bind:tap` both have
/// prefix `bind` and name `tap`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectiveKey {
    pub raw: CompactString,
    pub prefix: CompactString,
    pub name: CompactString,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VariableKind {
    Var,
    Let,
    Const,
}

impl VariableKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            VariableKind::Var => "var",
            VariableKind::Let => "let",
            VariableKind::Const => "const",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MethodKind {
    Constructor,
    Method,
    Get,
    Set,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyKind {
    Init,
    Get,
    Set,
}

/// Node payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeData {
    // Markup
    Document {
        children: Vec<NodeId>,
    },
    Element {
        name: CompactString,
        start_tag: NodeId,
        children: Vec<NodeId>,
        end_tag: Option<NodeId>,
    },
    StartTag {
        attributes: Vec<NodeId>,
        self_closing: bool,
    },
    EndTag,
    Attribute {
        key: AttributeKey,
        value: Option<NodeId>,
    },
    Directive {
        key: DirectiveKey,
        value: Option<NodeId>,
    },
    AttributeValue,
    ValueContainer {
        parts: Vec<NodeId>,
    },
    Text,
    Mustache {
        expression: Option<NodeId>,
    },
    RawText,

    // Script
    Program {
        body: Vec<NodeId>,
    },
    Identifier {
        name: CompactString,
    },
    Literal {
        raw: CompactString,
    },
    TemplateLiteral {
        quasis: Vec<NodeId>,
        expressions: Vec<NodeId>,
    },
    TemplateElement,
    TaggedTemplateExpression {
        tag: NodeId,
        quasi: NodeId,
    },
    ThisExpression,
    Super,
    ArrayExpression {
        elements: Vec<Option<NodeId>>,
    },
    ObjectExpression {
        properties: Vec<NodeId>,
    },
    /// Object member. A shorthand member has no value; a shorthand member
    /// with a default keeps its `AssignmentPattern` as the key.
    Property {
        key: NodeId,
        value: Option<NodeId>,
        kind: PropertyKind,
        computed: bool,
        shorthand: bool,
        method: bool,
    },
    FunctionExpression {
        id: Option<NodeId>,
        params: Vec<NodeId>,
        body: NodeId,
        is_async: bool,
        generator: bool,
    },
    ArrowFunctionExpression {
        params: Vec<NodeId>,
        body: NodeId,
        is_async: bool,
        expression: bool,
    },
    ClassExpression {
        id: Option<NodeId>,
        super_class: Option<NodeId>,
        body: NodeId,
    },
    ClassBody {
        body: Vec<NodeId>,
    },
    MethodDefinition {
        decorators: Vec<NodeId>,
        key: NodeId,
        value: NodeId,
        kind: MethodKind,
        computed: bool,
        is_static: bool,
    },
    PropertyDefinition {
        decorators: Vec<NodeId>,
        key: NodeId,
        value: Option<NodeId>,
        computed: bool,
        is_static: bool,
    },
    Decorator {
        expression: NodeId,
    },
    UnaryExpression {
        operator: CompactString,
        argument: NodeId,
    },
    UpdateExpression {
        operator: CompactString,
        prefix: bool,
        argument: NodeId,
    },
    AwaitExpression {
        argument: NodeId,
    },
    YieldExpression {
        argument: Option<NodeId>,
        delegate: bool,
    },
    SpreadElement {
        argument: NodeId,
    },
    RestElement {
        argument: NodeId,
    },
    BinaryExpression {
        operator: CompactString,
        left: NodeId,
        right: NodeId,
    },
    LogicalExpression {
        operator: CompactString,
        left: NodeId,
        right: NodeId,
    },
    AssignmentExpression {
        operator: CompactString,
        left: NodeId,
        right: NodeId,
    },
    AssignmentPattern {
        left: NodeId,
        right: NodeId,
    },
    ConditionalExpression {
        test: NodeId,
        consequent: NodeId,
        alternate: NodeId,
    },
    CallExpression {
        callee: NodeId,
        arguments: Vec<NodeId>,
        optional: bool,
    },
    /// `new Foo` without parentheses has no arguments and `has_arguments == false`
    NewExpression {
        callee: NodeId,
        arguments: Vec<NodeId>,
        has_arguments: bool,
    },
    MemberExpression {
        object: NodeId,
        property: NodeId,
        computed: bool,
        optional: bool,
    },
    SequenceExpression {
        expressions: Vec<NodeId>,
    },
    ArrayPattern {
        elements: Vec<Option<NodeId>>,
    },
    ObjectPattern {
        properties: Vec<NodeId>,
    },
    ExpressionStatement {
        expression: NodeId,
    },
    BlockStatement {
        body: Vec<NodeId>,
    },
    EmptyStatement,
    DebuggerStatement,
    ReturnStatement {
        argument: Option<NodeId>,
    },
    BreakStatement {
        label: Option<NodeId>,
    },
    ContinueStatement {
        label: Option<NodeId>,
    },
    ThrowStatement {
        argument: NodeId,
    },
    IfStatement {
        test: NodeId,
        consequent: NodeId,
        alternate: Option<NodeId>,
    },
    SwitchStatement {
        discriminant: NodeId,
        cases: Vec<NodeId>,
    },
    /// `default:` has no test
    SwitchCase {
        test: Option<NodeId>,
        consequent: Vec<NodeId>,
    },
    WhileStatement {
        test: NodeId,
        body: NodeId,
    },
    DoWhileStatement {
        body: NodeId,
        test: NodeId,
    },
    ForStatement {
        init: Option<NodeId>,
        test: Option<NodeId>,
        update: Option<NodeId>,
        body: NodeId,
    },
    ForInStatement {
        left: NodeId,
        right: NodeId,
        body: NodeId,
    },
    ForOfStatement {
        left: NodeId,
        right: NodeId,
        body: NodeId,
        is_await: bool,
    },
    TryStatement {
        block: NodeId,
        handler: Option<NodeId>,
        finalizer: Option<NodeId>,
    },
    CatchClause {
        param: Option<NodeId>,
        body: NodeId,
    },
    LabeledStatement {
        label: NodeId,
        body: NodeId,
    },
    VariableDeclaration {
        kind: VariableKind,
        declarations: Vec<NodeId>,
    },
    VariableDeclarator {
        id: NodeId,
        init: Option<NodeId>,
    },
    FunctionDeclaration {
        id: Option<NodeId>,
        params: Vec<NodeId>,
        body: NodeId,
        is_async: bool,
        generator: bool,
    },
    ClassDeclaration {
        id: Option<NodeId>,
        super_class: Option<NodeId>,
        body: NodeId,
    },
    ImportDeclaration {
        specifiers: Vec<NodeId>,
        source: NodeId,
    },
    /// `local` is present only when renamed with `as`
    ImportSpecifier {
        imported: NodeId,
        local: Option<NodeId>,
    },
    ImportDefaultSpecifier {
        local: NodeId,
    },
    ImportNamespaceSpecifier {
        local: NodeId,
    },
    ExportNamedDeclaration {
        declaration: Option<NodeId>,
        specifiers: Vec<NodeId>,
        source: Option<NodeId>,
    },
    /// `exported` is present only when renamed with `as`
    ExportSpecifier {
        local: NodeId,
        exported: Option<NodeId>,
    },
    ExportDefaultDeclaration {
        declaration: NodeId,
    },
    ExportAllDeclaration {
        exported: Option<NodeId>,
        source: NodeId,
    },
}

impl NodeData {
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeData::Document { .. } => NodeKind::Document,
            NodeData::Element { .. } => NodeKind::Element,
            NodeData::StartTag { .. } => NodeKind::StartTag,
            NodeData::EndTag => NodeKind::EndTag,
            NodeData::Attribute { .. } => NodeKind::Attribute,
            NodeData::Directive { .. } => NodeKind::Directive,
            NodeData::AttributeValue => NodeKind::AttributeValue,
            NodeData::ValueContainer { .. } => NodeKind::ValueContainer,
            NodeData::Text => NodeKind::Text,
            NodeData::Mustache { .. } => NodeKind::Mustache,
            NodeData::RawText => NodeKind::RawText,
            NodeData::Program { .. } => NodeKind::Program,
            NodeData::Identifier { .. } => NodeKind::Identifier,
            NodeData::Literal { .. } => NodeKind::Literal,
            NodeData::TemplateLiteral { .. } => NodeKind::TemplateLiteral,
            NodeData::TemplateElement => NodeKind::TemplateElement,
            NodeData::TaggedTemplateExpression { .. } => NodeKind::TaggedTemplateExpression,
            NodeData::ThisExpression => NodeKind::ThisExpression,
            NodeData::Super => NodeKind::Super,
            NodeData::ArrayExpression { .. } => NodeKind::ArrayExpression,
            NodeData::ObjectExpression { .. } => NodeKind::ObjectExpression,
            NodeData::Property { .. } => NodeKind::Property,
            NodeData::FunctionExpression { .. } => NodeKind::FunctionExpression,
            NodeData::ArrowFunctionExpression { .. } => NodeKind::ArrowFunctionExpression,
            NodeData::ClassExpression { .. } => NodeKind::ClassExpression,
            NodeData::ClassBody { .. } => NodeKind::ClassBody,
            NodeData::MethodDefinition { .. } => NodeKind::MethodDefinition,
            NodeData::PropertyDefinition { .. } => NodeKind::PropertyDefinition,
            NodeData::Decorator { .. } => NodeKind::Decorator,
            NodeData::UnaryExpression { .. } => NodeKind::UnaryExpression,
            NodeData::UpdateExpression { .. } => NodeKind::UpdateExpression,
            NodeData::AwaitExpression { .. } => NodeKind::AwaitExpression,
            NodeData::YieldExpression { .. } => NodeKind::YieldExpression,
            NodeData::SpreadElement { .. } => NodeKind::SpreadElement,
            NodeData::RestElement { .. } => NodeKind::RestElement,
            NodeData::BinaryExpression { .. } => NodeKind::BinaryExpression,
            NodeData::LogicalExpression { .. } => NodeKind::LogicalExpression,
            NodeData::AssignmentExpression { .. } => NodeKind::AssignmentExpression,
            NodeData::AssignmentPattern { .. } => NodeKind::AssignmentPattern,
            NodeData::ConditionalExpression { .. } => NodeKind::ConditionalExpression,
            NodeData::CallExpression { .. } => NodeKind::CallExpression,
            NodeData::NewExpression { .. } => NodeKind::NewExpression,
            NodeData::MemberExpression { .. } => NodeKind::MemberExpression,
            NodeData::SequenceExpression { .. } => NodeKind::SequenceExpression,
            NodeData::ArrayPattern { .. } => NodeKind::ArrayPattern,
            NodeData::ObjectPattern { .. } => NodeKind::ObjectPattern,
            NodeData::ExpressionStatement { .. } => NodeKind::ExpressionStatement,
            NodeData::BlockStatement { .. } => NodeKind::BlockStatement,
            NodeData::EmptyStatement => NodeKind::EmptyStatement,
            NodeData::DebuggerStatement => NodeKind::DebuggerStatement,
            NodeData::ReturnStatement { .. } => NodeKind::ReturnStatement,
            NodeData::BreakStatement { .. } => NodeKind::BreakStatement,
            NodeData::ContinueStatement { .. } => NodeKind::ContinueStatement,
            NodeData::ThrowStatement { .. } => NodeKind::ThrowStatement,
            NodeData::IfStatement { .. } => NodeKind::IfStatement,
            NodeData::SwitchStatement { .. } => NodeKind::SwitchStatement,
            NodeData::SwitchCase { .. } => NodeKind::SwitchCase,
            NodeData::WhileStatement { .. } => NodeKind::WhileStatement,
            NodeData::DoWhileStatement { .. } => NodeKind::DoWhileStatement,
            NodeData::ForStatement { .. } => NodeKind::ForStatement,
            NodeData::ForInStatement { .. } => NodeKind::ForInStatement,
            NodeData::ForOfStatement { .. } => NodeKind::ForOfStatement,
            NodeData::TryStatement { .. } => NodeKind::TryStatement,
            NodeData::CatchClause { .. } => NodeKind::CatchClause,
            NodeData::LabeledStatement { .. } => NodeKind::LabeledStatement,
            NodeData::VariableDeclaration { .. } => NodeKind::VariableDeclaration,
            NodeData::VariableDeclarator { .. } => NodeKind::VariableDeclarator,
            NodeData::FunctionDeclaration { .. } => NodeKind::FunctionDeclaration,
            NodeData::ClassDeclaration { .. } => NodeKind::ClassDeclaration,
            NodeData::ImportDeclaration { .. } => NodeKind::ImportDeclaration,
            NodeData::ImportSpecifier { .. } => NodeKind::ImportSpecifier,
            NodeData::ImportDefaultSpecifier { .. } => NodeKind::ImportDefaultSpecifier,
            NodeData::ImportNamespaceSpecifier { .. } => NodeKind::ImportNamespaceSpecifier,
            NodeData::ExportNamedDeclaration { .. } => NodeKind::ExportNamedDeclaration,
            NodeData::ExportSpecifier { .. } => NodeKind::ExportSpecifier,
            NodeData::ExportDefaultDeclaration { .. } => NodeKind::ExportDefaultDeclaration,
            NodeData::ExportAllDeclaration { .. } => NodeKind::ExportAllDeclaration,
        }
    }

    /// Direct children in source order
    pub fn children(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut push = |id: &Option<NodeId>| {
            if let Some(id) = id {
                out.push(*id);
            }
        };
        match self {
            NodeData::Document { children } => return children.clone(),
            NodeData::Element {
                start_tag,
                children,
                end_tag,
                ..
            } => {
                push(&Some(*start_tag));
                for child in children {
                    push(&Some(*child));
                }
                push(end_tag);
            }
            NodeData::StartTag { attributes, .. } => return attributes.clone(),
            NodeData::Attribute { value, .. } | NodeData::Directive { value, .. } => push(value),
            NodeData::ValueContainer { parts } => return parts.clone(),
            NodeData::Mustache { expression } => push(expression),
            NodeData::Program { body }
            | NodeData::BlockStatement { body }
            | NodeData::ClassBody { body } => return body.clone(),
            NodeData::TemplateLiteral {
                quasis,
                expressions,
            } => {
                // quasis and expressions interleave, each quasi first
                for (index, quasi) in quasis.iter().enumerate() {
                    push(&Some(*quasi));
                    push(&expressions.get(index).copied());
                }
            }
            NodeData::TaggedTemplateExpression { tag, quasi } => {
                push(&Some(*tag));
                push(&Some(*quasi));
            }
            NodeData::ArrayExpression { elements } | NodeData::ArrayPattern { elements } => {
                for element in elements {
                    push(element);
                }
            }
            NodeData::ObjectExpression { properties } | NodeData::ObjectPattern { properties } => {
                return properties.clone()
            }
            NodeData::Property { key, value, .. } => {
                push(&Some(*key));
                push(value);
            }
            NodeData::FunctionExpression {
                id, params, body, ..
            }
            | NodeData::FunctionDeclaration {
                id, params, body, ..
            } => {
                push(id);
                for param in params {
                    push(&Some(*param));
                }
                push(&Some(*body));
            }
            NodeData::ArrowFunctionExpression { params, body, .. } => {
                for param in params {
                    push(&Some(*param));
                }
                push(&Some(*body));
            }
            NodeData::ClassExpression {
                id,
                super_class,
                body,
            }
            | NodeData::ClassDeclaration {
                id,
                super_class,
                body,
            } => {
                push(id);
                push(super_class);
                push(&Some(*body));
            }
            NodeData::MethodDefinition {
                decorators,
                key,
                value,
                ..
            } => {
                for decorator in decorators {
                    push(&Some(*decorator));
                }
                push(&Some(*key));
                push(&Some(*value));
            }
            NodeData::PropertyDefinition {
                decorators,
                key,
                value,
                ..
            } => {
                for decorator in decorators {
                    push(&Some(*decorator));
                }
                push(&Some(*key));
                push(value);
            }
            NodeData::Decorator { expression }
            | NodeData::ExpressionStatement { expression } => push(&Some(*expression)),
            NodeData::UnaryExpression { argument, .. }
            | NodeData::UpdateExpression { argument, .. }
            | NodeData::AwaitExpression { argument }
            | NodeData::SpreadElement { argument }
            | NodeData::RestElement { argument }
            | NodeData::ThrowStatement { argument } => push(&Some(*argument)),
            NodeData::YieldExpression { argument, .. }
            | NodeData::ReturnStatement { argument } => push(argument),
            NodeData::BinaryExpression { left, right, .. }
            | NodeData::LogicalExpression { left, right, .. }
            | NodeData::AssignmentExpression { left, right, .. }
            | NodeData::AssignmentPattern { left, right } => {
                push(&Some(*left));
                push(&Some(*right));
            }
            NodeData::ConditionalExpression {
                test,
                consequent,
                alternate,
            } => {
                push(&Some(*test));
                push(&Some(*consequent));
                push(&Some(*alternate));
            }
            NodeData::CallExpression {
                callee, arguments, ..
            }
            | NodeData::NewExpression {
                callee, arguments, ..
            } => {
                push(&Some(*callee));
                for argument in arguments {
                    push(&Some(*argument));
                }
            }
            NodeData::MemberExpression {
                object, property, ..
            } => {
                push(&Some(*object));
                push(&Some(*property));
            }
            NodeData::SequenceExpression { expressions } => return expressions.clone(),
            NodeData::BreakStatement { label } | NodeData::ContinueStatement { label } => {
                push(label)
            }
            NodeData::IfStatement {
                test,
                consequent,
                alternate,
            } => {
                push(&Some(*test));
                push(&Some(*consequent));
                push(alternate);
            }
            NodeData::SwitchStatement {
                discriminant,
                cases,
            } => {
                push(&Some(*discriminant));
                for case in cases {
                    push(&Some(*case));
                }
            }
            NodeData::SwitchCase { test, consequent } => {
                push(test);
                for statement in consequent {
                    push(&Some(*statement));
                }
            }
            NodeData::WhileStatement { test, body } => {
                push(&Some(*test));
                push(&Some(*body));
            }
            NodeData::DoWhileStatement { body, test } => {
                push(&Some(*body));
                push(&Some(*test));
            }
            NodeData::ForStatement {
                init,
                test,
                update,
                body,
            } => {
                push(init);
                push(test);
                push(update);
                push(&Some(*body));
            }
            NodeData::ForInStatement { left, right, body }
            | NodeData::ForOfStatement {
                left, right, body, ..
            } => {
                push(&Some(*left));
                push(&Some(*right));
                push(&Some(*body));
            }
            NodeData::TryStatement {
                block,
                handler,
                finalizer,
            } => {
                push(&Some(*block));
                push(handler);
                push(finalizer);
            }
            NodeData::CatchClause { param, body } => {
                push(param);
                push(&Some(*body));
            }
            NodeData::LabeledStatement { label, body } => {
                push(&Some(*label));
                push(&Some(*body));
            }
            NodeData::VariableDeclaration { declarations, .. } => return declarations.clone(),
            NodeData::VariableDeclarator { id, init } => {
                push(&Some(*id));
                push(init);
            }
            NodeData::ImportDeclaration { specifiers, source } => {
                for specifier in specifiers {
                    push(&Some(*specifier));
                }
                push(&Some(*source));
            }
            NodeData::ImportSpecifier { imported, local } => {
                push(&Some(*imported));
                push(local);
            }
            NodeData::ImportDefaultSpecifier { local }
            | NodeData::ImportNamespaceSpecifier { local } => push(&Some(*local)),
            NodeData::ExportNamedDeclaration {
                declaration,
                specifiers,
                source,
            } => {
                push(declaration);
                for specifier in specifiers {
                    push(&Some(*specifier));
                }
                push(source);
            }
            NodeData::ExportSpecifier { local, exported } => {
                push(&Some(*local));
                push(exported);
            }
            NodeData::ExportDefaultDeclaration { declaration } => push(&Some(*declaration)),
            NodeData::ExportAllDeclaration { exported, source } => {
                push(exported);
                push(&Some(*source));
            }
            NodeData::EndTag
            | NodeData::AttributeValue
            | NodeData::Text
            | NodeData::RawText
            | NodeData::Identifier { .. }
            | NodeData::Literal { .. }
            | NodeData::TemplateElement
            | NodeData::ThisExpression
            | NodeData::Super
            | NodeData::EmptyStatement
            | NodeData::DebuggerStatement => {}
        }
        out
    }
}

/// A node in the arena
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub span: Span,
    pub parent: Option<NodeId>,
    pub data: NodeData,
}

impl Node {
    pub fn new(span: Span, data: NodeData) -> Self {
        Self {
            span,
            parent: None,
            data,
        }
    }

    #[inline]
    pub fn kind(&self) -> NodeKind {
        self.data.kind()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names_round_trip() {
        for kind in NodeKind::ALL {
            assert_eq!(NodeKind::from_name(kind.as_str()), Some(*kind));
        }
        assert_eq!(NodeKind::from_name("JSXElement"), None);
    }

    #[test]
    fn test_kind_groups() {
        assert!(NodeKind::Element.is_markup());
        assert!(!NodeKind::Program.is_markup());
        assert!(NodeKind::IfStatement.is_statement());
        assert!(NodeKind::VariableDeclaration.is_declaration());
        assert!(NodeKind::CallExpression.is_expression());
        assert!(!NodeKind::Decorator.is_expression());
    }

    #[test]
    fn test_template_literal_children_interleave() {
        let data = NodeData::TemplateLiteral {
            quasis: vec![NodeId(1), NodeId(3), NodeId(5)],
            expressions: vec![NodeId(2), NodeId(4)],
        };
        assert_eq!(
            data.children(),
            vec![NodeId(1), NodeId(2), NodeId(3), NodeId(4), NodeId(5)]
        );
    }

    #[test]
    fn test_array_holes_are_skipped() {
        let data = NodeData::ArrayExpression {
            elements: vec![Some(NodeId(1)), None, Some(NodeId(2))],
        };
        assert_eq!(data.children(), vec![NodeId(1), NodeId(2)]);
    }
}
