//! Relief - The sculptured token and node surface for Gesso templates.
//!
//! ## Name Origin
//!
//! **Relief** is a sculptural technique where forms project from a flat
//! background. `gesso_relief` is the surface the linter reads: the token
//! stream and the node tree raised out of a flat source text.
//!
//! The tree is an arena: nodes live in one vector inside [`Document`] and
//! refer to each other by [`NodeId`]. Every node carries an explicit
//! [`NodeKind`] tag and structured fields ([`NodeData`]).

pub mod ast;
pub mod document;
pub mod errors;
pub mod options;
pub mod token;

pub use ast::{
    AttributeKey, DirectiveKey, MethodKind, Node, NodeData, NodeId, NodeKind, PropertyKind,
    VariableKind,
};
pub use document::{Document, NodeRef};
pub use errors::{ErrorCode, ParseError};
pub use options::ParserOptions;
pub use token::{Position, SourceLocation, Span, Token, TokenId, TokenKind};
