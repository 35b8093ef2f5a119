//! Armature - The structural parser framework for Gesso templates.
//!
//! ## Name Origin
//!
//! An **armature** is the internal framework a sculptor builds before
//! applying clay. `gesso_armature` gives a template its structure: the
//! markup scanner, the script lexer and parser, and the [`TokenStore`] used
//! to walk the resulting token stream.
//!
//! ```
//! use gesso_armature::parse;
//! use gesso_relief::NodeKind;
//!
//! let doc = parse("<view>{{ count + 1 }}</view>");
//! assert!(doc.errors().is_empty());
//! assert_eq!(doc.nodes_of_kind(NodeKind::BinaryExpression).len(), 1);
//! ```

pub mod parser;
pub mod script;
pub mod token_store;
pub mod tokenizer;

pub use parser::Parser;
pub use token_store::{TokenQuery, TokenStore};

use gesso_relief::{Document, ParserOptions};

/// Parse a template with default options
pub fn parse(source: &str) -> Document {
    parse_with_options(source, &ParserOptions::default())
}

/// Parse a template
pub fn parse_with_options(source: &str, options: &ParserOptions) -> Document {
    Parser::new(source, options).parse()
}
