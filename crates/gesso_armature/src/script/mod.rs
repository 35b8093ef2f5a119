//! Script grammar: an ECMAScript subset used by `<script>` blocks and by
//! mustache expressions.

pub mod lexer;
mod parser;

pub use lexer::{lex, LexMode, LexOutput};
pub use parser::{parse_expression, parse_program};
