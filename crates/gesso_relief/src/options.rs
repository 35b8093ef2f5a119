//! Parser options.

use gesso_carton::tag_config;

/// Attribute key prefixes that turn an attribute into a directive, longest first
/// so that `capture-bind` wins over `bind`.
pub const DEFAULT_DIRECTIVE_PREFIXES: &[&str] = &[
    "capture-catch",
    "capture-bind",
    "mut-bind",
    "catch",
    "model",
    "bind",
    "wx",
];

/// Elements holding script statements.
pub const DEFAULT_SCRIPT_TAGS: &[&str] = &["script", "wxs"];

/// Parser options
#[derive(Debug, Clone)]
pub struct ParserOptions {
    /// Whether is a void tag (never has children or an end tag)
    pub is_void_tag: fn(&str) -> bool,
    /// Whether the element content is opaque raw text
    pub is_raw_text_tag: fn(&str) -> bool,
    /// Whether the element content is text without nested tags
    pub is_rcdata_tag: fn(&str) -> bool,
    /// Elements whose content is parsed as a script program
    pub script_tags: &'static [&'static str],
    /// Directive key prefixes
    pub directive_prefixes: &'static [&'static str],
}

impl ParserOptions {
    pub fn is_script_tag(&self, tag: &str) -> bool {
        self.script_tags.contains(&tag)
    }
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            is_void_tag: tag_config::is_void_tag,
            is_raw_text_tag: tag_config::is_raw_text_tag,
            is_rcdata_tag: tag_config::is_rcdata_tag,
            script_tags: DEFAULT_SCRIPT_TAGS,
            directive_prefixes: DEFAULT_DIRECTIVE_PREFIXES,
        }
    }
}
