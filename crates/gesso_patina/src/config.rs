//! Configuration file loading for gesso.
//!
//! Reads `gesso.config.json` from a project directory. Rule options use the
//! camelCase keys of the rule documentation:
//!
//! ```json
//! {
//!   "rules": {
//!     "mpx/indent": { "indentUnit": "tab", "alignAttributesVertically": false }
//!   },
//!   "enabledRules": ["mpx/indent"]
//! }
//! ```

use std::path::{Path, PathBuf};

use gesso_carton::{CompactString, FxHashSet, DEFAULT_PREFORMATTED_TAGS};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::selector::{NodeSelector, SelectorError};

/// File name looked up by [`load_config`]
pub const CONFIG_FILE_NAME: &str = "gesso.config.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("`indentUnit` must be at least 1 or \"tab\", got {0}")]
    InvalidIndentUnit(u32),
    #[error("invalid ignore pattern: {0}")]
    Selector(#[from] SelectorError),
}

/// Top-level gesso configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GessoConfig {
    /// JSON Schema reference (for editor autocompletion).
    #[serde(rename = "$schema", default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Per-rule options.
    #[serde(default)]
    pub rules: RulesConfig,

    /// Only run these rules. All registered rules run when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled_rules: Option<Vec<String>>,
}

impl GessoConfig {
    /// Parse a configuration from JSON text.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

/// Options of the configurable rules.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct RulesConfig {
    #[serde(rename = "mpx/indent", default, skip_serializing_if = "Option::is_none")]
    pub indent: Option<IndentOptions>,
}

/// Indent size in spaces, or `"tab"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum IndentUnit {
    Spaces(u32),
    Keyword(IndentKeyword),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IndentKeyword {
    Tab,
}

impl Default for IndentUnit {
    fn default() -> Self {
        Self::Spaces(2)
    }
}

/// Offset of closing brackets, either one value for all tags or per tag kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum CloseBracketOffset {
    Uniform(u32),
    PerTag {
        #[serde(rename = "startTag", default, skip_serializing_if = "Option::is_none")]
        start_tag: Option<u32>,
        #[serde(rename = "endTag", default, skip_serializing_if = "Option::is_none")]
        end_tag: Option<u32>,
        #[serde(rename = "selfClosingTag", default, skip_serializing_if = "Option::is_none")]
        self_closing_tag: Option<u32>,
    },
}

impl Default for CloseBracketOffset {
    fn default() -> Self {
        Self::Uniform(0)
    }
}

/// Options of `mpx/indent` as written in the config file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IndentOptions {
    pub indent_unit: IndentUnit,
    /// Indent levels of the children of top-level elements
    pub base_indent: u32,
    /// Indent levels of top-level statements in script elements
    pub script_base_indent: u32,
    pub attribute_offset: u32,
    pub close_bracket_offset: CloseBracketOffset,
    pub switch_case_offset: u32,
    pub align_attributes_vertically: bool,
    /// Selectors of nodes whose tokens are never checked
    pub ignore_patterns: Vec<String>,
    /// Elements whose content is kept verbatim
    pub preformatted_tags: Vec<String>,
}

impl Default for IndentOptions {
    fn default() -> Self {
        Self {
            indent_unit: IndentUnit::default(),
            base_indent: 1,
            script_base_indent: 0,
            attribute_offset: 1,
            close_bracket_offset: CloseBracketOffset::default(),
            switch_case_offset: 0,
            align_attributes_vertically: true,
            ignore_patterns: Vec::new(),
            preformatted_tags: DEFAULT_PREFORMATTED_TAGS
                .iter()
                .map(|tag| (*tag).to_string())
                .collect(),
        }
    }
}

impl IndentOptions {
    /// Validate the options and compile the ignore patterns.
    pub fn resolve(&self) -> Result<IndentSettings, ConfigError> {
        let (indent_char, indent_size) = match self.indent_unit {
            IndentUnit::Keyword(IndentKeyword::Tab) => ('\t', 1),
            IndentUnit::Spaces(0) => return Err(ConfigError::InvalidIndentUnit(0)),
            IndentUnit::Spaces(size) => (' ', size),
        };
        let close_bracket = match self.close_bracket_offset {
            CloseBracketOffset::Uniform(offset) => CloseBracket {
                start_tag: offset,
                end_tag: offset,
                self_closing_tag: offset,
            },
            CloseBracketOffset::PerTag {
                start_tag,
                end_tag,
                self_closing_tag,
            } => CloseBracket {
                start_tag: start_tag.unwrap_or(0),
                end_tag: end_tag.unwrap_or(0),
                self_closing_tag: self_closing_tag.unwrap_or(0),
            },
        };
        let ignores = self
            .ignore_patterns
            .iter()
            .map(|pattern| NodeSelector::parse(pattern))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(IndentSettings {
            indent_char,
            indent_size,
            base_indent: self.base_indent,
            script_base_indent: self.script_base_indent,
            attribute: self.attribute_offset,
            close_bracket,
            switch_case: self.switch_case_offset,
            align_attributes_vertically: self.align_attributes_vertically,
            ignores,
            preformatted: self
                .preformatted_tags
                .iter()
                .map(|tag| CompactString::from(tag.as_str()))
                .collect(),
        })
    }
}

/// Closing bracket offsets per tag kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CloseBracket {
    pub start_tag: u32,
    pub end_tag: u32,
    pub self_closing_tag: u32,
}

/// Validated `mpx/indent` options
#[derive(Debug, Clone)]
pub struct IndentSettings {
    pub indent_char: char,
    /// Width of one indent level (`1` in tab mode)
    pub indent_size: u32,
    pub base_indent: u32,
    pub script_base_indent: u32,
    pub attribute: u32,
    pub close_bracket: CloseBracket,
    pub switch_case: u32,
    pub align_attributes_vertically: bool,
    pub ignores: Vec<NodeSelector>,
    pub preformatted: FxHashSet<CompactString>,
}

impl IndentSettings {
    #[inline]
    pub fn is_tab(&self) -> bool {
        self.indent_char == '\t'
    }

    /// Unit name used in messages
    #[inline]
    pub fn unit(&self) -> &'static str {
        if self.is_tab() {
            "tab"
        } else {
            "space"
        }
    }

    #[inline]
    pub fn is_preformatted(&self, tag: &str) -> bool {
        self.preformatted.contains(tag)
    }
}

impl Default for IndentSettings {
    fn default() -> Self {
        Self {
            indent_char: ' ',
            indent_size: 2,
            base_indent: 1,
            script_base_indent: 0,
            attribute: 1,
            close_bracket: CloseBracket::default(),
            switch_case: 0,
            align_attributes_vertically: true,
            ignores: Vec::new(),
            preformatted: DEFAULT_PREFORMATTED_TAGS
                .iter()
                .map(|tag| CompactString::from(*tag))
                .collect(),
        }
    }
}

fn config_path(dir: Option<&Path>) -> PathBuf {
    let base = dir
        .map(|d| d.to_path_buf())
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_default());
    base.join(CONFIG_FILE_NAME)
}

/// Load `gesso.config.json` from the given directory (or CWD if None).
///
/// A missing file yields the defaults.
pub fn try_load_config(dir: Option<&Path>) -> Result<GessoConfig, ConfigError> {
    let path = config_path(dir);
    if !path.exists() {
        return Ok(GessoConfig::default());
    }
    let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
        path: path.clone(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| ConfigError::Json { path, source })
}

/// Load `gesso.config.json`, falling back to the defaults on any error.
pub fn load_config(dir: Option<&Path>) -> GessoConfig {
    match try_load_config(dir) {
        Ok(config) => config,
        Err(error) => {
            tracing::warn!(%error, "using default configuration");
            GessoConfig::default()
        }
    }
}
