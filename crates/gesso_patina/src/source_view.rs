//! Source views handed to rules.
//!
//! [`GenericSourceView`] answers text and line questions from the source
//! alone. [`ScopedSourceView`] adds the template-aware [`TokenStore`] when
//! the document's token stream is usable and falls back to the generic view
//! for everything else.

use gesso_armature::TokenStore;
use gesso_carton::LineIndex;
use gesso_relief::{Document, Span};

/// Text, line and position queries over one source text
#[derive(Debug, Clone, Copy)]
pub struct GenericSourceView<'a> {
    source: &'a str,
    lines: &'a LineIndex,
}

impl<'a> GenericSourceView<'a> {
    pub fn new(source: &'a str, lines: &'a LineIndex) -> Self {
        Self { source, lines }
    }

    #[inline]
    pub fn text(&self) -> &'a str {
        self.source
    }

    /// Text covered by `span`, empty when out of range
    #[inline]
    pub fn slice(&self, span: Span) -> &'a str {
        self.source
            .get(span.start as usize..span.end as usize)
            .unwrap_or("")
    }

    #[inline]
    pub fn line_count(&self) -> usize {
        self.lines.line_count()
    }

    /// Byte offset of 1-indexed `line`
    #[inline]
    pub fn line_start(&self, line: u32) -> u32 {
        self.lines.line_start(line)
    }

    /// Text of 1-indexed `line` without its terminator
    #[inline]
    pub fn line_text(&self, line: u32) -> &'a str {
        self.lines.line_text(self.source, line)
    }

    /// 1-indexed line and character column of `offset`
    #[inline]
    pub fn position(&self, offset: u32) -> (u32, u32) {
        self.lines.position(self.source, offset)
    }
}

/// Source view of one document, with token queries when available
#[derive(Debug, Clone, Copy)]
pub struct ScopedSourceView<'a> {
    doc: &'a Document,
    store: Option<TokenStore<'a>>,
    generic: GenericSourceView<'a>,
}

impl<'a> ScopedSourceView<'a> {
    /// View with token queries
    pub fn new(doc: &'a Document) -> Self {
        Self {
            doc,
            store: Some(TokenStore::new(doc)),
            generic: GenericSourceView::new(doc.source(), doc.line_index()),
        }
    }

    /// View without token queries
    pub fn without_tokens(doc: &'a Document) -> Self {
        Self {
            store: None,
            ..Self::new(doc)
        }
    }

    /// Token queries are only offered when no fatal parse error left the
    /// token stream unusable
    pub fn for_document(doc: &'a Document) -> Self {
        if doc.has_fatal_error() {
            tracing::debug!(
                errors = doc.errors().len(),
                "fatal parse error, token queries disabled"
            );
            Self::without_tokens(doc)
        } else {
            Self::new(doc)
        }
    }

    #[inline]
    pub fn document(&self) -> &'a Document {
        self.doc
    }

    #[inline]
    pub fn token_store(&self) -> Option<TokenStore<'a>> {
        self.store
    }

    #[inline]
    pub fn has_tokens(&self) -> bool {
        self.store.is_some()
    }

    #[inline]
    pub fn generic(&self) -> &GenericSourceView<'a> {
        &self.generic
    }

    #[inline]
    pub fn text(&self) -> &'a str {
        self.generic.text()
    }

    #[inline]
    pub fn slice(&self, span: Span) -> &'a str {
        self.generic.slice(span)
    }

    #[inline]
    pub fn line_count(&self) -> usize {
        self.generic.line_count()
    }

    #[inline]
    pub fn line_start(&self, line: u32) -> u32 {
        self.generic.line_start(line)
    }

    #[inline]
    pub fn line_text(&self, line: u32) -> &'a str {
        self.generic.line_text(line)
    }

    #[inline]
    pub fn position(&self, offset: u32) -> (u32, u32) {
        self.generic.position(offset)
    }
}
