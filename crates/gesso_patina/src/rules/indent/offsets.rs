//! Offset table: the expected-indentation graph of one subtree.
//!
//! Every entry says "this token is indented `offset` units past the
//! indentation of `base`". Node handlers run parent first, so a child
//! handler overwrites whatever its parent wrote generically for the same
//! token. That write order is part of the algorithm: the last writer wins.

use gesso_carton::{FxHashMap, FxHashSet};
use gesso_relief::TokenId;

/// Expected indentation of one token relative to another
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OffsetEntry {
    /// `None` for a top-level anchor
    pub base: Option<TokenId>,
    /// Indent units added to the base's indentation
    pub offset: u32,
    /// Siblings align to this token's printed column
    pub baseline: bool,
    /// Resolved indentation; seeded for anchors, filled in during validation
    pub expected_indent: Option<u32>,
}

impl OffsetEntry {
    #[inline]
    pub fn relative(base: TokenId, offset: u32) -> Self {
        Self {
            base: Some(base),
            offset,
            baseline: false,
            expected_indent: None,
        }
    }

    #[inline]
    pub fn anchor(expected_indent: u32) -> Self {
        Self {
            base: None,
            offset: 0,
            baseline: false,
            expected_indent: Some(expected_indent),
        }
    }
}

/// Offset entries and ignored tokens of the subtree being checked
#[derive(Debug, Default)]
pub struct OffsetTable {
    entries: FxHashMap<TokenId, OffsetEntry>,
    ignored: FxHashSet<TokenId>,
}

impl OffsetTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every entry and ignored token
    pub fn clear(&mut self) {
        self.entries.clear();
        self.ignored.clear();
    }

    #[inline]
    pub fn get(&self, token: TokenId) -> Option<&OffsetEntry> {
        self.entries.get(&token)
    }

    #[inline]
    pub fn get_mut(&mut self, token: TokenId) -> Option<&mut OffsetEntry> {
        self.entries.get_mut(&token)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Make `token` relative to `base`. A token is never its own base.
    pub fn set_offset(&mut self, token: Option<TokenId>, offset: u32, base: Option<TokenId>) {
        let (Some(token), Some(base)) = (token, base) else {
            return;
        };
        if token != base {
            self.entries.insert(token, OffsetEntry::relative(base, offset));
        }
    }

    /// [`Self::set_offset`] for many tokens at once
    pub fn set_offsets<I>(&mut self, tokens: I, offset: u32, base: Option<TokenId>)
    where
        I: IntoIterator<Item = TokenId>,
    {
        for token in tokens {
            self.set_offset(Some(token), offset, base);
        }
    }

    /// Mark an existing entry as a baseline
    pub fn set_baseline(&mut self, token: Option<TokenId>) {
        if let Some(entry) = token.and_then(|token| self.entries.get_mut(&token)) {
            entry.baseline = true;
        }
    }

    /// Seed a top-level anchor with an absolute indentation
    pub fn set_expected(&mut self, token: Option<TokenId>, expected_indent: u32) {
        let Some(token) = token else {
            return;
        };
        self.entries
            .entry(token)
            .and_modify(|entry| entry.expected_indent = Some(expected_indent))
            .or_insert(OffsetEntry::anchor(expected_indent));
    }

    /// Give `token` a copy of `source`'s entry, if it has one
    pub fn copy_entry(&mut self, source: TokenId, token: TokenId) {
        if let Some(entry) = self.entries.get(&source).copied() {
            self.entries.insert(token, entry);
        }
    }

    /// Remove entries of `tokens` and exclude them from validation
    pub fn ignore<I>(&mut self, tokens: I)
    where
        I: IntoIterator<Item = TokenId>,
    {
        for token in tokens {
            self.entries.remove(&token);
            self.ignored.insert(token);
        }
    }

    #[inline]
    pub fn is_ignored(&self, token: TokenId) -> bool {
        self.ignored.contains(&token)
    }

    /// Number of base hops from `token` to an anchor or a dangling base
    pub fn chain_len(&self, token: TokenId) -> usize {
        let mut hops = 0;
        let mut current = token;
        while let Some(base) = self.entries.get(&current).and_then(|entry| entry.base) {
            hops += 1;
            if hops > self.entries.len() {
                break;
            }
            current = base;
        }
        hops
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: TokenId = TokenId(0);
    const B: TokenId = TokenId(1);
    const C: TokenId = TokenId(2);

    #[test]
    fn test_last_writer_wins() {
        let mut table = OffsetTable::new();
        table.set_offset(Some(B), 1, Some(A));
        table.set_offset(Some(B), 0, Some(C));
        assert_eq!(table.get(B), Some(&OffsetEntry::relative(C, 0)));
    }

    #[test]
    fn test_token_is_never_its_own_base() {
        let mut table = OffsetTable::new();
        table.set_offsets([A, B], 1, Some(A));
        assert!(table.get(A).is_none());
        assert!(table.get(B).is_some());
        table.set_offset(None, 1, Some(A));
        table.set_offset(Some(C), 1, None);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_anchor_keeps_existing_relation() {
        let mut table = OffsetTable::new();
        table.set_offset(Some(B), 2, Some(A));
        table.set_expected(Some(B), 4);
        let entry = table.get(B).unwrap();
        assert_eq!(entry.base, Some(A));
        assert_eq!(entry.expected_indent, Some(4));

        table.set_expected(Some(C), 0);
        assert_eq!(table.get(C), Some(&OffsetEntry::anchor(0)));
    }

    #[test]
    fn test_baseline_needs_an_entry() {
        let mut table = OffsetTable::new();
        table.set_baseline(Some(A));
        assert!(table.get(A).is_none());
        table.set_offset(Some(B), 1, Some(A));
        table.set_baseline(Some(B));
        assert!(table.get(B).unwrap().baseline);
    }

    #[test]
    fn test_ignore_removes_entries() {
        let mut table = OffsetTable::new();
        table.set_offset(Some(B), 1, Some(A));
        table.ignore([B, C]);
        assert!(table.get(B).is_none());
        assert!(table.is_ignored(B));
        assert!(table.is_ignored(C));
        assert!(!table.is_ignored(A));
    }

    #[test]
    fn test_chain_len() {
        let mut table = OffsetTable::new();
        table.set_expected(Some(A), 0);
        table.set_offset(Some(B), 1, Some(A));
        table.set_offset(Some(C), 1, Some(B));
        assert_eq!(table.chain_len(C), 2);
        assert_eq!(table.chain_len(A), 0);
    }
}
