//! Carton - The artist's toolbox for Gesso.
//!
//! This crate provides the foundational utilities shared by every Gesso crate,
//! much like a carton (artist's portfolio case) holds the essential tools and
//! materials an artist needs for their work.
//!
//! # Modules
//!
//! - **Line index**: byte offset to line/column conversion
//! - **Tag tables**: void, raw-text and preformatted tag names of the markup dialect
//! - **General**: character classification helpers
//!
//! # Example
//!
//! ```
//! use gesso_carton::LineIndex;
//!
//! let index = LineIndex::new("<view>\n  <text />\n</view>");
//! assert_eq!(index.line_count(), 3);
//! assert_eq!(index.line_start(2), 7);
//! ```

pub mod general;
pub mod line_index;
pub mod tag_config;

// Re-export compact_str::CompactString for convenience
pub use compact_str::CompactString;

// Re-export smallvec for stack-optimized collections
pub use smallvec::{smallvec, SmallVec};

// Re-export rustc-hash for fast hash maps/sets
pub use rustc_hash::{FxHashMap, FxHashSet};

// Re-export phf for compile-time perfect hash functions
pub use phf::{phf_set, Set as PhfSet};

pub use general::*;
pub use line_index::LineIndex;
pub use tag_config::*;
