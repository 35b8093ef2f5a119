//! Lint rules for mpx-style templates.

pub mod core;
pub mod indent;
pub mod mpx;
