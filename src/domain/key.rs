//! Normalized title keys
//!
//! Every title comparison in a scheduling run goes through [`TitleKey`]:
//! validation, graph construction, comparator lookups and projection all
//! use the same folding rule.

use std::fmt;

/// Case-insensitive, whitespace-trimmed title key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TitleKey(String);

impl TitleKey {
    /// Folds a title into its key
    pub fn new(title: &str) -> Self {
        Self(title.trim().to_lowercase())
    }

    /// Returns true if the title had no visible characters
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TitleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
