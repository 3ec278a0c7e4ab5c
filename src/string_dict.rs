//! Interning for identifier and string-literal text.
//!
//! The lexer routes every identifier and string literal through a [`StringDict`],
//! so repeated names in a program share one `Rc<str>` and environment lookups
//! hash the same allocation.

use rustc_hash::FxHashMap;

use crate::value::{CheapClone, SourceString};

/// A dictionary for deduplicating [`SourceString`] instances.
pub struct StringDict {
    /// Keyed by `Box<str>` to avoid a double indirection through `Rc`.
    strings: FxHashMap<Box<str>, SourceString>,
}

impl StringDict {
    pub fn new() -> Self {
        Self {
            strings: FxHashMap::default(),
        }
    }

    /// Create a dictionary pre-populated with the names the builtins and
    /// preludes use most.
    pub fn with_common_strings() -> Self {
        let mut dict = Self::new();
        for s in COMMON_STRINGS {
            dict.get_or_insert(s);
        }
        dict
    }

    /// Get an existing string or insert a new one.
    pub fn get_or_insert(&mut self, s: &str) -> SourceString {
        if let Some(existing) = self.strings.get(s) {
            return existing.cheap_clone();
        }
        let interned = SourceString::from(s);
        self.strings.insert(s.into(), interned.cheap_clone());
        interned
    }

    pub fn get(&self, s: &str) -> Option<SourceString> {
        self.strings.get(s).map(|s| s.cheap_clone())
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

impl Default for StringDict {
    fn default() -> Self {
        Self::new()
    }
}

const COMMON_STRINGS: &[&str] = &[
    // pairs and lists
    "pair",
    "head",
    "tail",
    "is_null",
    "is_pair",
    "list",
    "map",
    "filter",
    "accumulate",
    "append",
    "length",
    "reverse",
    // control
    "call_cc",
    "reset",
    "shift",
    "is_cont",
    // misc
    "display",
    "stringify",
    "error",
    "undefined",
    // common parameter names
    "f",
    "k",
    "x",
    "y",
    "n",
    "xs",
    "ys",
    "lst",
    "val",
    "acc",
];
