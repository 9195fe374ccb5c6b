//! Per-compilation string interner.
//!
//! Each shader owns its interner; nothing is shared across files, so the
//! table needs no locking.

use rustc_hash::FxHashMap;
use std::fmt;

/// Interned identifier. Equality is an integer compare.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct Name(u32);

impl Name {
    /// The empty string, pre-interned at index 0.
    pub const EMPTY: Name = Name(0);

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({})", self.0)
    }
}

/// Maps strings to [`Name`]s and back.
#[derive(Clone)]
pub struct StringInterner {
    map: FxHashMap<Box<str>, Name>,
    strings: Vec<Box<str>>,
}

impl StringInterner {
    pub fn new() -> Self {
        let mut interner = StringInterner {
            map: FxHashMap::default(),
            strings: Vec::with_capacity(256),
        };
        interner.intern("");
        interner
    }

    /// Intern `text`, returning the existing name when already present.
    pub fn intern(&mut self, text: &str) -> Name {
        if let Some(&name) = self.map.get(text) {
            return name;
        }
        let index = u32::try_from(self.strings.len()).unwrap_or(u32::MAX);
        let name = Name(index);
        self.strings.push(text.into());
        self.map.insert(text.into(), name);
        name
    }

    /// Look up a name without interning it.
    pub fn get(&self, text: &str) -> Option<Name> {
        self.map.get(text).copied()
    }

    /// Resolve a name to its text. Unknown names resolve to `""`.
    pub fn lookup(&self, name: Name) -> &str {
        self.strings.get(name.index()).map_or("", |s| s)
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.len() <= 1
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StringInterner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StringInterner")
            .field("len", &self.strings.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_dedupes() {
        let mut interner = StringInterner::new();
        let a = interner.intern("color");
        let b = interner.intern("color");
        let c = interner.intern("normal");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(interner.lookup(c), "normal");
    }

    #[test]
    fn test_empty_is_preinterned() {
        let mut interner = StringInterner::new();
        assert_eq!(interner.intern(""), Name::EMPTY);
        assert!(interner.is_empty());
        assert_eq!(interner.get("missing"), None);
    }
}
