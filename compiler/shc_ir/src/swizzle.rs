//! Vector swizzles and the lazily built swizzle table.

use rustc_hash::FxHashMap;
use std::fmt;

/// Up to four component selectors, each in `0..4`.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct Swizzle {
    components: [u8; 4],
    len: u8,
}

impl Swizzle {
    /// Build from component indices. Returns `None` for an empty or
    /// over-long selector or an index above 3.
    pub fn new(components: &[u8]) -> Option<Self> {
        if components.is_empty() || components.len() > 4 || components.iter().any(|&c| c > 3) {
            return None;
        }
        let mut packed = [0u8; 4];
        packed[..components.len()].copy_from_slice(components);
        Some(Swizzle {
            components: packed,
            len: components.len() as u8,
        })
    }

    #[inline]
    pub fn len(self) -> u8 {
        self.len
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.len == 0
    }

    pub fn components(&self) -> &[u8] {
        &self.components[..self.len as usize]
    }

    /// Highest component referenced.
    pub fn max_component(self) -> u8 {
        self.components().iter().copied().max().unwrap_or(0)
    }

    /// A swizzle that names a component twice cannot be assigned to.
    pub fn has_duplicates(self) -> bool {
        let comps = self.components();
        comps
            .iter()
            .enumerate()
            .any(|(i, c)| comps[i + 1..].contains(c))
    }

    /// Canonical `xyzw` spelling.
    pub fn letters(self) -> String {
        self.components()
            .iter()
            .map(|&c| char::from(b"xyzw"[c as usize]))
            .collect()
    }
}

impl fmt::Debug for Swizzle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Swizzle(.{})", self.letters())
    }
}

/// Every `xyzw` and `rgba` selector of length 1 through 4.
pub struct SwizzleTable {
    map: FxHashMap<Box<str>, Swizzle>,
}

impl SwizzleTable {
    pub fn new() -> Self {
        let mut map = FxHashMap::default();
        for set in [b"xyzw", b"rgba"] {
            let mut stack: Vec<u8> = Vec::with_capacity(4);
            Self::fill(set, &mut stack, &mut map);
        }
        SwizzleTable { map }
    }

    fn fill(set: &[u8; 4], stack: &mut Vec<u8>, map: &mut FxHashMap<Box<str>, Swizzle>) {
        if stack.len() == 4 {
            return;
        }
        for component in 0..4u8 {
            stack.push(component);
            if let Some(swizzle) = Swizzle::new(stack) {
                let text: String = stack.iter().map(|&c| char::from(set[c as usize])).collect();
                map.insert(text.into_boxed_str(), swizzle);
            }
            Self::fill(set, stack, map);
            stack.pop();
        }
    }

    pub fn lookup(&self, text: &str) -> Option<Swizzle> {
        self.map.get(text).copied()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl Default for SwizzleTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_size() {
        // 4 + 16 + 64 + 256 selectors per letter set
        assert_eq!(SwizzleTable::new().len(), 2 * 340);
    }

    #[test]
    fn test_lookup_both_sets() {
        let table = SwizzleTable::new();
        assert_eq!(table.lookup("xyz"), table.lookup("rgb"));
        assert_eq!(table.lookup("wzyx").map(Swizzle::letters), Some("wzyx".into()));
        assert_eq!(table.lookup("xr"), None);
        assert_eq!(table.lookup("xyzwx"), None);
    }

    #[test]
    fn test_duplicates() {
        let table = SwizzleTable::new();
        assert!(table.lookup("xx").is_some_and(Swizzle::has_duplicates));
        assert!(!table.lookup("xyz").is_some_and(Swizzle::has_duplicates));
        assert_eq!(table.lookup("b").map(Swizzle::max_component), Some(2));
    }
}
