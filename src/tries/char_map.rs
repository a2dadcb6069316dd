//! Fixed-domain character map used as node storage by every trie variant.

use std::fmt;

/// Number of slots in the map: the full 16-bit code unit domain.
pub const DOMAIN_SIZE: usize = 1 << 16;

/// A perfect, array-indexed map keyed by a UTF-16 code unit.
///
/// The key type is `u16`, so out-of-domain keys are rejected by construction
/// rather than by runtime checks. Both `get` and `put` are O(1) with no
/// collision handling; the backing array is allocated once and never resized.
///
/// This is a building block for the trie family, not a general-purpose map:
/// tries descend over `str::encode_utf16()` code units, which covers every
/// character (supplementary-plane characters descend through their surrogate
/// pair).
pub struct CharMap<V> {
    slots: Box<[Option<V>]>,
    len: usize,
}

impl<V> CharMap<V> {
    /// Create an empty map covering the full code unit domain.
    pub fn new() -> Self {
        Self {
            slots: (0..DOMAIN_SIZE).map(|_| None).collect(),
            len: 0,
        }
    }

    /// Look up the value stored under `key`.
    pub fn get(&self, key: u16) -> Option<&V> {
        self.slots[key as usize].as_ref()
    }

    /// Look up the value stored under `key`, mutably.
    pub fn get_mut(&mut self, key: u16) -> Option<&mut V> {
        self.slots[key as usize].as_mut()
    }

    /// Store `value` under `key`, returning the previous value if any.
    pub fn put(&mut self, key: u16, value: V) -> Option<V> {
        let previous = self.slots[key as usize].replace(value);
        if previous.is_none() {
            self.len += 1;
        }
        previous
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True if no key has been stored yet.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<V> Default for CharMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> fmt::Debug for CharMap<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CharMap").field("len", &self.len).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_map() {
        let map: CharMap<u32> = CharMap::new();
        assert!(map.is_empty());
        assert_eq!(map.len(), 0);
        assert_eq!(map.get(b'a' as u16), None);
    }

    #[test]
    fn test_put_and_get() {
        let mut map = CharMap::new();
        assert_eq!(map.put(b'a' as u16, 1), None);
        assert_eq!(map.put(b'b' as u16, 2), None);

        assert_eq!(map.get(b'a' as u16), Some(&1));
        assert_eq!(map.get(b'b' as u16), Some(&2));
        assert_eq!(map.get(b'c' as u16), None);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_put_replaces_previous_value() {
        let mut map = CharMap::new();
        map.put(b'x' as u16, "first");
        assert_eq!(map.put(b'x' as u16, "second"), Some("first"));
        assert_eq!(map.get(b'x' as u16), Some(&"second"));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_get_mut() {
        let mut map = CharMap::new();
        map.put(b'k' as u16, vec![1]);
        map.get_mut(b'k' as u16).unwrap().push(2);
        assert_eq!(map.get(b'k' as u16), Some(&vec![1, 2]));
    }

    #[test]
    fn test_full_domain_exhaustive() {
        // Every 16-bit key must round-trip through the map.
        let mut map = CharMap::new();
        for key in 0..DOMAIN_SIZE {
            map.put(key as u16, key as u32);
        }
        assert_eq!(map.len(), DOMAIN_SIZE);
        for key in 0..DOMAIN_SIZE {
            assert_eq!(map.get(key as u16), Some(&(key as u32)));
        }
    }

    #[test]
    fn test_non_ascii_keys() {
        let mut map = CharMap::new();
        let umlaut = 'ü' as u16;
        map.put(umlaut, 7);
        assert_eq!(map.get(umlaut), Some(&7));
        assert_eq!(map.get('u' as u16), None);
    }
}
