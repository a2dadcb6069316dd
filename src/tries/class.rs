//! Exact-match trie with bracketed character classes expanded at registration.

use super::exact::ExactTrie;
use crate::error::{MorphError, Result};

/// A trie whose keys may contain `[abc]` character classes.
///
/// A well-formed, non-empty bracket expression is expanded into one concrete
/// key per enclosed character at registration time, each anchored to the same
/// value, so lookup remains a pure exact-match descent. Several registered
/// patterns may expand onto the same concrete key, which is why lookup yields
/// a slice of values rather than a single one.
///
/// An empty bracket pair `[]` is treated as two literal characters. This keeps
/// array-index-style keys such as `a[].1.b[]` addressable without being
/// mistaken for character classes.
#[derive(Debug)]
pub struct ClassTrie<V> {
    inner: ExactTrie<Vec<V>>,
}

impl<V: Clone> ClassTrie<V> {
    pub fn new() -> Self {
        Self {
            inner: ExactTrie::new(),
        }
    }

    /// Register `value` under `key`, expanding character classes.
    ///
    /// Fails with [`MorphError::Pattern`] when a bracket expression is never
    /// closed.
    pub fn put(&mut self, key: &str, value: V) -> Result<()> {
        for concrete in expand(key)? {
            match self.inner.get_mut(&concrete) {
                Some(values) => values.push(value.clone()),
                None => self.inner.put(&concrete, vec![value.clone()]),
            }
        }
        Ok(())
    }

    /// All values whose expanded pattern equals `key` exactly.
    pub fn get(&self, key: &str) -> &[V] {
        self.inner.get(key).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl<V: Clone> Default for ClassTrie<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Expand every non-empty `[...]` class into the cartesian product of
/// concrete keys. Also used by the router on wildcard patterns carrying
/// classes.
pub(crate) fn expand(key: &str) -> Result<Vec<String>> {
    let mut expansions = vec![String::new()];
    let mut chars = key.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '[' {
            for expansion in &mut expansions {
                expansion.push(c);
            }
            continue;
        }
        if chars.peek() == Some(&']') {
            // Empty brackets are literal characters, not a class.
            chars.next();
            for expansion in &mut expansions {
                expansion.push_str("[]");
            }
            continue;
        }
        let mut class = Vec::new();
        loop {
            match chars.next() {
                Some(']') => break,
                Some(member) => class.push(member),
                None => {
                    return Err(MorphError::Pattern(
                        key.to_string(),
                        "unterminated character class".to_string(),
                    ))
                }
            }
        }
        expansions = expansions
            .iter()
            .flat_map(|prefix| {
                class.iter().map(move |member| {
                    let mut branch = prefix.clone();
                    branch.push(*member);
                    branch
                })
            })
            .collect();
    }

    Ok(expansions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_key_behaves_like_exact_trie() {
        let mut trie = ClassTrie::new();
        trie.put("a.b.c", 1).unwrap();
        assert_eq!(trie.get("a.b.c"), &[1]);
        assert_eq!(trie.get("a.b"), &[] as &[i32]);
    }

    #[test]
    fn test_class_expands_to_parallel_branches() {
        let mut trie = ClassTrie::new();
        trie.put("a[ab]cbb", 7).unwrap();

        assert_eq!(trie.get("aacbb"), &[7]);
        assert_eq!(trie.get("abcbb"), &[7]);
        assert_eq!(trie.get("accbb"), &[] as &[i32]);
        assert_eq!(trie.get("a[ab]cbb"), &[] as &[i32]);
    }

    #[test]
    fn test_multiple_classes_form_cartesian_product() {
        let mut trie = ClassTrie::new();
        trie.put("[ab].[xy]", 1).unwrap();

        for key in ["a.x", "a.y", "b.x", "b.y"] {
            assert_eq!(trie.get(key), &[1], "key {key}");
        }
        assert_eq!(trie.get("c.x"), &[] as &[i32]);
    }

    #[test]
    fn test_empty_brackets_are_literal() {
        let mut trie = ClassTrie::new();
        trie.put("a[].1.b[].1", 3).unwrap();

        assert_eq!(trie.get("a[].1.b[].1"), &[3]);
        assert_eq!(trie.get("a.1.b.1"), &[] as &[i32]);
    }

    #[test]
    fn test_overlapping_patterns_accumulate_values() {
        let mut trie = ClassTrie::new();
        trie.put("a[ab]c", 1).unwrap();
        trie.put("aac", 2).unwrap();

        let mut values = trie.get("aac").to_vec();
        values.sort_unstable();
        assert_eq!(values, vec![1, 2]);
        assert_eq!(trie.get("abc"), &[1]);
    }

    #[test]
    fn test_unterminated_class_is_rejected() {
        let mut trie: ClassTrie<u32> = ClassTrie::new();
        let err = trie.put("a[bc", 1).unwrap_err();
        assert!(matches!(err, MorphError::Pattern(_, _)));
    }

    #[test]
    fn test_expand_plain_key() {
        assert_eq!(expand("abc").unwrap(), vec!["abc".to_string()]);
    }

    #[test]
    fn test_expand_product_size() {
        let expanded = expand("[abc]x[de]").unwrap();
        assert_eq!(expanded.len(), 6);
        assert!(expanded.contains(&"axd".to_string()));
        assert!(expanded.contains(&"cxe".to_string()));
    }
}
