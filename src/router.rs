//! Routing of literal paths to the graph nodes bound to matching patterns.

use crate::error::Result;
use crate::graph::NodeId;
use crate::tries::class::expand;
use crate::tries::{ClassTrie, ExactTrie, WildcardTrie};

/// How a pattern string is classified at registration time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PatternKind {
    /// No wildcard syntax at all: exact-match descent.
    Exact,
    /// At least one non-empty `[...]` class, no `*`/`?`/`|`.
    Class,
    /// Contains `*`, `?` or `|`.
    Wildcard,
}

/// Compiled dispatch structure mapping literal paths to bound node ids.
///
/// Each registered pattern goes into exactly one of three tries, chosen by
/// syntax; a lookup unions the hits of all three. The router is append-only
/// during the build phase and read-only afterwards.
#[derive(Debug, Default)]
pub struct PathRouter {
    exact: ExactTrie<Vec<NodeId>>,
    class: ClassTrie<NodeId>,
    wildcard: WildcardTrie<NodeId>,
    pattern_count: usize,
}

impl PathRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a `(pattern, node)` binding.
    pub fn register(&mut self, pattern: &str, node: NodeId) -> Result<()> {
        match classify(pattern) {
            PatternKind::Exact => match self.exact.get_mut(pattern) {
                Some(nodes) => nodes.push(node),
                None => self.exact.put(pattern, vec![node]),
            },
            PatternKind::Class => self.class.put(pattern, node)?,
            PatternKind::Wildcard => {
                // The wildcard trie treats brackets as literals, so classes
                // expand to concrete branches before insertion.
                for branch in expand(pattern)? {
                    self.wildcard.put(&branch, node);
                }
            }
        }
        self.pattern_count += 1;
        Ok(())
    }

    /// Every node bound to a pattern matching `path`.
    pub fn route(&self, path: &str) -> Vec<NodeId> {
        let mut hits: Vec<NodeId> = Vec::new();
        if let Some(nodes) = self.exact.get(path) {
            hits.extend_from_slice(nodes);
        }
        hits.extend_from_slice(self.class.get(path));
        hits.extend(self.wildcard.get(path).into_iter().copied());
        hits
    }

    /// Number of registered patterns.
    pub fn pattern_count(&self) -> usize {
        self.pattern_count
    }
}

fn classify(pattern: &str) -> PatternKind {
    if pattern.contains(['*', '?', '|']) {
        return PatternKind::Wildcard;
    }
    if has_class(pattern) {
        return PatternKind::Class;
    }
    PatternKind::Exact
}

/// True when the pattern contains at least one non-empty bracket expression.
/// A lone `[]` is array-index syntax and stays literal.
fn has_class(pattern: &str) -> bool {
    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '[' && chars.peek() != Some(&']') {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(mut hits: Vec<NodeId>) -> Vec<NodeId> {
        hits.sort_unstable();
        hits
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify("a.b.c"), PatternKind::Exact);
        assert_eq!(classify("a[].1.b[]"), PatternKind::Exact);
        assert_eq!(classify("a[bc].d"), PatternKind::Class);
        assert_eq!(classify("a.*"), PatternKind::Wildcard);
        assert_eq!(classify("a.?"), PatternKind::Wildcard);
        assert_eq!(classify("a|b"), PatternKind::Wildcard);
        assert_eq!(classify("a[bc].*"), PatternKind::Wildcard);
    }

    #[test]
    fn test_route_unions_all_tries() {
        let mut router = PathRouter::new();
        router.register("person.name", 0).unwrap();
        router.register("person.n[ao]me", 1).unwrap();
        router.register("person.*", 2).unwrap();

        assert_eq!(sorted(router.route("person.name")), vec![0, 1, 2]);
        assert_eq!(sorted(router.route("person.nome")), vec![1, 2]);
        assert_eq!(sorted(router.route("person.age")), vec![2]);
        assert!(router.route("title").is_empty());
        assert_eq!(router.pattern_count(), 3);
    }

    #[test]
    fn test_same_pattern_registered_twice() {
        let mut router = PathRouter::new();
        router.register("a.b", 3).unwrap();
        router.register("a.b", 4).unwrap();
        assert_eq!(sorted(router.route("a.b")), vec![3, 4]);
    }

    #[test]
    fn test_class_combined_with_wildcard() {
        let mut router = PathRouter::new();
        router.register("a[bc].*", 9).unwrap();

        assert_eq!(router.route("ab.x"), vec![9]);
        assert_eq!(router.route("ac.anything"), vec![9]);
        assert!(router.route("ad.x").is_empty());
        assert!(router.route("ab").is_empty());
    }

    #[test]
    fn test_malformed_class_pattern_is_rejected() {
        let mut router = PathRouter::new();
        assert!(router.register("a[bc", 0).is_err());
        // Unterminated classes are rejected in wildcard patterns too.
        assert!(router.register("a[bc.*", 0).is_err());
    }
}
