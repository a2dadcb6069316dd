//! Integration tests for the path-matching trie family.
//!
//! These tests exercise the tries and the router together through the public
//! API, the way the graph builder uses them.

use metamorph::tries::{ClassTrie, ExactTrie, SetScanner, WildcardTrie};
use metamorph::PathRouter;

#[test]
fn test_exact_trie_shared_prefixes() {
    let mut trie = ExactTrie::new();
    trie.put("person.name", 1u32);
    trie.put("person.name.first", 2);
    trie.put("person.age", 3);

    assert_eq!(trie.get("person.name"), Some(&1));
    assert_eq!(trie.get("person.name.first"), Some(&2));
    assert_eq!(trie.get("person.age"), Some(&3));
    // A prefix of a stored key is not itself a hit.
    assert_eq!(trie.get("person"), None);
    assert_eq!(trie.get("person.names"), None);
}

#[test]
fn test_class_trie_expansion() {
    let mut trie = ClassTrie::new();
    trie.put("record.f[ao]rm", 7u32).unwrap();

    assert_eq!(trie.get("record.farm"), &[7]);
    assert_eq!(trie.get("record.form"), &[7]);
    assert!(trie.get("record.firm").is_empty());
}

#[test]
fn test_class_trie_empty_brackets_are_literal() {
    // `[]` is array-index syntax, not a class.
    let mut trie = ClassTrie::new();
    trie.put("a[].1.b[].1", 1u32).unwrap();
    assert_eq!(trie.get("a[].1.b[].1"), &[1]);
    assert!(trie.get("a.1.b.1").is_empty());
}

#[test]
fn test_wildcard_trie_reports_every_match() {
    let mut trie = WildcardTrie::new();
    trie.put("*b", 1u32);
    trie.put("a*", 2);
    trie.put("a*b", 3);
    trie.put("aa*bb", 4);

    let mut hits: Vec<u32> = trie.get("aacbb").into_iter().copied().collect();
    hits.sort_unstable();
    assert_eq!(hits, vec![1, 2, 3, 4]);

    let mut hits: Vec<u32> = trie.get("ab").into_iter().copied().collect();
    hits.sort_unstable();
    assert_eq!(hits, vec![1, 2, 3]);

    assert!(trie.get("ba").is_empty());
}

#[test]
fn test_wildcard_trie_single_char_and_alternation() {
    let mut trie = WildcardTrie::new();
    trie.put("a.?", 1u32);
    trie.put("date|time", 2);

    assert_eq!(trie.get("a.b").len(), 1);
    assert!(trie.get("a.bc").is_empty());
    assert_eq!(trie.get("date").into_iter().copied().collect::<Vec<_>>(), vec![2]);
    assert_eq!(trie.get("time").into_iter().copied().collect::<Vec<_>>(), vec![2]);
}

#[test]
fn test_scanner_overlapping_matches_ordered_by_offset() {
    let mut scanner = SetScanner::new();
    for name in ["Perth", "York", "York Town", "New York City", "New York"] {
        scanner.insert(name, name).unwrap();
    }

    let text = "Pexrt Perth Peerth New York City York York Town München";
    let found: Vec<&str> = scanner.scan(text).unwrap().map(|m| *m.value).collect();
    assert_eq!(
        found,
        vec![
            "Perth",
            "New York City",
            "New York",
            "York",
            "York",
            "York Town",
            "York",
        ]
    );
}

#[test]
fn test_scanner_freezes_after_first_scan() {
    let mut scanner = SetScanner::new();
    scanner.insert("a", 1u32).unwrap();
    assert_eq!(scanner.scan("abc").unwrap().count(), 1);
    assert!(scanner.insert("b", 2).is_err());
}

#[test]
fn test_router_dispatches_across_trie_kinds() {
    let mut router = PathRouter::new();
    router.register("person.name", 0).unwrap();
    router.register("person.n[ao]me", 1).unwrap();
    router.register("person.*", 2).unwrap();
    router.register("title|subtitle", 3).unwrap();

    let mut hits = router.route("person.name");
    hits.sort_unstable();
    assert_eq!(hits, vec![0, 1, 2]);

    assert_eq!(router.route("subtitle"), vec![3]);
    assert!(router.route("unrelated").is_empty());
}

#[test]
fn test_supplementary_plane_keys() {
    // Keys outside the basic plane descend over surrogate pairs and stay
    // distinct from each other.
    let mut trie = ExactTrie::new();
    trie.put("note.𝄞", 1u32);
    trie.put("note.𝄢", 2);

    assert_eq!(trie.get("note.𝄞"), Some(&1));
    assert_eq!(trie.get("note.𝄢"), Some(&2));
}
