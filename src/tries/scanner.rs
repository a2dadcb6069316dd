//! Multi-pattern substring scanner over a set of literal strings.

use aho_corasick::{AhoCorasick, AhoCorasickBuilder, MatchKind};
use once_cell::sync::OnceCell;

use crate::error::{MorphError, Result};

/// One occurrence of a registered pattern inside a scanned text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanMatch<'a, V> {
    /// The value registered for the matched pattern.
    pub value: &'a V,
    /// Byte offset of the occurrence start in the scanned text.
    pub start: usize,
}

/// Scans a text for every occurrence of every registered literal pattern in
/// one left-to-right pass.
///
/// Patterns may be substrings or superstrings of one another; overlapping
/// occurrences are all reported. The combined pass runs on an Aho-Corasick
/// automaton built lazily at the first scan, after which the pattern set is
/// frozen. Results are ordered by start offset, ties broken by longer pattern
/// first.
#[derive(Debug)]
pub struct SetScanner<V> {
    patterns: Vec<String>,
    values: Vec<V>,
    automaton: OnceCell<AhoCorasick>,
}

impl<V> SetScanner<V> {
    pub fn new() -> Self {
        Self {
            patterns: Vec::new(),
            values: Vec::new(),
            automaton: OnceCell::new(),
        }
    }

    /// Register `value` under the literal `pattern`.
    ///
    /// Fails once the automaton has been built by a first scan.
    pub fn insert(&mut self, pattern: &str, value: V) -> Result<()> {
        if self.automaton.get().is_some() {
            return Err(MorphError::Build(
                "scanner pattern set is frozen after the first scan".to_string(),
            ));
        }
        self.patterns.push(pattern.to_string());
        self.values.push(value);
        Ok(())
    }

    /// Number of registered patterns.
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Scan `text` once, yielding every occurrence of every pattern.
    ///
    /// The returned sequence is finite and non-restartable; scanning the same
    /// text again requires another call.
    pub fn scan<'a>(&'a self, text: &str) -> Result<Matches<'a, V>> {
        let automaton = self.automaton.get_or_try_init(|| {
            AhoCorasickBuilder::new()
                .match_kind(MatchKind::Standard)
                .build(&self.patterns)
                .map_err(|e| MorphError::Build(format!("scanner automaton: {e}")))
        })?;

        let mut hits: Vec<(usize, usize)> = automaton
            .find_overlapping_iter(text)
            .map(|m| (m.start(), m.pattern().as_usize()))
            .collect();
        hits.sort_by(|a, b| {
            a.0.cmp(&b.0)
                .then_with(|| self.patterns[b.1].len().cmp(&self.patterns[a.1].len()))
        });

        Ok(Matches {
            hits: hits.into_iter(),
            values: &self.values,
        })
    }
}

impl<V> Default for SetScanner<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over the matches of one scan. See [`SetScanner::scan`].
#[derive(Debug)]
pub struct Matches<'a, V> {
    hits: std::vec::IntoIter<(usize, usize)>,
    values: &'a [V],
}

impl<'a, V> Iterator for Matches<'a, V> {
    type Item = ScanMatch<'a, V>;

    fn next(&mut self) -> Option<Self::Item> {
        self.hits.next().map(|(start, pattern)| ScanMatch {
            value: &self.values[pattern],
            start,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn city_scanner() -> SetScanner<&'static str> {
        let mut scanner = SetScanner::new();
        for name in ["Perth", "York", "York Town", "New York City", "New York"] {
            scanner.insert(name, name).unwrap();
        }
        scanner
    }

    #[test]
    fn test_empty_scanner_yields_nothing() {
        let scanner: SetScanner<u32> = SetScanner::new();
        assert!(scanner.is_empty());
        assert_eq!(scanner.scan("anything").unwrap().count(), 0);
    }

    #[test]
    fn test_single_pattern_multiple_occurrences() {
        let mut scanner = SetScanner::new();
        scanner.insert("ab", 1).unwrap();
        let starts: Vec<usize> = scanner.scan("abxabab").unwrap().map(|m| m.start).collect();
        assert_eq!(starts, vec![0, 3, 5]);
    }

    #[test]
    fn test_overlapping_patterns_all_reported() {
        let scanner = city_scanner();
        let matched: Vec<(&str, usize)> = scanner
            .scan("New York City")
            .unwrap()
            .map(|m| (*m.value, m.start))
            .collect();
        assert_eq!(
            matched,
            vec![("New York City", 0), ("New York", 0), ("York", 4)]
        );
    }

    #[test]
    fn test_scan_order_over_mixed_text() {
        let scanner = city_scanner();
        let text = "Pexrt Perth Peerth New York City York York Town München";
        let matched: Vec<&str> = scanner.scan(text).unwrap().map(|m| *m.value).collect();
        assert_eq!(
            matched,
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
    fn test_matches_are_not_restartable() {
        let mut scanner = SetScanner::new();
        scanner.insert("a", 1).unwrap();
        let mut matches = scanner.scan("aa").unwrap();
        assert!(matches.next().is_some());
        assert!(matches.next().is_some());
        assert!(matches.next().is_none());
        // A fresh scan re-runs the automaton.
        assert_eq!(scanner.scan("aa").unwrap().count(), 2);
    }

    #[test]
    fn test_insert_after_scan_is_rejected() {
        let mut scanner = SetScanner::new();
        scanner.insert("a", 1).unwrap();
        let _ = scanner.scan("a").unwrap().count();
        assert!(matches!(
            scanner.insert("b", 2),
            Err(MorphError::Build(_))
        ));
    }
}
