//! Named lookup tables referenced by value functions.
//!
//! Loading tables from files, SQL or REST is a collaborator concern; the
//! engine only needs the `get`-with-optional-default contract below.

use std::collections::HashMap;

/// Key→value lookup collaborator with an optional default-value convention.
pub trait LookupTable {
    /// The value stored under `key`, if any.
    fn get(&self, key: &str) -> Option<&str>;

    /// The table-wide default returned for missing keys, if configured.
    fn default_value(&self) -> Option<&str> {
        None
    }

    /// `get` falling back to the table default.
    fn lookup(&self, key: &str) -> Option<&str> {
        self.get(key).or_else(|| self.default_value())
    }
}

/// An in-memory lookup table over a `HashMap`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMap {
    entries: HashMap<String, String>,
    default: Option<String>,
}

impl InMemoryMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default(default: impl Into<String>) -> Self {
        Self {
            entries: HashMap::new(),
            default: Some(default.into()),
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }
}

impl From<HashMap<String, String>> for InMemoryMap {
    fn from(entries: HashMap<String, String>) -> Self {
        Self {
            entries,
            default: None,
        }
    }
}

impl LookupTable for InMemoryMap {
    fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    fn default_value(&self) -> Option<&str> {
        self.default.as_deref()
    }
}

/// Registry of named lookup tables owned by one engine instance.
#[derive(Default)]
pub struct Maps {
    tables: HashMap<String, Box<dyn LookupTable>>,
}

impl Maps {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, table: Box<dyn LookupTable>) {
        self.tables.insert(name.into(), table);
    }

    pub fn get(&self, name: &str) -> Option<&dyn LookupTable> {
        self.tables.get(name).map(Box::as_ref)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }
}

impl std::fmt::Debug for Maps {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Maps")
            .field("tables", &self.tables.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_map_lookup() {
        let mut map = InMemoryMap::new();
        map.insert("A", "Audio");
        map.insert("B", "Book");

        assert_eq!(map.get("A"), Some("Audio"));
        assert_eq!(map.get("C"), None);
        assert_eq!(map.lookup("B"), Some("Book"));
        assert_eq!(map.lookup("C"), None);
    }

    #[test]
    fn test_default_value_fallback() {
        let mut map = InMemoryMap::with_default("Unknown");
        map.insert("A", "Audio");

        // Absent and empty-string values stay distinct: only a truly missing
        // key falls back to the default.
        map.insert("E", "");
        assert_eq!(map.lookup("A"), Some("Audio"));
        assert_eq!(map.lookup("E"), Some(""));
        assert_eq!(map.lookup("Z"), Some("Unknown"));
    }

    #[test]
    fn test_maps_registry() {
        let mut maps = Maps::new();
        let mut table = InMemoryMap::new();
        table.insert("k", "v");
        maps.insert("codes", Box::new(table));

        assert!(maps.contains("codes"));
        assert!(!maps.contains("missing"));
        assert_eq!(maps.get("codes").unwrap().get("k"), Some("v"));
    }
}
