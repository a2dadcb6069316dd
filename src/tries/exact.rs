//! Exact-match trie over complete path strings.

use super::char_map::CharMap;

type NodeRef = u32;

#[derive(Debug)]
struct Node<V> {
    links: CharMap<NodeRef>,
    value: Option<V>,
}

impl<V> Node<V> {
    fn new() -> Self {
        Self {
            links: CharMap::new(),
            value: None,
        }
    }
}

/// A trie mapping complete strings to one value each.
///
/// Nodes live in an arena indexed by `u32` ids; node 0 is the root and
/// represents the empty prefix. Registration walks or creates one child per
/// code unit of the key; lookup walks the same path and never mutates the
/// structure. The trie is append-only: nodes are never removed.
#[derive(Debug)]
pub struct ExactTrie<V> {
    nodes: Vec<Node<V>>,
}

impl<V> ExactTrie<V> {
    /// Create an empty trie containing only the root node.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new()],
        }
    }

    /// Register `value` under the complete string `key`.
    ///
    /// Registering the same key twice replaces the earlier value.
    pub fn put(&mut self, key: &str, value: V) {
        let mut current: NodeRef = 0;
        for unit in key.encode_utf16() {
            current = self.child(current, unit);
        }
        self.nodes[current as usize].value = Some(value);
    }

    /// Look up the value registered under exactly `key`.
    pub fn get(&self, key: &str) -> Option<&V> {
        let mut current: NodeRef = 0;
        for unit in key.encode_utf16() {
            current = *self.nodes[current as usize].links.get(unit)?;
        }
        self.nodes[current as usize].value.as_ref()
    }

    /// Mutable variant of [`get`](Self::get).
    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        let mut current: NodeRef = 0;
        for unit in key.encode_utf16() {
            current = *self.nodes[current as usize].links.get(unit)?;
        }
        self.nodes[current as usize].value.as_mut()
    }

    /// Number of nodes in the arena, including the root.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn child(&mut self, parent: NodeRef, unit: u16) -> NodeRef {
        if let Some(&existing) = self.nodes[parent as usize].links.get(unit) {
            return existing;
        }
        let id = self.nodes.len() as NodeRef;
        self.nodes.push(Node::new());
        self.nodes[parent as usize].links.put(unit, id);
        id
    }
}

impl<V> Default for ExactTrie<V> {
    fn default() -> Self {
        Self::new()
    }
}
