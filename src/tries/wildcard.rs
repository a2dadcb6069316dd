//! Wildcard/alternation trie returning every registered value that matches.

use super::char_map::CharMap;

const STAR: u16 = b'*' as u16;
const ANY: u16 = b'?' as u16;

type NodeRef = u32;

#[derive(Debug)]
struct Node<V> {
    /// Literal outgoing edges.
    links: CharMap<NodeRef>,
    /// Edge consuming exactly one arbitrary code unit (`?`).
    any: Option<NodeRef>,
    /// Child star node (`*`), reachable over zero or more code units.
    star: Option<NodeRef>,
    /// A star node consumes any code unit and stays active.
    is_star: bool,
    /// Values whose pattern terminates at this node.
    values: Vec<V>,
}

impl<V> Node<V> {
    fn new(is_star: bool) -> Self {
        Self {
            links: CharMap::new(),
            any: None,
            star: None,
            is_star,
            values: Vec::new(),
        }
    }
}

/// A trie over patterns containing `?`, `*` and `|`-separated alternation.
///
/// Registration splits a pattern on `|` into independent sub-patterns, each
/// mapped to the same caller-supplied value. `?` consumes exactly one code
/// unit at a fixed position; `*` consumes zero or more, and several
/// non-adjacent stars per sub-pattern are allowed.
///
/// [`get`](Self::get) returns **every** registered value whose pattern matches
/// the input, because independently registered patterns (exact, single-star,
/// multi-star, leading-star) can all match the same string at once. Ranking
/// ambiguous matches is the caller's job; result order is not a contract.
#[derive(Debug)]
pub struct WildcardTrie<V> {
    nodes: Vec<Node<V>>,
}

impl<V: Clone> WildcardTrie<V> {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(false)],
        }
    }

    /// Register `value` under `pattern`.
    pub fn put(&mut self, pattern: &str, value: V) {
        for branch in pattern.split('|') {
            self.insert(branch, value.clone());
        }
    }

    /// Every value whose pattern matches `input`.
    pub fn get(&self, input: &str) -> Vec<&V> {
        let mut active: Vec<NodeRef> = Vec::new();
        self.activate(0, &mut active);

        for unit in input.encode_utf16() {
            let mut next: Vec<NodeRef> = Vec::new();
            for &id in &active {
                let node = &self.nodes[id as usize];
                if node.is_star {
                    // Self-loop: a star keeps consuming arbitrary code units.
                    self.activate(id, &mut next);
                }
                if let Some(&child) = node.links.get(unit) {
                    self.activate(child, &mut next);
                }
                if let Some(child) = node.any {
                    self.activate(child, &mut next);
                }
            }
            if next.is_empty() {
                return Vec::new();
            }
            active = next;
        }

        let mut matched = Vec::new();
        for &id in &active {
            matched.extend(self.nodes[id as usize].values.iter());
        }
        matched
    }

    /// Number of nodes in the arena, including the root.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn insert(&mut self, pattern: &str, value: V) {
        let mut current: NodeRef = 0;
        for unit in pattern.encode_utf16() {
            current = match unit {
                STAR => self.star_child(current),
                ANY => self.any_child(current),
                _ => self.literal_child(current, unit),
            };
        }
        self.nodes[current as usize].values.push(value);
    }

    /// Add `id` to the active set along with star children reachable over
    /// zero code units.
    fn activate(&self, id: NodeRef, set: &mut Vec<NodeRef>) {
        if set.contains(&id) {
            return;
        }
        set.push(id);
        if let Some(star) = self.nodes[id as usize].star {
            self.activate(star, set);
        }
    }

    fn literal_child(&mut self, parent: NodeRef, unit: u16) -> NodeRef {
        if let Some(&existing) = self.nodes[parent as usize].links.get(unit) {
            return existing;
        }
        let id = self.push_node(false);
        self.nodes[parent as usize].links.put(unit, id);
        id
    }

    fn any_child(&mut self, parent: NodeRef) -> NodeRef {
        if let Some(existing) = self.nodes[parent as usize].any {
            return existing;
        }
        let id = self.push_node(false);
        self.nodes[parent as usize].any = Some(id);
        id
    }

    fn star_child(&mut self, parent: NodeRef) -> NodeRef {
        if let Some(existing) = self.nodes[parent as usize].star {
            return existing;
        }
        let id = self.push_node(true);
        self.nodes[parent as usize].star = Some(id);
        id
    }

    fn push_node(&mut self, is_star: bool) -> NodeRef {
        let id = self.nodes.len() as NodeRef;
        self.nodes.push(Node::new(is_star));
        id
    }
}

impl<V: Clone> Default for WildcardTrie<V> {
    fn default() -> Self {
        Self::new()
    }
}
