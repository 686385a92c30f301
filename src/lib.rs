//! # patricia-route
//!
//! Longest-prefix-match lookup on a compressed binary trie (PATRICIA / radix
//! tree), the structure behind IP forwarding tables.
//!
//! Every edge carries a run of bits; a node holds a value when a stored
//! prefix ends exactly there. Lookups walk from the root towards longer
//! prefixes, validating every edge bit on the way, and return the value of
//! the deepest node that matched.
//!
//! ## Example
//!
//! ```rust
//! use patricia_route::{BitString, PrefixTrie};
//!
//! let mut trie: PrefixTrie<&str> = PrefixTrie::new();
//! trie.insert(&"1010".parse().unwrap(), "short").unwrap();
//! trie.insert(&"101011".parse().unwrap(), "long").unwrap();
//!
//! let key: BitString = "10101100".parse().unwrap();
//! assert_eq!(trie.longest_match(&key), Some(&"long"));
//! let key: BitString = "10100000".parse().unwrap();
//! assert_eq!(trie.longest_match(&key), Some(&"short"));
//! let key: BitString = "0".parse().unwrap();
//! assert_eq!(trie.longest_match(&key), None);
//! ```

#![deny(unsafe_code)]

pub mod bits;
mod debug;
pub mod error;
pub mod forwarding;
pub mod ipv4;
pub mod sync;

pub use bits::BitString;
pub use debug::TrieDump;
pub use error::{ForwardError, InsertError, NetworkError, ParseBitsError, PrefixParseError};
pub use forwarding::{Delivery, ForwardingConfig, Network, NextHop, Router};
pub use ipv4::{Ipv4Prefix, RouteTable};
pub use sync::SharedPrefixTrie;

// =============================================================================
// Node
// =============================================================================

#[derive(Clone)]
struct Node<V> {
    /// Bits consumed on the link from the parent. Empty only at the root.
    edge: BitString,
    /// Set iff a stored prefix ends exactly at this node.
    value: Option<V>,
    /// Indexed by the first bit of the child's edge.
    children: [Option<Box<Node<V>>>; 2],
}

impl<V> Node<V> {
    fn root() -> Self {
        Self {
            edge: BitString::new(),
            value: None,
            children: [None, None],
        }
    }

    fn leaf(edge: BitString, value: V) -> Self {
        debug_assert!(!edge.is_empty());
        Self {
            edge,
            value: Some(value),
            children: [None, None],
        }
    }

    /// Turns this node into a pure branch point after the first `at` bits of
    /// its edge. The remainder of the edge, the value and both children move
    /// into a new child.
    fn split_at(&mut self, at: usize) {
        debug_assert!(at < self.edge.len());
        let rest = self.edge.slice(at..self.edge.len());
        let slot = rest.bit(0) as usize;
        let child = Node {
            edge: rest,
            value: self.value.take(),
            children: std::mem::take(&mut self.children),
        };
        self.edge.truncate(at);
        self.children[slot] = Some(Box::new(child));
    }

    fn child(&self, bit: bool) -> Option<&Node<V>> {
        self.children[bit as usize].as_deref()
    }
}

// =============================================================================
// PrefixTrie
// =============================================================================

/// A compressed binary trie mapping bit prefixes to values.
///
/// Keys and prefixes are plain [`BitString`]s of any length; the trie knows
/// nothing about address families.
#[derive(Clone)]
pub struct PrefixTrie<V> {
    root: Node<V>,
    /// Number of stored prefixes.
    len: usize,
}

impl<V> PrefixTrie<V> {
    /// An empty trie: the root has an empty edge and no value.
    pub fn new() -> Self {
        Self {
            root: Node::root(),
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of nodes, including the root and value-free branch points.
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![&self.root];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children.iter().flatten().map(|c| &**c));
        }
        count
    }

    /// Removes every prefix, including a default entry at the root.
    pub fn clear(&mut self) {
        teardown(&mut self.root);
        self.root = Node::root();
        self.len = 0;
    }

    /// Stores `value` for `prefix`.
    ///
    /// An empty prefix targets the root and acts as the default entry. If the
    /// exact prefix (same bits, same length) already has a value, nothing
    /// changes and the new value is returned inside the error.
    pub fn insert(&mut self, prefix: &BitString, value: V) -> Result<(), InsertError<V>> {
        let key_len = prefix.len();
        let mut node = &mut self.root;
        let mut pos = 0;

        loop {
            let edge_len = node.edge.len();
            if edge_len > 0 {
                let cp = node.edge.common_prefix_len(0, prefix, pos);
                if cp < edge_len {
                    tracing::trace!(at = pos + cp, edge = %node.edge, "splitting edge");
                    node.split_at(cp);
                    pos += cp;
                    if pos == key_len {
                        // The old value just moved into the remainder child.
                        debug_assert!(node.value.is_none(), "branch point kept its value");
                        if node.value.is_some() {
                            return Err(InsertError::DuplicatePrefix {
                                prefix: prefix.clone(),
                                value,
                            });
                        }
                        node.value = Some(value);
                    } else {
                        let leaf = Node::leaf(prefix.slice(pos..key_len), value);
                        node.children[prefix.bit(pos) as usize] = Some(Box::new(leaf));
                    }
                    self.len += 1;
                    return Ok(());
                }
                pos += cp;
            }

            if pos == key_len {
                if node.value.is_some() {
                    return Err(InsertError::DuplicatePrefix {
                        prefix: prefix.clone(),
                        value,
                    });
                }
                node.value = Some(value);
                self.len += 1;
                return Ok(());
            }

            let slot = &mut node.children[prefix.bit(pos) as usize];
            match slot {
                Some(child) => node = &mut **child,
                None => {
                    *slot = Some(Box::new(Node::leaf(prefix.slice(pos..key_len), value)));
                    self.len += 1;
                    return Ok(());
                }
            }
        }
    }

    /// The value of the longest stored prefix of `key`, or `None` when no
    /// prefix matches and there is no default entry.
    pub fn longest_match(&self, key: &BitString) -> Option<&V> {
        self.longest_match_with_len(key).map(|(_, v)| v)
    }

    /// Like [`longest_match`](Self::longest_match), also reporting the
    /// length of the matched prefix.
    pub fn longest_match_with_len(&self, key: &BitString) -> Option<(usize, &V)> {
        let mut node = &self.root;
        let mut pos = 0;
        let mut best = None;

        loop {
            let edge_len = node.edge.len();
            if edge_len > 0 {
                if !key.starts_with_at(pos, &node.edge) {
                    break;
                }
                pos += edge_len;
            }
            if let Some(value) = &node.value {
                best = Some((pos, value));
            }
            if pos == key.len() {
                break;
            }
            match node.child(key.bit(pos)) {
                Some(child) => node = child,
                None => break,
            }
        }

        best
    }

    /// The value stored for exactly `prefix`, ignoring shorter matches.
    pub fn get_exact(&self, prefix: &BitString) -> Option<&V> {
        let node = self.find_node(prefix)?;
        node.value.as_ref()
    }

    pub fn contains_prefix(&self, prefix: &BitString) -> bool {
        self.get_exact(prefix).is_some()
    }

    /// Node whose full prefix is exactly `prefix`.
    fn find_node(&self, prefix: &BitString) -> Option<&Node<V>> {
        let mut node = &self.root;
        let mut pos = 0;
        loop {
            if !prefix.starts_with_at(pos, &node.edge) {
                return None;
            }
            pos += node.edge.len();
            if pos == prefix.len() {
                return Some(node);
            }
            node = node.child(prefix.bit(pos))?;
        }
    }

    /// Stored prefixes and their values in pre-order: a prefix comes before
    /// its extensions, and `0` branches before `1` branches.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            stack: vec![(&self.root, BitString::new())],
        }
    }
}

/// Releases a subtree without recursion, so deep tries cannot overflow the
/// stack on drop.
fn teardown<V>(root: &mut Node<V>) {
    let mut stack: Vec<Box<Node<V>>> = root.children.iter_mut().filter_map(Option::take).collect();
    while let Some(mut node) = stack.pop() {
        stack.extend(node.children.iter_mut().filter_map(Option::take));
    }
}

impl<V> Drop for PrefixTrie<V> {
    fn drop(&mut self) {
        teardown(&mut self.root);
    }
}

impl<V> Default for PrefixTrie<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: std::fmt::Debug> std::fmt::Debug for PrefixTrie<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<V> Extend<(BitString, V)> for PrefixTrie<V> {
    /// Inserts every pair; pairs whose prefix is already present are skipped.
    fn extend<I: IntoIterator<Item = (BitString, V)>>(&mut self, iter: I) {
        for (prefix, value) in iter {
            if let Err(InsertError::DuplicatePrefix { prefix, .. }) = self.insert(&prefix, value) {
                tracing::debug!(%prefix, "duplicate prefix skipped");
            }
        }
    }
}

impl<V> FromIterator<(BitString, V)> for PrefixTrie<V> {
    fn from_iter<I: IntoIterator<Item = (BitString, V)>>(iter: I) -> Self {
        let mut trie = Self::new();
        trie.extend(iter);
        trie
    }
}

impl<'a, V> IntoIterator for &'a PrefixTrie<V> {
    type Item = (BitString, &'a V);
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub struct Iter<'a, V> {
    /// Pending nodes with their full prefix.
    stack: Vec<(&'a Node<V>, BitString)>,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (BitString, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((node, path)) = self.stack.pop() {
            for child in node.children.iter().rev().flatten() {
                self.stack.push((&**child, path.concat(&child.edge)));
            }
            if let Some(value) = &node.value {
                return Some((path, value));
            }
        }
        None
    }
}


#[cfg(test)]
mod proptests;
