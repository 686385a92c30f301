//! Tree printing and integrity checks.

use std::fmt;

use super::{Node, PrefixTrie};

impl<V> PrefixTrie<V> {
    /// Pre-order printout of every node, one per line, indented by depth.
    ///
    /// ```text
    /// - edge=""
    ///   - edge="00001010" (prefix -> B)
    /// ```
    pub fn dump(&self) -> TrieDump<'_, V> {
        TrieDump { trie: self }
    }

    /// Verify tree integrity - returns list of issues found.
    pub fn verify_integrity(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if !self.root.edge.is_empty() {
            issues.push(format!("root has non-empty edge {}", self.root.edge));
        }

        let mut valued = 0;
        let mut stack = vec![(&self.root, 0usize)];
        while let Some((node, depth)) = stack.pop() {
            if node.value.is_some() {
                valued += 1;
            }
            for (slot, child) in node.children.iter().enumerate() {
                let Some(child) = child else { continue };
                match child.edge.first() {
                    None => issues.push(format!("empty edge below depth {depth}")),
                    Some(bit) if bit as usize != slot => issues.push(format!(
                        "edge {} at depth {} sits in slot {}",
                        child.edge,
                        depth + 1,
                        slot
                    )),
                    Some(_) => {}
                }
                if child.value.is_none() && child.children.iter().all(Option::is_none) {
                    issues.push(format!("leaf {} at depth {} has no value", child.edge, depth + 1));
                }
                stack.push((&**child, depth + 1));
            }
        }

        if valued != self.len {
            issues.push(format!("{} valued nodes but len is {}", valued, self.len));
        }
        issues
    }
}

/// [`Display`](fmt::Display) adapter returned by [`PrefixTrie::dump`].
pub struct TrieDump<'a, V> {
    trie: &'a PrefixTrie<V>,
}

impl<V: fmt::Display> fmt::Display for TrieDump<'_, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "PATRICIA:")?;
        let mut stack: Vec<(&Node<V>, usize)> = vec![(&self.trie.root, 0)];
        while let Some((node, depth)) = stack.pop() {
            write!(f, "{:indent$}- edge=\"{}\"", "", node.edge, indent = depth * 2)?;
            if let Some(value) = &node.value {
                write!(f, " (prefix -> {value})")?;
            }
            writeln!(f)?;
            for child in node.children.iter().rev().flatten() {
                stack.push((&**child, depth + 1));
            }
        }
        Ok(())
    }
}
