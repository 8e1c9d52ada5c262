//! Byte-indexed trie over operator symbols for greedy longest-match lookup.
//!
//! Each node owns 256 child slots (one per possible input byte) plus an
//! optional terminal index into the descriptor table. Construction happens
//! once, at registry startup; lookups never mutate the tree.

use crate::descriptor::OperatorDescriptor;

struct Node {
    children: Box<[Option<usize>; 256]>,
    descriptor_index: Option<usize>,
}

impl Node {
    fn new() -> Self {
        Node { children: Box::new([None; 256]), descriptor_index: None }
    }
}

pub struct Trie {
    nodes: Vec<Node>,
}

impl Trie {
    pub fn build(descriptors: &[OperatorDescriptor]) -> Self {
        let mut trie = Trie { nodes: vec![Node::new()] };
        for (index, descriptor) in descriptors.iter().enumerate() {
            trie.insert(descriptor.symbol.as_bytes(), index);
        }
        trie
    }

    fn insert(&mut self, symbol: &[u8], descriptor_index: usize) {
        let mut current = 0usize;
        for &byte in symbol {
            current = match self.nodes[current].children[byte as usize] {
                Some(next) => next,
                None => {
                    let next = self.nodes.len();
                    self.nodes.push(Node::new());
                    self.nodes[current].children[byte as usize] = Some(next);
                    next
                }
            };
        }
        self.nodes[current].descriptor_index = Some(descriptor_index);
    }

    /// Greedy longest-match: scans at most `max_len` bytes of `input` and
    /// returns the descriptor-table index of the longest registered symbol
    /// that is a prefix of `input`, along with how many bytes it consumed.
    pub fn longest_match(&self, input: &[u8], max_len: usize) -> Option<(usize, usize)> {
        let mut current = 0usize;
        let mut best: Option<(usize, usize)> = None;
        let limit = max_len.min(input.len());
        for (offset, &byte) in input.iter().take(limit).enumerate() {
            current = match self.nodes[current].children[byte as usize] {
                Some(next) => next,
                None => break,
            };
            if let Some(descriptor_index) = self.nodes[current].descriptor_index {
                best = Some((descriptor_index, offset + 1));
            }
        }
        best
    }

    /// Whether `symbol` is reachable as an exact terminal path from the root.
    pub fn contains(&self, symbol: &str) -> bool {
        let mut current = 0usize;
        for &byte in symbol.as_bytes() {
            current = match self.nodes[current].children[byte as usize] {
                Some(next) => next,
                None => return false,
            };
        }
        self.nodes[current].descriptor_index.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{Arity, Associativity, Directionality, OperatorFamily, OperatorKind};

    fn descriptor(symbol: &'static str) -> OperatorDescriptor {
        OperatorDescriptor {
            symbol,
            kind: OperatorKind::Add,
            precedence: 7,
            associativity: Associativity::Left,
            arity: Arity::Binary,
            family: OperatorFamily::ArithmeticDense,
            directionality: Directionality::Bi,
            description: "test",
        }
    }

    #[test]
    fn greedy_match_prefers_longest_registered_prefix() {
        let descriptors = vec![descriptor("<"), descriptor("<<"), descriptor("<<=")];
        let trie = Trie::build(&descriptors);
        let (index, len) = trie.longest_match(b"<<=x", 20).unwrap();
        assert_eq!(len, 3);
        assert_eq!(descriptors[index].symbol, "<<=");
    }

    #[test]
    fn stops_at_max_len_cap() {
        let descriptors = vec![descriptor("<<<")];
        let trie = Trie::build(&descriptors);
        assert!(trie.longest_match(b"<<<", 2).is_none());
        assert!(trie.longest_match(b"<<<", 3).is_some());
    }

    #[test]
    fn every_inserted_symbol_roundtrips() {
        let descriptors = vec![descriptor("+="), descriptor("+"), descriptor("++")];
        let trie = Trie::build(&descriptors);
        for d in &descriptors {
            assert!(trie.contains(d.symbol));
        }
        assert!(!trie.contains("-"));
    }
}
