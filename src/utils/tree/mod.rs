//! Complete binary tree for subset-cover key distribution.
//!
//! Nodes are numbered heap style: root is 1, the children of `n` are `2n`
//! and `2n + 1`; the leaves occupy `capacity .. 2 * capacity`. A user sits at
//! one leaf and knows the key material of every node on the leaf-to-root
//! path; update keys are published for a cover of the non-revoked leaves
//! (complete subtree method), so exactly the non-revoked users find one node
//! in both sets.
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[cfg(feature = "borsh")]
use borsh::{BorshDeserialize, BorshSerialize};

#[derive(Clone, Copy, PartialEq, Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "borsh", derive(BorshSerialize, BorshDeserialize))]
pub struct BinaryTree {
    height: u32,
}

impl BinaryTree {
    pub fn new(height: u32) -> BinaryTree {
        BinaryTree { height }
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of leaves, i.e. the number of representable users.
    pub fn capacity(&self) -> u64 {
        1u64 << self.height
    }

    /// Node id of the leaf with the given index.
    pub fn leaf_node(&self, leaf: u64) -> u64 {
        self.capacity() + leaf
    }

    /// Node ids from the leaf up to and including the root.
    pub fn path(&self, leaf: u64) -> Vec<u64> {
        let mut node = self.leaf_node(leaf);
        let mut path = Vec::with_capacity(self.height as usize + 1);
        while node >= 1 {
            path.push(node);
            node /= 2;
        }
        path
    }

    /// Minimal set of nodes whose subtrees cover exactly the non-revoked
    /// leaves. Empty when every leaf is revoked; `[1]` when none is.
    pub fn cover(&self, revoked: &HashSet<u64>) -> Vec<u64> {
        let mut nodes = Vec::new();
        self.cover_node(1, revoked, &mut nodes);
        nodes
    }

    fn cover_node(&self, node: u64, revoked: &HashSet<u64>, out: &mut Vec<u64>) {
        if !self.subtree_has_revoked(node, revoked) {
            out.push(node);
        } else if node < self.capacity() {
            self.cover_node(2 * node, revoked, out);
            self.cover_node(2 * node + 1, revoked, out);
        }
    }

    fn subtree_has_revoked(&self, node: u64, revoked: &HashSet<u64>) -> bool {
        let mut first = node;
        let mut last = node;
        while first < self.capacity() {
            first *= 2;
            last = 2 * last + 1;
        }
        (first..=last).any(|leaf_node| revoked.contains(&(leaf_node - self.capacity())))
    }
}
