//! Arena-backed red-black tree keeping an ordered multiset of keys.
//!
//! Nodes live in a `Vec` owned by the tree; parent/child links are indices
//! into that storage, so rotations are plain index writes and teardown is a
//! single `Vec` drop. Duplicate keys are allowed and always descend into the
//! right subtree.

extern crate alloc;

use core::cmp::Ordering;

use alloc::vec::Vec;

mod iter;
mod map;

pub use iter::RedbudSortedIterator;
pub use map::RedbudMap;

/*
Slot 0 of the storage is the tree's own sentinel: always black, self-linked,
standing in for every "no child"/"no parent" position. Each tree carries its
own sentinel, nothing is shared between instances.

Erased cells are threaded into a free list through their `parent` field, with
the head kept on the tree; `allocate` pops from that list before growing the
storage vector.
*/

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(u8)]
enum NodeColor {
    #[default]
    Red,
    Black,
    /// Slot sits on the free list, not in the tree.
    Free,
}

#[derive(Debug)]
pub(crate) struct RedbudNode<K> {
    pub(crate) key: K,
    color: NodeColor,
    parent: usize,
    left: usize,
    right: usize,
}

impl<K> RedbudNode<K> {
    fn new_isolated(key: K) -> Self {
        Self {
            key,
            color: NodeColor::default(),
            parent: 0,
            left: 0,
            right: 0,
        }
    }

    pub(crate) fn left_child(&self) -> usize {
        self.left
    }

    pub(crate) fn right_child(&self) -> usize {
        self.right
    }
}

impl<K: Default> Default for RedbudNode<K> {
    fn default() -> Self {
        Self {
            key: K::default(),
            color: NodeColor::default(),
            parent: 0,
            left: 0,
            right: 0,
        }
    }
}

/// Opaque handle to a node stored in a [`Redbud`] tree.
///
/// Handles are only meaningful for the tree that produced them. A handle
/// goes stale once its node is erased; stale handles are rejected by
/// [`Redbud::erase`] and [`Redbud::key`] unless the slot has since been
/// reused by a later insertion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NodeHandle(usize);

/// An ordered multiset of keys backed by a red-black tree.
#[derive(Debug)]
pub struct Redbud<K: Ord> {
    storage: Vec<RedbudNode<K>>,
    root: usize,
    free_head: usize,
    length: usize,
}

impl<K: Ord> Redbud<K> {
    pub(crate) const BLACK_NIL: usize = 0;

    #[must_use]
    pub fn len(&self) -> usize {
        self.length
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Reserves storage for at least `additional` more insertions.
    pub fn reserve(&mut self, additional: usize) {
        self.storage.reserve(additional);
    }

    /// Removes every key, keeping the allocated storage.
    pub fn clear(&mut self) {
        self.storage.truncate(1);
        self.root = Self::BLACK_NIL;
        self.free_head = Self::BLACK_NIL;
        self.length = 0;
    }

    pub fn contains(&self, key: &K) -> bool {
        self.find_idx(key).is_some()
    }

    /// Looks up `key`, returning a handle to a matching node.
    ///
    /// With duplicate keys this returns the first match on the descent path
    /// from the root, which is not necessarily the first one inserted.
    pub fn find(&self, key: &K) -> Option<NodeHandle> {
        self.find_idx(key).map(NodeHandle)
    }

    /// Handle to the node holding the smallest key, or `None` when empty.
    pub fn min(&self) -> Option<NodeHandle> {
        if self.root == Self::BLACK_NIL {
            return None;
        }

        Some(NodeHandle(self.subtree_min(self.root)))
    }

    /// Handle to the node holding the largest key, or `None` when empty.
    pub fn max(&self) -> Option<NodeHandle> {
        if self.root == Self::BLACK_NIL {
            return None;
        }

        Some(NodeHandle(self.subtree_max(self.root)))
    }

    /// Reads the key behind `handle`, or `None` if the handle is stale.
    pub fn key(&self, handle: NodeHandle) -> Option<&K> {
        if !self.is_live(handle.0) {
            return None;
        }

        Some(&self.storage[handle.0].key)
    }

    /// Inserts `key`, returning a handle to the new node.
    ///
    /// Equal keys descend right, so repeated insertions of the same key all
    /// end up as distinct nodes, adjacent in sorted order.
    pub fn insert(&mut self, key: K) -> NodeHandle {
        let mut current_node = self.root;
        let mut parent_node = Self::BLACK_NIL;

        while current_node != Self::BLACK_NIL {
            parent_node = current_node;
            let curr_node_storage = &self.storage[current_node];

            if key < curr_node_storage.key {
                current_node = curr_node_storage.left;
            } else {
                current_node = curr_node_storage.right;
            }
        }

        let new_node_pos = self.allocate(key);
        self.storage[new_node_pos].parent = parent_node;

        if parent_node == Self::BLACK_NIL {
            self.root = new_node_pos;
        } else if self.storage[new_node_pos].key < self.storage[parent_node].key {
            self.storage[parent_node].left = new_node_pos;
        } else {
            self.storage[parent_node].right = new_node_pos;
        }

        self.length += 1;
        self.fix_red_violation(new_node_pos);

        NodeHandle(new_node_pos)
    }

    /// Removes the node behind `handle`.
    ///
    /// Returns `false` without touching the tree when the tree is empty or
    /// the handle is stale (already erased, or never valid for this tree).
    pub fn erase(&mut self, handle: NodeHandle) -> bool {
        let target = handle.0;
        if self.root == Self::BLACK_NIL || !self.is_live(target) {
            return false;
        }

        let mut removed_color = self.storage[target].color;
        let replacement;

        if self.storage[target].left == Self::BLACK_NIL {
            replacement = self.storage[target].right;
            self.transplant(target, replacement);
        } else if self.storage[target].right == Self::BLACK_NIL {
            replacement = self.storage[target].left;
            self.transplant(target, replacement);
        } else {
            // Two real children: the in-order predecessor (max of the left
            // subtree) takes over the target's position and color.
            let predecessor = self.subtree_max(self.storage[target].left);
            removed_color = self.storage[predecessor].color;
            replacement = self.storage[predecessor].left;

            if self.storage[predecessor].parent == target {
                self.storage[replacement].parent = predecessor;
            } else {
                self.transplant(predecessor, replacement);
                let target_left = self.storage[target].left;
                self.storage[predecessor].left = target_left;
                self.storage[target_left].parent = predecessor;
            }

            self.transplant(target, predecessor);
            let target_right = self.storage[target].right;
            self.storage[predecessor].right = target_right;
            self.storage[target_right].parent = predecessor;
            self.storage[predecessor].color = self.storage[target].color;
        }

        if removed_color == NodeColor::Black {
            self.fix_double_black(replacement);
        }

        self.release(target);
        self.length -= 1;

        true
    }

    /// Removes one node holding `key`, returning whether one was found.
    pub fn remove(&mut self, key: &K) -> bool {
        match self.find(key) {
            Some(handle) => self.erase(handle),
            None => false,
        }
    }

    /// In-order iterator over the stored keys.
    pub fn iter(&self) -> RedbudSortedIterator<'_, K> {
        RedbudSortedIterator {
            tree: self,
            curr: self.root,
            stack: Vec::new(),
        }
    }

    /// Collects up to `capacity` keys in sorted order.
    pub fn to_sorted_vec(&self, capacity: usize) -> Vec<K>
    where
        K: Clone,
    {
        self.iter().take(capacity).cloned().collect()
    }

    pub(crate) fn get_node_by_idx(&self, node_idx: usize) -> &RedbudNode<K> {
        &self.storage[node_idx]
    }

    pub(crate) fn find_key(&self, key: &K) -> Option<&K> {
        self.find_idx(key).map(|idx| &self.storage[idx].key)
    }

    pub(crate) fn find_key_mut(&mut self, key: &K) -> Option<&mut K> {
        let idx = self.find_idx(key)?;

        Some(&mut self.storage[idx].key)
    }

    fn find_idx(&self, key: &K) -> Option<usize> {
        let mut current_node = self.root;

        while current_node != Self::BLACK_NIL {
            let curr_node_storage = &self.storage[current_node];

            match key.cmp(&curr_node_storage.key) {
                Ordering::Less => {
                    current_node = curr_node_storage.left;
                }
                Ordering::Equal => {
                    return Some(current_node);
                }
                Ordering::Greater => {
                    current_node = curr_node_storage.right;
                }
            }
        }

        None
    }

    fn is_live(&self, node_idx: usize) -> bool {
        node_idx != Self::BLACK_NIL
            && node_idx < self.storage.len()
            && self.storage[node_idx].color != NodeColor::Free
    }

    fn subtree_min(&self, start_idx: usize) -> usize {
        let mut curr_node = start_idx;

        while self.storage[curr_node].left != Self::BLACK_NIL {
            curr_node = self.storage[curr_node].left;
        }

        curr_node
    }

    fn subtree_max(&self, start_idx: usize) -> usize {
        let mut curr_node = start_idx;

        while self.storage[curr_node].right != Self::BLACK_NIL {
            curr_node = self.storage[curr_node].right;
        }

        curr_node
    }

    fn allocate(&mut self, key: K) -> usize {
        if self.free_head != Self::BLACK_NIL {
            let slot = self.free_head;
            self.free_head = self.storage[slot].parent;
            self.storage[slot] = RedbudNode::new_isolated(key);

            return slot;
        }

        let slot = self.storage.len();
        self.storage.push(RedbudNode::new_isolated(key));

        slot
    }

    fn release(&mut self, node_idx: usize) {
        self.storage[node_idx].color = NodeColor::Free;
        self.storage[node_idx].left = Self::BLACK_NIL;
        self.storage[node_idx].right = Self::BLACK_NIL;
        self.storage[node_idx].parent = self.free_head;
        self.free_head = node_idx;
    }

    /// Splices `new` into `old`'s position as seen from `old`'s parent.
    ///
    /// Parent-side only, neither node's children are touched. The parent
    /// link is written even when `new` is the sentinel; the deletion fixup
    /// relies on that to navigate up from an empty replacement position.
    fn transplant(&mut self, old: usize, new: usize) {
        let parent_idx = self.storage[old].parent;

        if parent_idx == Self::BLACK_NIL {
            self.root = new;
        } else if self.storage[parent_idx].left == old {
            self.storage[parent_idx].left = new;
        } else {
            self.storage[parent_idx].right = new;
        }

        self.storage[new].parent = parent_idx;
    }

    /// Restores the red-red invariant after inserting `start_node_idx`.
    ///
    /// Loop invariant: `curr_node` is red and the only possible violation
    /// is its parent also being red. A red parent is never the root, so the
    /// grandparent is always a real node.
    fn fix_red_violation(&mut self, start_node_idx: usize) {
        let mut curr_node = start_node_idx;

        while matches!(
            self.storage[self.storage[curr_node].parent].color,
            NodeColor::Red
        ) {
            let mut parent_idx = self.storage[curr_node].parent;
            let grandparent_idx = self.storage[parent_idx].parent;

            let parent_is_right_child = self.storage[grandparent_idx].right == parent_idx;
            let uncle = if parent_is_right_child {
                self.storage[grandparent_idx].left
            } else {
                self.storage[grandparent_idx].right
            };

            if matches!(self.storage[uncle].color, NodeColor::Red) {
                self.storage[parent_idx].color = NodeColor::Black;
                self.storage[uncle].color = NodeColor::Black;
                self.storage[grandparent_idx].color = NodeColor::Red;

                curr_node = grandparent_idx;
                continue;
            }

            let curr_is_inner = if parent_is_right_child {
                self.storage[parent_idx].left == curr_node
            } else {
                self.storage[parent_idx].right == curr_node
            };

            // Inner grandchild: rotate it outward first, then fall through
            // to the recolor-and-rotate below. The two steps never both
            // rotate against the same shape in one iteration.
            if curr_is_inner {
                curr_node = parent_idx;

                if parent_is_right_child {
                    self.rotate_right(curr_node);
                } else {
                    self.rotate_left(curr_node);
                }

                parent_idx = self.storage[curr_node].parent;
            }

            self.storage[parent_idx].color = NodeColor::Black;
            self.storage[grandparent_idx].color = NodeColor::Red;

            if parent_is_right_child {
                self.rotate_left(grandparent_idx);
            } else {
                self.rotate_right(grandparent_idx);
            }
        }

        let root = self.root;
        self.storage[root].color = NodeColor::Black;
    }

    /// Restores the black-height invariant after a black node was removed.
    ///
    /// `start_node_idx` carries one extra implicit black; it may be the
    /// sentinel, whose parent link was set by the preceding splice.
    fn fix_double_black(&mut self, start_node_idx: usize) {
        let mut curr_node = start_node_idx;

        while curr_node != self.root && matches!(self.storage[curr_node].color, NodeColor::Black) {
            let parent_idx = self.storage[curr_node].parent;
            let curr_is_left_child = self.storage[parent_idx].left == curr_node;
            let mut sibling_idx = if curr_is_left_child {
                self.storage[parent_idx].right
            } else {
                self.storage[parent_idx].left
            };

            // Red sibling: rotate it above the parent so the remaining
            // cases see a black sibling with real children.
            if matches!(self.storage[sibling_idx].color, NodeColor::Red) {
                self.storage[sibling_idx].color = NodeColor::Black;
                self.storage[parent_idx].color = NodeColor::Red;

                if curr_is_left_child {
                    self.rotate_left(parent_idx);
                } else {
                    self.rotate_right(parent_idx);
                }

                sibling_idx = if curr_is_left_child {
                    self.storage[parent_idx].right
                } else {
                    self.storage[parent_idx].left
                };
            }

            let (near_idx, far_idx) = if curr_is_left_child {
                (
                    self.storage[sibling_idx].left,
                    self.storage[sibling_idx].right,
                )
            } else {
                (
                    self.storage[sibling_idx].right,
                    self.storage[sibling_idx].left,
                )
            };
            let near_is_red = matches!(self.storage[near_idx].color, NodeColor::Red);
            let far_is_red = matches!(self.storage[far_idx].color, NodeColor::Red);

            // Both sibling children black: drop one black from the sibling
            // side and push the double-black up to the parent.
            if !near_is_red && !far_is_red {
                self.storage[sibling_idx].color = NodeColor::Red;
                curr_node = parent_idx;
                continue;
            }

            // Near child red, far child black: rotate the near child into
            // the sibling position so the terminal case below applies.
            if !far_is_red {
                self.storage[near_idx].color = NodeColor::Black;
                self.storage[sibling_idx].color = NodeColor::Red;

                if curr_is_left_child {
                    self.rotate_right(sibling_idx);
                } else {
                    self.rotate_left(sibling_idx);
                }

                sibling_idx = if curr_is_left_child {
                    self.storage[parent_idx].right
                } else {
                    self.storage[parent_idx].left
                };
            }

            // Far child red: rotating the sibling over the parent absorbs
            // the extra black.
            let far_idx = if curr_is_left_child {
                self.storage[sibling_idx].right
            } else {
                self.storage[sibling_idx].left
            };

            self.storage[sibling_idx].color = self.storage[parent_idx].color;
            self.storage[parent_idx].color = NodeColor::Black;
            self.storage[far_idx].color = NodeColor::Black;

            if curr_is_left_child {
                self.rotate_left(parent_idx);
            } else {
                self.rotate_right(parent_idx);
            }

            curr_node = self.root;
        }

        self.storage[curr_node].color = NodeColor::Black;
        let root = self.root;
        self.storage[root].color = NodeColor::Black;
    }

    fn rotate_left(&mut self, center: usize) {
        let grandparent_idx = self.storage[center].parent;
        let sibling_idx = self.storage[center].right;

        let c_idx = self.storage[sibling_idx].left;

        self.storage[center].right = c_idx;
        if c_idx != Self::BLACK_NIL {
            self.storage[c_idx].parent = center;
        }

        self.storage[sibling_idx].left = center;
        self.storage[center].parent = sibling_idx;
        self.storage[sibling_idx].parent = grandparent_idx;

        if grandparent_idx != Self::BLACK_NIL {
            if self.storage[grandparent_idx].right == center {
                self.storage[grandparent_idx].right = sibling_idx;
            } else {
                self.storage[grandparent_idx].left = sibling_idx;
            }
        } else {
            self.root = sibling_idx;
        }
    }

    fn rotate_right(&mut self, center: usize) {
        let grandparent_idx = self.storage[center].parent;
        let sibling_idx = self.storage[center].left;

        let c_idx = self.storage[sibling_idx].right;

        self.storage[center].left = c_idx;
        if c_idx != Self::BLACK_NIL {
            self.storage[c_idx].parent = center;
        }

        self.storage[sibling_idx].right = center;
        self.storage[center].parent = sibling_idx;
        self.storage[sibling_idx].parent = grandparent_idx;

        if grandparent_idx != Self::BLACK_NIL {
            if self.storage[grandparent_idx].right == center {
                self.storage[grandparent_idx].right = sibling_idx;
            } else {
                self.storage[grandparent_idx].left = sibling_idx;
            }
        } else {
            self.root = sibling_idx;
        }
    }
}

impl<K: Default + Ord> Redbud<K> {
    #[must_use]
    pub fn new() -> Self {
        let mut sentinel = RedbudNode::default();
        sentinel.color = NodeColor::Black;

        Self {
            storage: alloc::vec![sentinel],
            root: Self::BLACK_NIL,
            free_head: Self::BLACK_NIL,
            length: 0,
        }
    }
}

impl<K: Default + Ord> Default for Redbud<K> {
    fn default() -> Self {
        Self::new()
    }
}
