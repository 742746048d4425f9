use alloc::vec::Vec;

use crate::Redbud;

/// In-order iterator over a [`Redbud`] tree, yielding keys in sorted order.
///
/// Uses an explicit stack instead of parent-pointer walking, so the
/// traversal never touches the sentinel's links.
pub struct RedbudSortedIterator<'a, K: Ord> {
    pub(crate) tree: &'a Redbud<K>,
    pub(crate) curr: usize,
    pub(crate) stack: Vec<usize>,
}

impl<'a, K: Ord> Iterator for RedbudSortedIterator<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        while self.curr != Redbud::<K>::BLACK_NIL {
            self.stack.push(self.curr);
            self.curr = self.tree.get_node_by_idx(self.curr).left_child();
        }

        if let Some(node) = self.stack.pop() {
            self.curr = self.tree.get_node_by_idx(node).right_child();

            return Some(&self.tree.get_node_by_idx(node).key);
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use crate::Redbud;

    #[test]
    pub fn inorder_iteration() {
        let mut tree = Redbud::<usize>::new();

        for key in [5, 1, 9, 3, 7] {
            tree.insert(key);
        }

        let keys: Vec<&usize> = tree.iter().collect();
        assert_eq!(keys, vec![&1, &3, &5, &7, &9]);
    }

    #[test]
    pub fn empty_iteration() {
        let tree = Redbud::<usize>::new();

        assert!(tree.iter().next().is_none());
    }

    #[test]
    pub fn iteration_after_erasures() {
        let mut tree = Redbud::<usize>::new();

        for key in 0..16 {
            tree.insert(key);
        }
        for key in [0, 5, 15] {
            assert!(tree.remove(&key));
        }

        let keys: Vec<usize> = tree.iter().copied().collect();
        let expected: Vec<usize> = (0..16).filter(|k| ![0, 5, 15].contains(k)).collect();
        assert_eq!(keys, expected);
    }
}
