use crate::list::List;
use crate::queue::Queue;

/// Handle to a node of a [`BinaryTree`].
///
/// Handles of removed nodes are invalidated and their slots may be reused by
/// later insertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
struct TreeNode<T> {
    data: T,
    left: Option<NodeId>,
    right: Option<NodeId>,
}

/// Unbalanced binary tree with explicit, caller-driven placement.
///
/// Nodes live in an arena and are addressed by [`NodeId`]. Passing `None` as
/// the parent addresses the root position.
#[derive(Debug, Clone)]
pub struct BinaryTree<T> {
    nodes: Vec<Option<TreeNode<T>>>,
    free: Vec<usize>,
    root: Option<NodeId>,
    len: usize,
}

#[derive(Clone, Copy)]
enum Side {
    Left,
    Right,
}

impl<T> BinaryTree<T> {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            free: Vec::new(),
            root: None,
            len: 0,
        }
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn data(&self, id: NodeId) -> Option<&T> {
        self.node(id).map(|n| &n.data)
    }

    pub fn data_mut(&mut self, id: NodeId) -> Option<&mut T> {
        self.nodes.get_mut(id.0)?.as_mut().map(|n| &mut n.data)
    }

    pub fn left(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)?.left
    }

    pub fn right(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)?.right
    }

    /// `false` for handles that are not in the tree.
    pub fn is_leaf(&self, id: NodeId) -> bool {
        self.node(id)
            .map(|n| n.left.is_none() && n.right.is_none())
            .unwrap_or(false)
    }

    /// Insert `data` as the left child of `parent`, or as the root when
    /// `parent` is `None`. Returns `None` when the position is occupied, the
    /// tree already has a root, or `parent` is not in the tree.
    pub fn insert_left(&mut self, parent: Option<NodeId>, data: T) -> Option<NodeId> {
        self.insert(parent, data, Side::Left)
    }

    pub fn insert_right(&mut self, parent: Option<NodeId>, data: T) -> Option<NodeId> {
        self.insert(parent, data, Side::Right)
    }

    /// Remove the left subtree of `parent` (the whole tree when `None`) and
    /// return how many nodes were removed.
    pub fn remove_left(&mut self, parent: Option<NodeId>) -> usize {
        self.remove(parent, Side::Left)
    }

    pub fn remove_right(&mut self, parent: Option<NodeId>) -> usize {
        self.remove(parent, Side::Right)
    }

    /// Build a tree whose root holds `data` with `left` and `right` as its
    /// subtrees.
    pub fn merge(left: BinaryTree<T>, right: BinaryTree<T>, data: T) -> BinaryTree<T> {
        let mut merged = BinaryTree::new();
        let root = merged.alloc(data);
        merged.root = Some(root);
        merged.len = 1;

        let left_root = merged.adopt(left);
        let right_root = merged.adopt(right);
        if let Some(node) = merged.node_mut(root) {
            node.left = left_root;
            node.right = right_root;
        }
        merged
    }

    fn insert(&mut self, parent: Option<NodeId>, data: T, side: Side) -> Option<NodeId> {
        match parent {
            None => {
                if self.len > 0 {
                    return None;
                }
                let id = self.alloc(data);
                self.root = Some(id);
                self.len = 1;
                Some(id)
            }
            Some(parent) => {
                let occupied = match side {
                    Side::Left => self.node(parent)?.left.is_some(),
                    Side::Right => self.node(parent)?.right.is_some(),
                };
                if occupied {
                    return None;
                }
                let id = self.alloc(data);
                let node = self.node_mut(parent)?;
                match side {
                    Side::Left => node.left = Some(id),
                    Side::Right => node.right = Some(id),
                }
                self.len += 1;
                Some(id)
            }
        }
    }

    fn remove(&mut self, parent: Option<NodeId>, side: Side) -> usize {
        if self.len == 0 {
            return 0;
        }
        let detached = match parent {
            None => self.root.take(),
            Some(parent) => match self.node_mut(parent) {
                Some(node) => match side {
                    Side::Left => node.left.take(),
                    Side::Right => node.right.take(),
                },
                None => None,
            },
        };
        match detached {
            Some(id) => {
                let removed = self.free_subtree(id);
                self.len -= removed;
                removed
            }
            None => 0,
        }
    }

    fn free_subtree(&mut self, id: NodeId) -> usize {
        let mut removed = 0;
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            if let Some(node) = self.nodes.get_mut(id.0).and_then(Option::take) {
                stack.extend(node.left);
                stack.extend(node.right);
                self.free.push(id.0);
                removed += 1;
            }
        }
        removed
    }

    /// Move every node of `other` into this arena. Returns the new handle of
    /// `other`'s root.
    fn adopt(&mut self, mut other: BinaryTree<T>) -> Option<NodeId> {
        let root = other.root?;
        let mut order = Vec::with_capacity(other.len);
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if let Some(node) = other.node(id) {
                order.push(id);
                stack.extend(node.left);
                stack.extend(node.right);
            }
        }

        let mut remap: Vec<Option<NodeId>> = vec![None; other.nodes.len()];
        for id in &order {
            self.nodes.push(None);
            remap[id.0] = Some(NodeId(self.nodes.len() - 1));
        }
        for id in order {
            if let (Some(mut node), Some(target)) = (other.nodes[id.0].take(), remap[id.0]) {
                node.left = node.left.and_then(|c| remap[c.0]);
                node.right = node.right.and_then(|c| remap[c.0]);
                self.nodes[target.0] = Some(node);
                self.len += 1;
            }
        }
        remap[root.0]
    }

    fn alloc(&mut self, data: T) -> NodeId {
        let node = TreeNode {
            data,
            left: None,
            right: None,
        };
        match self.free.pop() {
            Some(slot) => {
                self.nodes[slot] = Some(node);
                NodeId(slot)
            }
            None => {
                self.nodes.push(Some(node));
                NodeId(self.nodes.len() - 1)
            }
        }
    }

    fn node(&self, id: NodeId) -> Option<&TreeNode<T>> {
        self.nodes.get(id.0)?.as_ref()
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut TreeNode<T>> {
        self.nodes.get_mut(id.0)?.as_mut()
    }
}

impl<T: Clone> BinaryTree<T> {
    /// Left, root, right.
    pub fn in_order(&self) -> List<T> {
        let mut out = List::new();
        let mut stack = Vec::new();
        let mut current = self.root;
        while current.is_some() || !stack.is_empty() {
            while let Some(id) = current {
                stack.push(id);
                current = self.left(id);
            }
            if let Some(id) = stack.pop() {
                if let Some(data) = self.data(id) {
                    out.insert_next(data.clone());
                }
                current = self.right(id);
            }
        }
        out
    }

    /// Root, left, right.
    pub fn pre_order(&self) -> List<T> {
        let mut out = List::new();
        let mut stack: Vec<NodeId> = self.root.into_iter().collect();
        while let Some(id) = stack.pop() {
            let Some(node) = self.node(id) else { continue };
            out.insert_next(node.data.clone());
            stack.extend(node.right);
            stack.extend(node.left);
        }
        out
    }

    /// Left, right, root.
    pub fn post_order(&self) -> List<T> {
        // Root-right-left, reversed.
        let mut reversed = Vec::with_capacity(self.len);
        let mut stack: Vec<NodeId> = self.root.into_iter().collect();
        while let Some(id) = stack.pop() {
            let Some(node) = self.node(id) else { continue };
            reversed.push(node.data.clone());
            stack.extend(node.left);
            stack.extend(node.right);
        }
        reversed.into_iter().rev().collect()
    }

    /// Breadth first, left to right within a level.
    pub fn level_order(&self) -> List<T> {
        let mut out = List::new();
        let mut queue = Queue::new();
        if let Some(root) = self.root {
            queue.enqueue(root);
        }
        while let Ok(id) = queue.dequeue() {
            let Some(node) = self.node(id) else { continue };
            out.insert_next(node.data.clone());
            if let Some(left) = node.left {
                queue.enqueue(left);
            }
            if let Some(right) = node.right {
                queue.enqueue(right);
            }
        }
        out
    }
}

impl<T> Default for BinaryTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn to_vec(list: List<i32>) -> Vec<i32> {
        list.into_iter().collect()
    }

    //       1
    //     /   \
    //    2     3
    //   / \     \
    //  4   5     6
    fn sample() -> BinaryTree<i32> {
        let mut tree = BinaryTree::new();
        let root = tree.insert_left(None, 1).unwrap();
        let two = tree.insert_left(Some(root), 2).unwrap();
        let three = tree.insert_right(Some(root), 3).unwrap();
        tree.insert_left(Some(two), 4).unwrap();
        tree.insert_right(Some(two), 5).unwrap();
        tree.insert_right(Some(three), 6).unwrap();
        tree
    }

    #[test]
    fn empty_tree_traversals() {
        let tree: BinaryTree<i32> = BinaryTree::new();
        assert!(tree.in_order().is_empty());
        assert!(tree.pre_order().is_empty());
        assert!(tree.post_order().is_empty());
        assert!(tree.level_order().is_empty());
    }

    #[test]
    fn traversal_orders() {
        let tree = sample();
        assert_eq!(tree.len(), 6);
        assert_eq!(to_vec(tree.in_order()), vec![4, 2, 5, 1, 3, 6]);
        assert_eq!(to_vec(tree.pre_order()), vec![1, 2, 4, 5, 3, 6]);
        assert_eq!(to_vec(tree.post_order()), vec![4, 5, 2, 6, 3, 1]);
        assert_eq!(to_vec(tree.level_order()), vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn right_skewed_tree() {
        let mut tree = BinaryTree::new();
        let a = tree.insert_right(None, 1).unwrap();
        let b = tree.insert_right(Some(a), 2).unwrap();
        tree.insert_right(Some(b), 3).unwrap();
        assert_eq!(to_vec(tree.in_order()), vec![1, 2, 3]);
        assert_eq!(to_vec(tree.pre_order()), vec![1, 2, 3]);
        assert_eq!(to_vec(tree.post_order()), vec![3, 2, 1]);
        assert_eq!(to_vec(tree.level_order()), vec![1, 2, 3]);
    }

    #[test]
    fn occupied_positions_are_refused() {
        let mut tree = BinaryTree::new();
        let root = tree.insert_left(None, 1).unwrap();
        assert!(tree.insert_left(None, 9).is_none());
        tree.insert_left(Some(root), 2).unwrap();
        assert!(tree.insert_left(Some(root), 3).is_none());
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn remove_subtree_counts_nodes() {
        let mut tree = sample();
        let root = tree.root().unwrap();
        assert_eq!(tree.remove_left(Some(root)), 3);
        assert_eq!(tree.len(), 3);
        assert_eq!(to_vec(tree.in_order()), vec![1, 3, 6]);
        assert_eq!(tree.remove_left(Some(root)), 0);

        // freed slots are reused
        let seven = tree.insert_left(Some(root), 7).unwrap();
        assert!(tree.is_leaf(seven));
        assert_eq!(tree.len(), 4);

        assert_eq!(tree.remove_left(None), 4);
        assert!(tree.is_empty());
        assert!(tree.root().is_none());
    }

    #[test]
    fn merge_builds_new_root() {
        let mut left = BinaryTree::new();
        let l = left.insert_left(None, 2).unwrap();
        left.insert_left(Some(l), 1).unwrap();
        let mut right = BinaryTree::new();
        right.insert_left(None, 4).unwrap();

        let merged = BinaryTree::merge(left, right, 3);
        assert_eq!(merged.len(), 4);
        assert_eq!(merged.data(merged.root().unwrap()), Some(&3));
        assert_eq!(to_vec(merged.in_order()), vec![1, 2, 3, 4]);
        assert_eq!(to_vec(merged.level_order()), vec![3, 2, 4, 1]);
    }

    #[test]
    fn merge_with_empty_subtrees() {
        let merged = BinaryTree::merge(BinaryTree::new(), BinaryTree::new(), 5);
        let root = merged.root().unwrap();
        assert!(merged.is_leaf(root));
        assert_eq!(merged.len(), 1);
    }
}
