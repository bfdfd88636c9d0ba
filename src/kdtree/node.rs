//! Tree node and the per-node helpers used by deletion.

/// Owning link to a child subtree.
pub(crate) type Link<const K: usize, T> = Option<Box<Node<K, T>>>;

/// A single tree node. Owns its point and at most two children.
#[derive(Debug)]
pub(crate) struct Node<const K: usize, T> {
    pub(crate) point: [T; K],
    pub(crate) left: Link<K, T>,
    pub(crate) right: Link<K, T>,
}

/// How a matched node gives up its point during deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Removal<P> {
    /// Promote the minimum (along the split axis) of the right subtree.
    FromRight(P),
    /// Promote the minimum of the left subtree, then move what is left of
    /// that subtree into the right slot.
    FromLeft(P),
    /// No children; the node itself is detached.
    Leaf,
}

impl<const K: usize, T: Copy + Ord> Node<K, T> {
    pub(crate) fn new(point: [T; K]) -> Self {
        Self {
            point,
            left: None,
            right: None,
        }
    }

    /// Node holding the smallest coordinate along `axis` in this subtree.
    ///
    /// `depth` is the depth of `self`. When a node splits on `axis`, its
    /// right subtree only holds values `>=` its own, so it is skipped.
    /// Candidates are visited in pre-order (node, left, right) and the first
    /// one seen wins ties.
    pub(crate) fn find_min(&self, axis: usize, depth: usize) -> &Self {
        let mut best = self;
        let mut pending = vec![(self, depth)];
        while let Some((node, depth)) = pending.pop() {
            if node.point[axis] < best.point[axis] {
                best = node;
            }
            if depth % K != axis {
                pending.extend(node.right.as_deref().map(|right| (right, depth + 1)));
            }
            pending.extend(node.left.as_deref().map(|left| (left, depth + 1)));
        }
        best
    }

    /// Pick the successor policy for deleting this node at `depth`.
    pub(crate) fn removal(&self, depth: usize) -> Removal<[T; K]> {
        let axis = depth % K;
        if let Some(right) = self.right.as_deref() {
            Removal::FromRight(right.find_min(axis, depth + 1).point)
        } else if let Some(left) = self.left.as_deref() {
            Removal::FromLeft(left.find_min(axis, depth + 1).point)
        } else {
            Removal::Leaf
        }
    }
}

impl<const K: usize, T> Node<K, T> {
    pub(crate) fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(point: [u8; 2]) -> Link<2, u8> {
        Some(Box::new(Node::new(point)))
    }

    #[test]
    fn test_find_min_on_split_axis_skips_right() {
        // Root splits on axis 0; the right child is never a candidate.
        let mut root = Node::new([5, 5]);
        root.left = leaf([3, 9]);
        root.right = leaf([7, 0]);

        assert_eq!(root.find_min(0, 0).point, [3, 9]);
    }

    #[test]
    fn test_find_min_off_axis_checks_both_children() {
        let mut root = Node::new([5, 5]);
        root.left = leaf([3, 9]);
        root.right = leaf([7, 0]);

        assert_eq!(root.find_min(1, 0).point, [7, 0]);
    }

    #[test]
    fn test_find_min_prefers_self_on_tie() {
        let mut root = Node::new([5, 1]);
        root.right = leaf([6, 1]);

        assert_eq!(root.find_min(1, 0).point, [5, 1]);
    }

    #[test]
    fn test_find_min_first_in_pre_order_wins() {
        // Both children hold 1 on axis 1; the left one is reached first.
        let mut root = Node::new([5, 5]);
        root.left = leaf([3, 1]);
        root.right = leaf([7, 1]);

        assert_eq!(root.find_min(1, 0).point, [3, 1]);
    }

    #[test]
    fn test_removal_policy() {
        let mut node = Node::new([5, 5]);
        assert_eq!(node.removal(0), Removal::Leaf);
        assert!(node.is_leaf());

        node.left = leaf([2, 8]);
        assert_eq!(node.removal(0), Removal::FromLeft([2, 8]));

        node.right = leaf([9, 1]);
        assert_eq!(node.removal(0), Removal::FromRight([9, 1]));
        assert!(!node.is_leaf());
    }
}
