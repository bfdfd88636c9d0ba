//! K-dimensional binary search tree over fixed-length points.
//!
//! Each level of the tree splits on one coordinate, cycling through the
//! axes as `depth % K`. A node's left subtree only holds points whose
//! split coordinate is strictly smaller than the node's; everything equal
//! or larger lives on the right. That ordering is what lets [`KdTree::contains`]
//! follow a single path and lets [`KdTree::range_search`] prune subtrees.
//!
//! The tree is not self-balancing. Sequential [`KdTree::insert`] of sorted
//! input degrades to a chain; when the whole point set is known up front,
//! [`KdTree::build`] produces a balanced tree by median partitioning.
//!
//! # Example
//! ```
//! use kdip::KdTree;
//!
//! let mut tree: KdTree<2> = KdTree::new();
//! tree.build(vec![[3, 6], [17, 15], [13, 15], [6, 12], [9, 1], [2, 7], [10, 19]]);
//!
//! assert!(tree.contains(&[13, 15]));
//! assert!(!tree.contains(&[13, 16]));
//!
//! let mut hits = tree.range_search(&[0, 0], &[10, 10]);
//! hits.sort();
//! assert_eq!(hits, vec![[2, 7], [3, 6], [9, 1]]);
//! ```

mod build;
mod node;

#[cfg(test)]
mod proptests;

use std::fmt;

use node::{Link, Node, Removal};

/// A point with `K` coordinates. Address points use the default `u8`.
pub type Point<const K: usize, T = u8> = [T; K];

/// K-dimensional tree holding copies of `[T; K]` points.
///
/// Duplicate points are kept, never merged.
#[derive(Debug)]
pub struct KdTree<const K: usize, T = u8> {
    root: Link<K, T>,
    len: usize,
}

impl<const K: usize, T> KdTree<K, T> {
    const HAS_AXES: () = assert!(K > 0, "KdTree requires at least one dimension");

    /// Create an empty tree.
    pub fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::HAS_AXES;
        Self { root: None, len: 0 }
    }

    /// Number of stored points, duplicates included.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the tree holds no points.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Remove every point.
    ///
    /// Nodes are released from an explicit stack so that a degenerate,
    /// chain-shaped tree does not recurse once per level.
    pub fn clear(&mut self) {
        let mut pending: Vec<Box<Node<K, T>>> = self.root.take().into_iter().collect();
        while let Some(mut node) = pending.pop() {
            pending.extend(node.left.take());
            pending.extend(node.right.take());
        }
        self.len = 0;
    }
}

impl<const K: usize, T: Copy + Ord> KdTree<K, T> {
    /// Create a balanced tree from a set of points.
    pub fn from_points<I: IntoIterator<Item = Point<K, T>>>(points: I) -> Self {
        let mut tree = Self::new();
        tree.build(points);
        tree
    }

    /// Insert a point.
    ///
    /// Descends from the root, going left when the point's split coordinate
    /// is strictly smaller than the node's and right otherwise, and attaches
    /// a new leaf at the first empty slot.
    pub fn insert(&mut self, point: Point<K, T>) {
        let mut slot = &mut self.root;
        let mut depth = 0;
        while let Some(node) = slot {
            let axis = depth % K;
            slot = if point[axis] < node.point[axis] {
                &mut node.left
            } else {
                &mut node.right
            };
            depth += 1;
        }
        *slot = Some(Box::new(Node::new(point)));
        self.len += 1;
    }

    /// Check if an equal point is stored.
    ///
    /// Only the single descent path implied by the split rule is examined.
    pub fn contains(&self, point: &Point<K, T>) -> bool {
        let mut current = self.root.as_deref();
        let mut depth = 0;
        while let Some(node) = current {
            if node.point == *point {
                return true;
            }
            let axis = depth % K;
            current = if point[axis] < node.point[axis] {
                node.left.as_deref()
            } else {
                node.right.as_deref()
            };
            depth += 1;
        }
        false
    }

    /// Remove one occurrence of a point.
    ///
    /// Returns `false` and leaves the tree untouched when the point is not
    /// stored.
    pub fn remove(&mut self, point: &Point<K, T>) -> bool {
        match Self::locate(&mut self.root, point, 0) {
            Some((slot, depth)) => {
                Self::detach(slot, depth);
                self.len -= 1;
                true
            }
            None => false,
        }
    }

    /// Slot (and its depth) of the first node equal to `point` on the
    /// descent path below `slot`, which sits at `depth`.
    fn locate<'a>(
        mut slot: &'a mut Link<K, T>,
        point: &Point<K, T>,
        mut depth: usize,
    ) -> Option<(&'a mut Link<K, T>, usize)> {
        loop {
            let go_left = match slot.as_deref() {
                None => return None,
                Some(node) if node.point == *point => break,
                Some(node) => point[depth % K] < node.point[depth % K],
            };
            let Some(node) = slot else {
                return None;
            };
            slot = if go_left {
                &mut node.left
            } else {
                &mut node.right
            };
            depth += 1;
        }
        Some((slot, depth))
    }

    /// Give up the point of the node in `slot`, promoting a successor when
    /// the node has children.
    ///
    /// The successor's old node is detached the same way, one level at a
    /// time, until a leaf is removed.
    fn detach(mut slot: &mut Link<K, T>, mut depth: usize) {
        loop {
            let Some(removal) = slot.as_deref().map(|node| node.removal(depth)) else {
                return;
            };
            if let Removal::Leaf = removal {
                *slot = None;
                return;
            }
            let Some(node) = slot.as_deref_mut() else {
                return;
            };

            let successor = match removal {
                Removal::FromRight(successor) => successor,
                Removal::FromLeft(successor) => {
                    node.right = node.left.take();
                    successor
                }
                Removal::Leaf => return,
            };
            node.point = successor;

            match Self::locate(&mut node.right, &successor, depth + 1) {
                Some((next, next_depth)) => {
                    slot = next;
                    depth = next_depth;
                }
                None => return,
            }
        }
    }

    /// Replace the contents of the tree with a balanced tree over `points`.
    ///
    /// Each level places the median (along that level's axis) at the node
    /// and splits the rest into both halves. Points that tie with the median
    /// on the split axis are moved to the right half so the ordering
    /// invariant holds exactly as it does for inserted points. Exact
    /// duplicates therefore always form a right-leaning chain; the depth is
    /// only logarithmic when split keys are distinct.
    pub fn build<I: IntoIterator<Item = Point<K, T>>>(&mut self, points: I) {
        let mut points: Vec<Point<K, T>> = points.into_iter().collect();
        self.clear();
        self.len = points.len();
        self.root = build::balanced(&mut points);

        if log::log_enabled!(log::Level::Debug) {
            log::debug!(
                "built {}-d tree: {} points, depth {}",
                K,
                self.len,
                self.depth()
            );
        }
    }

    /// Rebuild the current contents into a balanced tree.
    ///
    /// Never called implicitly; useful after many deletions, which tend to
    /// leave right-heavy chains behind.
    pub fn rebuild(&mut self) {
        let points = self.points();
        self.build(points);
    }

    /// All stored points inside the inclusive box `[low, high]`.
    ///
    /// Results come out in pre-order visitation order. A subtree is skipped
    /// only when the node's split coordinate rules it out: left is visited
    /// when `node[axis] >= low[axis]`, right when `node[axis] <= high[axis]`.
    pub fn range_search(&self, low: &Point<K, T>, high: &Point<K, T>) -> Vec<Point<K, T>> {
        let mut results = Vec::new();
        let mut stack: Vec<(&Node<K, T>, usize)> =
            self.root.as_deref().map(|root| (root, 0)).into_iter().collect();

        while let Some((node, depth)) = stack.pop() {
            let inside = (0..K).all(|i| low[i] <= node.point[i] && node.point[i] <= high[i]);
            if inside {
                results.push(node.point);
            }

            let axis = depth % K;
            // Pushed right first so the left subtree is visited first.
            if node.point[axis] <= high[axis] {
                if let Some(right) = node.right.as_deref() {
                    stack.push((right, depth + 1));
                }
            }
            if node.point[axis] >= low[axis] {
                if let Some(left) = node.left.as_deref() {
                    stack.push((left, depth + 1));
                }
            }
        }

        results
    }

    /// Iterate over the stored points in pre-order.
    pub fn iter(&self) -> Iter<'_, K, T> {
        Iter {
            stack: self.root.as_deref().into_iter().collect(),
            remaining: self.len,
        }
    }

    /// Copy all stored points out, in pre-order.
    pub fn points(&self) -> Vec<Point<K, T>> {
        self.iter().copied().collect()
    }

    /// Number of levels on the longest root-to-leaf path (0 when empty).
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack: Vec<(&Node<K, T>, usize)> =
            self.root.as_deref().map(|root| (root, 1)).into_iter().collect();
        while let Some((node, level)) = stack.pop() {
            deepest = deepest.max(level);
            for child in [node.left.as_deref(), node.right.as_deref()].into_iter().flatten() {
                stack.push((child, level + 1));
            }
        }
        deepest
    }
}

impl<const K: usize, T> Drop for KdTree<K, T> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<const K: usize, T> Default for KdTree<K, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const K: usize, T: Copy + Ord> FromIterator<Point<K, T>> for KdTree<K, T> {
    /// Collects with [`KdTree::build`], so the result is balanced.
    fn from_iter<I: IntoIterator<Item = Point<K, T>>>(iter: I) -> Self {
        Self::from_points(iter)
    }
}

impl<const K: usize, T: Copy + Ord> Extend<Point<K, T>> for KdTree<K, T> {
    fn extend<I: IntoIterator<Item = Point<K, T>>>(&mut self, iter: I) {
        for point in iter {
            self.insert(point);
        }
    }
}

impl<'a, const K: usize, T: Copy + Ord> IntoIterator for &'a KdTree<K, T> {
    type Item = &'a Point<K, T>;
    type IntoIter = Iter<'a, K, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Pre-order iterator over the points of a [`KdTree`].
pub struct Iter<'a, const K: usize, T> {
    stack: Vec<&'a Node<K, T>>,
    remaining: usize,
}

impl<'a, const K: usize, T> Iterator for Iter<'a, K, T> {
    type Item = &'a Point<K, T>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.right.as_deref());
        self.stack.extend(node.left.as_deref());
        self.remaining = self.remaining.saturating_sub(1);
        Some(&node.point)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<const K: usize, T> ExactSizeIterator for Iter<'_, K, T> {}

/// Nested rendering of the tree shape: `[a | b] -> ( left, right )`.
///
/// A missing left child leaves an empty slot before the comma; a missing
/// right child drops the comma.
impl<const K: usize, T: fmt::Display> fmt::Display for KdTree<K, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.root.as_deref() {
            Some(root) => write_subtree(f, root),
            None => f.write_str("(empty)"),
        }
    }
}

/// Pending output while rendering the tree shape.
enum Piece<'a, const K: usize, T> {
    Subtree(&'a Node<K, T>),
    Text(&'static str),
}

fn write_subtree<const K: usize, T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    root: &Node<K, T>,
) -> fmt::Result {
    let mut pending = vec![Piece::Subtree(root)];
    while let Some(piece) = pending.pop() {
        let node = match piece {
            Piece::Text(text) => {
                f.write_str(text)?;
                continue;
            }
            Piece::Subtree(node) => node,
        };

        f.write_str("[")?;
        for (i, coord) in node.point.iter().enumerate() {
            if i > 0 {
                f.write_str(" | ")?;
            }
            write!(f, "{}", coord)?;
        }
        f.write_str("]")?;

        if node.is_leaf() {
            continue;
        }

        // Pushed in reverse: left, then ", " and right, then the closer.
        f.write_str(" -> ( ")?;
        pending.push(Piece::Text(" )"));
        if let Some(right) = node.right.as_deref() {
            pending.push(Piece::Subtree(right));
            pending.push(Piece::Text(", "));
        }
        if let Some(left) = node.left.as_deref() {
            pending.push(Piece::Subtree(left));
        }
    }
    Ok(())
}
