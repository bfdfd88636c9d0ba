//! Balanced bulk construction.
//!
//! Spans of the input are partitioned around their median from an explicit
//! work list, so a span that cannot be split (a run of equal points, which
//! must all go right of each other) costs no stack depth.

use super::node::{Link, Node};
use super::Point;

/// Where a finished node hangs in the layout.
#[derive(Debug, Clone, Copy)]
enum Parent {
    Root,
    Left(usize),
    Right(usize),
}

/// Unsplit part of the input, `points[start..end]`, placed at `depth`.
#[derive(Debug)]
struct Span {
    start: usize,
    end: usize,
    depth: usize,
    parent: Parent,
}

/// Tree shape by index. Children always sit after their parent.
struct Layout<const K: usize, T> {
    points: Vec<Point<K, T>>,
    children: Vec<(Option<usize>, Option<usize>)>,
}

impl<const K: usize, T> Layout<K, T> {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            points: Vec::with_capacity(capacity),
            children: Vec::with_capacity(capacity),
        }
    }

    fn push(&mut self, point: Point<K, T>, parent: Parent) -> usize {
        let index = self.points.len();
        self.points.push(point);
        self.children.push((None, None));
        match parent {
            Parent::Root => {}
            Parent::Left(p) => self.children[p].0 = Some(index),
            Parent::Right(p) => self.children[p].1 = Some(index),
        }
        index
    }

    /// Assemble boxed nodes from the leaves up.
    fn into_link(self) -> Link<K, T> {
        let mut links: Vec<Link<K, T>> = Vec::with_capacity(self.points.len());
        links.resize_with(self.points.len(), || None);

        let nodes = self.points.into_iter().zip(self.children).enumerate().rev();
        for (index, (point, (left, right))) in nodes {
            let left = left.and_then(|i| links[i].take());
            let right = right.and_then(|i| links[i].take());
            links[index] = Some(Box::new(Node { point, left, right }));
        }
        links.into_iter().next().flatten()
    }
}

/// Build a balanced subtree over `points`, reordering them in place.
pub(super) fn balanced<const K: usize, T: Copy + Ord>(points: &mut [Point<K, T>]) -> Link<K, T> {
    let mut layout = Layout::with_capacity(points.len());
    let mut pending = vec![Span {
        start: 0,
        end: points.len(),
        depth: 0,
        parent: Parent::Root,
    }];

    while let Some(span) = pending.pop() {
        if span.start == span.end {
            continue;
        }

        let part = &mut points[span.start..span.end];
        let split = median_split(part, span.depth % K);

        // Nothing below the median and every point equal: the span can only
        // be a right-leaning chain.
        if split == 0 && part.iter().all(|p| *p == part[0]) {
            let mut parent = span.parent;
            for point in part.iter() {
                parent = Parent::Right(layout.push(*point, parent));
            }
            continue;
        }

        let index = layout.push(part[split], span.parent);
        let at = span.start + split;
        pending.push(Span {
            start: at + 1,
            end: span.end,
            depth: span.depth + 1,
            parent: Parent::Right(index),
        });
        pending.push(Span {
            start: span.start,
            end: at,
            depth: span.depth + 1,
            parent: Parent::Left(index),
        });
    }

    layout.into_link()
}

/// Place the median along `axis` at the returned index, with everything
/// strictly smaller before it and everything equal or larger after it.
///
/// Points equal to the median end up after it, so the node taken is the
/// first of its tie run.
fn median_split<const K: usize, T: Copy + Ord>(points: &mut [Point<K, T>], axis: usize) -> usize {
    let mid = points.len() / 2;
    let (below, median, _) = points.select_nth_unstable_by_key(mid, |p| p[axis]);
    let pivot = median[axis];

    let split = partition_below(below, axis, pivot);
    points.swap(split, mid);
    split
}

/// Move every point whose `axis` coordinate is below `pivot` to the front.
/// Returns how many were moved.
fn partition_below<const K: usize, T: Copy + Ord>(
    points: &mut [Point<K, T>],
    axis: usize,
    pivot: T,
) -> usize {
    let mut split = 0;
    for i in 0..points.len() {
        if points[i][axis] < pivot {
            points.swap(i, split);
            split += 1;
        }
    }
    split
}
