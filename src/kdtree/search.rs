//! Threshold policies for each query kind, plugged into the shared traversal.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::kdtree::point::{in_box, sq_dist};
use crate::kdtree::traversal::Visitor;
use crate::r#type::IndexableFloat;

/// A query result: the position of a node in the tree and its distance from the query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor<F: IndexableFloat> {
    /// Index into the tree's node array
    pub index: usize,
    /// Euclidean distance from the query position
    pub distance: F,
}

/// Keeps the single closest point.
pub(crate) struct NearestVisitor<'q, F: IndexableFloat, const D: usize> {
    query: &'q [F; D],
    best: Option<usize>,
    best_dist: F,
}

impl<'q, F: IndexableFloat, const D: usize> NearestVisitor<'q, F, D> {
    pub(crate) fn new(query: &'q [F; D]) -> Self {
        Self {
            query,
            best: None,
            best_dist: F::infinity(),
        }
    }

    pub(crate) fn finish(self) -> Option<Neighbor<F>> {
        self.best.map(|index| Neighbor {
            index,
            distance: self.best_dist.sqrt(),
        })
    }
}

impl<F: IndexableFloat, const D: usize> Visitor<F, D> for NearestVisitor<'_, F, D> {
    #[inline]
    fn accepts(&self, _axis: usize, delta: F) -> bool {
        delta * delta < self.best_dist
    }

    #[inline]
    fn visit(&mut self, index: usize, coords: &[F; D]) {
        let dist = sq_dist(self.query, coords);
        if dist < self.best_dist || self.best.is_none() {
            self.best = Some(index);
            self.best_dist = dist;
        }
    }
}

/// A wrapper around a node and its squared distance for use in the bounded max-heap.
#[derive(Debug, Clone, Copy, PartialEq)]
struct NeighborNode<F: IndexableFloat> {
    index: usize,
    dist: F,
}

impl<F: IndexableFloat> Eq for NeighborNode<F> {}

impl<F: IndexableFloat> Ord for NeighborNode<F> {
    fn cmp(&self, other: &Self) -> Ordering {
        // NaN distances compare equal so that they never panic inside the heap
        self.dist
            .partial_cmp(&other.dist)
            .unwrap_or(Ordering::Equal)
            .then(self.index.cmp(&other.index))
    }
}

impl<F: IndexableFloat> PartialOrd for NeighborNode<F> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Keeps the `k` closest points in a max-heap whose top is the current worst.
pub(crate) struct KNearestVisitor<'q, F: IndexableFloat, const D: usize> {
    query: &'q [F; D],
    k: usize,
    heap: BinaryHeap<NeighborNode<F>>,
}

impl<'q, F: IndexableFloat, const D: usize> KNearestVisitor<'q, F, D> {
    pub(crate) fn new(query: &'q [F; D], k: usize) -> Self {
        Self {
            query,
            k,
            heap: BinaryHeap::with_capacity(k),
        }
    }

    #[inline]
    fn threshold(&self) -> F {
        if self.heap.len() < self.k {
            F::infinity()
        } else {
            self.heap.peek().map_or(F::infinity(), |worst| worst.dist)
        }
    }

    /// The collected neighbors in ascending order of distance.
    pub(crate) fn finish(self) -> Vec<Neighbor<F>> {
        self.heap
            .into_sorted_vec()
            .into_iter()
            .map(|item| Neighbor {
                index: item.index,
                distance: item.dist.sqrt(),
            })
            .collect()
    }
}

impl<F: IndexableFloat, const D: usize> Visitor<F, D> for KNearestVisitor<'_, F, D> {
    #[inline]
    fn accepts(&self, _axis: usize, delta: F) -> bool {
        // delta² may overflow to infinity, so an unfilled heap must not rely on `< inf`
        self.heap.len() < self.k || delta * delta < self.threshold()
    }

    #[inline]
    fn visit(&mut self, index: usize, coords: &[F; D]) {
        let dist = sq_dist(self.query, coords);
        if self.heap.len() < self.k {
            self.heap.push(NeighborNode { index, dist });
        } else if dist < self.threshold() {
            self.heap.pop();
            self.heap.push(NeighborNode { index, dist });
        }
    }
}

/// Reports every point within a fixed squared radius.
pub(crate) struct RadiusVisitor<'q, F: IndexableFloat, const D: usize, M> {
    query: &'q [F; D],
    radius_sq: F,
    on_match: M,
}

impl<'q, F: IndexableFloat, const D: usize, M: FnMut(usize, F)> RadiusVisitor<'q, F, D, M> {
    /// `on_match` receives the node index and squared distance of every match.
    pub(crate) fn new(query: &'q [F; D], radius: F, on_match: M) -> Self {
        Self {
            query,
            radius_sq: radius * radius,
            on_match,
        }
    }
}

impl<F: IndexableFloat, const D: usize, M: FnMut(usize, F)> Visitor<F, D>
    for RadiusVisitor<'_, F, D, M>
{
    #[inline]
    fn accepts(&self, _axis: usize, delta: F) -> bool {
        delta * delta <= self.radius_sq
    }

    #[inline]
    fn visit(&mut self, index: usize, coords: &[F; D]) {
        let dist = sq_dist(self.query, coords);
        if dist <= self.radius_sq {
            (self.on_match)(index, dist);
        }
    }
}

/// Reports every point strictly inside an axis-aligned box around the query.
pub(crate) struct RectVisitor<'q, F: IndexableFloat, const D: usize, M> {
    query: &'q [F; D],
    half_extents: &'q [F; D],
    on_match: M,
}

impl<'q, F: IndexableFloat, const D: usize, M: FnMut(usize)> RectVisitor<'q, F, D, M> {
    pub(crate) fn new(query: &'q [F; D], half_extents: &'q [F; D], on_match: M) -> Self {
        Self {
            query,
            half_extents,
            on_match,
        }
    }
}

impl<F: IndexableFloat, const D: usize, M: FnMut(usize)> Visitor<F, D>
    for RectVisitor<'_, F, D, M>
{
    #[inline]
    fn accepts(&self, axis: usize, delta: F) -> bool {
        delta.abs() < self.half_extents[axis]
    }

    #[inline]
    fn visit(&mut self, index: usize, coords: &[F; D]) {
        if in_box(coords, self.query, self.half_extents) {
            (self.on_match)(index);
        }
    }
}
