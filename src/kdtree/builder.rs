use std::marker::PhantomData;

use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tinyvec::TinyVec;

use crate::indices::PointIndices;
use crate::kdtree::{KDTree, Node, Point};
use crate::r#type::{IndexableFloat, IndexableSize};

/// A builder to create a [`KDTree`] from an arbitrary sequence of points.
///
/// ```
/// use flat_kdtree::kdtree::{KDTree, KDTreeBuilder, KDTreeIndex, Point};
///
/// let mut builder: KDTreeBuilder<f64, 2> = KDTreeBuilder::from_seed(0);
/// builder.add(Point::new([0., 0.]));
/// builder.add(Point::new([1., 1.]));
/// builder.add(Point::new([2., 2.]));
/// let tree = builder.finish();
///
/// let nearest = tree.nearest(&[1.8, 1.9]).unwrap();
/// assert_eq!(tree.nodes()[nearest.index].coords(), &[2., 2.]);
/// ```
#[derive(Debug, Clone)]
pub struct KDTreeBuilder<
    F: IndexableFloat,
    const D: usize,
    const PAD: usize = 0,
    I: IndexableSize = u32,
    R = StdRng,
> {
    points: Vec<Point<F, D, PAD>>,
    rng: R,
    phantom: PhantomData<I>,
}

impl<F: IndexableFloat, const D: usize, const PAD: usize, I: IndexableSize>
    KDTreeBuilder<F, D, PAD, I, StdRng>
{
    /// Create a new builder whose random source is seeded from the operating system.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Create a new builder with room for `num_items` points.
    pub fn with_capacity(num_items: usize) -> Self {
        let mut builder = Self::new();
        builder.points.reserve(num_items);
        builder
    }

    /// Create a new builder with a seeded random source, so that the shape of the finished tree
    /// is reproducible.
    pub fn from_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl<F: IndexableFloat, const D: usize, const PAD: usize, I: IndexableSize> Default
    for KDTreeBuilder<F, D, PAD, I, StdRng>
{
    fn default() -> Self {
        Self::new()
    }
}

impl<F: IndexableFloat, const D: usize, const PAD: usize, I: IndexableSize, R: Rng>
    KDTreeBuilder<F, D, PAD, I, R>
{
    /// Create a new builder that draws partition pivots from the provided random source.
    pub fn with_rng(rng: R) -> Self {
        Self {
            points: vec![],
            rng,
            phantom: PhantomData,
        }
    }

    /// Add a point to the builder.
    ///
    /// This returns the insertion index of the point.
    #[inline]
    pub fn add(&mut self, point: Point<F, D, PAD>) -> usize {
        self.points.push(point);
        self.points.len() - 1
    }

    /// Add a point with a zeroed payload.
    #[inline]
    pub fn add_coords(&mut self, coords: [F; D]) -> usize {
        self.add(Point::new(coords))
    }

    /// The number of points added so far.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns `true` if no points have been added.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Consume this builder, partitioning the points and generating a KDTree ready for queries.
    pub fn finish(mut self) -> KDTree<F, D, PAD, I> {
        let mut nodes = Vec::new();
        construct(&mut nodes, &self.points, &mut self.rng);
        KDTree { nodes }
    }
}

impl<F: IndexableFloat, const D: usize, const PAD: usize, I: IndexableSize, R: Rng>
    Extend<Point<F, D, PAD>> for KDTreeBuilder<F, D, PAD, I, R>
{
    fn extend<T: IntoIterator<Item = Point<F, D, PAD>>>(&mut self, iter: T) {
        self.points.extend(iter);
    }
}

/// Pending `(begin, end)` ranges whose subtrees have not been emitted yet.
///
/// A balanced tree over `usize` points is at most 64 levels deep, so this never spills to the
/// heap.
type PendingRanges = TinyVec<[(usize, usize); 64]>;

/// Replace the contents of `nodes` with a balanced tree over `points` in depth-first pre-order.
pub(crate) fn construct<F, const D: usize, const PAD: usize, I, R>(
    nodes: &mut Vec<Node<F, D, PAD, I>>,
    points: &[Point<F, D, PAD>],
    rng: &mut R,
) where
    F: IndexableFloat,
    I: IndexableSize,
    R: Rng + ?Sized,
{
    assert!(D > 0, "Points must have at least one dimension.");
    assert!(
        D <= u16::MAX as usize,
        "Points may have at most {} dimensions.",
        u16::MAX
    );
    let num_items = points.len();
    assert!(
        I::from_usize(num_items).is_some(),
        "{} points do not fit in the node size type.",
        num_items
    );

    nodes.clear();
    if num_items == 0 {
        return;
    }
    nodes.reserve(num_items);

    let mut ids = PointIndices::new(num_items);
    debug_assert_eq!(ids.len(), num_items);

    let mut pending = PendingRanges::new();
    let mut max_pending = 0;
    let mut lo = 0;
    let mut hi = num_items;

    while lo != hi {
        let axis = widest_axis(points, &ids, lo, hi);
        let mid = lo + (hi - lo) / 2;

        // put the median on the split axis at `mid`, with smaller values before it and larger
        // values after it
        select(&mut ids, points, mid, lo, hi - 1, axis, rng);

        // every subtree is no larger than the whole input, which fits in `I`
        let size = I::from_usize(hi - lo).unwrap_or_else(I::max_value);
        nodes.push(Node::new(size, axis, &points[ids.get(mid)]));

        if lo != mid {
            // descend left now, come back for the right half later
            if mid + 1 != hi {
                pending.push((mid + 1, hi));
                max_pending = max_pending.max(pending.len());
            }
            hi = mid;
        } else if let Some((next_lo, next_hi)) = pending.pop() {
            lo = next_lo;
            hi = next_hi;
        } else {
            lo = hi;
        }
    }

    debug!(
        "Built kd-tree of {} nodes ({} byte working indices, {} max pending ranges)",
        nodes.len(),
        ids.bytes_per_element(),
        max_pending
    );
}

/// The dimension with the largest spread over `ids[lo..hi]`. Ties go to the lowest dimension.
fn widest_axis<F: IndexableFloat, const D: usize, const PAD: usize>(
    points: &[Point<F, D, PAD>],
    ids: &PointIndices,
    lo: usize,
    hi: usize,
) -> usize {
    if hi - lo < 2 {
        return 0;
    }

    let mut min = [F::infinity(); D];
    let mut max = [F::neg_infinity(); D];
    for i in lo..hi {
        let coords = &points[ids.get(i)].coords;
        for axis in 0..D {
            if coords[axis] < min[axis] {
                min[axis] = coords[axis];
            }
            if coords[axis] > max[axis] {
                max[axis] = coords[axis];
            }
        }
    }

    let mut best_axis = 0;
    let mut best_spread = F::neg_infinity();
    for axis in 0..D {
        let spread = max[axis] - min[axis];
        if spread > best_spread {
            best_axis = axis;
            best_spread = spread;
        }
    }
    best_axis
}

/// Randomized Hoare selection: reorder `ids[left..=right]` so that `ids[k]` is the k-th smallest
/// on `axis`, `[left..k-1]` items are no larger and `[k+1..=right]` items are no smaller.
#[inline]
fn select<F, const D: usize, const PAD: usize, R>(
    ids: &mut PointIndices,
    points: &[Point<F, D, PAD>],
    k: usize,
    mut left: usize,
    mut right: usize,
    axis: usize,
    rng: &mut R,
) where
    F: IndexableFloat,
    R: Rng + ?Sized,
{
    let value = |ids: &PointIndices, i: usize| points[ids.get(i)].coords[axis];

    while right > left {
        ids.swap(rng.gen_range(left..=right), k);
        let t = value(ids, k);
        let mut i = left;
        let mut j = right;

        ids.swap(left, k);
        if value(ids, right) > t {
            ids.swap(left, right);
        }

        while i < j {
            ids.swap(i, j);
            i += 1;
            j -= 1;
            while value(ids, i) < t {
                i += 1;
            }
            while value(ids, j) > t {
                j -= 1;
            }
        }

        if value(ids, left) == t {
            ids.swap(left, j);
        } else {
            j += 1;
            ids.swap(j, right);
        }

        // j now holds the pivot in its final position
        match j.cmp(&k) {
            std::cmp::Ordering::Less => left = j + 1,
            std::cmp::Ordering::Greater => right = j - 1,
            std::cmp::Ordering::Equal => break,
        }
    }
}

#[cfg(test)]
mod test {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::{select, widest_axis};
    use crate::indices::PointIndices;
    use crate::kdtree::Point;

    #[test]
    fn widest_axis_prefers_largest_spread() {
        let points: Vec<Point<f64, 3>> = vec![
            Point::new([0., 0., 0.]),
            Point::new([1., 5., 2.]),
            Point::new([2., -1., 1.]),
        ];
        let ids = PointIndices::new(points.len());
        assert_eq!(widest_axis(&points, &ids, 0, 3), 1);
    }

    #[test]
    fn widest_axis_ties_go_to_first_dimension() {
        let points: Vec<Point<f64, 3>> = vec![Point::new([0., 0., 0.]), Point::new([1., 1., 1.])];
        let ids = PointIndices::new(points.len());
        assert_eq!(widest_axis(&points, &ids, 0, 2), 0);
    }

    #[test]
    fn select_places_median() {
        let mut rng = StdRng::seed_from_u64(7);
        for n in 1..60 {
            let points: Vec<Point<f64, 2>> = (0..n)
                .map(|_| Point::new([rng.gen_range(0..10) as f64, rng.gen()]))
                .collect();
            let mut ids = PointIndices::new(n);
            let k = n / 2;
            select(&mut ids, &points, k, 0, n - 1, 0, &mut rng);

            let pivot = points[ids.get(k)].coords[0];
            for i in 0..k {
                assert!(points[ids.get(i)].coords[0] <= pivot);
            }
            for i in k + 1..n {
                assert!(points[ids.get(i)].coords[0] >= pivot);
            }

            let mut seen: Vec<usize> = (0..n).map(|i| ids.get(i)).collect();
            seen.sort();
            assert_eq!(seen, (0..n).collect::<Vec<_>>(), "ids stay a permutation");
        }
    }
}
