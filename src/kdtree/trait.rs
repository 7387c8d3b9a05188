use geo_traits::CoordTrait;

use crate::error::{KDTreeError, Result};
use crate::kdtree::search::{KNearestVisitor, NearestVisitor, Neighbor, RadiusVisitor, RectVisitor};
use crate::kdtree::traversal::{self, search, NodeRef};
use crate::kdtree::{KDTree, KDTreeRef, Node, Point};
use crate::r#type::{IndexableFloat, IndexableSize};

/// A trait for searching and accessing data out of a KDTree.
///
/// Every query is read-only, so any number of queries may run at the same time against the same
/// tree.
pub trait KDTreeIndex<F: IndexableFloat, const D: usize, const PAD: usize, I: IndexableSize>:
    Sized
{
    /// The underlying node array of this tree, in depth-first pre-order
    fn nodes(&self) -> &[Node<F, D, PAD, I>];

    /// The number of points in this KDTree
    fn len(&self) -> usize {
        self.nodes().len()
    }

    /// Returns `true` if this KDTree holds no points
    fn is_empty(&self) -> bool {
        self.nodes().is_empty()
    }

    /// Access the node at position `index` of the node array
    fn node(&self, index: usize) -> Option<&Node<F, D, PAD, I>> {
        self.nodes().get(index)
    }

    /// Iterate over copies of every stored point, in node order
    fn points(&self) -> impl Iterator<Item = Point<F, D, PAD>> + '_ {
        self.nodes().iter().map(Node::point)
    }

    /// Access the root node of the KDTree for manual traversal.
    fn root(&self) -> Option<NodeRef<'_, F, D, PAD, I>> {
        NodeRef::from_root(self.nodes())
    }

    /// The number of levels in the tree, or 0 when it is empty.
    fn depth(&self) -> usize {
        traversal::depth(self.nodes())
    }

    /// Check the subtree sizes, balance and split axes of every node.
    fn validate(&self) -> Result<()> {
        traversal::validate(self.nodes())
    }

    /// Find the point closest to `pos`.
    ///
    /// Returns `None` when the tree is empty.
    ///
    /// ```
    /// use flat_kdtree::kdtree::{KDTree, KDTreeIndex, Point};
    ///
    /// let tree: KDTree<f64, 3> =
    ///     KDTree::from_points(&[Point::new([0., 0., 0.]), Point::new([1., 1., 1.])]);
    /// let nearest = tree.nearest(&[0.1, 0., 0.]).unwrap();
    /// assert_eq!(tree.nodes()[nearest.index].coords(), &[0., 0., 0.]);
    /// assert!((nearest.distance - 0.1).abs() < 1e-12);
    /// ```
    fn nearest(&self, pos: &[F; D]) -> Option<Neighbor<F>> {
        let nodes = self.nodes();
        if nodes.is_empty() {
            return None;
        }
        let mut visitor = NearestVisitor::new(pos);
        search(nodes, pos, &mut visitor);
        visitor.finish()
    }

    /// Find the point closest to the given coordinate.
    ///
    /// Returns `None` when the tree is empty or the coordinate does not have `D` dimensions.
    fn nearest_coord(&self, coord: &impl CoordTrait<T = F>) -> Option<Neighbor<F>> {
        let point = Point::<F, D, PAD>::from_coord(coord)?;
        self.nearest(&point.coords)
    }

    /// Find the `k` points closest to `pos`, in ascending order of distance.
    ///
    /// Returns fewer than `k` results only when the tree holds fewer than `k` points.
    fn nearest_k(&self, pos: &[F; D], k: usize) -> Vec<Neighbor<F>> {
        let nodes = self.nodes();
        if k == 0 || nodes.is_empty() {
            return vec![];
        }
        let mut visitor = KNearestVisitor::new(pos, k.min(nodes.len()));
        search(nodes, pos, &mut visitor);
        visitor.finish()
    }

    /// Find every point within `radius` of `pos`, inclusive.
    ///
    /// Results are in no particular order.
    fn nearest_radius(&self, pos: &[F; D], radius: F) -> Result<Vec<Neighbor<F>>> {
        check_radius(radius)?;
        let mut result = vec![];
        search(
            self.nodes(),
            pos,
            &mut RadiusVisitor::new(pos, radius, |index, dist: F| {
                result.push(Neighbor {
                    index,
                    distance: dist.sqrt(),
                })
            }),
        );
        Ok(result)
    }

    /// Count the points within `radius` of `pos`, inclusive, without collecting them.
    fn count_radius(&self, pos: &[F; D], radius: F) -> Result<usize> {
        check_radius(radius)?;
        let mut count = 0;
        search(
            self.nodes(),
            pos,
            &mut RadiusVisitor::new(pos, radius, |_, _| count += 1),
        );
        Ok(count)
    }

    /// Find every point strictly inside the axis-aligned box centred on `pos` with the given
    /// per-axis half-extents.
    ///
    /// Returns node indices in no particular order.
    fn nearest_rect(&self, pos: &[F; D], half_extents: &[F; D]) -> Result<Vec<usize>> {
        check_half_extents(half_extents)?;
        let mut result = vec![];
        search(
            self.nodes(),
            pos,
            &mut RectVisitor::new(pos, half_extents, |index| result.push(index)),
        );
        Ok(result)
    }

    /// Count the points strictly inside the box described as for [`KDTreeIndex::nearest_rect`].
    fn count_rect(&self, pos: &[F; D], half_extents: &[F; D]) -> Result<usize> {
        check_half_extents(half_extents)?;
        let mut count = 0;
        search(
            self.nodes(),
            pos,
            &mut RectVisitor::new(pos, half_extents, |_| count += 1),
        );
        Ok(count)
    }

    /// Run [`KDTreeIndex::nearest`] for every query position in parallel.
    #[cfg(feature = "rayon")]
    fn par_nearest(&self, queries: &[[F; D]]) -> Vec<Option<Neighbor<F>>>
    where
        Self: Sync,
    {
        use rayon::prelude::*;

        queries.par_iter().map(|pos| self.nearest(pos)).collect()
    }

    /// Run [`KDTreeIndex::nearest_k`] for every query position in parallel.
    #[cfg(feature = "rayon")]
    fn par_nearest_k(&self, queries: &[[F; D]], k: usize) -> Vec<Vec<Neighbor<F>>>
    where
        Self: Sync,
    {
        use rayon::prelude::*;

        queries.par_iter().map(|pos| self.nearest_k(pos, k)).collect()
    }
}

impl<F: IndexableFloat, const D: usize, const PAD: usize, I: IndexableSize>
    KDTreeIndex<F, D, PAD, I> for KDTree<F, D, PAD, I>
{
    fn nodes(&self) -> &[Node<F, D, PAD, I>] {
        &self.nodes
    }
}

impl<F: IndexableFloat, const D: usize, const PAD: usize, I: IndexableSize>
    KDTreeIndex<F, D, PAD, I> for KDTreeRef<'_, F, D, PAD, I>
{
    fn nodes(&self) -> &[Node<F, D, PAD, I>] {
        self.nodes
    }
}

#[inline]
fn check_radius<F: IndexableFloat>(radius: F) -> Result<()> {
    if radius >= F::zero() {
        Ok(())
    } else {
        Err(KDTreeError::InvalidRadius)
    }
}

#[inline]
fn check_half_extents<F: IndexableFloat, const D: usize>(half_extents: &[F; D]) -> Result<()> {
    match half_extents.iter().position(|h| h.is_nan() || *h < F::zero()) {
        Some(axis) => Err(KDTreeError::InvalidHalfExtent { axis }),
        None => Ok(()),
    }
}
