use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::Result;
use crate::kdtree::buffer::{decode, encode};
use crate::kdtree::builder::construct;
use crate::kdtree::traversal::validate;
use crate::kdtree::{Node, Point};
use crate::r#type::{IndexableFloat, IndexableSize};

/// An owned KDTree.
///
/// Usually this will be created from scratch via [`KDTreeBuilder`][crate::kdtree::KDTreeBuilder]
/// or [`KDTree::from_points`]. The tree is immutable between constructions: [`KDTree::construct`]
/// and [`KDTree::clear`] replace the whole structure and need exclusive access.
#[derive(Debug, Clone, PartialEq)]
pub struct KDTree<F: IndexableFloat, const D: usize, const PAD: usize = 0, I: IndexableSize = u32>
{
    pub(crate) nodes: Vec<Node<F, D, PAD, I>>,
}

impl<F: IndexableFloat, const D: usize, const PAD: usize, I: IndexableSize> KDTree<F, D, PAD, I> {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self { nodes: vec![] }
    }

    /// Build a tree from a contiguous slice of points, with pivots drawn from an entropy-seeded
    /// random source.
    pub fn from_points(points: &[Point<F, D, PAD>]) -> Self {
        Self::from_points_with_rng(points, &mut StdRng::from_entropy())
    }

    /// Build a tree from a contiguous slice of points using the provided random source.
    pub fn from_points_with_rng<R: Rng + ?Sized>(points: &[Point<F, D, PAD>], rng: &mut R) -> Self {
        let mut tree = Self::new();
        tree.construct(points, rng);
        tree
    }

    /// Rebuild this tree from `points`, replacing any prior contents.
    ///
    /// The existing node allocation is reused where possible.
    pub fn construct<R: Rng + ?Sized>(&mut self, points: &[Point<F, D, PAD>], rng: &mut R) {
        construct(&mut self.nodes, points, rng);
    }

    /// Remove every node, keeping the allocated capacity.
    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    /// The number of nodes the tree can hold without reallocating.
    pub fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    /// Borrow this tree as a [`KDTreeRef`].
    pub fn as_kdtree_ref(&self) -> KDTreeRef<'_, F, D, PAD, I> {
        KDTreeRef { nodes: &self.nodes }
    }

    /// Consume the tree, returning its node array.
    pub fn into_inner(self) -> Vec<Node<F, D, PAD, I>> {
        self.nodes
    }

    /// Serialize this tree into a self-describing byte buffer.
    pub fn to_bytes(&self) -> Vec<u8> {
        encode(&self.nodes)
    }

    /// Load a tree previously written by [`KDTree::to_bytes`].
    ///
    /// The header must match this tree's coordinate type, dimension, payload size and node size
    /// type, and the decoded nodes must form a valid balanced tree.
    pub fn try_from_bytes(data: &[u8]) -> Result<Self> {
        Ok(Self {
            nodes: decode(data)?,
        })
    }
}

impl<F: IndexableFloat, const D: usize, const PAD: usize, I: IndexableSize> Default
    for KDTree<F, D, PAD, I>
{
    fn default() -> Self {
        Self::new()
    }
}

impl<F: IndexableFloat, const D: usize, const PAD: usize, I: IndexableSize>
    FromIterator<Point<F, D, PAD>> for KDTree<F, D, PAD, I>
{
    fn from_iter<T: IntoIterator<Item = Point<F, D, PAD>>>(iter: T) -> Self {
        let points: Vec<_> = iter.into_iter().collect();
        Self::from_points(&points)
    }
}

/// A reference on an external node array.
///
/// Usually this will be created from a [`KDTree`] via its
/// [`as_kdtree_ref`][KDTree::as_kdtree_ref] method, but it can also wrap any node slice that
/// passes validation. It is `Copy`, so it can be handed to many query threads at once.
#[derive(Debug, PartialEq)]
pub struct KDTreeRef<'a, F: IndexableFloat, const D: usize, const PAD: usize = 0, I: IndexableSize = u32>
{
    pub(crate) nodes: &'a [Node<F, D, PAD, I>],
}

impl<F: IndexableFloat, const D: usize, const PAD: usize, I: IndexableSize> Clone
    for KDTreeRef<'_, F, D, PAD, I>
{
    fn clone(&self) -> Self {
        *self
    }
}

impl<F: IndexableFloat, const D: usize, const PAD: usize, I: IndexableSize> Copy
    for KDTreeRef<'_, F, D, PAD, I>
{
}

impl<'a, F: IndexableFloat, const D: usize, const PAD: usize, I: IndexableSize>
    KDTreeRef<'a, F, D, PAD, I>
{
    /// Wrap a node slice, checking that it is a balanced tree in depth-first pre-order.
    pub fn try_new(nodes: &'a [Node<F, D, PAD, I>]) -> Result<Self> {
        validate(nodes)?;
        Ok(Self { nodes })
    }
}
