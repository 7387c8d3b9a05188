use crate::kdtree::Point;
use crate::r#type::{IndexableFloat, IndexableSize};

/// One entry of the flat tree array.
///
/// Nodes are laid out in depth-first pre-order. The left child of an internal node at `i` is at
/// `i + 1`, and its right child, when present, directly follows the left subtree at
/// `i + 1 + left.size()`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node<F: IndexableFloat, const D: usize, const PAD: usize = 0, I: IndexableSize = u32> {
    pub(crate) size: I,
    pub(crate) axis: u16,
    pub(crate) coords: [F; D],
    pub(crate) payload: [u8; PAD],
}

impl<F: IndexableFloat, const D: usize, const PAD: usize, I: IndexableSize> Node<F, D, PAD, I> {
    #[inline]
    pub(crate) fn new(size: I, axis: usize, point: &Point<F, D, PAD>) -> Self {
        Self {
            size,
            axis: axis as u16,
            coords: point.coords,
            payload: point.payload,
        }
    }

    /// The number of points in the subtree rooted at this node, including itself.
    #[inline]
    pub fn size(&self) -> usize {
        self.size.as_usize()
    }

    /// The coordinate axis that separates this node's children.
    ///
    /// Only meaningful for internal nodes.
    #[inline]
    pub fn axis(&self) -> usize {
        self.axis as usize
    }

    /// The coordinates of the point stored at this node.
    #[inline]
    pub fn coords(&self) -> &[F; D] {
        &self.coords
    }

    /// The payload of the point stored at this node.
    #[inline]
    pub fn payload(&self) -> &[u8; PAD] {
        &self.payload
    }

    /// Returns `true` if this node has no children.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.size() == 1
    }

    /// A copy of the point stored at this node.
    pub fn point(&self) -> Point<F, D, PAD> {
        Point::with_payload(self.coords, self.payload)
    }
}
