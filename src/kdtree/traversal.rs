//! Utilities to traverse the KDTree structure.
//!
//! Every query is built on one iterative primitive: walk down from a subtree root towards the
//! query position, remembering the skipped sibling of every node passed, then pop those
//! `(parent, sibling)` pairs and only descend into siblings that a single-axis bound cannot rule
//! out.

use tinyvec::TinyVec;

use crate::error::{KDTreeError, Result};
use crate::kdtree::Node;
use crate::r#type::{IndexableFloat, IndexableSize};

/// Pending `(parent, sibling)` pairs. The sibling is `None` when the parent has only a left
/// child.
type TraversalStack = TinyVec<[(usize, Option<usize>); 64]>;

/// The per-query policy plugged into [`search`].
pub(crate) trait Visitor<F: IndexableFloat, const D: usize> {
    /// Whether a node whose split plane lies `delta` away from the query along `axis` may still
    /// hold a match, and so may the subtree on the far side of that plane.
    fn accepts(&self, axis: usize, delta: F) -> bool;

    /// Evaluate the point stored at node `index`.
    fn visit(&mut self, index: usize, coords: &[F; D]);
}

/// Run a backtracking search over a pre-order node array.
pub(crate) fn search<F, const D: usize, const PAD: usize, I, V>(
    nodes: &[Node<F, D, PAD, I>],
    query: &[F; D],
    visitor: &mut V,
) where
    F: IndexableFloat,
    I: IndexableSize,
    V: Visitor<F, D>,
{
    if nodes.is_empty() {
        return;
    }

    let mut stack = TraversalStack::new();
    let leaf = walk_down(nodes, query, 0, &mut stack);
    visitor.visit(leaf, &nodes[leaf].coords);

    while let Some((parent, sibling)) = stack.pop() {
        let node = &nodes[parent];
        let axis = node.axis();
        let delta = query[axis] - node.coords[axis];
        if !visitor.accepts(axis, delta) {
            continue;
        }

        visitor.visit(parent, &node.coords);

        // visiting the parent may have tightened the threshold
        if let Some(sibling) = sibling.filter(|_| visitor.accepts(axis, delta)) {
            let leaf = walk_down(nodes, query, sibling, &mut stack);
            visitor.visit(leaf, &nodes[leaf].coords);
        }
    }
}

/// Descend from `index` to a leaf, always taking the child on the query's side of each split.
/// Returns the index of the leaf reached.
#[inline]
fn walk_down<F, const D: usize, const PAD: usize, I>(
    nodes: &[Node<F, D, PAD, I>],
    query: &[F; D],
    mut index: usize,
    stack: &mut TraversalStack,
) -> usize
where
    F: IndexableFloat,
    I: IndexableSize,
{
    loop {
        let node = &nodes[index];
        let size = node.size();
        if size <= 1 {
            return index;
        }

        let left = index + 1;
        let left_size = nodes[left].size();
        if left_size + 1 < size {
            let right = left + left_size;
            let axis = node.axis();
            if query[axis] < node.coords[axis] {
                stack.push((index, Some(right)));
                index = left;
            } else {
                stack.push((index, Some(left)));
                index = right;
            }
        } else {
            stack.push((index, None));
            index = left;
        }
    }
}

/// A node in the KDTree, for manual traversal.
#[derive(Debug)]
pub struct NodeRef<'a, F: IndexableFloat, const D: usize, const PAD: usize, I: IndexableSize> {
    nodes: &'a [Node<F, D, PAD, I>],
    index: usize,
}

impl<F: IndexableFloat, const D: usize, const PAD: usize, I: IndexableSize> Clone
    for NodeRef<'_, F, D, PAD, I>
{
    fn clone(&self) -> Self {
        *self
    }
}

impl<F: IndexableFloat, const D: usize, const PAD: usize, I: IndexableSize> Copy
    for NodeRef<'_, F, D, PAD, I>
{
}

impl<'a, F: IndexableFloat, const D: usize, const PAD: usize, I: IndexableSize>
    NodeRef<'a, F, D, PAD, I>
{
    pub(crate) fn from_root(nodes: &'a [Node<F, D, PAD, I>]) -> Option<Self> {
        if nodes.is_empty() {
            None
        } else {
            Some(Self { nodes, index: 0 })
        }
    }

    /// The position of this node in the flat node array.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// The node record itself.
    #[inline]
    pub fn node(&self) -> &'a Node<F, D, PAD, I> {
        &self.nodes[self.index]
    }

    /// Returns `true` if this is a leaf node without children.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.node().size() <= 1
    }

    /// The child holding points that are no larger on this node's axis.
    pub fn left_child(&self) -> Option<Self> {
        if self.is_leaf() {
            return None;
        }
        Some(Self {
            nodes: self.nodes,
            index: self.index + 1,
        })
    }

    /// The child holding points that are no smaller on this node's axis.
    ///
    /// A node with two points has only a left child.
    pub fn right_child(&self) -> Option<Self> {
        let left = self.left_child()?;
        let left_size = left.node().size();
        if left_size + 1 < self.node().size() {
            Some(Self {
                nodes: self.nodes,
                index: left.index + left_size,
            })
        } else {
            None
        }
    }
}

/// The number of levels in the tree, 0 for an empty tree.
pub(crate) fn depth<F, const D: usize, const PAD: usize, I>(nodes: &[Node<F, D, PAD, I>]) -> usize
where
    F: IndexableFloat,
    I: IndexableSize,
{
    let mut stack: TinyVec<[(usize, usize); 64]> = TinyVec::new();
    let mut max_depth = 0;
    if let Some(root) = NodeRef::from_root(nodes) {
        stack.push((root.index(), 1));
    }
    while let Some((index, level)) = stack.pop() {
        max_depth = max_depth.max(level);
        let node = NodeRef { nodes, index };
        if let Some(left) = node.left_child() {
            stack.push((left.index(), level + 1));
        }
        if let Some(right) = node.right_child() {
            stack.push((right.index(), level + 1));
        }
    }
    max_depth
}

/// Check that `nodes` is a balanced tree in depth-first pre-order.
pub(crate) fn validate<F, const D: usize, const PAD: usize, I>(
    nodes: &[Node<F, D, PAD, I>],
) -> Result<()>
where
    F: IndexableFloat,
    I: IndexableSize,
{
    let Some(root) = nodes.first() else {
        return Ok(());
    };
    if root.size() != nodes.len() {
        return Err(KDTreeError::InvalidTree(format!(
            "Root size is {} but the tree has {} nodes.",
            root.size(),
            nodes.len()
        )));
    }

    for (index, node) in nodes.iter().enumerate() {
        let size = node.size();
        if size == 0 || index + size > nodes.len() {
            return Err(KDTreeError::InvalidTree(format!(
                "Node {} has out of range size {}.",
                index, size
            )));
        }
        if size == 1 {
            continue;
        }
        if node.axis() >= D {
            return Err(KDTreeError::InvalidTree(format!(
                "Node {} splits on axis {} of a {}-dimensional tree.",
                index,
                node.axis(),
                D
            )));
        }

        let left_size = nodes[index + 1].size();
        if left_size + 1 > size {
            return Err(KDTreeError::InvalidTree(format!(
                "Left child of node {} is larger than the node.",
                index
            )));
        }
        let right_size = size - 1 - left_size;
        if right_size > 0 && nodes[index + 1 + left_size].size() != right_size {
            return Err(KDTreeError::InvalidTree(format!(
                "Children of node {} do not add up to its size {}.",
                index, size
            )));
        }
        if left_size < right_size || left_size > right_size + 1 {
            return Err(KDTreeError::InvalidTree(format!(
                "Node {} is unbalanced: left {} right {}.",
                index, left_size, right_size
            )));
        }
    }
    Ok(())
}
