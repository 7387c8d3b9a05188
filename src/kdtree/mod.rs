//! An implementation of a static, pointer-free K-D Tree over `D`-dimensional points.
//!
//! The tree is one flat array of [`Node`]s in depth-first pre-order. Each node stores the size of
//! its subtree, which is all that is needed to find its children: the left child directly follows
//! its parent and the right child directly follows the left subtree.

#![warn(missing_docs)]

mod buffer;
mod builder;
pub(crate) mod constants;
mod index;
mod node;
mod point;
mod search;
mod r#trait;
mod traversal;

pub use builder::KDTreeBuilder;
pub use index::{KDTree, KDTreeRef};
pub use node::Node;
pub use point::Point;
pub use r#trait::KDTreeIndex;
pub use search::Neighbor;
pub use traversal::NodeRef;
