//! Shared fixtures for the tests in this crate.

use rand::Rng;

use crate::kdtree::{KDTreeIndex, Point};
use crate::r#type::{IndexableFloat, IndexableSize};

/// `n` points uniformly spread over `[-100, 100)^D`, each carrying its insertion index as a
/// little-endian payload.
pub(crate) fn random_points<const D: usize>(rng: &mut impl Rng, n: usize) -> Vec<Point<f64, D, 4>> {
    (0..n)
        .map(|i| {
            let mut coords = [0.; D];
            for c in coords.iter_mut() {
                *c = rng.gen_range(-100.0..100.0);
            }
            Point::with_payload(coords, (i as u32).to_le_bytes())
        })
        .collect()
}

/// A random query position that is sometimes outside the point cloud.
pub(crate) fn random_query<const D: usize>(rng: &mut impl Rng) -> [f64; D] {
    let mut pos = [0.; D];
    for c in pos.iter_mut() {
        *c = rng.gen_range(-120.0..120.0);
    }
    pos
}

pub(crate) fn sq_dist<const D: usize>(a: &[f64; D], b: &[f64; D]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// Squared distances from `pos` to every point, ascending.
pub(crate) fn brute_force_sq_dists<const D: usize, const PAD: usize>(
    points: &[Point<f64, D, PAD>],
    pos: &[f64; D],
) -> Vec<f64> {
    let mut dists: Vec<f64> = points.iter().map(|p| sq_dist(&p.coords, pos)).collect();
    dists.sort_by(|a, b| a.partial_cmp(b).unwrap());
    dists
}

/// Assert the size and balance invariants on every node by walking the implicit layout.
pub(crate) fn assert_balanced<F, const D: usize, const PAD: usize, I, T>(tree: &T)
where
    F: IndexableFloat,
    I: IndexableSize,
    T: KDTreeIndex<F, D, PAD, I>,
{
    let Some(root) = tree.root() else {
        assert!(tree.is_empty());
        return;
    };
    assert_eq!(root.node().size(), tree.len(), "root spans the whole tree");

    let mut stack = vec![root];
    let mut visited = 0;
    while let Some(node) = stack.pop() {
        visited += 1;
        let size = node.node().size();
        let left = node.left_child().map_or(0, |n| n.node().size());
        let right = node.right_child().map_or(0, |n| n.node().size());
        if node.is_leaf() {
            assert_eq!(size, 1, "leaves hold one point");
        } else {
            assert_eq!(size, 1 + left + right, "size adds up at node {}", node.index());
            assert!(left >= right && left <= right + 1, "balanced at node {}", node.index());
        }
        stack.extend(node.left_child());
        stack.extend(node.right_child());
    }
    assert_eq!(visited, tree.len(), "every node reachable exactly once");
}
