//! Points handed to the builder.

use geo_traits::{CoordTrait, Dimensions};

use crate::r#type::IndexableFloat;

/// A `D`-dimensional point carrying `PAD` bytes of caller-defined payload.
///
/// The payload travels with the point into the tree but is never interpreted by it. A common use
/// is storing the point's position in some external collection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point<F: IndexableFloat, const D: usize, const PAD: usize = 0> {
    /// The coordinates of this point
    pub coords: [F; D],
    /// Opaque payload bytes
    pub payload: [u8; PAD],
}

impl<F: IndexableFloat, const D: usize, const PAD: usize> Point<F, D, PAD> {
    /// Create a new point with a zeroed payload.
    pub fn new(coords: [F; D]) -> Self {
        Self {
            coords,
            payload: [0; PAD],
        }
    }

    /// Create a new point with the given payload.
    pub fn with_payload(coords: [F; D], payload: [u8; PAD]) -> Self {
        Self { coords, payload }
    }

    /// Create a point from any coordinate whose dimension matches `D`.
    ///
    /// Returns `None` when the dimensions differ.
    pub fn from_coord(coord: &impl CoordTrait<T = F>) -> Option<Self> {
        if coord.dim().size() != D {
            return None;
        }
        let mut coords = [F::zero(); D];
        for (i, c) in coords.iter_mut().enumerate() {
            *c = coord.nth_or_panic(i);
        }
        Some(Self::new(coords))
    }
}

impl<F: IndexableFloat, const D: usize, const PAD: usize> From<[F; D]> for Point<F, D, PAD> {
    fn from(coords: [F; D]) -> Self {
        Self::new(coords)
    }
}

impl<F: IndexableFloat, const D: usize, const PAD: usize> CoordTrait for Point<F, D, PAD> {
    type T = F;

    fn dim(&self) -> Dimensions {
        match D {
            2 => Dimensions::Xy,
            3 => Dimensions::Xyz,
            n => Dimensions::Unknown(n),
        }
    }

    fn x(&self) -> Self::T {
        self.coords[0]
    }

    fn y(&self) -> Self::T {
        self.coords[1]
    }

    fn nth_or_panic(&self, n: usize) -> Self::T {
        self.coords[n]
    }
}

/// Squared Euclidean distance between two coordinate vectors.
#[inline]
pub(crate) fn sq_dist<F: IndexableFloat, const D: usize>(a: &[F; D], b: &[F; D]) -> F {
    a.iter().zip(b.iter()).fold(F::zero(), |acc, (&x, &y)| {
        let d = x - y;
        acc + d * d
    })
}

/// Whether `point` lies strictly inside the open box centred on `center` with the given
/// half-extents.
#[inline]
pub(crate) fn in_box<F: IndexableFloat, const D: usize>(
    point: &[F; D],
    center: &[F; D],
    half_extents: &[F; D],
) -> bool {
    (0..D).all(|axis| (point[axis] - center[axis]).abs() < half_extents[axis])
}

#[cfg(test)]
mod test {
    use geo_traits::CoordTrait;

    use super::{in_box, sq_dist, Point};

    #[test]
    fn distances() {
        let a = [0.0f64, 0.0, 0.0];
        let b = [1.0, 2.0, 2.0];
        assert_eq!(sq_dist(&a, &b), 9.0);
        assert_eq!(sq_dist(&a, &b).sqrt(), 3.0);
    }

    #[test]
    fn box_containment_is_strict() {
        let center = [0.0f32, 0.0];
        let half = [1.0f32, 2.0];
        assert!(in_box(&[0.5, -1.5], &center, &half));
        assert!(!in_box(&[1.0, 0.0], &center, &half));
        assert!(!in_box(&[0.0, -2.5], &center, &half));
    }

    #[test]
    fn coord_roundtrip() {
        let p: Point<f64, 3> = Point::new([1.0, 2.0, 3.0]);
        assert_eq!(p.dim().size(), 3);
        assert_eq!(p.nth_or_panic(2), 3.0);
        assert_eq!(Point::<f64, 3>::from_coord(&p), Some(p));
        assert_eq!(Point::<f64, 2>::from_coord(&p), None);
    }
}
