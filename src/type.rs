use std::fmt::Debug;

use num_traits::{Float, NumCast, PrimInt, ToPrimitive, Unsigned};

/// A trait for floating point types that can be used for indexed coordinates.
///
/// This trait is sealed and cannot be implemented for external types. The byte layout of a
/// serialized tree depends on the exact set of supported types.
pub trait IndexableFloat:
    private::Sealed + Float + NumCast + ToPrimitive + Debug + Send + Sync + bytemuck::Pod
{
    /// The type index stored in the header of a serialized tree
    const TYPE_INDEX: u8;
    /// The number of bytes per element
    const BYTES_PER_ELEMENT: usize;
}

impl IndexableFloat for f32 {
    const TYPE_INDEX: u8 = 7;
    const BYTES_PER_ELEMENT: usize = 4;
}

impl IndexableFloat for f64 {
    const TYPE_INDEX: u8 = 8;
    const BYTES_PER_ELEMENT: usize = 8;
}

/// A trait for unsigned integer types that can hold the subtree size of a node.
///
/// The choice of type caps the number of points a tree can hold: a `u16` tree holds at most
/// 65535 points.
pub trait IndexableSize:
    private::Sealed + PrimInt + Unsigned + Debug + Send + Sync + bytemuck::Pod
{
    /// The number of bytes per element
    const BYTES_PER_ELEMENT: usize;

    /// Convert a point count into this type, or `None` when it does not fit.
    #[inline]
    fn from_usize(value: usize) -> Option<Self> {
        <Self as NumCast>::from(value)
    }

    /// Widen this value to `usize`.
    #[inline]
    fn as_usize(self) -> usize {
        // All supported sizes were created from a usize, so this cannot fail on any platform
        // where the tree could be built.
        self.to_usize().unwrap_or(usize::MAX)
    }
}

impl IndexableSize for u16 {
    const BYTES_PER_ELEMENT: usize = 2;
}

impl IndexableSize for u32 {
    const BYTES_PER_ELEMENT: usize = 4;
}

impl IndexableSize for u64 {
    const BYTES_PER_ELEMENT: usize = 8;
}

impl IndexableSize for usize {
    const BYTES_PER_ELEMENT: usize = std::mem::size_of::<usize>();
}

// https://rust-lang.github.io/api-guidelines/future-proofing.html#sealed-traits-protect-against-downstream-implementations-c-sealed
mod private {
    pub trait Sealed {}

    impl Sealed for f32 {}
    impl Sealed for f64 {}
    impl Sealed for u16 {}
    impl Sealed for u32 {}
    impl Sealed for u64 {}
    impl Sealed for usize {}
}
