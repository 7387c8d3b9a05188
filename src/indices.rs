//! The working permutation used while building a tree, stored as `u16`, `u32` or `usize` to save
//! space on smaller inputs.

/// An owned permutation of point indices that may be either `u16`, `u32` or `usize`.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum PointIndices {
    U16(Vec<u16>),
    U32(Vec<u32>),
    Usize(Vec<usize>),
}

impl PointIndices {
    /// The identity permutation `0..num_items`, using the narrowest type that holds every index.
    pub(crate) fn new(num_items: usize) -> Self {
        if num_items <= u16::MAX as usize + 1 {
            Self::U16((0..num_items).map(|i| i as u16).collect())
        } else if num_items <= u32::MAX as usize + 1 {
            Self::U32((0..num_items).map(|i| i as u32).collect())
        } else {
            Self::Usize((0..num_items).collect())
        }
    }

    #[inline]
    pub(crate) fn bytes_per_element(&self) -> usize {
        match self {
            Self::U16(_) => 2,
            Self::U32(_) => 4,
            Self::Usize(_) => std::mem::size_of::<usize>(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        match self {
            Self::U16(arr) => arr.len(),
            Self::U32(arr) => arr.len(),
            Self::Usize(arr) => arr.len(),
        }
    }

    #[inline]
    pub(crate) fn get(&self, index: usize) -> usize {
        match self {
            Self::U16(arr) => arr[index] as usize,
            Self::U32(arr) => arr[index] as usize,
            Self::Usize(arr) => arr[index],
        }
    }

    #[inline]
    pub(crate) fn swap(&mut self, a: usize, b: usize) {
        match self {
            Self::U16(arr) => arr.swap(a, b),
            Self::U32(arr) => arr.swap(a, b),
            Self::Usize(arr) => arr.swap(a, b),
        }
    }
}
