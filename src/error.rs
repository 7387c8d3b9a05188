use thiserror::Error;

/// Enum with all errors in this crate.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum KDTreeError {
    /// A radius query was given a negative or NaN radius.
    #[error("Radius must be a non-negative number.")]
    InvalidRadius,

    /// A box query was given a negative or NaN half-extent.
    #[error("Half-extent on axis {axis} must be a non-negative number.")]
    InvalidHalfExtent { axis: usize },

    /// A serialized tree buffer could not be decoded.
    #[error("Invalid tree buffer: {0}")]
    InvalidBuffer(String),

    /// A node array does not describe a balanced pre-order tree.
    #[error("Invalid tree: {0}")]
    InvalidTree(String),
}

pub type Result<T> = std::result::Result<T, KDTreeError>;
