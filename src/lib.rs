#![doc = include_str!("../README.md")]

mod error;
mod indices;
pub mod kdtree;
mod r#type;

pub use error::{KDTreeError, Result};
pub use r#type::{IndexableFloat, IndexableSize};

#[cfg(test)]
pub(crate) mod test;
