pub(crate) const KDTREE_MAGIC: u8 = 0xd7;
pub(crate) const KDTREE_VERSION: u8 = 1;
pub(crate) const KDTREE_HEADER_SIZE: usize = 16;
