//! A versioned byte layout for a built tree.
//!
//! ```text
//! 0      magic
//! 1      (version << 4) | coordinate type index
//! 2      bytes per node size
//! 3      reserved
//! 4..6   dimensions (u16)
//! 6..8   payload bytes per node (u16)
//! 8..16  number of nodes (u64)
//! then   sizes, axes (u16), coordinates and payloads, each as one contiguous column
//! ```
//!
//! All values are native-endian.

use bytemuck::{bytes_of, cast_slice, pod_read_unaligned};
use log::debug;

use crate::error::{KDTreeError, Result};
use crate::kdtree::constants::{KDTREE_HEADER_SIZE, KDTREE_MAGIC, KDTREE_VERSION};
use crate::kdtree::traversal::validate;
use crate::kdtree::Node;
use crate::r#type::{IndexableFloat, IndexableSize};

/// The number of bytes a serialized node occupies across all columns.
fn node_byte_size<F: IndexableFloat, I: IndexableSize>(dims: usize, pad: usize) -> usize {
    I::BYTES_PER_ELEMENT + 2 + dims * F::BYTES_PER_ELEMENT + pad
}

pub(crate) fn encode<F, const D: usize, const PAD: usize, I>(
    nodes: &[Node<F, D, PAD, I>],
) -> Vec<u8>
where
    F: IndexableFloat,
    I: IndexableSize,
{
    assert!(D <= u16::MAX as usize, "Too many dimensions to serialize.");
    assert!(PAD <= u16::MAX as usize, "Payload too large to serialize.");

    let num_nodes = nodes.len();
    let mut data =
        Vec::with_capacity(KDTREE_HEADER_SIZE + num_nodes * node_byte_size::<F, I>(D, PAD));

    // Set data header
    data.push(KDTREE_MAGIC);
    data.push((KDTREE_VERSION << 4) + F::TYPE_INDEX);
    data.push(I::BYTES_PER_ELEMENT as u8);
    data.push(0);
    data.extend_from_slice(bytes_of(&(D as u16)));
    data.extend_from_slice(bytes_of(&(PAD as u16)));
    data.extend_from_slice(bytes_of(&(num_nodes as u64)));

    for node in nodes {
        data.extend_from_slice(bytes_of(&node.size));
    }
    for node in nodes {
        data.extend_from_slice(bytes_of(&node.axis));
    }
    for node in nodes {
        data.extend_from_slice(cast_slice(node.coords.as_slice()));
    }
    for node in nodes {
        data.extend_from_slice(&node.payload);
    }

    data
}

pub(crate) fn decode<F, const D: usize, const PAD: usize, I>(
    data: &[u8],
) -> Result<Vec<Node<F, D, PAD, I>>>
where
    F: IndexableFloat,
    I: IndexableSize,
{
    if data.len() < KDTREE_HEADER_SIZE {
        return Err(KDTreeError::InvalidBuffer(format!(
            "Buffer of {} bytes is shorter than the header.",
            data.len()
        )));
    }
    if data[0] != KDTREE_MAGIC {
        return Err(KDTreeError::InvalidBuffer(
            "Data not in kd-tree format.".to_string(),
        ));
    }

    let version_and_type = data[1];
    let version = version_and_type >> 4;
    if version != KDTREE_VERSION {
        return Err(KDTreeError::InvalidBuffer(format!(
            "Got v{} data when expected v{}.",
            version, KDTREE_VERSION
        )));
    }

    let type_ = version_and_type & 0x0f;
    if type_ != F::TYPE_INDEX {
        return Err(KDTreeError::InvalidBuffer(format!(
            "Got type {} data when expected type {}.",
            type_,
            F::TYPE_INDEX
        )));
    }

    let size_bytes = data[2] as usize;
    if size_bytes != I::BYTES_PER_ELEMENT {
        return Err(KDTreeError::InvalidBuffer(format!(
            "Got {}-byte node sizes when expected {}-byte.",
            size_bytes,
            I::BYTES_PER_ELEMENT
        )));
    }

    let dims: u16 = pod_read_unaligned(&data[4..6]);
    let pad: u16 = pod_read_unaligned(&data[6..8]);
    if dims as usize != D || pad as usize != PAD {
        return Err(KDTreeError::InvalidBuffer(format!(
            "Got {} dimensions with {} payload bytes when expected {} with {}.",
            dims, pad, D, PAD
        )));
    }

    let num_nodes: u64 = pod_read_unaligned(&data[8..16]);
    let expected_length = usize::try_from(num_nodes)
        .ok()
        .and_then(|n| n.checked_mul(node_byte_size::<F, I>(D, PAD)))
        .and_then(|n| n.checked_add(KDTREE_HEADER_SIZE));
    if expected_length != Some(data.len()) {
        return Err(KDTreeError::InvalidBuffer(format!(
            "Incorrect buffer length for {} nodes. Got {}.",
            num_nodes,
            data.len()
        )));
    }
    // The length check above guarantees the node count fits in usize.
    let num_nodes = num_nodes as usize;

    let sizes_start = KDTREE_HEADER_SIZE;
    let axes_start = sizes_start + num_nodes * I::BYTES_PER_ELEMENT;
    let coords_start = axes_start + num_nodes * 2;
    let payload_start = coords_start + num_nodes * D * F::BYTES_PER_ELEMENT;

    let mut nodes = Vec::with_capacity(num_nodes);
    for i in 0..num_nodes {
        let pos = sizes_start + i * I::BYTES_PER_ELEMENT;
        let size: I = pod_read_unaligned(&data[pos..pos + I::BYTES_PER_ELEMENT]);

        let pos = axes_start + i * 2;
        let axis: u16 = pod_read_unaligned(&data[pos..pos + 2]);

        let mut coords = [F::zero(); D];
        for (dim, coord) in coords.iter_mut().enumerate() {
            let pos = coords_start + (i * D + dim) * F::BYTES_PER_ELEMENT;
            *coord = pod_read_unaligned(&data[pos..pos + F::BYTES_PER_ELEMENT]);
        }

        let mut payload = [0; PAD];
        let pos = payload_start + i * PAD;
        payload.copy_from_slice(&data[pos..pos + PAD]);

        nodes.push(Node {
            size,
            axis,
            coords,
            payload,
        });
    }

    validate(&nodes)?;
    debug!("Decoded kd-tree buffer with {} nodes", num_nodes);

    Ok(nodes)
}
