use tracing::debug;

use crate::{buffer::VoxelBuffer, types::Label};

/// Scans every voxel once and returns the smallest and largest label.
///
/// Returns `None` for an empty buffer. The scan starts from voxel `(0, 0, 0)`
/// and visits the rest in index order.
pub fn scan_range(buffer: &VoxelBuffer) -> Option<(Label, Label)> {
    let (first, rest) = buffer.as_slice().split_first()?;

    let (min, max) = rest
        .iter()
        .fold((*first, *first), |(min, max), &v| (min.min(v), max.max(v)));

    debug!(min, max, voxels = buffer.len(), "range scan complete");
    Some((min, max))
}
