use tracing::debug;

use crate::{buffer::VoxelBuffer, types::Label};

/// One-shot reclassification of every voxel by equality with a target label.
///
/// ```text
/// label == target  →  equal
/// label != target  →  diff
/// ```
///
/// The rewrite is destructive: original labels are lost. Applying the same
/// threshold a second time compares against the *rewritten* labels, so it is a
/// reclassification rather than an idempotent filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Threshold {
    /// Label to match.
    pub target: Label,
    /// Written where a voxel matched.
    pub equal: Label,
    /// Written everywhere else.
    pub diff: Label,
}

impl Threshold {
    pub fn new(target: Label, equal: Label, diff: Label) -> Self {
        Self {
            target,
            equal,
            diff,
        }
    }

    /// Marks `target` voxels as `1` and everything else as `0`.
    pub fn binarize(target: Label) -> Self {
        Self::new(target, 1, 0)
    }

    /// Rewrites every voxel of `buffer` in index order and returns how many matched.
    ///
    /// An empty buffer is left untouched and yields `0`.
    pub fn apply(&self, buffer: &mut VoxelBuffer) -> usize {
        if buffer.is_empty() {
            return 0;
        }

        let mut matched = 0;
        for voxel in buffer.as_mut_slice() {
            if *voxel == self.target {
                *voxel = self.equal;
                matched += 1;
            } else {
                *voxel = self.diff;
            }
        }

        debug!(
            target_label = self.target,
            matched,
            total = buffer.len(),
            "threshold pass complete"
        );
        matched
    }
}
