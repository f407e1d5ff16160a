use derive_more::Display;

use crate::types::{Coord, Index3};

pub type Result<T> = core::result::Result<T, VoxelFieldError>;

#[derive(Debug, Display, Clone, PartialEq)]
pub enum VoxelFieldError {
    /// Some axis has zero voxels.
    #[display("invalid grid dimensions {dims:?}: every axis needs at least one voxel")]
    InvalidDimensions { dims: Index3 },
    /// Some voxel spacing is zero, negative or not finite.
    #[display("invalid voxel spacing {spacing:?}: every axis needs a finite positive size")]
    InvalidSpacing { spacing: [Coord; 3] },
    #[display("voxel data holds {actual} labels, grid expects {expected}")]
    SizeMismatch { expected: usize, actual: usize },
    /// A voxel buffer was paired with a grid of different shape.
    #[display("voxel buffer shaped {buffer:?} does not fit a {grid:?} grid")]
    DimensionMismatch { grid: Index3, buffer: Index3 },
    #[display("voxel index {index:?} is outside a {dims:?} buffer")]
    IndexOutOfRange { index: Index3, dims: Index3 },
}

impl std::error::Error for VoxelFieldError {}
