pub mod buffer;
pub mod classify;
pub mod error;
pub mod grid;
pub mod interp;
pub mod range;
pub mod sampler;
pub mod types;

pub use buffer::{VoxelBuffer, linear_index};
pub use classify::Threshold;
pub use error::{Result, VoxelFieldError};
pub use grid::Grid;
pub use range::scan_range;
pub use sampler::{Interpolation, Sampler};
pub use types::{Coord, FieldValue, Index3, Label, Point, SamplePoint, Vector};
