use ndarray::Array3;

use crate::{
    error::{Result, VoxelFieldError},
    types::{Index3, Label},
};

/// Row-major position of voxel `(i, j, k)` in a flat buffer of `dims = [nx, ny, nz]`:
///
/// ```text
/// index = k * (nx * ny) + j * nx + i
/// ```
///
/// `x` varies fastest and `z` slowest. Indices are not range-checked.
#[inline]
pub fn linear_index(dims: Index3, i: usize, j: usize, k: usize) -> usize {
    k * (dims[0] * dims[1]) + j * dims[0] + i
}

/// Owned, contiguous storage of one [`Label`] per voxel.
///
/// Backed by an [`Array3`] of shape `(nz, ny, nx)` in standard layout, so its
/// memory order is exactly [`linear_index`]. A buffer is either empty (no image
/// loaded) or holds exactly `nx * ny * nz` labels, never anything in between.
///
/// Direct access with [`get`](VoxelBuffer::get) / [`set`](VoxelBuffer::set) is
/// range-checked and fails with [`VoxelFieldError::IndexOutOfRange`]; an empty
/// buffer rejects every index.
#[derive(Debug, Clone, PartialEq)]
pub struct VoxelBuffer {
    labels: Array3<Label>,
}

impl Default for VoxelBuffer {
    fn default() -> Self {
        Self::empty()
    }
}

impl VoxelBuffer {
    /// A buffer with no data loaded.
    pub fn empty() -> Self {
        Self {
            labels: Array3::zeros((0, 0, 0)),
        }
    }

    /// A buffer of `nx * ny * nz` zero labels.
    pub fn zeroed(dims: Index3) -> Self {
        Self {
            labels: Array3::zeros(Self::shape(dims)),
        }
    }

    /// Wraps raw labels laid out in [`linear_index`] order.
    ///
    /// Returns [`VoxelFieldError::SizeMismatch`] unless `data.len() == nx * ny * nz`.
    pub fn from_raw(dims: Index3, data: Vec<Label>) -> Result<Self> {
        let expected: usize = dims.iter().product();
        let actual = data.len();
        let labels = Array3::from_shape_vec(Self::shape(dims), data)
            .map_err(|_| VoxelFieldError::SizeMismatch { expected, actual })?;
        Ok(Self { labels })
    }

    /// Builds a buffer by calling `f(i, j, k)` for every voxel.
    pub fn from_fn<F>(dims: Index3, mut f: F) -> Self
    where
        F: FnMut(usize, usize, usize) -> Label,
    {
        Self {
            labels: Array3::from_shape_fn(Self::shape(dims), |(k, j, i)| f(i, j, k)),
        }
    }

    // ndarray shape for `dims`: z outermost, x innermost.
    #[inline]
    fn shape(dims: Index3) -> (usize, usize, usize) {
        (dims[2], dims[1], dims[0])
    }

    /// Voxel counts `[nx, ny, nz]`; all zero for an empty buffer.
    pub fn dims(&self) -> Index3 {
        let (nz, ny, nx) = self.labels.dim();
        [nx, ny, nz]
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// True when no voxels are held.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Validates `(i, j, k)` and returns the matching ndarray index.
    #[inline]
    fn slot(&self, i: usize, j: usize, k: usize) -> Result<[usize; 3]> {
        let dims = self.dims();
        if i < dims[0] && j < dims[1] && k < dims[2] {
            Ok([k, j, i])
        } else {
            Err(VoxelFieldError::IndexOutOfRange {
                index: [i, j, k],
                dims,
            })
        }
    }

    /// Label at voxel `(i, j, k)`.
    #[inline]
    pub fn get(&self, i: usize, j: usize, k: usize) -> Result<Label> {
        self.slot(i, j, k).map(|s| self.labels[s])
    }

    /// Overwrites the label at voxel `(i, j, k)`.
    #[inline]
    pub fn set(&mut self, i: usize, j: usize, k: usize, label: Label) -> Result<()> {
        let s = self.slot(i, j, k)?;
        self.labels[s] = label;
        Ok(())
    }

    /// All labels in [`linear_index`] order.
    pub fn as_slice(&self) -> &[Label] {
        self.labels.as_slice().unwrap_or(&[])
    }

    /// Mutable labels in [`linear_index`] order.
    pub fn as_mut_slice(&mut self) -> &mut [Label] {
        self.labels.as_slice_mut().unwrap_or(&mut [])
    }

    /// Iterates `([i, j, k], label)` in [`linear_index`] order.
    pub fn iter_indexed(&self) -> impl Iterator<Item = (Index3, Label)> + '_ {
        self.labels
            .indexed_iter()
            .map(|((k, j, i), &label)| ([i, j, k], label))
    }
}
