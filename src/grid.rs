use crate::{
    error::{Result, VoxelFieldError},
    types::{Coord, Index3, SamplePoint},
};

/// Geometry of a regular voxel grid: voxel counts and physical spacing per axis.
///
/// Samples sit on the grid nodes, so voxel `(i, j, k)` lives at
/// `(i * vx, j * vy, k * vz)` and the grid spans `[0, (dim - 1) * spacing]`
/// along each axis:
///
/// ```text
///   k=0 layer, nx = 3, ny = 2
///
///   (0,1)----(1,1)----(2,1)      y
///     |        |        |        |
///   (0,0)----(1,0)----(2,0)      *-- x
///   ^                   ^
///   x = 0               x = extent_x = 2 * vx
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grid {
    dims: Index3,
    spacing: [Coord; 3],
}

impl Grid {
    /// Creates a grid with `dims = [nx, ny, nz]` voxels and `spacing = [vx, vy, vz]`.
    ///
    /// Returns [`VoxelFieldError::InvalidDimensions`] if any axis is empty and
    /// [`VoxelFieldError::InvalidSpacing`] if any spacing is not a finite positive number.
    pub fn new(dims: Index3, spacing: [Coord; 3]) -> Result<Self> {
        if dims.contains(&0) {
            return Err(VoxelFieldError::InvalidDimensions { dims });
        }
        if spacing.iter().any(|v| !v.is_finite() || *v <= 0.0) {
            return Err(VoxelFieldError::InvalidSpacing { spacing });
        }
        Ok(Self { dims, spacing })
    }

    /// Creates a grid with unit spacing on every axis.
    pub fn unit(dims: Index3) -> Result<Self> {
        Self::new(dims, [1.0; 3])
    }

    /// Returns the same voxel counts with a different spacing.
    pub fn with_spacing(self, spacing: [Coord; 3]) -> Result<Self> {
        Self::new(self.dims, spacing)
    }

    pub fn dims(&self) -> Index3 {
        self.dims
    }

    pub fn spacing(&self) -> [Coord; 3] {
        self.spacing
    }

    /// Total number of voxels, `nx * ny * nz`.
    pub fn voxel_count(&self) -> usize {
        self.dims.iter().product()
    }

    /// Physical size along `axis` (0 = x, 1 = y, 2 = z): `(dim - 1) * spacing`.
    ///
    /// # Panics
    /// Panics if `axis > 2`.
    #[inline]
    pub fn extent(&self, axis: usize) -> Coord {
        (self.dims[axis] as Coord - 1.0) * self.spacing[axis]
    }

    /// Extents along all three axes.
    #[inline]
    pub fn extents(&self) -> [Coord; 3] {
        [self.extent(0), self.extent(1), self.extent(2)]
    }

    /// Midpoint of the bounding box.
    pub fn center<P: SamplePoint>(&self) -> P {
        let [ex, ey, ez] = self.extents();
        P::from_coords([0.5 * ex, 0.5 * ey, 0.5 * ez])
    }

    /// Largest extent; a bounding radius for seeding meshers.
    pub fn radius(&self) -> Coord {
        let [ex, ey, ez] = self.extents();
        ex.max(ey).max(ez)
    }

    /// Returns the `[min, max]` corners of the bounding box. `min` is always the origin.
    pub fn bounding_box<P: SamplePoint>(&self) -> [P; 2] {
        [P::from_coords([0.0; 3]), P::from_coords(self.extents())]
    }

    /// Physical position of voxel `(i, j, k)`'s sample.
    ///
    /// Indices are not range-checked; positions past the last voxel lie outside the grid.
    #[inline]
    pub fn point_at<P: SamplePoint>(&self, i: usize, j: usize, k: usize) -> P {
        P::from_coords([
            i as Coord * self.spacing[0],
            j as Coord * self.spacing[1],
            k as Coord * self.spacing[2],
        ])
    }

    /// Whether `(x, y, z)` lies within the bounding box, inclusive on both faces.
    #[inline]
    pub fn contains(&self, x: Coord, y: Coord, z: Coord) -> bool {
        let [ex, ey, ez] = self.extents();
        (0.0..=ex).contains(&x) && (0.0..=ey).contains(&y) && (0.0..=ez).contains(&z)
    }

    /// Whether `(i, j, k)` addresses a voxel of this grid.
    #[inline]
    pub fn contains_index(&self, i: usize, j: usize, k: usize) -> bool {
        i < self.dims[0] && j < self.dims[1] && k < self.dims[2]
    }
}
