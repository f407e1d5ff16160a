use std::marker::PhantomData;

use tracing::{debug, warn};

use crate::{
    buffer::VoxelBuffer,
    classify::Threshold,
    error::{Result, VoxelFieldError},
    grid::Grid,
    interp::trilinear,
    range::scan_range,
    types::{Coord, FieldValue, Index3, Label, Point, SamplePoint},
};

/// How [`Sampler::evaluate`] turns a continuous point into a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interpolation {
    /// Label of the closest voxel.
    Nearest,
    /// Multilinear blend of the 8 voxels around the point.
    #[default]
    Trilinear,
}

/// A voxel image viewed as a scalar field over physical space.
///
/// Owns its [`Grid`] and [`VoxelBuffer`]. `T` is the field value type and `P`
/// the point type accepted by [`evaluate`](Sampler::evaluate).
///
/// Anything outside the grid, and everything when no data is loaded, samples
/// as zero. The cached range from [`compute_min_max`](Sampler::compute_min_max)
/// is not refreshed automatically when voxels change.
///
/// ```rust,ignore
/// let grid = Grid::new([64, 64, 32], [0.5, 0.5, 1.0])?;
/// let mut sampler: Sampler = Sampler::new(grid, voxels)?;
///
/// sampler.threshold(3, 1, 0); // keep label 3 as "inside"
/// let f = sampler.as_function();
/// let inside = f(Point::new(4.0, 4.0, 2.0)) > 0.5;
/// ```
#[derive(Debug, Clone)]
pub struct Sampler<T = f64, P = Point> {
    grid: Grid,
    voxels: VoxelBuffer,
    interpolation: Interpolation,
    min_value: T,
    max_value: T,
    _point: PhantomData<fn(P) -> T>,
}

impl<T: FieldValue, P: SamplePoint> Sampler<T, P> {
    /// Pairs `grid` with `voxels`.
    ///
    /// `voxels` may be empty; otherwise its shape must equal the grid's, else
    /// [`VoxelFieldError::DimensionMismatch`] is returned.
    pub fn new(grid: Grid, voxels: VoxelBuffer) -> Result<Self> {
        if !voxels.is_empty() && voxels.dims() != grid.dims() {
            warn!(
                grid = ?grid.dims(),
                buffer = ?voxels.dims(),
                "voxel buffer does not match grid"
            );
            return Err(VoxelFieldError::DimensionMismatch {
                grid: grid.dims(),
                buffer: voxels.dims(),
            });
        }

        let interpolation = Interpolation::default();
        debug!(
            dims = ?grid.dims(),
            spacing = ?grid.spacing(),
            ?interpolation,
            loaded = !voxels.is_empty(),
            "sampler ready"
        );

        Ok(Self {
            grid,
            voxels,
            interpolation,
            min_value: T::zero(),
            max_value: T::zero(),
            _point: PhantomData,
        })
    }

    /// A sampler over `grid` with no voxel data loaded.
    pub fn unloaded(grid: Grid) -> Self {
        Self {
            grid,
            voxels: VoxelBuffer::empty(),
            interpolation: Interpolation::default(),
            min_value: T::zero(),
            max_value: T::zero(),
            _point: PhantomData,
        }
    }

    /// Sets the interpolation mode.
    pub fn with_interpolation(mut self, interpolation: Interpolation) -> Self {
        self.interpolation = interpolation;
        self
    }

    pub fn set_interpolation(&mut self, interpolation: Interpolation) {
        self.interpolation = interpolation;
    }

    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn voxels(&self) -> &VoxelBuffer {
        &self.voxels
    }

    /// Mutable voxel access. Call [`compute_min_max`](Sampler::compute_min_max)
    /// again after editing if the cached range matters.
    pub fn voxels_mut(&mut self) -> &mut VoxelBuffer {
        &mut self.voxels
    }

    pub fn into_parts(self) -> (Grid, VoxelBuffer) {
        (self.grid, self.voxels)
    }

    pub fn is_empty(&self) -> bool {
        self.voxels.is_empty()
    }

    /// Raw label at voxel `(i, j, k)`.
    pub fn value(&self, i: usize, j: usize, k: usize) -> Result<Label> {
        self.voxels.get(i, j, k)
    }

    /// Physical position of voxel `(i, j, k)`.
    pub fn point(&self, i: usize, j: usize, k: usize) -> P {
        self.grid.point_at(i, j, k)
    }

    /// Samples the field at `point` using the current [`Interpolation`].
    ///
    /// Returns zero outside the grid or when no data is loaded.
    pub fn evaluate(&self, point: &P) -> T {
        if self.voxels.is_empty() {
            return T::zero();
        }

        let [x, y, z] = point.coords();
        match self.interpolation {
            Interpolation::Trilinear => {
                if self.covers([x, y, z]) {
                    self.blend([x, y, z])
                } else {
                    T::zero()
                }
            }
            Interpolation::Nearest => match self.nearest_index([x, y, z]) {
                Some([i, j, k]) => self.label(i, j, k),
                None => T::zero(),
            },
        }
    }

    /// The voxel nearest to `point`, or `None` if it falls outside the grid.
    ///
    /// Each grid coordinate `c / spacing` is rounded with `floor(c + 0.5)`, so
    /// halves round up: `-0.5` goes to voxel 0 while anything below it is outside.
    pub fn nearest_voxel(&self, point: &P) -> Option<Index3> {
        self.nearest_index(point.coords())
    }

    /// Borrows the sampler as a plain implicit function, e.g. for a mesher that
    /// takes `Fn(P) -> T`.
    pub fn as_function(&self) -> impl Fn(P) -> T + Sync + '_ {
        move |p| self.evaluate(&p)
    }

    /// Rewrites every voxel to `equal` where it held `target` and to `diff`
    /// elsewhere; returns the number of matches. See [`Threshold`].
    pub fn threshold(&mut self, target: Label, equal: Label, diff: Label) -> usize {
        Threshold::new(target, equal, diff).apply(&mut self.voxels)
    }

    /// Scans the whole grid, caches the smallest and largest label as field
    /// values and returns them. Both are zero when no data is loaded.
    pub fn compute_min_max(&mut self) -> (T, T) {
        let (min, max) = match scan_range(&self.voxels) {
            Some((min, max)) => (T::from_label(min), T::from_label(max)),
            None => (T::zero(), T::zero()),
        };
        self.min_value = min;
        self.max_value = max;
        (min, max)
    }

    /// Cached minimum from the last [`compute_min_max`](Sampler::compute_min_max).
    pub fn min_value(&self) -> T {
        self.min_value
    }

    /// Cached maximum from the last [`compute_min_max`](Sampler::compute_min_max).
    pub fn max_value(&self) -> T {
        self.max_value
    }

    /// Inclusive bounds test with the far face rounded to `P`'s precision, so
    /// a narrower point built by [`point`](Sampler::point) on the last layer stays inside.
    #[inline]
    fn covers(&self, coords: [Coord; 3]) -> bool {
        let far = P::from_coords(self.grid.extents()).coords();
        coords
            .iter()
            .zip(far)
            .all(|(&c, e)| (0.0..=e).contains(&c))
    }

    // Index must already be validated against the grid.
    #[inline]
    fn label(&self, i: usize, j: usize, k: usize) -> T {
        debug_assert!(self.grid.contains_index(i, j, k), "unchecked voxel ({i}, {j}, {k})");
        self.voxels
            .get(i, j, k)
            .map(T::from_label)
            .unwrap_or_else(|_| T::zero())
    }

    fn nearest_index(&self, coords: [Coord; 3]) -> Option<Index3> {
        let spacing = self.grid.spacing();
        let mut index = [0; 3];
        for axis in 0..3 {
            let rounded = (coords[axis] / spacing[axis] + 0.5).floor();
            if rounded.is_nan() || rounded < 0.0 {
                return None;
            }
            index[axis] = rounded as usize;
        }
        let [i, j, k] = index;
        self.grid.contains_index(i, j, k).then_some(index)
    }

    /// Trilinear blend at a point already known to be inside the grid.
    ///
    /// The upper corner of each axis is clamped to the last layer, so points on
    /// the far face (or on a single-voxel axis) never read past the buffer.
    fn blend(&self, coords: [Coord; 3]) -> T {
        let dims = self.grid.dims();
        let spacing = self.grid.spacing();

        let mut lo = [0; 3];
        let mut hi = [0; 3];
        let mut t = [T::zero(); 3];
        for axis in 0..3 {
            let last = dims[axis] - 1;
            let g = coords[axis] / spacing[axis];
            let base = (g.floor().max(0.0) as usize).min(last);
            lo[axis] = base;
            hi[axis] = (base + 1).min(last);
            t[axis] = nalgebra::convert((g - base as Coord).clamp(0.0, 1.0));
        }

        let corners: [T; 8] = std::array::from_fn(|c| {
            let pick = |axis: usize| if (c >> axis) & 1 == 1 { hi[axis] } else { lo[axis] };
            self.label(pick(0), pick(1), pick(2))
        });

        trilinear(&corners, t)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use nalgebra::Point3;

    use super::*;

    const RAW: [Label; 8] = [10, 20, 30, 40, 50, 60, 70, 80];

    fn cube(interpolation: Interpolation) -> Sampler {
        let grid = Grid::unit([2, 2, 2]).unwrap();
        let voxels = VoxelBuffer::from_raw([2, 2, 2], RAW.to_vec()).unwrap();
        Sampler::new(grid, voxels)
            .unwrap()
            .with_interpolation(interpolation)
    }

    /// 4 x 3 x 2 grid, anisotropic spacing, label = linear index.
    fn ramp(interpolation: Interpolation) -> Sampler {
        let dims = [4, 3, 2];
        let grid = Grid::new(dims, [0.5, 2.0, 1.5]).unwrap();
        let voxels =
            VoxelBuffer::from_fn(dims, |i, j, k| crate::buffer::linear_index(dims, i, j, k) as Label);
        Sampler::new(grid, voxels)
            .unwrap()
            .with_interpolation(interpolation)
    }

    #[test]
    fn defaults_to_trilinear() {
        let sampler: Sampler = Sampler::unloaded(Grid::unit([2, 2, 2]).unwrap());
        assert_eq!(sampler.interpolation(), Interpolation::Trilinear);
    }

    #[test]
    fn rejects_mismatched_buffer() {
        let grid = Grid::unit([2, 4, 1]).unwrap();
        let voxels = VoxelBuffer::zeroed([4, 2, 1]);
        assert_eq!(
            Sampler::<f64>::new(grid, voxels).err(),
            Some(VoxelFieldError::DimensionMismatch {
                grid: [2, 4, 1],
                buffer: [4, 2, 1]
            })
        );
    }

    #[test]
    fn nearest_reproduces_every_voxel() {
        let sampler = ramp(Interpolation::Nearest);
        for k in 0..2 {
            for j in 0..3 {
                for i in 0..4 {
                    let p = sampler.point(i, j, k);
                    let expected = sampler.value(i, j, k).unwrap() as f64;
                    assert_eq!(sampler.evaluate(&p), expected, "voxel ({i}, {j}, {k})");
                }
            }
        }
    }

    #[test]
    fn nearest_rounds_half_up() {
        let sampler = cube(Interpolation::Nearest);
        assert_eq!(sampler.evaluate(&Point::new(0.49, 0.0, 0.0)), 10.0);
        assert_eq!(sampler.evaluate(&Point::new(0.5, 0.0, 0.0)), 20.0);
        assert_eq!(sampler.evaluate(&Point::new(1.49, 0.0, 0.0)), 20.0);
        assert_eq!(sampler.evaluate(&Point::new(1.5, 0.0, 0.0)), 0.0);
    }

    #[test]
    fn nearest_just_below_origin() {
        let sampler = cube(Interpolation::Nearest);
        assert_eq!(sampler.nearest_voxel(&Point::new(-0.4, 0.0, 0.0)), Some([0, 0, 0]));
        assert_eq!(sampler.nearest_voxel(&Point::new(-0.5, 0.0, 0.0)), Some([0, 0, 0]));
        assert_eq!(sampler.nearest_voxel(&Point::new(-0.6, 0.0, 0.0)), None);
        assert_eq!(sampler.evaluate(&Point::new(-0.4, 0.0, 0.0)), 10.0);
        assert_eq!(sampler.evaluate(&Point::new(0.0, -0.6, 0.0)), 0.0);
    }

    #[test]
    fn nan_samples_as_zero() {
        for mode in [Interpolation::Nearest, Interpolation::Trilinear] {
            let sampler = cube(mode);
            assert_eq!(sampler.evaluate(&Point::new(f64::NAN, 0.0, 0.0)), 0.0);
        }
    }

    #[test]
    fn trilinear_hits_voxel_values_on_nodes() {
        let sampler = ramp(Interpolation::Trilinear);
        for k in 0..2 {
            for j in 0..3 {
                for i in 0..4 {
                    let p = sampler.point(i, j, k);
                    let expected = sampler.value(i, j, k).unwrap() as f64;
                    assert_relative_eq!(sampler.evaluate(&p), expected, epsilon = 1e-9);
                }
            }
        }
    }

    #[test]
    fn trilinear_blends_between_nodes() {
        let sampler = cube(Interpolation::Trilinear);
        assert_relative_eq!(sampler.evaluate(&Point::new(0.5, 0.5, 0.5)), 45.0);
        assert_relative_eq!(sampler.evaluate(&Point::new(0.5, 0.0, 0.0)), 15.0);
        assert_relative_eq!(sampler.evaluate(&Point::new(0.0, 0.0, 0.25)), 20.0);
    }

    #[test]
    fn trilinear_is_linear_along_a_ramp() {
        // label = i + 4j + 12k, a linear function of position.
        let sampler = ramp(Interpolation::Trilinear);
        let p = Point::new(0.8, 3.1, 0.6);
        let expected = p.x / 0.5 + 4.0 * p.y / 2.0 + 12.0 * p.z / 1.5;
        assert_relative_eq!(sampler.evaluate(&p), expected, epsilon = 1e-9);
    }

    #[test]
    fn trilinear_far_face_uses_boundary_layer() {
        let sampler = ramp(Interpolation::Trilinear);
        let [ex, ey, ez] = sampler.grid().extents();
        assert_relative_eq!(sampler.evaluate(&Point::new(ex, ey, ez)), 23.0);
        assert_relative_eq!(sampler.evaluate(&Point::new(ex, 0.0, 0.0)), 3.0);
        assert_relative_eq!(sampler.evaluate(&Point::new(ex, ey, 0.75)), 17.0);
    }

    #[test]
    fn trilinear_on_flat_axis() {
        let dims = [3, 1, 1];
        let grid = Grid::unit(dims).unwrap();
        let voxels = VoxelBuffer::from_raw(dims, vec![0, 100, 200]).unwrap();
        let sampler: Sampler = Sampler::new(grid, voxels).unwrap();
        assert_relative_eq!(sampler.evaluate(&Point::new(1.5, 0.0, 0.0)), 150.0);
        assert_eq!(sampler.evaluate(&Point::new(1.5, 0.1, 0.0)), 0.0);
    }

    #[test]
    fn outside_is_zero_in_both_modes() {
        for mode in [Interpolation::Nearest, Interpolation::Trilinear] {
            let sampler = cube(mode);
            for p in [
                Point::new(-1.0, 0.5, 0.5),
                Point::new(0.5, 2.0, 0.5),
                Point::new(0.5, 0.5, 10.0),
                Point::new(100.0, 100.0, 100.0),
            ] {
                assert_eq!(sampler.evaluate(&p), 0.0, "{mode:?} at {p}");
            }
        }
    }

    #[test]
    fn trilinear_rejects_just_past_far_face() {
        let sampler = cube(Interpolation::Trilinear);
        assert_eq!(sampler.evaluate(&Point::new(1.0 + 1e-9, 1.0, 1.0)), 0.0);
        assert_relative_eq!(sampler.evaluate(&Point::new(1.0, 1.0, 1.0)), 80.0);
    }

    #[test]
    fn unloaded_samples_zero() {
        let mut sampler: Sampler = Sampler::unloaded(Grid::unit([2, 2, 2]).unwrap());
        assert!(sampler.is_empty());
        for mode in [Interpolation::Nearest, Interpolation::Trilinear] {
            sampler.set_interpolation(mode);
            assert_eq!(sampler.evaluate(&Point::new(0.5, 0.5, 0.5)), 0.0);
        }
        assert_eq!(sampler.threshold(0, 1, 0), 0);
        assert_eq!(sampler.compute_min_max(), (0.0, 0.0));
    }

    #[test]
    fn mode_switch_applies_to_next_call() {
        let mut sampler = cube(Interpolation::Nearest);
        let p = Point::new(0.4, 0.0, 0.0);
        assert_eq!(sampler.evaluate(&p), 10.0);
        sampler.set_interpolation(Interpolation::Trilinear);
        assert_relative_eq!(sampler.evaluate(&p), 14.0);
    }

    #[test]
    fn min_max_is_cached() {
        let mut sampler = cube(Interpolation::Nearest);
        assert_eq!((sampler.min_value(), sampler.max_value()), (0.0, 0.0));
        assert_eq!(sampler.compute_min_max(), (10.0, 80.0));
        assert_eq!((sampler.min_value(), sampler.max_value()), (10.0, 80.0));

        // Not refreshed until the next scan.
        sampler.voxels_mut().set(0, 0, 0, 0).unwrap();
        assert_eq!(sampler.min_value(), 10.0);
        assert_eq!(sampler.compute_min_max(), (0.0, 80.0));
    }

    #[test]
    fn threshold_then_sample() {
        let mut sampler = cube(Interpolation::Nearest);
        assert_eq!(sampler.threshold(50, 1, 0), 1);
        assert_eq!(sampler.evaluate(&Point::new(0.0, 0.0, 1.0)), 1.0);
        assert_eq!(sampler.evaluate(&Point::new(1.0, 1.0, 1.0)), 0.0);
    }

    #[test]
    fn clone_keeps_range_and_owns_voxels() {
        let mut sampler = cube(Interpolation::Nearest);
        sampler.compute_min_max();
        let copy = sampler.clone();
        sampler.threshold(10, 255, 0);

        assert_eq!(copy.value(0, 0, 0), Ok(10));
        assert_eq!(copy.max_value(), 80.0);
        assert_eq!(copy.interpolation(), Interpolation::Nearest);
        assert_eq!(sampler.value(0, 0, 0), Ok(255));
    }

    #[test]
    fn works_with_f32_and_plain_arrays() {
        let grid = Grid::unit([2, 2, 2]).unwrap();
        let voxels = VoxelBuffer::from_raw([2, 2, 2], RAW.to_vec()).unwrap();
        let sampler: Sampler<f32, [f32; 3]> = Sampler::new(grid, voxels).unwrap();
        assert_relative_eq!(sampler.evaluate(&[0.5, 0.5, 0.5]), 45.0_f32);

        let nearest: Sampler<f32, Point3<f32>> =
            Sampler::new(grid, VoxelBuffer::from_raw([2, 2, 2], RAW.to_vec()).unwrap())
                .unwrap()
                .with_interpolation(Interpolation::Nearest);
        assert_eq!(nearest.evaluate(&nearest.point(1, 1, 1)), 80.0_f32);
    }

    #[test]
    fn f32_points_on_far_face_are_inside() {
        let dims = [3, 3, 3];
        let grid = Grid::new(dims, [0.1; 3]).unwrap();
        let voxels = VoxelBuffer::from_fn(dims, |_, _, _| 42);
        let mut sampler: Sampler<f32, Point3<f32>> = Sampler::new(grid, voxels).unwrap();

        let far = sampler.point(2, 2, 2);
        assert_relative_eq!(sampler.evaluate(&far), 42.0_f32);
        assert_relative_eq!(sampler.evaluate(&sampler.point(1, 2, 2)), 42.0_f32);
        assert_eq!(sampler.evaluate(&Point3::new(0.21_f32, 0.2, 0.2)), 0.0);

        sampler.set_interpolation(Interpolation::Nearest);
        assert_eq!(sampler.evaluate(&far), 42.0);
    }

    #[test]
    fn sampler_can_be_shared_across_threads() {
        fn assert_send_sync<S: Send + Sync>() {}
        assert_send_sync::<Sampler>();
        assert_send_sync::<Sampler<f32, [f32; 3]>>();
    }

    #[test]
    fn as_function_matches_evaluate() {
        let sampler = ramp(Interpolation::Trilinear);
        let f = sampler.as_function();
        let p = Point::new(1.1, 0.7, 0.3);
        assert_eq!(f(p), sampler.evaluate(&p));
    }
}
