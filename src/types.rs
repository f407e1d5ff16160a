use nalgebra::{Point3, RealField, Vector3};

/// Physical-space coordinate used for grid geometry.
pub type Coord = f64;

/// Raw per-voxel label as stored in the image.
pub type Label = u8;

/// Integer voxel address `[i, j, k]` (x fastest, z slowest).
pub type Index3 = [usize; 3];

/// A 3D point with [`Coord`] components.
pub type Point = Point3<Coord>;

/// A 3D vector with [`Coord`] components.
pub type Vector = Vector3<Coord>;

/// Scalar type returned by a sampler.
///
/// Labels are converted with [`nalgebra::convert`], so any real field works (`f32`, `f64`).
pub trait FieldValue: RealField + Copy {
    /// Converts a raw label into the field type.
    #[inline]
    fn from_label(label: Label) -> Self {
        nalgebra::convert(label as f64)
    }
}

impl<T: RealField + Copy> FieldValue for T {}

/// A point type that can be fed to a sampler and produced by a grid.
pub trait SamplePoint {
    /// Physical-space coordinates `[x, y, z]`.
    fn coords(&self) -> [Coord; 3];

    /// Builds a point from physical-space coordinates.
    fn from_coords(c: [Coord; 3]) -> Self;
}

impl SamplePoint for Point3<f64> {
    #[inline]
    fn coords(&self) -> [Coord; 3] {
        [self.x, self.y, self.z]
    }

    #[inline]
    fn from_coords(c: [Coord; 3]) -> Self {
        Point3::new(c[0], c[1], c[2])
    }
}

impl SamplePoint for Point3<f32> {
    #[inline]
    fn coords(&self) -> [Coord; 3] {
        [self.x as Coord, self.y as Coord, self.z as Coord]
    }

    #[inline]
    fn from_coords(c: [Coord; 3]) -> Self {
        Point3::new(c[0] as f32, c[1] as f32, c[2] as f32)
    }
}

impl SamplePoint for Vector3<f64> {
    #[inline]
    fn coords(&self) -> [Coord; 3] {
        [self.x, self.y, self.z]
    }

    #[inline]
    fn from_coords(c: [Coord; 3]) -> Self {
        Vector3::new(c[0], c[1], c[2])
    }
}

impl SamplePoint for Vector3<f32> {
    #[inline]
    fn coords(&self) -> [Coord; 3] {
        [self.x as Coord, self.y as Coord, self.z as Coord]
    }

    #[inline]
    fn from_coords(c: [Coord; 3]) -> Self {
        Vector3::new(c[0] as f32, c[1] as f32, c[2] as f32)
    }
}

impl SamplePoint for [f64; 3] {
    #[inline]
    fn coords(&self) -> [Coord; 3] {
        *self
    }

    #[inline]
    fn from_coords(c: [Coord; 3]) -> Self {
        c
    }
}

impl SamplePoint for [f32; 3] {
    #[inline]
    fn coords(&self) -> [Coord; 3] {
        [self[0] as Coord, self[1] as Coord, self[2] as Coord]
    }

    #[inline]
    fn from_coords(c: [Coord; 3]) -> Self {
        [c[0] as f32, c[1] as f32, c[2] as f32]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_types_agree_on_coords() {
        let c = [1.5, -2.0, 0.25];
        assert_eq!(Point::from_coords(c).coords(), c);
        assert_eq!(Point3::<f32>::from_coords(c).coords(), c);
        assert_eq!(Vector3::<f32>::from_coords(c).coords(), c);
        assert_eq!(<[f32; 3]>::from_coords(c).coords(), c);
    }

    #[test]
    fn labels_convert_exactly() {
        assert_eq!(f32::from_label(255), 255.0);
        assert_eq!(f64::from_label(0), 0.0);
    }
}
