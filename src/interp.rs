use nalgebra::RealField;

// Linear interpolation
#[inline]
pub fn lerp<T: RealField + Copy>(a: T, b: T, t: T) -> T {
    a + (b - a) * t
}

/// Blends the 8 corner values of a cell at fractional offset `t` (each in `[0, 1]`).
///
/// `corners[c]` is the value at corner `c`, where bit 0 of `c` selects the upper
/// x side, bit 1 the upper y side and bit 2 the upper z side:
///
/// ```text
///  c = 0b zyx      0 = (x0, y0, z0)    4 = (x0, y0, z1)
///                  1 = (x1, y0, z0)    5 = (x1, y0, z1)
///                  2 = (x0, y1, z0)    6 = (x0, y1, z1)
///                  3 = (x1, y1, z0)    7 = (x1, y1, z1)
/// ```
///
/// Interpolates along x, then y, then z, which equals the weighted sum of every
/// corner by the product of its per-axis weights `(1 - t)` or `t`.
#[inline]
pub fn trilinear<T: RealField + Copy>(corners: &[T; 8], t: [T; 3]) -> T {
    let [tx, ty, tz] = t;

    let c00 = lerp(corners[0], corners[1], tx);
    let c10 = lerp(corners[2], corners[3], tx);
    let c01 = lerp(corners[4], corners[5], tx);
    let c11 = lerp(corners[6], corners[7], tx);

    let c0 = lerp(c00, c10, ty);
    let c1 = lerp(c01, c11, ty);

    lerp(c0, c1, tz)
}
