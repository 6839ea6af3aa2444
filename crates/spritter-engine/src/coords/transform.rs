/// 2D affine transform.
///
/// Maps `(x, y)` to `(a*x + c*y + tx, b*x + d*y + ty)`. Only the storage and
/// a few constructors live here; composing transforms is the caller's job.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform2D {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub tx: f32,
    pub ty: f32,
}

impl Transform2D {
    pub const IDENTITY: Self = Self { a: 1.0, b: 0.0, c: 0.0, d: 1.0, tx: 0.0, ty: 0.0 };

    #[inline]
    pub const fn translation(tx: f32, ty: f32) -> Self {
        Self { tx, ty, ..Self::IDENTITY }
    }

    #[inline]
    pub const fn scale(sx: f32, sy: f32) -> Self {
        Self { a: sx, d: sy, ..Self::IDENTITY }
    }

    /// Counter-clockwise rotation by `radians`.
    #[inline]
    pub fn rotation(radians: f32) -> Self {
        let (s, c) = radians.sin_cos();
        Self { a: c, b: s, c: -s, d: c, tx: 0.0, ty: 0.0 }
    }

    #[inline]
    pub fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        (self.a * x + self.c * y + self.tx, self.b * x + self.d * y + self.ty)
    }

    /// Column-major 3x3 matrix with each column padded to a `vec4`.
    ///
    /// This is the layout WGSL uses for `mat3x3<f32>` inside storage buffers.
    pub fn to_padded_columns(&self) -> [[f32; 4]; 3] {
        [
            [self.a, self.b, 0.0, 0.0],
            [self.c, self.d, 0.0, 0.0],
            [self.tx, self.ty, 1.0, 0.0],
        ]
    }
}

impl Default for Transform2D {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_is_noop() {
        assert_eq!(Transform2D::IDENTITY.apply(3.0, -2.0), (3.0, -2.0));
    }

    #[test]
    fn translation_then_columns() {
        let t = Transform2D::translation(5.0, 7.0);
        assert_eq!(t.apply(1.0, 1.0), (6.0, 8.0));
        assert_eq!(t.to_padded_columns()[2], [5.0, 7.0, 1.0, 0.0]);
    }

    #[test]
    fn quarter_turn_maps_x_to_y() {
        let (x, y) = Transform2D::rotation(core::f32::consts::FRAC_PI_2).apply(1.0, 0.0);
        assert!(x.abs() < 1e-6);
        assert!((y - 1.0).abs() < 1e-6);
    }
}
