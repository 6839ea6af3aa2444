/// Viewport size in world units.
///
/// Renderers upload this as a uniform; the vertex shader maps
/// `[-w/2, w/2] x [-h/2, h/2]` onto NDC.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }

    /// Reciprocal of the half extents, as uploaded to the shader.
    #[inline]
    pub fn inv_half_extent(self) -> [f32; 2] {
        [2.0 / self.width.max(1.0), 2.0 / self.height.max(1.0)]
    }
}
