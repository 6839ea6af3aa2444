use super::{Geometry, Vertex};

/// Axis-aligned textured quad centered on the drawable origin.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SpriteShape {
    /// Half extent along X.
    pub w: f32,
    /// Half extent along Y.
    pub h: f32,
}

impl SpriteShape {
    pub const VERTEX_COUNT: usize = 4;

    #[inline]
    pub const fn new(w: f32, h: f32) -> Self {
        Self { w, h }
    }

    pub(crate) fn emit_geometry(&self) -> Geometry {
        let (w, h) = (self.w, self.h);
        // tr, br, bl, tl; texture V grows downwards.
        let vertices = vec![
            Vertex::new([w, h], [0.5, -0.5]),
            Vertex::new([w, -h], [0.5, 0.5]),
            Vertex::new([-w, -h], [-0.5, 0.5]),
            Vertex::new([-w, h], [-0.5, -0.5]),
        ];
        Geometry { vertices, indices: vec![0, 1, 2, 0, 2, 3] }
    }
}
