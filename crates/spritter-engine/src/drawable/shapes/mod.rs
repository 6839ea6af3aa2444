//! Shape kinds a drawable can carry.
//!
//! Extending:
//! - add a module here with a `*Shape` type that can emit its `Geometry`
//! - add a variant to `Shape` and route the three methods to it
//!
//! The batch and the encoder never look past `Shape`.

pub(crate) mod mesh;
pub(crate) mod sprite;

pub use mesh::{MeshError, MeshShape};
pub use sprite::SpriteShape;

use super::DrawableFlags;

/// Words per arena slot: one vertex.
pub const VERTEX_WORDS: usize = 6;

/// One geometry vertex as stored in the arena.
///
/// `q` is the projective texture weight; 1 for affine mapping.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Vertex {
    pub pos: [f32; 2],
    pub uv: [f32; 2],
    pub q: f32,
}

impl Vertex {
    #[inline]
    pub const fn new(pos: [f32; 2], uv: [f32; 2]) -> Self {
        Self { pos, uv, q: 1.0 }
    }

    /// Arena word layout: `x, y, u, v, q, 0`.
    #[inline]
    pub fn to_words(self) -> [f32; VERTEX_WORDS] {
        [self.pos[0], self.pos[1], self.uv[0], self.uv[1], self.q, 0.0]
    }
}

/// Vertices plus a triangle list indexing into them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Geometry {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

/// Closed set of drawable shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Sprite(SpriteShape),
    Mesh(MeshShape),
}

impl Shape {
    /// Number of arena slots the shape occupies.
    pub fn vertex_count(&self) -> usize {
        match self {
            Shape::Sprite(_) => SpriteShape::VERTEX_COUNT,
            Shape::Mesh(m) => m.positions().len(),
        }
    }

    pub fn emit_geometry(&self) -> Geometry {
        match self {
            Shape::Sprite(s) => s.emit_geometry(),
            Shape::Mesh(m) => m.emit_geometry(),
        }
    }

    /// Flags the shape forces on its drawable. These feed the opacity test.
    pub fn opacity_hint(&self) -> DrawableFlags {
        match self {
            Shape::Sprite(_) => DrawableFlags::empty(),
            Shape::Mesh(_) => DrawableFlags::PATTERN_MODE | DrawableFlags::SECONDARY_PATTERN_MODE,
        }
    }
}

impl From<SpriteShape> for Shape {
    fn from(s: SpriteShape) -> Self {
        Shape::Sprite(s)
    }
}

impl From<MeshShape> for Shape {
    fn from(m: MeshShape) -> Self {
        Shape::Mesh(m)
    }
}
