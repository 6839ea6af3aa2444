use super::{Geometry, Vertex};

#[derive(Debug, Clone, Copy, Eq, PartialEq, thiserror::Error)]
pub enum MeshError {
    #[error("index count {0} is not a multiple of 3")]
    NotTriangles(usize),
    #[error("index {index} out of range for {vertices} vertices")]
    IndexOutOfRange { index: u32, vertices: usize },
}

/// Pre-triangulated polygon.
///
/// Texture coordinates follow the positions (pattern mapping), so the
/// texture tiles in world space instead of stretching over the mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshShape {
    positions: Vec<[f32; 2]>,
    indices: Vec<u32>,
}

impl MeshShape {
    pub fn new(positions: Vec<[f32; 2]>, indices: Vec<u32>) -> Result<Self, MeshError> {
        if indices.len() % 3 != 0 {
            return Err(MeshError::NotTriangles(indices.len()));
        }
        if let Some(&index) = indices.iter().find(|&&i| i as usize >= positions.len()) {
            return Err(MeshError::IndexOutOfRange { index, vertices: positions.len() });
        }
        Ok(Self { positions, indices })
    }

    #[inline]
    pub fn positions(&self) -> &[[f32; 2]] {
        &self.positions
    }

    #[inline]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub(crate) fn emit_geometry(&self) -> Geometry {
        let vertices = self
            .positions
            .iter()
            .map(|&[x, y]| Vertex::new([x, y], [x, -y]))
            .collect();
        Geometry { vertices, indices: self.indices.clone() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_partial_triangle() {
        let err = MeshShape::new(vec![[0.0, 0.0]; 3], vec![0, 1]).unwrap_err();
        assert_eq!(err, MeshError::NotTriangles(2));
    }

    #[test]
    fn rejects_dangling_index() {
        let err = MeshShape::new(vec![[0.0, 0.0]; 3], vec![0, 1, 3]).unwrap_err();
        assert_eq!(err, MeshError::IndexOutOfRange { index: 3, vertices: 3 });
    }

    #[test]
    fn uv_mirrors_y() {
        let m = MeshShape::new(vec![[1.0, 2.0], [0.0, 0.0], [3.0, 0.0]], vec![0, 1, 2]).unwrap();
        assert_eq!(m.emit_geometry().vertices[0].uv, [1.0, -2.0]);
    }
}
