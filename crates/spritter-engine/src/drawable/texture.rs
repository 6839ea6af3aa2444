/// Atlas-side description of one named texture.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TextureInfo {
    /// Top-left corner inside the atlas, in texels.
    pub pos: [f32; 2],
    /// Extent inside the atlas, in texels.
    pub size: [f32; 2],
    /// Every texel has alpha 1.
    pub fully_opaque: bool,
}

/// Texture atlas collaborator.
///
/// Packing and image upload live outside this crate; drawables only need
/// bounds, the opacity bit and the atlas edge length.
pub trait TextureAtlas {
    /// Edge length of the (square) atlas, in texels.
    fn dimension(&self) -> f32;

    fn texture_info(&self, name: &str) -> Option<TextureInfo>;
}
