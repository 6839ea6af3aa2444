use crate::arena::{ArenaError, GeometryArena, Slot};
use crate::coords::Transform2D;
use crate::paint::Color;

use super::shapes::{Geometry, Shape};
use super::{DrawableFlags, DrawablePayload, TextureAtlas, TextureInfo};

#[derive(Debug, Copy, Clone, Default, PartialEq)]
struct TextureState {
    /// Atlas origin of the bound texture; sub-texture offsets are relative to it.
    origin: [f32; 2],
    pos: [f32; 2],
    size: [f32; 2],
    fully_opaque: bool,
}

impl TextureState {
    fn bind(info: &TextureInfo) -> Self {
        Self { origin: info.pos, pos: info.pos, size: info.size, fully_opaque: info.fully_opaque }
    }

    fn select_sub(&mut self, x: f32, y: f32, w: f32, h: f32) {
        self.pos = [self.origin[0] + x, self.origin[1] + y];
        self.size = [w, h];
    }
}

/// Long-lived drawable: geometry slots in the arena plus the payload inputs.
///
/// Drawables are owned by [`DrawableStore`](super::DrawableStore) and
/// addressed by [`DrawableId`](super::DrawableId); they survive across
/// frames until released.
#[derive(Debug)]
pub struct Drawable {
    shape: Shape,
    slots: Vec<Slot>,
    /// Triangle list over arena slot indices.
    indices: Vec<u32>,

    pub transform: Transform2D,
    /// Texture "camera": scaling it up makes the texture tile smaller.
    pub tex_transform: Transform2D,
    pub tex2_transform: Transform2D,

    pub tint: Color,
    pub threshold_lower: Color,
    pub threshold_upper: Color,

    texture: TextureState,
    texture2: TextureState,
    tex2_alpha: f32,
    atlas_dimension: f32,
    displacement: f32,

    flags: DrawableFlags,
    released: bool,
}

impl Drawable {
    /// Allocates arena slots for `shape` and writes its vertices.
    pub(crate) fn build(shape: Shape, arena: &mut GeometryArena<f32>) -> Result<Self, ArenaError> {
        let geometry = shape.emit_geometry();
        let slots = arena.allocate(geometry.vertices.len())?;
        let indices = write_geometry(arena, &geometry, &slots);
        let flags = DrawableFlags::DEFAULT | shape.opacity_hint();

        Ok(Self {
            shape,
            slots,
            indices,
            transform: Transform2D::IDENTITY,
            tex_transform: Transform2D::IDENTITY,
            tex2_transform: Transform2D::IDENTITY,
            tint: Color::WHITE,
            threshold_lower: Color::WHITE,
            threshold_upper: Color::TRANSPARENT,
            texture: TextureState::default(),
            texture2: TextureState::default(),
            tex2_alpha: 0.0,
            atlas_dimension: 1.0,
            displacement: 0.0,
            flags,
            released: false,
        })
    }

    /// Swaps in new geometry and returns the slots that backed the old one.
    ///
    /// The caller must not free the returned slots before the current frame
    /// has been handed to the GPU. On error nothing changes.
    pub(crate) fn replace_geometry(
        &mut self,
        shape: Shape,
        arena: &mut GeometryArena<f32>,
    ) -> Result<Vec<Slot>, ArenaError> {
        let geometry = shape.emit_geometry();
        let slots = arena.allocate(geometry.vertices.len())?;
        self.indices = write_geometry(arena, &geometry, &slots);

        self.flags = (self.flags - self.shape.opacity_hint()) | shape.opacity_hint();
        self.shape = shape;
        Ok(std::mem::replace(&mut self.slots, slots))
    }

    #[inline]
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    #[inline]
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    #[inline]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    #[inline]
    pub fn is_released(&self) -> bool {
        self.released
    }

    pub(crate) fn mark_released(&mut self) -> bool {
        !std::mem::replace(&mut self.released, true)
    }

    pub(crate) fn take_slots(&mut self) -> Vec<Slot> {
        self.indices.clear();
        std::mem::take(&mut self.slots)
    }

    // ── flags ─────────────────────────────────────────────────────────────

    #[inline]
    pub fn flags(&self) -> DrawableFlags {
        self.flags
    }

    #[inline]
    pub fn set_flags(&mut self, flags: DrawableFlags) {
        self.flags |= flags;
    }

    #[inline]
    pub fn clear_flags(&mut self, flags: DrawableFlags) {
        self.flags -= flags;
    }

    #[inline]
    pub fn reset_flags(&mut self) {
        self.flags = self.flags.reset();
    }

    pub fn set_mask_mode(&mut self, enable: bool) {
        self.flags.set(DrawableFlags::MASK_TEXTURE_MODE, enable);
    }

    pub fn set_displacement(&mut self, strength: f32) {
        self.displacement = strength;
    }

    // ── textures ──────────────────────────────────────────────────────────

    /// Adopts `atlas` for subsequent texture bindings and unbinds both textures.
    pub fn use_atlas(&mut self, atlas: &impl TextureAtlas) {
        self.atlas_dimension = atlas.dimension().max(1.0);
        self.clear_flags(DrawableFlags::TEXTURE_USE);
    }

    /// Binds the primary texture, or unbinds it on `None`.
    pub fn set_texture(&mut self, info: Option<TextureInfo>) {
        match info {
            Some(info) => {
                self.texture = TextureState::bind(&info);
                self.set_flags(DrawableFlags::USE_TEXTURE);
            }
            None => self.clear_flags(DrawableFlags::USE_TEXTURE),
        }
    }

    /// Binds the secondary texture, or unbinds it (and zeroes its alpha) on `None`.
    pub fn set_secondary_texture(&mut self, info: Option<TextureInfo>) {
        match info {
            Some(info) => {
                self.texture2 = TextureState::bind(&info);
                self.set_flags(DrawableFlags::USE_SECONDARY_TEXTURE);
            }
            None => {
                self.clear_flags(DrawableFlags::USE_SECONDARY_TEXTURE);
                self.tex2_alpha = 0.0;
            }
        }
    }

    /// Restricts the primary texture to a sub-rectangle relative to its origin.
    pub fn set_sub_texture(&mut self, x: f32, y: f32, w: f32, h: f32) {
        self.texture.select_sub(x, y, w, h);
    }

    pub fn set_secondary_sub_texture(&mut self, x: f32, y: f32, w: f32, h: f32) {
        self.texture2.select_sub(x, y, w, h);
    }

    pub fn set_secondary_alpha(&mut self, alpha: f32) {
        self.tex2_alpha = alpha.clamp(0.0, 1.0);
    }

    // ── classification / payload ──────────────────────────────────────────

    /// True when the drawable can never produce a partially transparent pixel.
    ///
    /// Requires: tint alpha 1, threshold-lower alpha 1 (no threshold cutting),
    /// a repeating primary texture, the primary texture (if any) fully opaque,
    /// and the secondary texture (if any) not used as an alpha mask.
    pub fn is_fully_opaque(&self) -> bool {
        let f = self.flags;
        self.tint.is_opaque()
            && self.threshold_lower.is_opaque()
            && f.contains(DrawableFlags::REPEAT_TEXTURE)
            && (!f.contains(DrawableFlags::USE_TEXTURE) || self.texture.fully_opaque)
            && (!f.contains(DrawableFlags::USE_SECONDARY_TEXTURE)
                || !f.contains(DrawableFlags::MASK_TEXTURE_MODE))
    }

    /// Serializes the payload inputs. `ordering` is left at zero for the batch to fill.
    pub fn payload(&self) -> DrawablePayload {
        DrawablePayload {
            transform: self.transform.to_padded_columns(),
            tex_transform: self.tex_transform.to_padded_columns(),
            tex2_transform: self.tex2_transform.to_padded_columns(),
            tint: self.tint.to_array(),
            threshold_lower: self.threshold_lower.to_array(),
            threshold_upper: self.threshold_upper.to_array(),
            tex_pos: self.texture.pos,
            tex_size: self.texture.size,
            tex2_pos: self.texture2.pos,
            tex2_size: self.texture2.size,
            tex2_alpha: self.tex2_alpha,
            atlas_dimension: self.atlas_dimension,
            inv_atlas_dimension: 1.0 / self.atlas_dimension,
            displacement: self.displacement,
            ordering: 0.0,
            flags: self.flags.bits(),
            _pad: [0; 2],
        }
    }
}

/// Writes `geometry` into `slots` and maps its local indices onto slot indices.
fn write_geometry(arena: &mut GeometryArena<f32>, geometry: &Geometry, slots: &[Slot]) -> Vec<u32> {
    for (slot, vertex) in slots.iter().zip(&geometry.vertices) {
        arena.write(*slot, &vertex.to_words());
    }
    geometry
        .indices
        .iter()
        .filter_map(|&i| slots.get(i as usize).map(|s| s.index()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drawable::shapes::{MeshShape, SpriteShape, VERTEX_WORDS};

    struct Atlas;

    impl TextureAtlas for Atlas {
        fn dimension(&self) -> f32 {
            1024.0
        }

        fn texture_info(&self, name: &str) -> Option<TextureInfo> {
            match name {
                "brick" => Some(TextureInfo { pos: [0.0, 0.0], size: [64.0, 64.0], fully_opaque: true }),
                "glass" => Some(TextureInfo { pos: [64.0, 0.0], size: [64.0, 64.0], fully_opaque: false }),
                _ => None,
            }
        }
    }

    fn arena() -> GeometryArena<f32> {
        GeometryArena::new(64, VERTEX_WORDS)
    }

    fn sprite(arena: &mut GeometryArena<f32>) -> Drawable {
        Drawable::build(SpriteShape::new(8.0, 8.0).into(), arena).unwrap()
    }

    // ── geometry ──────────────────────────────────────────────────────────

    #[test]
    fn build_writes_vertices_and_maps_indices() {
        let mut a = arena();
        let _pad = a.allocate(3).unwrap();
        let d = sprite(&mut a);

        assert_eq!(d.slots().len(), 4);
        let first = d.slots()[0];
        assert_eq!(d.indices()[0], first.index());
        assert_eq!(&a.slot(first)[..2], &[8.0, 8.0]);
    }

    #[test]
    fn build_fails_when_arena_is_short() {
        let mut a = GeometryArena::new(3, VERTEX_WORDS);
        let err = Drawable::build(SpriteShape::new(1.0, 1.0).into(), &mut a).unwrap_err();
        assert_eq!(err, ArenaError::Exhausted { requested: 4, available: 3 });
    }

    #[test]
    fn replace_geometry_returns_old_slots_and_swaps_hint() {
        let mut a = arena();
        let mut d = sprite(&mut a);
        let old: Vec<_> = d.slots().to_vec();

        let mesh = MeshShape::new(vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]], vec![0, 1, 2]).unwrap();
        let returned = d.replace_geometry(mesh.into(), &mut a).unwrap();

        assert_eq!(returned, old);
        assert_eq!(d.slots().len(), 3);
        assert!(d.flags().contains(DrawableFlags::PATTERN_MODE));
        // Old slots are still live until the caller frees them.
        assert!(old.iter().all(|&s| a.is_live(s)));
    }

    // ── opacity ───────────────────────────────────────────────────────────

    #[test]
    fn untextured_default_is_opaque() {
        let mut a = arena();
        assert!(sprite(&mut a).is_fully_opaque());
    }

    #[test]
    fn opaque_repeating_primary_without_secondary_is_opaque() {
        let mut a = arena();
        let mut d = sprite(&mut a);
        d.use_atlas(&Atlas);
        d.set_texture(Atlas.texture_info("brick"));
        assert!(d.flags().contains(DrawableFlags::USE_TEXTURE | DrawableFlags::REPEAT_TEXTURE));
        assert!(d.is_fully_opaque());
    }

    #[test]
    fn translucent_inputs_are_transparent() {
        let mut a = arena();

        let mut tinted = sprite(&mut a);
        tinted.tint = Color::WHITE.with_alpha(0.5);
        assert!(!tinted.is_fully_opaque());

        let mut thresholded = sprite(&mut a);
        thresholded.threshold_lower = Color::WHITE.with_alpha(0.2);
        assert!(!thresholded.is_fully_opaque());

        let mut glass = sprite(&mut a);
        glass.set_texture(Atlas.texture_info("glass"));
        assert!(!glass.is_fully_opaque());

        let mut clamped = sprite(&mut a);
        clamped.clear_flags(DrawableFlags::REPEAT_TEXTURE);
        assert!(!clamped.is_fully_opaque());
    }

    #[test]
    fn secondary_texture_only_matters_as_mask() {
        let mut a = arena();
        let mut d = sprite(&mut a);
        d.set_texture(Atlas.texture_info("brick"));
        d.set_secondary_texture(Atlas.texture_info("glass"));
        assert!(d.is_fully_opaque());

        d.set_mask_mode(true);
        assert!(!d.is_fully_opaque());

        d.set_secondary_texture(None);
        assert!(d.is_fully_opaque());
    }

    // ── payload ───────────────────────────────────────────────────────────

    #[test]
    fn payload_carries_sub_texture_and_flags() {
        let mut a = arena();
        let mut d = sprite(&mut a);
        d.use_atlas(&Atlas);
        d.set_texture(Atlas.texture_info("glass"));
        d.set_sub_texture(8.0, 4.0, 16.0, 16.0);
        d.transform = Transform2D::translation(3.0, 4.0);

        let p = d.payload();
        assert_eq!(p.tex_pos, [72.0, 4.0]);
        assert_eq!(p.tex_size, [16.0, 16.0]);
        assert_eq!(p.atlas_dimension, 1024.0);
        assert_eq!(p.transform[2], [3.0, 4.0, 1.0, 0.0]);
        assert_eq!(DrawableFlags::from_bits_truncate(p.flags), d.flags());
        assert_eq!(p.ordering, 0.0);
    }
}
