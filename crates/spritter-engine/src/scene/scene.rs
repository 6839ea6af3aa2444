use crate::arena::GeometryArena;
use crate::batch::{BatchWarning, FrameBatch, FrameWarnings, Holder, Priority};
use crate::config::SceneConfig;
use crate::drawable::{Drawable, DrawableId, DrawableStore, Shape, VERTEX_WORDS};

use super::{BufferKind, SceneError, UploadSink};

/// Engine context: everything one frame loop needs, passed explicitly.
///
/// Frame lifecycle:
/// 1. edit drawables, `submit` / `submit_as_mask` / `declare_mask_*`
/// 2. `resolve` (or let `upload` do it)
/// 3. `upload`, then encode the batch's passes
/// 4. `flush` once the frame's commands are handed to the GPU
#[derive(Debug)]
pub struct Scene {
    config: SceneConfig,
    arena: GeometryArena<f32>,
    store: DrawableStore,
    batch: FrameBatch,
}

impl Scene {
    pub fn new(config: SceneConfig) -> Result<Self, SceneError> {
        config.validate()?;

        log::debug!(
            "scene: {} arena slots, {} holders/frame, {} mask layers",
            config.arena_slots,
            config.max_holders,
            config.mask_layers
        );

        Ok(Self {
            arena: GeometryArena::new(config.arena_slots, VERTEX_WORDS),
            store: DrawableStore::new(),
            batch: FrameBatch::new(&config),
            config,
        })
    }

    #[inline]
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    #[inline]
    pub fn arena(&self) -> &GeometryArena<f32> {
        &self.arena
    }

    #[inline]
    pub fn store(&self) -> &DrawableStore {
        &self.store
    }

    #[inline]
    pub fn batch(&self) -> &FrameBatch {
        &self.batch
    }

    // ── drawables ─────────────────────────────────────────────────────────

    /// Allocates geometry for `shape` and stores a new drawable.
    pub fn create(&mut self, shape: impl Into<Shape>) -> Result<DrawableId, SceneError> {
        let drawable = Drawable::build(shape.into(), &mut self.arena)?;
        Ok(self.store.insert(drawable))
    }

    #[inline]
    pub fn drawable(&self, id: DrawableId) -> Option<&Drawable> {
        self.store.get(id).filter(|d| !d.is_released())
    }

    #[inline]
    pub fn drawable_mut(&mut self, id: DrawableId) -> Option<&mut Drawable> {
        self.store.get_mut(id)
    }

    /// Replaces a drawable's geometry.
    ///
    /// The old slots stay allocated until the next `flush`, since this
    /// frame's commands may still read them.
    pub fn set_shape(&mut self, id: DrawableId, shape: impl Into<Shape>) -> Result<(), SceneError> {
        let drawable = self.store.get_mut(id).ok_or(SceneError::UnknownDrawable)?;
        let old = drawable.replace_geometry(shape.into(), &mut self.arena)?;
        self.store.retire_slots(old);
        Ok(())
    }

    /// Marks a drawable dead. Its geometry is reclaimed at the next `flush`.
    ///
    /// Submissions made earlier in the frame still draw.
    #[inline]
    pub fn release(&mut self, id: DrawableId) -> bool {
        self.store.release(id)
    }

    // ── frame ─────────────────────────────────────────────────────────────

    pub fn submit(&mut self, id: DrawableId, priority: impl Into<Priority>) -> Option<Holder> {
        let Some(drawable) = self.store.get(id).filter(|d| !d.is_released()) else {
            self.batch.warn(BatchWarning::StaleDrawable);
            return None;
        };
        self.batch.submit(id, drawable, priority.into())
    }

    pub fn submit_as_mask(&mut self, id: DrawableId, layer: u8) -> Option<Holder> {
        let Some(drawable) = self.store.get(id).filter(|d| !d.is_released()) else {
            self.batch.warn(BatchWarning::StaleDrawable);
            return None;
        };
        self.batch.submit_as_mask(id, drawable, layer)
    }

    #[inline]
    pub fn declare_mask_event(&mut self, priority: impl Into<Priority>, layer: u8, anti: bool) -> bool {
        self.batch.declare_mask_event(priority.into(), layer, anti)
    }

    #[inline]
    pub fn declare_mask_clear(&mut self, priority: impl Into<Priority>, layer: u8) -> bool {
        self.batch.declare_mask_clear(priority.into(), layer)
    }

    #[inline]
    pub fn resolve(&mut self) {
        self.batch.resolve(&self.store);
    }

    /// Writes this frame's payload and puller regions and the dirty arena span.
    ///
    /// Resolves first if the batch changed since the last resolve.
    pub fn upload(&mut self, sink: &mut impl UploadSink) {
        if !self.batch.is_resolved() {
            self.resolve();
        }

        let payloads: &[u8] = bytemuck::cast_slice(self.batch.payloads());
        if !payloads.is_empty() {
            sink.write_region(BufferKind::Payload, 0, payloads);
        }

        let puller: &[u8] = bytemuck::cast_slice(self.batch.puller());
        if !puller.is_empty() {
            sink.write_region(BufferKind::Puller, 0, puller);
        }

        if let Some(words) = self.arena.take_dirty() {
            let offset = (words.start * size_of::<f32>()) as u64;
            let bytes: &[u8] = bytemuck::cast_slice(&self.arena.as_slice()[words]);
            sink.write_region(BufferKind::Arena, offset, bytes);
        }
    }

    /// Ends the frame: resets the batch and frees geometry released during it.
    pub fn flush(&mut self) {
        let warnings = self.batch.warnings();
        if warnings.total() > 0 {
            log::debug!("frame ended with {} warnings: {warnings:?}", warnings.total());
        }

        self.batch.flush();
        self.store.reclaim(&mut self.arena);
    }

    /// Warnings recorded since the last flush.
    #[inline]
    pub fn warnings(&self) -> FrameWarnings {
        self.batch.warnings()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::ArenaError;
    use crate::config::ConfigError;
    use crate::drawable::PAYLOAD_BYTES;
    use crate::drawable::shapes::{MeshShape, SpriteShape};

    #[derive(Default)]
    struct RecordingSink {
        writes: Vec<(BufferKind, u64, usize)>,
    }

    impl UploadSink for RecordingSink {
        fn write_region(&mut self, buffer: BufferKind, offset: u64, bytes: &[u8]) {
            self.writes.push((buffer, offset, bytes.len()));
        }
    }

    fn scene() -> Scene {
        Scene::new(SceneConfig {
            arena_slots: 16,
            max_holders: 8,
            max_mask_events: 4,
            max_mask_holders: 2,
            payload_capacity: 16,
            puller_capacity: 256,
            mask_layers: 2,
            warm_mask_sets: 1,
        })
        .unwrap()
    }

    fn sprite() -> SpriteShape {
        SpriteShape::new(8.0, 8.0)
    }

    fn triangle() -> MeshShape {
        MeshShape::new(vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]], vec![0, 1, 2]).unwrap()
    }

    // ── construction ──────────────────────────────────────────────────────

    #[test]
    fn invalid_config_is_rejected() {
        let err = Scene::new(SceneConfig { max_holders: 0, ..SceneConfig::default() }).unwrap_err();
        assert_eq!(err, SceneError::Config(ConfigError::ZeroCapacity("max_holders")));
    }

    #[test]
    fn create_propagates_arena_exhaustion() {
        let mut s = scene();
        for _ in 0..4 {
            s.create(sprite()).unwrap();
        }
        let err = s.create(sprite()).unwrap_err();
        assert_eq!(err, SceneError::Arena(ArenaError::Exhausted { requested: 4, available: 0 }));
    }

    // ── lifetime ──────────────────────────────────────────────────────────

    #[test]
    fn release_defers_reclamation_to_flush() {
        let mut s = scene();
        let id = s.create(sprite()).unwrap();
        assert_eq!(s.arena().free_count(), 12);

        assert!(s.release(id));
        assert!(!s.release(id));
        assert!(s.drawable(id).is_none());
        assert_eq!(s.arena().free_count(), 12);

        s.flush();
        assert_eq!(s.arena().free_count(), 16);
        assert!(s.store().get(id).is_none());
    }

    #[test]
    fn holder_submitted_before_release_still_draws() {
        let mut s = scene();
        let id = s.create(sprite()).unwrap();
        s.submit(id, 0).unwrap();
        s.release(id);
        s.resolve();

        assert_eq!(s.batch().passes().len(), 1);
        assert_eq!(s.batch().puller().len(), 6);
        assert_eq!(s.warnings().total(), 0);
    }

    #[test]
    fn submitting_released_drawable_warns() {
        let mut s = scene();
        let id = s.create(sprite()).unwrap();
        s.release(id);

        assert!(s.submit(id, 0).is_none());
        assert!(s.submit_as_mask(id, 0).is_none());
        assert_eq!(s.warnings().stale_drawable, 2);

        s.flush();
        assert_eq!(s.warnings().total(), 0);
    }

    #[test]
    fn set_shape_defers_old_slots() {
        let mut s = scene();
        let id = s.create(sprite()).unwrap();
        let old: Vec<_> = s.drawable(id).unwrap().slots().to_vec();

        s.set_shape(id, triangle()).unwrap();
        assert_eq!(s.drawable(id).unwrap().indices(), &[4, 5, 6]);
        assert_eq!(s.store().pending_slot_count(), 4);
        assert!(old.iter().all(|&slot| s.arena().is_live(slot)));

        s.flush();
        assert!(old.iter().all(|&slot| !s.arena().is_live(slot)));
        assert_eq!(s.arena().free_count(), 13);
    }

    #[test]
    fn shape_replaced_before_resolve_draws_new_geometry() {
        let mut s = scene();
        let id = s.create(sprite()).unwrap();
        s.submit(id, 0).unwrap();
        s.set_shape(id, triangle()).unwrap();
        s.resolve();

        let vertices: Vec<_> = s.batch().puller().iter().map(|e| e.vertex).collect();
        assert_eq!(vertices, vec![4, 5, 6]);
    }

    #[test]
    fn set_shape_on_unknown_drawable_fails() {
        let mut s = scene();
        let id = s.create(sprite()).unwrap();
        s.release(id);
        assert_eq!(s.set_shape(id, sprite()), Err(SceneError::UnknownDrawable));
    }

    // ── upload ────────────────────────────────────────────────────────────

    #[test]
    fn upload_writes_each_region_once() {
        let mut s = scene();
        let a = s.create(sprite()).unwrap();
        let b = s.create(sprite()).unwrap();
        s.submit(a, 1);
        s.submit(b, 0);

        let mut sink = RecordingSink::default();
        s.upload(&mut sink);

        assert!(s.batch().is_resolved());
        assert_eq!(
            sink.writes,
            vec![
                (BufferKind::Payload, 0, 2 * PAYLOAD_BYTES),
                (BufferKind::Puller, 0, 12 * 8),
                (BufferKind::Arena, 0, 8 * VERTEX_WORDS * 4),
            ]
        );
    }

    #[test]
    fn arena_region_covers_only_new_geometry() {
        let mut s = scene();
        let _ = s.create(sprite()).unwrap();
        s.upload(&mut RecordingSink::default());
        s.flush();

        let id = s.create(triangle()).unwrap();
        s.submit(id, 0);
        let mut sink = RecordingSink::default();
        s.upload(&mut sink);

        let arena = sink.writes.iter().find(|w| w.0 == BufferKind::Arena).copied();
        let slot_bytes = (VERTEX_WORDS * 4) as u64;
        assert_eq!(arena, Some((BufferKind::Arena, 4 * slot_bytes, 3 * slot_bytes as usize)));
    }

    #[test]
    fn empty_frame_uploads_nothing() {
        let mut s = scene();
        let mut sink = RecordingSink::default();
        s.upload(&mut sink);
        assert!(sink.writes.is_empty());
    }
}
