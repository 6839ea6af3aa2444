use core::ops::Range;

use crate::batch::FrameBatch;

use super::common::MASK_WRITE_REFERENCE;
use super::{PipelineCache, PipelineFactory, PipelineKind};

/// Receiver of encoded draw commands.
///
/// Vertex ranges index the puller stream; the sink is expected to have the
/// puller buffer and the bind group bound already.
pub trait DrawSink<P> {
    fn set_pipeline(&mut self, pipeline: &P);
    fn set_stencil_reference(&mut self, reference: u32);
    fn draw(&mut self, vertices: Range<u32>);
}

impl DrawSink<wgpu::RenderPipeline> for wgpu::RenderPass<'_> {
    #[inline]
    fn set_pipeline(&mut self, pipeline: &wgpu::RenderPipeline) {
        wgpu::RenderPass::set_pipeline(self, pipeline);
    }

    #[inline]
    fn set_stencil_reference(&mut self, reference: u32) {
        wgpu::RenderPass::set_stencil_reference(self, reference);
    }

    #[inline]
    fn draw(&mut self, vertices: Range<u32>) {
        wgpu::RenderPass::draw(self, vertices, 0..1);
    }
}

/// Counters from one `encode_passes` call.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct EncodeStats {
    pub mask_draws: u32,
    pub draws: u32,
}

/// Issues the draws of a resolved batch into `sink`.
///
/// Mask layers first, each with its stencil-write pipeline; then every pass
/// in order: stencil reference, opaque range, transparent range. Empty
/// ranges are skipped, as are draws whose mask the cache has no table slot
/// for. An unresolved batch encodes nothing.
pub fn encode_passes<F, S>(batch: &FrameBatch, cache: &mut PipelineCache<F>, sink: &mut S) -> EncodeStats
where
    F: PipelineFactory,
    S: DrawSink<F::Pipeline> + ?Sized,
{
    let mut stats = EncodeStats::default();
    if !batch.is_resolved() {
        log::warn!("encode_passes: batch changed since last resolve; frame skipped");
        return stats;
    }

    let mut reference_set = false;
    for mask in batch.mask_batches() {
        if mask.range.is_empty() {
            continue;
        }
        let Some(writer) = cache.mask_writer(mask.layer) else { continue };
        if !reference_set {
            sink.set_stencil_reference(MASK_WRITE_REFERENCE);
            reference_set = true;
        }
        sink.set_pipeline(writer);
        sink.draw(mask.range.vertices());
        stats.mask_draws += 1;
    }

    for pass in batch.passes() {
        if pass.opaque.is_empty() && pass.transparent.is_empty() {
            continue;
        }
        sink.set_stencil_reference(pass.mask.stencil_reference());

        for (kind, range) in [
            (PipelineKind::Opaque, pass.opaque),
            (PipelineKind::Transparent, pass.transparent),
        ] {
            if range.is_empty() {
                continue;
            }
            let Some(pipeline) = cache.get(kind, pass.mask.mask_bits) else {
                log::warn!(
                    "encode_passes: no {kind:?} pipeline for mask {:#010b}; draw skipped",
                    pass.mask.mask_bits.bits()
                );
                continue;
            };
            sink.set_pipeline(pipeline);
            sink.draw(range.vertices());
            stats.draws += 1;
        }
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::GeometryArena;
    use crate::batch::{MaskBits, MaskLayer, Priority};
    use crate::config::SceneConfig;
    use crate::drawable::shapes::{SpriteShape, VERTEX_WORDS};
    use crate::drawable::{Drawable, DrawableStore};
    use crate::paint::Color;
    use crate::render::PipelineDesc;

    struct Echo;

    impl PipelineFactory for Echo {
        type Pipeline = PipelineDesc;

        fn build(&mut self, desc: PipelineDesc) -> PipelineDesc {
            desc
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Cmd {
        Pipeline(PipelineDesc),
        Reference(u32),
        Draw(Range<u32>),
    }

    #[derive(Default)]
    struct Recorder(Vec<Cmd>);

    impl DrawSink<PipelineDesc> for Recorder {
        fn set_pipeline(&mut self, pipeline: &PipelineDesc) {
            self.0.push(Cmd::Pipeline(*pipeline));
        }

        fn set_stencil_reference(&mut self, reference: u32) {
            self.0.push(Cmd::Reference(reference));
        }

        fn draw(&mut self, vertices: Range<u32>) {
            self.0.push(Cmd::Draw(vertices));
        }
    }

    fn config() -> SceneConfig {
        SceneConfig { arena_slots: 64, mask_layers: 2, warm_mask_sets: 1, ..SceneConfig::default() }
    }

    struct Frame {
        arena: GeometryArena<f32>,
        store: DrawableStore,
        batch: FrameBatch,
    }

    impl Frame {
        fn new() -> Self {
            Self {
                arena: GeometryArena::new(64, VERTEX_WORDS),
                store: DrawableStore::new(),
                batch: FrameBatch::new(&config()),
            }
        }

        fn sprite(&mut self, priority: i32, opaque: bool) {
            let mut d = Drawable::build(SpriteShape::new(1.0, 1.0).into(), &mut self.arena).unwrap();
            if !opaque {
                d.tint = Color::WHITE.with_alpha(0.25);
            }
            let id = self.store.insert(d);
            let d = self.store.get(id).unwrap();
            self.batch.submit(id, d, Priority(priority));
        }

        fn mask(&mut self, layer: u8) {
            let d = Drawable::build(SpriteShape::new(1.0, 1.0).into(), &mut self.arena).unwrap();
            let id = self.store.insert(d);
            let d = self.store.get(id).unwrap();
            self.batch.submit_as_mask(id, d, layer);
        }

        fn encode(&mut self) -> (Vec<Cmd>, EncodeStats) {
            self.batch.resolve(&self.store);
            let mut cache = PipelineCache::new(Echo, &config());
            let mut rec = Recorder::default();
            let stats = encode_passes(&self.batch, &mut cache, &mut rec);
            (rec.0, stats)
        }
    }

    fn draw(kind: PipelineKind, bits: u8) -> Cmd {
        Cmd::Pipeline(PipelineDesc::Draw { kind, mask: MaskBits(bits) })
    }

    // ── passes ────────────────────────────────────────────────────────────

    #[test]
    fn single_pass_draws_opaque_then_transparent() {
        let mut f = Frame::new();
        f.sprite(1, true);
        f.sprite(2, false);
        let (cmds, stats) = f.encode();

        assert_eq!(
            cmds,
            vec![
                Cmd::Reference(0),
                draw(PipelineKind::Opaque, 0),
                Cmd::Draw(0..6),
                draw(PipelineKind::Transparent, 0),
                Cmd::Draw(6..12),
            ]
        );
        assert_eq!(stats, EncodeStats { mask_draws: 0, draws: 2 });
    }

    #[test]
    fn empty_sub_ranges_are_skipped() {
        let mut f = Frame::new();
        f.sprite(1, false);
        let (cmds, _) = f.encode();
        assert_eq!(
            cmds,
            vec![Cmd::Reference(0), draw(PipelineKind::Transparent, 0), Cmd::Draw(0..6)]
        );
    }

    #[test]
    fn masked_pass_uses_mask_pipeline_and_reference() {
        let mut f = Frame::new();
        f.batch.declare_mask_event(Priority(2), 1, false);
        f.batch.declare_mask_event(Priority(3), 0, true);
        f.sprite(1, true);
        f.sprite(2, true);
        f.sprite(3, true);
        let (cmds, stats) = f.encode();

        assert_eq!(
            cmds,
            vec![
                Cmd::Reference(0),
                draw(PipelineKind::Opaque, 0b00),
                Cmd::Draw(0..6),
                Cmd::Reference(0b10),
                draw(PipelineKind::Opaque, 0b10),
                Cmd::Draw(6..12),
                // Layer 0 is anti: its reference bit is cleared.
                Cmd::Reference(0b10),
                draw(PipelineKind::Opaque, 0b11),
                Cmd::Draw(12..18),
            ]
        );
        assert_eq!(stats.draws, 3);
    }

    #[test]
    fn mask_layers_are_written_before_passes() {
        let mut f = Frame::new();
        f.mask(1);
        f.batch.declare_mask_event(Priority(0), 1, false);
        f.sprite(0, true);
        let (cmds, stats) = f.encode();

        let layer = MaskLayer::new(1, 2).unwrap();
        assert_eq!(
            cmds,
            vec![
                Cmd::Reference(MASK_WRITE_REFERENCE),
                Cmd::Pipeline(PipelineDesc::MaskWrite { layer }),
                Cmd::Draw(0..6),
                Cmd::Reference(0b10),
                draw(PipelineKind::Opaque, 0b10),
                Cmd::Draw(6..12),
            ]
        );
        assert_eq!(stats, EncodeStats { mask_draws: 1, draws: 1 });
    }

    #[test]
    fn mask_beyond_cache_layers_skips_draw() {
        let mut f = Frame::new();
        f.batch.declare_mask_event(Priority(1), 1, false);
        f.sprite(0, true);
        f.sprite(1, true);
        f.batch.resolve(&f.store);

        let narrow = SceneConfig { mask_layers: 1, ..config() };
        let mut cache = PipelineCache::new(Echo, &narrow);
        let mut rec = Recorder::default();
        let stats = encode_passes(&f.batch, &mut cache, &mut rec);

        assert_eq!(
            rec.0,
            vec![
                Cmd::Reference(0),
                draw(PipelineKind::Opaque, 0),
                Cmd::Draw(0..6),
                Cmd::Reference(0b10),
            ]
        );
        assert_eq!(stats.draws, 1);
    }

    #[test]
    fn unresolved_batch_encodes_nothing() {
        let mut f = Frame::new();
        f.sprite(0, true);
        let mut cache = PipelineCache::new(Echo, &config());
        let mut rec = Recorder::default();

        let stats = encode_passes(&f.batch, &mut cache, &mut rec);
        assert!(rec.0.is_empty());
        assert_eq!(stats, EncodeStats::default());
    }

    #[test]
    fn empty_frame_encodes_nothing() {
        let mut f = Frame::new();
        let (cmds, stats) = f.encode();
        assert!(cmds.is_empty());
        assert_eq!(stats, EncodeStats::default());
    }
}
