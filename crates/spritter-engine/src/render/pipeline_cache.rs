use crate::batch::{MaskBits, MaskLayer};
use crate::config::SceneConfig;

/// Which half of a pass a pipeline draws.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum PipelineKind {
    /// Depth write + test, no blending.
    Opaque,
    /// Depth test only, premultiplied alpha blending.
    Transparent,
}

/// Everything that distinguishes one pipeline from another.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum PipelineDesc {
    /// Color pipeline whose stencil test compares the bits in `mask`.
    Draw { kind: PipelineKind, mask: MaskBits },
    /// Stencil-only pipeline writing the single bit of `layer`.
    MaskWrite { layer: MaskLayer },
}

/// Builds pipeline objects. Construction is assumed to be expensive.
pub trait PipelineFactory {
    type Pipeline;

    fn build(&mut self, desc: PipelineDesc) -> Self::Pipeline;
}

/// Memoized pipelines keyed by kind and mask bitmask.
///
/// Performance characteristics:
/// - one table per kind, `2^mask_layers` entries each, allocated up front
/// - the lowest `warm_mask_sets` bitmasks of both kinds are built at construction
/// - the rest are built on first `get`, then reused for the cache's lifetime
pub struct PipelineCache<F: PipelineFactory> {
    factory: F,
    opaque: Vec<Option<F::Pipeline>>,
    transparent: Vec<Option<F::Pipeline>>,
    /// One per mask layer, always built.
    mask_writers: Vec<F::Pipeline>,
}

impl<F: PipelineFactory> PipelineCache<F> {
    pub fn new(mut factory: F, config: &SceneConfig) -> Self {
        let table = config.mask_table_len();
        let warm = config.warm_mask_sets.min(table);

        let mut fill = |kind| -> Vec<Option<F::Pipeline>> {
            (0..table)
                .map(|bits| {
                    (bits < warm).then(|| {
                        factory.build(PipelineDesc::Draw { kind, mask: MaskBits(bits as u8) })
                    })
                })
                .collect()
        };
        let opaque = fill(PipelineKind::Opaque);
        let transparent = fill(PipelineKind::Transparent);

        let mask_writers = (0..config.mask_layers)
            .filter_map(|i| MaskLayer::new(i, config.mask_layers))
            .map(|layer| factory.build(PipelineDesc::MaskWrite { layer }))
            .collect();

        log::debug!(
            "pipeline cache: {} of {} draw pipelines warmed, {} mask writers",
            2 * warm,
            2 * table,
            config.mask_layers
        );

        Self { factory, opaque, transparent, mask_writers }
    }

    /// Returns the pipeline for `kind` testing `mask`, building it on first use.
    ///
    /// `None` when `mask` has bits beyond the configured layer count.
    pub fn get(&mut self, kind: PipelineKind, mask: MaskBits) -> Option<&F::Pipeline> {
        let table = match kind {
            PipelineKind::Opaque => &mut self.opaque,
            PipelineKind::Transparent => &mut self.transparent,
        };
        let slot = table.get_mut(mask.bits() as usize)?;

        let factory = &mut self.factory;
        Some(slot.get_or_insert_with(|| {
            log::debug!("building {kind:?} pipeline for mask {:#010b}", mask.bits());
            factory.build(PipelineDesc::Draw { kind, mask })
        }))
    }

    #[inline]
    pub fn mask_writer(&self, layer: MaskLayer) -> Option<&F::Pipeline> {
        self.mask_writers.get(layer.index() as usize)
    }

    #[inline]
    pub fn is_built(&self, kind: PipelineKind, mask: MaskBits) -> bool {
        let table = match kind {
            PipelineKind::Opaque => &self.opaque,
            PipelineKind::Transparent => &self.transparent,
        };
        table.get(mask.bits() as usize).is_some_and(Option::is_some)
    }

    /// Draw pipelines built so far, both kinds.
    pub fn built_count(&self) -> usize {
        self.opaque.iter().chain(&self.transparent).filter(|p| p.is_some()).count()
    }

    #[inline]
    pub fn factory(&self) -> &F {
        &self.factory
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct CountingFactory {
        built: Vec<PipelineDesc>,
    }

    impl PipelineFactory for CountingFactory {
        type Pipeline = PipelineDesc;

        fn build(&mut self, desc: PipelineDesc) -> PipelineDesc {
            self.built.push(desc);
            desc
        }
    }

    fn cache(mask_layers: u8, warm_mask_sets: usize) -> PipelineCache<CountingFactory> {
        let config = SceneConfig { mask_layers, warm_mask_sets, ..SceneConfig::default() };
        PipelineCache::new(CountingFactory::default(), &config)
    }

    fn draw_builds(c: &PipelineCache<CountingFactory>) -> usize {
        c.factory().built.iter().filter(|d| matches!(d, PipelineDesc::Draw { .. })).count()
    }

    // ── warming ───────────────────────────────────────────────────────────

    #[test]
    fn warms_low_masks_of_both_kinds_and_every_writer() {
        let c = cache(3, 2);
        assert_eq!(c.built_count(), 4);
        assert_eq!(draw_builds(&c), 4);
        assert!(c.is_built(PipelineKind::Opaque, MaskBits(1)));
        assert!(!c.is_built(PipelineKind::Transparent, MaskBits(2)));

        for i in 0..3 {
            let layer = MaskLayer::new(i, 3).unwrap();
            assert_eq!(c.mask_writer(layer), Some(&PipelineDesc::MaskWrite { layer }));
        }
        assert_eq!(c.factory().built.len(), 4 + 3);
    }

    #[test]
    fn warm_count_is_clamped_to_table() {
        let c = cache(1, 10);
        assert_eq!(c.built_count(), 4);
    }

    // ── lazy construction ─────────────────────────────────────────────────

    #[test]
    fn miss_builds_once_then_memoizes() {
        let mut c = cache(4, 1);
        let before = draw_builds(&c);

        let p = *c.get(PipelineKind::Transparent, MaskBits(0b1010)).unwrap();
        assert_eq!(p, PipelineDesc::Draw { kind: PipelineKind::Transparent, mask: MaskBits(0b1010) });
        assert_eq!(draw_builds(&c), before + 1);

        c.get(PipelineKind::Transparent, MaskBits(0b1010));
        assert_eq!(draw_builds(&c), before + 1);

        // Same mask, other kind: separate entry.
        c.get(PipelineKind::Opaque, MaskBits(0b1010));
        assert_eq!(draw_builds(&c), before + 2);
    }

    #[test]
    fn warmed_hit_does_not_build() {
        let mut c = cache(2, 4);
        let before = c.factory().built.len();
        for bits in 0..4 {
            c.get(PipelineKind::Opaque, MaskBits(bits));
            c.get(PipelineKind::Transparent, MaskBits(bits));
        }
        assert_eq!(c.factory().built.len(), before);
    }

    #[test]
    fn cache_never_exceeds_two_tables() {
        let mut c = cache(3, 0);
        for _ in 0..2 {
            for bits in 0..8 {
                c.get(PipelineKind::Opaque, MaskBits(bits));
                c.get(PipelineKind::Transparent, MaskBits(bits));
            }
        }
        assert_eq!(c.built_count(), 16);
        assert_eq!(draw_builds(&c), 16);
    }

    #[test]
    fn mask_beyond_layers_is_rejected_without_building() {
        let mut c = cache(2, 0);
        assert_eq!(c.get(PipelineKind::Opaque, MaskBits(0b100)), None);
        assert_eq!(c.get(PipelineKind::Transparent, MaskBits(0xFF)), None);
        assert_eq!(draw_builds(&c), 0);

        let p = *c.get(PipelineKind::Opaque, MaskBits(0b11)).unwrap();
        assert_eq!(p, PipelineDesc::Draw { kind: PipelineKind::Opaque, mask: MaskBits(0b11) });
    }
}
