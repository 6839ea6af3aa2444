use core::ops::Range;

use crate::config::SceneConfig;
use crate::drawable::{Drawable, DrawableId, DrawablePayload, DrawableStore};

use super::{
    BatchWarning, DrawRange, FrameWarnings, Holder, MaskBatch, MaskEvent, MaskLayer, MaskResolver,
    MaskState, Pass, Polarity, Priority, PullerEntry, Resource, SortKey,
};

/// Per-frame submission list and its resolved pass structure.
///
/// Frame lifecycle:
/// 1. `submit` / `submit_as_mask` / `declare_mask_*` any number of times
/// 2. `resolve` sorts, sweeps mask events and fills the puller buffer
/// 3. the encoder reads `passes()` / `mask_batches()`
/// 4. `flush` resets every counter
///
/// Performance characteristics:
/// - all buffers are sized from [`SceneConfig`] at construction; nothing grows afterwards
/// - submissions past a budget are dropped with a [`BatchWarning`]
/// - `resolve` is O(n log n) in holders and allocation-free
#[derive(Debug)]
pub struct FrameBatch {
    mask_layers: u8,
    max_holders: usize,
    max_mask_events: usize,
    max_mask_holders: usize,
    payload_capacity: usize,
    puller_capacity: usize,

    holders: Vec<Holder>,
    next_order: u32,
    /// One list per mask layer.
    mask_holders: Vec<Vec<Holder>>,
    mask_events: Vec<MaskEvent>,

    payloads: Vec<DrawablePayload>,
    puller: Vec<PullerEntry>,
    passes: Vec<Pass>,
    mask_batches: Vec<MaskBatch>,

    resolved: bool,
    warnings: FrameWarnings,
    /// Warnings from the latest resolve only; recomputed on every resolve.
    resolve_warnings: FrameWarnings,
}

impl FrameBatch {
    /// Allocates every frame-local buffer. `config` is assumed validated.
    pub fn new(config: &SceneConfig) -> Self {
        let layers = config.mask_layers as usize;
        Self {
            mask_layers: config.mask_layers,
            max_holders: config.max_holders,
            max_mask_events: config.max_mask_events,
            max_mask_holders: config.max_mask_holders,
            payload_capacity: config.payload_capacity,
            puller_capacity: config.puller_capacity,

            holders: Vec::with_capacity(config.max_holders),
            next_order: 0,
            mask_holders: (0..layers).map(|_| Vec::with_capacity(config.max_mask_holders)).collect(),
            mask_events: Vec::with_capacity(config.max_mask_events),

            payloads: Vec::with_capacity(config.payload_capacity),
            puller: Vec::with_capacity(config.puller_capacity),
            // Every pass holds at least one holder.
            passes: Vec::with_capacity(config.max_holders),
            mask_batches: Vec::with_capacity(layers),

            resolved: false,
            warnings: FrameWarnings::default(),
            resolve_warnings: FrameWarnings::default(),
        }
    }

    // ── ingestion ─────────────────────────────────────────────────────────

    /// Records `drawable` at `priority`.
    ///
    /// The payload is captured now, so later tint or transform edits do not
    /// affect this submission. Geometry is read from the store at `resolve`:
    /// a shape replaced before then draws the new shape. Returns `None` when
    /// a per-frame budget is exhausted.
    pub fn submit(&mut self, id: DrawableId, drawable: &Drawable, priority: Priority) -> Option<Holder> {
        if self.holders.len() >= self.max_holders {
            self.warn(BatchWarning::CapacityExceeded { resource: Resource::Holders, capacity: self.max_holders });
            return None;
        }
        let payload = self.push_payload(drawable)?;

        let holder = Holder { drawable: id, payload, key: SortKey::new(priority, self.next_order) };
        self.next_order = self.next_order.wrapping_add(1);
        self.holders.push(holder);
        self.resolved = false;
        Some(holder)
    }

    /// Records `drawable` as stencil geometry for `layer`.
    ///
    /// Mask geometry is drawn before every pass and writes only stencil bits.
    pub fn submit_as_mask(&mut self, id: DrawableId, drawable: &Drawable, layer: u8) -> Option<Holder> {
        let layer = self.validate_layer(layer)?;
        if self.mask_holders[layer.index() as usize].len() >= self.max_mask_holders {
            self.warn(BatchWarning::CapacityExceeded {
                resource: Resource::MaskHolders,
                capacity: self.max_mask_holders,
            });
            return None;
        }
        let payload = self.push_payload(drawable)?;

        let holder = Holder { drawable: id, payload, key: SortKey::new(Priority::default(), self.next_order) };
        self.next_order = self.next_order.wrapping_add(1);
        self.mask_holders[layer.index() as usize].push(holder);
        self.resolved = false;
        Some(holder)
    }

    /// Switches `layer` on for every holder at or above `priority`.
    ///
    /// With `anti`, holders are clipped to the outside of the mask instead.
    pub fn declare_mask_event(&mut self, priority: Priority, layer: u8, anti: bool) -> bool {
        let polarity = if anti { Polarity::SetAnti } else { Polarity::Set };
        self.push_event(priority, layer, polarity)
    }

    /// Switches `layer` off for every holder at or above `priority`.
    pub fn declare_mask_clear(&mut self, priority: Priority, layer: u8) -> bool {
        self.push_event(priority, layer, Polarity::Clear)
    }

    fn push_event(&mut self, priority: Priority, layer: u8, polarity: Polarity) -> bool {
        let Some(layer) = self.validate_layer(layer) else { return false };
        if self.mask_events.len() >= self.max_mask_events {
            self.warn(BatchWarning::CapacityExceeded {
                resource: Resource::MaskEvents,
                capacity: self.max_mask_events,
            });
            return false;
        }

        let order = self.mask_events.len() as u32;
        self.mask_events.push(MaskEvent { priority, layer, polarity, order });
        self.resolved = false;
        true
    }

    fn validate_layer(&mut self, layer: u8) -> Option<MaskLayer> {
        let valid = MaskLayer::new(layer, self.mask_layers);
        if valid.is_none() {
            self.warn(BatchWarning::InvalidMaskLayer { layer, limit: self.mask_layers });
        }
        valid
    }

    fn push_payload(&mut self, drawable: &Drawable) -> Option<u32> {
        if self.payloads.len() >= self.payload_capacity {
            self.warn(BatchWarning::CapacityExceeded {
                resource: Resource::Payloads,
                capacity: self.payload_capacity,
            });
            return None;
        }
        let index = self.payloads.len() as u32;
        self.payloads.push(drawable.payload());
        Some(index)
    }

    #[inline]
    pub(crate) fn warn(&mut self, warning: BatchWarning) {
        self.warnings.record(warning);
    }

    // ── resolve ───────────────────────────────────────────────────────────

    /// Orders the frame and builds its passes.
    ///
    /// Safe to call more than once per frame; each call rebuilds from the
    /// submissions alone.
    pub fn resolve(&mut self, store: &DrawableStore) {
        let Self {
            mask_layers,
            holders,
            mask_holders,
            mask_events,
            payloads,
            puller,
            passes,
            mask_batches,
            resolve_warnings,
            puller_capacity,
            ..
        } = self;

        passes.clear();
        puller.clear();
        mask_batches.clear();
        *resolve_warnings = FrameWarnings::default();

        holders.sort_unstable_by_key(|h| h.key);
        mask_events.sort_unstable_by_key(MaskEvent::sort_key);
        let holders: &[Holder] = holders;
        let mask_events: &[MaskEvent] = mask_events;

        // Highest priority is nearest.
        let n = holders.len();
        for (i, h) in holders.iter().enumerate() {
            if let Some(p) = payloads.get_mut(h.payload as usize) {
                p.ordering = 1.0 - (i + 1) as f32 / (n + 1) as f32;
            }
        }

        let mut out = PullerWriter {
            puller: &mut *puller,
            capacity: *puller_capacity,
            store,
            warnings: resolve_warnings,
        };

        for (i, list) in mask_holders.iter().enumerate().take(*mask_layers as usize) {
            let Some(layer) = MaskLayer::new(i as u8, *mask_layers) else { continue };
            let start = out.len();
            for h in list {
                out.push_holder(h);
            }
            mask_batches.push(MaskBatch { layer, range: out.range_from(start) });
        }

        // Sweep holders and mask events together along the priority axis.
        let mut resolver = MaskResolver::default();
        let mut current = MaskState::default();
        let mut pass_start = 0;
        let mut next_event = 0;

        for (i, h) in holders.iter().enumerate() {
            while let Some(e) = mask_events.get(next_event).filter(|e| e.priority <= h.priority()) {
                let group = mask_events[next_event..].iter().take_while(|g| g.priority == e.priority).count();
                resolver.apply_group(&mask_events[next_event..next_event + group]);
                next_event += group;
            }

            let state = resolver.state();
            if state != current {
                if i > pass_start {
                    passes.push(out.close_pass(holders, pass_start..i, current));
                }
                pass_start = i;
                current = state;
            }
        }
        if n > pass_start {
            passes.push(out.close_pass(holders, pass_start..n, current));
        }

        if next_event < mask_events.len() {
            log::trace!("{} mask events above every holder priority", mask_events.len() - next_event);
        }
        log::trace!(
            "resolved {} holders into {} passes, {} puller entries",
            n,
            passes.len(),
            puller.len()
        );

        self.resolved = true;
    }

    // ── flush ─────────────────────────────────────────────────────────────

    /// Resets every frame-local counter. Keeps allocated capacity.
    pub fn flush(&mut self) {
        self.holders.clear();
        self.next_order = 0;
        for list in &mut self.mask_holders {
            list.clear();
        }
        self.mask_events.clear();
        self.payloads.clear();
        self.puller.clear();
        self.passes.clear();
        self.mask_batches.clear();

        self.resolved = false;
        self.warnings = FrameWarnings::default();
        self.resolve_warnings = FrameWarnings::default();
    }

    // ── accessors ─────────────────────────────────────────────────────────

    #[inline]
    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    #[inline]
    pub fn mask_layers(&self) -> u8 {
        self.mask_layers
    }

    /// Holders; sorted by priority once resolved.
    #[inline]
    pub fn holders(&self) -> &[Holder] {
        &self.holders
    }

    #[inline]
    pub fn mask_holders(&self, layer: MaskLayer) -> &[Holder] {
        self.mask_holders.get(layer.index() as usize).map_or(&[], Vec::as_slice)
    }

    #[inline]
    pub fn mask_events(&self) -> &[MaskEvent] {
        &self.mask_events
    }

    #[inline]
    pub fn passes(&self) -> &[Pass] {
        &self.passes
    }

    #[inline]
    pub fn mask_batches(&self) -> &[MaskBatch] {
        &self.mask_batches
    }

    #[inline]
    pub fn payloads(&self) -> &[DrawablePayload] {
        &self.payloads
    }

    #[inline]
    pub fn puller(&self) -> &[PullerEntry] {
        &self.puller
    }

    /// Warnings recorded since the last flush.
    #[inline]
    pub fn warnings(&self) -> FrameWarnings {
        self.warnings + self.resolve_warnings
    }
}

/// Appends holder geometry to the puller buffer within its budget.
struct PullerWriter<'a> {
    puller: &'a mut Vec<PullerEntry>,
    capacity: usize,
    store: &'a DrawableStore,
    warnings: &'a mut FrameWarnings,
}

impl PullerWriter<'_> {
    #[inline]
    fn len(&self) -> usize {
        self.puller.len()
    }

    fn range_from(&self, start: usize) -> DrawRange {
        DrawRange { start: start as u32, count: (self.puller.len() - start) as u32 }
    }

    fn is_opaque(&self, h: &Holder) -> bool {
        self.store.get(h.drawable).is_some_and(Drawable::is_fully_opaque)
    }

    /// Buffers every index of the holder's drawable, or nothing.
    fn push_holder(&mut self, h: &Holder) {
        let Some(drawable) = self.store.get(h.drawable) else {
            self.warnings.record(BatchWarning::StaleDrawable);
            return;
        };

        let indices = drawable.indices();
        if self.puller.len() + indices.len() > self.capacity {
            self.warnings.record(BatchWarning::CapacityExceeded {
                resource: Resource::Puller,
                capacity: self.capacity,
            });
            return;
        }
        self.puller
            .extend(indices.iter().map(|&vertex| PullerEntry { vertex, payload: h.payload }));
    }

    /// Buffers one pass: opaque front-to-back, then transparent back-to-front.
    fn close_pass(&mut self, holders: &[Holder], range: Range<usize>, mask: MaskState) -> Pass {
        let run = &holders[range.clone()];

        let start = self.len();
        for h in run.iter().rev() {
            if self.is_opaque(h) {
                self.push_holder(h);
            }
        }
        let opaque = self.range_from(start);

        let start = self.len();
        for h in run {
            if !self.is_opaque(h) {
                self.push_holder(h);
            }
        }
        let transparent = self.range_from(start);

        Pass {
            holder_start: range.start as u32,
            holder_count: run.len() as u32,
            mask,
            opaque,
            transparent,
        }
    }
}
