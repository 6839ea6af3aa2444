/// Number of stencil bits, and so the hard ceiling on mask layers.
pub const MAX_MASK_LAYERS: u8 = 8;

/// Capacity budget for a [`Scene`](crate::scene::Scene).
///
/// Every frame-local buffer is sized from this once, at construction, and is
/// only ever reset afterwards. Overflowing a per-frame budget drops the
/// submission with a warning; overflowing `arena_slots` is an error.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneConfig {
    /// Vertex slots in the geometry arena (shared by all drawables).
    pub arena_slots: usize,
    /// Normal submissions per frame.
    pub max_holders: usize,
    /// Mask events per frame.
    pub max_mask_events: usize,
    /// Mask submissions per frame, per layer.
    pub max_mask_holders: usize,
    /// Payload records per frame (normal + mask submissions).
    pub payload_capacity: usize,
    /// Vertex stream entries per frame.
    pub puller_capacity: usize,
    /// Independent stencil channels, `1..=MAX_MASK_LAYERS`.
    pub mask_layers: u8,
    /// Low-valued mask bitmasks whose pipelines are built up front.
    pub warm_mask_sets: usize,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            arena_slots: 1 << 16,
            max_holders: 10_000,
            max_mask_events: 256,
            max_mask_holders: 256,
            payload_capacity: 16_384,
            puller_capacity: 1 << 20,
            mask_layers: MAX_MASK_LAYERS,
            warm_mask_sets: 4,
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("`{0}` must be greater than zero")]
    ZeroCapacity(&'static str),
    #[error("mask layer count {0} outside 1..={max}", max = MAX_MASK_LAYERS)]
    MaskLayers(u8),
    #[error("cannot warm {warm} mask sets with only {table} distinct masks")]
    WarmSets { warm: usize, table: usize },
}

impl SceneConfig {
    /// Distinct mask bitmasks, i.e. pipelines per kind.
    #[inline]
    pub fn mask_table_len(&self) -> usize {
        1usize << self.mask_layers.min(MAX_MASK_LAYERS)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let sizes = [
            ("arena_slots", self.arena_slots),
            ("max_holders", self.max_holders),
            ("max_mask_events", self.max_mask_events),
            ("max_mask_holders", self.max_mask_holders),
            ("payload_capacity", self.payload_capacity),
            ("puller_capacity", self.puller_capacity),
        ];
        if let Some((name, _)) = sizes.iter().find(|(_, v)| *v == 0) {
            return Err(ConfigError::ZeroCapacity(name));
        }

        if self.mask_layers == 0 || self.mask_layers > MAX_MASK_LAYERS {
            return Err(ConfigError::MaskLayers(self.mask_layers));
        }

        let table = self.mask_table_len();
        if self.warm_mask_sets > table {
            return Err(ConfigError::WarmSets { warm: self.warm_mask_sets, table });
        }
        Ok(())
    }
}
