use crate::config::MAX_MASK_LAYERS;

use super::Priority;

/// A validated stencil channel index.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct MaskLayer(u8);

impl MaskLayer {
    /// Returns `None` unless `layer < limit` and `limit` fits in the stencil.
    #[inline]
    pub fn new(layer: u8, limit: u8) -> Option<Self> {
        (layer < limit.min(MAX_MASK_LAYERS)).then_some(Self(layer))
    }

    #[inline]
    pub const fn index(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn bit(self) -> MaskBits {
        MaskBits(1 << self.0)
    }
}

/// Set of stencil channels, one bit per mask layer.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct MaskBits(pub u8);

impl MaskBits {
    pub const NONE: Self = Self(0);

    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn contains(self, layer: MaskLayer) -> bool {
        self.0 & (1 << layer.0) != 0
    }

    #[inline]
    pub const fn with(self, layer: MaskLayer, on: bool) -> Self {
        if on { Self(self.0 | (1 << layer.0)) } else { Self(self.0 & !(1 << layer.0)) }
    }
}

/// Resolved stencil state shared by every holder of a pass.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct MaskState {
    /// Channels the pass is clipped by.
    pub mask_bits: MaskBits,
    /// Subset of `mask_bits` that clips to the *outside* of the mask.
    pub anti_bits: MaskBits,
}

impl MaskState {
    /// Stencil reference: required bit value per tested channel.
    ///
    /// Anti channels expect 0 where normal channels expect 1, so a single
    /// XOR gives inverted masks without extra pipelines.
    #[inline]
    pub const fn stencil_reference(self) -> u32 {
        (self.mask_bits.0 ^ self.anti_bits.0) as u32
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Polarity {
    Set,
    SetAnti,
    Clear,
}

impl Polarity {
    /// Clears sort ahead of sets at equal priority.
    #[inline]
    pub const fn rank(self) -> u8 {
        match self {
            Polarity::Clear => 0,
            Polarity::Set | Polarity::SetAnti => 1,
        }
    }
}

/// A mask toggle at a priority threshold.
///
/// The event affects every holder whose priority is at or above `priority`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct MaskEvent {
    pub priority: Priority,
    pub layer: MaskLayer,
    pub polarity: Polarity,
    /// Declaration index, for a deterministic order among equal keys.
    pub order: u32,
}

impl MaskEvent {
    #[inline]
    pub fn sort_key(&self) -> (Priority, u8, u32) {
        (self.priority, self.polarity.rank(), self.order)
    }
}

/// Running stencil state of the priority sweep.
///
/// Each layer is simply on or off. All events of one priority are applied
/// as a group: a layer that is both cleared and set within the group keeps
/// its previous state, otherwise the group's last event for the layer wins.
/// A set on an active layer still updates its polarity.
#[derive(Debug, Default)]
pub(crate) struct MaskResolver {
    state: MaskState,
}

impl MaskResolver {
    #[inline]
    pub(crate) fn state(&self) -> MaskState {
        self.state
    }

    /// Applies every event sharing one priority. `group` must be sorted by
    /// [`MaskEvent::sort_key`].
    pub(crate) fn apply_group(&mut self, group: &[MaskEvent]) {
        debug_assert!(group.windows(2).all(|w| w[0].priority == w[1].priority));

        let mut cleared = 0u8;
        let mut set = 0u8;
        let mut anti = 0u8;
        for e in group {
            let bit = e.layer.bit().0;
            match e.polarity {
                Polarity::Clear => cleared |= bit,
                Polarity::Set => {
                    set |= bit;
                    anti &= !bit;
                }
                Polarity::SetAnti => {
                    set |= bit;
                    anti |= bit;
                }
            }
        }

        let both = cleared & set;
        let switched_off = cleared & !both;
        let switched_on = set & !both;

        let mask_bits = (self.state.mask_bits.0 & !switched_off) | switched_on;
        let anti_bits = ((self.state.anti_bits.0 & !switched_on) | (anti & switched_on)) & mask_bits;

        self.state = MaskState { mask_bits: MaskBits(mask_bits), anti_bits: MaskBits(anti_bits) };
    }
}
