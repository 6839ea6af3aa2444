use core::ops::Range;

use bytemuck::{Pod, Zeroable};

use super::{MaskLayer, MaskState};

/// One entry of the vertex stream: which arena vertex to pull, with which payload.
#[repr(C)]
#[derive(Debug, Copy, Clone, Eq, PartialEq, Pod, Zeroable)]
pub struct PullerEntry {
    pub vertex: u32,
    pub payload: u32,
}

/// Contiguous span of the puller buffer.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct DrawRange {
    pub start: u32,
    pub count: u32,
}

impl DrawRange {
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.count == 0
    }

    #[inline]
    pub const fn vertices(self) -> Range<u32> {
        self.start..self.start + self.count
    }
}

/// A run of priority-sorted holders sharing one mask state.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Pass {
    /// Range into the sorted holder list.
    pub holder_start: u32,
    pub holder_count: u32,
    pub mask: MaskState,
    /// Opaque holders, highest priority first.
    pub opaque: DrawRange,
    /// Transparent holders, lowest priority first.
    pub transparent: DrawRange,
}

impl Pass {
    #[inline]
    pub fn holders(&self) -> Range<usize> {
        self.holder_start as usize..(self.holder_start + self.holder_count) as usize
    }
}

/// Stencil-writing geometry of one mask layer.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct MaskBatch {
    pub layer: MaskLayer,
    pub range: DrawRange,
}
