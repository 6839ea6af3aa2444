use core::fmt;

/// Per-frame buffer a submission can overflow.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Resource {
    Holders,
    MaskHolders,
    MaskEvents,
    Payloads,
    Puller,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Resource::Holders => "holder",
            Resource::MaskHolders => "mask holder",
            Resource::MaskEvents => "mask event",
            Resource::Payloads => "payload",
            Resource::Puller => "puller",
        })
    }
}

/// A dropped or rejected per-frame operation.
///
/// Warnings never fail the frame; they are logged and counted.
#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
pub enum BatchWarning {
    #[error("{resource} capacity ({capacity}) exceeded; submission dropped")]
    CapacityExceeded { resource: Resource, capacity: usize },
    #[error("mask layer {layer} out of range (0..{limit}); ignored")]
    InvalidMaskLayer { layer: u8, limit: u8 },
    #[error("drawable is released or unknown; submission dropped")]
    StaleDrawable,
}

/// Warning counters for the current frame. Reset at flush.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct FrameWarnings {
    pub capacity_exceeded: u32,
    pub invalid_mask_layer: u32,
    pub stale_drawable: u32,
}

impl FrameWarnings {
    pub(crate) fn record(&mut self, warning: BatchWarning) {
        log::warn!("{warning}");
        match warning {
            BatchWarning::CapacityExceeded { .. } => self.capacity_exceeded += 1,
            BatchWarning::InvalidMaskLayer { .. } => self.invalid_mask_layer += 1,
            BatchWarning::StaleDrawable => self.stale_drawable += 1,
        }
    }

    #[inline]
    pub fn total(&self) -> u32 {
        self.capacity_exceeded + self.invalid_mask_layer + self.stale_drawable
    }
}

impl core::ops::Add for FrameWarnings {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            capacity_exceeded: self.capacity_exceeded + rhs.capacity_exceeded,
            invalid_mask_layer: self.invalid_mask_layer + rhs.invalid_mask_layer,
            stale_drawable: self.stale_drawable + rhs.stale_drawable,
        }
    }
}
