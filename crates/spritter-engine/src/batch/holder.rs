use crate::drawable::DrawableId;

use super::{Priority, SortKey};

/// One submission of a drawable for the current frame.
///
/// Holders are invalidated by [`FrameBatch::flush`](super::FrameBatch::flush).
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Holder {
    pub drawable: DrawableId,
    /// Index of this submission's record in the payload buffer.
    pub payload: u32,
    pub key: SortKey,
}

impl Holder {
    #[inline]
    pub fn priority(&self) -> Priority {
        self.key.priority
    }
}
