use core::cmp::Ordering;

use super::Priority;

/// Total order over one frame's submissions.
///
/// Ordering rules:
/// 1) `priority`: ascending (back-to-front)
/// 2) `order`: ascending (submission order for equal priority)
///
/// Because `order` is unique per frame, any sort over this key is stable
/// with respect to submission order, including allocation-free unstable sorts.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct SortKey {
    pub priority: Priority,
    /// Submission index within the frame.
    pub order: u32,
}

impl SortKey {
    #[inline]
    pub const fn new(priority: Priority, order: u32) -> Self {
        Self { priority, order }
    }
}

impl Ord for SortKey {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        match self.priority.cmp(&other.priority) {
            Ordering::Equal => self.order.cmp(&other.order),
            o => o,
        }
    }
}

impl PartialOrd for SortKey {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
