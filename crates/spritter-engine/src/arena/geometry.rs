use core::ops::Range;

use bytemuck::Zeroable;

use super::ArenaError;

/// Index of one fixed-size unit of a [`GeometryArena`].
///
/// Slots owned by the same drawable need not be adjacent.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Slot(u32);

impl Slot {
    #[inline]
    pub const fn index(self) -> u32 {
        self.0
    }
}

/// Fixed-capacity pool of equal-size slots.
///
/// Performance characteristics:
/// - `allocate(n)` / `free(slots)` are O(n), no search
/// - the backing store is allocated once and never grows, moves or compacts
///
/// Slots are recycled through a LIFO free stack. Because every slot has the
/// same size and callers never need contiguity, there is nothing to coalesce.
#[derive(Debug)]
pub struct GeometryArena<T> {
    store: Vec<T>,
    slot_words: usize,

    /// Free slot indices; the top of the stack is the end of the vec.
    free: Vec<u32>,
    /// `live[i]` is true while slot `i` is handed out.
    live: Vec<bool>,

    /// Slot span written since the last `take_dirty`.
    dirty: Option<Range<u32>>,
}

impl<T: Copy + Zeroable> GeometryArena<T> {
    /// Pre-allocates `capacity` slots of `slot_words` elements each.
    pub fn new(capacity: usize, slot_words: usize) -> Self {
        // Reverse order so the first allocations pop 0, 1, 2, ...
        let free = (0..capacity as u32).rev().collect();

        Self {
            store: vec![T::zeroed(); capacity * slot_words],
            slot_words,
            free,
            live: vec![false; capacity],
            dirty: None,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.live.len()
    }

    #[inline]
    pub fn slot_words(&self) -> usize {
        self.slot_words
    }

    #[inline]
    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    /// Pops `n` slots off the free stack.
    ///
    /// Fails without touching the free stack when fewer than `n` remain.
    pub fn allocate(&mut self, n: usize) -> Result<Vec<Slot>, ArenaError> {
        let available = self.free.len();
        if n > available {
            return Err(ArenaError::Exhausted { requested: n, available });
        }

        let mut slots = Vec::with_capacity(n);
        for _ in 0..n {
            let Some(index) = self.free.pop() else { break };
            self.live[index as usize] = true;
            slots.push(Slot(index));
        }
        Ok(slots)
    }

    /// Pushes `slots` back onto the free stack. An empty set is a no-op.
    ///
    /// Slots that are not currently allocated are skipped, so a double free
    /// can never alias a slot between two owners.
    pub fn free(&mut self, slots: &[Slot]) {
        for slot in slots.iter().rev() {
            let Some(live) = self.live.get_mut(slot.0 as usize) else {
                log::error!("GeometryArena: free of out-of-range slot {}", slot.0);
                continue;
            };
            debug_assert!(*live, "double free of arena slot {}", slot.0);
            if !*live {
                log::error!("GeometryArena: double free of slot {}", slot.0);
                continue;
            }
            *live = false;
            self.free.push(slot.0);
        }
    }

    #[inline]
    pub fn is_live(&self, slot: Slot) -> bool {
        self.live.get(slot.0 as usize).copied().unwrap_or(false)
    }

    /// Returns the contents of `slot`.
    #[inline]
    pub fn slot(&self, slot: Slot) -> &[T] {
        let start = slot.0 as usize * self.slot_words;
        &self.store[start..start + self.slot_words]
    }

    /// Returns the contents of `slot` for writing and marks it dirty.
    pub fn slot_mut(&mut self, slot: Slot) -> &mut [T] {
        self.mark_dirty(slot);
        let start = slot.0 as usize * self.slot_words;
        &mut self.store[start..start + self.slot_words]
    }

    /// Copies `data` into the start of `slot`. Extra input is truncated.
    pub fn write(&mut self, slot: Slot, data: &[T]) {
        let dst = self.slot_mut(slot);
        let n = dst.len().min(data.len());
        dst[..n].copy_from_slice(&data[..n]);
    }

    /// Entire backing store, in slot order.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.store
    }

    /// Returns the element range written since the previous call, and clears the mark.
    pub fn take_dirty(&mut self) -> Option<Range<usize>> {
        let span = self.dirty.take()?;
        let w = self.slot_words;
        Some(span.start as usize * w..span.end as usize * w)
    }

    fn mark_dirty(&mut self, slot: Slot) {
        let (lo, hi) = (slot.0, slot.0 + 1);
        self.dirty = Some(match self.dirty.take() {
            None => lo..hi,
            Some(r) => r.start.min(lo)..r.end.max(hi),
        });
    }
}
