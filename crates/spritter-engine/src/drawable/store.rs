use crate::arena::{GeometryArena, Slot};

use super::Drawable;

/// Generational handle to a drawable in a [`DrawableStore`].
///
/// A handle outlives its drawable harmlessly: once the entry is reclaimed
/// and reused, the old handle no longer resolves.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct DrawableId {
    index: u32,
    generation: u32,
}

#[derive(Debug, Default)]
struct Entry {
    generation: u32,
    drawable: Option<Drawable>,
}

/// Owner of every live drawable, plus the queue of geometry awaiting reclamation.
///
/// Release is two-phase: [`release`](Self::release) only marks the drawable;
/// [`reclaim`](Self::reclaim), run after the frame's commands are submitted,
/// returns its slots to the arena and retires the handle.
#[derive(Debug, Default)]
pub struct DrawableStore {
    entries: Vec<Entry>,
    vacant: Vec<u32>,

    released: Vec<DrawableId>,
    /// Slots detached from still-live drawables (geometry replaced this frame).
    retired: Vec<Vec<Slot>>,
}

impl DrawableStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, drawable: Drawable) -> DrawableId {
        if let Some(index) = self.vacant.pop() {
            let entry = &mut self.entries[index as usize];
            entry.drawable = Some(drawable);
            return DrawableId { index, generation: entry.generation };
        }

        let index = self.entries.len() as u32;
        self.entries.push(Entry { generation: 0, drawable: Some(drawable) });
        DrawableId { index, generation: 0 }
    }

    /// Resolves `id`, including drawables released earlier this frame.
    pub fn get(&self, id: DrawableId) -> Option<&Drawable> {
        let entry = self.entries.get(id.index as usize)?;
        if entry.generation != id.generation {
            return None;
        }
        entry.drawable.as_ref()
    }

    /// Resolves `id` for mutation. Released drawables are frozen.
    pub fn get_mut(&mut self, id: DrawableId) -> Option<&mut Drawable> {
        let entry = self.entries.get_mut(id.index as usize)?;
        if entry.generation != id.generation {
            return None;
        }
        entry.drawable.as_mut().filter(|d| !d.is_released())
    }

    /// Number of drawables not yet released.
    pub fn live_count(&self) -> usize {
        self.entries
            .iter()
            .filter_map(|e| e.drawable.as_ref())
            .filter(|d| !d.is_released())
            .count()
    }

    /// Marks `id` released and queues its geometry for the next reclaim.
    ///
    /// Returns false for unknown or already released handles.
    pub fn release(&mut self, id: DrawableId) -> bool {
        let Some(entry) = self.entries.get_mut(id.index as usize) else { return false };
        if entry.generation != id.generation {
            return false;
        }
        let Some(drawable) = entry.drawable.as_mut() else { return false };
        if !drawable.mark_released() {
            return false;
        }
        self.released.push(id);
        true
    }

    /// Queues slots detached from a live drawable for the next reclaim.
    pub fn retire_slots(&mut self, slots: Vec<Slot>) {
        if !slots.is_empty() {
            self.retired.push(slots);
        }
    }

    /// Number of slots waiting for the next reclaim.
    pub fn pending_slot_count(&self) -> usize {
        let released: usize = self
            .released
            .iter()
            .filter_map(|&id| self.get(id))
            .map(|d| d.slots().len())
            .sum();
        released + self.retired.iter().map(Vec::len).sum::<usize>()
    }

    /// Frees every deferred slot into `arena` and retires released handles.
    pub fn reclaim(&mut self, arena: &mut GeometryArena<f32>) {
        for slots in self.retired.drain(..) {
            arena.free(&slots);
        }

        for id in self.released.drain(..) {
            let Some(entry) = self.entries.get_mut(id.index as usize) else { continue };
            let Some(mut drawable) = entry.drawable.take() else { continue };
            arena.free(&drawable.take_slots());

            entry.generation = entry.generation.wrapping_add(1);
            self.vacant.push(id.index);
        }
    }
}
