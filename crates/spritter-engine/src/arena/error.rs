/// Errors raised by [`GeometryArena`](super::GeometryArena).
#[derive(Debug, Clone, Copy, Eq, PartialEq, thiserror::Error)]
pub enum ArenaError {
    /// Fewer free slots remain than were requested.
    ///
    /// The arena is sized once at construction; hitting this means the
    /// capacity budget is wrong, not that the frame is busy.
    #[error("geometry arena exhausted: requested {requested} slots, {available} available")]
    Exhausted { requested: usize, available: usize },
}
