//! Long-lived geometry storage.
//!
//! Responsibilities:
//! - own the backing store every drawable's vertices live in
//! - hand out fixed-size slots by index (never by address)
//! - track which span of the store changed since the last upload

mod error;
mod geometry;

pub use error::ArenaError;
pub use geometry::{GeometryArena, Slot};
