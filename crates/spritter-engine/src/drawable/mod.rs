//! Persistent drawables.
//!
//! Responsibilities:
//! - own drawable state across frames (`DrawableStore`, generational ids)
//! - serialize that state into the per-submission payload record
//! - answer the opacity question the batch asks at resolve time

mod drawable;
mod flags;
mod payload;
mod store;
mod texture;

pub mod shapes;

pub use drawable::Drawable;
pub use flags::DrawableFlags;
pub use payload::{DrawablePayload, PAYLOAD_BYTES};
pub use shapes::{Shape, VERTEX_WORDS};
pub use store::{DrawableId, DrawableStore};
pub use texture::{TextureAtlas, TextureInfo};
