//! Explicit engine context.
//!
//! Responsibilities:
//! - own the geometry arena, the drawable store and the frame batch
//! - route drawable lifetime through the one-frame deferred reclamation
//! - hand each frame's regions to an upload sink

mod error;
mod scene;
mod upload;

pub use error::SceneError;
pub use scene::Scene;
pub use upload::{BufferKind, UploadSink};
