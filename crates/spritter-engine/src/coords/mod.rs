//! Coordinate types used by drawables and renderers.
//!
//! Canonical CPU space:
//! - world units, origin at the viewport center
//! - +X right, +Y up
//!
//! The vertex shader divides by half the viewport size to reach NDC.

mod transform;
mod viewport;

pub use transform::Transform2D;
pub use viewport::Viewport;
