//! Per-frame batch assembly.
//!
//! Responsibilities:
//! - collect submissions (normal and mask) with a priority each
//! - resolve them into passes of constant stencil-mask state
//! - split every pass into opaque (front-to-back) and transparent
//!   (back-to-front) vertex ranges
//! - keep every frame-local buffer at a fixed capacity

mod frame;
mod holder;
mod key;
mod mask;
mod pass;
mod priority;
mod warning;

pub use frame::FrameBatch;
pub use holder::Holder;
pub use key::SortKey;
pub use mask::{MaskBits, MaskEvent, MaskLayer, MaskState, Polarity};
pub use pass::{DrawRange, MaskBatch, Pass, PullerEntry};
pub use priority::Priority;
pub use warning::{BatchWarning, FrameWarnings, Resource};

pub(crate) use mask::MaskResolver;
