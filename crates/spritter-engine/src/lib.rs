//! Spritter engine crate.
//!
//! Per-frame scheduling core of a 2D sprite renderer: a slot arena for
//! persistent geometry, a frame batch that resolves prioritized submissions
//! and stencil-mask events into passes, a memoized pipeline cache, and the
//! encoder that turns passes into draws. `device` and `render` hold the
//! wgpu side; everything else runs without a GPU.

pub mod arena;
pub mod batch;
pub mod config;
pub mod drawable;
pub mod scene;

pub mod coords;
pub mod device;
pub mod logging;
pub mod paint;
pub mod render;
