//! Color model shared by drawables and the payload record.

pub mod color;

pub use color::Color;
