//! GPU rendering subsystem.
//!
//! The renderer consumes a resolved `FrameBatch` and issues wgpu commands.
//! Pipeline selection and pass encoding sit behind small traits
//! (`PipelineFactory`, `DrawSink`) so they can run without a GPU.
//!
//! Convention:
//! - geometry is pulled from the arena storage buffer by vertex index
//! - the vertex shader maps world units to NDC using a viewport uniform
//! - payload `ordering` becomes clip-space depth

mod common;
mod ctx;
mod encoder;
mod factory;
mod pipeline_cache;
mod renderer;

pub use common::{DEPTH_STENCIL_FORMAT, MASK_WRITE_REFERENCE};
pub use ctx::{RenderCtx, RenderTarget};
pub use encoder::{encode_passes, DrawSink, EncodeStats};
pub use factory::WgpuPipelineFactory;
pub use pipeline_cache::{PipelineCache, PipelineDesc, PipelineFactory, PipelineKind};
pub use renderer::Renderer;
