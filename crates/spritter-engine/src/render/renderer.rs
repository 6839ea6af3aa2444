use anyhow::{Context, Result};

use crate::batch::PullerEntry;
use crate::config::SceneConfig;
use crate::drawable::{PAYLOAD_BYTES, VERTEX_WORDS};
use crate::render::{RenderCtx, RenderTarget};
use crate::scene::{BufferKind, Scene, UploadSink};

use super::common::{bind_group_layout, ViewportUniform};
use super::{encode_passes, EncodeStats, PipelineCache, WgpuPipelineFactory};

/// wgpu glue around a [`Scene`]: buffers, bindings and the pipeline cache.
///
/// Buffers are sized once from the scene's config; the per-frame budgets
/// guarantee uploads always fit.
pub struct Renderer {
    surface_format: wgpu::TextureFormat,

    payload_buf: wgpu::Buffer,
    arena_buf: wgpu::Buffer,
    puller_buf: wgpu::Buffer,
    viewport_ubo: wgpu::Buffer,
    bind_group: wgpu::BindGroup,

    pipelines: PipelineCache<WgpuPipelineFactory>,
}

impl Renderer {
    pub fn new(ctx: &RenderCtx<'_>, config: &SceneConfig) -> Result<Self> {
        config.validate().context("invalid scene config")?;

        let payload_size = (config.payload_capacity * PAYLOAD_BYTES) as u64;
        let arena_size = (config.arena_slots * VERTEX_WORDS * size_of::<f32>()) as u64;
        let puller_size = (config.puller_capacity * size_of::<PullerEntry>()) as u64;

        let limit = u64::from(ctx.device.limits().max_storage_buffer_binding_size);
        anyhow::ensure!(
            payload_size <= limit,
            "payload buffer ({payload_size} bytes) exceeds storage binding limit {limit}"
        );
        anyhow::ensure!(
            arena_size <= limit,
            "arena buffer ({arena_size} bytes) exceeds storage binding limit {limit}"
        );

        let buffer = |label: &'static str, size: u64, usage: wgpu::BufferUsages| {
            ctx.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(label),
                size,
                usage: usage | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        };
        let payload_buf = buffer("spritter payload buffer", payload_size, wgpu::BufferUsages::STORAGE);
        let arena_buf = buffer("spritter arena buffer", arena_size, wgpu::BufferUsages::STORAGE);
        let puller_buf = buffer("spritter puller vbo", puller_size, wgpu::BufferUsages::VERTEX);
        let viewport_ubo = buffer(
            "spritter viewport ubo",
            size_of::<ViewportUniform>() as u64,
            wgpu::BufferUsages::UNIFORM,
        );

        let bgl = bind_group_layout(ctx.device);
        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("spritter bind group"),
            layout: &bgl,
            entries: &[
                wgpu::BindGroupEntry { binding: 0, resource: viewport_ubo.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 1, resource: payload_buf.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 2, resource: arena_buf.as_entire_binding() },
            ],
        });

        let factory = WgpuPipelineFactory::new(ctx.device, &bgl, ctx.surface_format);
        let pipelines = PipelineCache::new(factory, config);

        Ok(Self {
            surface_format: ctx.surface_format,
            payload_buf,
            arena_buf,
            puller_buf,
            viewport_ubo,
            bind_group,
            pipelines,
        })
    }

    #[inline]
    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_format
    }

    /// Uploads the scene's frame and encodes it into `target`.
    ///
    /// Color is loaded, depth cleared to 1 and stencil to 0. The caller still
    /// owns `Scene::flush`, which must follow command submission.
    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        scene: &mut Scene,
    ) -> EncodeStats {
        if ctx.surface_format != self.surface_format {
            log::warn!(
                "Renderer: target format {:?} differs from pipeline format {:?}; frame skipped",
                ctx.surface_format,
                self.surface_format
            );
            return EncodeStats::default();
        }

        let uniform = ViewportUniform::new(ctx.viewport);
        ctx.queue.write_buffer(&self.viewport_ubo, 0, bytemuck::bytes_of(&uniform));

        scene.upload(&mut QueueUpload {
            queue: ctx.queue,
            payload: &self.payload_buf,
            puller: &self.puller_buf,
            arena: &self.arena_buf,
        });

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("spritter pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: target.depth_stencil_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Discard,
                }),
                stencil_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(0),
                    store: wgpu::StoreOp::Discard,
                }),
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_bind_group(0, &self.bind_group, &[]);
        rpass.set_vertex_buffer(0, self.puller_buf.slice(..));

        let stats = encode_passes(scene.batch(), &mut self.pipelines, &mut rpass);
        log::trace!(
            "Renderer: {} mask draws, {} draws, {} pipelines built",
            stats.mask_draws,
            stats.draws,
            self.pipelines.built_count()
        );
        stats
    }
}

/// Routes scene uploads to the renderer's buffers through the queue.
struct QueueUpload<'a> {
    queue: &'a wgpu::Queue,
    payload: &'a wgpu::Buffer,
    puller: &'a wgpu::Buffer,
    arena: &'a wgpu::Buffer,
}

impl UploadSink for QueueUpload<'_> {
    fn write_region(&mut self, buffer: BufferKind, offset: u64, bytes: &[u8]) {
        let dst = match buffer {
            BufferKind::Payload => self.payload,
            BufferKind::Puller => self.puller,
            BufferKind::Arena => self.arena,
        };
        self.queue.write_buffer(dst, offset, bytes);
    }
}
