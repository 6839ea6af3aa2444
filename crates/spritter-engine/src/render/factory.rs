use crate::batch::PullerEntry;

use super::common::{premul_alpha_blend, DEPTH_STENCIL_FORMAT};
use super::{PipelineDesc, PipelineFactory, PipelineKind};

/// Builds the sprite pipelines against one shader, layout and color format.
pub struct WgpuPipelineFactory {
    device: wgpu::Device,
    shader: wgpu::ShaderModule,
    layout: wgpu::PipelineLayout,
    color_format: wgpu::TextureFormat,
}

impl WgpuPipelineFactory {
    pub fn new(
        device: &wgpu::Device,
        bind_group_layout: &wgpu::BindGroupLayout,
        color_format: wgpu::TextureFormat,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("spritter sprite shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/sprite.wgsl").into()),
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("spritter pipeline layout"),
            bind_group_layouts: &[bind_group_layout],
            immediate_size: 0,
        });

        Self { device: device.clone(), shader, layout, color_format }
    }

    #[inline]
    pub fn color_format(&self) -> wgpu::TextureFormat {
        self.color_format
    }
}

impl PipelineFactory for WgpuPipelineFactory {
    type Pipeline = wgpu::RenderPipeline;

    fn build(&mut self, desc: PipelineDesc) -> wgpu::RenderPipeline {
        let label = match desc {
            PipelineDesc::Draw { kind, mask } => format!("spritter {kind:?} pipeline {:#04x}", mask.bits()),
            PipelineDesc::MaskWrite { layer } => format!("spritter mask writer {}", layer.index()),
        };

        let (fragment_entry, blend, write_mask) = match desc {
            PipelineDesc::Draw { kind: PipelineKind::Opaque, .. } => ("fs_main", None, wgpu::ColorWrites::ALL),
            PipelineDesc::Draw { kind: PipelineKind::Transparent, .. } => {
                ("fs_main", Some(premul_alpha_blend()), wgpu::ColorWrites::ALL)
            }
            // Stencil only.
            PipelineDesc::MaskWrite { .. } => ("fs_mask", None, wgpu::ColorWrites::empty()),
        };

        self.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(&label),
            layout: Some(&self.layout),

            vertex: wgpu::VertexState {
                module: &self.shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[PullerEntry::layout()],
            },

            fragment: Some(wgpu::FragmentState {
                module: &self.shader,
                entry_point: Some(fragment_entry),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.color_format,
                    blend,
                    write_mask,
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil: Some(depth_stencil_state(desc)),
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        })
    }
}

/// Depth and stencil configuration per pipeline.
///
/// - opaque: depth write + `Less`; stencil `Equal` under `read_mask = mask`
/// - transparent: as opaque without depth write
/// - mask writer: depth ignored; stencil `Replace` into the layer's bit only
fn depth_stencil_state(desc: PipelineDesc) -> wgpu::DepthStencilState {
    let face_state = |compare, op| wgpu::StencilFaceState {
        compare,
        fail_op: op,
        depth_fail_op: op,
        pass_op: op,
    };

    let (depth_write_enabled, depth_compare, face, read_mask, write_mask) = match desc {
        PipelineDesc::Draw { kind, mask } => (
            kind == PipelineKind::Opaque,
            wgpu::CompareFunction::Less,
            face_state(wgpu::CompareFunction::Equal, wgpu::StencilOperation::Keep),
            u32::from(mask.bits()),
            0x00,
        ),
        PipelineDesc::MaskWrite { layer } => (
            false,
            wgpu::CompareFunction::Always,
            face_state(wgpu::CompareFunction::Always, wgpu::StencilOperation::Replace),
            0xFF,
            u32::from(layer.bit().bits()),
        ),
    };

    wgpu::DepthStencilState {
        format: DEPTH_STENCIL_FORMAT,
        depth_write_enabled,
        depth_compare,
        stencil: wgpu::StencilState { front: face, back: face, read_mask, write_mask },
        bias: wgpu::DepthBiasState::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::{MaskBits, MaskLayer};

    // ── depth / stencil ───────────────────────────────────────────────────

    #[test]
    fn opaque_writes_depth_and_tests_mask_bits() {
        let s = depth_stencil_state(PipelineDesc::Draw { kind: PipelineKind::Opaque, mask: MaskBits(0b101) });
        assert!(s.depth_write_enabled);
        assert_eq!(s.depth_compare, wgpu::CompareFunction::Less);
        assert_eq!(s.stencil.read_mask, 0b101);
        assert_eq!(s.stencil.write_mask, 0);
        assert_eq!(s.stencil.front.compare, wgpu::CompareFunction::Equal);
    }

    #[test]
    fn transparent_tests_depth_without_writing() {
        let s = depth_stencil_state(PipelineDesc::Draw { kind: PipelineKind::Transparent, mask: MaskBits(0) });
        assert!(!s.depth_write_enabled);
        assert_eq!(s.depth_compare, wgpu::CompareFunction::Less);
        assert_eq!(s.stencil.read_mask, 0);
    }

    #[test]
    fn mask_writer_replaces_only_its_bit() {
        let layer = MaskLayer::new(3, 8).unwrap();
        let s = depth_stencil_state(PipelineDesc::MaskWrite { layer });
        assert!(!s.depth_write_enabled);
        assert_eq!(s.depth_compare, wgpu::CompareFunction::Always);
        assert_eq!(s.stencil.write_mask, 1 << 3);
        assert_eq!(s.stencil.front.pass_op, wgpu::StencilOperation::Replace);
        assert_eq!(s.stencil.back, s.stencil.front);
    }
}
