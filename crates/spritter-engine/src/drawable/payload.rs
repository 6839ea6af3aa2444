use bytemuck::{Pod, Zeroable};

/// Size of one payload record in the payload buffer.
pub const PAYLOAD_BYTES: usize = 256;

/// Per-object attribute block read by both shader stages.
///
/// One record is written per submission; the vertex stream refers to it by
/// index. Field order is the buffer layout; the WGSL side reads it as
/// 16 `vec4<f32>`.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct DrawablePayload {
    pub transform: [[f32; 4]; 3],
    pub tex_transform: [[f32; 4]; 3],
    pub tex2_transform: [[f32; 4]; 3],

    pub tint: [f32; 4],
    /// Channels above `threshold_lower` and at or below `threshold_upper` are zeroed.
    pub threshold_lower: [f32; 4],
    pub threshold_upper: [f32; 4],

    pub tex_pos: [f32; 2],
    pub tex_size: [f32; 2],
    pub tex2_pos: [f32; 2],
    pub tex2_size: [f32; 2],

    /// Opacity of the secondary texture over the primary.
    pub tex2_alpha: f32,
    pub atlas_dimension: f32,
    pub inv_atlas_dimension: f32,
    pub displacement: f32,

    /// Depth in `[0, 1)`; written by the frame batch at resolve.
    pub ordering: f32,
    pub flags: u32,
    pub _pad: [u32; 2],
}

const _: () = assert!(core::mem::size_of::<DrawablePayload>() == PAYLOAD_BYTES);
