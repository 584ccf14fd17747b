//! Core data types for the pulsar viewer, focused on GPU data representation.

/// Per-instance data uploaded to the GPU vertex buffer.
/// Must match the instance inputs in `points.wgsl`.
#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable, Debug, PartialEq)]
pub struct PointInstance {
    /// World position.
    pub position: [f32; 3],
    /// Base point size in world units.
    pub size: f32,
    /// Linear RGB base colour.
    pub color: [f32; 3],
    /// Rotation period in seconds (drives the pulse animation).
    pub period: f32,
    /// Dispersion measure (drives the size boost).
    pub dm: f32,
}

/// Per-cloud uniform buffer data, respecting std140 layout.
/// Must match `CloudUniform` in `points.wgsl`.
#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CloudUniformStd140 {
    pub view_proj: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    /// Size of the viewport in physical pixels.
    pub viewport_size: [f32; 2],
    /// Seconds since start, for the pulse animation.
    pub time: f32,
    /// 1.0 for pulsars, 0.0 for static stars.
    pub animate: f32,
    pub dm_intensity_factor: f32,
    pub _pad: [f32; 3],
}

const _: [(); 160] = [(); core::mem::size_of::<CloudUniformStd140>()];

/// GPU resources for one renderable point cloud.
#[derive(Debug)]
pub struct PointCloudGpu {
    /// Vertex buffer containing `PointInstance` data.
    pub vtx: wgpu::Buffer,
    /// Uniform buffer containing `CloudUniformStd140` data.
    pub ubo: wgpu::Buffer,
    /// Bind group connecting the UBO and sprite texture to the pipeline.
    pub bind: wgpu::BindGroup,
    pub instances_len: u32,
    pub animate: bool,
}
