use wgpu::util::DeviceExt;

/// Intermediate texture format
const INTERMEDIATE_FMT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

/// Full-screen triangle vertices
const FS_TRI: [[f32; 2]; 3] = [[-1.0, -1.0], [3.0, -1.0], [-1.0, 3.0]];

/// Blur tap spacing in pixels at `radius = 1`.
const MAX_BLUR_SPREAD_PX: f32 = 4.0;

/// Ping-pong textures for the bloom chain
pub struct PingPong {
    pub ping: wgpu::TextureView,
    pub pong: wgpu::TextureView,
    size: wgpu::Extent3d,
    _tex_ping: wgpu::Texture,
    _tex_pong: wgpu::Texture,
}

impl PingPong {
    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let size = wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        };
        let make_tex = |label| {
            device.create_texture(&wgpu::TextureDescriptor {
                label: Some(label),
                size,
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: INTERMEDIATE_FMT,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
                view_formats: &[],
            })
        };

        let tex_ping = make_tex("Bloom Ping");
        let tex_pong = make_tex("Bloom Pong");

        Self {
            ping: tex_ping.create_view(&wgpu::TextureViewDescriptor::default()),
            pong: tex_pong.create_view(&wgpu::TextureViewDescriptor::default()),
            size,
            _tex_ping: tex_ping,
            _tex_pong: tex_pong,
        }
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        if self.size.width == width.max(1) && self.size.height == height.max(1) {
            return;
        }
        *self = Self::new(device, width, height);
    }
}

// -------------------- Uniform Buffers --------------------

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable, Default)]
struct UboBright {
    threshold: f32,
    _pad: [f32; 3],
}

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable, Default)]
struct UboBlur {
    inv_size: [f32; 2],
    dir: [f32; 2],
    spread: f32,
    _pad: [f32; 3],
}

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable, Default)]
struct UboComposite {
    strength: f32,
    exposure: f32,
    _pad: [f32; 2],
}

// -------------------- Pass Types --------------------

struct BrightPass {
    pipeline: wgpu::RenderPipeline,
    layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    ubo: wgpu::Buffer,
    fs_vbo: wgpu::Buffer,
}

/// One direction of the separable blur. Horizontal and vertical each own a
/// pass so their uniforms do not alias within a frame.
struct BlurPass {
    pipeline: wgpu::RenderPipeline,
    layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    ubo: wgpu::Buffer,
    fs_vbo: wgpu::Buffer,
}

struct CompositePass {
    pipeline: wgpu::RenderPipeline,
    layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    ubo: wgpu::Buffer,
    fs_vbo: wgpu::Buffer,
}

// -------------------- Bloom Parameters & Stack --------------------

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BloomParams {
    pub strength: f32,
    /// 0..1, scales the blur spread.
    pub radius: f32,
    /// Luminance below which nothing blooms.
    pub threshold: f32,
    pub exposure: f32,
}

impl BloomParams {
    pub fn from_config(cfg: &crate::config::VisualConfig) -> Self {
        Self {
            strength: cfg.bloom_strength,
            radius: cfg.bloom_radius,
            threshold: cfg.bloom_threshold,
            exposure: cfg.tone_mapping_exposure,
        }
    }

    /// Blur tap spacing in pixels.
    pub fn blur_spread_px(&self) -> f32 {
        1.0 + self.radius.clamp(0.0, 1.0) * (MAX_BLUR_SPREAD_PX - 1.0)
    }
}

pub struct PostStack {
    pingpong: PingPong,
    bright: BrightPass,
    blur_h: BlurPass,
    blur_v: BlurPass,
    composite: CompositePass,
    pub params: BloomParams,
}

impl PostStack {
    pub fn new(
        device: &wgpu::Device,
        out_fmt: wgpu::TextureFormat,
        width: u32,
        height: u32,
        params: BloomParams,
    ) -> Self {
        Self {
            pingpong: PingPong::new(device, width, height),
            bright: BrightPass::new(device, INTERMEDIATE_FMT),
            blur_h: BlurPass::new(device, INTERMEDIATE_FMT),
            blur_v: BlurPass::new(device, INTERMEDIATE_FMT),
            composite: CompositePass::new(device, out_fmt),
            params,
        }
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.pingpong.resize(device, width, height);
    }

    /// Bright-pass → blur H → blur V → composite + tone map into the swap chain.
    pub fn run(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        swapchain_dst: &wgpu::TextureView,
        scene_color_src: &wgpu::TextureView,
    ) {
        let width = self.pingpong.size.width.max(1) as f32;
        let height = self.pingpong.size.height.max(1) as f32;
        let inv_size = [1.0 / width, 1.0 / height];
        let p = self.params;

        let spread = p.blur_spread_px();

        self.bright
            .draw(device, queue, encoder, &self.pingpong.ping, scene_color_src, p.threshold);
        self.blur_h.draw(
            device,
            queue,
            encoder,
            &self.pingpong.pong,
            &self.pingpong.ping,
            inv_size,
            [1.0, 0.0],
            spread,
        );
        self.blur_v.draw(
            device,
            queue,
            encoder,
            &self.pingpong.ping,
            &self.pingpong.pong,
            inv_size,
            [0.0, 1.0],
            spread,
        );

        self.composite.draw(
            device,
            queue,
            encoder,
            swapchain_dst,
            scene_color_src,
            &self.pingpong.ping,
            p.strength,
            p.exposure,
        );
    }
}

// -------------------- Pass Implementations --------------------

macro_rules! create_post_pass {
    ($name:ident, $ubo_type:ty, $shader:expr) => {
        impl $name {
            pub fn new(device: &wgpu::Device, out_fmt: wgpu::TextureFormat) -> Self {
                let texture_entry = |binding| wgpu::BindGroupLayoutEntry {
                    binding,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: false },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                };

                let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some(concat!(stringify!($name), " Layout")),
                    entries: &[
                        texture_entry(0),
                        texture_entry(1),
                        wgpu::BindGroupLayoutEntry {
                            binding: 2,
                            visibility: wgpu::ShaderStages::FRAGMENT,
                            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::NonFiltering),
                            count: None,
                        },
                        wgpu::BindGroupLayoutEntry {
                            binding: 3,
                            visibility: wgpu::ShaderStages::FRAGMENT,
                            ty: wgpu::BindingType::Buffer {
                                ty: wgpu::BufferBindingType::Uniform,
                                has_dynamic_offset: false,
                                min_binding_size: wgpu::BufferSize::new(
                                    std::mem::size_of::<$ubo_type>() as u64,
                                ),
                            },
                            count: None,
                        },
                    ],
                });

                let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
                    label: Some($shader),
                    source: wgpu::ShaderSource::Wgsl(
                        include_str!(concat!("../../../shaders/", $shader)).into(),
                    ),
                });

                let pipe_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                    label: Some(concat!(stringify!($name), " PipelineLayout")),
                    bind_group_layouts: &[&layout],
                    push_constant_ranges: &[],
                });

                let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                    label: Some(concat!(stringify!($name), " Pipeline")),
                    layout: Some(&pipe_layout),
                    vertex: wgpu::VertexState {
                        module: &shader,
                        entry_point: "vs_main",
                        buffers: &[wgpu::VertexBufferLayout {
                            array_stride: std::mem::size_of::<[f32; 2]>() as u64,
                            step_mode: wgpu::VertexStepMode::Vertex,
                            attributes: &[wgpu::VertexAttribute {
                                shader_location: 0,
                                offset: 0,
                                format: wgpu::VertexFormat::Float32x2,
                            }],
                        }],
                        compilation_options: wgpu::PipelineCompilationOptions::default(),
                    },
                    fragment: Some(wgpu::FragmentState {
                        module: &shader,
                        entry_point: "fs_main",
                        targets: &[Some(wgpu::ColorTargetState {
                            format: out_fmt,
                            blend: None,
                            write_mask: wgpu::ColorWrites::ALL,
                        })],
                        compilation_options: wgpu::PipelineCompilationOptions::default(),
                    }),
                    primitive: wgpu::PrimitiveState::default(),
                    depth_stencil: None,
                    multisample: wgpu::MultisampleState::default(),
                    multiview: None,
                });

                let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
                    label: Some(concat!(stringify!($name), " Sampler")),
                    address_mode_u: wgpu::AddressMode::ClampToEdge,
                    address_mode_v: wgpu::AddressMode::ClampToEdge,
                    mag_filter: wgpu::FilterMode::Nearest,
                    min_filter: wgpu::FilterMode::Nearest,
                    ..Default::default()
                });

                let ubo = device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some(concat!(stringify!($name), " UBO")),
                    size: std::mem::size_of::<$ubo_type>() as u64,
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                });

                let fs_vbo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(concat!(stringify!($name), " FS VBO")),
                    contents: bytemuck::cast_slice(&FS_TRI),
                    usage: wgpu::BufferUsages::VERTEX,
                });

                Self {
                    pipeline,
                    layout,
                    sampler,
                    ubo,
                    fs_vbo,
                }
            }

            /// Binds `t_src`/`t_aux` with this pass's sampler and UBO.
            fn bind(
                &self,
                device: &wgpu::Device,
                t_src: &wgpu::TextureView,
                t_aux: &wgpu::TextureView,
            ) -> wgpu::BindGroup {
                device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some(concat!(stringify!($name), " Bind")),
                    layout: &self.layout,
                    entries: &[
                        wgpu::BindGroupEntry {
                            binding: 0,
                            resource: wgpu::BindingResource::TextureView(t_src),
                        },
                        wgpu::BindGroupEntry {
                            binding: 1,
                            resource: wgpu::BindingResource::TextureView(t_aux),
                        },
                        wgpu::BindGroupEntry {
                            binding: 2,
                            resource: wgpu::BindingResource::Sampler(&self.sampler),
                        },
                        wgpu::BindGroupEntry {
                            binding: 3,
                            resource: self.ubo.as_entire_binding(),
                        },
                    ],
                })
            }
        }
    };
}

create_post_pass!(BrightPass, UboBright, "bloom_bright.wgsl");
create_post_pass!(BlurPass, UboBlur, "blur.wgsl");
create_post_pass!(CompositePass, UboComposite, "composite.wgsl");

fn execute_pass(
    pipeline: &wgpu::RenderPipeline,
    encoder: &mut wgpu::CommandEncoder,
    bind_group: &wgpu::BindGroup,
    fs_vbo: &wgpu::Buffer,
    dst: &wgpu::TextureView,
    label: &str,
) {
    let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some(label),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: dst,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                store: wgpu::StoreOp::Store,
            },
        })],
        depth_stencil_attachment: None,
        timestamp_writes: None,
        occlusion_query_set: None,
    });

    rpass.set_pipeline(pipeline);
    rpass.set_bind_group(0, bind_group, &[]);
    rpass.set_vertex_buffer(0, fs_vbo.slice(..));
    rpass.draw(0..3, 0..1);
}

impl BrightPass {
    pub fn draw(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        dst: &wgpu::TextureView,
        t_scene: &wgpu::TextureView,
        threshold: f32,
    ) {
        queue.write_buffer(
            &self.ubo,
            0,
            bytemuck::bytes_of(&UboBright {
                threshold,
                _pad: [0.0; 3],
            }),
        );
        // The aux slot is unused; bind the scene twice.
        let bind = self.bind(device, t_scene, t_scene);
        execute_pass(&self.pipeline, encoder, &bind, &self.fs_vbo, dst, "Bloom Bright Pass");
    }
}

impl BlurPass {
    #[allow(clippy::too_many_arguments)]
    pub fn draw(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        dst: &wgpu::TextureView,
        t_src: &wgpu::TextureView,
        inv_size: [f32; 2],
        dir: [f32; 2],
        spread: f32,
    ) {
        queue.write_buffer(
            &self.ubo,
            0,
            bytemuck::bytes_of(&UboBlur {
                inv_size,
                dir,
                spread,
                _pad: [0.0; 3],
            }),
        );
        let bind = self.bind(device, t_src, t_src);
        execute_pass(&self.pipeline, encoder, &bind, &self.fs_vbo, dst, "Bloom Blur Pass");
    }
}

impl CompositePass {
    #[allow(clippy::too_many_arguments)]
    pub fn draw(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        dst: &wgpu::TextureView,
        t_scene: &wgpu::TextureView,
        t_bloom: &wgpu::TextureView,
        strength: f32,
        exposure: f32,
    ) {
        queue.write_buffer(
            &self.ubo,
            0,
            bytemuck::bytes_of(&UboComposite {
                strength,
                exposure,
                _pad: [0.0; 2],
            }),
        );
        let bind = self.bind(device, t_scene, t_bloom);
        execute_pass(&self.pipeline, encoder, &bind, &self.fs_vbo, dst, "Composite Pass");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VisualConfig;

    #[test]
    fn uniform_sizes_are_16_byte_multiples() {
        assert_eq!(std::mem::size_of::<UboBright>(), 16);
        assert_eq!(std::mem::size_of::<UboBlur>(), 32);
        assert_eq!(std::mem::size_of::<UboComposite>(), 16);
    }

    #[test]
    fn params_follow_config() {
        let p = BloomParams::from_config(&VisualConfig::default());
        assert_eq!(p.strength, 1.5);
        assert_eq!(p.threshold, 0.05);
        assert_eq!(p.exposure, 1.1);
        assert!((p.blur_spread_px() - 2.5).abs() < 1e-6);
    }
}
