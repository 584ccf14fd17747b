//! Rendering orchestrator. Owns the GPU context, render targets, the point
//! pipeline, the bloom chain and the egui renderer.

pub mod context;
pub mod pipelines;
pub mod targets;

use self::{
    context::GfxContext,
    pipelines::{
        points::PointsPipeline,
        post_stack::{BloomParams, PostStack},
    },
    targets::Targets,
};
use crate::{
    camera::Camera,
    config::VisualConfig,
    data::{
        color::hex_to_linear,
        sprite::{PULSAR_STOPS, STAR_STOPS},
        types::{CloudUniformStd140, PointCloudGpu, PointInstance},
    },
};
use glam::Vec3;
use std::sync::Arc;
use winit::window::Window;

/// Ambient plus one directional light. The point materials are unlit, so only
/// the ambient term reaches the image, as the background level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneLighting {
    pub ambient: [f32; 3],
    pub directional_color: [f32; 3],
    pub directional_intensity: f32,
    pub directional_position: Vec3,
}

impl Default for SceneLighting {
    fn default() -> Self {
        Self {
            ambient: hex_to_linear(0x101010),
            directional_color: [1.0, 1.0, 1.0],
            directional_intensity: 0.8,
            directional_position: Vec3::new(15.0, 20.0, 10.0),
        }
    }
}

impl SceneLighting {
    pub fn clear_color(&self) -> wgpu::Color {
        let [r, g, b] = self.ambient;
        wgpu::Color {
            r: r as f64,
            g: g as f64,
            b: b as f64,
            a: 1.0,
        }
    }
}

pub struct Renderer {
    pub gfx: GfxContext,
    pub targets: Targets,
    pub points: PointsPipeline,
    pub post_stack: PostStack,
    pub egui_renderer: egui_wgpu::Renderer,
    pub lighting: SceneLighting,
    star_sprite: wgpu::TextureView,
    pulsar_sprite: wgpu::TextureView,
    dm_intensity_factor: f32,
}

impl Renderer {
    pub async fn new(window: Arc<Window>, cfg: &VisualConfig) -> anyhow::Result<Self> {
        let gfx = GfxContext::new(window).await?;
        let size = gfx.size;

        let targets = Targets::new(&gfx.device, size);
        let points = PointsPipeline::new(&gfx.device, targets.color_fmt, targets.depth_fmt);
        let post_stack = PostStack::new(
            &gfx.device,
            gfx.config.format,
            size.width,
            size.height,
            BloomParams::from_config(cfg),
        );

        let star_sprite = points.create_sprite(&gfx.device, &gfx.queue, "Star Sprite", &STAR_STOPS);
        let pulsar_sprite =
            points.create_sprite(&gfx.device, &gfx.queue, "Pulsar Sprite", &PULSAR_STOPS);

        let egui_renderer = egui_wgpu::Renderer::new(&gfx.device, gfx.config.format, None, 1);

        Ok(Self {
            gfx,
            targets,
            points,
            post_stack,
            egui_renderer,
            lighting: SceneLighting::default(),
            star_sprite,
            pulsar_sprite,
            dm_intensity_factor: cfg.dm_intensity_factor,
        })
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.gfx.resize(new_size);
            self.targets.resize(&self.gfx.device, new_size);
            self.post_stack
                .resize(&self.gfx.device, new_size.width, new_size.height);
        }
    }

    pub fn create_starfield(&self, stars: &[PointInstance]) -> PointCloudGpu {
        self.points
            .create_cloud(&self.gfx.device, "Starfield", stars, &self.star_sprite, false)
    }

    pub fn create_pulsar_cloud(&self, pulsars: &[PointInstance]) -> PointCloudGpu {
        self.points
            .create_cloud(&self.gfx.device, "Pulsars", pulsars, &self.pulsar_sprite, true)
    }

    pub fn update_instances(&self, cloud: &PointCloudGpu, instances: &[PointInstance]) {
        self.points
            .update_instances(&self.gfx.queue, cloud, instances);
    }

    /// Writes the per-frame uniform of `cloud`.
    pub fn write_cloud_uniform(&self, cloud: &PointCloudGpu, camera: &Camera, time: f32) {
        let ubo = CloudUniformStd140 {
            view_proj: camera.view_proj().to_cols_array_2d(),
            view: camera.view().to_cols_array_2d(),
            viewport_size: self.gfx.viewport_size(),
            time,
            animate: if cloud.animate { 1.0 } else { 0.0 },
            dm_intensity_factor: self.dm_intensity_factor,
            _pad: [0.0; 3],
        };
        self.gfx
            .queue
            .write_buffer(&cloud.ubo, 0, bytemuck::bytes_of(&ubo));
    }

    /// Geometry pass into the HDR target, then bloom and tone mapping into
    /// `swap_view`.
    pub fn render(&mut self, swap_view: &wgpu::TextureView, clouds: &[&PointCloudGpu]) {
        let mut encoder = self
            .gfx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Point Cloud Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.targets.color,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.lighting.clear_color()),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.targets.depth,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            for cloud in clouds {
                self.points.draw_cloud(&mut pass, cloud);
            }
        }

        self.post_stack.run(
            &self.gfx.device,
            &self.gfx.queue,
            &mut encoder,
            swap_view,
            &self.targets.color,
        );

        self.gfx.queue.submit(std::iter::once(encoder.finish()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ambient_is_a_dim_grey_clear() {
        let c = SceneLighting::default().clear_color();
        assert!(c.r > 0.0 && c.r < 0.01);
        assert_eq!(c.r, c.g);
        assert_eq!(c.g, c.b);
        assert_eq!(c.a, 1.0);
    }
}
