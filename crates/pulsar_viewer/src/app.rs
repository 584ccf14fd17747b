use crate::{
    audio::{AudioController, RodioBackend},
    camera::{Camera, FlyTo, OrbitController},
    config::VisualConfig,
    data::{starfield::generate_starfield, PointCloudGpu, PulsarField},
    loader::{IncrementalLoader, LoadStep},
    pick::{cursor_to_ndc, pick_nearest, Ray},
    pulse::pulse_intensity,
    renderer::Renderer,
    ui::{self, PulsarDetails, UiActions, UiModel},
    view::{apply_visibility, ViewMode, ViewState},
};
use anyhow::Result;
use psrcat::PulsarRecord;
use rand::{rngs::StdRng, SeedableRng};
use std::sync::Arc;
use std::time::{Duration, Instant};
use winit::{event::WindowEvent, window::Window};

/// Pause between finalising the buffers and reporting 100%.
const UPLOAD_SETTLE: Duration = Duration::from_millis(500);
/// How long the loading banner stays up after 100%.
const BANNER_LINGER: Duration = Duration::from_millis(800);

/// The whole viewing session: scene, interaction state and audio.
pub struct App {
    pub renderer: Renderer,
    pub camera: Camera,
    pub controller: OrbitController,
    pub egui_ctx: egui::Context,
    pub egui_state: egui_winit::State,

    cfg: VisualConfig,
    records: Vec<PulsarRecord>,
    loader: IncrementalLoader,
    field: PulsarField,
    /// Built once, when the loader finalises.
    pulsar_cloud: Option<PointCloudGpu>,
    stars: PointCloudGpu,

    view: ViewState,
    audio: AudioController<RodioBackend>,
    fly_to: Option<FlyTo>,

    started: Instant,
    last_frame: Instant,
    finalized_at: Option<Instant>,
    completed_at: Option<Instant>,
}

impl App {
    pub async fn new(window: Arc<Window>, cfg: VisualConfig, records: Vec<PulsarRecord>) -> Result<Self> {
        let renderer = Renderer::new(window.clone(), &cfg).await?;
        let size = renderer.gfx.size;

        let mut camera = Camera::new(1.0);
        camera.set_viewport(size.width, size.height);
        let mut controller = OrbitController::new();
        controller.set_viewport_height(size.height);

        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui_ctx.viewport_id(),
            &*window,
            None,
            None,
        );

        let mut star_rng = StdRng::seed_from_u64(cfg.noise_seed as u64 ^ 0x5354_4152);
        let stars = renderer.create_starfield(&generate_starfield(&cfg, &mut star_rng));
        log::info!("Starfield ready ({} stars)", stars.instances_len);

        let mut loader = IncrementalLoader::new(records.len(), &cfg);
        loader.start();

        let audio = AudioController::with_default_output(cfg.audio_enabled, cfg.default_volume);
        let view = ViewState::new(&cfg);
        let now = Instant::now();

        log::info!("Pulsar Galaxy Explorer initialized.");

        Ok(Self {
            renderer,
            camera,
            controller,
            egui_ctx,
            egui_state,
            cfg,
            records,
            loader,
            field: PulsarField::default(),
            pulsar_cloud: None,
            stars,
            view,
            audio,
            fly_to: None,
            started: now,
            last_frame: now,
            finalized_at: None,
            completed_at: None,
        })
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.renderer.resize(new_size);
            self.camera.set_viewport(new_size.width, new_size.height);
            self.controller.set_viewport_height(new_size.height);
        }
    }

    /// Returns `true` when egui consumed the event.
    pub fn handle_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        let response = self.egui_state.on_window_event(window, event);
        if response.consumed {
            return true;
        }

        if let Some(click) = self.controller.handle_event(event) {
            self.handle_click(click);
        }

        if let WindowEvent::Resized(physical_size) = event {
            self.resize(*physical_size);
        }

        false
    }

    fn handle_click(&mut self, cursor: (f64, f64)) {
        // Nothing is pickable until the combined cloud exists.
        if self.pulsar_cloud.is_none() {
            return;
        }

        let size = self.renderer.gfx.size;
        let ndc = cursor_to_ndc(cursor, (size.width, size.height));
        let Some(ray) = Ray::from_ndc(ndc, self.camera.view_proj()) else {
            return;
        };

        let hit = pick_nearest(
            &ray,
            self.field.visuals.iter().map(|v| v.position),
            self.cfg.pick_threshold,
            self.camera.near,
            self.camera.far,
        );
        if let Some(hit) = hit {
            self.select(hit.index);
        }
    }

    /// Selects the pulsar in buffer slot `slot`: details, voice and fly-to.
    pub fn select(&mut self, slot: usize) {
        let Some(visual) = self.field.visuals.get(slot) else {
            return;
        };
        let Some(record) = self.records.get(visual.record) else {
            return;
        };

        log::info!("Selected {} (slot {})", record.display_name(), slot);
        self.view.select(slot);
        self.audio.play(record);

        self.fly_to = Some(FlyTo::new(
            self.camera.eye,
            visual.position,
            self.cfg.fly_to_offset,
            self.cfg.fly_to_duration,
        ));
        self.controller.suspend_auto_rotate(self.cfg.fly_to_duration);
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.view.set_mode(mode);
        self.audio.stop();

        let shown = apply_visibility(&mut self.field, &self.records, mode, &self.cfg);
        if let Some(cloud) = &self.pulsar_cloud {
            self.renderer.update_instances(cloud, &self.field.instances);
        }
        log::info!("View mode {:?}: {} of {} pulsars visible", mode, shown, self.field.len());
    }

    fn set_audio_enabled(&mut self, enabled: bool) {
        self.view.audio_enabled = enabled;
        let selected = self
            .view
            .selected
            .and_then(|slot| self.field.visuals.get(slot))
            .and_then(|v| self.records.get(v.record));
        self.audio.set_enabled(enabled, selected);
    }

    fn set_volume(&mut self, volume: f32) {
        self.view.volume = volume;
        self.audio.set_volume(volume);
    }

    fn selected_record(&self) -> Option<&PulsarRecord> {
        let slot = self.view.selected?;
        let visual = self.field.visuals.get(slot)?;
        self.records.get(visual.record)
    }

    /// Runs whatever loader work is due.
    fn pump_loader(&mut self, now: Instant) {
        match self.loader.poll(now, &self.records, &mut self.field) {
            Some(LoadStep::Finalized) if self.pulsar_cloud.is_none() => {
                // Pulsars loaded while a filter was active still honour it.
                apply_visibility(&mut self.field, &self.records, self.view.mode, &self.cfg);
                let cloud = self.renderer.create_pulsar_cloud(&self.field.instances);
                log::info!("Pulsar cloud uploaded ({} points)", cloud.instances_len);
                self.pulsar_cloud = Some(cloud);
                self.finalized_at = Some(now);
            }
            _ => {}
        }

        if let Some(t) = self.finalized_at {
            if self.completed_at.is_none() && now.duration_since(t) >= UPLOAD_SETTLE {
                self.loader.finish_upload();
                self.completed_at = Some(now);
            }
        }
    }

    fn show_loading(&self, now: Instant) -> bool {
        self.completed_at
            .map_or(true, |t| now.duration_since(t) < BANNER_LINGER)
    }

    fn update_camera(&mut self, dt: Duration) {
        if let Some(fly) = &mut self.fly_to {
            self.controller.elapse(dt);
            if fly.advance(dt, &mut self.camera) {
                // The pulsar stays the orbit pivot.
                self.fly_to = None;
            }
        } else {
            self.controller.update(dt, &mut self.camera);
        }
    }

    fn apply_ui_actions(&mut self, actions: UiActions) {
        if let Some(mode) = actions.view_mode {
            self.set_view_mode(mode);
        }
        if actions.toggle_audio {
            self.set_audio_enabled(!self.view.audio_enabled);
        }
        if let Some(volume) = actions.volume {
            self.set_volume(volume);
        }
    }

    pub fn render(&mut self, window: &Window) -> Result<(), wgpu::SurfaceError> {
        let now = Instant::now();
        let dt = now.duration_since(self.last_frame);
        self.last_frame = now;

        self.pump_loader(now);
        self.update_camera(dt);

        let time = now.duration_since(self.started).as_secs_f32();

        let frame = self.renderer.gfx.surface.get_current_texture()?;
        let swap_view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.renderer
            .write_cloud_uniform(&self.stars, &self.camera, time);
        if let Some(cloud) = &self.pulsar_cloud {
            self.renderer.write_cloud_uniform(cloud, &self.camera, time);
        }

        let mut clouds = vec![&self.stars];
        clouds.extend(self.pulsar_cloud.as_ref());
        self.renderer.render(&swap_view, &clouds);

        // --- Overlay ---
        let banner = self.loader.banner();
        let details = self.selected_record().map(|r| {
            PulsarDetails::from_record(r, pulse_intensity(time, r.period_or_default() as f32))
        });
        let model = UiModel {
            show_loading: self.show_loading(now),
            banner: &banner,
            progress: self.loader.progress(),
            mode: self.view.mode,
            audio_enabled: self.view.audio_enabled,
            audio_available: self.audio.is_available(),
            volume: self.view.volume,
            details,
        };

        let egui_input = self.egui_state.take_egui_input(window);
        self.egui_ctx.begin_frame(egui_input);
        let actions = ui::draw(&self.egui_ctx, &model);
        let egui_output = self.egui_ctx.end_frame();
        self.egui_state
            .handle_platform_output(window, egui_output.platform_output);

        let shapes = self
            .egui_ctx
            .tessellate(egui_output.shapes, self.egui_ctx.pixels_per_point());

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [
                self.renderer.gfx.config.width,
                self.renderer.gfx.config.height,
            ],
            pixels_per_point: self.egui_ctx.pixels_per_point(),
        };

        let mut encoder = self
            .renderer
            .gfx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("UI Encoder"),
            });

        for (id, delta) in &egui_output.textures_delta.set {
            self.renderer.egui_renderer.update_texture(
                &self.renderer.gfx.device,
                &self.renderer.gfx.queue,
                *id,
                delta,
            );
        }

        self.renderer.egui_renderer.update_buffers(
            &self.renderer.gfx.device,
            &self.renderer.gfx.queue,
            &mut encoder,
            &shapes,
            &screen_descriptor,
        );

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("EGUI Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &swap_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.renderer
                .egui_renderer
                .render(&mut render_pass, &shapes, &screen_descriptor);
        }

        for id in &egui_output.textures_delta.free {
            self.renderer.egui_renderer.free_texture(id);
        }

        self.renderer
            .gfx
            .queue
            .submit(std::iter::once(encoder.finish()));
        frame.present();

        self.apply_ui_actions(actions);

        Ok(())
    }

    /// Stops audio and releases the output device.
    pub fn shutdown(&mut self) {
        self.audio.shutdown();
        log::info!("Session closed");
    }
}
