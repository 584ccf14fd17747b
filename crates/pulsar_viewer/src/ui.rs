//! egui overlay: loading banner, view-mode and audio controls, pulsar details.
//!
//! Every control lives under a fixed id so state (window positions, focus)
//! is stable across frames.

use crate::view::ViewMode;
use egui::{Align2, Color32, Id, RichText};
use psrcat::PulsarRecord;

pub const LOADING_ID: &str = "loading";
pub const PROGRESS_ID: &str = "progress";
pub const CONTROLS_ID: &str = "controls";
pub const DETAILS_ID: &str = "pulsar-details";
pub const AUDIO_TOGGLE_ID: &str = "audio-toggle";
pub const VOLUME_SLIDER_ID: &str = "volume-slider";

pub fn view_button_id(mode: ViewMode) -> &'static str {
    match mode {
        ViewMode::All => "view-all-btn",
        ViewMode::Fast => "fast-pulsars-btn",
        ViewMode::Slow => "slow-pulsars-btn",
    }
}

/// Text shown in the details panel.
#[derive(Debug, Clone, PartialEq)]
pub struct PulsarDetails {
    pub name: String,
    pub assoc: String,
    pub period: String,
    pub distance: String,
    pub dm: String,
    /// Current pulse intensity in [0.4, 1].
    pub pulse: f32,
}

impl PulsarDetails {
    pub fn from_record(record: &PulsarRecord, pulse: f32) -> Self {
        Self {
            name: record.display_name().to_owned(),
            assoc: record.display_assoc().to_owned(),
            period: record.display_period(),
            distance: record.display_dist(),
            dm: record.display_dm(),
            pulse,
        }
    }
}

/// Everything the overlay reads for one frame.
pub struct UiModel<'a> {
    pub show_loading: bool,
    pub banner: &'a str,
    /// Percent, 0..=100.
    pub progress: f32,
    pub mode: ViewMode,
    pub audio_enabled: bool,
    pub audio_available: bool,
    pub volume: f32,
    pub details: Option<PulsarDetails>,
}

/// What the user asked for this frame.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct UiActions {
    pub view_mode: Option<ViewMode>,
    pub toggle_audio: bool,
    pub volume: Option<f32>,
}

pub fn audio_toggle_label(enabled: bool) -> &'static str {
    if enabled {
        "🔊"
    } else {
        "🔇"
    }
}

/// Slider position (0..=100) to gain.
#[inline]
pub fn slider_to_gain(v: f32) -> f32 {
    (v / 100.0).clamp(0.0, 1.0)
}

pub fn draw(ctx: &egui::Context, model: &UiModel<'_>) -> UiActions {
    let mut actions = UiActions::default();

    if model.show_loading {
        draw_loading(ctx, model.banner, model.progress);
    }
    draw_controls(ctx, model, &mut actions);
    if let Some(details) = &model.details {
        draw_details(ctx, details);
    }

    actions
}

fn draw_loading(ctx: &egui::Context, banner: &str, progress: f32) {
    egui::Area::new(Id::new(LOADING_ID))
        .anchor(Align2::CENTER_CENTER, [0.0, 0.0])
        .interactable(false)
        .show(ctx, |ui| {
            egui::Frame::popup(ui.style()).show(ui, |ui| {
                ui.set_width(320.0);
                ui.vertical_centered(|ui| {
                    ui.label(RichText::new(banner).size(18.0));
                    ui.push_id(PROGRESS_ID, |ui| {
                        ui.add(egui::ProgressBar::new(progress.clamp(0.0, 100.0) / 100.0));
                    });
                });
            });
        });
}

fn draw_controls(ctx: &egui::Context, model: &UiModel<'_>, actions: &mut UiActions) {
    egui::Window::new("Pulsar Galaxy Explorer")
        .id(Id::new(CONTROLS_ID))
        .anchor(Align2::LEFT_TOP, [12.0, 12.0])
        .resizable(false)
        .collapsible(false)
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                for mode in ViewMode::ALL {
                    let clicked = ui
                        .push_id(view_button_id(mode), |ui| {
                            ui.selectable_label(model.mode == mode, mode.label()).clicked()
                        })
                        .inner;
                    if clicked {
                        actions.view_mode = Some(mode);
                    }
                }
            });

            ui.separator();

            ui.horizontal(|ui| {
                let toggled = ui
                    .push_id(AUDIO_TOGGLE_ID, |ui| {
                        ui.add_enabled(
                            model.audio_available,
                            egui::Button::new(audio_toggle_label(model.audio_enabled)),
                        )
                        .clicked()
                    })
                    .inner;
                actions.toggle_audio = toggled;

                let mut slider = (model.volume * 100.0).round();
                let changed = ui
                    .push_id(VOLUME_SLIDER_ID, |ui| {
                        ui.add(egui::Slider::new(&mut slider, 0.0..=100.0).step_by(1.0).text("Volume"))
                            .changed()
                    })
                    .inner;
                if changed {
                    actions.volume = Some(slider_to_gain(slider));
                }
            });

            if !model.audio_available {
                ui.label(RichText::new("Audio unavailable").small().weak());
            }
        });
}

fn draw_details(ctx: &egui::Context, details: &PulsarDetails) {
    egui::Window::new("Pulsar Details")
        .id(Id::new(DETAILS_ID))
        .anchor(Align2::RIGHT_TOP, [-12.0, 12.0])
        .resizable(false)
        .collapsible(false)
        .show(ctx, |ui| {
            egui::Grid::new("pulsar-details-grid")
                .num_columns(2)
                .spacing([16.0, 4.0])
                .show(ui, |ui| {
                    let rows = [
                        ("Name", &details.name),
                        ("Association", &details.assoc),
                        ("Period", &details.period),
                        ("Distance", &details.distance),
                        ("DM", &details.dm),
                    ];
                    for (key, value) in rows {
                        ui.label(RichText::new(key).weak());
                        ui.label(value.as_str());
                        ui.end_row();
                    }
                });

            ui.add_space(6.0);
            ui.add(
                egui::ProgressBar::new(details.pulse)
                    .fill(Color32::from_rgb(90, 170, 255))
                    .desired_height(6.0),
            );
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn details_use_formatted_values_and_fallbacks() {
        let crab = PulsarRecord {
            jname: Some("B0531+21".into()),
            assoc: Some("Crab".into()),
            p0: Some(0.0334),
            dm: Some(56.77),
            gl: Some(184.56),
            gb: Some(-5.78),
            dist: Some(2.0),
        };
        let d = PulsarDetails::from_record(&crab, 0.7);
        assert_eq!(d.name, "B0531+21");
        assert_eq!(d.assoc, "Crab");
        assert_eq!(d.period, "0.0334 s");
        assert_eq!(d.distance, "2.00 kpc");
        assert_eq!(d.dm, "56.77 cm⁻³ pc");

        let empty = PulsarDetails::from_record(&PulsarRecord::default(), 0.4);
        assert_eq!(empty.name, "Unknown");
        assert_eq!(empty.assoc, "None");
        assert_eq!(empty.period, "Unknown");
        assert_eq!(empty.distance, "Unknown");
        assert_eq!(empty.dm, "Unknown");
    }

    #[test]
    fn control_ids_are_stable() {
        assert_eq!(view_button_id(ViewMode::All), "view-all-btn");
        assert_eq!(view_button_id(ViewMode::Fast), "fast-pulsars-btn");
        assert_eq!(view_button_id(ViewMode::Slow), "slow-pulsars-btn");
        assert_eq!(audio_toggle_label(true), "🔊");
        assert_eq!(audio_toggle_label(false), "🔇");
        assert_eq!(slider_to_gain(15.0), 0.15);
        assert_eq!(slider_to_gain(140.0), 1.0);
    }

    #[test]
    fn headless_frame_reports_no_actions() {
        let ctx = egui::Context::default();
        let model = UiModel {
            show_loading: true,
            banner: "Loading 6 Pulsars...",
            progress: 40.0,
            mode: ViewMode::All,
            audio_enabled: true,
            audio_available: false,
            volume: 0.15,
            details: Some(PulsarDetails::from_record(&PulsarRecord::default(), 0.5)),
        };
        let mut actions = UiActions::default();
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            actions = draw(ctx, &model);
        });
        assert_eq!(actions, UiActions::default());
    }
}
