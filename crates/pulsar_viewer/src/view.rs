//! View-mode filtering and selection state.

use crate::config::VisualConfig;
use crate::data::PulsarField;
use glam::Vec3;
use psrcat::PulsarRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    All,
    /// Period below the fast threshold.
    Fast,
    /// Period above the slow threshold.
    Slow,
}

impl ViewMode {
    pub const ALL: [ViewMode; 3] = [ViewMode::All, ViewMode::Fast, ViewMode::Slow];

    pub fn label(self) -> &'static str {
        match self {
            Self::All => "View All",
            Self::Fast => "Fast Pulsars",
            Self::Slow => "Slow Pulsars",
        }
    }

    /// Whether `record` passes this filter. A missing period never passes the
    /// fast or slow filters.
    pub fn admits(self, record: &PulsarRecord, cfg: &VisualConfig) -> bool {
        match self {
            Self::All => true,
            Self::Fast => record.p0.is_some_and(|p| p < cfg.fast_pulsar_threshold),
            Self::Slow => record.p0.is_some_and(|p| p > cfg.slow_pulsar_threshold),
        }
    }
}

/// Session-wide interaction state.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    pub mode: ViewMode,
    /// Buffer slot of the selected pulsar.
    pub selected: Option<usize>,
    pub audio_enabled: bool,
    pub volume: f32,
}

impl ViewState {
    pub fn new(cfg: &VisualConfig) -> Self {
        Self {
            mode: ViewMode::All,
            selected: None,
            audio_enabled: cfg.audio_enabled,
            volume: cfg.default_volume,
        }
    }

    /// Switches the filter and always drops the selection, returning it.
    pub fn set_mode(&mut self, mode: ViewMode) -> Option<usize> {
        self.mode = mode;
        self.selected.take()
    }

    pub fn select(&mut self, slot: usize) {
        self.selected = Some(slot);
    }
}

/// Re-evaluates every pulsar against `mode`. Visible pulsars get their
/// computed position back; hidden ones are parked at `cfg.hidden_position`.
/// Returns the number of visible pulsars.
pub fn apply_visibility(
    field: &mut PulsarField,
    records: &[PulsarRecord],
    mode: ViewMode,
    cfg: &VisualConfig,
) -> usize {
    let PulsarField { visuals, instances } = field;
    let mut shown = 0;

    for (visual, inst) in visuals.iter_mut().zip(instances.iter_mut()) {
        visual.visible = records
            .get(visual.record)
            .is_some_and(|r| mode.admits(r, cfg));

        let pos: Vec3 = if visual.visible {
            shown += 1;
            visual.original_position
        } else {
            cfg.hidden_position
        };
        visual.position = pos;
        inst.position = pos.to_array();
    }

    shown
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::PulsarFieldBuilder;
    use rand::{rngs::StdRng, SeedableRng};

    fn record(name: &str, p0: Option<f64>) -> PulsarRecord {
        PulsarRecord {
            jname: Some(name.into()),
            p0,
            gl: Some(30.0),
            gb: Some(2.0),
            dist: Some(3.0),
            ..PulsarRecord::default()
        }
    }

    fn setup() -> (Vec<PulsarRecord>, PulsarField, VisualConfig) {
        let cfg = VisualConfig::default();
        let records = vec![
            record("fast", Some(0.0334)),
            record("medium", Some(0.25)),
            record("slow", Some(1.2)),
            record("missing", None),
        ];
        let builder = PulsarFieldBuilder::new(&cfg);
        let mut rng = StdRng::seed_from_u64(3);
        let mut field = PulsarField::default();
        for (i, r) in records.iter().enumerate() {
            builder.push(&mut field, i, r, &mut rng);
        }
        (records, field, cfg)
    }

    #[test]
    fn fast_then_all_restores_everything_and_clears_selection() {
        let (records, mut field, cfg) = setup();
        let before = field.instances.clone();
        let mut state = ViewState::new(&cfg);
        state.select(2);

        assert_eq!(state.set_mode(ViewMode::Fast), Some(2));
        assert_eq!(state.selected, None);
        assert_eq!(apply_visibility(&mut field, &records, state.mode, &cfg), 1);
        let visible: Vec<bool> = field.visuals.iter().map(|v| v.visible).collect();
        assert_eq!(visible, vec![true, false, false, false]);

        state.select(0);
        assert_eq!(state.set_mode(ViewMode::All), Some(0));
        assert_eq!(apply_visibility(&mut field, &records, state.mode, &cfg), 4);
        assert!(field.visuals.iter().all(|v| v.visible));
        assert!(field.visuals.iter().all(|v| v.position == v.original_position));
        assert_eq!(field.instances, before);
        assert_eq!(state.selected, None);
    }

    #[test]
    fn hiding_touches_only_the_hidden_slots() {
        let (records, mut field, cfg) = setup();
        let before = field.instances.clone();

        apply_visibility(&mut field, &records, ViewMode::Slow, &cfg);

        let sentinel = cfg.hidden_position.to_array();
        for (i, (now, was)) in field.instances.iter().zip(&before).enumerate() {
            if i == 2 {
                assert_eq!(now, was);
            } else {
                assert_eq!(now.position, sentinel);
                assert_eq!(now.size, was.size);
                assert_eq!(now.color, was.color);
                assert_eq!(field.visuals[i].position, cfg.hidden_position);
                assert_ne!(field.visuals[i].original_position, cfg.hidden_position);
            }
        }
        assert_eq!(field.len(), before.len());
    }

    #[test]
    fn threshold_comparisons_are_strict() {
        let cfg = VisualConfig::default();
        assert!(!ViewMode::Fast.admits(&record("edge", Some(0.1)), &cfg));
        assert!(!ViewMode::Slow.admits(&record("edge", Some(0.5)), &cfg));
        assert!(ViewMode::All.admits(&record("none", None), &cfg));
        assert!(!ViewMode::Fast.admits(&record("none", None), &cfg));
    }
}
