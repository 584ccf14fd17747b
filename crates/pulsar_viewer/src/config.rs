use clap::Parser;
use glam::Vec3;
use std::path::PathBuf;
use std::time::Duration;

/// `pulsar_viewer` - interactive 3D explorer for pulsar catalogs.
///
/// Renders every catalog entry as an animated point positioned from its
/// galactic coordinates. Click a pulsar to fly to it and hear its rhythm.
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Catalog asset (JSON array produced by `psrcat_ingest`).
    ///
    /// When unset, a bundled six-pulsar sample is shown.
    #[arg(long, env = "PULSAR_CATALOG")]
    pub catalog: Option<PathBuf>,

    /// Fraction of catalog entries to display (1.0 = all).
    #[arg(long, default_value_t = 1.0)]
    pub subsample: f64,

    /// Number of pulsars ingested per loader step.
    #[arg(long, default_value_t = 100)]
    pub chunk_size: usize,

    /// Pause between loader steps, in milliseconds.
    #[arg(long, default_value_t = 5)]
    pub chunk_delay_ms: u64,

    /// Seed for the placement noise.
    #[arg(long, default_value_t = 0x5053_5221)]
    pub seed: u32,

    /// Start with audio disabled.
    #[arg(long, default_value_t = false)]
    pub mute: bool,

    /// Initial master volume in [0, 1].
    #[arg(long)]
    pub volume: Option<f32>,
}

impl Args {
    /// Default visual constants overlaid with the command-line values.
    pub fn visual_config(&self) -> VisualConfig {
        let mut cfg = VisualConfig::default();
        cfg.pulsar_subsample = self.subsample.clamp(0.0, 1.0);
        cfg.loading_chunk_size = self.chunk_size.max(1);
        cfg.loading_chunk_delay = Duration::from_millis(self.chunk_delay_ms);
        cfg.noise_seed = self.seed;
        cfg.audio_enabled = !self.mute;
        if let Some(v) = self.volume {
            cfg.default_volume = v.clamp(0.0, 1.0);
        }
        cfg
    }
}

/// Tunable constants for the scene, the pulsar field and the interaction layer.
#[derive(Debug, Clone, PartialEq)]
pub struct VisualConfig {
    /// Size of the galaxy representation in world units.
    pub galaxy_radius: f32,
    /// Background stars.
    pub star_count: usize,
    pub star_min_radius: f32,
    pub star_max_radius: f32,
    pub star_spread: f32,
    /// Min/max point size for pulsars.
    pub pulsar_size_range: [f32; 2],
    /// Period (s) below which a pulsar is "fast".
    pub fast_pulsar_threshold: f64,
    /// Period (s) above which a pulsar is "slow".
    pub slow_pulsar_threshold: f64,
    /// Fraction of the placement radius used by the noise offset.
    pub position_noise: f32,
    pub noise_seed: u32,

    pub bloom_strength: f32,
    pub bloom_radius: f32,
    pub bloom_threshold: f32,
    pub tone_mapping_exposure: f32,

    /// How much the DM affects the rendered size.
    pub dm_intensity_factor: f32,

    pub audio_enabled: bool,
    pub default_volume: f32,

    pub pulsar_subsample: f64,
    pub loading_chunk_size: usize,
    pub loading_chunk_delay: Duration,

    /// Ray-to-point tolerance for picking, world units.
    pub pick_threshold: f32,
    /// Camera offset from the selected pulsar at the end of a fly-to.
    pub fly_to_offset: Vec3,
    pub fly_to_duration: Duration,
    /// Where hidden pulsars are parked.
    pub hidden_position: Vec3,
}

impl Default for VisualConfig {
    fn default() -> Self {
        Self {
            galaxy_radius: 30.0,
            star_count: 20_000,
            star_min_radius: 100.0,
            star_max_radius: 400.0,
            star_spread: 500.0,
            pulsar_size_range: [0.15, 0.5],
            fast_pulsar_threshold: 0.1,
            slow_pulsar_threshold: 0.5,
            position_noise: 0.2,
            noise_seed: 0x5053_5221,

            bloom_strength: 1.5,
            bloom_radius: 0.5,
            bloom_threshold: 0.05,
            tone_mapping_exposure: 1.1,

            dm_intensity_factor: 0.01,

            audio_enabled: true,
            default_volume: 0.15,

            pulsar_subsample: 1.0,
            loading_chunk_size: 100,
            loading_chunk_delay: Duration::from_millis(5),

            pick_threshold: 0.5,
            fly_to_offset: Vec3::new(10.0, 5.0, 10.0),
            fly_to_duration: Duration::from_millis(1000),
            hidden_position: Vec3::splat(10_000.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_values_overlay_defaults() {
        let args = Args::parse_from([
            "pulsar_viewer",
            "--subsample",
            "1.7",
            "--chunk-size",
            "0",
            "--mute",
            "--volume",
            "0.4",
        ]);
        let cfg = args.visual_config();
        assert_eq!(cfg.pulsar_subsample, 1.0);
        assert_eq!(cfg.loading_chunk_size, 1);
        assert!(!cfg.audio_enabled);
        assert_eq!(cfg.default_volume, 0.4);
        assert_eq!(cfg.galaxy_radius, 30.0);
    }

    #[test]
    fn no_flags_keep_defaults() {
        let args = Args::parse_from(["pulsar_viewer"]);
        assert!(args.catalog.is_none());
        assert_eq!(args.visual_config(), VisualConfig::default());
    }
}
