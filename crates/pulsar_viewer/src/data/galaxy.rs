//! Maps catalog records onto the pulsar point cloud.

use super::color::hsl_to_linear;
use super::types::PointInstance;
use crate::config::VisualConfig;
use glam::Vec3;
use noise::{NoiseFn, OpenSimplex};
use psrcat::PulsarRecord;
use rand::Rng;

/// Distance (kpc, after doubling) that maps to the full galaxy radius.
const DIST_SCALE_KPC: f64 = 30.0;
/// Noise sampling frequency and per-axis decorrelation offsets.
const NOISE_FREQ: f64 = 0.1;
const NOISE_AXIS_OFFSETS: [f64; 3] = [0.0, 100.0, 200.0];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PeriodClass {
    Fast,
    Medium,
    Slow,
}

impl PeriodClass {
    pub fn of(period: f64, cfg: &VisualConfig) -> Self {
        if period < cfg.fast_pulsar_threshold {
            Self::Fast
        } else if period > cfg.slow_pulsar_threshold {
            Self::Slow
        } else {
            Self::Medium
        }
    }

    /// Hue/saturation/lightness of the bucket.
    pub fn hsl(self) -> [f32; 3] {
        match self {
            // blue to cyan
            Self::Fast => [0.6, 0.9, 0.7],
            // green to yellow
            Self::Medium => [0.3, 0.9, 0.7],
            // red to orange
            Self::Slow => [0.05, 0.9, 0.7],
        }
    }

    pub fn color(self) -> [f32; 3] {
        let [h, s, l] = self.hsl();
        hsl_to_linear(h, s, l)
    }
}

/// Placement radius for a distance in kpc.
pub fn placement_radius(dist_kpc: f64, galaxy_radius: f32) -> f32 {
    let t = (dist_kpc * 2.0 / DIST_SCALE_KPC).clamp(0.0, 1.0);
    galaxy_radius * (0.2 + 0.8 * t as f32)
}

/// Galactic longitude/latitude (degrees) on a sphere of `radius`, galactic
/// plane = XZ, north galactic pole = +Y.
pub fn galactic_to_cartesian(gl_deg: f64, gb_deg: f64, radius: f32) -> Vec3 {
    let (sin_l, cos_l) = gl_deg.to_radians().sin_cos();
    let (sin_b, cos_b) = gb_deg.to_radians().sin_cos();
    let r = radius as f64;
    Vec3::new(
        (r * cos_l * cos_b) as f32,
        (r * sin_b) as f32,
        (r * sin_l * cos_b) as f32,
    )
}

/// Scene-side state of one pulsar. The index in [`PulsarField::visuals`] is
/// also its slot in the GPU instance buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct PulsarVisual {
    pub position: Vec3,
    pub original_position: Vec3,
    pub size: f32,
    pub visible: bool,
    /// Index of the source record in the loaded catalog.
    pub record: usize,
}

/// Accumulated pulsar buffers. Grows during loading, fixed length afterwards.
#[derive(Debug, Default, Clone)]
pub struct PulsarField {
    pub visuals: Vec<PulsarVisual>,
    pub instances: Vec<PointInstance>,
}

impl PulsarField {
    pub fn len(&self) -> usize {
        self.visuals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visuals.is_empty()
    }
}

/// Turns records into visuals and instance data.
pub struct PulsarFieldBuilder {
    noise: OpenSimplex,
    cfg: VisualConfig,
}

impl PulsarFieldBuilder {
    pub fn new(cfg: &VisualConfig) -> Self {
        Self {
            noise: OpenSimplex::new(cfg.noise_seed),
            cfg: cfg.clone(),
        }
    }

    /// Deterministic position: spherical placement plus a noise offset of up
    /// to `position_noise × radius` per axis.
    pub fn position(&self, record: &PulsarRecord) -> Vec3 {
        let radius = placement_radius(record.dist_or_default(), self.cfg.galaxy_radius);
        let p = galactic_to_cartesian(record.gl_deg(), record.gb_deg(), radius);

        let scale = radius * self.cfg.position_noise;
        let [ox, oy, oz] = NOISE_AXIS_OFFSETS.map(|k| {
            let n = self.noise.get([
                p.x as f64 * NOISE_FREQ + k,
                p.y as f64 * NOISE_FREQ + k,
                p.z as f64 * NOISE_FREQ + k,
            ]);
            n as f32 * scale
        });

        p + Vec3::new(ox, oy, oz)
    }

    /// Appends one record to the field.
    pub fn push<R: Rng + ?Sized>(
        &self,
        field: &mut PulsarField,
        record_index: usize,
        record: &PulsarRecord,
        rng: &mut R,
    ) {
        let position = self.position(record);
        let [lo, hi] = self.cfg.pulsar_size_range;
        let size = rng.gen_range(lo..=hi);

        let period = record.period_or_default();
        let color = PeriodClass::of(period, &self.cfg).color();

        field.instances.push(PointInstance {
            position: position.to_array(),
            size,
            color,
            period: period as f32,
            dm: record.dm_or_default() as f32,
        });
        field.visuals.push(PulsarVisual {
            position,
            original_position: position,
            size,
            visible: true,
            record: record_index,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn crab() -> PulsarRecord {
        PulsarRecord {
            jname: Some("B0531+21".into()),
            assoc: Some("Crab".into()),
            p0: Some(0.0334),
            dm: Some(56.77),
            gl: Some(184.56),
            gb: Some(-5.78),
            dist: Some(2.0),
        }
    }

    #[test]
    fn crab_period_bucket_follows_thresholds() {
        let cfg = VisualConfig::default();
        // 0.0334 < 0.1 → fast with the default thresholds.
        assert_eq!(PeriodClass::of(0.0334, &cfg), PeriodClass::Fast);

        let wide = VisualConfig {
            fast_pulsar_threshold: 0.01,
            slow_pulsar_threshold: 0.5,
            ..VisualConfig::default()
        };
        assert_eq!(PeriodClass::of(0.0334, &wide), PeriodClass::Medium);
    }

    #[test]
    fn bucket_boundaries_are_exclusive() {
        let cfg = VisualConfig::default();
        assert_eq!(PeriodClass::of(0.1, &cfg), PeriodClass::Medium);
        assert_eq!(PeriodClass::of(0.5, &cfg), PeriodClass::Medium);
        assert_eq!(PeriodClass::of(0.5000001, &cfg), PeriodClass::Slow);
        assert_eq!(PeriodClass::of(0.0999, &cfg), PeriodClass::Fast);
    }

    #[test]
    fn bucket_colors_are_distinct() {
        let f = PeriodClass::Fast.color();
        let m = PeriodClass::Medium.color();
        let s = PeriodClass::Slow.color();
        assert_ne!(f, m);
        assert_ne!(m, s);
        // Fast is blue-dominant, slow red-dominant.
        assert!(f[2] > f[0]);
        assert!(s[0] > s[2]);
    }

    #[test]
    fn radius_scales_with_distance_and_clamps() {
        assert!((placement_radius(0.0, 30.0) - 6.0).abs() < 1e-5);
        assert!((placement_radius(2.0, 30.0) - 30.0 * (0.2 + 0.8 * 4.0 / 30.0)).abs() < 1e-5);
        assert!((placement_radius(15.0, 30.0) - 30.0).abs() < 1e-5);
        assert!((placement_radius(500.0, 30.0) - 30.0).abs() < 1e-5);
    }

    #[test]
    fn cartesian_mapping() {
        let p = galactic_to_cartesian(0.0, 0.0, 10.0);
        assert!(p.abs_diff_eq(Vec3::new(10.0, 0.0, 0.0), 1e-5));
        let p = galactic_to_cartesian(90.0, 0.0, 10.0);
        assert!(p.abs_diff_eq(Vec3::new(0.0, 0.0, 10.0), 1e-5));
        let p = galactic_to_cartesian(123.0, 90.0, 10.0);
        assert!(p.abs_diff_eq(Vec3::new(0.0, 10.0, 0.0), 1e-5));
        let p = galactic_to_cartesian(184.56, -5.78, 7.0);
        assert!((p.length() - 7.0).abs() < 1e-4);
    }

    #[test]
    fn position_is_deterministic_and_bounded() {
        let cfg = VisualConfig::default();
        let a = PulsarFieldBuilder::new(&cfg);
        let b = PulsarFieldBuilder::new(&cfg);
        let rec = crab();
        assert_eq!(a.position(&rec), b.position(&rec));

        let radius = placement_radius(2.0, cfg.galaxy_radius);
        let base = galactic_to_cartesian(184.56, -5.78, radius);
        let off = a.position(&rec) - base;
        let max = radius * cfg.position_noise * 1.01;
        assert!(off.x.abs() <= max && off.y.abs() <= max && off.z.abs() <= max);
    }

    #[test]
    fn push_fills_parallel_buffers() {
        let cfg = VisualConfig::default();
        let builder = PulsarFieldBuilder::new(&cfg);
        let mut rng = StdRng::seed_from_u64(11);
        let mut field = PulsarField::default();

        builder.push(&mut field, 0, &crab(), &mut rng);
        builder.push(&mut field, 1, &PulsarRecord::default(), &mut rng);

        assert_eq!(field.len(), 2);
        assert_eq!(field.instances.len(), 2);

        let v = &field.visuals[0];
        let inst = &field.instances[0];
        assert!(v.visible);
        assert_eq!(v.position, v.original_position);
        assert_eq!(inst.position, v.position.to_array());
        assert!((0.15..=0.5).contains(&inst.size));
        assert_eq!(inst.size, v.size);
        assert_eq!(inst.color, PeriodClass::Fast.color());
        assert!((inst.dm - 56.77).abs() < 1e-4);

        // Missing fields use the accessor defaults.
        let empty = &field.instances[1];
        assert_eq!(empty.period, 0.5);
        assert_eq!(empty.dm, 100.0);
        assert_eq!(empty.color, PeriodClass::Medium.color());
        assert_eq!(field.visuals[1].record, 1);
    }
}
