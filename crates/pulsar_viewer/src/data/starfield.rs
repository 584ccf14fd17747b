//! Decorative background stars. No interaction.

use super::color::hsl_to_linear;
use super::types::PointInstance;
use crate::config::VisualConfig;
use glam::Vec3;
use rand::Rng;

/// Chance of a saturated, randomly-hued star.
const COLORED_STAR_CHANCE: f64 = 0.1;

/// Generates `cfg.star_count` stars in a shell around the origin.
///
/// Coordinates are uniform in a cube of side `star_spread`; points closer than
/// `star_min_radius` are pushed out to a random length in
/// `[star_min_radius, star_max_radius)`.
pub fn generate_starfield<R: Rng + ?Sized>(cfg: &VisualConfig, rng: &mut R) -> Vec<PointInstance> {
    let half = cfg.star_spread * 0.5;

    (0..cfg.star_count)
        .map(|_| {
            let mut p = Vec3::new(
                rng.gen_range(-half..=half),
                rng.gen_range(-half..=half),
                rng.gen_range(-half..=half),
            );

            if p.length() < cfg.star_min_radius {
                let len = rng.gen_range(cfg.star_min_radius..cfg.star_max_radius);
                // A point exactly at the origin has no direction; pick one.
                let dir = p.try_normalize().unwrap_or(Vec3::Y);
                p = dir * len;
            }

            let size = rng.gen_range(0.05..0.2);

            let color = if rng.gen_bool(COLORED_STAR_CHANCE) {
                hsl_to_linear(rng.gen(), 0.7, 0.65)
            } else {
                // white-blue
                hsl_to_linear(0.6, rng.gen_range(0.0..0.1), rng.gen_range(0.8..1.0))
            };

            PointInstance {
                position: p.to_array(),
                size,
                color,
                period: 0.0,
                dm: 0.0,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn stars_respect_minimum_radius() {
        let cfg = VisualConfig {
            star_count: 5_000,
            ..VisualConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(42);
        let stars = generate_starfield(&cfg, &mut rng);

        assert_eq!(stars.len(), 5_000);
        for s in &stars {
            let r = Vec3::from(s.position).length();
            assert!(r >= cfg.star_min_radius - 1e-3, "r={r}");
            assert!((0.05..0.2).contains(&s.size));
            assert!(s.color.iter().all(|c| (0.0..=1.0).contains(c)));
            assert_eq!(s.period, 0.0);
        }
    }

    #[test]
    fn mostly_white_blue() {
        let cfg = VisualConfig {
            star_count: 2_000,
            ..VisualConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(5);
        let stars = generate_starfield(&cfg, &mut rng);
        let bright = stars
            .iter()
            .filter(|s| s.color.iter().all(|c| *c > 0.5))
            .count();
        assert!(bright > stars.len() * 8 / 10, "bright={bright}");
    }
}
