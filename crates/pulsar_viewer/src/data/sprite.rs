//! Radial-gradient point sprites.

pub const SPRITE_SIZE: u32 = 64;

/// Alpha stops `(offset, alpha)` for the background stars.
pub const STAR_STOPS: [(f32, f32); 4] = [(0.0, 1.0), (0.2, 0.8), (0.5, 0.3), (1.0, 0.0)];
/// Alpha stops for the pulsars: a wider bright core.
pub const PULSAR_STOPS: [(f32, f32); 4] = [(0.0, 1.0), (0.3, 0.8), (0.6, 0.3), (1.0, 0.0)];

/// Piecewise-linear gradient lookup. `t` outside the stops clamps to the ends.
pub fn gradient_alpha(stops: &[(f32, f32)], t: f32) -> f32 {
    let Some(&(first_t, first_a)) = stops.first() else {
        return 0.0;
    };
    if t <= first_t {
        return first_a;
    }
    for w in stops.windows(2) {
        let (t0, a0) = w[0];
        let (t1, a1) = w[1];
        if t <= t1 {
            let span = (t1 - t0).max(f32::EPSILON);
            return a0 + (a1 - a0) * (t - t0) / span;
        }
    }
    stops.last().map_or(0.0, |&(_, a)| a)
}

/// RGBA8 texel data (`size × size × 4`) for a white sprite whose alpha falls
/// off radially following `stops`.
pub fn radial_sprite(size: u32, stops: &[(f32, f32)]) -> Vec<u8> {
    let half = size as f32 * 0.5;
    let mut texels = Vec::with_capacity((size * size * 4) as usize);

    for y in 0..size {
        for x in 0..size {
            // Sample at texel centres.
            let dx = (x as f32 + 0.5 - half) / half;
            let dy = (y as f32 + 0.5 - half) / half;
            let t = (dx * dx + dy * dy).sqrt();
            let a = (gradient_alpha(stops, t).clamp(0.0, 1.0) * 255.0).round() as u8;
            texels.extend_from_slice(&[255, 255, 255, a]);
        }
    }

    texels
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gradient_interpolates_between_stops() {
        assert_eq!(gradient_alpha(&STAR_STOPS, 0.0), 1.0);
        assert!((gradient_alpha(&STAR_STOPS, 0.1) - 0.9).abs() < 1e-6);
        assert!((gradient_alpha(&STAR_STOPS, 0.35) - 0.55).abs() < 1e-6);
        assert_eq!(gradient_alpha(&STAR_STOPS, 1.0), 0.0);
        assert_eq!(gradient_alpha(&STAR_STOPS, 1.4), 0.0);
        assert_eq!(gradient_alpha(&[], 0.5), 0.0);
    }

    #[test]
    fn sprite_is_bright_in_the_middle_and_clear_at_the_corners() {
        let tex = radial_sprite(SPRITE_SIZE, &PULSAR_STOPS);
        assert_eq!(tex.len(), (SPRITE_SIZE * SPRITE_SIZE * 4) as usize);

        let alpha = |x: u32, y: u32| tex[((y * SPRITE_SIZE + x) * 4 + 3) as usize];
        assert!(alpha(32, 32) > 240);
        assert_eq!(alpha(0, 0), 0);
        assert_eq!(alpha(63, 63), 0);
        assert!(alpha(32, 32) > alpha(48, 32));
    }

    #[test]
    fn pulsar_core_is_wider_than_star_core() {
        let t = 0.3;
        assert!(gradient_alpha(&PULSAR_STOPS, t) > gradient_alpha(&STAR_STOPS, t));
    }
}
