//! CPU mirror of the pulse math in `shaders/points.wgsl`.
//!
//! Keep both in sync: the UI meter and the tests use these functions, the GPU
//! uses the WGSL copy.

/// Seconds of animation per rotation period.
pub const CYCLE_PERIODS: f32 = 3.0;
/// Intensity floor between pulses.
pub const PULSE_FLOOR: f32 = 0.4;
/// Screen-size scale factor numerator (pixels × view depth per world unit).
pub const SIZE_ATTENUATION: f32 = 400.0;

/// GLSL/WGSL `smoothstep`.
#[inline]
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Pulse intensity in `[0.4, 1.0]` at `time` seconds for a pulsar with the
/// given `period`.
///
/// One cycle lasts `3 × period`: a sharp rise over the first 10%, then a slow
/// decay over the next 80%.
pub fn pulse_intensity(time: f32, period: f32) -> f32 {
    let cycle = CYCLE_PERIODS * period;
    if !(cycle > 0.0) {
        return PULSE_FLOOR;
    }
    let phase = time.rem_euclid(cycle) / cycle;
    let pulse = smoothstep(0.0, 0.1, phase) * (1.0 - smoothstep(0.1, 0.9, phase));
    pulse * (1.0 - PULSE_FLOOR) + PULSE_FLOOR
}

/// DM contribution to the size, saturating at 1.
#[inline]
pub fn dm_factor(dm: f32, intensity_factor: f32) -> f32 {
    (dm * intensity_factor).min(1.0)
}

/// World-space point size after pulse and DM modulation.
#[inline]
pub fn modulated_size(base: f32, intensity: f32, dm_factor: f32) -> f32 {
    base * (1.0 + intensity * 0.5 + dm_factor * 0.2)
}

/// On-screen size in pixels for a point `view_depth` units in front of the camera.
#[inline]
pub fn screen_size_px(world_size: f32, view_depth: f32) -> f32 {
    world_size * (SIZE_ATTENUATION / view_depth.max(1e-6))
}

/// Displayed colour for a base colour at the given pulse intensity.
#[inline]
pub fn pulse_color(base: [f32; 3], intensity: f32) -> [f32; 3] {
    let k = 0.6 + intensity * 0.4;
    [base[0] * k, base[1] * k, base[2] * k]
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    #[test]
    fn intensity_stays_in_range() {
        for period in [0.00155_f32, 0.0334, 0.5, 2.0, 8.5] {
            for i in 0..1000 {
                let t = i as f32 * 0.0137;
                let v = pulse_intensity(t, period);
                assert!((0.4 - EPS..=1.0 + EPS).contains(&v), "p={period} t={t} v={v}");
            }
        }
    }

    #[test]
    fn cycle_shape() {
        let period = 1.0;
        // Start of cycle: floor.
        assert!((pulse_intensity(0.0, period) - 0.4).abs() < EPS);
        // End of the rise (10% of a 3 s cycle): peak.
        assert!((pulse_intensity(0.3, period) - 1.0).abs() < EPS);
        // Past 90%: back on the floor.
        assert!((pulse_intensity(2.8, period) - 0.4).abs() < EPS);
        // Halfway through the decay: mid-level.
        let mid = pulse_intensity(1.5, period);
        assert!((mid - 0.7).abs() < EPS, "mid={mid}");
        // Periodic.
        assert!((pulse_intensity(0.3 + 3.0 * 7.0, period) - 1.0).abs() < 1e-3);
    }

    #[test]
    fn degenerate_period_is_floor() {
        assert_eq!(pulse_intensity(1.0, 0.0), PULSE_FLOOR);
        assert_eq!(pulse_intensity(1.0, -1.0), PULSE_FLOOR);
    }

    #[test]
    fn size_modulation() {
        assert!((dm_factor(56.77, 0.01) - 0.5677).abs() < EPS);
        assert_eq!(dm_factor(297.0, 0.01), 1.0);

        // Peak intensity with saturated DM: 1 + 0.5 + 0.2.
        assert!((modulated_size(0.2, 1.0, 1.0) - 0.34).abs() < EPS);
        // Floor intensity with no DM: 1 + 0.2.
        assert!((modulated_size(0.2, 0.4, 0.0) - 0.24).abs() < EPS);

        assert!((screen_size_px(0.5, 40.0) - 5.0).abs() < EPS);
    }

    #[test]
    fn color_brightens_with_pulse() {
        let base = [0.5, 0.25, 1.0];
        assert_eq!(pulse_color(base, 1.0), base);
        let dim = pulse_color(base, 0.4);
        assert!((dim[2] - 0.76).abs() < EPS);
    }
}
