/// HSL (all components in [0, 1]) to sRGB.
pub fn hsl_to_srgb(h: f32, s: f32, l: f32) -> [f32; 3] {
    if s <= 0.0 {
        return [l, l, l];
    }

    let h = h.rem_euclid(1.0);
    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;

    let hue = |t: f32| {
        let t = t.rem_euclid(1.0);
        if t < 1.0 / 6.0 {
            p + (q - p) * 6.0 * t
        } else if t < 0.5 {
            q
        } else if t < 2.0 / 3.0 {
            p + (q - p) * 6.0 * (2.0 / 3.0 - t)
        } else {
            p
        }
    };

    [hue(h + 1.0 / 3.0), hue(h), hue(h - 1.0 / 3.0)]
}

#[inline]
pub fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// HSL in sRGB space to linear RGB, the working space of the scene targets.
pub fn hsl_to_linear(h: f32, s: f32, l: f32) -> [f32; 3] {
    hsl_to_srgb(h, s, l).map(srgb_to_linear)
}

/// `0xRRGGBB` in sRGB to linear RGB.
pub fn hex_to_linear(hex: u32) -> [f32; 3] {
    [(hex >> 16) & 0xff, (hex >> 8) & 0xff, hex & 0xff].map(|c| srgb_to_linear(c as f32 / 255.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: [f32; 3], b: [f32; 3]) -> bool {
        a.iter().zip(b).all(|(x, y)| (x - y).abs() < 1e-4)
    }

    #[test]
    fn primary_hues() {
        assert!(close(hsl_to_srgb(0.0, 1.0, 0.5), [1.0, 0.0, 0.0]));
        assert!(close(hsl_to_srgb(1.0 / 3.0, 1.0, 0.5), [0.0, 1.0, 0.0]));
        assert!(close(hsl_to_srgb(2.0 / 3.0, 1.0, 0.5), [0.0, 0.0, 1.0]));
        assert!(close(hsl_to_srgb(0.3, 0.0, 0.8), [0.8, 0.8, 0.8]));
    }

    #[test]
    fn linearisation_endpoints() {
        assert_eq!(srgb_to_linear(0.0), 0.0);
        assert!((srgb_to_linear(1.0) - 1.0).abs() < 1e-6);
        assert!(close(hex_to_linear(0xffffff), [1.0, 1.0, 1.0]));
        assert!(hex_to_linear(0x101010)[0] < 0.01);
    }
}
