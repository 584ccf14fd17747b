//! Cursor ray picking against point positions.

use glam::{Mat4, Vec2, Vec3};

/// Cursor position in physical pixels to normalised device coordinates
/// (x right, y up, both in [-1, 1]).
pub fn cursor_to_ndc(cursor: (f64, f64), viewport: (u32, u32)) -> Vec2 {
    let w = viewport.0.max(1) as f64;
    let h = viewport.1.max(1) as f64;
    Vec2::new(
        (cursor.0 / w * 2.0 - 1.0) as f32,
        (-(cursor.1 / h) * 2.0 + 1.0) as f32,
    )
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit length.
    pub dir: Vec3,
}

impl Ray {
    /// Unprojects `ndc` through the inverse of a 0..1-depth view-projection.
    pub fn from_ndc(ndc: Vec2, view_proj: Mat4) -> Option<Self> {
        let inv = view_proj.inverse();
        let near = inv.project_point3(ndc.extend(0.0));
        let far = inv.project_point3(ndc.extend(1.0));
        let dir = (far - near).try_normalize()?;
        Some(Self { origin: near, dir })
    }

    /// Squared distance from `p` to the closest point of the ray, and the
    /// distance from the origin to that closest point.
    pub fn distance_sq_to_point(&self, p: Vec3) -> (f32, f32) {
        let t = (p - self.origin).dot(self.dir).max(0.0);
        let closest = self.origin + self.dir * t;
        (p.distance_squared(closest), t)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickHit {
    /// Buffer slot of the hit point.
    pub index: usize,
    /// Distance along the ray.
    pub distance: f32,
}

/// Nearest point within `threshold` world units of the ray whose distance
/// along the ray lies in `[near, far]`.
pub fn pick_nearest<I>(ray: &Ray, points: I, threshold: f32, near: f32, far: f32) -> Option<PickHit>
where
    I: IntoIterator<Item = Vec3>,
{
    let thr_sq = threshold * threshold;

    points
        .into_iter()
        .enumerate()
        .filter_map(|(index, p)| {
            let (d_sq, distance) = ray.distance_sq_to_point(p);
            (d_sq <= thr_sq && (near..=far).contains(&distance)).then_some(PickHit { index, distance })
        })
        .min_by(|a, b| a.distance.total_cmp(&b.distance))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forward_ray() -> Ray {
        Ray {
            origin: Vec3::ZERO,
            dir: Vec3::NEG_Z,
        }
    }

    #[test]
    fn ndc_corners() {
        assert_eq!(cursor_to_ndc((0.0, 0.0), (800, 600)), Vec2::new(-1.0, 1.0));
        assert_eq!(cursor_to_ndc((800.0, 600.0), (800, 600)), Vec2::new(1.0, -1.0));
        assert_eq!(cursor_to_ndc((400.0, 300.0), (800, 600)), Vec2::ZERO);
    }

    #[test]
    fn nearest_within_threshold_wins() {
        let points = [
            Vec3::new(0.3, 0.0, -20.0),
            Vec3::new(0.0, 0.2, -10.0),
            Vec3::new(2.0, 0.0, -5.0),
            Vec3::new(0.0, 0.0, 10.0),
        ];
        let hit = pick_nearest(&forward_ray(), points, 0.5, 0.1, 1000.0).unwrap();
        assert_eq!(hit.index, 1);
        assert!((hit.distance - 10.0).abs() < 1e-5);
    }

    #[test]
    fn misses_and_range_limits() {
        let ray = forward_ray();
        assert!(pick_nearest(&ray, [Vec3::new(1.0, 0.0, -5.0)], 0.5, 0.1, 1000.0).is_none());
        assert!(pick_nearest(&ray, [Vec3::new(0.0, 0.0, -2000.0)], 0.5, 0.1, 1000.0).is_none());
        assert!(pick_nearest(&ray, std::iter::empty(), 0.5, 0.1, 1000.0).is_none());
    }

    #[test]
    fn centre_ray_from_camera_hits_target() {
        let eye = Vec3::new(0.0, 25.0, 45.0);
        let view = Mat4::look_at_rh(eye, Vec3::ZERO, Vec3::Y);
        let proj = Mat4::perspective_rh(70f32.to_radians(), 16.0 / 9.0, 0.1, 1000.0);
        let ray = Ray::from_ndc(Vec2::ZERO, proj * view).unwrap();

        assert!(ray.origin.distance(eye) < 0.2);
        assert!(ray.dir.abs_diff_eq((-eye).normalize(), 1e-3));

        let hit = pick_nearest(&ray, [Vec3::new(0.1, 0.0, 0.0)], 0.5, 0.1, 1000.0).unwrap();
        assert_eq!(hit.index, 0);
    }
}
