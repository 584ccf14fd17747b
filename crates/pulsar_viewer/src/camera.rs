use glam::{Mat4, Vec3};
use std::f32::consts::{PI, TAU};
use std::time::Duration;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};

/// Cursor travel (physical px) below which a press/release counts as a click.
pub const CLICK_SLOP_PX: f64 = 4.0;

#[derive(Debug, Clone)]
pub struct Camera {
    pub eye: Vec3,
    /// Point the camera looks at and orbits around.
    pub target: Vec3,
    pub fovy_deg: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn new(aspect: f32) -> Self {
        Self {
            eye: Vec3::new(0.0, 25.0, 45.0),
            target: Vec3::ZERO,
            fovy_deg: 70.0,
            aspect,
            near: 0.1,
            far: 1000.0,
        }
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.aspect = width.max(1) as f32 / height.max(1) as f32;
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, Vec3::Y)
    }

    /// Right-handed projection with wgpu's 0..1 depth range.
    pub fn proj(&self) -> Mat4 {
        Mat4::perspective_rh(self.fovy_deg.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.proj() * self.view()
    }
}

/// Orbit position around a target: radius, azimuth `theta` around +Y measured
/// from +Z, polar angle `phi` measured from +Y.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spherical {
    pub radius: f32,
    pub theta: f32,
    pub phi: f32,
}

impl Spherical {
    pub fn from_offset(v: Vec3) -> Self {
        let radius = v.length();
        if radius == 0.0 {
            return Self {
                radius,
                theta: 0.0,
                phi: 0.0,
            };
        }
        Self {
            radius,
            theta: v.x.atan2(v.z),
            phi: (v.y / radius).clamp(-1.0, 1.0).acos(),
        }
    }

    pub fn to_offset(self) -> Vec3 {
        let s = self.phi.sin() * self.radius;
        Vec3::new(s * self.theta.sin(), self.phi.cos() * self.radius, s * self.theta.cos())
    }
}

/// Damped orbit controls with idle auto-rotation and click detection.
pub struct OrbitController {
    pub damping: f32,
    pub auto_rotate: bool,
    pub auto_rotate_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,

    theta_delta: f32,
    phi_delta: f32,
    scale: f32,
    suspended_for: Duration,

    mouse_down: bool,
    press_pos: Option<(f64, f64)>,
    last_mouse: Option<(f64, f64)>,
    viewport_height: f32,
}

impl OrbitController {
    pub fn new() -> Self {
        Self {
            damping: 0.05,
            auto_rotate: true,
            auto_rotate_speed: 0.2,
            min_distance: 15.0,
            max_distance: 100.0,

            theta_delta: 0.0,
            phi_delta: 0.0,
            scale: 1.0,
            suspended_for: Duration::ZERO,

            mouse_down: false,
            press_pos: None,
            last_mouse: None,
            viewport_height: 720.0,
        }
    }

    pub fn set_viewport_height(&mut self, height: u32) {
        self.viewport_height = height.max(1) as f32;
    }

    /// Pauses auto-rotation for `d` and drops any residual motion.
    pub fn suspend_auto_rotate(&mut self, d: Duration) {
        self.suspended_for = d;
        self.theta_delta = 0.0;
        self.phi_delta = 0.0;
        self.scale = 1.0;
    }

    pub fn auto_rotate_active(&self) -> bool {
        self.auto_rotate && self.suspended_for.is_zero()
    }

    /// Last known cursor position in physical pixels.
    pub fn cursor(&self) -> Option<(f64, f64)> {
        self.last_mouse
    }

    /// Consumes input. Returns the cursor position when a left click (press and
    /// release without dragging) completes.
    pub fn handle_event(&mut self, event: &WindowEvent) -> Option<(f64, f64)> {
        match event {
            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state,
                ..
            } => match state {
                ElementState::Pressed => {
                    self.mouse_down = true;
                    self.press_pos = self.last_mouse;
                }
                ElementState::Released => {
                    self.mouse_down = false;
                    let press = self.press_pos.take();
                    let release = self.last_mouse?;
                    // No cursor position seen before the press: no travel.
                    let press = press.unwrap_or(release);
                    let travel = (release.0 - press.0).hypot(release.1 - press.1);
                    if travel < CLICK_SLOP_PX {
                        return Some(release);
                    }
                }
            },
            WindowEvent::CursorMoved { position, .. } => {
                self.handle_cursor_orbit((position.x, position.y));
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let scroll = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 120.0,
                };
                self.handle_scroll(scroll);
            }
            _ => {}
        }
        None
    }

    fn handle_scroll(&mut self, delta: f32) {
        // Positive delta = scroll up = zoom in.
        self.scale *= 0.95_f32.powf(delta);
    }

    fn handle_cursor_orbit(&mut self, xy: (f64, f64)) {
        if self.mouse_down && self.press_pos.is_none() {
            self.press_pos = Some(xy);
        }
        if let (Some(last), true) = (self.last_mouse, self.mouse_down) {
            let dx = (xy.0 - last.0) as f32;
            let dy = (xy.1 - last.1) as f32;
            self.theta_delta -= TAU * dx / self.viewport_height;
            self.phi_delta -= TAU * dy / self.viewport_height;
        }
        self.last_mouse = Some(xy);
    }

    /// Lets time pass without moving the camera.
    pub fn elapse(&mut self, dt: Duration) {
        self.suspended_for = self.suspended_for.saturating_sub(dt);
    }

    /// Advances the orbit by `dt` and writes the new eye position.
    pub fn update(&mut self, dt: Duration, camera: &mut Camera) {
        self.elapse(dt);

        if self.auto_rotate_active() {
            // One revolution per 60 s at speed 1.
            self.theta_delta -= TAU / 60.0 * self.auto_rotate_speed * dt.as_secs_f32();
        }

        let mut s = Spherical::from_offset(camera.eye - camera.target);
        s.theta += self.theta_delta * self.damping;
        s.phi = (s.phi + self.phi_delta * self.damping).clamp(1e-4, PI - 1e-4);
        s.radius = (s.radius * self.scale).clamp(self.min_distance, self.max_distance);

        self.theta_delta *= 1.0 - self.damping;
        self.phi_delta *= 1.0 - self.damping;
        self.scale = 1.0;

        camera.eye = camera.target + s.to_offset();
    }
}

impl Default for OrbitController {
    fn default() -> Self {
        Self::new()
    }
}

pub fn ease_in_out_quad(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        2.0 * t * t
    } else {
        -1.0 + (4.0 - 2.0 * t) * t
    }
}

/// Eased camera move toward a pulsar, re-aiming at it every frame.
#[derive(Debug, Clone)]
pub struct FlyTo {
    from: Vec3,
    to: Vec3,
    target: Vec3,
    duration: Duration,
    elapsed: Duration,
}

impl FlyTo {
    pub fn new(from: Vec3, target: Vec3, offset: Vec3, duration: Duration) -> Self {
        Self {
            from,
            to: target + offset,
            target,
            duration,
            elapsed: Duration::ZERO,
        }
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// Moves the animation forward and applies it to `camera`. Returns `true`
    /// once the end position has been reached.
    pub fn advance(&mut self, dt: Duration, camera: &mut Camera) -> bool {
        self.elapsed = (self.elapsed + dt).min(self.duration);
        let t = if self.duration.is_zero() {
            1.0
        } else {
            self.elapsed.as_secs_f32() / self.duration.as_secs_f32()
        };
        camera.eye = self.from.lerp(self.to, ease_in_out_quad(t));
        camera.target = self.target;
        self.is_finished()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ease_curve_endpoints_and_symmetry() {
        assert_eq!(ease_in_out_quad(0.0), 0.0);
        assert_eq!(ease_in_out_quad(1.0), 1.0);
        assert!((ease_in_out_quad(0.5) - 0.5).abs() < 1e-6);
        assert!((ease_in_out_quad(0.25) + ease_in_out_quad(0.75) - 1.0).abs() < 1e-6);
        assert!(ease_in_out_quad(0.1) < 0.1);
    }

    #[test]
    fn fly_to_reaches_offset_and_aims_at_target() {
        let mut cam = Camera::new(1.5);
        let target = Vec3::new(3.0, -1.0, 7.0);
        let mut fly = FlyTo::new(cam.eye, target, Vec3::new(10.0, 5.0, 10.0), Duration::from_millis(1000));

        assert!(!fly.advance(Duration::from_millis(500), &mut cam));
        assert_eq!(cam.target, target);
        let halfway = Vec3::new(0.0, 25.0, 45.0).lerp(target + Vec3::new(10.0, 5.0, 10.0), 0.5);
        assert!(cam.eye.abs_diff_eq(halfway, 1e-4));

        assert!(fly.advance(Duration::from_millis(600), &mut cam));
        assert!(cam.eye.abs_diff_eq(Vec3::new(13.0, 4.0, 17.0), 1e-4));
        assert!(fly.is_finished());
    }

    fn left(state: ElementState) -> WindowEvent {
        WindowEvent::MouseInput {
            device_id: unsafe { winit::event::DeviceId::dummy() },
            state,
            button: MouseButton::Left,
        }
    }

    fn moved(x: f64, y: f64) -> WindowEvent {
        WindowEvent::CursorMoved {
            device_id: unsafe { winit::event::DeviceId::dummy() },
            position: winit::dpi::PhysicalPosition::new(x, y),
        }
    }

    #[test]
    fn click_versus_drag() {
        let mut ctl = OrbitController::new();
        assert_eq!(ctl.handle_event(&moved(100.0, 100.0)), None);
        assert_eq!(ctl.handle_event(&left(ElementState::Pressed)), None);
        assert_eq!(ctl.handle_event(&moved(102.0, 101.0)), None);
        assert_eq!(ctl.handle_event(&left(ElementState::Released)), Some((102.0, 101.0)));

        assert_eq!(ctl.handle_event(&left(ElementState::Pressed)), None);
        ctl.handle_event(&moved(140.0, 120.0));
        assert_eq!(ctl.handle_event(&left(ElementState::Released)), None);
    }

    #[test]
    fn first_click_before_any_cursor_motion_still_counts() {
        let mut ctl = OrbitController::new();
        assert_eq!(ctl.handle_event(&left(ElementState::Pressed)), None);
        ctl.handle_event(&moved(50.0, 60.0));
        assert_eq!(ctl.handle_event(&left(ElementState::Released)), Some((50.0, 60.0)));
    }

    #[test]
    fn spherical_round_trip() {
        let v = Vec3::new(0.0, 25.0, 45.0);
        let s = Spherical::from_offset(v);
        assert!(s.to_offset().abs_diff_eq(v, 1e-4));
    }

    #[test]
    fn zoom_is_clamped() {
        let mut ctl = OrbitController::new();
        ctl.auto_rotate = false;
        let mut cam = Camera::new(1.0);

        for _ in 0..200 {
            ctl.handle_scroll(10.0);
            ctl.update(Duration::from_millis(16), &mut cam);
        }
        assert!((cam.eye.distance(cam.target) - 15.0).abs() < 1e-3);

        for _ in 0..200 {
            ctl.handle_scroll(-10.0);
            ctl.update(Duration::from_millis(16), &mut cam);
        }
        assert!((cam.eye.distance(cam.target) - 100.0).abs() < 1e-3);
    }

    #[test]
    fn auto_rotate_orbits_and_can_be_suspended() {
        let mut ctl = OrbitController::new();
        let mut cam = Camera::new(1.0);
        let start = cam.eye;
        let r = start.length();

        ctl.suspend_auto_rotate(Duration::from_millis(1000));
        ctl.update(Duration::from_millis(500), &mut cam);
        assert!(cam.eye.abs_diff_eq(start, 1e-4));
        assert!(!ctl.auto_rotate_active());

        ctl.update(Duration::from_millis(600), &mut cam);
        assert!(ctl.auto_rotate_active());
        for _ in 0..60 {
            ctl.update(Duration::from_millis(16), &mut cam);
        }
        assert!(!cam.eye.abs_diff_eq(start, 1e-3));
        assert!((cam.eye.length() - r).abs() < 1e-2);
    }
}
