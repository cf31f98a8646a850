use glam::{Mat4, Vec3};
use morphscene_render::RenderView;

/// Orbit camera circling a target point: drag to orbit, scroll to zoom.
///
/// Camera motion lives outside the frame state and never feeds back into it.
pub struct OrbitCamera {
    pub target: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub distance: f32,
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub sensitivity: f32,
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            target: Vec3::new(0.0, 0.75, 0.0),
            yaw: 0.0,
            pitch: 10.0_f32.to_radians(),
            distance: 5.0,
            fov: 50.0_f32.to_radians(),
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 500.0,
            sensitivity: 0.005,
            zoom_speed: 0.1,
            min_distance: 1.0,
            max_distance: 60.0,
        }
    }
}

impl OrbitCamera {
    pub fn with_target(target: Vec3) -> Self {
        Self {
            target,
            ..Self::default()
        }
    }

    /// Camera position on the sphere around the target.
    pub fn eye(&self) -> Vec3 {
        let offset = Vec3::new(
            self.yaw.sin() * self.pitch.cos(),
            self.pitch.sin(),
            self.yaw.cos() * self.pitch.cos(),
        );
        self.target + offset * self.distance
    }

    /// Orbit by a mouse drag of `dx`, `dy` pixels.
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.yaw -= dx * self.sensitivity;
        self.pitch += dy * self.sensitivity;
        self.pitch = self
            .pitch
            .clamp(-85.0_f32.to_radians(), 85.0_f32.to_radians());
    }

    /// Zoom by scroll `lines`; positive moves closer.
    pub fn zoom(&mut self, lines: f32) {
        let factor = (1.0 - lines * self.zoom_speed).max(0.1);
        self.distance = (self.distance * factor).clamp(self.min_distance, self.max_distance);
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye(), self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    pub fn render_view(&self) -> RenderView {
        RenderView {
            eye: self.eye(),
            target: self.target,
            fov_degrees: self.fov.to_degrees(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_camera_looks_at_target() {
        let cam = OrbitCamera::default();
        assert_eq!(cam.target, Vec3::new(0.0, 0.75, 0.0));
        assert!((cam.eye().distance(cam.target) - 5.0).abs() < 1e-4);
        let vp = cam.view_projection();
        assert!(!vp.col(0).x.is_nan());

        let clip = vp * cam.target.extend(1.0);
        assert!((clip.x / clip.w).abs() < 1e-4);
        assert!((clip.y / clip.w).abs() < 1e-4);
    }

    #[test]
    fn orbit_keeps_distance() {
        let mut cam = OrbitCamera::default();
        let before = cam.eye();
        cam.rotate(120.0, -40.0);
        assert_ne!(cam.eye(), before);
        assert!((cam.eye().distance(cam.target) - cam.distance).abs() < 1e-4);
    }

    #[test]
    fn pitch_is_clamped() {
        let mut cam = OrbitCamera::default();
        cam.rotate(0.0, 1.0e6);
        assert!(cam.pitch <= 85.0_f32.to_radians() + 1e-6);
    }

    #[test]
    fn zoom_respects_limits() {
        let mut cam = OrbitCamera::default();
        cam.zoom(2.0);
        assert!(cam.distance < 5.0);
        for _ in 0..100 {
            cam.zoom(5.0);
        }
        assert_eq!(cam.distance, cam.min_distance);
        for _ in 0..100 {
            cam.zoom(-5.0);
        }
        assert_eq!(cam.distance, cam.max_distance);
    }

    #[test]
    fn render_view_mirrors_camera() {
        let cam = OrbitCamera::with_target(Vec3::ONE);
        let view = cam.render_view();
        assert_eq!(view.target, Vec3::ONE);
        assert!((view.fov_degrees - 50.0).abs() < 1e-3);
    }
}
