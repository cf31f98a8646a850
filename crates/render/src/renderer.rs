use glam::Vec3;
use morphscene_kernel::FrameContext;

/// Camera/view configuration for rendering.
#[derive(Debug, Clone, Copy)]
pub struct RenderView {
    /// Camera position in world space.
    pub eye: Vec3,
    /// Point the camera orbits and looks at.
    pub target: Vec3,
    /// Field of view in degrees.
    pub fov_degrees: f32,
}

impl Default for RenderView {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 1.5, 5.0),
            target: Vec3::new(0.0, 0.75, 0.0),
            fov_degrees: 50.0,
        }
    }
}

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// A renderer reads the frame state and a view, then produces output. It
/// never mutates the frame state.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame from the given frame state and view.
    fn render(&self, ctx: &FrameContext, view: &RenderView) -> Self::Output;
}

/// Produces a human-readable description of what a frame would draw.
///
/// Used by the CLI and in tests where no GPU is available.
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, ctx: &FrameContext, view: &RenderView) -> String {
        let snap = ctx.snapshot();
        let mut out = format!(
            "=== Frame {} (t={:.2}s) ===\n",
            snap.frame, snap.time
        );
        out.push_str(&format!(
            "Camera: eye=({:.1}, {:.1}, {:.1}) target=({:.1}, {:.1}, {:.1}) fov={:.0}\n",
            view.eye.x,
            view.eye.y,
            view.eye.z,
            view.target.x,
            view.target.y,
            view.target.z,
            view.fov_degrees
        ));

        match ctx.particle_buffers() {
            Some((start, _)) => out.push_str(&format!(
                "Particles: {} mix={:.2} offset_z={:.3} style={:?}\n",
                start.len(),
                snap.mix_value,
                snap.walk_position,
                ctx.config().particles.style
            )),
            None => out.push_str("Particles: none\n"),
        }

        let joints = ctx.joint_matrices();
        out.push_str(&format!(
            "Character: state={} joints={}\n",
            snap.state,
            joints.len()
        ));
        for (joint, m) in ctx.animator().skeleton().joints().iter().zip(&joints) {
            let p = m.transform_point3(Vec3::ZERO);
            out.push_str(&format!(
                "  {:<16} pos=({:.2}, {:.2}, {:.2})\n",
                joint.name, p.x, p.y, p.z
            ));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use morphscene_common::{ParticleConfig, SceneConfig};

    fn ctx() -> FrameContext {
        FrameContext::build(SceneConfig {
            particles: ParticleConfig {
                count: 32,
                seed: Some(5),
                ..ParticleConfig::default()
            },
            ..SceneConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn describes_fresh_frame() {
        let output = DebugTextRenderer::new().render(&ctx(), &RenderView::default());
        assert!(output.contains("Frame 0"));
        assert!(output.contains("Particles: 32 mix=0.00"));
        assert!(output.contains("state=idle joints=17"));
        assert!(output.contains("hips"));
    }

    #[test]
    fn torn_down_frame_has_no_particles() {
        let mut c = ctx();
        c.teardown();
        let output = DebugTextRenderer::new().render(&c, &RenderView::default());
        assert!(output.contains("Particles: none"));
    }

    #[test]
    fn render_view_default_targets_character() {
        let view = RenderView::default();
        assert_eq!(view.target, Vec3::new(0.0, 0.75, 0.0));
    }
}
