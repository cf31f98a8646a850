use morphscene_anim::AnimState;
use morphscene_common::Aabb;
use morphscene_kernel::{FrameContext, FrameEvent, MorphDirection};
use serde::Serialize;

/// Read-only queries over a `FrameContext` for overlays and the CLI.
pub struct FrameInspector;

impl FrameInspector {
    pub fn summary(ctx: &FrameContext) -> SceneSummary {
        let animator = ctx.animator();
        SceneSummary {
            frame: ctx.frame(),
            time: ctx.time(),
            state: animator.state(),
            frozen_for: animator.cooldown_remaining(),
            mix_value: ctx.mix_value(),
            direction: ctx.morph().direction,
            walk_position: ctx.walk().position(),
            targets: ctx.targets().map_or(0, |t| t.len()),
            pending_events: ctx.events().len(),
        }
    }

    /// Count events by kind.
    pub fn tally(events: &[FrameEvent]) -> EventTally {
        let mut tally = EventTally::default();
        for event in events {
            match event {
                FrameEvent::AnimatorTransition { .. } => tally.transitions += 1,
                FrameEvent::MissingClip { .. } => tally.missing_clips += 1,
                FrameEvent::MorphSaturated { .. } => tally.morph_saturations += 1,
                FrameEvent::WalkCycleWrapped { .. } => tally.walk_wraps += 1,
                FrameEvent::WalkToggled { .. } => tally.walk_toggles += 1,
                FrameEvent::JumpTriggered { .. } => tally.jumps += 1,
                FrameEvent::JumpReleased { .. } | FrameEvent::TornDown { .. } => {}
            }
        }
        tally
    }

    /// Point count and bounds of each blended buffer.
    pub fn particles(ctx: &FrameContext) -> Option<ParticleReport> {
        let (start, end) = ctx.particle_buffers()?;
        Some(ParticleReport {
            count: start.len(),
            start_bounds: start.bounds(),
            end_bounds: end.bounds(),
        })
    }
}

/// One-line state of the scene.
#[derive(Debug, Clone, Serialize)]
pub struct SceneSummary {
    pub frame: u64,
    pub time: f32,
    pub state: AnimState,
    pub frozen_for: Option<f32>,
    pub mix_value: f32,
    pub direction: MorphDirection,
    pub walk_position: f32,
    pub targets: usize,
    pub pending_events: usize,
}

impl std::fmt::Display for SceneSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "frame={} t={:.2}s state={} mix={:.2} ({:?}) z={:.3} targets={} events={}",
            self.frame,
            self.time,
            self.state,
            self.mix_value,
            self.direction,
            self.walk_position,
            self.targets,
            self.pending_events
        )?;
        if let Some(frozen) = self.frozen_for {
            write!(f, " frozen={frozen:.2}s")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EventTally {
    pub transitions: usize,
    pub missing_clips: usize,
    pub morph_saturations: usize,
    pub walk_wraps: usize,
    pub walk_toggles: usize,
    pub jumps: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParticleReport {
    pub count: usize,
    pub start_bounds: Option<Aabb>,
    pub end_bounds: Option<Aabb>,
}
