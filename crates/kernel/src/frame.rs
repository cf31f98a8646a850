use glam::{Mat4, Vec3};
use morphscene_anim::{
    AnimState, AnimatorEvent, AnimatorInput, CharacterAnimator, Skeleton, procedural,
};
use morphscene_assets::{
    AssetError, MAZE1, MAZE2, MeshLibrary, MorphTargets, build_morph_targets,
};
use morphscene_common::{ConfigError, ParticleBuffer, SceneConfig};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::morph::{MorphController, MorphDirection};
use crate::walk::PositionCycle;

/// Errors that stop the scene from being assembled.
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error("config: {0}")]
    Config(#[from] ConfigError),
    #[error("assets: {0}")]
    Asset(#[from] AssetError),
}

/// A record of every state change made while running frames.
///
/// The log is what the CLI prints and what the inspector summarises.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FrameEvent {
    /// The animator started a cross-fade.
    AnimatorTransition {
        frame: u64,
        from: AnimState,
        to: AnimState,
    },
    /// A clip was requested but is unavailable.
    MissingClip { frame: u64, state: AnimState },
    /// The morph value reached the bound it was heading for.
    MorphSaturated { frame: u64, value: f32 },
    /// The walk offset passed its maximum and snapped back to 0.
    WalkCycleWrapped { frame: u64 },
    WalkToggled { frame: u64, walking: bool },
    /// Jump pressed: morph started and its direction flipped.
    JumpTriggered {
        frame: u64,
        direction: MorphDirection,
    },
    /// The jump request expired.
    JumpReleased { frame: u64 },
    TornDown { frame: u64 },
}

/// Read-only summary of one frame, for display and logging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameSnapshot {
    pub frame: u64,
    pub time: f32,
    pub mix_value: f32,
    pub morph_active: bool,
    pub direction: MorphDirection,
    pub walk_position: f32,
    pub is_walking: bool,
    pub is_jumping: bool,
    pub state: AnimState,
    pub jump_release: Option<f32>,
    pub cooldown: Option<f32>,
}

/// The single owned per-frame state record.
///
/// Everything that changes over time is read and written synchronously
/// inside `update`; renderers only read from it.
#[derive(Debug, Clone)]
pub struct FrameContext {
    config: SceneConfig,
    morph: MorphController,
    walk: PositionCycle,
    animator: CharacterAnimator,
    targets: Option<MorphTargets>,
    is_walking: bool,
    is_jumping: bool,
    /// Countdown until `is_jumping` clears.
    jump_release: Option<f32>,
    time: f32,
    frame: u64,
    torn_down: bool,
    event_log: Vec<FrameEvent>,
}

impl FrameContext {
    /// Assemble a context from already-built collaborators.
    pub fn new(config: SceneConfig, targets: MorphTargets, animator: CharacterAnimator) -> Self {
        if targets.is_empty() {
            tracing::warn!("no morph targets survived sampling, particle layer disabled");
        } else if targets.len() < 2 {
            tracing::warn!("only one morph target, morph has no visible effect");
        }

        let mut ctx = Self {
            morph: MorphController::new(&config.morph),
            walk: PositionCycle::new(&config.walk),
            animator,
            targets: Some(targets),
            is_walking: false,
            is_jumping: false,
            jump_release: None,
            time: 0.0,
            frame: 0,
            torn_down: false,
            event_log: Vec::new(),
            config,
        };
        ctx.collect_animator_events();
        ctx
    }

    /// Build the default scene: both maze sources sampled into morph targets,
    /// the procedural humanoid and its idle/walk/jump clips.
    pub fn build(config: SceneConfig) -> Result<Self, SetupError> {
        config.validate()?;
        let _span = tracing::info_span!("scene_setup", count = config.particles.count).entered();

        let library = MeshLibrary::with_default_sources()?;
        let meshes = library.collect(&[MAZE1, MAZE2])?;
        let count = config.particles.count;
        let targets = match config.particles.seed {
            Some(seed) => build_morph_targets(&meshes, count, &mut ChaCha8Rng::seed_from_u64(seed)),
            None => build_morph_targets(&meshes, count, &mut rand::rng()),
        };

        let skeleton = Skeleton::humanoid();
        let clips = procedural::default_clips(&skeleton);
        let animator = CharacterAnimator::new(skeleton, clips, &config.animator);

        tracing::info!(
            targets = targets.len(),
            joints = animator.skeleton().len(),
            "scene ready"
        );
        Ok(Self::new(config, targets, animator))
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Seconds accumulated from every `update`.
    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn mix_value(&self) -> f32 {
        self.morph.value()
    }

    pub fn morph(&self) -> &MorphController {
        &self.morph
    }

    pub fn walk(&self) -> &PositionCycle {
        &self.walk
    }

    pub fn animator(&self) -> &CharacterAnimator {
        &self.animator
    }

    pub fn is_walking(&self) -> bool {
        self.is_walking
    }

    pub fn is_jumping(&self) -> bool {
        self.is_jumping
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    pub fn targets(&self) -> Option<&MorphTargets> {
        self.targets.as_ref()
    }

    /// The two buffers the particle shaders blend between, if any survived.
    pub fn particle_buffers(&self) -> Option<(&ParticleBuffer, &ParticleBuffer)> {
        let targets = self.targets.as_ref()?;
        Some((targets.start()?, targets.end()?))
    }

    /// Translation of the particle group along z from the walk cycle.
    pub fn particle_offset(&self) -> Vec3 {
        Vec3::new(0.0, 0.0, self.walk.position())
    }

    pub fn armature_transform(&self) -> Mat4 {
        Mat4::from_translation(Vec3::from(self.config.animator.armature_offset))
    }

    /// World-space joint matrices of the character.
    pub fn joint_matrices(&self) -> Vec<Mat4> {
        let root = self.armature_transform();
        self.animator
            .joint_matrices()
            .into_iter()
            .map(|m| root * m)
            .collect()
    }

    pub fn events(&self) -> &[FrameEvent] {
        &self.event_log
    }

    pub fn drain_events(&mut self) -> Vec<FrameEvent> {
        std::mem::take(&mut self.event_log)
    }

    pub fn snapshot(&self) -> FrameSnapshot {
        FrameSnapshot {
            frame: self.frame,
            time: self.time,
            mix_value: self.morph.value(),
            morph_active: self.morph.active,
            direction: self.morph.direction,
            walk_position: self.walk.position(),
            is_walking: self.is_walking,
            is_jumping: self.is_jumping,
            state: self.animator.state(),
            jump_release: self.jump_release,
            cooldown: self.animator.cooldown_remaining(),
        }
    }

    pub fn set_walking(&mut self, walking: bool) {
        if self.torn_down || self.is_walking == walking {
            return;
        }
        self.is_walking = walking;
        self.event_log.push(FrameEvent::WalkToggled {
            frame: self.frame,
            walking,
        });
        tracing::debug!(walking, "walk toggled");
    }

    pub fn toggle_walk(&mut self) {
        self.set_walking(!self.is_walking);
    }

    /// Request a jump: starts morphing, flips the morph direction and holds
    /// `is_jumping` for `jump_hold` seconds. A repeat press restarts the hold.
    pub fn trigger_jump(&mut self) {
        if self.torn_down {
            return;
        }
        self.is_jumping = true;
        self.morph.active = true;
        self.morph.flip();
        self.jump_release = Some(self.config.animator.jump_hold);
        self.event_log.push(FrameEvent::JumpTriggered {
            frame: self.frame,
            direction: self.morph.direction,
        });
        tracing::debug!(direction = ?self.morph.direction, "jump triggered");
    }

    /// Run one frame of `dt` seconds. A negative or non-finite `dt` counts as 0.
    pub fn update(&mut self, dt: f32) {
        if self.torn_down {
            return;
        }
        let dt = if dt.is_finite() && dt >= 0.0 {
            dt
        } else {
            tracing::warn!(dt, "invalid frame period, treating as 0");
            0.0
        };
        self.frame += 1;
        let _span = tracing::trace_span!("frame_update", frame = self.frame).entered();
        self.time += dt;

        if self.is_walking && self.walk.advance() {
            self.event_log.push(FrameEvent::WalkCycleWrapped { frame: self.frame });
            tracing::trace!("walk cycle wrapped");
        }

        if self.morph.advance(dt) {
            self.event_log.push(FrameEvent::MorphSaturated {
                frame: self.frame,
                value: self.morph.value(),
            });
        }

        let input = AnimatorInput {
            is_walking: self.is_walking,
            is_jumping: self.is_jumping,
        };
        self.animator.update(input, dt);
        self.collect_animator_events();

        // The animator has seen this frame's jump request; only now may it expire.
        if let Some(remaining) = self.jump_release {
            let remaining = remaining - dt;
            if remaining > 0.0 {
                self.jump_release = Some(remaining);
            } else {
                self.jump_release = None;
                self.is_jumping = false;
                self.event_log.push(FrameEvent::JumpReleased { frame: self.frame });
            }
        }
    }

    /// Release sampled buffers, cancel every countdown and stop updating.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.targets = None;
        self.jump_release = None;
        self.animator.cancel_pending();
        self.torn_down = true;
        self.event_log.push(FrameEvent::TornDown { frame: self.frame });
        tracing::info!(frame = self.frame, "scene torn down");
    }

    fn collect_animator_events(&mut self) {
        let frame = self.frame;
        for event in self.animator.drain_events() {
            match event {
                AnimatorEvent::Transition { from, to } => {
                    self.event_log
                        .push(FrameEvent::AnimatorTransition { frame, from, to });
                }
                AnimatorEvent::MissingClip { state } => {
                    self.event_log.push(FrameEvent::MissingClip { frame, state });
                }
                AnimatorEvent::CooldownCleared => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use morphscene_common::ParticleConfig;

    const DT: f32 = 0.25;

    fn small_config() -> SceneConfig {
        SceneConfig {
            particles: ParticleConfig {
                count: 256,
                seed: Some(7),
                ..ParticleConfig::default()
            },
            ..SceneConfig::default()
        }
    }

    fn ctx() -> FrameContext {
        FrameContext::build(small_config()).unwrap()
    }

    fn transitions(ctx: &FrameContext) -> Vec<(AnimState, AnimState)> {
        ctx.events()
            .iter()
            .filter_map(|e| match e {
                FrameEvent::AnimatorTransition { from, to, .. } => Some((*from, *to)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn build_samples_both_sources() {
        let c = ctx();
        let targets = c.targets().unwrap();
        assert_eq!(targets.len(), 2);
        let (a, b) = c.particle_buffers().unwrap();
        assert_eq!(a.as_slice().len(), 3 * 256);
        assert_eq!(b.as_slice().len(), 3 * 256);
        assert!(c.events().is_empty());
    }

    #[test]
    fn build_rejects_invalid_config() {
        let mut config = small_config();
        config.particles.count = 0;
        assert!(matches!(
            FrameContext::build(config),
            Err(SetupError::Config(_))
        ));
    }

    #[test]
    fn idle_frames_change_nothing_but_time() {
        let mut c = ctx();
        for _ in 0..8 {
            c.update(DT);
        }
        assert_eq!(c.frame(), 8);
        assert_eq!(c.time(), 2.0);
        assert_eq!(c.mix_value(), 0.0);
        assert_eq!(c.walk().position(), 0.0);
        assert_eq!(c.animator().state(), AnimState::Idle);
    }

    #[test]
    fn walking_moves_particle_group() {
        let mut c = ctx();
        c.toggle_walk();
        for _ in 0..10 {
            c.update(DT);
        }
        assert!((c.particle_offset().z - 0.15).abs() < 1e-5);
        assert_eq!(transitions(&c), [(AnimState::Idle, AnimState::Walk)]);

        c.toggle_walk();
        c.update(DT);
        let z = c.particle_offset().z;
        c.update(DT);
        assert_eq!(c.particle_offset().z, z);
        assert_eq!(c.animator().state(), AnimState::Idle);
    }

    #[test]
    fn jump_flips_direction_and_releases_after_hold() {
        let mut c = ctx();
        c.trigger_jump();
        assert!(c.is_jumping());
        assert!(c.morph().active);
        assert_eq!(c.morph().direction, MorphDirection::Backward);

        for _ in 0..3 {
            c.update(DT);
            assert!(c.is_jumping());
        }
        c.update(DT);
        assert!(!c.is_jumping());
        assert!(c
            .events()
            .iter()
            .any(|e| matches!(e, FrameEvent::JumpReleased { frame: 4 })));
    }

    #[test]
    fn jump_runs_one_transition_then_resumes_walk() {
        let mut c = ctx();
        c.set_walking(true);
        c.update(DT);
        c.trigger_jump();
        c.update(DT);
        // Walk flips during the cooldown; nothing may happen.
        c.set_walking(false);
        c.update(DT);
        c.set_walking(true);
        c.update(DT);
        c.update(DT);
        assert_eq!(c.animator().state(), AnimState::Jump);
        c.update(DT);
        assert_eq!(
            transitions(&c),
            [
                (AnimState::Idle, AnimState::Walk),
                (AnimState::Walk, AnimState::Jump),
                (AnimState::Jump, AnimState::Walk),
            ]
        );
    }

    #[test]
    fn jump_survives_a_frame_longer_than_the_hold() {
        let mut c = ctx();
        c.trigger_jump();
        c.update(1.0);
        assert_eq!(c.animator().state(), AnimState::Jump);
        assert!(!c.is_jumping());
        let jumps = transitions(&c)
            .iter()
            .filter(|(_, to)| *to == AnimState::Jump)
            .count();
        assert_eq!(jumps, 1);

        c.update(1.0);
        assert_eq!(c.animator().state(), AnimState::Idle);
    }

    #[test]
    fn long_stall_expires_cooldown_in_one_frame() {
        let mut c = ctx();
        c.trigger_jump();
        c.update(DT);
        assert_eq!(c.animator().state(), AnimState::Jump);
        // The request is still held when the cooldown ends, so it re-arms once.
        c.update(3.0);
        assert!(!c.is_jumping());
        assert_eq!(c.animator().state(), AnimState::Jump);
        c.update(3.0);
        assert_eq!(c.snapshot().cooldown, None);
        assert_eq!(c.animator().state(), AnimState::Idle);
    }

    #[test]
    fn negative_dt_does_not_extend_countdowns() {
        let mut c = ctx();
        c.trigger_jump();
        c.update(DT);
        let before = c.snapshot();
        assert_eq!(before.cooldown, Some(1.0));

        c.update(-0.1);
        c.update(f32::NAN);
        let after = c.snapshot();
        assert_eq!(after.cooldown, before.cooldown);
        assert_eq!(after.jump_release, before.jump_release);
        assert_eq!(after.time, before.time);

        for _ in 0..4 {
            c.update(DT);
        }
        assert_eq!(c.animator().state(), AnimState::Idle);
    }

    #[test]
    fn second_jump_morphs_forward_to_one() {
        let mut c = ctx();
        c.trigger_jump();
        c.update(DT);
        assert_eq!(c.mix_value(), 0.0);
        c.trigger_jump();
        assert_eq!(c.morph().direction, MorphDirection::Forward);
        for _ in 0..50 {
            c.update(DT);
        }
        assert_eq!(c.mix_value(), 1.0);
        let saturated = c
            .events()
            .iter()
            .filter(|e| matches!(e, FrameEvent::MorphSaturated { .. }))
            .count();
        assert_eq!(saturated, 1);
    }

    #[test]
    fn teardown_stops_updates_and_drops_buffers() {
        let mut c = ctx();
        c.trigger_jump();
        c.update(DT);
        c.teardown();
        assert!(c.is_torn_down());
        assert!(c.targets().is_none());
        assert!(c.particle_buffers().is_none());
        assert_eq!(c.snapshot().jump_release, None);
        assert_eq!(c.snapshot().cooldown, None);

        let frame = c.frame();
        c.update(DT);
        c.trigger_jump();
        c.teardown();
        assert_eq!(c.frame(), frame);
        let torn = c
            .events()
            .iter()
            .filter(|e| matches!(e, FrameEvent::TornDown { .. }))
            .count();
        assert_eq!(torn, 1);
    }

    #[test]
    fn empty_targets_disable_particles() {
        let skeleton = Skeleton::humanoid();
        let clips = procedural::default_clips(&skeleton);
        let animator = CharacterAnimator::new(skeleton, clips, &Default::default());
        let c = FrameContext::new(SceneConfig::default(), MorphTargets::default(), animator);
        assert!(c.particle_buffers().is_none());
    }

    #[test]
    fn missing_clip_is_logged_once() {
        let skeleton = Skeleton::humanoid();
        let clips = procedural::default_clips(&skeleton)
            .into_iter()
            .filter(|c| c.name != procedural::WALK)
            .collect();
        let animator = CharacterAnimator::new(skeleton, clips, &Default::default());
        let mut c = FrameContext::new(SceneConfig::default(), MorphTargets::default(), animator);
        c.set_walking(true);
        for _ in 0..4 {
            c.update(DT);
        }
        let missing: Vec<_> = c
            .events()
            .iter()
            .filter(|e| matches!(e, FrameEvent::MissingClip { .. }))
            .collect();
        assert_eq!(missing.len(), 1);
        assert_eq!(c.animator().state(), AnimState::Idle);
    }

    #[test]
    fn joint_matrices_include_armature_offset() {
        let c = ctx();
        let hips = c.joint_matrices()[0].transform_point3(Vec3::ZERO);
        assert!((hips.z + 1.2).abs() < 1e-5);
        assert!((hips.y - 0.95).abs() < 1e-5);
    }
}
