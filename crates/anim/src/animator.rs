use glam::Mat4;
use morphscene_common::AnimatorConfig;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::clip::AnimClip;
use crate::mixer::{ActionId, AnimationMixer};
use crate::procedural::{IDLE, JUMP, WALK};
use crate::skeleton::{Pose, Skeleton};

/// The character's motion state. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AnimState {
    Idle,
    Walk,
    Jump,
}

impl AnimState {
    pub const ALL: [AnimState; 3] = [AnimState::Idle, AnimState::Walk, AnimState::Jump];

    /// Name of the clip that drives this state.
    pub fn clip_name(self) -> &'static str {
        match self {
            AnimState::Idle => IDLE,
            AnimState::Walk => WALK,
            AnimState::Jump => JUMP,
        }
    }
}

impl std::fmt::Display for AnimState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.clip_name())
    }
}

/// External signals sampled once per frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnimatorInput {
    pub is_walking: bool,
    pub is_jumping: bool,
}

/// Something the animator did that callers may want to log or display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AnimatorEvent {
    /// Cross-fade from one state to another started.
    Transition { from: AnimState, to: AnimState },
    /// A state was requested but its clip is unavailable; Idle was used instead.
    MissingClip { state: AnimState },
    /// The jump cooldown expired and transitions are evaluated again.
    CooldownCleared,
}

/// Idle/Walk/Jump state machine driving an `AnimationMixer`.
///
/// Jump wins over Walk and freezes evaluation for `jump_cooldown` seconds.
/// The cooldown is a countdown in elapsed time owned by the animator, so it
/// can be cancelled and needs no host timer.
#[derive(Debug, Clone)]
pub struct CharacterAnimator {
    skeleton: Skeleton,
    mixer: AnimationMixer,
    actions: BTreeMap<AnimState, ActionId>,
    state: AnimState,
    cooldown: Option<f32>,
    cross_fade: f32,
    jump_cooldown: f32,
    reported_missing: BTreeSet<AnimState>,
    events: Vec<AnimatorEvent>,
}

impl CharacterAnimator {
    /// Bind `clips` by state name and start in Idle.
    ///
    /// Clips that fail validation against `skeleton` are treated as missing.
    pub fn new(skeleton: Skeleton, clips: Vec<AnimClip>, config: &AnimatorConfig) -> Self {
        let mut mixer = AnimationMixer::new();
        let mut actions = BTreeMap::new();

        for clip in clips {
            let Some(state) = AnimState::ALL
                .into_iter()
                .find(|s| s.clip_name() == clip.name)
            else {
                tracing::debug!(clip = %clip.name, "clip not bound to any state");
                continue;
            };
            if let Err(e) = clip.validate(&skeleton) {
                tracing::warn!("rejecting clip for {state}: {e}");
                continue;
            }
            actions.insert(state, mixer.add_clip(clip));
        }

        let mut animator = Self {
            skeleton,
            mixer,
            actions,
            state: AnimState::Idle,
            cooldown: None,
            cross_fade: config.cross_fade,
            jump_cooldown: config.jump_cooldown,
            reported_missing: BTreeSet::new(),
            events: Vec::new(),
        };

        match animator.actions.get(&AnimState::Idle) {
            Some(&idle) => animator.mixer.play(idle),
            None => animator.report_missing(AnimState::Idle),
        }
        animator
    }

    pub fn state(&self) -> AnimState {
        self.state
    }

    /// Remaining cooldown, if one is running.
    pub fn cooldown_remaining(&self) -> Option<f32> {
        self.cooldown
    }

    pub fn has_clip(&self, state: AnimState) -> bool {
        self.actions.contains_key(&state)
    }

    pub fn mixer(&self) -> &AnimationMixer {
        &self.mixer
    }

    pub fn skeleton(&self) -> &Skeleton {
        &self.skeleton
    }

    /// Weight of the clip bound to `state`, 0 if none.
    pub fn weight(&self, state: AnimState) -> f32 {
        self.actions
            .get(&state)
            .map_or(0.0, |&id| self.mixer.weight(id))
    }

    pub fn pose(&self) -> Pose {
        self.mixer.pose(&self.skeleton)
    }

    /// Model-space joint matrices of the current blended pose.
    pub fn joint_matrices(&self) -> Vec<Mat4> {
        self.skeleton.global_matrices(&self.pose())
    }

    pub fn events(&self) -> &[AnimatorEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<AnimatorEvent> {
        std::mem::take(&mut self.events)
    }

    /// Drop a running cooldown.
    pub fn cancel_pending(&mut self) {
        if self.cooldown.take().is_some() {
            tracing::debug!("jump cooldown cancelled");
        }
    }

    /// Run one frame: tick the cooldown, evaluate the transition rule unless
    /// frozen, then advance the mixer by `dt`.
    ///
    /// Returns the transition started this frame, if any.
    pub fn update(&mut self, input: AnimatorInput, dt: f32) -> Option<(AnimState, AnimState)> {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        if let Some(remaining) = self.cooldown {
            let remaining = remaining - dt;
            if remaining > 0.0 {
                self.cooldown = Some(remaining);
            } else {
                self.cooldown = None;
                self.events.push(AnimatorEvent::CooldownCleared);
                tracing::trace!("jump cooldown cleared");
            }
        }

        let transition = if self.cooldown.is_none() {
            self.evaluate(input)
        } else {
            None
        };

        self.mixer.update(dt);
        transition
    }

    fn evaluate(&mut self, input: AnimatorInput) -> Option<(AnimState, AnimState)> {
        let requested = if input.is_jumping {
            AnimState::Jump
        } else if input.is_walking {
            AnimState::Walk
        } else {
            AnimState::Idle
        };

        let target = if self.has_clip(requested) || requested == AnimState::Idle {
            requested
        } else {
            self.report_missing(requested);
            AnimState::Idle
        };

        if target == AnimState::Jump {
            self.cooldown = Some(self.jump_cooldown);
        }
        if target == self.state {
            return None;
        }
        Some(self.enter(target))
    }

    fn enter(&mut self, target: AnimState) -> (AnimState, AnimState) {
        let from = self.state;
        let prev = self.actions.get(&from).copied();
        match self.actions.get(&target).copied() {
            Some(next) => self.mixer.cross_fade(prev, next, self.cross_fade),
            None => {
                // Only Idle can be entered without a clip; the old clip still fades out.
                if let Some(prev) = prev {
                    self.mixer.fade_out(prev, self.cross_fade);
                }
            }
        }
        self.state = target;
        self.events.push(AnimatorEvent::Transition { from, to: target });
        tracing::debug!(%from, to = %target, "animator transition");
        (from, target)
    }

    fn report_missing(&mut self, state: AnimState) {
        if self.reported_missing.insert(state) {
            tracing::warn!(%state, "animation clip missing, falling back to idle");
            self.events.push(AnimatorEvent::MissingClip { state });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::procedural::default_clips;

    const DT: f32 = 0.25;

    fn animator() -> CharacterAnimator {
        let skel = Skeleton::humanoid();
        let clips = default_clips(&skel);
        CharacterAnimator::new(skel, clips, &AnimatorConfig::default())
    }

    fn animator_without(missing: &str) -> CharacterAnimator {
        let skel = Skeleton::humanoid();
        let clips = default_clips(&skel)
            .into_iter()
            .filter(|c| c.name != missing)
            .collect();
        CharacterAnimator::new(skel, clips, &AnimatorConfig::default())
    }

    fn input(is_walking: bool, is_jumping: bool) -> AnimatorInput {
        AnimatorInput {
            is_walking,
            is_jumping,
        }
    }

    #[test]
    fn backwards_time_keeps_cooldown() {
        let mut a = animator();
        a.update(input(false, true), DT);
        assert_eq!(a.cooldown_remaining(), Some(1.0));
        a.update(input(false, false), -DT);
        a.update(input(false, false), f32::INFINITY);
        assert_eq!(a.cooldown_remaining(), Some(1.0));
        assert_eq!(a.state(), AnimState::Jump);
    }

    #[test]
    fn starts_idle_with_idle_clip_playing() {
        let a = animator();
        assert_eq!(a.state(), AnimState::Idle);
        assert_eq!(a.weight(AnimState::Idle), 1.0);
        assert!(a.events().is_empty());
    }

    #[test]
    fn no_signals_resolve_to_idle() {
        let mut a = animator();
        a.update(input(true, false), DT);
        assert_eq!(a.state(), AnimState::Walk);
        let t = a.update(input(false, false), DT);
        assert_eq!(t, Some((AnimState::Walk, AnimState::Idle)));
        assert_eq!(a.state(), AnimState::Idle);
    }

    #[test]
    fn same_state_request_is_not_a_transition() {
        let mut a = animator();
        assert_eq!(a.update(input(true, false), DT), Some((AnimState::Idle, AnimState::Walk)));
        assert_eq!(a.update(input(true, false), DT), None);
        assert_eq!(a.update(input(false, false), DT).map(|t| t.1), Some(AnimState::Idle));
    }

    #[test]
    fn jump_dominates_walk() {
        let mut a = animator();
        let t = a.update(input(true, true), DT);
        assert_eq!(t, Some((AnimState::Idle, AnimState::Jump)));
    }

    #[test]
    fn one_jump_frame_freezes_transitions_for_cooldown() {
        let mut a = animator();
        assert_eq!(
            a.update(input(false, true), DT),
            Some((AnimState::Idle, AnimState::Jump))
        );

        // 0.75 s of frozen frames, walking flips on and off meanwhile.
        for walking in [true, false, true] {
            assert_eq!(a.update(input(walking, false), DT), None);
            assert_eq!(a.state(), AnimState::Jump);
        }

        // Cooldown reaches zero on the fourth frame and evaluation resumes.
        assert_eq!(
            a.update(input(true, false), DT),
            Some((AnimState::Jump, AnimState::Walk))
        );
        let transitions = a
            .events()
            .iter()
            .filter(|e| matches!(e, AnimatorEvent::Transition { .. }))
            .count();
        assert_eq!(transitions, 2);
    }

    #[test]
    fn held_jump_rearms_cooldown_without_restart() {
        let mut a = animator();
        a.update(input(false, true), DT);
        for _ in 0..3 {
            a.update(input(false, true), DT);
        }
        assert_eq!(a.update(input(false, true), DT), None);
        assert_eq!(a.state(), AnimState::Jump);
        assert_eq!(a.cooldown_remaining(), Some(1.0));
    }

    #[test]
    fn cross_fade_takes_half_a_second() {
        let mut a = animator();
        a.update(input(true, false), DT);
        // Fade has run for one frame.
        assert!((a.weight(AnimState::Walk) - 0.5).abs() < 1e-6);
        assert!((a.weight(AnimState::Idle) - 0.5).abs() < 1e-6);
        a.update(input(true, false), DT);
        assert_eq!(a.weight(AnimState::Walk), 1.0);
        assert_eq!(a.weight(AnimState::Idle), 0.0);
    }

    #[test]
    fn mixer_advances_every_frame_even_when_frozen() {
        let mut a = animator();
        a.update(input(false, true), DT);
        let before = a.mixer().time();
        a.update(input(false, false), DT);
        assert!((a.mixer().time() - before - DT).abs() < 1e-6);
    }

    #[test]
    fn missing_walk_clip_fails_safe_to_idle() {
        let mut a = animator_without(WALK);
        for _ in 0..5 {
            assert_eq!(a.update(input(true, false), DT), None);
            assert_eq!(a.state(), AnimState::Idle);
        }
        let missing: Vec<_> = a
            .events()
            .iter()
            .filter(|e| matches!(e, AnimatorEvent::MissingClip { .. }))
            .collect();
        assert_eq!(
            missing,
            [&AnimatorEvent::MissingClip {
                state: AnimState::Walk
            }]
        );
    }

    #[test]
    fn missing_jump_clip_sets_no_cooldown() {
        let mut a = animator_without(JUMP);
        a.update(input(true, false), DT);
        assert_eq!(a.state(), AnimState::Walk);
        let t = a.update(input(true, true), DT);
        assert_eq!(t, Some((AnimState::Walk, AnimState::Idle)));
        assert_eq!(a.cooldown_remaining(), None);
    }

    #[test]
    fn missing_idle_still_enters_idle_state() {
        let mut a = animator_without(IDLE);
        assert_eq!(
            a.events(),
            [AnimatorEvent::MissingClip {
                state: AnimState::Idle
            }]
        );
        a.update(input(true, false), DT);
        assert_eq!(a.state(), AnimState::Walk);
        a.update(input(false, false), DT);
        assert_eq!(a.state(), AnimState::Idle);
        a.update(input(false, false), DT);
        assert_eq!(a.weight(AnimState::Walk), 0.0);
    }

    #[test]
    fn cancel_pending_unfreezes() {
        let mut a = animator();
        a.update(input(false, true), DT);
        assert!(a.cooldown_remaining().is_some());
        a.cancel_pending();
        assert_eq!(a.update(input(false, false), DT).map(|t| t.1), Some(AnimState::Idle));
    }

    #[test]
    fn invalid_clip_is_treated_as_missing() {
        let skel = Skeleton::humanoid();
        let mut clips = default_clips(&skel);
        clips[1].t_tracks.insert(
            500,
            crate::clip::TrackVec3 {
                times: vec![0.0],
                values: vec![glam::Vec3::ZERO],
            },
        );
        let a = CharacterAnimator::new(skel, clips, &AnimatorConfig::default());
        assert!(!a.has_clip(AnimState::Walk));
        assert!(a.has_clip(AnimState::Jump));
    }

    #[test]
    fn joint_matrices_cover_skeleton() {
        let a = animator();
        assert_eq!(a.joint_matrices().len(), a.skeleton().len());
    }
}
