use glam::{Quat, Vec3};
use morphscene_common::Transform;

use crate::clip::AnimClip;
use crate::skeleton::{Pose, Skeleton};

/// Handle to an action (a clip bound to the mixer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActionId(usize);

#[derive(Debug, Clone, Copy, PartialEq)]
struct Fade {
    from: f32,
    to: f32,
    duration: f32,
    elapsed: f32,
}

/// Playback state of one clip.
#[derive(Debug, Clone)]
struct Action {
    clip: AnimClip,
    time: f32,
    weight: f32,
    fade: Option<Fade>,
    playing: bool,
}

/// Blends any number of playing clips by weight and advances them in time.
///
/// Fades are linear weight ramps driven by `update`; an action whose fade-out
/// completes stops playing.
#[derive(Debug, Clone, Default)]
pub struct AnimationMixer {
    actions: Vec<Action>,
    time: f32,
}

impl AnimationMixer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a clip. The action starts stopped with weight 0.
    pub fn add_clip(&mut self, clip: AnimClip) -> ActionId {
        self.actions.push(Action {
            clip,
            time: 0.0,
            weight: 0.0,
            fade: None,
            playing: false,
        });
        ActionId(self.actions.len() - 1)
    }

    pub fn find(&self, name: &str) -> Option<ActionId> {
        self.actions
            .iter()
            .position(|a| a.clip.name == name)
            .map(ActionId)
    }

    /// Total time the mixer has been advanced.
    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn clip_name(&self, id: ActionId) -> Option<&str> {
        self.actions.get(id.0).map(|a| a.clip.name.as_str())
    }

    pub fn weight(&self, id: ActionId) -> f32 {
        self.actions.get(id.0).map_or(0.0, |a| a.weight)
    }

    pub fn action_time(&self, id: ActionId) -> f32 {
        self.actions.get(id.0).map_or(0.0, |a| a.time)
    }

    pub fn is_playing(&self, id: ActionId) -> bool {
        self.actions.get(id.0).is_some_and(|a| a.playing)
    }

    pub fn is_fading(&self, id: ActionId) -> bool {
        self.actions.get(id.0).is_some_and(|a| a.fade.is_some())
    }

    /// Start playing at full weight, no fade.
    pub fn play(&mut self, id: ActionId) {
        if let Some(a) = self.actions.get_mut(id.0) {
            a.playing = true;
            if a.fade.is_none() {
                a.weight = 1.0;
            }
        }
    }

    /// Rewind to the clip start.
    pub fn reset(&mut self, id: ActionId) {
        if let Some(a) = self.actions.get_mut(id.0) {
            a.time = 0.0;
        }
    }

    pub fn fade_in(&mut self, id: ActionId, duration: f32) {
        self.start_fade(id, 0.0, 1.0, duration);
    }

    pub fn fade_out(&mut self, id: ActionId, duration: f32) {
        let from = self.weight(id);
        self.start_fade(id, from, 0.0, duration);
    }

    /// Fade `from` out and `to` in concurrently over `duration`; `to` restarts
    /// from its first frame and loops.
    pub fn cross_fade(&mut self, from: Option<ActionId>, to: ActionId, duration: f32) {
        if let Some(prev) = from.filter(|&p| p != to) {
            self.fade_out(prev, duration);
        }
        self.reset(to);
        self.fade_in(to, duration);
        self.play(to);
    }

    fn start_fade(&mut self, id: ActionId, from: f32, to: f32, duration: f32) {
        let Some(a) = self.actions.get_mut(id.0) else {
            return;
        };
        if duration <= 0.0 {
            a.weight = to;
            a.fade = None;
            if to == 0.0 {
                a.playing = false;
            }
            return;
        }
        a.weight = from;
        a.fade = Some(Fade {
            from,
            to,
            duration,
            elapsed: 0.0,
        });
    }

    /// Advance every playing action and every fade by `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        self.time += dt;
        for a in &mut self.actions {
            if !a.playing {
                continue;
            }
            a.time += dt;
            if a.clip.duration > 0.0 {
                a.time = a.time.rem_euclid(a.clip.duration);
            }

            if let Some(fade) = &mut a.fade {
                fade.elapsed += dt;
                let f = (fade.elapsed / fade.duration).min(1.0);
                a.weight = fade.from + (fade.to - fade.from) * f;
                if f >= 1.0 {
                    if fade.to == 0.0 {
                        a.playing = false;
                    }
                    a.fade = None;
                }
            }
        }
    }

    /// Weighted blend of all playing actions.
    ///
    /// When the weights sum to less than one, the bind pose fills the rest.
    pub fn pose(&self, skeleton: &Skeleton) -> Pose {
        let active: Vec<&Action> = self
            .actions
            .iter()
            .filter(|a| a.playing && a.weight > 0.0)
            .collect();

        let locals = skeleton
            .joints()
            .iter()
            .enumerate()
            .map(|(i, joint)| {
                let mut samples: Vec<(Transform, f32)> = active
                    .iter()
                    .map(|a| (a.clip.sample_joint(i, a.time, joint.base), a.weight))
                    .collect();
                let total: f32 = samples.iter().map(|(_, w)| w).sum();
                if total < 1.0 {
                    samples.push((joint.base, 1.0 - total));
                }
                blend(&samples)
            })
            .collect();

        Pose { locals }
    }
}

/// Normalized weighted average; rotations are sign-aligned and nlerped.
fn blend(samples: &[(Transform, f32)]) -> Transform {
    let total: f32 = samples.iter().map(|(_, w)| w).sum();
    let Some(&(first, _)) = samples.first() else {
        return Transform::default();
    };
    if total <= 0.0 {
        return first;
    }

    let mut position = Vec3::ZERO;
    let mut scale = Vec3::ZERO;
    let mut rotation = Quat::from_xyzw(0.0, 0.0, 0.0, 0.0);
    for (t, w) in samples {
        let w = w / total;
        position += t.position * w;
        scale += t.scale * w;
        let r = if t.rotation.dot(first.rotation) < 0.0 {
            -t.rotation
        } else {
            t.rotation
        };
        rotation = rotation + r * w;
    }

    Transform {
        position,
        rotation: rotation.normalize(),
        scale,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clip::TrackVec3;

    fn raise_clip(name: &str, height: f32) -> AnimClip {
        let mut clip = AnimClip::new(name, 1.0);
        clip.t_tracks.insert(
            0,
            TrackVec3 {
                times: vec![0.0, 1.0],
                values: vec![Vec3::Y * height, Vec3::Y * height],
            },
        );
        clip
    }

    fn root_y(mixer: &AnimationMixer, skel: &Skeleton) -> f32 {
        mixer.pose(skel).locals[0].position.y
    }

    #[test]
    fn play_sets_full_weight() {
        let mut mixer = AnimationMixer::new();
        let id = mixer.add_clip(raise_clip("a", 2.0));
        assert!(!mixer.is_playing(id));
        mixer.play(id);
        assert!(mixer.is_playing(id));
        assert_eq!(mixer.weight(id), 1.0);
    }

    #[test]
    fn action_time_loops() {
        let mut mixer = AnimationMixer::new();
        let id = mixer.add_clip(raise_clip("a", 2.0));
        mixer.play(id);
        mixer.update(0.75);
        mixer.update(0.5);
        assert!((mixer.action_time(id) - 0.25).abs() < 1e-6);
        assert!((mixer.time() - 1.25).abs() < 1e-6);
    }

    #[test]
    fn cross_fade_is_concurrent_and_linear() {
        let mut mixer = AnimationMixer::new();
        let a = mixer.add_clip(raise_clip("a", 0.0));
        let b = mixer.add_clip(raise_clip("b", 2.0));
        mixer.play(a);

        mixer.cross_fade(Some(a), b, 0.5);
        assert_eq!(mixer.weight(a), 1.0);
        assert_eq!(mixer.weight(b), 0.0);

        mixer.update(0.25);
        assert!((mixer.weight(a) - 0.5).abs() < 1e-6);
        assert!((mixer.weight(b) - 0.5).abs() < 1e-6);

        mixer.update(0.25);
        assert_eq!(mixer.weight(a), 0.0);
        assert_eq!(mixer.weight(b), 1.0);
        assert!(!mixer.is_playing(a));
        assert!(mixer.is_playing(b));
        assert!(!mixer.is_fading(b));
    }

    #[test]
    fn pose_blends_by_weight() {
        let skel = Skeleton::humanoid();
        let mut mixer = AnimationMixer::new();
        let a = mixer.add_clip(raise_clip("a", 0.0));
        let b = mixer.add_clip(raise_clip("b", 2.0));
        mixer.play(a);
        mixer.cross_fade(Some(a), b, 1.0);
        mixer.update(0.5);
        assert!((root_y(&mixer, &skel) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn weight_deficit_filled_by_bind_pose() {
        let skel = Skeleton::humanoid();
        let mut mixer = AnimationMixer::new();
        let a = mixer.add_clip(raise_clip("a", 2.0));
        mixer.fade_in(a, 1.0);
        mixer.play(a);
        mixer.update(0.5);
        // Half clip (2.0), half bind pose (0.95).
        assert!((root_y(&mixer, &skel) - 1.475).abs() < 1e-5);
    }

    #[test]
    fn nothing_playing_gives_bind_pose() {
        let skel = Skeleton::humanoid();
        let mixer = AnimationMixer::new();
        assert_eq!(mixer.pose(&skel), skel.bind_pose());
    }

    #[test]
    fn cross_fade_to_self_restarts_without_fading_out() {
        let mut mixer = AnimationMixer::new();
        let a = mixer.add_clip(raise_clip("a", 1.0));
        mixer.play(a);
        mixer.update(0.3);
        mixer.cross_fade(Some(a), a, 0.5);
        assert_eq!(mixer.action_time(a), 0.0);
        mixer.update(0.5);
        assert_eq!(mixer.weight(a), 1.0);
        assert!(mixer.is_playing(a));
    }

    #[test]
    fn zero_duration_fade_out_stops() {
        let mut mixer = AnimationMixer::new();
        let a = mixer.add_clip(raise_clip("a", 1.0));
        mixer.play(a);
        mixer.fade_out(a, 0.0);
        assert!(!mixer.is_playing(a));
    }

    #[test]
    fn find_by_name() {
        let mut mixer = AnimationMixer::new();
        mixer.add_clip(raise_clip("idle", 0.0));
        let walk = mixer.add_clip(raise_clip("walk", 0.0));
        assert_eq!(mixer.find("walk"), Some(walk));
        assert_eq!(mixer.clip_name(walk), Some("walk"));
        assert_eq!(mixer.find("jump"), None);
    }
}
