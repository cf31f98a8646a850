//! Hand-authored clips for the humanoid skeleton.

use glam::{Quat, Vec3};
use std::f32::consts::{PI, TAU};

use crate::clip::{AnimClip, TrackQuat, TrackVec3};
use crate::skeleton::*;

pub const IDLE: &str = "idle";
pub const WALK: &str = "walk";
pub const JUMP: &str = "jump";

const KEYS: usize = 17;

/// Idle, walk and jump clips bound to `skeleton`'s joint indices.
pub fn default_clips(skeleton: &Skeleton) -> Vec<AnimClip> {
    vec![idle(skeleton), walk(skeleton), jump(skeleton)]
}

/// Slow breathing bob with a slight arm sway.
pub fn idle(skeleton: &Skeleton) -> AnimClip {
    let mut clip = ClipBuilder::new(IDLE, 2.0, skeleton);
    clip.translate(HIPS, |p| Vec3::new(0.0, 0.95 + 0.01 * (TAU * p).sin(), 0.0));
    clip.rotate(CHEST, |p| Quat::from_rotation_x(0.03 * (TAU * p).sin()));
    clip.rotate(LEFT_UPPER_ARM, |p| Quat::from_rotation_z(0.08 + 0.03 * (TAU * p).sin()));
    clip.rotate(RIGHT_UPPER_ARM, |p| Quat::from_rotation_z(-0.08 - 0.03 * (TAU * p).sin()));
    clip.finish()
}

/// One stride per second: legs swing opposite to arms.
pub fn walk(skeleton: &Skeleton) -> AnimClip {
    let mut clip = ClipBuilder::new(WALK, 1.0, skeleton);
    let swing = |p: f32| (TAU * p).sin();
    clip.translate(HIPS, |p| {
        Vec3::new(0.0, 0.95 + 0.03 * (2.0 * TAU * p).cos().abs(), 0.0)
    });
    clip.rotate(LEFT_UPPER_LEG, move |p| Quat::from_rotation_x(0.5 * swing(p)));
    clip.rotate(RIGHT_UPPER_LEG, move |p| Quat::from_rotation_x(-0.5 * swing(p)));
    clip.rotate(LEFT_LOWER_LEG, move |p| {
        Quat::from_rotation_x(-0.6 * swing(p).max(0.0))
    });
    clip.rotate(RIGHT_LOWER_LEG, move |p| {
        Quat::from_rotation_x(-0.6 * (-swing(p)).max(0.0))
    });
    clip.rotate(LEFT_UPPER_ARM, move |p| Quat::from_rotation_x(-0.35 * swing(p)));
    clip.rotate(RIGHT_UPPER_ARM, move |p| Quat::from_rotation_x(0.35 * swing(p)));
    clip.finish()
}

/// Crouch, leap and land within one second.
pub fn jump(skeleton: &Skeleton) -> AnimClip {
    let mut clip = ClipBuilder::new(JUMP, 1.0, skeleton);
    let arc = |p: f32| (PI * p).sin();
    clip.translate(HIPS, move |p| Vec3::new(0.0, 0.95 + 0.4 * arc(p), 0.0));
    for leg in [LEFT_UPPER_LEG, RIGHT_UPPER_LEG] {
        clip.rotate(leg, move |p| Quat::from_rotation_x(0.7 * arc(p)));
    }
    for shin in [LEFT_LOWER_LEG, RIGHT_LOWER_LEG] {
        clip.rotate(shin, move |p| Quat::from_rotation_x(-1.1 * arc(p)));
    }
    clip.rotate(LEFT_UPPER_ARM, move |p| Quat::from_rotation_z(2.2 * arc(p)));
    clip.rotate(RIGHT_UPPER_ARM, move |p| Quat::from_rotation_z(-2.2 * arc(p)));
    clip.finish()
}

/// Samples closures of normalized phase `0..=1` into evenly spaced keys.
struct ClipBuilder<'a> {
    clip: AnimClip,
    skeleton: &'a Skeleton,
}

impl<'a> ClipBuilder<'a> {
    fn new(name: &str, duration: f32, skeleton: &'a Skeleton) -> Self {
        Self {
            clip: AnimClip::new(name, duration),
            skeleton,
        }
    }

    fn times(&self) -> Vec<f32> {
        (0..KEYS)
            .map(|k| self.clip.duration * k as f32 / (KEYS - 1) as f32)
            .collect()
    }

    fn translate(&mut self, joint: &str, f: impl Fn(f32) -> Vec3) {
        let Some(index) = self.skeleton.find(joint) else {
            tracing::warn!(clip = %self.clip.name, joint, "joint not in skeleton, track dropped");
            return;
        };
        let times = self.times();
        let values = (0..KEYS).map(|k| f(phase(k))).collect();
        self.clip.t_tracks.insert(index, TrackVec3 { times, values });
    }

    fn rotate(&mut self, joint: &str, f: impl Fn(f32) -> Quat) {
        let Some(index) = self.skeleton.find(joint) else {
            tracing::warn!(clip = %self.clip.name, joint, "joint not in skeleton, track dropped");
            return;
        };
        let times = self.times();
        let values = (0..KEYS).map(|k| f(phase(k))).collect();
        self.clip.r_tracks.insert(index, TrackQuat { times, values });
    }

    fn finish(self) -> AnimClip {
        self.clip
    }
}

fn phase(k: usize) -> f32 {
    k as f32 / (KEYS - 1) as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use morphscene_common::Transform;

    #[test]
    fn default_clips_validate_against_humanoid() {
        let skel = Skeleton::humanoid();
        let clips = default_clips(&skel);
        let names: Vec<&str> = clips.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, [IDLE, WALK, JUMP]);
        for clip in &clips {
            assert!(clip.validate(&skel).is_ok(), "{} invalid", clip.name);
        }
    }

    #[test]
    fn looping_clips_close_seamlessly() {
        let skel = Skeleton::humanoid();
        let hips = skel.find(HIPS).unwrap();
        for clip in default_clips(&skel) {
            let start = clip.sample_joint(hips, 0.0, Transform::default());
            let end = clip.sample_joint(hips, clip.duration - 1e-4, Transform::default());
            assert!(
                (start.position - end.position).length() < 1e-2,
                "{} does not loop",
                clip.name
            );
        }
    }

    #[test]
    fn jump_peaks_mid_clip() {
        let skel = Skeleton::humanoid();
        let clip = jump(&skel);
        let hips = skel.find(HIPS).unwrap();
        let mid = clip.sample_joint(hips, 0.5, Transform::default());
        assert!((mid.position.y - 1.35).abs() < 1e-4);
    }

    #[test]
    fn missing_joint_drops_track() {
        let skel = Skeleton::new(Vec::new()).unwrap();
        let clip = walk(&skel);
        assert!(clip.t_tracks.is_empty());
        assert!(clip.r_tracks.is_empty());
    }
}
