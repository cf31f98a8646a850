use glam::{Quat, Vec3};
use morphscene_common::Transform;
use std::collections::BTreeMap;

use crate::AnimError;
use crate::skeleton::{Pose, Skeleton};

/// Keyframed vector channel (translation or scale).
#[derive(Debug, Clone, PartialEq)]
pub struct TrackVec3 {
    pub times: Vec<f32>,
    pub values: Vec<Vec3>,
}

/// Keyframed rotation channel.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackQuat {
    pub times: Vec<f32>,
    pub values: Vec<Quat>,
}

/// Named, time-indexed skeletal pose track. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimClip {
    pub name: String,
    pub duration: f32,
    pub t_tracks: BTreeMap<usize, TrackVec3>,
    pub r_tracks: BTreeMap<usize, TrackQuat>,
    pub s_tracks: BTreeMap<usize, TrackVec3>,
}

impl AnimClip {
    pub fn new(name: impl Into<String>, duration: f32) -> Self {
        Self {
            name: name.into(),
            duration,
            t_tracks: BTreeMap::new(),
            r_tracks: BTreeMap::new(),
            s_tracks: BTreeMap::new(),
        }
    }

    /// Check that every track targets a joint of `skeleton` and has sorted,
    /// matching keys.
    pub fn validate(&self, skeleton: &Skeleton) -> Result<(), AnimError> {
        let joint_ok = |joint: usize| {
            if joint < skeleton.len() {
                Ok(())
            } else {
                Err(AnimError::JointOutOfRange {
                    clip: self.name.clone(),
                    joint,
                })
            }
        };
        let keys_ok = |times: &[f32], values: usize| {
            if times.len() != values {
                return Err(AnimError::KeyCountMismatch {
                    clip: self.name.clone(),
                    times: times.len(),
                    values,
                });
            }
            if times.windows(2).any(|w| w[1] < w[0]) {
                return Err(AnimError::UnsortedKeys {
                    clip: self.name.clone(),
                });
            }
            Ok(())
        };

        for (&joint, track) in self.t_tracks.iter().chain(self.s_tracks.iter()) {
            joint_ok(joint)?;
            keys_ok(&track.times, track.values.len())?;
        }
        for (&joint, track) in &self.r_tracks {
            joint_ok(joint)?;
            keys_ok(&track.times, track.values.len())?;
        }
        Ok(())
    }

    /// Local transform of `joint` at clip-local time `t` (wrapped into the clip).
    pub fn sample_joint(&self, joint: usize, t: f32, base: Transform) -> Transform {
        let time = self.wrap(t);
        Transform {
            position: self
                .t_tracks
                .get(&joint)
                .map_or(base.position, |tr| sample_vec3(tr, time, base.position)),
            rotation: self
                .r_tracks
                .get(&joint)
                .map_or(base.rotation, |tr| sample_quat(tr, time, base.rotation)),
            scale: self
                .s_tracks
                .get(&joint)
                .map_or(base.scale, |tr| sample_vec3(tr, time, base.scale)),
        }
    }

    /// Full local pose at time `t`; joints without tracks keep their bind transform.
    pub fn sample_pose(&self, skeleton: &Skeleton, t: f32) -> Pose {
        Pose {
            locals: skeleton
                .joints()
                .iter()
                .enumerate()
                .map(|(i, j)| self.sample_joint(i, t, j.base))
                .collect(),
        }
    }

    fn wrap(&self, t: f32) -> f32 {
        if self.duration > 0.0 {
            t.rem_euclid(self.duration)
        } else {
            0.0
        }
    }
}

/// Index of the key segment containing `t`, plus the interpolation factor.
fn segment(times: &[f32], t: f32) -> Option<(usize, f32)> {
    let (&first, &last) = (times.first()?, times.last()?);
    if times.len() == 1 || t <= first {
        return Some((0, 0.0));
    }
    if t >= last {
        return Some((times.len() - 1, 0.0));
    }
    let i = times.partition_point(|&k| k <= t) - 1;
    let (t0, t1) = (times[i], times[i + 1]);
    let f = if t1 > t0 { (t - t0) / (t1 - t0) } else { 0.0 };
    Some((i, f))
}

fn sample_vec3(tr: &TrackVec3, t: f32, default: Vec3) -> Vec3 {
    match segment(&tr.times, t) {
        Some((i, f)) if f > 0.0 => tr.values[i].lerp(tr.values[i + 1], f),
        Some((i, _)) => tr.values[i],
        None => default,
    }
}

fn sample_quat(tr: &TrackQuat, t: f32, default: Quat) -> Quat {
    match segment(&tr.times, t) {
        Some((i, f)) if f > 0.0 => tr.values[i].slerp(tr.values[i + 1], f),
        Some((i, _)) => tr.values[i],
        None => default,
    }
}
