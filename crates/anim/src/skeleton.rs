use glam::{Mat4, Vec3};
use morphscene_common::Transform;

use crate::AnimError;

pub const HIPS: &str = "hips";
pub const SPINE: &str = "spine";
pub const CHEST: &str = "chest";
pub const NECK: &str = "neck";
pub const HEAD: &str = "head";
pub const LEFT_UPPER_ARM: &str = "left_upper_arm";
pub const LEFT_LOWER_ARM: &str = "left_lower_arm";
pub const LEFT_HAND: &str = "left_hand";
pub const RIGHT_UPPER_ARM: &str = "right_upper_arm";
pub const RIGHT_LOWER_ARM: &str = "right_lower_arm";
pub const RIGHT_HAND: &str = "right_hand";
pub const LEFT_UPPER_LEG: &str = "left_upper_leg";
pub const LEFT_LOWER_LEG: &str = "left_lower_leg";
pub const LEFT_FOOT: &str = "left_foot";
pub const RIGHT_UPPER_LEG: &str = "right_upper_leg";
pub const RIGHT_LOWER_LEG: &str = "right_lower_leg";
pub const RIGHT_FOOT: &str = "right_foot";

/// One bone: its parent and its bind-pose transform relative to that parent.
#[derive(Debug, Clone, PartialEq)]
pub struct Joint {
    pub name: String,
    pub parent: Option<usize>,
    pub base: Transform,
}

/// Local joint transforms for one instant.
#[derive(Debug, Clone, PartialEq)]
pub struct Pose {
    pub locals: Vec<Transform>,
}

/// Joint hierarchy with parents stored before their children.
#[derive(Debug, Clone, PartialEq)]
pub struct Skeleton {
    joints: Vec<Joint>,
}

impl Skeleton {
    pub fn new(joints: Vec<Joint>) -> Result<Self, AnimError> {
        for (i, joint) in joints.iter().enumerate() {
            if let Some(p) = joint.parent {
                if p >= i {
                    return Err(AnimError::BadParent {
                        joint: joint.name.clone(),
                        parent: p,
                    });
                }
            }
        }
        Ok(Self { joints })
    }

    /// A 17-joint biped standing on the origin, about 1.7 units tall, facing +Z.
    pub fn humanoid() -> Self {
        let mut joints = Vec::new();
        let mut add = |name: &str, parent: Option<usize>, offset: Vec3| -> usize {
            joints.push(Joint {
                name: name.to_string(),
                parent,
                base: Transform::from_translation(offset),
            });
            joints.len() - 1
        };

        let hips = add(HIPS, None, Vec3::new(0.0, 0.95, 0.0));
        let spine = add(SPINE, Some(hips), Vec3::new(0.0, 0.15, 0.0));
        let chest = add(CHEST, Some(spine), Vec3::new(0.0, 0.2, 0.0));
        let neck = add(NECK, Some(chest), Vec3::new(0.0, 0.22, 0.0));
        add(HEAD, Some(neck), Vec3::new(0.0, 0.12, 0.0));

        for (side, upper, lower, hand) in [
            (1.0, LEFT_UPPER_ARM, LEFT_LOWER_ARM, LEFT_HAND),
            (-1.0, RIGHT_UPPER_ARM, RIGHT_LOWER_ARM, RIGHT_HAND),
        ] {
            let u = add(upper, Some(chest), Vec3::new(0.2 * side, 0.18, 0.0));
            let l = add(lower, Some(u), Vec3::new(0.0, -0.28, 0.0));
            add(hand, Some(l), Vec3::new(0.0, -0.25, 0.0));
        }
        for (side, upper, lower, foot) in [
            (1.0, LEFT_UPPER_LEG, LEFT_LOWER_LEG, LEFT_FOOT),
            (-1.0, RIGHT_UPPER_LEG, RIGHT_LOWER_LEG, RIGHT_FOOT),
        ] {
            let u = add(upper, Some(hips), Vec3::new(0.1 * side, -0.05, 0.0));
            let l = add(lower, Some(u), Vec3::new(0.0, -0.45, 0.0));
            add(foot, Some(l), Vec3::new(0.0, -0.45, 0.05));
        }

        Self { joints }
    }

    pub fn len(&self) -> usize {
        self.joints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    pub fn find(&self, name: &str) -> Option<usize> {
        self.joints.iter().position(|j| j.name == name)
    }

    pub fn bind_pose(&self) -> Pose {
        Pose {
            locals: self.joints.iter().map(|j| j.base).collect(),
        }
    }

    /// Model-space matrix of every joint for `pose`.
    ///
    /// Parents precede children, so one forward pass resolves the chain.
    pub fn global_matrices(&self, pose: &Pose) -> Vec<Mat4> {
        let mut out: Vec<Mat4> = Vec::with_capacity(self.joints.len());
        for (i, joint) in self.joints.iter().enumerate() {
            let local = pose.locals.get(i).unwrap_or(&joint.base).to_mat4();
            let global = match joint.parent {
                Some(p) => out[p] * local,
                None => local,
            };
            out.push(global);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn humanoid_hierarchy_is_valid() {
        let skel = Skeleton::humanoid();
        assert_eq!(skel.len(), 17);
        assert!(Skeleton::new(skel.joints().to_vec()).is_ok());
        assert_eq!(skel.find(HIPS), Some(0));
        assert!(skel.find(RIGHT_FOOT).is_some());
    }

    #[test]
    fn rejects_forward_parent_reference() {
        let joints = vec![Joint {
            name: "root".into(),
            parent: Some(0),
            base: Transform::default(),
        }];
        assert!(matches!(
            Skeleton::new(joints),
            Err(AnimError::BadParent { parent: 0, .. })
        ));
    }

    #[test]
    fn bind_pose_head_height() {
        let skel = Skeleton::humanoid();
        let globals = skel.global_matrices(&skel.bind_pose());
        let head = globals[skel.find(HEAD).unwrap()].transform_point3(Vec3::ZERO);
        assert!((head.y - 1.64).abs() < 1e-5);
        let foot = globals[skel.find(LEFT_FOOT).unwrap()].transform_point3(Vec3::ZERO);
        assert!(foot.y.abs() < 1e-5);
    }
}
