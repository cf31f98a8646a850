//! Skeletal animation: clips, a cross-fading mixer and the Idle/Walk/Jump animator.
//!
//! # Invariants
//! - Exactly one `AnimState` is active at a time.
//! - While the jump cooldown runs, no transition is evaluated.
//! - The mixer advances every frame, frozen or not.

mod animator;
mod clip;
mod mixer;
pub mod procedural;
mod skeleton;

pub use animator::{AnimState, AnimatorEvent, AnimatorInput, CharacterAnimator};
pub use clip::{AnimClip, TrackQuat, TrackVec3};
pub use mixer::{ActionId, AnimationMixer};
pub use skeleton::{Joint, Pose, Skeleton};

/// Joint name constants of the built-in humanoid.
pub mod joints {
    pub use crate::skeleton::{
        CHEST, HEAD, HIPS, LEFT_FOOT, LEFT_HAND, LEFT_LOWER_ARM, LEFT_LOWER_LEG, LEFT_UPPER_ARM,
        LEFT_UPPER_LEG, NECK, RIGHT_FOOT, RIGHT_HAND, RIGHT_LOWER_ARM, RIGHT_LOWER_LEG,
        RIGHT_UPPER_ARM, RIGHT_UPPER_LEG, SPINE,
    };
}

/// Errors from building skeletons and validating clips.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AnimError {
    #[error("joint `{joint}` references parent {parent} that does not precede it")]
    BadParent { joint: String, parent: usize },
    #[error("clip `{clip}`: track targets joint {joint} outside the skeleton")]
    JointOutOfRange { clip: String, joint: usize },
    #[error("clip `{clip}`: {times} key times but {values} values")]
    KeyCountMismatch {
        clip: String,
        times: usize,
        values: usize,
    },
    #[error("clip `{clip}`: key times are not sorted")]
    UnsortedKeys { clip: String },
}

pub fn crate_info() -> &'static str {
    "morphscene-anim v0.1.0"
}
