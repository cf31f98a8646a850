//! Shared types and utilities for the morphscene workspace.
//!
//! # Invariants
//! - Particle buffers are immutable once built.
//! - Every tunable lives in `SceneConfig`; crates never hard-code scene constants.

pub mod config;
pub mod particles;
pub mod types;

pub use config::{
    AnimatorConfig, ConfigError, MorphConfig, ParticleConfig, ParticleStyle, PostConfig,
    SceneConfig, WalkConfig,
};
pub use particles::ParticleBuffer;
pub use types::{Aabb, Transform};
