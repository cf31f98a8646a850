//! wgpu render backend for the morph scene.
//!
//! Draws a floor grid, the character as lit joint and bone cubes, and the
//! particle cloud as additive billboards into an HDR target, then composites
//! bloom and film grain onto the surface.
//!
//! # Invariants
//! - The renderer never mutates frame state.
//! - Camera motion is not part of the frame state.

mod camera;
mod gpu;
pub mod instances;
mod shaders;

pub use camera::OrbitCamera;
pub use gpu::SceneRenderer;
